//! [`AssetTree`] — the owned hierarchy of poles and sub-poles.
//!
//! The tree is the single owner of every [`Asset`]. Structure is fixed at
//! construction; the only mutation is [`AssetTree::set_status`]. An id index
//! maps each asset to its path of child positions so lookups do not walk the
//! whole tree.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  asset::{Asset, AssetId, AssetStatus},
};

/// Child positions from a root to an asset; the first entry indexes `roots`.
type Path = Vec<usize>;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<Asset>", into = "Vec<Asset>")]
pub struct AssetTree {
  roots: Vec<Asset>,
  index: HashMap<AssetId, Path>,
}

impl AssetTree {
  /// Build a tree from its root assets, rejecting duplicate ids anywhere in
  /// the hierarchy.
  pub fn new(roots: Vec<Asset>) -> Result<Self> {
    let mut index = HashMap::new();
    for (i, root) in roots.iter().enumerate() {
      index_subtree(root, vec![i], &mut index)?;
    }
    Ok(Self { roots, index })
  }

  pub fn roots(&self) -> &[Asset] { &self.roots }

  pub fn len(&self) -> usize { self.index.len() }

  pub fn is_empty(&self) -> bool { self.index.is_empty() }

  pub fn contains(&self, id: &AssetId) -> bool { self.index.contains_key(id) }

  /// Look up an asset anywhere in the tree.
  pub fn get(&self, id: &AssetId) -> Result<&Asset> {
    let path = self
      .index
      .get(id)
      .ok_or_else(|| Error::AssetNotFound(id.clone()))?;
    Ok(self.node(path))
  }

  /// Every asset, depth-first, each parent before its children.
  pub fn flatten(&self) -> Vec<&Asset> {
    let mut out = Vec::with_capacity(self.index.len());
    let mut stack: Vec<&Asset> = self.roots.iter().rev().collect();
    while let Some(asset) = stack.pop() {
      out.push(asset);
      stack.extend(asset.children.iter().rev());
    }
    out
  }

  /// Asset ids in [`flatten`](Self::flatten) order.
  pub fn ids(&self) -> Vec<AssetId> {
    self.flatten().into_iter().map(|a| a.id.clone()).collect()
  }

  /// Number of top-level poles.
  pub fn pole_count(&self) -> usize { self.roots.len() }

  /// Number of assets below the top level, at any depth.
  pub fn sub_pole_count(&self) -> usize {
    self.index.len() - self.roots.len()
  }

  /// Record an observed status. Always advances `last_updated`, even when the
  /// status itself is unchanged. Returns the status held before the call.
  pub fn set_status(
    &mut self,
    id: &AssetId,
    status: AssetStatus,
    observed_at: DateTime<Utc>,
  ) -> Result<AssetStatus> {
    let path = self
      .index
      .get(id)
      .ok_or_else(|| Error::AssetNotFound(id.clone()))?
      .clone();
    let asset = self.node_mut(&path);
    let previous = asset.status;
    asset.status = status;
    asset.last_updated = observed_at;
    Ok(previous)
  }

  /// A pruned copy holding every asset whose name or location contains
  /// `query` (case-insensitive), together with all of its ancestors.
  ///
  /// Non-matching children of a retained node are dropped unless they in turn
  /// lead to a match. An empty query keeps everything.
  pub fn filter(&self, query: &str) -> Self {
    let needle = query.to_lowercase();
    let roots: Vec<Asset> = self
      .roots
      .iter()
      .filter_map(|root| prune(root, &needle))
      .collect();

    let mut index = HashMap::new();
    for (i, root) in roots.iter().enumerate() {
      // Ids were unique in the source tree, so a subset cannot collide.
      let _ = index_subtree(root, vec![i], &mut index);
    }
    Self { roots, index }
  }

  fn node(&self, path: &[usize]) -> &Asset {
    let mut node = &self.roots[path[0]];
    for &i in &path[1..] {
      node = &node.children[i];
    }
    node
  }

  fn node_mut(&mut self, path: &[usize]) -> &mut Asset {
    let mut node = &mut self.roots[path[0]];
    for &i in &path[1..] {
      node = &mut node.children[i];
    }
    node
  }
}

fn index_subtree(
  asset: &Asset,
  path: Path,
  index: &mut HashMap<AssetId, Path>,
) -> Result<()> {
  if index.contains_key(&asset.id) {
    return Err(Error::DuplicateAssetId(asset.id.clone()));
  }
  for (i, child) in asset.children.iter().enumerate() {
    let mut child_path = path.clone();
    child_path.push(i);
    index_subtree(child, child_path, index)?;
  }
  index.insert(asset.id.clone(), path);
  Ok(())
}

fn prune(asset: &Asset, needle: &str) -> Option<Asset> {
  let children: Vec<Asset> = asset
    .children
    .iter()
    .filter_map(|c| prune(c, needle))
    .collect();

  if children.is_empty() && !asset.matches_lowercase(needle) {
    return None;
  }
  Some(Asset { children, ..asset.clone() })
}

impl TryFrom<Vec<Asset>> for AssetTree {
  type Error = Error;

  fn try_from(roots: Vec<Asset>) -> Result<Self> { Self::new(roots) }
}

impl From<AssetTree> for Vec<Asset> {
  fn from(tree: AssetTree) -> Self { tree.roots }
}

#[cfg(test)]
mod tests {
  use std::collections::HashSet;

  use chrono::Duration;

  use super::*;

  fn at(minutes: i64) -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH + Duration::minutes(minutes)
  }

  fn leaf(id: &str, location: &str, status: AssetStatus) -> Asset {
    Asset::new(id, format!("Sub Pole {id}"), location, status, at(0))
  }

  fn pole(id: &str, location: &str, status: AssetStatus) -> Asset {
    let name = format!("Main Distribution Pole {id}");
    Asset::new(id, name, location, status, at(0))
  }

  fn tree() -> AssetTree {
    AssetTree::new(vec![
      pole("1", "Downtown", AssetStatus::Online).with_children(vec![
        leaf("1-1", "Street 1", AssetStatus::Warning),
        leaf("1-2", "Street 2", AssetStatus::Online),
      ]),
      pole("2", "Uptown", AssetStatus::Critical).with_children(vec![
        leaf("2-1", "Street 3", AssetStatus::Offline),
        leaf("2-2", "Street 4", AssetStatus::Online)
          .with_children(vec![leaf("2-2-1", "Alley 9", AssetStatus::Online)]),
      ]),
    ])
    .unwrap()
  }

  #[test]
  fn flatten_visits_each_node_once_parents_first() {
    let t = tree();
    let flat = t.flatten();
    let ids: Vec<&str> = flat.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, ["1", "1-1", "1-2", "2", "2-1", "2-2", "2-2-1"]);

    let unique: HashSet<_> = ids.iter().collect();
    assert_eq!(unique.len(), t.len());

    for asset in &flat {
      let pos = ids.iter().position(|id| *id == asset.id.as_str()).unwrap();
      for child in &asset.children {
        let child_pos = ids.iter().position(|id| *id == child.id.as_str()).unwrap();
        assert!(pos < child_pos, "{} must precede {}", asset.id, child.id);
      }
    }
  }

  #[test]
  fn duplicate_ids_are_rejected_across_levels() {
    let err = AssetTree::new(vec![
      Asset::new("1", "A", "X", AssetStatus::Online, at(0))
        .with_children(vec![leaf("2", "Y", AssetStatus::Online)]),
      Asset::new("2", "B", "Z", AssetStatus::Online, at(0)),
    ])
    .unwrap_err();
    assert_eq!(err, Error::DuplicateAssetId("2".into()));
  }

  #[test]
  fn get_finds_nested_assets() {
    let t = tree();
    assert_eq!(t.get(&"2-2-1".into()).unwrap().location, "Alley 9");
    assert_eq!(
      t.get(&"9".into()).unwrap_err(),
      Error::AssetNotFound("9".into())
    );
  }

  #[test]
  fn set_status_returns_previous_and_advances_timestamp() {
    let mut t = tree();
    let prev = t
      .set_status(&"1-2".into(), AssetStatus::Warning, at(5))
      .unwrap();
    assert_eq!(prev, AssetStatus::Online);

    let prev = t
      .set_status(&"1-2".into(), AssetStatus::Warning, at(7))
      .unwrap();
    assert_eq!(prev, AssetStatus::Warning);
    let asset = t.get(&"1-2".into()).unwrap();
    assert_eq!(asset.status, AssetStatus::Warning);
    assert_eq!(asset.last_updated, at(7));
  }

  #[test]
  fn set_status_on_unknown_asset_leaves_tree_untouched() {
    let mut t = tree();
    let before = t.flatten().into_iter().cloned().collect::<Vec<_>>();
    let err = t
      .set_status(&"nope".into(), AssetStatus::Critical, at(1))
      .unwrap_err();
    assert_eq!(err, Error::AssetNotFound("nope".into()));
    let after = t.flatten().into_iter().cloned().collect::<Vec<_>>();
    assert_eq!(before, after);
  }

  #[test]
  fn counts_split_poles_and_descendants() {
    let t = tree();
    assert_eq!(t.pole_count(), 2);
    assert_eq!(t.sub_pole_count(), 5);
  }

  #[test]
  fn filter_on_sub_pole_location_keeps_parent() {
    let filtered = tree().filter("street 3");
    let ids: Vec<&str> = filtered.flatten().iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, ["2", "2-1"]);
  }

  #[test]
  fn filter_keeps_every_ancestor_of_a_deep_match() {
    let filtered = tree().filter("ALLEY");
    let ids: Vec<&str> = filtered.flatten().iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, ["2", "2-2", "2-2-1"]);
  }

  #[test]
  fn filter_matching_parent_prunes_non_matching_children() {
    let filtered = tree().filter("downtown");
    let ids: Vec<&str> = filtered.flatten().iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, ["1"]);
  }

  #[test]
  fn filter_matches_names_and_empty_query_keeps_all() {
    let t = tree();
    let by_name = t.filter("distribution pole 2");
    assert_eq!(by_name.roots().len(), 1);
    assert_eq!(by_name.roots()[0].id.as_str(), "2");

    assert_eq!(t.filter("").len(), t.len());
    assert!(t.filter("nowhere").is_empty());
  }

  #[test]
  fn filtered_tree_supports_lookup() {
    let filtered = tree().filter("street 4");
    assert!(filtered.contains(&"2-2".into()));
    assert!(!filtered.contains(&"2-1".into()));
  }

  #[test]
  fn deserialising_rejects_duplicates() {
    let json = r#"[
      {"id":"1","name":"A","location":"X","status":"online",
       "last_updated":"2023-05-15T14:30:00Z"},
      {"id":"1","name":"B","location":"Y","status":"online",
       "last_updated":"2023-05-15T14:30:00Z"}
    ]"#;
    assert!(serde_json::from_str::<AssetTree>(json).is_err());
  }
}
