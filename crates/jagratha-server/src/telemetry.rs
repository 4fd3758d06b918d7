//! Line-delimited JSON telemetry on stdin.
//!
//! Used with the `external-feed` selector: each line is one raw observation,
//! e.g. `{"asset_id":"2-1","status":"offline"}`, queued for the scheduler's
//! next tick. Unparseable lines are logged and skipped.
//!
//! Meant for piped input: an interactive terminal holds shutdown until the
//! pending read returns.

use jagratha_core::observation::RawObservation;
use jagratha_engine::ingest::ExternalFeedHandle;
use tokio::io::{AsyncBufRead, AsyncBufReadExt as _};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Forward observations from `input` into `handle` until end of input,
/// cancellation, or the feed closing. Returns how many were queued.
pub async fn forward<R>(
  input: R,
  handle: ExternalFeedHandle,
  cancel: CancellationToken,
) -> usize
where
  R: AsyncBufRead + Unpin,
{
  let mut lines = input.lines();
  let mut queued = 0;
  loop {
    let line = tokio::select! {
      biased;
      _ = cancel.cancelled() => break,
      line = lines.next_line() => line,
    };
    let line = match line {
      Ok(Some(line)) => line,
      Ok(None) => {
        info!(queued, "Telemetry input closed");
        break;
      }
      Err(e) => {
        warn!(error = %e, "Failed to read telemetry input");
        break;
      }
    };
    if line.trim().is_empty() {
      continue;
    }
    match serde_json::from_str::<RawObservation>(&line) {
      Ok(raw) => {
        debug!(asset_id = %raw.asset_id, status = %raw.status, "Observation queued");
        if handle.submit(raw).is_err() {
          warn!("Scheduler feed closed, telemetry stopped");
          break;
        }
        queued += 1;
      }
      Err(e) => warn!(error = %e, "Skipping unparseable telemetry line"),
    }
  }
  queued
}

#[cfg(test)]
mod tests {
  use chrono::Utc;
  use jagratha_engine::ingest::{ExternalFeed, ObservationSource as _};

  use super::*;

  #[tokio::test]
  async fn forwards_valid_lines_and_skips_garbage() {
    let (mut feed, handle) = ExternalFeed::channel();
    let input = concat!(
      r#"{"asset_id":"1","status":"warning"}"#,
      "\nnot json\n\n",
      r#"{"asset_id":"2","status":"bogus"}"#,
      "\n",
    )
    .as_bytes();

    let queued = forward(input, handle, CancellationToken::new()).await;
    assert_eq!(queued, 2);

    // Status validation happens at poll time, not on the wire.
    let polled = feed.poll(&[], Utc::now());
    assert_eq!(polled.len(), 2);
    assert!(polled[0].is_ok());
    assert!(polled[1].is_err());
  }

  #[tokio::test]
  async fn stops_when_feed_is_dropped() {
    let (feed, handle) = ExternalFeed::channel();
    drop(feed);
    let input = b"{\"asset_id\":\"1\",\"status\":\"online\"}\n";
    assert_eq!(forward(&input[..], handle, CancellationToken::new()).await, 0);
  }
}
