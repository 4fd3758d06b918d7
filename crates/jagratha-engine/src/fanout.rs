//! In-process alert fan-out.
//!
//! [`AlertFanout`] hands every published [`Alert`] to each live subscriber
//! through its own unbounded channel. Publishing never waits on a consumer
//! and never drops an alert for a slow one; a subscriber that has gone away is
//! pruned on the next publish.

use std::sync::{Mutex, PoisonError};

use jagratha_core::{alert::Alert, feed::AlertFeed};
use tokio::sync::mpsc;

#[derive(Debug, Default)]
pub struct AlertFanout {
  subscribers: Mutex<Vec<mpsc::UnboundedSender<Alert>>>,
}

impl AlertFanout {
  pub fn new() -> Self { Self::default() }

  /// Register a new subscriber. It sees only alerts published after this
  /// call.
  pub fn subscribe(&self) -> AlertFeed {
    let (tx, rx) = mpsc::unbounded_channel();
    self
      .subscribers
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .push(tx);
    AlertFeed::new(rx)
  }

  /// Deliver `alert` to every live subscriber.
  pub fn publish(&self, alert: &Alert) {
    let mut subscribers = self
      .subscribers
      .lock()
      .unwrap_or_else(PoisonError::into_inner);
    // A send error only means that receiver was dropped.
    subscribers.retain(|tx| tx.send(alert.clone()).is_ok());
  }
}
