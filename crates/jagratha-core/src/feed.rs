//! [`AlertFeed`] — one subscriber's view of newly created alerts.

use tokio::sync::mpsc;

use crate::alert::Alert;

/// A live, unbounded feed of alerts in creation order.
///
/// Each subscriber owns its own feed; dropping it unsubscribes.
#[derive(Debug)]
pub struct AlertFeed {
  rx: mpsc::UnboundedReceiver<Alert>,
}

impl AlertFeed {
  pub fn new(rx: mpsc::UnboundedReceiver<Alert>) -> Self { Self { rx } }

  /// Wait for the next alert. `None` once the publisher has shut down and the
  /// buffer is drained.
  pub async fn recv(&mut self) -> Option<Alert> { self.rx.recv().await }

  /// Take an alert if one is already buffered.
  pub fn try_recv(&mut self) -> Option<Alert> { self.rx.try_recv().ok() }

  pub fn into_inner(self) -> mpsc::UnboundedReceiver<Alert> { self.rx }
}
