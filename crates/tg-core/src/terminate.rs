//! Fire-and-forget termination signaling.
//!
//! A termination request is a one-way command to the external executor; it
//! carries no acknowledgment and applies no state change. The instance
//! reaches `terminated` only when the executor later reports that
//! transition.

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, warn};
use uuid::Uuid;

/// Sender half of the termination channel.
///
/// Cheap to clone; every clone feeds the same receiver.
#[derive(Clone)]
pub struct TerminationBus {
    tx: UnboundedSender<Uuid>,
}

impl TerminationBus {
    /// Create the bus and the receiver the executor drains.
    pub fn channel() -> (Self, UnboundedReceiver<Uuid>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Ask the executor to terminate the given instance.
    ///
    /// Fire-and-forget: a missing executor is logged and the request is
    /// dropped. The caller observes the effect, if any, through a later
    /// reported transition.
    pub fn request(&self, uuid: Uuid) {
        debug!(%uuid, "termination requested");
        if self.tx.send(uuid).is_err() {
            warn!(%uuid, "no executor attached to the termination bus, request dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn requests_reach_the_receiver_in_order() {
        let (bus, mut rx) = TerminationBus::channel();
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();

        bus.request(first);
        bus.clone().request(second);

        assert_eq!(rx.recv().await, Some(first));
        assert_eq!(rx.recv().await, Some(second));
    }

    #[tokio::test]
    async fn request_without_executor_is_dropped() {
        let (bus, rx) = TerminationBus::channel();
        drop(rx);

        // Must not panic or block.
        bus.request(Uuid::new_v4());
    }
}
