//! Defines an abstraction over the event sending mechanism.

use super::events::UserEvent;
use tokio::sync::mpsc::UnboundedSender;

/// A trait that abstracts the sending of user events.
/// This is "fire-and-forget" and doesn't return a result, simplifying its use.
pub trait EventProxy: Send + Sync + Clone + 'static {
    fn send_event(&self, event: UserEvent);
}

/// The binary drives its event loop from an unbounded tokio channel.
impl EventProxy for UnboundedSender<UserEvent> {
    fn send_event(&self, event: UserEvent) {
        // A closed receiver means the shell is shutting down.
        if let Err(e) = self.send(event) {
            tracing::warn!("Failed to send event to event loop: {}", e);
        }
    }
}
