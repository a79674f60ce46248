//! Port for publishing advisory change events.

use crate::domain::ChangeEvent;

/// Port for broadcasting "row changed" hints to interested consumers.
///
/// Publication is fire-and-forget: implementations must never fail the
/// calling operation, and no domain invariant may depend on delivery.
#[cfg_attr(test, mockall::automock)]
pub trait EventPublisher: Send + Sync {
    /// Broadcast a change event. Losing the event is acceptable.
    fn publish(&self, event: ChangeEvent);
}

/// Publisher that drops every event; used where no feed is wired.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpEventPublisher;

impl EventPublisher for NoOpEventPublisher {
    fn publish(&self, _event: ChangeEvent) {}
}
