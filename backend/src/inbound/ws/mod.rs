//! WebSocket inbound adapter broadcasting advisory change events.

mod changes;

pub use changes::{ChangeBroadcaster, change_feed};
