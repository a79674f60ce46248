//! Advisory change events emitted after successful mutations.
//!
//! Events are a UI-refresh hint only. Consumers must re-read authoritative
//! state from the store; nothing in the domain depends on delivery.

use serde::Serialize;
use uuid::Uuid;

/// Table whose row changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangedTable {
    VinylRecords,
    Offers,
    Orders,
    Reviews,
}

impl ChangedTable {
    /// Stable table name used in event payloads.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::VinylRecords => "vinyl_records",
            Self::Offers => "offers",
            Self::Orders => "orders",
            Self::Reviews => "reviews",
        }
    }
}

/// A "row changed" notification. Carries no row payload: the authoritative
/// state lives in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeEvent {
    /// Table whose row changed.
    pub table: ChangedTable,
    /// Primary key of the changed row.
    pub id: Uuid,
}

impl ChangeEvent {
    /// Build an event for a changed row.
    #[must_use]
    pub const fn new(table: ChangedTable, id: Uuid) -> Self {
        Self { table, id }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialises_table_names_in_snake_case() {
        let event = ChangeEvent::new(ChangedTable::VinylRecords, Uuid::nil());
        let value = serde_json::to_value(event).expect("event should serialise");
        assert_eq!(value["table"], "vinyl_records");
    }
}
