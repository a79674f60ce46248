//! Offers and the negotiation state machine.
//!
//! An offer moves `pending → {accepted, denied, countered}`. A countered
//! offer may be re-countered (the counter fields are updated in place),
//! accepted, or denied by either party's accept/deny path. Acceptance of a
//! countered offer reconciles the offer amount to the counter amount.
//! `denied` and `completed` are terminal; `accepted → completed` happens only
//! through settlement.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::UserId;

/// Lifecycle state of an offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OfferStatus {
    /// Awaiting the seller's first response.
    Pending,
    /// The seller proposed an alternate amount.
    Countered,
    /// A price has been agreed; checkout may begin.
    Accepted,
    /// The negotiation was refused. Terminal.
    Denied,
    /// The offer settled into a paid order. Terminal.
    Completed,
}

impl OfferStatus {
    /// Stable storage representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Countered => "countered",
            Self::Accepted => "accepted",
            Self::Denied => "denied",
            Self::Completed => "completed",
        }
    }

    /// Whether a seller response (accept/deny/counter) is still allowed.
    #[must_use]
    pub const fn is_respondable(&self) -> bool {
        matches!(self, Self::Pending | Self::Countered)
    }

    /// Whether the state admits no further transitions.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Denied | Self::Completed)
    }

    /// The set of states a seller response may start from.
    #[must_use]
    pub const fn respondable() -> [Self; 2] {
        [Self::Pending, Self::Countered]
    }
}

impl fmt::Display for OfferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when decoding an unknown status string from the store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown offer status: {value}")]
pub struct UnknownOfferStatus {
    /// The rejected raw value.
    pub value: String,
}

impl FromStr for OfferStatus {
    type Err = UnknownOfferStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "countered" => Ok(Self::Countered),
            "accepted" => Ok(Self::Accepted),
            "denied" => Ok(Self::Denied),
            "completed" => Ok(Self::Completed),
            other => Err(UnknownOfferStatus {
                value: other.to_owned(),
            }),
        }
    }
}

/// A seller's decision on an open offer.
#[derive(Debug, Clone, PartialEq)]
pub enum OfferResponse {
    /// Accept the current amount (or the standing counter amount).
    Accept,
    /// Refuse the negotiation. Terminal.
    Deny,
    /// Propose an alternate amount.
    Counter {
        amount: Decimal,
        message: Option<String>,
    },
}

/// A buyer's proposed price for a listing, plus the seller's counter state.
#[derive(Debug, Clone, PartialEq)]
pub struct Offer {
    pub id: Uuid,
    pub record_id: Uuid,
    pub buyer_id: UserId,
    pub seller_id: UserId,
    /// Agreed or proposed amount. Reconciled to the counter amount when a
    /// countered offer is accepted.
    pub amount: Decimal,
    pub message: Option<String>,
    pub status: OfferStatus,
    pub counter_amount: Option<Decimal>,
    pub counter_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Offer {
    /// Build a fresh pending offer.
    ///
    /// Callers must have already validated the amount and the
    /// buyer-is-not-seller rule; see `OfferNegotiationService::create_offer`.
    #[must_use]
    pub fn open(
        record_id: Uuid,
        buyer_id: UserId,
        seller_id: UserId,
        amount: Decimal,
        message: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            record_id,
            buyer_id,
            seller_id,
            amount,
            message,
            status: OfferStatus::Pending,
            counter_amount: None,
            counter_message: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// The amount settlement must charge: the reconciled offer amount.
    #[must_use]
    pub const fn settlement_amount(&self) -> Decimal {
        self.amount
    }
}
