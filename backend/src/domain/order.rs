//! Orders and the purchase lifecycle.
//!
//! An order is materialised when checkout begins for an accepted offer and
//! advances `pending_payment → paid → shipped → completed`. `cancelled` is an
//! administrative escape hatch reachable from any non-terminal state. Orders
//! are never deleted.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::UserId;
use crate::domain::fees::FeeBreakdown;

/// Lifecycle state of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Checkout session opened; awaiting payment confirmation.
    PendingPayment,
    /// Payment confirmed by the processor.
    Paid,
    /// The seller dispatched the record.
    Shipped,
    /// Both sides are done; reviews unlock. Terminal.
    Completed,
    /// Administratively cancelled. Terminal.
    Cancelled,
}

impl OrderStatus {
    /// Stable storage representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PendingPayment => "pending_payment",
            Self::Paid => "paid",
            Self::Shipped => "shipped",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether the state admits no further transitions.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// States from which cancellation is still possible.
    #[must_use]
    pub const fn cancellable() -> [Self; 3] {
        [Self::PendingPayment, Self::Paid, Self::Shipped]
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when decoding an unknown status string from the store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown order status: {value}")]
pub struct UnknownOrderStatus {
    /// The rejected raw value.
    pub value: String,
}

impl FromStr for OrderStatus {
    type Err = UnknownOrderStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending_payment" => Ok(Self::PendingPayment),
            "paid" => Ok(Self::Paid),
            "shipped" => Ok(Self::Shipped),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(UnknownOrderStatus {
                value: other.to_owned(),
            }),
        }
    }
}

/// Financial and shipping record for a settled negotiation.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: Uuid,
    pub offer_id: Uuid,
    pub record_id: Uuid,
    pub buyer_id: UserId,
    pub seller_id: UserId,
    pub offer_amount: Decimal,
    pub buyer_fee: Decimal,
    pub seller_fee: Decimal,
    /// Invariant: `total_amount == offer_amount + buyer_fee`.
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub tracking_number: Option<String>,
    pub notes: Option<String>,
    pub payment_session_id: Option<String>,
    pub payment_intent_id: Option<String>,
    pub shipping_address: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Build a `pending_payment` order from the accepted offer's fee
    /// breakdown and an opened checkout session.
    ///
    /// The fees are recorded verbatim and never recomputed at verification
    /// time, so the charged amount always matches the quote.
    #[must_use]
    pub fn pending_payment(
        offer_id: Uuid,
        record_id: Uuid,
        buyer_id: UserId,
        seller_id: UserId,
        fees: &FeeBreakdown,
        payment_session_id: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            offer_id,
            record_id,
            buyer_id,
            seller_id,
            offer_amount: fees.offer_amount,
            buyer_fee: fees.buyer_fee,
            seller_fee: fees.seller_fee,
            total_amount: fees.total,
            status: OrderStatus::PendingPayment,
            tracking_number: None,
            notes: None,
            payment_session_id: Some(payment_session_id),
            payment_intent_id: None,
            shipping_address: None,
            created_at: now,
            updated_at: now,
        }
    }
}
