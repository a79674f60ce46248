//! Marketplace transaction fee computation.
//!
//! `FeePolicy` is the single source of truth for fee arithmetic: the fee
//! estimate endpoint and the settlement path both call it, so the quoted and
//! charged amounts can never diverge.

use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::money::round_money;

/// Membership tiers of the two transaction parties.
///
/// Pro membership waives the buyer-side fee. The seller-side fee is charged
/// regardless of tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeeTiers {
    /// Whether the buyer holds a Pro membership.
    pub buyer_is_pro: bool,
    /// Whether the seller holds a Pro membership.
    pub seller_is_pro: bool,
}

/// Result of fee computation for one transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FeeBreakdown {
    /// The negotiated offer amount.
    #[schema(value_type = String, example = "100.00")]
    pub offer_amount: Decimal,
    /// Fee charged to the buyer on top of the offer amount.
    #[schema(value_type = String, example = "4.00")]
    pub buyer_fee: Decimal,
    /// Fee deducted from the seller's proceeds.
    #[schema(value_type = String, example = "4.00")]
    pub seller_fee: Decimal,
    /// Amount the buyer is charged: `offer_amount + buyer_fee`.
    #[schema(value_type = String, example = "104.00")]
    pub total: Decimal,
}

/// Fee policy with a single injected rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeePolicy {
    rate: Decimal,
}

impl Default for FeePolicy {
    fn default() -> Self {
        // 4% on each side of the transaction.
        Self {
            rate: Decimal::new(4, 2),
        }
    }
}

impl FeePolicy {
    /// Build a policy with an explicit rate (e.g. `0.04` for 4%).
    #[must_use]
    pub const fn new(rate: Decimal) -> Self {
        Self { rate }
    }

    /// The configured fee rate.
    #[must_use]
    pub const fn rate(&self) -> Decimal {
        self.rate
    }

    /// Compute both fees and the buyer total for an offer amount.
    ///
    /// The caller is responsible for ensuring `amount > 0`; see
    /// [`crate::domain::money::require_positive`].
    ///
    /// # Examples
    /// ```
    /// use backend::domain::fees::{FeePolicy, FeeTiers};
    /// use rust_decimal::Decimal;
    ///
    /// let fees = FeePolicy::default().compute(Decimal::new(10000, 2), FeeTiers::default());
    /// assert_eq!(fees.buyer_fee, Decimal::new(400, 2));
    /// assert_eq!(fees.total, Decimal::new(10400, 2));
    /// ```
    #[must_use]
    pub fn compute(&self, amount: Decimal, tiers: FeeTiers) -> FeeBreakdown {
        let base_fee = round_money(amount * self.rate);
        // A scale-2 zero so a waived fee still serialises as "0.00".
        let buyer_fee = if tiers.buyer_is_pro {
            Decimal::new(0, crate::domain::money::MONEY_SCALE)
        } else {
            base_fee
        };
        // Seller fee applies to all tiers.
        let seller_fee = base_fee;

        FeeBreakdown {
            offer_amount: amount,
            buyer_fee,
            seller_fee,
            total: round_money(amount + buyer_fee),
        }
    }
}
