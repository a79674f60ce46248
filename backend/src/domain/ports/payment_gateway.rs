//! Port for the external payment processor.
//!
//! Settlement opens a hosted checkout session for the fee-inclusive total
//! and later asks the processor whether that session was paid. The processor
//! is the source of truth for payment state; the domain only mirrors it into
//! order rows.

use async_trait::async_trait;
use rust_decimal::Decimal;
use url::Url;
use uuid::Uuid;

use super::define_port_error;

define_port_error! {
    /// Errors raised by payment gateway adapters.
    pub enum PaymentGatewayError {
        /// The processor did not answer within the bounded timeout.
        Timeout { message: String } =>
            "payment processor timed out: {message}",
        /// Network or protocol failure talking to the processor.
        Transport { message: String } =>
            "payment processor transport failure: {message}",
        /// The processor rejected the request as malformed.
        InvalidRequest { message: String } =>
            "payment processor rejected the request: {message}",
        /// The processor's response could not be decoded.
        Decode { message: String } =>
            "payment processor response could not be decoded: {message}",
    }
}

/// Everything needed to open a hosted checkout session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSessionRequest {
    /// Fee-inclusive amount the buyer will be charged.
    pub total: Decimal,
    /// Human-readable line item, e.g. `"Blue Train by John Coltrane"`.
    pub description: String,
    /// Identifiers attached to the session for reconciliation.
    pub metadata: CheckoutMetadata,
    /// Where the processor redirects after payment.
    pub success_url: Url,
    /// Where the processor redirects on abandonment.
    pub cancel_url: Url,
}

/// Reconciliation identifiers carried on the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckoutMetadata {
    pub offer_id: Uuid,
    pub record_id: Uuid,
    pub buyer_id: Uuid,
    pub seller_id: Uuid,
}

/// An opened checkout session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSession {
    /// Processor-assigned session identifier.
    pub id: String,
    /// Hosted payment page the buyer is redirected to.
    pub url: String,
}

/// Payment state reported by the processor for a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStatus {
    /// Raw processor status, e.g. `"paid"` or `"unpaid"`.
    pub payment_status: String,
    /// Payment intent identifier, present once payment is captured.
    pub payment_intent_id: Option<String>,
}

impl SessionStatus {
    /// Whether the processor reports the session as paid.
    #[must_use]
    pub fn is_paid(&self) -> bool {
        self.payment_status == "paid"
    }
}

/// Port for creating and inspecting checkout sessions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Open a hosted checkout session for the given total.
    async fn create_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> Result<CheckoutSession, PaymentGatewayError>;

    /// Fetch the current payment state of a session.
    async fn retrieve_session(
        &self,
        session_id: &str,
    ) -> Result<SessionStatus, PaymentGatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paid_detection_is_exact() {
        let paid = SessionStatus {
            payment_status: "paid".to_owned(),
            payment_intent_id: Some("pi_1".to_owned()),
        };
        let unpaid = SessionStatus {
            payment_status: "unpaid".to_owned(),
            payment_intent_id: None,
        };
        assert!(paid.is_paid());
        assert!(!unpaid.is_paid());
    }
}
