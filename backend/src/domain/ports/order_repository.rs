//! Port for order persistence and conditional status transitions.
//!
//! Like the offer port, every transition is a single compare-and-set
//! statement; `None` means no row matched the expected state.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Order, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by order repository adapters.
    pub enum OrderRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "order repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "order repository query failed: {message}",
        /// A non-cancelled order already exists for this offer.
        DuplicateOffer { offer_id: Uuid } =>
            "a live order already exists for offer {offer_id}",
    }
}

/// Port for order persistence.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Persist a new `pending_payment` order. At most one non-cancelled
    /// order may exist per offer (unique index); the adapter maps that
    /// violation to [`OrderRepositoryError::DuplicateOffer`].
    async fn insert(&self, order: &Order) -> Result<(), OrderRepositoryError>;

    /// Find an order by id.
    async fn find_by_id(&self, order_id: Uuid) -> Result<Option<Order>, OrderRepositoryError>;

    /// Find an order by its checkout session id.
    async fn find_by_session(
        &self,
        session_id: &str,
    ) -> Result<Option<Order>, OrderRepositoryError>;

    /// Orders where the user is buyer or seller, newest first.
    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Order>, OrderRepositoryError>;

    /// Confirm payment: `pending_payment → paid`, keyed by session id and
    /// recording the payment intent. Returns `None` when no order is in
    /// `pending_payment` for that session (already paid, or unknown).
    async fn mark_paid(
        &self,
        session_id: &str,
        payment_intent_id: &str,
    ) -> Result<Option<Order>, OrderRepositoryError>;

    /// `paid → shipped`, setting tracking number and notes.
    async fn mark_shipped(
        &self,
        order_id: Uuid,
        tracking_number: Option<String>,
        notes: Option<String>,
    ) -> Result<Option<Order>, OrderRepositoryError>;

    /// `shipped → completed`.
    async fn mark_completed(&self, order_id: Uuid)
    -> Result<Option<Order>, OrderRepositoryError>;

    /// Any non-terminal state → `cancelled`.
    async fn cancel(&self, order_id: Uuid) -> Result<Option<Order>, OrderRepositoryError>;
}
