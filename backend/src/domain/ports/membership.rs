//! Port for membership tier lookups.

use async_trait::async_trait;

use crate::domain::UserId;

use super::define_port_error;

define_port_error! {
    /// Errors raised by membership adapters.
    pub enum MembershipQueryError {
        /// Backing store could not be reached.
        Connection { message: String } =>
            "membership lookup connection failed: {message}",
        /// Query failed during execution.
        Query { message: String } =>
            "membership lookup failed: {message}",
    }
}

/// Port answering whether a user holds an active Pro membership.
///
/// Pro membership only affects fee computation (the buyer fee is waived);
/// it never gates negotiation or order operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MembershipQuery: Send + Sync {
    /// Whether the user currently holds a Pro subscription.
    async fn is_pro(&self, user_id: &UserId) -> Result<bool, MembershipQueryError>;
}

/// Fixture treating every user as a free-tier member.
#[derive(Debug, Default, Clone, Copy)]
pub struct FreeTierMembership;

#[async_trait]
impl MembershipQuery for FreeTierMembership {
    async fn is_pro(&self, _user_id: &UserId) -> Result<bool, MembershipQueryError> {
        Ok(false)
    }
}
