//! Read-only user profiles.
//!
//! Profiles are written by the external identity flow; this service only
//! reads them to back reviewer and reviewee displays.

use chrono::{DateTime, Utc};

use crate::domain::UserId;

/// Public-facing profile for one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub user_id: UserId,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    /// Completed orders where the user sold.
    pub total_sales: i32,
    /// Completed orders where the user bought.
    pub total_purchases: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
