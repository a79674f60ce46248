//! PostgreSQL-backed `MembershipQuery` implementation using Diesel.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::UserId;
use crate::domain::ports::{MembershipQuery, MembershipQueryError};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::pool::{DbPool, PoolError};
use super::schema::subscribers;

/// Diesel-backed membership lookup against the subscribers table.
#[derive(Clone)]
pub struct DieselMembershipQuery {
    pool: DbPool,
}

impl DieselMembershipQuery {
    /// Create a new query adapter with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> MembershipQueryError {
    map_pool_error(error, MembershipQueryError::connection)
}

fn diesel_error(error: diesel::result::Error) -> MembershipQueryError {
    map_diesel_error(
        error,
        MembershipQueryError::query,
        MembershipQueryError::connection,
    )
}

#[async_trait]
impl MembershipQuery for DieselMembershipQuery {
    async fn is_pro(&self, user_id: &UserId) -> Result<bool, MembershipQueryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        // A user without a subscriber row is a free-tier member.
        let subscribed = subscribers::table
            .filter(subscribers::user_id.eq(user_id.as_uuid()))
            .select(subscribers::subscribed)
            .first::<bool>(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;

        Ok(subscribed.unwrap_or(false))
    }
}
