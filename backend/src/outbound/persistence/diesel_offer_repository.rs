//! PostgreSQL-backed `OfferRepository` implementation using Diesel.
//!
//! Every status transition is a single conditional `UPDATE ... RETURNING`
//! keyed on the expected current status, so concurrent responders cannot
//! both win: the loser's update matches zero rows and surfaces as `None`.

use async_trait::async_trait;
use diesel::define_sql_function;
use diesel::prelude::*;
use diesel::sql_types::{Numeric, Nullable};
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{OfferRepository, OfferRepositoryError};
use crate::domain::{Offer, OfferResponse, OfferStatus, UserId};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{NewOfferRow, OfferRow};
use super::pool::{DbPool, PoolError};
use super::schema::offers;

define_sql_function! {
    /// SQL COALESCE over a nullable numeric, used to reconcile the accepted
    /// amount to the standing counter amount inside the transition statement.
    fn coalesce(x: Nullable<Numeric>, y: Numeric) -> Numeric;
}

/// Diesel-backed implementation of the offer repository port.
#[derive(Clone)]
pub struct DieselOfferRepository {
    pool: DbPool,
}

impl DieselOfferRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> OfferRepositoryError {
    map_pool_error(error, OfferRepositoryError::connection)
}

fn diesel_error(error: diesel::result::Error) -> OfferRepositoryError {
    map_diesel_error(
        error,
        OfferRepositoryError::query,
        OfferRepositoryError::connection,
    )
}

fn decode(row: OfferRow) -> Result<Offer, OfferRepositoryError> {
    Offer::try_from(row).map_err(|err| OfferRepositoryError::query(err.to_string()))
}

fn decode_optional(row: Option<OfferRow>) -> Result<Option<Offer>, OfferRepositoryError> {
    row.map(decode).transpose()
}

fn respondable_statuses() -> [&'static str; 2] {
    OfferStatus::respondable().map(|status| status.as_str())
}

#[async_trait]
impl OfferRepository for DieselOfferRepository {
    async fn insert(&self, offer: &Offer) -> Result<(), OfferRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        diesel::insert_into(offers::table)
            .values(NewOfferRow::from_domain(offer))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(diesel_error)
    }

    async fn find_by_id(&self, offer_id: Uuid) -> Result<Option<Offer>, OfferRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let row = offers::table
            .filter(offers::id.eq(offer_id))
            .select(OfferRow::as_select())
            .first::<OfferRow>(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;

        decode_optional(row)
    }

    async fn list_for_buyer(
        &self,
        buyer_id: &UserId,
    ) -> Result<Vec<Offer>, OfferRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let rows = offers::table
            .filter(offers::buyer_id.eq(buyer_id.as_uuid()))
            .order(offers::created_at.desc())
            .select(OfferRow::as_select())
            .load::<OfferRow>(&mut conn)
            .await
            .map_err(diesel_error)?;

        rows.into_iter().map(decode).collect()
    }

    async fn list_for_seller(
        &self,
        seller_id: &UserId,
    ) -> Result<Vec<Offer>, OfferRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let rows = offers::table
            .filter(offers::seller_id.eq(seller_id.as_uuid()))
            .order(offers::created_at.desc())
            .select(OfferRow::as_select())
            .load::<OfferRow>(&mut conn)
            .await
            .map_err(diesel_error)?;

        rows.into_iter().map(decode).collect()
    }

    async fn apply_response(
        &self,
        offer_id: Uuid,
        response: &OfferResponse,
    ) -> Result<Option<Offer>, OfferRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let target = offers::table
            .filter(offers::id.eq(offer_id))
            .filter(offers::status.eq_any(respondable_statuses()));

        let row = match response {
            OfferResponse::Accept => {
                diesel::update(target)
                    .set((
                        offers::status.eq(OfferStatus::Accepted.as_str()),
                        offers::amount.eq(coalesce(offers::counter_amount, offers::amount)),
                        offers::updated_at.eq(diesel::dsl::now),
                    ))
                    .returning(OfferRow::as_returning())
                    .get_result::<OfferRow>(&mut conn)
                    .await
                    .optional()
            }
            OfferResponse::Deny => {
                diesel::update(target)
                    .set((
                        offers::status.eq(OfferStatus::Denied.as_str()),
                        offers::updated_at.eq(diesel::dsl::now),
                    ))
                    .returning(OfferRow::as_returning())
                    .get_result::<OfferRow>(&mut conn)
                    .await
                    .optional()
            }
            OfferResponse::Counter { amount, message } => {
                diesel::update(target)
                    .set((
                        offers::status.eq(OfferStatus::Countered.as_str()),
                        offers::counter_amount.eq(amount),
                        offers::counter_message.eq(message.as_deref()),
                        offers::updated_at.eq(diesel::dsl::now),
                    ))
                    .returning(OfferRow::as_returning())
                    .get_result::<OfferRow>(&mut conn)
                    .await
                    .optional()
            }
        }
        .map_err(diesel_error)?;

        decode_optional(row)
    }

    async fn accept_counter(
        &self,
        offer_id: Uuid,
    ) -> Result<Option<Offer>, OfferRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let row = diesel::update(
            offers::table
                .filter(offers::id.eq(offer_id))
                .filter(offers::status.eq(OfferStatus::Countered.as_str())),
        )
        .set((
            offers::status.eq(OfferStatus::Accepted.as_str()),
            offers::amount.eq(coalesce(offers::counter_amount, offers::amount)),
            offers::updated_at.eq(diesel::dsl::now),
        ))
        .returning(OfferRow::as_returning())
        .get_result::<OfferRow>(&mut conn)
        .await
        .optional()
        .map_err(diesel_error)?;

        decode_optional(row)
    }

    async fn decline_counter(
        &self,
        offer_id: Uuid,
    ) -> Result<Option<Offer>, OfferRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let row = diesel::update(
            offers::table
                .filter(offers::id.eq(offer_id))
                .filter(offers::status.eq(OfferStatus::Countered.as_str())),
        )
        .set((
            offers::status.eq(OfferStatus::Denied.as_str()),
            offers::updated_at.eq(diesel::dsl::now),
        ))
        .returning(OfferRow::as_returning())
        .get_result::<OfferRow>(&mut conn)
        .await
        .optional()
        .map_err(diesel_error)?;

        decode_optional(row)
    }

    async fn complete_accepted(
        &self,
        offer_id: Uuid,
    ) -> Result<Option<Offer>, OfferRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let row = diesel::update(
            offers::table
                .filter(offers::id.eq(offer_id))
                .filter(offers::status.eq(OfferStatus::Accepted.as_str())),
        )
        .set((
            offers::status.eq(OfferStatus::Completed.as_str()),
            offers::updated_at.eq(diesel::dsl::now),
        ))
        .returning(OfferRow::as_returning())
        .get_result::<OfferRow>(&mut conn)
        .await
        .optional()
        .map_err(diesel_error)?;

        decode_optional(row)
    }
}
