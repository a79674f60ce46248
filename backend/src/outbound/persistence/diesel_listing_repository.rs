//! PostgreSQL-backed `ListingRepository` implementation using Diesel.

use async_trait::async_trait;
use diesel::dsl::{exists, not};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{ListingRepository, ListingRepositoryError};
use crate::domain::{Listing, OrderStatus, UserId};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{NewVinylRecordRow, VinylRecordRow};
use super::pool::{DbPool, PoolError};
use super::schema::{orders, vinyl_records};

/// Diesel-backed implementation of the listing repository port.
#[derive(Clone)]
pub struct DieselListingRepository {
    pool: DbPool,
}

impl DieselListingRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> ListingRepositoryError {
    map_pool_error(error, ListingRepositoryError::connection)
}

fn diesel_error(error: diesel::result::Error) -> ListingRepositoryError {
    map_diesel_error(
        error,
        ListingRepositoryError::query,
        ListingRepositoryError::connection,
    )
}

fn rows_to_listings(rows: Vec<VinylRecordRow>) -> Result<Vec<Listing>, ListingRepositoryError> {
    rows.into_iter()
        .map(|row| Listing::try_from(row).map_err(|err| ListingRepositoryError::query(err.to_string())))
        .collect()
}

#[async_trait]
impl ListingRepository for DieselListingRepository {
    async fn insert(&self, listing: &Listing) -> Result<(), ListingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        diesel::insert_into(vinyl_records::table)
            .values(NewVinylRecordRow::from_domain(listing))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(diesel_error)
    }

    async fn find_by_id(
        &self,
        listing_id: Uuid,
    ) -> Result<Option<Listing>, ListingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let row = vinyl_records::table
            .filter(vinyl_records::id.eq(listing_id))
            .select(VinylRecordRow::as_select())
            .first::<VinylRecordRow>(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;

        row.map(|row| {
            Listing::try_from(row).map_err(|err| ListingRepositoryError::query(err.to_string()))
        })
        .transpose()
    }

    async fn list_recent(&self, limit: i64) -> Result<Vec<Listing>, ListingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let rows = vinyl_records::table
            .order(vinyl_records::created_at.desc())
            .limit(limit)
            .select(VinylRecordRow::as_select())
            .load::<VinylRecordRow>(&mut conn)
            .await
            .map_err(diesel_error)?;

        rows_to_listings(rows)
    }

    async fn list_for_seller(
        &self,
        seller_id: &UserId,
    ) -> Result<Vec<Listing>, ListingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let rows = vinyl_records::table
            .filter(vinyl_records::seller_id.eq(seller_id.as_uuid()))
            .order(vinyl_records::created_at.desc())
            .select(VinylRecordRow::as_select())
            .load::<VinylRecordRow>(&mut conn)
            .await
            .map_err(diesel_error)?;

        rows_to_listings(rows)
    }

    async fn delete_if_unsold(
        &self,
        listing_id: Uuid,
        seller_id: &UserId,
    ) -> Result<bool, ListingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        // Ownership and the sold guard live in one statement so a racing
        // checkout cannot slip between a check and the delete.
        let deleted = diesel::delete(
            vinyl_records::table
                .filter(vinyl_records::id.eq(listing_id))
                .filter(vinyl_records::seller_id.eq(seller_id.as_uuid()))
                .filter(not(exists(
                    orders::table
                        .filter(orders::record_id.eq(listing_id))
                        .filter(orders::status.ne(OrderStatus::Cancelled.as_str())),
                ))),
        )
        .execute(&mut conn)
        .await
        .map_err(diesel_error)?;

        Ok(deleted > 0)
    }
}
