//! Behavioural coverage for the listing catalogue service.

use std::sync::Arc;

use chrono::Utc;
use rstest::{fixture, rstest};
use rust_decimal_macros::dec;
use uuid::Uuid;

use super::*;
use crate::domain::ports::{MockListingRepository, NoOpEventPublisher};
use crate::domain::ErrorCode;

#[fixture]
fn request() -> CreateListingRequest {
    CreateListingRequest {
        seller_id: UserId::random(),
        album_name: "A Love Supreme".to_owned(),
        artist: "John Coltrane".to_owned(),
        condition: "NM".to_owned(),
        price: dec!(95.00),
        images: vec!["front.jpg".to_owned(), "back.jpg".to_owned()],
        description: Some("original pressing".to_owned()),
        genre: Some("Jazz".to_owned()),
        release_year: Some(1965),
    }
}

fn service(listings: MockListingRepository) -> ListingCatalogueService<MockListingRepository> {
    ListingCatalogueService::new(Arc::new(listings), Arc::new(NoOpEventPublisher))
}

#[rstest]
#[tokio::test]
async fn publishes_a_valid_listing(request: CreateListingRequest) {
    let mut listings = MockListingRepository::new();
    listings.expect_insert().returning(|_| Ok(()));

    let listing = service(listings)
        .create_listing(request)
        .await
        .expect("listing published");

    assert_eq!(listing.album_name(), "A Love Supreme");
    assert_eq!(listing.checkout_label(), "A Love Supreme by John Coltrane");
}

#[rstest]
#[tokio::test]
async fn rejects_a_single_photo(mut request: CreateListingRequest) {
    request.images = vec!["front.jpg".to_owned()];

    let err = service(MockListingRepository::new())
        .create_listing(request)
        .await
        .expect_err("one photo is not enough");

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[tokio::test]
async fn rejects_a_zero_price(mut request: CreateListingRequest) {
    request.price = dec!(0);

    let err = service(MockListingRepository::new())
        .create_listing(request)
        .await
        .expect_err("free records are not listings");

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[tokio::test]
async fn deletes_an_unsold_listing() {
    let mut listings = MockListingRepository::new();
    listings.expect_delete_if_unsold().returning(|_, _| Ok(true));

    service(listings)
        .delete_listing(Uuid::new_v4(), UserId::random())
        .await
        .expect("unsold listing deleted");
}

#[rstest]
#[tokio::test]
async fn sold_listings_cannot_be_deleted(request: CreateListingRequest) {
    let seller = request.seller_id;
    let now = Utc::now();
    let listing = Listing::new(ListingDraft {
        id: Uuid::new_v4(),
        seller_id: seller,
        album_name: request.album_name,
        artist: request.artist,
        condition: request.condition,
        price: request.price,
        images: request.images,
        description: request.description,
        genre: request.genre,
        release_year: request.release_year,
        created_at: now,
        updated_at: now,
    })
    .expect("valid listing fixture");
    let listing_id = listing.id();

    let mut listings = MockListingRepository::new();
    listings
        .expect_delete_if_unsold()
        .returning(|_, _| Ok(false));
    listings
        .expect_find_by_id()
        .returning(move |_| Ok(Some(listing.clone())));

    let err = service(listings)
        .delete_listing(listing_id, seller)
        .await
        .expect_err("sold listing is locked");

    assert_eq!(err.code(), ErrorCode::InvalidState);
}

#[rstest]
#[tokio::test]
async fn only_the_owner_may_delete(request: CreateListingRequest) {
    let now = Utc::now();
    let listing = Listing::new(ListingDraft {
        id: Uuid::new_v4(),
        seller_id: request.seller_id,
        album_name: request.album_name,
        artist: request.artist,
        condition: request.condition,
        price: request.price,
        images: request.images,
        description: request.description,
        genre: request.genre,
        release_year: request.release_year,
        created_at: now,
        updated_at: now,
    })
    .expect("valid listing fixture");
    let listing_id = listing.id();

    let mut listings = MockListingRepository::new();
    listings
        .expect_delete_if_unsold()
        .returning(|_, _| Ok(false));
    listings
        .expect_find_by_id()
        .returning(move |_| Ok(Some(listing.clone())));

    let err = service(listings)
        .delete_listing(listing_id, UserId::random())
        .await
        .expect_err("stranger delete rejected");

    assert_eq!(err.code(), ErrorCode::Forbidden);
}

#[rstest]
#[tokio::test]
async fn deleting_a_missing_listing_is_not_found() {
    let mut listings = MockListingRepository::new();
    listings
        .expect_delete_if_unsold()
        .returning(|_, _| Ok(false));
    listings.expect_find_by_id().returning(|_| Ok(None));

    let err = service(listings)
        .delete_listing(Uuid::new_v4(), UserId::random())
        .await
        .expect_err("unknown listing rejected");

    assert_eq!(err.code(), ErrorCode::NotFound);
}
