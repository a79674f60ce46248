//! Behavioural coverage for the review ledger service.

use std::sync::Arc;

use rstest::rstest;
use rust_decimal_macros::dec;
use uuid::Uuid;

use super::*;
use crate::domain::fees::{FeePolicy, FeeTiers};
use crate::domain::ports::{MockOrderRepository, MockReviewRepository, NoOpEventPublisher};
use crate::domain::{ErrorCode, Order};

fn completed_order(buyer: UserId, seller: UserId) -> Order {
    let fees = FeePolicy::default().compute(dec!(40.00), FeeTiers::default());
    let mut order = Order::pending_payment(
        Uuid::new_v4(),
        Uuid::new_v4(),
        buyer,
        seller,
        &fees,
        "cs_review".to_owned(),
    );
    order.status = OrderStatus::Completed;
    order
}

fn ratings() -> ReviewRatings {
    ReviewRatings::new(5, 4, 5, 4).expect("valid ratings fixture")
}

fn service(
    reviews: MockReviewRepository,
    orders: MockOrderRepository,
) -> ReviewLedgerService<MockReviewRepository, MockOrderRepository> {
    ReviewLedgerService::new(
        Arc::new(reviews),
        Arc::new(orders),
        Arc::new(NoOpEventPublisher),
    )
}

#[rstest]
#[tokio::test]
async fn buyer_review_targets_the_seller() {
    let buyer = UserId::random();
    let seller = UserId::random();
    let order = completed_order(buyer, seller);
    let order_id = order.id;

    let mut orders = MockOrderRepository::new();
    orders
        .expect_find_by_id()
        .returning(move |_| Ok(Some(order.clone())));
    let mut reviews = MockReviewRepository::new();
    reviews.expect_insert().returning(|_| Ok(()));

    let review = service(reviews, orders)
        .submit_review(SubmitReviewRequest {
            order_id,
            reviewer_id: buyer,
            ratings: ratings(),
            review_text: Some("arrived well packed".to_owned()),
        })
        .await
        .expect("buyer review accepted");

    assert_eq!(review.reviewer_type, ReviewerType::Buyer);
    assert_eq!(review.reviewee_id, seller);
}

#[rstest]
#[tokio::test]
async fn seller_review_targets_the_buyer() {
    let buyer = UserId::random();
    let seller = UserId::random();
    let order = completed_order(buyer, seller);
    let order_id = order.id;

    let mut orders = MockOrderRepository::new();
    orders
        .expect_find_by_id()
        .returning(move |_| Ok(Some(order.clone())));
    let mut reviews = MockReviewRepository::new();
    reviews.expect_insert().returning(|_| Ok(()));

    let review = service(reviews, orders)
        .submit_review(SubmitReviewRequest {
            order_id,
            reviewer_id: seller,
            ratings: ratings(),
            review_text: None,
        })
        .await
        .expect("seller review accepted");

    assert_eq!(review.reviewer_type, ReviewerType::Seller);
    assert_eq!(review.reviewee_id, buyer);
}

#[rstest]
#[tokio::test]
async fn strangers_cannot_review() {
    let order = completed_order(UserId::random(), UserId::random());
    let order_id = order.id;

    let mut orders = MockOrderRepository::new();
    orders
        .expect_find_by_id()
        .returning(move |_| Ok(Some(order.clone())));

    let err = service(MockReviewRepository::new(), orders)
        .submit_review(SubmitReviewRequest {
            order_id,
            reviewer_id: UserId::random(),
            ratings: ratings(),
            review_text: None,
        })
        .await
        .expect_err("stranger review rejected");

    assert_eq!(err.code(), ErrorCode::Forbidden);
}

#[rstest]
#[case(OrderStatus::PendingPayment)]
#[case(OrderStatus::Paid)]
#[case(OrderStatus::Shipped)]
#[case(OrderStatus::Cancelled)]
#[tokio::test]
async fn reviews_unlock_only_on_completion(#[case] status: OrderStatus) {
    let buyer = UserId::random();
    let mut order = completed_order(buyer, UserId::random());
    order.status = status;
    let order_id = order.id;

    let mut orders = MockOrderRepository::new();
    orders
        .expect_find_by_id()
        .returning(move |_| Ok(Some(order.clone())));

    let err = service(MockReviewRepository::new(), orders)
        .submit_review(SubmitReviewRequest {
            order_id,
            reviewer_id: buyer,
            ratings: ratings(),
            review_text: None,
        })
        .await
        .expect_err("incomplete order cannot be reviewed");

    assert_eq!(err.code(), ErrorCode::InvalidState);
}

#[rstest]
#[tokio::test]
async fn second_review_per_order_is_a_conflict() {
    let buyer = UserId::random();
    let order = completed_order(buyer, UserId::random());
    let order_id = order.id;

    let mut orders = MockOrderRepository::new();
    orders
        .expect_find_by_id()
        .returning(move |_| Ok(Some(order.clone())));
    let mut reviews = MockReviewRepository::new();
    reviews.expect_insert().returning(move |review| {
        Err(ReviewRepositoryError::Duplicate {
            order_id: review.order_id,
            reviewer_id: *review.reviewer_id.as_uuid(),
        })
    });

    let err = service(reviews, orders)
        .submit_review(SubmitReviewRequest {
            order_id,
            reviewer_id: buyer,
            ratings: ratings(),
            review_text: None,
        })
        .await
        .expect_err("duplicate review rejected");

    assert_eq!(err.code(), ErrorCode::Conflict);
}

#[rstest]
#[tokio::test]
async fn stats_pass_through_the_aggregate() {
    let reviewee = UserId::random();
    let mut reviews = MockReviewRepository::new();
    reviews
        .expect_rating_stats()
        .returning(|_| Ok(RatingStats::empty()));

    let stats = service(reviews, MockOrderRepository::new())
        .rating_stats(reviewee)
        .await
        .expect("stats for unreviewed user");

    assert_eq!(stats.total_reviews, 0);
    assert_eq!(stats.overall_avg, rust_decimal::Decimal::ZERO);
}
