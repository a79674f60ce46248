//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly; Diesel uses
//! them for compile-time query validation and type-safe SQL generation.

diesel::table! {
    /// Vinyl record listings offered for sale.
    vinyl_records (id) {
        id -> Uuid,
        seller_id -> Uuid,
        album_name -> Varchar,
        artist -> Varchar,
        condition -> Varchar,
        price -> Numeric,
        images -> Array<Text>,
        description -> Nullable<Text>,
        genre -> Nullable<Varchar>,
        release_year -> Nullable<Int4>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Negotiation offers against listings. Status transitions are applied
    /// with conditional updates keyed on the current status.
    offers (id) {
        id -> Uuid,
        record_id -> Uuid,
        buyer_id -> Uuid,
        seller_id -> Uuid,
        amount -> Numeric,
        message -> Nullable<Text>,
        status -> Varchar,
        counter_amount -> Nullable<Numeric>,
        counter_message -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Purchase orders. Fee columns are copied verbatim from the quoted
    /// breakdown at checkout time.
    orders (id) {
        id -> Uuid,
        offer_id -> Uuid,
        record_id -> Uuid,
        buyer_id -> Uuid,
        seller_id -> Uuid,
        offer_amount -> Numeric,
        buyer_fee -> Numeric,
        seller_fee -> Numeric,
        total_amount -> Numeric,
        status -> Varchar,
        tracking_number -> Nullable<Varchar>,
        notes -> Nullable<Text>,
        payment_session_id -> Nullable<Varchar>,
        payment_intent_id -> Nullable<Varchar>,
        shipping_address -> Nullable<Jsonb>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Post-transaction reviews, unique per (order, reviewer).
    reviews (id) {
        id -> Uuid,
        order_id -> Uuid,
        reviewer_id -> Uuid,
        reviewee_id -> Uuid,
        reviewer_type -> Varchar,
        overall_rating -> Int2,
        communication_rating -> Int2,
        item_accuracy_rating -> Int2,
        shipping_rating -> Int2,
        review_text -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// User profiles, maintained by the identity flow. Read-only here.
    profiles (id) {
        id -> Uuid,
        user_id -> Uuid,
        display_name -> Varchar,
        avatar_url -> Nullable<Varchar>,
        bio -> Nullable<Text>,
        total_sales -> Int4,
        total_purchases -> Int4,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Membership subscriptions, maintained by the billing flow.
    subscribers (id) {
        id -> Uuid,
        user_id -> Uuid,
        subscribed -> Bool,
        subscription_tier -> Nullable<Varchar>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::allow_tables_to_appear_in_same_query!(
    vinyl_records,
    offers,
    orders,
    reviews,
    profiles,
    subscribers
);
