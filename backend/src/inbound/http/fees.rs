//! Fee estimate HTTP handler.
//!
//! ```text
//! GET /api/v1/fees/estimate?amount=
//! ```
//!
//! The estimate and the settlement charge share [`crate::domain::FeePolicy`],
//! so the displayed quote can never diverge from the charged amount.

use actix_web::{get, web};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::domain::money::require_positive;
use crate::domain::{Error, FeeBreakdown, FeeTiers};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_amount};

/// Query parameters for the fee estimate.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FeeEstimateQuery {
    /// Offer amount to quote, e.g. `100.00`.
    pub amount: String,
    /// Whether the buyer holds a Pro membership (waives the buyer fee).
    #[serde(default)]
    pub buyer_is_pro: bool,
    /// Whether the seller holds a Pro membership.
    #[serde(default)]
    pub seller_is_pro: bool,
}

/// Quote the fee breakdown for an offer amount.
#[utoipa::path(
    get,
    path = "/api/v1/fees/estimate",
    params(
        ("amount" = String, Query, description = "Offer amount, e.g. 100.00"),
        ("buyerIsPro" = Option<bool>, Query, description = "Buyer holds a Pro membership"),
        ("sellerIsPro" = Option<bool>, Query, description = "Seller holds a Pro membership")
    ),
    responses(
        (status = 200, description = "Fee breakdown", body = FeeBreakdown),
        (status = 400, description = "Invalid amount", body = Error)
    ),
    tags = ["fees"],
    operation_id = "estimateFees"
)]
#[get("/fees/estimate")]
pub async fn estimate_fees(
    state: web::Data<HttpState>,
    query: web::Query<FeeEstimateQuery>,
) -> ApiResult<web::Json<FeeBreakdown>> {
    let query = query.into_inner();
    let amount = parse_amount(query.amount, FieldName::new("amount"))?;
    let amount = require_positive(amount, "amount")?;

    let breakdown = state.fee_policy.compute(
        amount,
        FeeTiers {
            buyer_is_pro: query.buyer_is_pro,
            seller_is_pro: query.seller_is_pro,
        },
    );

    Ok(web::Json(breakdown))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test, web};
    use serde_json::Value;

    use super::*;
    use crate::inbound::http::test_utils::TestPorts;

    fn test_app() -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(web::Data::new(TestPorts::default().into_state()))
            .service(web::scope("/api/v1").service(estimate_fees))
    }

    #[actix_web::test]
    async fn quotes_both_fees_for_free_tier_parties() {
        let app = actix_test::init_service(test_app()).await;

        let request = actix_test::TestRequest::get()
            .uri("/api/v1/fees/estimate?amount=100.00")
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["offerAmount"], "100.00");
        assert_eq!(body["buyerFee"], "4.00");
        assert_eq!(body["sellerFee"], "4.00");
        assert_eq!(body["total"], "104.00");
    }

    #[actix_web::test]
    async fn pro_buyer_pays_no_buyer_fee() {
        let app = actix_test::init_service(test_app()).await;

        let request = actix_test::TestRequest::get()
            .uri("/api/v1/fees/estimate?amount=100.00&buyerIsPro=true")
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["buyerFee"], "0.00");
        assert_eq!(body["sellerFee"], "4.00");
        assert_eq!(body["total"], "100.00");
    }

    #[actix_web::test]
    async fn rejects_non_positive_amounts() {
        let app = actix_test::init_service(test_app()).await;

        let request = actix_test::TestRequest::get()
            .uri("/api/v1/fees/estimate?amount=0")
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn rejects_non_numeric_amounts() {
        let app = actix_test::init_service(test_app()).await;

        let request = actix_test::TestRequest::get()
            .uri("/api/v1/fees/estimate?amount=lots")
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["details"]["code"], "invalid_amount");
    }
}
