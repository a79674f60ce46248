//! Reqwest-backed Stripe Checkout gateway adapter.
//!
//! This adapter owns transport details only: form serialisation for the
//! Checkout Sessions API, timeout and HTTP status mapping, and JSON decoding
//! into the domain session types. Amounts cross the wire in minor units.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Deserialize;

use crate::domain::money::round_money;
use crate::domain::ports::{
    CheckoutSession, CheckoutSessionRequest, PaymentGateway, PaymentGatewayError, SessionStatus,
};

const DEFAULT_API_BASE: &str = "https://api.stripe.com/v1/";
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const CHECKOUT_CURRENCY: &str = "usd";

/// Stripe Checkout gateway performing HTTPS requests against one API base.
pub struct StripeCheckoutGateway {
    client: Client,
    api_base: Url,
    secret_key: String,
}

impl StripeCheckoutGateway {
    /// Build a gateway against the public Stripe API with a 10 second
    /// request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed or the
    /// default API base fails to parse.
    pub fn new(secret_key: impl Into<String>) -> Result<Self, StripeGatewayBuildError> {
        let api_base = Url::parse(DEFAULT_API_BASE).map_err(|err| StripeGatewayBuildError {
            message: err.to_string(),
        })?;
        Self::with_api_base(secret_key, api_base, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Build a gateway with an explicit API base and request timeout. Used
    /// by tests pointing at a local stub server.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn with_api_base(
        secret_key: impl Into<String>,
        api_base: Url,
        timeout: Duration,
    ) -> Result<Self, StripeGatewayBuildError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| StripeGatewayBuildError {
                message: err.to_string(),
            })?;
        Ok(Self {
            client,
            api_base,
            secret_key: secret_key.into(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, PaymentGatewayError> {
        self.api_base
            .join(path)
            .map_err(|err| PaymentGatewayError::invalid_request(err.to_string()))
    }
}

/// Error building the gateway at startup.
#[derive(Debug, Clone, thiserror::Error)]
#[error("failed to build Stripe gateway: {message}")]
pub struct StripeGatewayBuildError {
    message: String,
}

/// Convert a rounded money amount into integer minor units.
fn to_minor_units(amount: Decimal) -> Result<i64, PaymentGatewayError> {
    (round_money(amount) * Decimal::ONE_HUNDRED)
        .to_i64()
        .ok_or_else(|| {
            PaymentGatewayError::invalid_request(format!(
                "amount {amount} does not fit in minor units"
            ))
        })
}

fn map_transport_error(error: reqwest::Error) -> PaymentGatewayError {
    if error.is_timeout() {
        PaymentGatewayError::timeout(error.to_string())
    } else {
        PaymentGatewayError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> PaymentGatewayError {
    let preview = body_preview(body);
    let message = if preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {}", status.as_u16(), preview)
    };

    match status {
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            PaymentGatewayError::timeout(message)
        }
        _ if status.is_client_error() => PaymentGatewayError::invalid_request(message),
        _ => PaymentGatewayError::transport(message),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

/// Subset of the Checkout Session resource this adapter consumes.
#[derive(Debug, Deserialize)]
struct CheckoutSessionDto {
    id: String,
    url: Option<String>,
    payment_status: Option<String>,
    payment_intent: Option<String>,
}

fn parse_session(body: &[u8]) -> Result<CheckoutSessionDto, PaymentGatewayError> {
    serde_json::from_slice(body).map_err(|err| {
        PaymentGatewayError::decode(format!("invalid checkout session payload: {err}"))
    })
}

fn build_create_form(
    request: &CheckoutSessionRequest,
) -> Result<Vec<(&'static str, String)>, PaymentGatewayError> {
    let unit_amount = to_minor_units(request.total)?;
    Ok(vec![
        ("mode", "payment".to_owned()),
        ("success_url", request.success_url.to_string()),
        ("cancel_url", request.cancel_url.to_string()),
        ("line_items[0][quantity]", "1".to_owned()),
        (
            "line_items[0][price_data][currency]",
            CHECKOUT_CURRENCY.to_owned(),
        ),
        (
            "line_items[0][price_data][unit_amount]",
            unit_amount.to_string(),
        ),
        (
            "line_items[0][price_data][product_data][name]",
            request.description.clone(),
        ),
        ("metadata[offer_id]", request.metadata.offer_id.to_string()),
        (
            "metadata[record_id]",
            request.metadata.record_id.to_string(),
        ),
        ("metadata[buyer_id]", request.metadata.buyer_id.to_string()),
        (
            "metadata[seller_id]",
            request.metadata.seller_id.to_string(),
        ),
    ])
}

#[async_trait]
impl PaymentGateway for StripeCheckoutGateway {
    async fn create_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> Result<CheckoutSession, PaymentGatewayError> {
        let form = build_create_form(request)?;
        let response = self
            .client
            .post(self.endpoint("checkout/sessions")?)
            .bearer_auth(&self.secret_key)
            .form(&form)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }

        let session = parse_session(body.as_ref())?;
        let url = session.url.ok_or_else(|| {
            PaymentGatewayError::decode("checkout session response carried no redirect url")
        })?;
        Ok(CheckoutSession {
            id: session.id,
            url,
        })
    }

    async fn retrieve_session(
        &self,
        session_id: &str,
    ) -> Result<SessionStatus, PaymentGatewayError> {
        let response = self
            .client
            .get(self.endpoint(&format!("checkout/sessions/{session_id}"))?)
            .bearer_auth(&self.secret_key)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }

        let session = parse_session(body.as_ref())?;
        Ok(SessionStatus {
            payment_status: session.payment_status.unwrap_or_else(|| "unknown".to_owned()),
            payment_intent_id: session.payment_intent,
        })
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for non-network Stripe mapping helpers.

    use rstest::rstest;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    use super::*;
    use crate::domain::ports::CheckoutMetadata;

    fn request(total: Decimal) -> CheckoutSessionRequest {
        CheckoutSessionRequest {
            total,
            description: "Blue Train by John Coltrane".to_owned(),
            metadata: CheckoutMetadata {
                offer_id: Uuid::new_v4(),
                record_id: Uuid::new_v4(),
                buyer_id: Uuid::new_v4(),
                seller_id: Uuid::new_v4(),
            },
            success_url: Url::parse("https://example.test/success").expect("static url"),
            cancel_url: Url::parse("https://example.test/cancel").expect("static url"),
        }
    }

    #[rstest]
    #[case(dec!(104.00), 10400)]
    #[case(dec!(83.20), 8320)]
    #[case(dec!(0.01), 1)]
    #[case(dec!(12.995), 1300)]
    fn totals_convert_to_minor_units(#[case] total: Decimal, #[case] expected: i64) {
        assert_eq!(to_minor_units(total).expect("conversion"), expected);
    }

    #[rstest]
    fn create_form_carries_amount_and_metadata() {
        let request = request(dec!(104.00));
        let form = build_create_form(&request).expect("form builds");

        let lookup = |key: &str| {
            form.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.as_str())
                .expect("form field present")
        };
        assert_eq!(lookup("mode"), "payment");
        assert_eq!(lookup("line_items[0][price_data][unit_amount]"), "10400");
        assert_eq!(
            lookup("line_items[0][price_data][product_data][name]"),
            "Blue Train by John Coltrane"
        );
        assert_eq!(
            lookup("metadata[offer_id]"),
            request.metadata.offer_id.to_string()
        );
    }

    #[rstest]
    #[case(StatusCode::REQUEST_TIMEOUT, "Timeout")]
    #[case(StatusCode::GATEWAY_TIMEOUT, "Timeout")]
    #[case(StatusCode::BAD_REQUEST, "InvalidRequest")]
    #[case(StatusCode::UNAUTHORIZED, "InvalidRequest")]
    #[case(StatusCode::INTERNAL_SERVER_ERROR, "Transport")]
    fn maps_http_statuses(#[case] status: StatusCode, #[case] expected: &str) {
        let error = map_status_error(status, b"{\"error\":{\"message\":\"nope\"}}");
        let matched = match expected {
            "Timeout" => matches!(error, PaymentGatewayError::Timeout { .. }),
            "InvalidRequest" => matches!(error, PaymentGatewayError::InvalidRequest { .. }),
            "Transport" => matches!(error, PaymentGatewayError::Transport { .. }),
            _ => panic!("unsupported expectation: {expected}"),
        };
        assert!(matched, "{status} should map to {expected}");
    }

    #[rstest]
    fn parses_paid_session_payload() {
        let body = br#"{
            "id": "cs_test_123",
            "url": null,
            "payment_status": "paid",
            "payment_intent": "pi_456"
        }"#;
        let session = parse_session(body).expect("payload decodes");
        assert_eq!(session.id, "cs_test_123");
        assert_eq!(session.payment_status.as_deref(), Some("paid"));
        assert_eq!(session.payment_intent.as_deref(), Some("pi_456"));
    }

    #[rstest]
    fn rejects_malformed_payloads() {
        let error = parse_session(b"not json").expect_err("decode fails");
        assert!(matches!(error, PaymentGatewayError::Decode { .. }));
    }
}
