//! Payment processor adapters.

mod stripe_checkout;

pub use stripe_checkout::{StripeCheckoutGateway, StripeGatewayBuildError};
