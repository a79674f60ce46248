//! HTTP inbound adapter exposing the REST endpoints.

pub mod error;
pub mod fees;
pub mod listings;
pub mod offers;
pub mod orders;
pub mod payments;
pub mod profiles;
pub mod reviews;
pub mod session;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod validation;

pub use error::ApiResult;
