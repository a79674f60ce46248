//! Driven adapters: persistence and the payment processor.

pub mod payments;
pub mod persistence;
