//! Vinyl record marketplace backend.
//!
//! Hexagonal layout: [`domain`] owns the negotiation and purchase state
//! machines and talks to the outside world only through its ports;
//! [`outbound`] adapts those ports to PostgreSQL and the payment processor;
//! [`inbound`] exposes the REST API and the advisory WebSocket change feed;
//! [`server`] wires the layers together.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod outbound;
pub mod server;
