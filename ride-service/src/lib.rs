//! Ride-to-payment settlement core.
//!
//! Coordinates the ride lifecycle (request, accept, start, complete,
//! cancel), driver selection, fare computation and wallet-based payment
//! settlement with platform commission. HTTP transport, authentication and
//! database wiring live outside this crate; the core talks to them through
//! the traits in [`store`] and [`services::distance`].

pub mod config;
pub mod models;
pub mod services;
pub mod store;
