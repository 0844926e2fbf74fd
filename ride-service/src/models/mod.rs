pub mod geo;
pub mod payment;
pub mod rating;
pub mod ride;
pub mod user;
pub mod wallet;

pub use geo::GeoPoint;
pub use payment::{Payment, PaymentMethod, PaymentStatus};
pub use rating::Rating;
pub use ride::{Ride, RideStatus};
pub use user::{Driver, Rider};
pub use wallet::{TransactionDirection, TransactionMethod, Wallet, WalletTransaction};
