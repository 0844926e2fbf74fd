//! Persistence boundary.
//!
//! One narrow trait per entity: save, find by id, and the relation lookups
//! the services need. No business logic lives here; implementations only
//! move entities in and out of storage. [`memory::InMemoryStore`]
//! implements every trait for tests and single-process deployments.

pub mod locks;
pub mod memory;

use async_trait::async_trait;
use service_core::error::AppError;
use uuid::Uuid;

use crate::models::{Driver, Payment, Rating, Ride, Rider, Wallet, WalletTransaction};

#[async_trait]
pub trait RideStore: Send + Sync {
    async fn save_ride(&self, ride: Ride) -> Result<Ride, AppError>;
    async fn find_ride(&self, id: Uuid) -> Result<Option<Ride>, AppError>;
}

#[async_trait]
pub trait WalletStore: Send + Sync {
    async fn save_wallet(&self, wallet: Wallet) -> Result<Wallet, AppError>;
    async fn find_wallet(&self, id: Uuid) -> Result<Option<Wallet>, AppError>;
    async fn find_wallet_by_owner(&self, owner_id: Uuid) -> Result<Option<Wallet>, AppError>;
    /// Append one immutable ledger entry. Entries are never updated or
    /// deleted.
    async fn append_transaction(
        &self,
        tx: WalletTransaction,
    ) -> Result<WalletTransaction, AppError>;
    async fn transactions_for_wallet(
        &self,
        wallet_id: Uuid,
    ) -> Result<Vec<WalletTransaction>, AppError>;
}

#[async_trait]
pub trait PaymentStore: Send + Sync {
    async fn save_payment(&self, payment: Payment) -> Result<Payment, AppError>;
    async fn find_payment(&self, id: Uuid) -> Result<Option<Payment>, AppError>;
    async fn find_payment_by_ride(&self, ride_id: Uuid) -> Result<Option<Payment>, AppError>;
}

#[async_trait]
pub trait RatingStore: Send + Sync {
    async fn save_rating(&self, rating: Rating) -> Result<Rating, AppError>;
    async fn find_rating_by_ride(&self, ride_id: Uuid) -> Result<Option<Rating>, AppError>;
    async fn ratings_for_driver(&self, driver_id: Uuid) -> Result<Vec<Rating>, AppError>;
    async fn ratings_for_rider(&self, rider_id: Uuid) -> Result<Vec<Rating>, AppError>;
}

#[async_trait]
pub trait DriverStore: Send + Sync {
    async fn save_driver(&self, driver: Driver) -> Result<Driver, AppError>;
    async fn find_driver(&self, id: Uuid) -> Result<Option<Driver>, AppError>;
    async fn available_drivers(&self) -> Result<Vec<Driver>, AppError>;
}

#[async_trait]
pub trait RiderStore: Send + Sync {
    async fn save_rider(&self, rider: Rider) -> Result<Rider, AppError>;
    async fn find_rider(&self, id: Uuid) -> Result<Option<Rider>, AppError>;
}
