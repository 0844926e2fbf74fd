//! In-memory store backed by concurrent maps.
//!
//! Entities are addressed by id and cross-reference each other by id only,
//! so the maps form a simple arena with no ownership cycles.

use async_trait::async_trait;
use dashmap::DashMap;
use service_core::error::AppError;
use uuid::Uuid;

use crate::models::{Driver, Payment, Rating, Ride, Rider, Wallet, WalletTransaction};

use super::{DriverStore, PaymentStore, RatingStore, RideStore, RiderStore, WalletStore};

#[derive(Default)]
pub struct InMemoryStore {
    rides: DashMap<Uuid, Ride>,
    wallets: DashMap<Uuid, Wallet>,
    transactions: DashMap<Uuid, WalletTransaction>,
    payments: DashMap<Uuid, Payment>,
    ratings: DashMap<Uuid, Rating>,
    drivers: DashMap<Uuid, Driver>,
    riders: DashMap<Uuid, Rider>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RideStore for InMemoryStore {
    async fn save_ride(&self, ride: Ride) -> Result<Ride, AppError> {
        self.rides.insert(ride.id, ride.clone());
        Ok(ride)
    }

    async fn find_ride(&self, id: Uuid) -> Result<Option<Ride>, AppError> {
        Ok(self.rides.get(&id).map(|r| r.clone()))
    }
}

#[async_trait]
impl WalletStore for InMemoryStore {
    async fn save_wallet(&self, wallet: Wallet) -> Result<Wallet, AppError> {
        self.wallets.insert(wallet.id, wallet.clone());
        Ok(wallet)
    }

    async fn find_wallet(&self, id: Uuid) -> Result<Option<Wallet>, AppError> {
        Ok(self.wallets.get(&id).map(|w| w.clone()))
    }

    async fn find_wallet_by_owner(&self, owner_id: Uuid) -> Result<Option<Wallet>, AppError> {
        Ok(self
            .wallets
            .iter()
            .find(|entry| entry.owner_id == owner_id)
            .map(|entry| entry.clone()))
    }

    async fn append_transaction(
        &self,
        tx: WalletTransaction,
    ) -> Result<WalletTransaction, AppError> {
        self.transactions.insert(tx.id, tx.clone());
        Ok(tx)
    }

    async fn transactions_for_wallet(
        &self,
        wallet_id: Uuid,
    ) -> Result<Vec<WalletTransaction>, AppError> {
        let mut txs: Vec<WalletTransaction> = self
            .transactions
            .iter()
            .filter(|entry| entry.wallet_id == wallet_id)
            .map(|entry| entry.clone())
            .collect();
        txs.sort_by_key(|tx| tx.created_at);
        Ok(txs)
    }
}

#[async_trait]
impl PaymentStore for InMemoryStore {
    async fn save_payment(&self, payment: Payment) -> Result<Payment, AppError> {
        self.payments.insert(payment.id, payment.clone());
        Ok(payment)
    }

    async fn find_payment(&self, id: Uuid) -> Result<Option<Payment>, AppError> {
        Ok(self.payments.get(&id).map(|p| p.clone()))
    }

    async fn find_payment_by_ride(&self, ride_id: Uuid) -> Result<Option<Payment>, AppError> {
        Ok(self
            .payments
            .iter()
            .find(|entry| entry.ride_id == ride_id)
            .map(|entry| entry.clone()))
    }
}

#[async_trait]
impl RatingStore for InMemoryStore {
    async fn save_rating(&self, rating: Rating) -> Result<Rating, AppError> {
        self.ratings.insert(rating.id, rating.clone());
        Ok(rating)
    }

    async fn find_rating_by_ride(&self, ride_id: Uuid) -> Result<Option<Rating>, AppError> {
        Ok(self
            .ratings
            .iter()
            .find(|entry| entry.ride_id == ride_id)
            .map(|entry| entry.clone()))
    }

    async fn ratings_for_driver(&self, driver_id: Uuid) -> Result<Vec<Rating>, AppError> {
        Ok(self
            .ratings
            .iter()
            .filter(|entry| entry.driver_id == driver_id)
            .map(|entry| entry.clone())
            .collect())
    }

    async fn ratings_for_rider(&self, rider_id: Uuid) -> Result<Vec<Rating>, AppError> {
        Ok(self
            .ratings
            .iter()
            .filter(|entry| entry.rider_id == rider_id)
            .map(|entry| entry.clone())
            .collect())
    }
}

#[async_trait]
impl DriverStore for InMemoryStore {
    async fn save_driver(&self, driver: Driver) -> Result<Driver, AppError> {
        self.drivers.insert(driver.id, driver.clone());
        Ok(driver)
    }

    async fn find_driver(&self, id: Uuid) -> Result<Option<Driver>, AppError> {
        Ok(self.drivers.get(&id).map(|d| d.clone()))
    }

    async fn available_drivers(&self) -> Result<Vec<Driver>, AppError> {
        Ok(self
            .drivers
            .iter()
            .filter(|entry| entry.available)
            .map(|entry| entry.clone())
            .collect())
    }
}

#[async_trait]
impl RiderStore for InMemoryStore {
    async fn save_rider(&self, rider: Rider) -> Result<Rider, AppError> {
        self.riders.insert(rider.id, rider.clone());
        Ok(rider)
    }

    async fn find_rider(&self, id: Uuid) -> Result<Option<Rider>, AppError> {
        Ok(self.riders.get(&id).map(|r| r.clone()))
    }
}
