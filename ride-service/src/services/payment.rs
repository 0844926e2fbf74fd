//! Payment settlement at ride completion.
//!
//! Strategies implement [`PaymentStrategy`]; the variant is picked from the
//! payment's method. Settlement is guarded so a payment confirms at most
//! once: replays observe `AlreadySettled` and move no money.

use std::sync::Arc;

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::Utc;
use service_core::error::AppError;
use tracing::instrument;
use uuid::Uuid;

use crate::config::RideConfig;
use crate::models::{Payment, PaymentMethod, PaymentStatus, Ride};
use crate::store::locks::LockRegistry;
use crate::store::{PaymentStore, RideStore};

use super::wallet::WalletService;

/// One way of collecting a fare.
#[async_trait]
pub trait PaymentStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Perform the money movement for `payment`. Called exactly once per
    /// settlement; must leave every wallet untouched on failure.
    async fn collect(&self, payment: &Payment, ride: &Ride) -> Result<(), AppError>;
}

/// Cash was exchanged physically; the record is audit-only.
#[derive(Debug, Default)]
pub struct CashPaymentStrategy;

#[async_trait]
impl PaymentStrategy for CashPaymentStrategy {
    fn name(&self) -> &'static str {
        "cash"
    }

    async fn collect(&self, payment: &Payment, _ride: &Ride) -> Result<(), AppError> {
        tracing::info!(payment_id = %payment.id, amount = payment.amount, "cash fare recorded");
        Ok(())
    }
}

/// Debits the rider's wallet by the fare and credits the driver with the
/// fare minus platform commission, as one all-or-nothing movement.
pub struct WalletPaymentStrategy {
    wallets: Arc<WalletService>,
    commission_rate: f64,
}

impl WalletPaymentStrategy {
    pub fn new(wallets: Arc<WalletService>, config: &RideConfig) -> Self {
        Self {
            wallets,
            commission_rate: config.commission_rate,
        }
    }
}

#[async_trait]
impl PaymentStrategy for WalletPaymentStrategy {
    fn name(&self) -> &'static str {
        "wallet"
    }

    async fn collect(&self, payment: &Payment, ride: &Ride) -> Result<(), AppError> {
        let driver_id = ride.driver_id.ok_or_else(|| {
            AppError::InvalidStateTransition(anyhow!(
                "ride {} reached settlement without a driver",
                ride.id
            ))
        })?;

        let drivers_cut = payment.amount * (1.0 - self.commission_rate);

        self.wallets
            .transfer_for_ride(ride.rider_id, driver_id, payment.amount, drivers_cut, ride.id)
            .await?;

        tracing::info!(
            payment_id = %payment.id,
            fare = payment.amount,
            drivers_cut = drivers_cut,
            "wallet fare settled"
        );
        Ok(())
    }
}

/// Orchestrates the payment strategy at ride completion.
pub struct PaymentService {
    payments: Arc<dyn PaymentStore>,
    rides: Arc<dyn RideStore>,
    cash: Arc<dyn PaymentStrategy>,
    wallet: Arc<dyn PaymentStrategy>,
    locks: Arc<LockRegistry>,
}

impl PaymentService {
    pub fn new(
        payments: Arc<dyn PaymentStore>,
        rides: Arc<dyn RideStore>,
        wallets: Arc<WalletService>,
        locks: Arc<LockRegistry>,
        config: &RideConfig,
    ) -> Self {
        Self {
            payments,
            rides,
            cash: Arc::new(CashPaymentStrategy),
            wallet: Arc::new(WalletPaymentStrategy::new(wallets, config)),
            locks,
        }
    }

    fn strategy_for(&self, method: PaymentMethod) -> Arc<dyn PaymentStrategy> {
        match method {
            PaymentMethod::Cash => self.cash.clone(),
            PaymentMethod::Wallet => self.wallet.clone(),
        }
    }

    /// Create the pending payment record for a completed ride.
    pub async fn create_payment(&self, ride: &Ride) -> Result<Payment, AppError> {
        let fare = ride.fare.ok_or_else(|| {
            AppError::InvalidStateTransition(anyhow!(
                "ride {} reached settlement without a fare",
                ride.id
            ))
        })?;
        self.payments
            .save_payment(Payment::new(ride.id, fare, ride.payment_method))
            .await
    }

    /// The payment record for a ride, if completion created one.
    pub async fn find_payment_for_ride(&self, ride_id: Uuid) -> Result<Option<Payment>, AppError> {
        self.payments.find_payment_by_ride(ride_id).await
    }

    /// Settle a pending payment. Replays on a confirmed payment fail with
    /// `AlreadySettled`; a failed wallet movement leaves it pending.
    #[instrument(skip(self))]
    pub async fn process_payment(&self, payment_id: Uuid) -> Result<Payment, AppError> {
        // Serialize settlement attempts per payment so one confirms and
        // concurrent replays observe the confirmed state.
        let lock = self.locks.lock_for(payment_id);
        let _guard = lock.lock().await;

        let payment = self
            .payments
            .find_payment(payment_id)
            .await?
            .ok_or_else(|| AppError::NotFound(anyhow!("payment {} not found", payment_id)))?;

        if payment.status == PaymentStatus::Confirmed {
            return Err(AppError::AlreadySettled(anyhow!(
                "payment {} for ride {} is already confirmed",
                payment.id,
                payment.ride_id
            )));
        }

        let ride = self
            .rides
            .find_ride(payment.ride_id)
            .await?
            .ok_or_else(|| AppError::NotFound(anyhow!("ride {} not found", payment.ride_id)))?;

        let strategy = self.strategy_for(payment.method);
        strategy.collect(&payment, &ride).await?;

        let mut confirmed = payment;
        confirmed.status = PaymentStatus::Confirmed;
        confirmed.confirmed_at = Some(Utc::now());
        let confirmed = self.payments.save_payment(confirmed).await?;

        tracing::info!(
            payment_id = %confirmed.id,
            ride_id = %confirmed.ride_id,
            strategy = strategy.name(),
            "payment confirmed"
        );
        Ok(confirmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GeoPoint;
    use crate::store::memory::InMemoryStore;
    use crate::store::WalletStore;

    struct Fixture {
        store: Arc<InMemoryStore>,
        wallets: Arc<WalletService>,
        payments: PaymentService,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(InMemoryStore::new());
        let locks = Arc::new(LockRegistry::new());
        let wallets = Arc::new(WalletService::new(store.clone(), locks.clone()));
        let payments = PaymentService::new(
            store.clone(),
            store.clone(),
            wallets.clone(),
            locks,
            &RideConfig::default(),
        );
        Fixture {
            store,
            wallets,
            payments,
        }
    }

    async fn completed_ride(store: &InMemoryStore, method: PaymentMethod, fare: f64) -> Ride {
        let mut ride = Ride::new(
            Uuid::new_v4(),
            GeoPoint::new(12.9, 77.6),
            GeoPoint::new(12.8, 77.7),
            method,
            fare,
            Utc::now(),
        );
        ride.driver_id = Some(Uuid::new_v4());
        store.save_ride(ride.clone()).await.unwrap();
        ride
    }

    #[tokio::test]
    async fn wallet_settlement_splits_commission() {
        let f = fixture();
        let ride = completed_ride(&f.store, PaymentMethod::Wallet, 100.0).await;
        let driver = ride.driver_id.unwrap();

        f.wallets.top_up(ride.rider_id, 232.0).await.unwrap();
        f.wallets.top_up(driver, 500.0).await.unwrap();

        let payment = f.payments.create_payment(&ride).await.unwrap();
        let confirmed = f.payments.process_payment(payment.id).await.unwrap();

        assert_eq!(confirmed.status, PaymentStatus::Confirmed);
        assert_eq!(f.wallets.balance(ride.rider_id).await.unwrap(), 132.0);
        assert_eq!(f.wallets.balance(driver).await.unwrap(), 570.0);

        // Exactly two ride entries: rider debit and driver credit.
        let rider_wallet = f
            .store
            .find_wallet_by_owner(ride.rider_id)
            .await
            .unwrap()
            .unwrap();
        let driver_wallet = f.store.find_wallet_by_owner(driver).await.unwrap().unwrap();
        let ride_entries = [
            f.store
                .transactions_for_wallet(rider_wallet.id)
                .await
                .unwrap(),
            f.store
                .transactions_for_wallet(driver_wallet.id)
                .await
                .unwrap(),
        ]
        .concat()
        .into_iter()
        .filter(|tx| tx.ride_id == Some(ride.id))
        .count();
        assert_eq!(ride_entries, 2);
    }

    #[tokio::test]
    async fn insufficient_funds_leaves_payment_pending() {
        let f = fixture();
        let ride = completed_ride(&f.store, PaymentMethod::Wallet, 100.0).await;
        let driver = ride.driver_id.unwrap();

        f.wallets.top_up(ride.rider_id, 50.0).await.unwrap();
        f.wallets.top_up(driver, 500.0).await.unwrap();

        let payment = f.payments.create_payment(&ride).await.unwrap();
        let err = f.payments.process_payment(payment.id).await.unwrap_err();
        assert!(matches!(err, AppError::InsufficientFunds { .. }));

        let stored = f.store.find_payment(payment.id).await.unwrap().unwrap();
        assert_eq!(stored.status, PaymentStatus::Pending);
        assert_eq!(f.wallets.balance(ride.rider_id).await.unwrap(), 50.0);
        assert_eq!(f.wallets.balance(driver).await.unwrap(), 500.0);
    }

    #[tokio::test]
    async fn replay_is_rejected_without_balance_movement() {
        let f = fixture();
        let ride = completed_ride(&f.store, PaymentMethod::Wallet, 100.0).await;
        let driver = ride.driver_id.unwrap();

        f.wallets.top_up(ride.rider_id, 232.0).await.unwrap();
        f.wallets.top_up(driver, 500.0).await.unwrap();

        let payment = f.payments.create_payment(&ride).await.unwrap();
        f.payments.process_payment(payment.id).await.unwrap();

        let err = f.payments.process_payment(payment.id).await.unwrap_err();
        assert!(matches!(err, AppError::AlreadySettled(_)));

        assert_eq!(f.wallets.balance(ride.rider_id).await.unwrap(), 132.0);
        assert_eq!(f.wallets.balance(driver).await.unwrap(), 570.0);
    }

    #[tokio::test]
    async fn cash_settlement_moves_no_money() {
        let f = fixture();
        let ride = completed_ride(&f.store, PaymentMethod::Cash, 80.0).await;
        let driver = ride.driver_id.unwrap();
        f.wallets.top_up(ride.rider_id, 20.0).await.unwrap();

        let payment = f.payments.create_payment(&ride).await.unwrap();
        let confirmed = f.payments.process_payment(payment.id).await.unwrap();

        assert_eq!(confirmed.status, PaymentStatus::Confirmed);
        assert_eq!(f.wallets.balance(ride.rider_id).await.unwrap(), 20.0);
        assert_eq!(f.wallets.balance(driver).await.unwrap(), 0.0);
    }
}
