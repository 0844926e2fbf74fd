//! Wallet ledger: per-account balances with an append-only transaction log.
//!
//! Balance updates are serialized per wallet through the lock registry so
//! the balance-check-then-write sequence never interleaves. Every
//! successful operation writes the new balance and appends exactly one
//! ledger entry; a rejected operation writes nothing.

use std::sync::Arc;

use anyhow::anyhow;
use service_core::error::AppError;
use tracing::instrument;
use uuid::Uuid;

use crate::models::{
    TransactionDirection, TransactionMethod, Wallet, WalletTransaction,
};
use crate::store::locks::LockRegistry;
use crate::store::WalletStore;

pub struct WalletService {
    store: Arc<dyn WalletStore>,
    // Keyed by owner id: wallets are 1:1 with owners and created lazily,
    // so the owner id is the stable lock key.
    locks: Arc<LockRegistry>,
}

/// Both legs of a wallet-settled ride, committed together.
#[derive(Debug, Clone)]
pub struct TransferRecord {
    pub debit: WalletTransaction,
    pub credit: WalletTransaction,
}

impl WalletService {
    pub fn new(store: Arc<dyn WalletStore>, locks: Arc<LockRegistry>) -> Self {
        Self { store, locks }
    }

    fn validate_amount(amount: f64) -> Result<(), AppError> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(AppError::InvalidAmount(amount));
        }
        Ok(())
    }

    /// Wallet for `owner`, created with zero balance on first use.
    /// Callers must hold the owner's lock.
    async fn wallet_for_locked(&self, owner_id: Uuid) -> Result<Wallet, AppError> {
        match self.store.find_wallet_by_owner(owner_id).await? {
            Some(wallet) => Ok(wallet),
            None => self.store.save_wallet(Wallet::new(owner_id)).await,
        }
    }

    /// Current balance; zero for an owner whose wallet does not exist yet.
    pub async fn balance(&self, owner_id: Uuid) -> Result<f64, AppError> {
        Ok(self
            .store
            .find_wallet_by_owner(owner_id)
            .await?
            .map(|w| w.balance)
            .unwrap_or(0.0))
    }

    /// Apply one leg against a wallet. Assumes the owner's lock is held.
    async fn apply_locked(
        &self,
        owner_id: Uuid,
        amount: f64,
        direction: TransactionDirection,
        method: TransactionMethod,
        ride_id: Option<Uuid>,
    ) -> Result<WalletTransaction, AppError> {
        Self::validate_amount(amount)?;

        let mut wallet = self.wallet_for_locked(owner_id).await?;
        match direction {
            TransactionDirection::Debit => {
                if wallet.balance < amount {
                    return Err(AppError::InsufficientFunds {
                        balance: wallet.balance,
                        requested: amount,
                    });
                }
                wallet.balance -= amount;
            }
            TransactionDirection::Credit => {
                wallet.balance += amount;
            }
        }

        let wallet = self.store.save_wallet(wallet).await?;
        let tx = self
            .store
            .append_transaction(WalletTransaction::new(
                wallet.id, amount, direction, method, ride_id,
            ))
            .await?;

        tracing::info!(
            wallet_id = %wallet.id,
            owner_id = %owner_id,
            direction = %direction,
            amount = amount,
            balance = wallet.balance,
            "ledger entry committed"
        );
        Ok(tx)
    }

    /// Remove `amount` from the owner's wallet. Fails with
    /// `InsufficientFunds` when the balance does not cover it.
    #[instrument(skip(self))]
    pub async fn debit(
        &self,
        owner_id: Uuid,
        amount: f64,
        ride_id: Option<Uuid>,
        method: TransactionMethod,
    ) -> Result<WalletTransaction, AppError> {
        let lock = self.locks.lock_for(owner_id);
        let _guard = lock.lock().await;
        self.apply_locked(owner_id, amount, TransactionDirection::Debit, method, ride_id)
            .await
    }

    /// Add `amount` to the owner's wallet.
    #[instrument(skip(self))]
    pub async fn credit(
        &self,
        owner_id: Uuid,
        amount: f64,
        ride_id: Option<Uuid>,
        method: TransactionMethod,
    ) -> Result<WalletTransaction, AppError> {
        let lock = self.locks.lock_for(owner_id);
        let _guard = lock.lock().await;
        self.apply_locked(
            owner_id,
            amount,
            TransactionDirection::Credit,
            method,
            ride_id,
        )
        .await
    }

    /// Rider-initiated wallet top-up.
    #[instrument(skip(self))]
    pub async fn top_up(&self, owner_id: Uuid, amount: f64) -> Result<WalletTransaction, AppError> {
        self.credit(owner_id, amount, None, TransactionMethod::TopUp)
            .await
    }

    /// All-or-nothing two-wallet movement for a ride settlement: debit the
    /// payer, credit the payee. Both wallet locks are held for the whole
    /// scope, acquired in canonical order so concurrent settlements cannot
    /// deadlock. If the credit leg fails after the debit committed, the
    /// debit is compensated before the error surfaces.
    #[instrument(skip(self))]
    pub async fn transfer_for_ride(
        &self,
        payer_id: Uuid,
        payee_id: Uuid,
        debit_amount: f64,
        credit_amount: f64,
        ride_id: Uuid,
    ) -> Result<TransferRecord, AppError> {
        if payer_id == payee_id {
            return Err(AppError::Conflict(anyhow!(
                "payer and payee wallets are the same account"
            )));
        }
        Self::validate_amount(debit_amount)?;
        Self::validate_amount(credit_amount)?;

        let (first, second) = self.locks.lock_pair(payer_id, payee_id);
        let _first_guard = first.lock().await;
        let _second_guard = second.lock().await;

        let debit = self
            .apply_locked(
                payer_id,
                debit_amount,
                TransactionDirection::Debit,
                TransactionMethod::Ride,
                Some(ride_id),
            )
            .await?;

        let credit = match self
            .apply_locked(
                payee_id,
                credit_amount,
                TransactionDirection::Credit,
                TransactionMethod::Ride,
                Some(ride_id),
            )
            .await
        {
            Ok(credit) => credit,
            Err(err) => {
                // Compensate the committed debit so the scope stays
                // all-or-nothing.
                self.apply_locked(
                    payer_id,
                    debit_amount,
                    TransactionDirection::Credit,
                    TransactionMethod::Ride,
                    Some(ride_id),
                )
                .await?;
                tracing::warn!(ride_id = %ride_id, error = %err, "credit leg failed, debit compensated");
                return Err(err);
            }
        };

        Ok(TransferRecord { debit, credit })
    }
}
