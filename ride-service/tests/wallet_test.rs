//! Ledger conservation properties over arbitrary operation sequences.

mod common;

use common::spawn_app;
use rand::{Rng, SeedableRng};
use ride_service::models::TransactionMethod;
use ride_service::store::WalletStore;
use service_core::error::AppError;
use uuid::Uuid;

#[tokio::test]
async fn balance_equals_initial_plus_credits_minus_debits() {
    let app = spawn_app();
    let owner = Uuid::new_v4();
    app.wallets.top_up(owner, 1000.0).await.unwrap();

    let mut rng = rand::rngs::StdRng::seed_from_u64(42);
    let mut expected: f64 = 1000.0;

    for _ in 0..200 {
        // Whole currency units keep the arithmetic exact in f64.
        let amount = rng.gen_range(1..=300) as f64;
        if rng.gen_bool(0.5) {
            app.wallets
                .credit(owner, amount, None, TransactionMethod::Ride)
                .await
                .unwrap();
            expected += amount;
        } else {
            match app
                .wallets
                .debit(owner, amount, None, TransactionMethod::Ride)
                .await
            {
                Ok(_) => expected -= amount,
                Err(AppError::InsufficientFunds { balance, .. }) => {
                    assert!(balance < amount);
                }
                Err(other) => panic!("unexpected error: {other}"),
            }
        }

        let balance = app.wallets.balance(owner).await.unwrap();
        assert_eq!(balance, expected);
        assert!(balance >= 0.0, "balance must never go negative");
    }

    // The ledger replays to the same balance.
    let wallet = app
        .store
        .find_wallet_by_owner(owner)
        .await
        .unwrap()
        .unwrap();
    let txs = app.store.transactions_for_wallet(wallet.id).await.unwrap();
    let replayed: f64 = txs.iter().map(|tx| tx.signed_amount()).sum();
    assert_eq!(replayed, expected);
}

#[tokio::test]
async fn concurrent_mixed_operations_conserve_money() {
    let app = spawn_app();
    let owner = Uuid::new_v4();
    app.wallets.top_up(owner, 500.0).await.unwrap();

    let mut handles = Vec::new();
    for i in 0..40 {
        let wallets = app.wallets.clone();
        handles.push(tokio::spawn(async move {
            if i % 2 == 0 {
                wallets
                    .credit(owner, 10.0, None, TransactionMethod::Ride)
                    .await
                    .map(|_| 10.0)
            } else {
                wallets
                    .debit(owner, 25.0, None, TransactionMethod::Ride)
                    .await
                    .map(|_| -25.0)
            }
        }));
    }

    let mut net = 0.0;
    for handle in handles {
        if let Ok(delta) = handle.await.unwrap() {
            net += delta;
        }
    }

    let balance = app.wallets.balance(owner).await.unwrap();
    assert_eq!(balance, 500.0 + net);
    assert!(balance >= 0.0);
}
