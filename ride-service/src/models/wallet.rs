//! Wallet and its append-only transaction ledger.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Per-account wallet. One per user, created lazily on first use.
///
/// `balance` is non-negative after every committed operation; an operation
/// that would take it below zero fails instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wallet {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub balance: f64,
    pub created_at: DateTime<Utc>,
}

impl Wallet {
    pub fn new(owner_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            balance: 0.0,
            created_at: Utc::now(),
        }
    }
}

/// Direction of a ledger entry relative to the wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionDirection {
    Debit,
    Credit,
}

impl TransactionDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debit => "debit",
            Self::Credit => "credit",
        }
    }
}

impl std::fmt::Display for TransactionDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What moved the money.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionMethod {
    Ride,
    TopUp,
}

impl TransactionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ride => "RIDE",
            Self::TopUp => "TOP_UP",
        }
    }
}

impl std::fmt::Display for TransactionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Single immutable ledger entry. Appended on every successful wallet
/// operation, never updated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletTransaction {
    pub id: Uuid,
    pub wallet_id: Uuid,
    pub amount: f64,
    pub direction: TransactionDirection,
    pub method: TransactionMethod,
    pub ride_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl WalletTransaction {
    pub fn new(
        wallet_id: Uuid,
        amount: f64,
        direction: TransactionDirection,
        method: TransactionMethod,
        ride_id: Option<Uuid>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            wallet_id,
            amount,
            direction,
            method,
            ride_id,
            created_at: Utc::now(),
        }
    }

    /// Signed effect on the wallet balance (credits positive).
    pub fn signed_amount(&self) -> f64 {
        match self.direction {
            TransactionDirection::Credit => self.amount,
            TransactionDirection::Debit => -self.amount,
        }
    }
}
