use thiserror::Error;

/// Error taxonomy shared by the ride platform services.
///
/// Every variant is recoverable at the caller boundary: operations that
/// fail with one of these leave all entities in their pre-call state.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(anyhow::Error),

    #[error("OTP mismatch")]
    OtpMismatch,

    #[error("No driver available: {0}")]
    NoDriverAvailable(anyhow::Error),

    #[error("Distance unavailable: {0}")]
    DistanceUnavailable(anyhow::Error),

    #[error("Insufficient funds: balance {balance}, requested {requested}")]
    InsufficientFunds { balance: f64, requested: f64 },

    #[error("Invalid amount: {0}")]
    InvalidAmount(f64),

    #[error("Payment already settled: {0}")]
    AlreadySettled(anyhow::Error),

    #[error("Already rated: {0}")]
    AlreadyRated(anyhow::Error),

    #[error("Rating not found: {0}")]
    RatingNotFound(anyhow::Error),

    #[error("Not found: {0}")]
    NotFound(anyhow::Error),

    #[error("Conflict: {0}")]
    Conflict(anyhow::Error),

    #[error("Configuration error: {0}")]
    ConfigError(anyhow::Error),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

impl AppError {
    /// Stable machine-readable code for logs and wire surfaces.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidStateTransition(_) => "invalid_state_transition",
            Self::OtpMismatch => "otp_mismatch",
            Self::NoDriverAvailable(_) => "no_driver_available",
            Self::DistanceUnavailable(_) => "distance_unavailable",
            Self::InsufficientFunds { .. } => "insufficient_funds",
            Self::InvalidAmount(_) => "invalid_amount",
            Self::AlreadySettled(_) => "already_settled",
            Self::AlreadyRated(_) => "already_rated",
            Self::RatingNotFound(_) => "rating_not_found",
            Self::NotFound(_) => "not_found",
            Self::Conflict(_) => "conflict",
            Self::ConfigError(_) => "config_error",
            Self::InternalError(_) => "internal_error",
        }
    }

    /// Transient failures may be retried with bounded attempts; business
    /// rule failures must never be retried automatically.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::DistanceUnavailable(_))
    }
}
