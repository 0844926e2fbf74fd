use std::time::Duration;

use serde::Deserialize;
use service_core::config::env_or;
use service_core::error::AppError;
use service_core::retry::RetryConfig;

/// Tunables for fare computation, settlement and matching.
///
/// Constructed once and passed into the services; tests build one directly
/// to vary rates without touching the environment.
#[derive(Debug, Clone, Deserialize)]
pub struct RideConfig {
    /// Fare per kilometer, in currency units.
    pub per_km_rate: f64,
    /// Multiplier applied to the base fare inside the surge window.
    pub surge_multiplier: f64,
    /// Surge window [start, end) in local hours.
    pub surge_start_hour: u32,
    pub surge_end_hour: u32,
    /// Platform's retained fraction of a wallet-settled fare.
    pub commission_rate: f64,
    /// Riders at or above this rating get the highest-rated driver strategy.
    pub high_rating_threshold: f64,
    /// Digits in the ride-start OTP.
    pub otp_digits: u32,
    /// Upper bound on a single distance-estimator call.
    pub distance_timeout: Duration,
    /// Bounded retries for distance lookups.
    pub distance_max_retries: u32,
}

impl Default for RideConfig {
    fn default() -> Self {
        Self {
            per_km_rate: 10.0,
            surge_multiplier: 1.5,
            surge_start_hour: 18,
            surge_end_hour: 21,
            commission_rate: 0.30,
            high_rating_threshold: 4.8,
            otp_digits: 4,
            distance_timeout: Duration::from_secs(2),
            distance_max_retries: 2,
        }
    }
}

impl RideConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let defaults = Self::default();
        Ok(Self {
            per_km_rate: env_or("RIDE_PER_KM_RATE", defaults.per_km_rate)?,
            surge_multiplier: env_or("RIDE_SURGE_MULTIPLIER", defaults.surge_multiplier)?,
            surge_start_hour: env_or("RIDE_SURGE_START_HOUR", defaults.surge_start_hour)?,
            surge_end_hour: env_or("RIDE_SURGE_END_HOUR", defaults.surge_end_hour)?,
            commission_rate: env_or("RIDE_COMMISSION_RATE", defaults.commission_rate)?,
            high_rating_threshold: env_or(
                "RIDE_HIGH_RATING_THRESHOLD",
                defaults.high_rating_threshold,
            )?,
            otp_digits: env_or("RIDE_OTP_DIGITS", defaults.otp_digits)?,
            distance_timeout: Duration::from_millis(env_or(
                "RIDE_DISTANCE_TIMEOUT_MS",
                defaults.distance_timeout.as_millis() as u64,
            )?),
            distance_max_retries: env_or(
                "RIDE_DISTANCE_MAX_RETRIES",
                defaults.distance_max_retries,
            )?,
        })
    }

    /// Retry policy for distance lookups, derived from config.
    pub fn distance_retry(&self) -> RetryConfig {
        RetryConfig::with_max_retries(self.distance_max_retries)
    }
}
