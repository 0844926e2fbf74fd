//! Fare computation.
//!
//! Distance comes from the estimator boundary; the fare math itself does
//! no I/O. Strategies are pluggable so promotional or per-city pricing can
//! be added without touching ride-state code.

use chrono::{DateTime, Timelike, Utc};
use service_core::error::AppError;
use tracing::instrument;

use crate::config::RideConfig;
use crate::models::GeoPoint;

use super::distance::{EstimatorClient, RouteEstimate};

/// Pricing rule applied to a resolved route.
pub trait FareStrategy: Send + Sync {
    fn fare(&self, estimate: RouteEstimate, request_time: DateTime<Utc>) -> f64;
}

/// Default pricing: per-km rate with a surge multiplier inside the
/// configured evening window.
pub struct DistanceTimeFareStrategy {
    per_km_rate: f64,
    surge_multiplier: f64,
    surge_start_hour: u32,
    surge_end_hour: u32,
}

impl DistanceTimeFareStrategy {
    pub fn new(config: &RideConfig) -> Self {
        Self {
            per_km_rate: config.per_km_rate,
            surge_multiplier: config.surge_multiplier,
            surge_start_hour: config.surge_start_hour,
            surge_end_hour: config.surge_end_hour,
        }
    }

    /// Surge window is [start, end) on the request's local hour.
    fn in_surge_window(&self, request_time: DateTime<Utc>) -> bool {
        let hour = request_time.hour();
        hour >= self.surge_start_hour && hour < self.surge_end_hour
    }
}

impl FareStrategy for DistanceTimeFareStrategy {
    fn fare(&self, estimate: RouteEstimate, request_time: DateTime<Utc>) -> f64 {
        let base = estimate.distance_km * self.per_km_rate;
        if self.in_surge_window(request_time) {
            base * self.surge_multiplier
        } else {
            base
        }
    }
}

/// Computes a ride's fare from pickup, dropoff and request time.
pub struct FareCalculator {
    estimator: EstimatorClient,
    strategy: Box<dyn FareStrategy>,
}

impl FareCalculator {
    pub fn new(estimator: EstimatorClient, strategy: Box<dyn FareStrategy>) -> Self {
        Self {
            estimator,
            strategy,
        }
    }

    /// Fails with `DistanceUnavailable` when the route cannot be resolved;
    /// the caller must not proceed to driver matching in that case.
    #[instrument(skip(self))]
    pub async fn calculate_fare(
        &self,
        pickup: GeoPoint,
        dropoff: GeoPoint,
        request_time: DateTime<Utc>,
    ) -> Result<f64, AppError> {
        let estimate = self.estimator.estimate(pickup, dropoff).await?;
        let fare = self.strategy.fare(estimate, request_time);
        tracing::debug!(
            distance_km = estimate.distance_km,
            fare = fare,
            "fare computed"
        );
        Ok(fare)
    }
}
