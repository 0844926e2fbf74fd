//! Driver selection.
//!
//! Strategies implement [`MatchingStrategy`] so alternative matchers can be
//! registered without changing ride-state code. The strategy switch itself
//! is a pure function of the rider's rating.

use std::sync::Arc;

use anyhow::anyhow;
use service_core::error::AppError;
use tracing::instrument;

use crate::config::RideConfig;
use crate::models::{Driver, GeoPoint};
use crate::store::DriverStore;

/// Picks one driver for a pickup point out of the available candidates.
pub trait MatchingStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Returns the chosen driver's id, or `None` when no candidate fits.
    fn select(&self, pickup: GeoPoint, candidates: &[Driver]) -> Option<uuid::Uuid>;
}

/// Ties are broken by earliest registration, then lowest id, so repeated
/// runs over the same candidates are deterministic.
fn break_ties<'a>(a: &'a Driver, b: &'a Driver) -> std::cmp::Ordering {
    a.created_at
        .cmp(&b.created_at)
        .then_with(|| a.id.cmp(&b.id))
}

/// Picks the available driver closest to the pickup point.
#[derive(Debug, Default)]
pub struct NearestDriverStrategy;

impl MatchingStrategy for NearestDriverStrategy {
    fn name(&self) -> &'static str {
        "nearest_driver"
    }

    fn select(&self, pickup: GeoPoint, candidates: &[Driver]) -> Option<uuid::Uuid> {
        candidates
            .iter()
            .min_by(|a, b| {
                let da = a.location.haversine_km(&pickup);
                let db = b.location.haversine_km(&pickup);
                da.partial_cmp(&db)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| break_ties(a, b))
            })
            .map(|d| d.id)
    }
}

/// Picks the available driver with the highest rating.
#[derive(Debug, Default)]
pub struct HighestRatedDriverStrategy;

impl MatchingStrategy for HighestRatedDriverStrategy {
    fn name(&self) -> &'static str {
        "highest_rated_driver"
    }

    fn select(&self, _pickup: GeoPoint, candidates: &[Driver]) -> Option<uuid::Uuid> {
        candidates
            .iter()
            .max_by(|a, b| {
                a.rating
                    .partial_cmp(&b.rating)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    // max_by keeps the later of equal elements, so invert
                    // the tie-break to still prefer the earlier registration.
                    .then_with(|| break_ties(b, a))
            })
            .map(|d| d.id)
    }
}

/// Selects a candidate driver for a ride request.
pub struct DriverMatcher {
    drivers: Arc<dyn DriverStore>,
    nearest: Arc<dyn MatchingStrategy>,
    highest_rated: Arc<dyn MatchingStrategy>,
    high_rating_threshold: f64,
}

impl DriverMatcher {
    pub fn new(drivers: Arc<dyn DriverStore>, config: &RideConfig) -> Self {
        Self {
            drivers,
            nearest: Arc::new(NearestDriverStrategy),
            highest_rated: Arc::new(HighestRatedDriverStrategy),
            high_rating_threshold: config.high_rating_threshold,
        }
    }

    /// Replace the strategy used for one of the two rider tiers.
    pub fn with_strategies(
        mut self,
        nearest: Arc<dyn MatchingStrategy>,
        highest_rated: Arc<dyn MatchingStrategy>,
    ) -> Self {
        self.nearest = nearest;
        self.highest_rated = highest_rated;
        self
    }

    /// Pure strategy switch: well-rated riders get the highest-rated
    /// driver, everyone else gets the nearest one.
    pub fn strategy_for_rider(&self, rider_rating: f64) -> Arc<dyn MatchingStrategy> {
        if rider_rating >= self.high_rating_threshold {
            self.highest_rated.clone()
        } else {
            self.nearest.clone()
        }
    }

    /// Fails with `NoDriverAvailable` when no candidate is available.
    /// Never mutates ride state.
    #[instrument(skip(self))]
    pub async fn select_driver(
        &self,
        rider_rating: f64,
        pickup: GeoPoint,
    ) -> Result<Driver, AppError> {
        let candidates = self.drivers.available_drivers().await?;
        if candidates.is_empty() {
            return Err(AppError::NoDriverAvailable(anyhow!(
                "no drivers currently available"
            )));
        }

        let strategy = self.strategy_for_rider(rider_rating);
        let chosen = strategy.select(pickup, &candidates).ok_or_else(|| {
            AppError::NoDriverAvailable(anyhow!(
                "strategy {} found no suitable driver among {} candidates",
                strategy.name(),
                candidates.len()
            ))
        })?;

        tracing::info!(driver_id = %chosen, strategy = strategy.name(), "driver matched");

        self.drivers
            .find_driver(chosen)
            .await?
            .ok_or_else(|| AppError::NotFound(anyhow!("driver {} disappeared", chosen)))
    }
}
