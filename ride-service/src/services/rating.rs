//! Post-ride ratings and rolling averages.
//!
//! A rating row is created at ride completion with both sides unset; each
//! side is settable exactly once. The subject's rolling average is
//! recomputed as the arithmetic mean over all of their historical rows in
//! that role, matching a full recompute exactly.

use std::sync::Arc;

use anyhow::anyhow;
use service_core::error::AppError;
use tracing::instrument;
use uuid::Uuid;

use crate::models::{Driver, Rating, Ride, Rider};
use crate::store::locks::LockRegistry;
use crate::store::{DriverStore, RatingStore, RiderStore};

pub struct RatingService {
    ratings: Arc<dyn RatingStore>,
    drivers: Arc<dyn DriverStore>,
    riders: Arc<dyn RiderStore>,
    locks: Arc<LockRegistry>,
}

impl RatingService {
    pub fn new(
        ratings: Arc<dyn RatingStore>,
        drivers: Arc<dyn DriverStore>,
        riders: Arc<dyn RiderStore>,
        locks: Arc<LockRegistry>,
    ) -> Self {
        Self {
            ratings,
            drivers,
            riders,
            locks,
        }
    }

    /// Create the pending rating row for a completed ride.
    pub async fn create_rating(&self, ride: &Ride) -> Result<Rating, AppError> {
        let driver_id = ride.driver_id.ok_or_else(|| {
            AppError::InvalidStateTransition(anyhow!(
                "ride {} completed without a driver",
                ride.id
            ))
        })?;
        self.ratings
            .save_rating(Rating::new(ride.id, ride.rider_id, driver_id))
            .await
    }

    fn validate_score(score: u8) -> Result<(), AppError> {
        if !(1..=5).contains(&score) {
            return Err(AppError::InvalidAmount(score as f64));
        }
        Ok(())
    }

    async fn rating_for_ride(&self, ride_id: Uuid) -> Result<Rating, AppError> {
        self.ratings
            .find_rating_by_ride(ride_id)
            .await?
            .ok_or_else(|| {
                AppError::RatingNotFound(anyhow!("no rating row for ride {}", ride_id))
            })
    }

    /// Arithmetic mean of the set scores; 0.0 over zero rows.
    fn mean(scores: impl Iterator<Item = u8>) -> f64 {
        let scores: Vec<u8> = scores.collect();
        if scores.is_empty() {
            return 0.0;
        }
        scores.iter().map(|s| *s as f64).sum::<f64>() / scores.len() as f64
    }

    /// Rate the driver of a completed ride. Settable once per ride.
    #[instrument(skip(self))]
    pub async fn rate_driver(&self, ride_id: Uuid, score: u8) -> Result<Driver, AppError> {
        Self::validate_score(score)?;

        let lock = self.locks.lock_for(ride_id);
        let _guard = lock.lock().await;

        let mut rating = self.rating_for_ride(ride_id).await?;
        if rating.driver_rating.is_some() {
            return Err(AppError::AlreadyRated(anyhow!(
                "driver already rated for ride {}",
                ride_id
            )));
        }
        rating.driver_rating = Some(score);
        let rating = self.ratings.save_rating(rating).await?;

        let mut driver = self
            .drivers
            .find_driver(rating.driver_id)
            .await?
            .ok_or_else(|| AppError::NotFound(anyhow!("driver {} not found", rating.driver_id)))?;

        let rows = self.ratings.ratings_for_driver(driver.id).await?;
        driver.rating = Self::mean(rows.iter().filter_map(|r| r.driver_rating));
        let driver = self.drivers.save_driver(driver).await?;

        tracing::info!(
            ride_id = %ride_id,
            driver_id = %driver.id,
            score = score,
            average = driver.rating,
            "driver rated"
        );
        Ok(driver)
    }

    /// Rate the rider of a completed ride. Settable once per ride.
    #[instrument(skip(self))]
    pub async fn rate_rider(&self, ride_id: Uuid, score: u8) -> Result<Rider, AppError> {
        Self::validate_score(score)?;

        let lock = self.locks.lock_for(ride_id);
        let _guard = lock.lock().await;

        let mut rating = self.rating_for_ride(ride_id).await?;
        if rating.rider_rating.is_some() {
            return Err(AppError::AlreadyRated(anyhow!(
                "rider already rated for ride {}",
                ride_id
            )));
        }
        rating.rider_rating = Some(score);
        let rating = self.ratings.save_rating(rating).await?;

        let mut rider = self
            .riders
            .find_rider(rating.rider_id)
            .await?
            .ok_or_else(|| AppError::NotFound(anyhow!("rider {} not found", rating.rider_id)))?;

        let rows = self.ratings.ratings_for_rider(rider.id).await?;
        rider.rating = Self::mean(rows.iter().filter_map(|r| r.rider_rating));
        let rider = self.riders.save_rider(rider).await?;

        tracing::info!(
            ride_id = %ride_id,
            rider_id = %rider.id,
            score = score,
            average = rider.rating,
            "rider rated"
        );
        Ok(rider)
    }
}
