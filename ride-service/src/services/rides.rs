//! Ride lifecycle state machine.
//!
//! Owns every status transition and its side effects: OTP issuance at
//! acceptance, rating-row creation and payment settlement at completion.
//! Transitions are serialized per ride id, so exactly one of two racing
//! calls wins and the loser observes the resulting state.

use std::sync::Arc;

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use rand::Rng;
use service_core::error::AppError;
use tracing::instrument;
use uuid::Uuid;

use crate::config::RideConfig;
use crate::models::{GeoPoint, PaymentMethod, Ride, RideStatus};
use crate::store::locks::LockRegistry;
use crate::store::{DriverStore, RideStore, RiderStore};

use super::fare::FareCalculator;
use super::matching::DriverMatcher;
use super::notification::{notify_detached, NotificationSink};
use super::payment::PaymentService;
use super::rating::RatingService;

pub struct RideService {
    rides: Arc<dyn RideStore>,
    riders: Arc<dyn RiderStore>,
    drivers: Arc<dyn DriverStore>,
    fare: FareCalculator,
    matcher: DriverMatcher,
    payments: Arc<PaymentService>,
    ratings: Arc<RatingService>,
    notifier: Arc<dyn NotificationSink>,
    locks: Arc<LockRegistry>,
    otp_digits: u32,
}

impl RideService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        rides: Arc<dyn RideStore>,
        riders: Arc<dyn RiderStore>,
        drivers: Arc<dyn DriverStore>,
        fare: FareCalculator,
        matcher: DriverMatcher,
        payments: Arc<PaymentService>,
        ratings: Arc<RatingService>,
        notifier: Arc<dyn NotificationSink>,
        locks: Arc<LockRegistry>,
        config: &RideConfig,
    ) -> Self {
        Self {
            rides,
            riders,
            drivers,
            fare,
            matcher,
            payments,
            ratings,
            notifier,
            locks,
            otp_digits: config.otp_digits,
        }
    }

    fn generate_otp(&self) -> String {
        let bound = 10u32.pow(self.otp_digits);
        let code = rand::thread_rng().gen_range(0..bound);
        format!("{:0width$}", code, width = self.otp_digits as usize)
    }

    async fn ride(&self, ride_id: Uuid) -> Result<Ride, AppError> {
        self.rides
            .find_ride(ride_id)
            .await?
            .ok_or_else(|| AppError::NotFound(anyhow!("ride {} not found", ride_id)))
    }

    async fn set_driver_availability(&self, driver_id: Uuid, available: bool) -> Result<(), AppError> {
        let mut driver = self
            .drivers
            .find_driver(driver_id)
            .await?
            .ok_or_else(|| AppError::NotFound(anyhow!("driver {} not found", driver_id)))?;
        driver.available = available;
        self.drivers.save_driver(driver).await?;
        Ok(())
    }

    /// Create a ride request: compute the fare, verify a driver can be
    /// matched, and persist the ride as REQUESTED.
    ///
    /// A failed distance lookup (`DistanceUnavailable`) or an empty driver
    /// pool (`NoDriverAvailable`) aborts before anything is written.
    #[instrument(skip(self))]
    pub async fn request_ride(
        &self,
        rider_id: Uuid,
        pickup: GeoPoint,
        dropoff: GeoPoint,
        payment_method: PaymentMethod,
        request_time: DateTime<Utc>,
    ) -> Result<Ride, AppError> {
        let rider = self
            .riders
            .find_rider(rider_id)
            .await?
            .ok_or_else(|| AppError::NotFound(anyhow!("rider {} not found", rider_id)))?;

        let fare = self
            .fare
            .calculate_fare(pickup, dropoff, request_time)
            .await?;

        let matched = self.matcher.select_driver(rider.rating, pickup).await?;

        let ride = self
            .rides
            .save_ride(Ride::new(
                rider.id,
                pickup,
                dropoff,
                payment_method,
                fare,
                request_time,
            ))
            .await?;

        tracing::info!(ride_id = %ride.id, fare = fare, matched_driver = %matched.id, "ride requested");
        notify_detached(
            self.notifier.clone(),
            matched.id,
            "Ride request nearby",
            &format!("Pickup at ({:.4}, {:.4})", pickup.lat, pickup.lon),
        );
        Ok(ride)
    }

    /// REQUESTED → ACCEPTED. Issues the one-time password and takes the
    /// driver off the available pool.
    #[instrument(skip(self))]
    pub async fn accept_ride(&self, ride_id: Uuid, driver_id: Uuid) -> Result<Ride, AppError> {
        let lock = self.locks.lock_for(ride_id);
        let _guard = lock.lock().await;

        let mut ride = self.ride(ride_id).await?;
        if ride.status != RideStatus::Requested {
            return Err(AppError::InvalidStateTransition(anyhow!(
                "ride {} cannot be accepted from {}",
                ride_id,
                ride.status
            )));
        }

        let driver = self
            .drivers
            .find_driver(driver_id)
            .await?
            .ok_or_else(|| AppError::NotFound(anyhow!("driver {} not found", driver_id)))?;
        if !driver.available {
            return Err(AppError::Conflict(anyhow!(
                "driver {} is not available",
                driver_id
            )));
        }

        let otp = self.generate_otp();
        ride.driver_id = Some(driver.id);
        ride.otp = Some(otp.clone());
        ride.status = RideStatus::Accepted;
        let ride = self.rides.save_ride(ride).await?;

        self.set_driver_availability(driver.id, false).await?;

        tracing::info!(ride_id = %ride_id, driver_id = %driver.id, "ride accepted");
        notify_detached(
            self.notifier.clone(),
            ride.rider_id,
            "Driver on the way",
            &format!("Share OTP {} with your driver to start the ride", otp),
        );
        Ok(ride)
    }

    /// ACCEPTED → ONGOING. The presented OTP must match the stored one;
    /// a mismatch leaves the ride ACCEPTED.
    #[instrument(skip(self, otp))]
    pub async fn start_ride(&self, ride_id: Uuid, otp: &str) -> Result<Ride, AppError> {
        let lock = self.locks.lock_for(ride_id);
        let _guard = lock.lock().await;

        let mut ride = self.ride(ride_id).await?;
        if ride.status != RideStatus::Accepted {
            return Err(AppError::InvalidStateTransition(anyhow!(
                "ride {} cannot start from {}",
                ride_id,
                ride.status
            )));
        }
        if ride.otp.as_deref() != Some(otp) {
            return Err(AppError::OtpMismatch);
        }

        ride.status = RideStatus::Ongoing;
        ride.started_at = Some(Utc::now());
        let ride = self.rides.save_ride(ride).await?;

        tracing::info!(ride_id = %ride_id, "ride started");
        Ok(ride)
    }

    /// ONGOING → COMPLETED. Creates the rating row, frees the driver and
    /// settles the payment.
    ///
    /// A second call on a completed ride goes straight to settlement and
    /// reports `AlreadySettled` once the payment is confirmed; a wallet
    /// failure leaves the payment PENDING for a caller-initiated retry.
    #[instrument(skip(self))]
    pub async fn complete_ride(&self, ride_id: Uuid) -> Result<Ride, AppError> {
        let lock = self.locks.lock_for(ride_id);
        let _guard = lock.lock().await;

        let mut ride = self.ride(ride_id).await?;
        match ride.status {
            RideStatus::Ongoing => {
                ride.status = RideStatus::Completed;
                ride.ended_at = Some(Utc::now());
                ride = self.rides.save_ride(ride).await?;

                if let Some(driver_id) = ride.driver_id {
                    self.set_driver_availability(driver_id, true).await?;
                }
                self.ratings.create_rating(&ride).await?;
                let payment = self.payments.create_payment(&ride).await?;

                tracing::info!(ride_id = %ride_id, payment_id = %payment.id, "ride completed");
                notify_detached(
                    self.notifier.clone(),
                    ride.rider_id,
                    "Ride completed",
                    &format!("Fare: {:.2}", payment.amount),
                );

                self.payments.process_payment(payment.id).await?;
                Ok(ride)
            }
            RideStatus::Completed => {
                // Settlement path only: confirms a pending payment or
                // reports AlreadySettled.
                let payment = self
                    .payments
                    .find_payment_for_ride(ride_id)
                    .await?
                    .ok_or_else(|| {
                        AppError::NotFound(anyhow!("payment for ride {} not found", ride_id))
                    })?;
                self.payments.process_payment(payment.id).await?;
                Ok(ride)
            }
            other => Err(AppError::InvalidStateTransition(anyhow!(
                "ride {} cannot complete from {}",
                ride_id,
                other
            ))),
        }
    }

    /// Any pre-ONGOING state → CANCELLED. Frees the driver when one was
    /// already committed; no penalty is charged.
    #[instrument(skip(self))]
    pub async fn cancel_ride(&self, ride_id: Uuid) -> Result<Ride, AppError> {
        let lock = self.locks.lock_for(ride_id);
        let _guard = lock.lock().await;

        let mut ride = self.ride(ride_id).await?;
        if !ride.status.is_cancellable() {
            return Err(AppError::InvalidStateTransition(anyhow!(
                "ride {} cannot be cancelled from {}",
                ride_id,
                ride.status
            )));
        }

        ride.status = RideStatus::Cancelled;
        ride.ended_at = Some(Utc::now());
        let ride = self.rides.save_ride(ride).await?;

        if let Some(driver_id) = ride.driver_id {
            self.set_driver_availability(driver_id, true).await?;
            notify_detached(
                self.notifier.clone(),
                driver_id,
                "Ride cancelled",
                "The rider cancelled the ride",
            );
        }
        notify_detached(
            self.notifier.clone(),
            ride.rider_id,
            "Ride cancelled",
            "Your ride was cancelled",
        );

        tracing::info!(ride_id = %ride_id, "ride cancelled");
        Ok(ride)
    }
}
