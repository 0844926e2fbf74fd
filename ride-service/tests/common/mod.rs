//! Common test utilities for ride-service integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::Utc;
use ride_service::config::RideConfig;
use ride_service::models::{Driver, GeoPoint, Rider};
use ride_service::services::{
    DistanceEstimator, DriverMatcher, EstimatorClient, FareCalculator, PaymentService,
    RatingService, RideService, RouteEstimate, TracingNotifier, WalletService,
    DistanceTimeFareStrategy,
};
use ride_service::store::locks::LockRegistry;
use ride_service::store::memory::InMemoryStore;
use ride_service::store::{DriverStore, RiderStore};
use service_core::error::AppError;
use service_core::retry::RetryConfig;

/// Estimator that always resolves to a fixed road distance.
pub struct FixedEstimator {
    pub distance_km: f64,
}

#[async_trait]
impl DistanceEstimator for FixedEstimator {
    async fn estimate(&self, _: GeoPoint, _: GeoPoint) -> Result<RouteEstimate, AppError> {
        Ok(RouteEstimate {
            distance_km: self.distance_km,
            duration_min: self.distance_km * 3.0,
        })
    }
}

/// Estimator whose provider is down.
pub struct UnroutableEstimator;

#[async_trait]
impl DistanceEstimator for UnroutableEstimator {
    async fn estimate(&self, _: GeoPoint, _: GeoPoint) -> Result<RouteEstimate, AppError> {
        Err(AppError::DistanceUnavailable(anyhow!("no route found")))
    }
}

pub struct TestApp {
    pub store: Arc<InMemoryStore>,
    pub config: RideConfig,
    pub rides: Arc<RideService>,
    pub wallets: Arc<WalletService>,
    pub payments: Arc<PaymentService>,
    pub ratings: Arc<RatingService>,
}

/// Wire the full service stack against an in-memory store.
pub fn spawn_app_with(estimator: Arc<dyn DistanceEstimator>, config: RideConfig) -> TestApp {
    service_core::observability::init_test_tracing();

    let store = Arc::new(InMemoryStore::new());
    let locks = Arc::new(LockRegistry::new());

    let wallets = Arc::new(WalletService::new(store.clone(), locks.clone()));
    let payments = Arc::new(PaymentService::new(
        store.clone(),
        store.clone(),
        wallets.clone(),
        locks.clone(),
        &config,
    ));
    let ratings = Arc::new(RatingService::new(
        store.clone(),
        store.clone(),
        store.clone(),
        locks.clone(),
    ));

    let estimator_client = EstimatorClient::new(
        estimator,
        config.distance_timeout,
        RetryConfig::no_retry(),
    );
    let fare = FareCalculator::new(
        estimator_client,
        Box::new(DistanceTimeFareStrategy::new(&config)),
    );
    let matcher = DriverMatcher::new(store.clone(), &config);

    let rides = Arc::new(RideService::new(
        store.clone(),
        store.clone(),
        store.clone(),
        fare,
        matcher,
        payments.clone(),
        ratings.clone(),
        Arc::new(TracingNotifier),
        locks,
        &config,
    ));

    TestApp {
        store,
        config,
        rides,
        wallets,
        payments,
        ratings,
    }
}

pub fn spawn_app() -> TestApp {
    spawn_app_with(
        Arc::new(FixedEstimator { distance_km: 5.0 }),
        RideConfig::default(),
    )
}

pub async fn seed_rider(app: &TestApp, rating: f64) -> Rider {
    let mut rider = Rider::new("test-rider");
    rider.rating = rating;
    app.store.save_rider(rider).await.unwrap()
}

pub async fn seed_driver(app: &TestApp, rating: f64, location: GeoPoint) -> Driver {
    let mut driver = Driver::new("test-driver", location);
    driver.rating = rating;
    driver.created_at = Utc::now();
    app.store.save_driver(driver).await.unwrap()
}

pub fn pickup() -> GeoPoint {
    GeoPoint::new(12.9716, 77.5946)
}

pub fn dropoff() -> GeoPoint {
    GeoPoint::new(12.9352, 77.6245)
}
