//! In-process platform harness for workflow tests.
//!
//! Wires the full ride-service stack against the in-memory store with a
//! deterministic distance estimator, so end-to-end flows run without any
//! external infrastructure.

use std::sync::Arc;

use async_trait::async_trait;
use ride_service::config::RideConfig;
use ride_service::models::{Driver, GeoPoint, Rider};
use ride_service::services::{
    DistanceEstimator, DistanceTimeFareStrategy, DriverMatcher, EstimatorClient, FareCalculator,
    PaymentService, RatingService, RideService, RouteEstimate, TracingNotifier, WalletService,
};
use ride_service::store::locks::LockRegistry;
use ride_service::store::memory::InMemoryStore;
use ride_service::store::{DriverStore, RiderStore};
use service_core::error::AppError;
use service_core::retry::RetryConfig;

/// Deterministic estimator: every route resolves to the same distance.
pub struct StubEstimator {
    pub distance_km: f64,
}

#[async_trait]
impl DistanceEstimator for StubEstimator {
    async fn estimate(&self, _: GeoPoint, _: GeoPoint) -> Result<RouteEstimate, AppError> {
        Ok(RouteEstimate {
            distance_km: self.distance_km,
            duration_min: self.distance_km * 3.0,
        })
    }
}

pub struct Platform {
    pub store: Arc<InMemoryStore>,
    pub config: RideConfig,
    pub rides: Arc<RideService>,
    pub wallets: Arc<WalletService>,
    pub payments: Arc<PaymentService>,
    pub ratings: Arc<RatingService>,
}

impl Platform {
    /// Platform with default rates and a fixed route distance.
    pub fn start(distance_km: f64) -> Self {
        Self::start_with_config(distance_km, RideConfig::default())
    }

    pub fn start_with_config(distance_km: f64, config: RideConfig) -> Self {
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

        let estimator = EstimatorClient::new(
            Arc::new(StubEstimator { distance_km }),
            config.distance_timeout,
            RetryConfig::no_retry(),
        );
        let fare = FareCalculator::new(
            estimator,
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

        Self {
            store,
            config,
            rides,
            wallets,
            payments,
            ratings,
        }
    }

    pub async fn register_rider(&self, name: &str, rating: f64) -> Rider {
        let mut rider = Rider::new(name);
        rider.rating = rating;
        self.store.save_rider(rider).await.expect("save rider")
    }

    pub async fn register_driver(&self, name: &str, rating: f64, location: GeoPoint) -> Driver {
        let mut driver = Driver::new(name, location);
        driver.rating = rating;
        self.store.save_driver(driver).await.expect("save driver")
    }
}
