//! Ride lifecycle integration tests: transition DAG, OTP gating and the
//! request-time failure modes.

mod common;

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use common::{dropoff, pickup, seed_driver, seed_rider, spawn_app, spawn_app_with};
use ride_service::config::RideConfig;
use ride_service::models::{PaymentMethod, RideStatus};
use service_core::error::AppError;

#[tokio::test]
async fn request_computes_fare_from_distance_and_surge() {
    let app = spawn_app();
    let rider = seed_rider(&app, 4.0).await;
    seed_driver(&app, 4.5, pickup()).await;

    // 19:00: inside the surge window. 5 km * 10/km * 1.5 = 75.
    let evening = Utc.with_ymd_and_hms(2026, 3, 14, 19, 0, 0).unwrap();
    let ride = app
        .rides
        .request_ride(rider.id, pickup(), dropoff(), PaymentMethod::Wallet, evening)
        .await
        .unwrap();

    assert_eq!(ride.status, RideStatus::Requested);
    assert_eq!(ride.fare, Some(75.0));
    assert!(ride.driver_id.is_none());
    assert!(ride.otp.is_none());
}

#[tokio::test]
async fn unroutable_request_fails_before_matching() {
    let app = spawn_app_with(Arc::new(common::UnroutableEstimator), RideConfig::default());
    let rider = seed_rider(&app, 4.0).await;
    seed_driver(&app, 4.5, pickup()).await;

    let err = app
        .rides
        .request_ride(rider.id, pickup(), dropoff(), PaymentMethod::Cash, Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::DistanceUnavailable(_)));
}

#[tokio::test]
async fn request_with_no_drivers_fails_cleanly() {
    let app = spawn_app();
    let rider = seed_rider(&app, 4.0).await;

    let err = app
        .rides
        .request_ride(rider.id, pickup(), dropoff(), PaymentMethod::Cash, Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NoDriverAvailable(_)));
}

#[tokio::test]
async fn accept_issues_otp_and_reserves_driver() {
    let app = spawn_app();
    let rider = seed_rider(&app, 4.0).await;
    let driver = seed_driver(&app, 4.5, pickup()).await;

    let ride = app
        .rides
        .request_ride(rider.id, pickup(), dropoff(), PaymentMethod::Cash, Utc::now())
        .await
        .unwrap();
    let ride = app.rides.accept_ride(ride.id, driver.id).await.unwrap();

    assert_eq!(ride.status, RideStatus::Accepted);
    assert_eq!(ride.driver_id, Some(driver.id));
    let otp = ride.otp.expect("otp issued at acceptance");
    assert_eq!(otp.len(), app.config.otp_digits as usize);
    assert!(otp.chars().all(|c| c.is_ascii_digit()));

    // Driver is no longer in the available pool.
    use ride_service::store::DriverStore;
    let stored = app.store.find_driver(driver.id).await.unwrap().unwrap();
    assert!(!stored.available);
}

#[tokio::test]
async fn start_requires_matching_otp() {
    let app = spawn_app();
    let rider = seed_rider(&app, 4.0).await;
    let driver = seed_driver(&app, 4.5, pickup()).await;

    let ride = app
        .rides
        .request_ride(rider.id, pickup(), dropoff(), PaymentMethod::Cash, Utc::now())
        .await
        .unwrap();
    let ride = app.rides.accept_ride(ride.id, driver.id).await.unwrap();
    let otp = ride.otp.clone().unwrap();

    let wrong = if otp == "0000" { "9999" } else { "0000" };
    let err = app.rides.start_ride(ride.id, wrong).await.unwrap_err();
    assert!(matches!(err, AppError::OtpMismatch));

    // Mismatch left the ride ACCEPTED; the right code still works.
    let ride = app.rides.start_ride(ride.id, &otp).await.unwrap();
    assert_eq!(ride.status, RideStatus::Ongoing);
    assert!(ride.started_at.is_some());
}

#[tokio::test]
async fn transitions_reject_wrong_source_states() {
    let app = spawn_app();
    let rider = seed_rider(&app, 4.0).await;
    let driver = seed_driver(&app, 4.5, pickup()).await;

    let ride = app
        .rides
        .request_ride(rider.id, pickup(), dropoff(), PaymentMethod::Cash, Utc::now())
        .await
        .unwrap();

    // Cannot start or complete a ride that was never accepted.
    let err = app.rides.start_ride(ride.id, "1234").await.unwrap_err();
    assert!(matches!(err, AppError::InvalidStateTransition(_)));
    let err = app.rides.complete_ride(ride.id).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidStateTransition(_)));

    // Double accept is rejected.
    app.rides.accept_ride(ride.id, driver.id).await.unwrap();
    let err = app.rides.accept_ride(ride.id, driver.id).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidStateTransition(_)));
}

#[tokio::test]
async fn cancel_allowed_until_ride_starts() {
    let app = spawn_app();
    let rider = seed_rider(&app, 4.0).await;
    let driver = seed_driver(&app, 4.5, pickup()).await;

    // Cancel from REQUESTED.
    let ride = app
        .rides
        .request_ride(rider.id, pickup(), dropoff(), PaymentMethod::Cash, Utc::now())
        .await
        .unwrap();
    let cancelled = app.rides.cancel_ride(ride.id).await.unwrap();
    assert_eq!(cancelled.status, RideStatus::Cancelled);

    // Cancel from ACCEPTED frees the driver.
    let ride = app
        .rides
        .request_ride(rider.id, pickup(), dropoff(), PaymentMethod::Cash, Utc::now())
        .await
        .unwrap();
    app.rides.accept_ride(ride.id, driver.id).await.unwrap();
    app.rides.cancel_ride(ride.id).await.unwrap();

    use ride_service::store::DriverStore;
    let stored = app.store.find_driver(driver.id).await.unwrap().unwrap();
    assert!(stored.available);

    // Never from ONGOING.
    let ride = app
        .rides
        .request_ride(rider.id, pickup(), dropoff(), PaymentMethod::Cash, Utc::now())
        .await
        .unwrap();
    let ride = app.rides.accept_ride(ride.id, driver.id).await.unwrap();
    let otp = ride.otp.clone().unwrap();
    app.rides.start_ride(ride.id, &otp).await.unwrap();

    let err = app.rides.cancel_ride(ride.id).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidStateTransition(_)));

    // Cancelled is terminal.
    let ride = app
        .rides
        .request_ride(rider.id, pickup(), dropoff(), PaymentMethod::Cash, Utc::now())
        .await
        .unwrap();
    app.rides.cancel_ride(ride.id).await.unwrap();
    let err = app.rides.cancel_ride(ride.id).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidStateTransition(_)));
}

#[tokio::test]
async fn concurrent_accepts_let_exactly_one_driver_win() {
    let app = spawn_app();
    let rider = seed_rider(&app, 4.0).await;
    let first = seed_driver(&app, 4.5, pickup()).await;
    let second = seed_driver(&app, 4.6, pickup()).await;

    let ride = app
        .rides
        .request_ride(rider.id, pickup(), dropoff(), PaymentMethod::Cash, Utc::now())
        .await
        .unwrap();

    let rides_a = app.rides.clone();
    let rides_b = app.rides.clone();
    let ride_id = ride.id;
    let (a, b) = tokio::join!(
        tokio::spawn(async move { rides_a.accept_ride(ride_id, first.id).await }),
        tokio::spawn(async move { rides_b.accept_ride(ride_id, second.id).await }),
    );
    let results = [a.unwrap(), b.unwrap()];

    let winners: Vec<_> = results.iter().filter(|r| r.is_ok()).collect();
    assert_eq!(winners.len(), 1, "exactly one accept must win");
    let loser = results.iter().find(|r| r.is_err()).unwrap();
    assert!(matches!(
        loser.as_ref().unwrap_err(),
        AppError::InvalidStateTransition(_)
    ));

    // The ride carries exactly the winner's driver.
    use ride_service::store::RideStore;
    let stored = app.store.find_ride(ride_id).await.unwrap().unwrap();
    assert_eq!(stored.status, RideStatus::Accepted);
    assert!(stored.driver_id == Some(first.id) || stored.driver_id == Some(second.id));
}

#[tokio::test]
async fn high_rated_riders_get_the_highest_rated_driver() {
    let app = spawn_app();
    let rider = seed_rider(&app, 4.9).await;

    // The best-rated driver is far away; a low-rated one is at the pickup.
    let far_away = ride_service::models::GeoPoint::new(13.20, 77.70);
    let best = seed_driver(&app, 5.0, far_away).await;
    seed_driver(&app, 3.0, pickup()).await;

    let matcher = ride_service::services::DriverMatcher::new(app.store.clone(), &app.config);

    let chosen = matcher.select_driver(rider.rating, pickup()).await.unwrap();
    assert_eq!(chosen.id, best.id);

    // A middling rider gets the nearest driver instead.
    let chosen = matcher.select_driver(3.5, pickup()).await.unwrap();
    assert_ne!(chosen.id, best.id);
}
