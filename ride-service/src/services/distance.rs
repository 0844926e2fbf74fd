//! External route estimation boundary.
//!
//! The routing provider lives outside this crate; the core sees it only
//! through [`DistanceEstimator`]. [`EstimatorClient`] wraps every call in a
//! timeout and bounded retry so a slow provider can never hang a
//! ride-request flow.

use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use async_trait::async_trait;
use service_core::error::AppError;
use service_core::retry::{with_retry, RetryConfig};
use tracing::instrument;

use crate::models::GeoPoint;

/// Travel estimate between two points over the road network.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteEstimate {
    pub distance_km: f64,
    pub duration_min: f64,
}

/// External routing provider. Implementations perform network I/O; failure
/// to resolve a route surfaces as `AppError::DistanceUnavailable`.
#[async_trait]
pub trait DistanceEstimator: Send + Sync {
    async fn estimate(&self, from: GeoPoint, to: GeoPoint) -> Result<RouteEstimate, AppError>;
}

/// Timeout- and retry-bounded wrapper around a [`DistanceEstimator`].
pub struct EstimatorClient {
    estimator: Arc<dyn DistanceEstimator>,
    timeout: Duration,
    retry: RetryConfig,
}

impl EstimatorClient {
    pub fn new(estimator: Arc<dyn DistanceEstimator>, timeout: Duration, retry: RetryConfig) -> Self {
        Self {
            estimator,
            timeout,
            retry,
        }
    }

    #[instrument(skip(self))]
    pub async fn estimate(&self, from: GeoPoint, to: GeoPoint) -> Result<RouteEstimate, AppError> {
        with_retry(&self.retry, "distance_estimate", || async {
            match tokio::time::timeout(self.timeout, self.estimator.estimate(from, to)).await {
                Ok(result) => result,
                Err(_) => Err(AppError::DistanceUnavailable(anyhow!(
                    "route lookup exceeded {:?}",
                    self.timeout
                ))),
            }
        })
        .await
    }
}
