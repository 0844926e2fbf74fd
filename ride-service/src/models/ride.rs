//! Ride aggregate: lifecycle status and lifecycle timestamps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::geo::GeoPoint;
use super::payment::PaymentMethod;

/// Ride lifecycle status.
///
/// Legal transitions: Requested → Accepted → Ongoing → Completed, plus
/// Cancelled from Requested or Accepted only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RideStatus {
    Requested,
    Accepted,
    Ongoing,
    Completed,
    Cancelled,
}

impl RideStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Requested => "REQUESTED",
            Self::Accepted => "ACCEPTED",
            Self::Ongoing => "ONGOING",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Cancellation is allowed only before the ride is underway.
    pub fn is_cancellable(&self) -> bool {
        matches!(self, Self::Requested | Self::Accepted)
    }
}

impl std::fmt::Display for RideStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A ride from request through settlement.
///
/// Invariants: `driver_id` is set for every status past Requested;
/// `fare` is set from acceptance onward; `started_at <= ended_at` when
/// both are present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ride {
    pub id: Uuid,
    pub rider_id: Uuid,
    pub driver_id: Option<Uuid>,
    pub pickup: GeoPoint,
    pub dropoff: GeoPoint,
    pub status: RideStatus,
    pub payment_method: PaymentMethod,
    /// One-time password issued at acceptance, consumed at start.
    pub otp: Option<String>,
    pub fare: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl Ride {
    pub fn new(
        rider_id: Uuid,
        pickup: GeoPoint,
        dropoff: GeoPoint,
        payment_method: PaymentMethod,
        fare: f64,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            rider_id,
            driver_id: None,
            pickup,
            dropoff,
            status: RideStatus::Requested,
            payment_method,
            otp: None,
            fare: Some(fare),
            created_at,
            started_at: None,
            ended_at: None,
        }
    }
}
