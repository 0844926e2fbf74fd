//! Per-ride rating record, created at ride completion.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One row per completed ride. Both scores start unset; each side is
/// settable exactly once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rating {
    pub id: Uuid,
    pub ride_id: Uuid,
    pub rider_id: Uuid,
    pub driver_id: Uuid,
    /// Score given to the driver by the rider, 1..=5.
    pub driver_rating: Option<u8>,
    /// Score given to the rider by the driver, 1..=5.
    pub rider_rating: Option<u8>,
    pub created_at: DateTime<Utc>,
}

impl Rating {
    pub fn new(ride_id: Uuid, rider_id: Uuid, driver_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            ride_id,
            rider_id,
            driver_id,
            driver_rating: None,
            rider_rating: None,
            created_at: Utc::now(),
        }
    }
}
