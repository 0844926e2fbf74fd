//! Rider and driver entities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rider {
    pub id: Uuid,
    pub name: String,
    /// Rolling average over all rider-role rating rows; 0.0 with no rows.
    pub rating: f64,
    pub created_at: DateTime<Utc>,
}

impl Rider {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            rating: 0.0,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Driver {
    pub id: Uuid,
    pub name: String,
    /// Rolling average over all driver-role rating rows; 0.0 with no rows.
    pub rating: f64,
    /// Free for a new ride. Cleared at acceptance, restored at
    /// completion or cancellation.
    pub available: bool,
    pub location: super::geo::GeoPoint,
    /// Registration time, used as the matching tie-break.
    pub created_at: DateTime<Utc>,
}

impl Driver {
    pub fn new(name: impl Into<String>, location: super::geo::GeoPoint) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            rating: 0.0,
            available: true,
            location,
            created_at: Utc::now(),
        }
    }
}
