//! Per-aggregate lock registry.
//!
//! Serializes ride transitions per ride id and balance updates per wallet
//! id without a global lock. Locks are created on first use and live for
//! the registry's lifetime; the entity population is bounded by active
//! aggregates, so no eviction is needed here.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Default)]
pub struct LockRegistry {
    locks: DashMap<Uuid, Arc<Mutex<()>>>,
}

impl LockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock handle for one aggregate id.
    pub fn lock_for(&self, id: Uuid) -> Arc<Mutex<()>> {
        self.locks
            .entry(id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Lock handles for a pair of aggregates, ordered by id so that two
    /// tasks locking the same pair never deadlock.
    pub fn lock_pair(&self, a: Uuid, b: Uuid) -> (Arc<Mutex<()>>, Arc<Mutex<()>>) {
        if a <= b {
            (self.lock_for(a), self.lock_for(b))
        } else {
            (self.lock_for(b), self.lock_for(a))
        }
    }
}
