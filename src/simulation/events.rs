//! Simulation observers and statistics

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use super::city::City;
use super::road::Road;
use super::vehicle::Vehicle;

/// Why a vehicle left the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DespawnReason {
    /// Reached the last city of its trip
    Completed,
    /// Its next road, city or queue went away under it
    Discarded,
}

/// Observer of structural changes and vehicle lifetimes
///
/// Callbacks run on whichever thread made the change, city and road workers
/// included, so they should return quickly.
pub trait SimulationListener: Send + Sync {
    fn city_added(&self, _city: &Arc<City>) {}
    fn city_removed(&self, _city: &Arc<City>) {}
    fn road_added(&self, _road: &Arc<Road>) {}
    fn road_removed(&self, _road: &Arc<Road>) {}
    fn vehicle_spawned(&self, _vehicle: &Arc<Vehicle>) {}
    fn vehicle_despawned(&self, _vehicle: &Arc<Vehicle>, _reason: DespawnReason) {}
}

/// Counters since the simulation was created
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimulationStats {
    pub spawned: u64,
    pub completed: u64,
    pub discarded: u64,
    /// Spawn attempts dropped because no route existed
    pub unroutable: u64,
}

impl SimulationStats {
    /// Vehicles spawned that have neither completed nor been discarded
    pub fn in_flight(&self) -> u64 {
        self.spawned.saturating_sub(self.completed + self.discarded)
    }

    pub fn success_rate(&self) -> f64 {
        if self.spawned == 0 {
            0.0
        } else {
            self.completed as f64 / self.spawned as f64 * 100.0
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct StatsCounters {
    spawned: AtomicU64,
    completed: AtomicU64,
    discarded: AtomicU64,
    unroutable: AtomicU64,
}

impl StatsCounters {
    pub(crate) fn record_spawn(&self) {
        self.spawned.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_despawn(&self, reason: DespawnReason) {
        match reason {
            DespawnReason::Completed => self.completed.fetch_add(1, Ordering::Relaxed),
            DespawnReason::Discarded => self.discarded.fetch_add(1, Ordering::Relaxed),
        };
    }

    pub(crate) fn record_unroutable(&self) {
        self.unroutable.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> SimulationStats {
        SimulationStats {
            spawned: self.spawned.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
            discarded: self.discarded.load(Ordering::Relaxed),
            unroutable: self.unroutable.load(Ordering::Relaxed),
        }
    }
}
