//! Simulation configuration

use std::ops::Range;
use std::time::Duration;

use super::plate::Plate;

/// Constants of the congestion-weighted road cost used for routing
///
/// `weight = base_cost + free_flow_scale * (distance / max_speed) * (vehicles * density_scale / distance)`,
/// i.e. free-flow travel time scaled by the number of vehicles per unit of
/// length. The defaults reproduce the plain formula.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CongestionModel {
    pub free_flow_scale: f64,
    pub density_scale: f64,
    pub base_cost: f64,
}

impl Default for CongestionModel {
    fn default() -> Self {
        Self {
            free_flow_scale: 1.0,
            density_scale: 1.0,
            base_cost: 0.0,
        }
    }
}

/// Settings fixed at simulation construction
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Initial global speed multiplier applied to wall-clock time
    pub speed: f64,
    /// Seed for spawn speeds and random destinations, `None` for thread RNG
    pub seed: Option<u64>,
    /// Wall-clock period of a road's movement tick
    pub road_tick: Duration,
    /// Longest an entity waits on its timers before re-checking for a stop
    pub poll_interval: Duration,
    pub congestion: CongestionModel,
    /// Vehicle count from which a road advances its vehicles on the rayon pool
    pub parallel_threshold: usize,
    /// Range of preferred speeds given to spawned vehicles, in km/h
    pub spawn_speed: Range<f64>,
    /// First plate the allocator hands out
    pub first_plate: Plate,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            speed: 1.0,
            seed: None,
            road_tick: Duration::from_secs(1) / 60,
            poll_interval: Duration::from_millis(50),
            congestion: CongestionModel::default(),
            parallel_threshold: 64,
            spawn_speed: 80.0..580.0,
            first_plate: Plate::FIRST,
        }
    }
}

impl SimConfig {
    /// Default configuration with a seeded RNG for reproducible spawns
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }

    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = speed;
        self
    }
}
