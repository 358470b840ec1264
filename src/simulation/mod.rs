//! Concurrent traffic simulation engine
//!
//! Cities and roads each run on their own worker thread and talk through
//! queues. [`Simulation`] owns the topology and is the entry point for
//! editing it, starting and stopping it, and taking snapshots.

mod city;
mod config;
mod error;
mod events;
mod locks;
mod plate;
mod queue;
mod road;
mod road_network;
mod runnable;
mod snapshot;
mod trip;
mod types;
mod vehicle;
mod world;

pub use city::City;
pub use config::{CongestionModel, SimConfig};
pub use error::TopologyError;
pub use events::{DespawnReason, SimulationListener, SimulationStats};
pub use plate::{Plate, PlateAllocator, PlateParseError, PLATE_COUNT};
pub use queue::UnboundedQueue;
pub use road::Road;
pub use road_network::{congestion_weight, Destination};
pub use runnable::{Runnable, Tick};
pub use snapshot::{RoadRecord, Snapshot, VehicleRecord};
pub use trip::Trip;
pub use types::{
    CityData, Position, RoadData, RoadKey, Rgba, VehicleData, DEFAULT_GENERATION_TIME,
    DEFAULT_MAX_SPEED, DEFAULT_PROCESSING_TIME,
};
pub use vehicle::Vehicle;
pub use world::Simulation;
