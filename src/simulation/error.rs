//! Topology edit errors
//!
//! A failed edit leaves the simulation exactly as it was.

use thiserror::Error;

use super::plate::Plate;
use super::types::RoadKey;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TopologyError {
    #[error("city {0} already exists")]
    DuplicateCity(String),

    #[error("road {0} already exists")]
    DuplicateRoad(RoadKey),

    #[error("city {0} not found")]
    UnknownCity(String),

    #[error("road {0} not found")]
    UnknownRoad(RoadKey),

    #[error("road from {0} to itself")]
    SameEndpoints(String),

    #[error("plate {0} is already in use")]
    DuplicatePlate(Plate),
}
