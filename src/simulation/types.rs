//! Core types for the traffic simulation
//!
//! Plain data records shared by the entities, the snapshot format and the
//! public API.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use super::plate::Plate;

/// A 2D position on the map
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Position) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn lerp(&self, other: &Position, t: f64) -> Position {
        Position {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }
}

/// An 8-bit RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::opaque(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }
}

/// Identity of a directed road: the names of its two endpoint cities
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoadKey {
    pub src: String,
    pub dst: String,
}

impl RoadKey {
    pub fn new(src: impl Into<String>, dst: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            dst: dst.into(),
        }
    }

    /// The same road in the opposite direction
    pub fn reversed(&self) -> Self {
        Self {
            src: self.dst.clone(),
            dst: self.src.clone(),
        }
    }
}

impl fmt::Display for RoadKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}", self.src, self.dst)
    }
}

/// Default time between two vehicle spawns of a city
pub const DEFAULT_GENERATION_TIME: Duration = Duration::from_secs(2);

/// Default time between two inbound-queue polls of a city
pub const DEFAULT_PROCESSING_TIME: Duration = Duration::from_millis(250);

/// Default road speed limit, in km/h
pub const DEFAULT_MAX_SPEED: f64 = 130.0;

/// Properties of a city
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityData {
    pub name: String,
    pub color: Rgba,
    pub position: Position,
    pub generation_time: Duration,
    pub processing_time: Duration,
}

impl CityData {
    pub fn new(name: impl Into<String>, position: Position) -> Self {
        Self {
            name: name.into(),
            color: Rgba::WHITE,
            position,
            generation_time: DEFAULT_GENERATION_TIME,
            processing_time: DEFAULT_PROCESSING_TIME,
        }
    }

    pub fn with_color(mut self, color: Rgba) -> Self {
        self.color = color;
        self
    }

    pub fn with_generation_time(mut self, generation_time: Duration) -> Self {
        self.generation_time = generation_time;
        self
    }

    pub fn with_processing_time(mut self, processing_time: Duration) -> Self {
        self.processing_time = processing_time;
        self
    }
}

/// Properties of a road
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoadData {
    /// Speed limit for every vehicle on the road, in km/h
    pub max_speed: f64,
}

impl RoadData {
    pub fn new(max_speed: f64) -> Self {
        Self { max_speed }
    }
}

impl Default for RoadData {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SPEED)
    }
}

/// Properties of a vehicle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleData {
    pub plate: Plate,
    pub color: Rgba,
    /// Progress along the current road, in `[0, 1)`
    pub progress: f64,
    /// Cruise speed in km/h, capped by the road's speed limit
    pub preferred_speed: f64,
}

/// Global speed multiplier shared by the coordinator and every road
pub(crate) type SharedSpeed = Arc<RwLock<f64>>;
