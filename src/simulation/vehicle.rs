//! Vehicle state and movement
//!
//! A vehicle is shared between the road moving it, the cities routing it and
//! any outside observer, so every mutable property sits behind a lock.

use std::sync::{Mutex, RwLock};

use super::locks::{lock, read, write};
use super::plate::Plate;
use super::trip::Trip;
use super::types::{RoadKey, Rgba, VehicleData};

#[derive(Debug)]
struct VehicleProps {
    color: Rgba,
    progress: f64,
    preferred_speed: f64,
}

/// A vehicle in the traffic simulation
#[derive(Debug)]
pub struct Vehicle {
    plate: Plate,
    props: RwLock<VehicleProps>,
    /// Only ever advanced by the city currently routing the vehicle
    trip: Mutex<Trip>,
    road: RwLock<Option<RoadKey>>,
}

impl Vehicle {
    pub fn new(data: VehicleData, trip: Trip) -> Self {
        Self {
            plate: data.plate,
            props: RwLock::new(VehicleProps {
                color: data.color,
                progress: data.progress,
                preferred_speed: data.preferred_speed,
            }),
            trip: Mutex::new(trip),
            road: RwLock::new(None),
        }
    }

    pub fn plate(&self) -> Plate {
        self.plate
    }

    pub fn color(&self) -> Rgba {
        read(&self.props).color
    }

    pub fn set_color(&self, color: Rgba) {
        write(&self.props).color = color;
    }

    /// Progress along the current road, in `[0, 1)`
    pub fn progress(&self) -> f64 {
        read(&self.props).progress
    }

    pub fn preferred_speed(&self) -> f64 {
        read(&self.props).preferred_speed
    }

    /// The effective speed is still capped by the road's speed limit
    pub fn set_preferred_speed(&self, speed: f64) {
        write(&self.props).preferred_speed = speed;
    }

    /// Copy of the trip, cursor included
    pub fn trip(&self) -> Trip {
        lock(&self.trip).clone()
    }

    /// The road the vehicle was last routed onto, if it is still on one
    pub fn road(&self) -> Option<RoadKey> {
        read(&self.road).clone()
    }

    pub fn data(&self) -> VehicleData {
        let props = read(&self.props);
        VehicleData {
            plate: self.plate,
            color: props.color,
            progress: props.progress,
            preferred_speed: props.preferred_speed,
        }
    }

    /// Moves the vehicle along a road of length `distance` for `elapsed`
    /// simulated hours.
    ///
    /// Returns `true` when the end of the road is reached. Progress is then
    /// left at its last value below 1 so observers never see it overflow;
    /// the hand-off resets it.
    pub(crate) fn advance(&self, elapsed: f64, max_speed: f64, distance: f64) -> bool {
        let mut props = write(&self.props);
        let speed = props.preferred_speed.min(max_speed).max(0.0);
        let progress = props.progress + speed * elapsed / distance;
        if progress >= 1.0 {
            return true;
        }
        props.progress = progress;
        false
    }

    pub(crate) fn reset_progress(&self) {
        write(&self.props).progress = 0.0;
    }

    pub(crate) fn set_road(&self, road: Option<RoadKey>) {
        *write(&self.road) = road;
    }

    /// Moves the trip cursor to the next city and returns its name, or
    /// `None` when the trip is over.
    pub(crate) fn next_hop(&self) -> Option<String> {
        let mut trip = lock(&self.trip);
        if trip.arrived() {
            return None;
        }
        trip.advance();
        if trip.arrived() {
            return None;
        }
        trip.current().map(str::to_owned)
    }
}
