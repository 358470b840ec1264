//! Roads: directed edges that move the vehicles on them
//!
//! Each running road owns a worker thread that waits on a fixed-rate ticker
//! and on its inbound queue. A tick advances every vehicle, fanning out over
//! the rayon pool once the road is busy enough, and hands vehicles that
//! reached the end to the destination city.

use crossbeam_channel::{select, tick, Receiver};
use log::trace;
use rayon::prelude::*;
use std::fmt;
use std::sync::{Arc, Mutex, RwLock, Weak};
use std::time::{Duration, Instant};

use super::city::City;
use super::config::CongestionModel;
use super::locks::{lock, read, write};
use super::queue::UnboundedQueue;
use super::road_network::{congestion_weight, MIN_ROAD_LENGTH};
use super::runnable::{Runnable, Tick};
use super::types::{Position, RoadData, RoadKey, SharedSpeed};
use super::vehicle::Vehicle;

const SECONDS_PER_HOUR: f64 = 3600.0;

/// Per-road copy of the simulation settings a road needs
#[derive(Debug, Clone, Copy)]
pub(crate) struct RoadSettings {
    pub tick: Duration,
    pub poll: Duration,
    pub parallel_threshold: usize,
    pub congestion: CongestionModel,
}

/// A one-way road between two cities
pub struct Road {
    key: RoadKey,
    data: RwLock<RoadData>,
    // Cities own their roads, roads only point back.
    src: Weak<City>,
    dst: Weak<City>,
    vehicles: RwLock<Vec<Arc<Vehicle>>>,
    inbound: UnboundedQueue<Arc<Vehicle>>,
    ticker: Receiver<Instant>,
    last_advance: Mutex<Instant>,
    speed: SharedSpeed,
    settings: RoadSettings,
    runnable: Runnable,
}

impl Road {
    pub(crate) fn new(
        data: RoadData,
        src: &Arc<City>,
        dst: &Arc<City>,
        speed: SharedSpeed,
        settings: RoadSettings,
    ) -> Self {
        let key = RoadKey::new(src.name(), dst.name());
        let runnable = Runnable::new(format!("road {}", key));
        Self {
            key,
            data: RwLock::new(data),
            src: Arc::downgrade(src),
            dst: Arc::downgrade(dst),
            vehicles: RwLock::new(Vec::with_capacity(32)),
            inbound: UnboundedQueue::new(),
            ticker: tick(settings.tick),
            last_advance: Mutex::new(Instant::now()),
            speed,
            settings,
            runnable,
        }
    }

    pub fn key(&self) -> &RoadKey {
        &self.key
    }

    pub fn src_name(&self) -> &str {
        &self.key.src
    }

    pub fn dst_name(&self) -> &str {
        &self.key.dst
    }

    /// Source city, unless it has been removed since
    pub fn src(&self) -> Option<Arc<City>> {
        self.src.upgrade()
    }

    /// Destination city, unless it has been removed since
    pub fn dst(&self) -> Option<Arc<City>> {
        self.dst.upgrade()
    }

    pub fn data(&self) -> RoadData {
        *read(&self.data)
    }

    pub fn max_speed(&self) -> f64 {
        read(&self.data).max_speed
    }

    pub fn set_max_speed(&self, max_speed: f64) {
        write(&self.data).max_speed = max_speed;
    }

    /// Straight-line distance between the endpoints
    pub fn length(&self) -> Option<f64> {
        let src = self.src()?.position();
        let dst = self.dst()?.position();
        Some(src.distance(&dst))
    }

    /// Vehicles currently on the road
    pub fn vehicles(&self) -> Vec<Arc<Vehicle>> {
        read(&self.vehicles).clone()
    }

    pub fn vehicle_count(&self) -> usize {
        read(&self.vehicles).len()
    }

    /// Congestion-weighted routing cost, recomputed on every call
    pub fn weight(&self) -> f64 {
        let Some(distance) = self.length() else {
            return f64::INFINITY;
        };
        congestion_weight(
            distance,
            self.max_speed(),
            self.vehicle_count(),
            &self.settings.congestion,
        )
    }

    /// Map position of a vehicle travelling on this road
    pub fn vehicle_position(&self, vehicle: &Vehicle) -> Option<Position> {
        let src = self.src()?.position();
        let dst = self.dst()?.position();
        Some(src.lerp(&dst, vehicle.progress()))
    }

    /// Hands a vehicle to the road. It joins the vehicle list on the road's
    /// next cycle.
    pub fn enqueue(&self, vehicle: Arc<Vehicle>) {
        self.inbound.push(vehicle);
    }

    pub fn start(self: &Arc<Self>) {
        self.runnable.start(Arc::clone(self));
    }

    pub fn stop(&self) {
        self.runnable.stop();
    }

    pub fn running(&self) -> bool {
        self.runnable.running()
    }

    /// Puts a vehicle straight on the road, bypassing the inbound queue
    pub(crate) fn admit(&self, vehicle: Arc<Vehicle>) {
        write(&self.vehicles).push(vehicle);
    }

    /// Closes the inbound queue and empties the road, returning every
    /// vehicle that was queued or travelling on it
    pub(crate) fn close(&self) -> Vec<Arc<Vehicle>> {
        self.inbound.close();
        let mut stranded = self.inbound.drain();
        stranded.append(&mut write(&self.vehicles));
        stranded
    }

    fn advance(&self) {
        let now = Instant::now();
        let wall_elapsed = {
            let mut last = lock(&self.last_advance);
            let elapsed = now.saturating_duration_since(*last);
            *last = now;
            elapsed
        };
        let elapsed = wall_elapsed.as_secs_f64() / SECONDS_PER_HOUR * *read(&self.speed);

        let Some(distance) = self.length() else {
            return;
        };
        let distance = distance.max(MIN_ROAD_LENGTH);
        let max_speed = self.max_speed();

        let vehicles = self.vehicles();
        if vehicles.is_empty() {
            return;
        }

        // Every vehicle moves before the list is touched again.
        let step = |vehicle: &Arc<Vehicle>| vehicle.advance(elapsed, max_speed, distance);
        let finished: Vec<bool> = if vehicles.len() >= self.settings.parallel_threshold {
            vehicles.par_iter().map(step).collect()
        } else {
            vehicles.iter().map(step).collect()
        };

        let arrived: Vec<Arc<Vehicle>> = vehicles
            .into_iter()
            .zip(finished)
            .filter_map(|(vehicle, done)| done.then_some(vehicle))
            .collect();
        if arrived.is_empty() {
            return;
        }

        write(&self.vehicles)
            .retain(|vehicle| !arrived.iter().any(|done| Arc::ptr_eq(done, vehicle)));

        let dst = self.dst();
        for vehicle in arrived {
            vehicle.set_road(None);
            match &dst {
                Some(city) => city.enqueue(vehicle),
                None => trace!("{}: destination gone, dropping {}", self.key, vehicle.plate()),
            }
        }
    }
}

impl fmt::Debug for Road {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Road")
            .field("key", &self.key)
            .field("max_speed", &self.max_speed())
            .field("vehicles", &self.vehicle_count())
            .field("running", &self.running())
            .finish()
    }
}

impl Tick for Road {
    fn tick(&self) {
        select! {
            recv(self.ticker) -> _ => self.advance(),
            recv(self.inbound.receiver()) -> vehicle => {
                if let Ok(vehicle) = vehicle {
                    self.admit(vehicle);
                }
            }
            default(self.settings.poll) => {}
        }
    }

    fn on_start(&self) {
        // Time spent stopped does not count as travel time.
        *lock(&self.last_advance) = Instant::now();
    }
}
