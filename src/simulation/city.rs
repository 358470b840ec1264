//! Cities: the nodes that spawn and route vehicles
//!
//! A running city waits on two timers. The generation timer spawns a new
//! vehicle with a freshly planned trip; the processing timer takes at most
//! one vehicle from the inbound queue. Both lead to the same routing step:
//! move the trip cursor and hand the vehicle to the matching outbound road.

use crossbeam_channel::{select, tick, Receiver};
use log::{debug, trace, warn};
use std::fmt;
use std::sync::{Arc, Mutex, RwLock, Weak};
use std::time::{Duration, Instant};

use super::events::DespawnReason;
use super::locks::{lock, read, write};
use super::queue::UnboundedQueue;
use super::road::Road;
use super::road_network::Destination;
use super::runnable::{Runnable, Tick};
use super::types::{CityData, Position, RoadKey, Rgba, VehicleData};
use super::vehicle::Vehicle;
use super::world::Shared;

/// Shortest timer period, a zero interval would spin the worker
const MIN_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Default)]
struct CityRoads {
    outbound: Vec<Arc<Road>>,
    inbound: Vec<Arc<Road>>,
}

struct CityTimers {
    generation: Receiver<Instant>,
    processing: Receiver<Instant>,
}

fn ticker(interval: Duration) -> Receiver<Instant> {
    tick(interval.max(MIN_INTERVAL))
}

/// A city in the traffic simulation
pub struct City {
    name: String,
    data: RwLock<CityData>,
    /// Locked apart from `data` so routing never waits on property readers
    roads: RwLock<CityRoads>,
    inbound: UnboundedQueue<Arc<Vehicle>>,
    timers: Mutex<CityTimers>,
    shared: Weak<Shared>,
    poll: Duration,
    runnable: Runnable,
}

impl City {
    pub(crate) fn new(data: CityData, shared: Weak<Shared>, poll: Duration) -> Self {
        let timers = CityTimers {
            generation: ticker(data.generation_time),
            processing: ticker(data.processing_time),
        };
        Self {
            name: data.name.clone(),
            runnable: Runnable::new(format!("city {}", data.name)),
            data: RwLock::new(data),
            roads: RwLock::new(CityRoads::default()),
            inbound: UnboundedQueue::new(),
            timers: Mutex::new(timers),
            shared,
            poll,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> CityData {
        read(&self.data).clone()
    }

    pub fn color(&self) -> Rgba {
        read(&self.data).color
    }

    pub fn set_color(&self, color: Rgba) {
        write(&self.data).color = color;
    }

    pub fn position(&self) -> Position {
        read(&self.data).position
    }

    pub fn set_position(&self, position: Position) {
        write(&self.data).position = position;
    }

    /// Time between two vehicle spawns
    pub fn generation_time(&self) -> Duration {
        read(&self.data).generation_time
    }

    pub fn set_generation_time(&self, interval: Duration) {
        let mut data = write(&self.data);
        data.generation_time = interval;
        lock(&self.timers).generation = ticker(interval);
    }

    /// Time between two polls of the inbound queue
    pub fn processing_time(&self) -> Duration {
        read(&self.data).processing_time
    }

    pub fn set_processing_time(&self, interval: Duration) {
        let mut data = write(&self.data);
        data.processing_time = interval;
        lock(&self.timers).processing = ticker(interval);
    }

    pub fn roads_out(&self) -> Vec<Arc<Road>> {
        read(&self.roads).outbound.clone()
    }

    pub fn roads_in(&self) -> Vec<Arc<Road>> {
        read(&self.roads).inbound.clone()
    }

    /// Outbound road towards `dst`, if any
    pub fn road_to(&self, dst: &str) -> Option<Arc<Road>> {
        read(&self.roads)
            .outbound
            .iter()
            .find(|road| road.dst_name() == dst)
            .cloned()
    }

    /// Vehicles waiting in the inbound queue
    pub fn queued(&self) -> usize {
        self.inbound.len()
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

    /// Hands an arriving vehicle to the city; it is routed on a later
    /// processing tick
    pub(crate) fn enqueue(&self, vehicle: Arc<Vehicle>) {
        self.inbound.push(vehicle);
    }

    pub(crate) fn attach_outbound(&self, road: Arc<Road>) {
        write(&self.roads).outbound.push(road);
    }

    pub(crate) fn attach_inbound(&self, road: Arc<Road>) {
        write(&self.roads).inbound.push(road);
    }

    pub(crate) fn detach_outbound(&self, key: &RoadKey) {
        write(&self.roads).outbound.retain(|road| road.key() != key);
    }

    pub(crate) fn detach_inbound(&self, key: &RoadKey) {
        write(&self.roads).inbound.retain(|road| road.key() != key);
    }

    /// Closes the inbound queue and returns what was still waiting in it
    pub(crate) fn close(&self) -> Vec<Arc<Vehicle>> {
        self.inbound.close();
        self.inbound.drain()
    }

    /// Sends a vehicle on the next leg of its trip, or retires it
    pub(crate) fn route(&self, vehicle: Arc<Vehicle>) {
        let Some(next) = vehicle.next_hop() else {
            self.despawn(&vehicle, DespawnReason::Completed);
            return;
        };

        // The push happens under the road-set lock: a road detached from this
        // city is closed only afterwards, so it never sees a late push.
        let routed = {
            let roads = read(&self.roads);
            match roads.outbound.iter().find(|road| road.dst_name() == next) {
                Some(road) => {
                    vehicle.reset_progress();
                    vehicle.set_road(Some(road.key().clone()));
                    road.enqueue(Arc::clone(&vehicle));
                    true
                }
                None => false,
            }
        };

        if !routed {
            debug!(
                "{}: no road to {} anymore, discarding {}",
                self.name,
                next,
                vehicle.plate()
            );
            self.despawn(&vehicle, DespawnReason::Discarded);
        }
    }

    fn spawn_vehicle(&self) {
        let Some(shared) = self.shared.upgrade() else {
            return;
        };

        let preferred_speed = shared.random_spawn_speed();
        let Some(plate) = shared.next_plate() else {
            warn!("{}: plate allocator is gone, skipping spawn", self.name);
            return;
        };
        let Some(trip) = shared.generate_trip(&self.name, &Destination::Random) else {
            trace!("{}: no route for {}, discarding", self.name, plate);
            shared.stats.record_unroutable();
            return;
        };

        trace!("{}: spawned {} on {}", self.name, plate, trip);
        let vehicle = Arc::new(Vehicle::new(
            VehicleData {
                plate,
                color: self.color(),
                progress: 0.0,
                preferred_speed,
            },
            trip,
        ));
        if !shared.vehicle_spawned(&vehicle) {
            debug!("{}: plate {} was taken meanwhile, skipping spawn", self.name, plate);
            return;
        }
        drop(shared);

        self.route(vehicle);
    }

    fn despawn(&self, vehicle: &Arc<Vehicle>, reason: DespawnReason) {
        vehicle.set_road(None);
        if let Some(shared) = self.shared.upgrade() {
            shared.vehicle_despawned(vehicle, reason);
        }
    }
}

impl fmt::Debug for City {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("City")
            .field("name", &self.name)
            .field("queued", &self.queued())
            .field("running", &self.running())
            .finish()
    }
}

impl Tick for City {
    fn tick(&self) {
        let (generation, processing) = {
            let timers = lock(&self.timers);
            (timers.generation.clone(), timers.processing.clone())
        };

        select! {
            recv(generation) -> _ => self.spawn_vehicle(),
            recv(processing) -> _ => {
                if let Some(vehicle) = self.inbound.try_pop() {
                    self.route(vehicle);
                }
            }
            default(self.poll) => {}
        }
    }
}
