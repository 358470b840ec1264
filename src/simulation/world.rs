//! Main simulation world that ties everything together
//!
//! [`Simulation`] owns the city and road tables, serializes topology edits,
//! drives the global start/stop and speed, and produces snapshots. Cities and
//! roads run on their own threads and reach back here only through a weak
//! handle to [`Shared`].

use anyhow::{Context, Result};
use log::{debug, info, trace, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::ops::Range;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use super::city::City;
use super::config::SimConfig;
use super::error::TopologyError;
use super::events::{DespawnReason, SimulationListener, SimulationStats, StatsCounters};
use super::locks::{lock, read, write};
use super::plate::{Plate, PlateAllocator};
use super::road::{Road, RoadSettings};
use super::road_network::{Destination, RoadGraph};
use super::snapshot::{RoadRecord, Snapshot, VehicleRecord};
use super::trip::Trip;
use super::types::{CityData, Position, RoadData, RoadKey, Rgba, SharedSpeed, VehicleData};
use super::vehicle::Vehicle;

/// Cities in insertion order, indexed by name
#[derive(Default)]
pub(crate) struct CityTable {
    list: Vec<Arc<City>>,
    index: HashMap<String, usize>,
}

impl CityTable {
    pub(crate) fn len(&self) -> usize {
        self.list.len()
    }

    pub(crate) fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub(crate) fn get(&self, name: &str) -> Option<Arc<City>> {
        self.index_of(name).map(|index| Arc::clone(&self.list[index]))
    }

    pub(crate) fn at(&self, index: usize) -> Option<&Arc<City>> {
        self.list.get(index)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Arc<City>> {
        self.list.iter()
    }

    fn insert(&mut self, city: Arc<City>) {
        self.index.insert(city.name().to_owned(), self.list.len());
        self.list.push(city);
    }

    fn remove(&mut self, name: &str) -> Option<Arc<City>> {
        let index = self.index.remove(name)?;
        let city = self.list.remove(index);
        for slot in self.index.values_mut() {
            if *slot > index {
                *slot -= 1;
            }
        }
        Some(city)
    }
}

/// Roads in insertion order, indexed by endpoint names
#[derive(Default)]
pub(crate) struct RoadTable {
    list: Vec<Arc<Road>>,
    index: HashMap<RoadKey, usize>,
}

impl RoadTable {
    pub(crate) fn len(&self) -> usize {
        self.list.len()
    }

    pub(crate) fn contains(&self, key: &RoadKey) -> bool {
        self.index.contains_key(key)
    }

    pub(crate) fn get(&self, key: &RoadKey) -> Option<Arc<Road>> {
        self.index.get(key).map(|&index| Arc::clone(&self.list[index]))
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Arc<Road>> {
        self.list.iter()
    }

    fn insert(&mut self, road: Arc<Road>) {
        self.index.insert(road.key().clone(), self.list.len());
        self.list.push(road);
    }

    fn remove(&mut self, key: &RoadKey) -> Option<Arc<Road>> {
        let index = self.index.remove(key)?;
        let road = self.list.remove(index);
        for slot in self.index.values_mut() {
            if *slot > index {
                *slot -= 1;
            }
        }
        Some(road)
    }
}

/// State reachable from every entity thread
///
/// Lock order: cities table, roads table, then per-entity locks.
pub(crate) struct Shared {
    pub(crate) config: SimConfig,
    pub(crate) speed: SharedSpeed,
    pub(crate) cities: RwLock<CityTable>,
    pub(crate) roads: RwLock<RoadTable>,
    pub(crate) plates: PlateAllocator,
    pub(crate) stats: StatsCounters,
    /// Every vehicle between spawn and despawn, on a road or in a queue
    vehicles: RwLock<HashMap<Plate, Arc<Vehicle>>>,
    rng: Mutex<Option<StdRng>>,
    listener: RwLock<Option<Arc<dyn SimulationListener>>>,
}

impl Shared {
    fn new(config: SimConfig) -> Self {
        Self {
            speed: Arc::new(RwLock::new(config.speed)),
            cities: RwLock::new(CityTable::default()),
            roads: RwLock::new(RoadTable::default()),
            plates: PlateAllocator::start(config.first_plate),
            stats: StatsCounters::default(),
            vehicles: RwLock::new(HashMap::new()),
            rng: Mutex::new(config.seed.map(StdRng::seed_from_u64)),
            listener: RwLock::new(None),
            config,
        }
    }

    fn road_settings(&self) -> RoadSettings {
        RoadSettings {
            tick: self.config.road_tick,
            poll: self.config.poll_interval,
            parallel_threshold: self.config.parallel_threshold,
            congestion: self.config.congestion,
        }
    }

    /// Get a random value in the given range, using seeded RNG if available
    fn random_range(&self, range: Range<f64>) -> f64 {
        if range.is_empty() {
            return range.start;
        }
        match lock(&self.rng).as_mut() {
            Some(rng) => rng.random_range(range),
            None => rand::rng().random_range(range),
        }
    }

    fn random_index(&self, len: usize) -> usize {
        match lock(&self.rng).as_mut() {
            Some(rng) => rng.random_range(0..len),
            None => rand::rng().random_range(0..len),
        }
    }

    pub(crate) fn random_spawn_speed(&self) -> f64 {
        self.random_range(self.config.spawn_speed.clone())
    }

    /// Plans a trip from `src` over the current network. `None` when either
    /// end is unknown, the destination is the source, or nothing connects
    /// them.
    pub(crate) fn generate_trip(&self, src: &str, destination: &Destination) -> Option<Trip> {
        let cities = read(&self.cities);
        let src_index = cities.index_of(src)?;
        let dst_index = match destination {
            Destination::Random => {
                if cities.len() < 2 {
                    return None;
                }
                // Uniform over every index but the source.
                let pick = self.random_index(cities.len() - 1);
                if pick >= src_index {
                    pick + 1
                } else {
                    pick
                }
            }
            Destination::City(name) => cities.index_of(name)?,
        };
        if dst_index == src_index {
            return None;
        }

        let roads = read(&self.roads);
        let path = RoadGraph::build(&cities, &roads).shortest_path(src_index, dst_index)?;
        let names = path
            .into_iter()
            .filter_map(|index| cities.at(index).map(|city| city.name().to_owned()))
            .collect();
        Some(Trip::new(names))
    }

    fn notify(&self, event: impl FnOnce(&dyn SimulationListener)) {
        let listener = read(&self.listener).clone();
        if let Some(listener) = listener {
            event(listener.as_ref());
        }
    }

    /// Next plate from the allocator that no live vehicle carries
    pub(crate) fn next_plate(&self) -> Option<Plate> {
        loop {
            let plate = self.plates.next()?;
            if !read(&self.vehicles).contains_key(&plate) {
                return Some(plate);
            }
            trace!("Plate {} still in use, skipping", plate);
        }
    }

    /// Registers a new vehicle under its plate. Returns `false`, and leaves
    /// everything untouched, when a live vehicle already carries that plate.
    pub(crate) fn vehicle_spawned(&self, vehicle: &Arc<Vehicle>) -> bool {
        match write(&self.vehicles).entry(vehicle.plate()) {
            Entry::Occupied(_) => return false,
            Entry::Vacant(slot) => {
                slot.insert(Arc::clone(vehicle));
            }
        }
        self.stats.record_spawn();
        self.notify(|listener| listener.vehicle_spawned(vehicle));
        true
    }

    pub(crate) fn vehicle_despawned(&self, vehicle: &Arc<Vehicle>, reason: DespawnReason) {
        {
            let mut vehicles = write(&self.vehicles);
            let plate = vehicle.plate();
            if vehicles
                .get(&plate)
                .is_some_and(|live| Arc::ptr_eq(live, vehicle))
            {
                vehicles.remove(&plate);
            }
        }
        self.stats.record_despawn(reason);
        self.notify(|listener| listener.vehicle_despawned(vehicle, reason));
    }
}

/// The simulation coordinator
pub struct Simulation {
    shared: Arc<Shared>,
    /// Serializes topology edits and global start/stop
    topology: Mutex<()>,
    running: AtomicBool,
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new(SimConfig::default())
    }
}

impl Simulation {
    pub fn new(config: SimConfig) -> Self {
        Self {
            shared: Arc::new(Shared::new(config)),
            topology: Mutex::new(()),
            running: AtomicBool::new(false),
        }
    }

    /// Rebuilds a stopped simulation from a snapshot
    ///
    /// Vehicles are put back on their road with their progress; their trip
    /// ends at that road's destination. Plates resume where the snapshot
    /// left off, or right after the highest restored plate if that is later.
    pub fn from_snapshot(snapshot: &Snapshot, config: SimConfig) -> Result<Self> {
        let first_plate = snapshot
            .vehicles
            .iter()
            .map(|record| record.data.plate)
            .max_by_key(Plate::ordinal)
            .filter(|plate| plate.ordinal() >= snapshot.last_plate.ordinal())
            .map_or(snapshot.last_plate, Plate::next);
        let sim = Self::new(SimConfig {
            speed: snapshot.speed,
            first_plate,
            ..config
        });

        for data in &snapshot.cities {
            sim.add_city(data.clone())
                .with_context(|| format!("Failed to restore city {}", data.name))?;
        }

        let city_name = |index: usize| {
            snapshot
                .cities
                .get(index)
                .map(|city| city.name.as_str())
                .with_context(|| format!("Snapshot references missing city #{}", index))
        };
        for (index, record) in snapshot.roads.iter().enumerate() {
            let src = city_name(record.src_index)?;
            let dst = city_name(record.dst_index)?;
            sim.add_one_way_road(src, dst, record.data)
                .with_context(|| format!("Failed to restore road #{}", index))?;
        }

        for record in &snapshot.vehicles {
            let road = snapshot.roads.get(record.road_index).with_context(|| {
                format!(
                    "Vehicle {} references missing road #{}",
                    record.data.plate, record.road_index
                )
            })?;
            let src = city_name(road.src_index)?;
            let dst = city_name(road.dst_index)?;
            sim.place_vehicle(src, dst, record.data.clone())
                .with_context(|| format!("Failed to restore vehicle {}", record.data.plate))?;
        }

        info!(
            "Restored simulation: {} cities, {} roads, {} vehicles",
            snapshot.cities.len(),
            snapshot.roads.len(),
            snapshot.vehicles.len()
        );
        Ok(sim)
    }

    /// Add a city. Fails if the name is taken.
    pub fn add_city(&self, data: CityData) -> Result<Arc<City>, TopologyError> {
        let _topology = lock(&self.topology);
        let city = {
            let mut cities = write(&self.shared.cities);
            if cities.index_of(&data.name).is_some() {
                warn!("Rejected city {}: name already taken", data.name);
                return Err(TopologyError::DuplicateCity(data.name));
            }
            let city = Arc::new(City::new(
                data,
                Arc::downgrade(&self.shared),
                self.shared.config.poll_interval,
            ));
            cities.insert(Arc::clone(&city));
            city
        };

        info!("City {} added", city.name());
        self.shared.notify(|listener| listener.city_added(&city));
        if self.running() {
            city.start();
        }
        Ok(city)
    }

    /// Remove a city along with every road into or out of it
    ///
    /// Vehicles on those roads or waiting in the city are discarded.
    pub fn remove_city(&self, name: &str) -> Result<(), TopologyError> {
        let _topology = lock(&self.topology);
        let city = read(&self.shared.cities)
            .get(name)
            .ok_or_else(|| TopologyError::UnknownCity(name.to_owned()))?;

        city.stop();
        let incident: Vec<RoadKey> = city
            .roads_in()
            .iter()
            .chain(city.roads_out().iter())
            .map(|road| road.key().clone())
            .collect();
        for key in incident {
            if let Err(err) = self.remove_road_locked(&key) {
                debug!("Road {} vanished during removal of {}: {}", key, name, err);
            }
        }

        write(&self.shared.cities).remove(name);
        for vehicle in city.close() {
            self.shared
                .vehicle_despawned(&vehicle, DespawnReason::Discarded);
        }

        info!("City {} removed", name);
        self.shared.notify(|listener| listener.city_removed(&city));
        Ok(())
    }

    /// Add a one-way road from `src` to `dst`
    pub fn add_one_way_road(
        &self,
        src: &str,
        dst: &str,
        data: RoadData,
    ) -> Result<Arc<Road>, TopologyError> {
        let _topology = lock(&self.topology);
        self.add_road_locked(src, dst, data)
    }

    /// Add a two-way road between `a` and `b` (creates two one-way roads)
    ///
    /// Nothing is added if either direction already exists.
    pub fn add_road(
        &self,
        a: &str,
        b: &str,
        data: RoadData,
    ) -> Result<(Arc<Road>, Arc<Road>), TopologyError> {
        let _topology = lock(&self.topology);
        {
            let roads = read(&self.shared.roads);
            let forward = RoadKey::new(a, b);
            for key in [forward.reversed(), forward] {
                if roads.contains(&key) {
                    warn!("Rejected road {}: already exists", key);
                    return Err(TopologyError::DuplicateRoad(key));
                }
            }
        }
        let forward = self.add_road_locked(a, b, data)?;
        let backward = match self.add_road_locked(b, a, data) {
            Ok(road) => road,
            Err(err) => {
                // Unreachable in practice: both directions were checked above.
                let _ = self.remove_road_locked(forward.key());
                return Err(err);
            }
        };
        Ok((forward, backward))
    }

    fn add_road_locked(
        &self,
        src: &str,
        dst: &str,
        data: RoadData,
    ) -> Result<Arc<Road>, TopologyError> {
        if src == dst {
            warn!("Rejected road from {} to itself", src);
            return Err(TopologyError::SameEndpoints(src.to_owned()));
        }
        let (src_city, dst_city) = {
            let cities = read(&self.shared.cities);
            let src_city = cities
                .get(src)
                .ok_or_else(|| TopologyError::UnknownCity(src.to_owned()))?;
            let dst_city = cities
                .get(dst)
                .ok_or_else(|| TopologyError::UnknownCity(dst.to_owned()))?;
            (src_city, dst_city)
        };

        let road = {
            let mut roads = write(&self.shared.roads);
            let key = RoadKey::new(src, dst);
            if roads.contains(&key) {
                warn!("Rejected road {}: already exists", key);
                return Err(TopologyError::DuplicateRoad(key));
            }
            let road = Arc::new(Road::new(
                data,
                &src_city,
                &dst_city,
                Arc::clone(&self.shared.speed),
                self.shared.road_settings(),
            ));
            src_city.attach_outbound(Arc::clone(&road));
            dst_city.attach_inbound(Arc::clone(&road));
            roads.insert(Arc::clone(&road));
            road
        };

        info!("Road {} added", road.key());
        self.shared.notify(|listener| listener.road_added(&road));
        if self.running() {
            road.start();
        }
        Ok(road)
    }

    /// Remove the one-way road from `src` to `dst`, discarding its vehicles
    pub fn remove_road(&self, src: &str, dst: &str) -> Result<(), TopologyError> {
        let _topology = lock(&self.topology);
        self.remove_road_locked(&RoadKey::new(src, dst))
    }

    /// Remove both directions between `a` and `b`. Succeeds if at least one
    /// of them existed.
    pub fn remove_road_pair(&self, a: &str, b: &str) -> Result<(), TopologyError> {
        let _topology = lock(&self.topology);
        let forward = self.remove_road_locked(&RoadKey::new(a, b));
        let backward = self.remove_road_locked(&RoadKey::new(b, a));
        forward.or(backward)
    }

    fn remove_road_locked(&self, key: &RoadKey) -> Result<(), TopologyError> {
        let road = read(&self.shared.roads)
            .get(key)
            .ok_or_else(|| TopologyError::UnknownRoad(key.clone()))?;

        road.stop();
        {
            let mut roads = write(&self.shared.roads);
            roads.remove(key);
            if let Some(src) = road.src() {
                src.detach_outbound(key);
            }
            if let Some(dst) = road.dst() {
                dst.detach_inbound(key);
            }
        }

        // Detached from its source city first, so no routing can reach it now.
        for vehicle in road.close() {
            vehicle.set_road(None);
            self.shared
                .vehicle_despawned(&vehicle, DespawnReason::Discarded);
        }

        info!("Road {} removed", key);
        self.shared.notify(|listener| listener.road_removed(&road));
        Ok(())
    }

    /// Put a vehicle directly on an existing road, keeping its progress
    ///
    /// Its trip runs from the road's source to its destination. Fails if a
    /// live vehicle already carries the same plate.
    pub fn place_vehicle(
        &self,
        src: &str,
        dst: &str,
        mut data: VehicleData,
    ) -> Result<Arc<Vehicle>, TopologyError> {
        let _topology = lock(&self.topology);
        let road = self
            .road(src, dst)
            .ok_or_else(|| TopologyError::UnknownRoad(RoadKey::new(src, dst)))?;

        if !(0.0..1.0).contains(&data.progress) {
            data.progress = 0.0;
        }
        let mut trip = Trip::new(vec![src.to_owned(), dst.to_owned()]);
        trip.advance();

        let vehicle = Arc::new(Vehicle::new(data, trip));
        if !self.shared.vehicle_spawned(&vehicle) {
            warn!("Rejected vehicle {}: plate already in use", vehicle.plate());
            return Err(TopologyError::DuplicatePlate(vehicle.plate()));
        }
        vehicle.set_road(Some(road.key().clone()));
        road.admit(Arc::clone(&vehicle));
        Ok(vehicle)
    }

    pub fn city(&self, name: &str) -> Option<Arc<City>> {
        read(&self.shared.cities).get(name)
    }

    pub fn road(&self, src: &str, dst: &str) -> Option<Arc<Road>> {
        read(&self.shared.roads).get(&RoadKey::new(src, dst))
    }

    /// Both directions between `a` and `b`: `(a -> b, b -> a)`
    pub fn road_pair(&self, a: &str, b: &str) -> (Option<Arc<Road>>, Option<Arc<Road>>) {
        let roads = read(&self.shared.roads);
        (
            roads.get(&RoadKey::new(a, b)),
            roads.get(&RoadKey::new(b, a)),
        )
    }

    /// Find a live vehicle, whether on a road or waiting in a queue
    pub fn vehicle(&self, plate: &Plate) -> Option<Arc<Vehicle>> {
        read(&self.shared.vehicles).get(plate).cloned()
    }

    pub fn cities(&self) -> Vec<Arc<City>> {
        read(&self.shared.cities).iter().cloned().collect()
    }

    pub fn roads(&self) -> Vec<Arc<Road>> {
        read(&self.shared.roads).iter().cloned().collect()
    }

    /// Plan a trip over the current network, as a city would on spawn
    pub fn generate_trip(&self, src: &str, destination: &Destination) -> Option<Trip> {
        self.shared.generate_trip(src, destination)
    }

    /// Cheapest path from `src` to `dst` under current congestion
    pub fn shortest_path(&self, src: &str, dst: &str) -> Option<Trip> {
        self.generate_trip(src, &Destination::City(dst.to_owned()))
    }

    pub fn speed(&self) -> f64 {
        *read(&self.shared.speed)
    }

    pub fn set_speed(&self, speed: f64) {
        *write(&self.shared.speed) = speed;
    }

    /// Start every city and road. No-op when already running.
    pub fn start(&self) {
        let _topology = lock(&self.topology);
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }
        let (cities, roads) = (self.cities(), self.roads());
        for city in &cities {
            city.start();
        }
        for road in &roads {
            road.start();
        }
        info!(
            "Simulation started: {} cities, {} roads",
            cities.len(),
            roads.len()
        );
    }

    /// Stop every city and road. No-op when not running.
    pub fn stop(&self) {
        let _topology = lock(&self.topology);
        if self
            .running
            .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }
        self.stop_entities();
        info!("Simulation stopped");
    }

    pub fn running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    fn stop_entities(&self) {
        for city in self.cities() {
            city.stop();
        }
        for road in self.roads() {
            road.stop();
        }
    }

    /// The plate the next spawned vehicle will get
    pub fn last_plate(&self) -> Plate {
        self.shared
            .plates
            .peek()
            .unwrap_or(self.shared.config.first_plate)
    }

    pub fn stats(&self) -> SimulationStats {
        self.shared.stats.snapshot()
    }

    pub fn set_listener(&self, listener: Option<Arc<dyn SimulationListener>>) {
        *write(&self.shared.listener) = listener;
    }

    /// Consistent copy of the whole simulation state
    ///
    /// Roads refer to cities and vehicles refer to roads by their index in
    /// the snapshot's own lists. A road's records list its travelling
    /// vehicles first, then those still in its inbound queue ordered by
    /// plate. Vehicles waiting in a city's queue are between roads and are
    /// not recorded.
    pub fn snapshot(&self) -> Snapshot {
        let cities = read(&self.shared.cities);
        let roads = read(&self.shared.roads);

        let mut assigned: HashMap<RoadKey, Vec<Arc<Vehicle>>> = HashMap::new();
        for vehicle in read(&self.shared.vehicles).values() {
            if let Some(key) = vehicle.road() {
                assigned.entry(key).or_default().push(Arc::clone(vehicle));
            }
        }

        let mut snapshot = Snapshot {
            speed: self.speed(),
            last_plate: self.last_plate(),
            cities: cities.iter().map(|city| city.data()).collect(),
            roads: Vec::with_capacity(roads.len()),
            vehicles: Vec::new(),
        };

        for road in roads.iter() {
            let (Some(src_index), Some(dst_index)) = (
                cities.index_of(road.src_name()),
                cities.index_of(road.dst_name()),
            ) else {
                continue;
            };
            let road_index = snapshot.roads.len();
            snapshot.roads.push(RoadRecord {
                data: road.data(),
                src_index,
                dst_index,
            });

            let travelling = road.vehicles();
            let mut queued: Vec<Arc<Vehicle>> = assigned
                .remove(road.key())
                .unwrap_or_default()
                .into_iter()
                .filter(|vehicle| !travelling.iter().any(|other| Arc::ptr_eq(other, vehicle)))
                .collect();
            queued.sort_by_key(|vehicle| vehicle.plate().ordinal());

            snapshot.vehicles.extend(
                travelling
                    .iter()
                    .chain(queued.iter())
                    .map(|vehicle| VehicleRecord {
                        data: vehicle.data(),
                        road_index,
                    }),
            );
        }

        snapshot
    }

    /// Log a summary of the world state
    pub fn log_summary(&self) {
        let stats = self.stats();
        let roads = self.roads();
        let on_road: usize = roads.iter().map(|road| road.vehicle_count()).sum();
        info!("=== Traffic Simulation Summary ===");
        info!(
            "Cities: {}, Roads: {}, Speed: {:.1}x",
            self.cities().len(),
            roads.len(),
            self.speed()
        );
        info!("Vehicles on roads: {}", on_road);
        info!(
            "Spawned: {}, Completed: {}, Discarded: {}, Unroutable: {}",
            stats.spawned, stats.completed, stats.discarded, stats.unroutable
        );
        for road in roads.iter().filter(|road| road.vehicle_count() > 0) {
            debug!(
                "  {}: {} vehicles, weight {:.4}",
                road.key(),
                road.vehicle_count(),
                road.weight()
            );
        }
    }

    /// Create a demo world: a ring of cities joined by two-way roads, with
    /// one chord across the middle
    pub fn create_demo_world(config: SimConfig, count: usize) -> Self {
        const PALETTE: [Rgba; 6] = [
            Rgba::opaque(230, 57, 70),
            Rgba::opaque(69, 123, 157),
            Rgba::opaque(42, 157, 143),
            Rgba::opaque(233, 196, 106),
            Rgba::opaque(244, 162, 97),
            Rgba::opaque(131, 56, 236),
        ];
        let radius = 200.0;
        let world = Simulation::new(config);

        let names: Vec<String> = (0..count).map(|i| format!("City{}", i)).collect();
        for (i, name) in names.iter().enumerate() {
            let angle = i as f64 / count as f64 * std::f64::consts::TAU;
            let data = CityData::new(
                name.as_str(),
                Position::new(radius * angle.cos(), radius * angle.sin()),
            )
            .with_color(PALETTE[i % PALETTE.len()]);
            let _ = world.add_city(data);
        }

        for i in 0..count {
            let next = (i + 1) % count;
            let _ = world.add_road(&names[i], &names[next], RoadData::default());
        }
        if count >= 4 {
            let _ = world.add_road(&names[0], &names[count / 2], RoadData::new(90.0));
        }

        world
    }
}

impl Drop for Simulation {
    fn drop(&mut self) {
        self.stop_entities();
    }
}
