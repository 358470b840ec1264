//! End-to-end runs of the threaded simulation

use autostrade::simulation::{
    City, CityData, DespawnReason, Plate, Position, Rgba, Road, RoadData, RoadKey, SimConfig,
    Simulation, SimulationListener, Vehicle, VehicleData,
};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

const HOUR: Duration = Duration::from_secs(3600);

fn wait_for<T>(deadline: Duration, mut probe: impl FnMut() -> Option<T>) -> Option<T> {
    let until = Instant::now() + deadline;
    loop {
        if let Some(found) = probe() {
            return Some(found);
        }
        if Instant::now() >= until {
            return None;
        }
        thread::sleep(Duration::from_millis(5));
    }
}

/// A(0,0) -> B(100,0), only A spawns
fn two_cities(speed: f64) -> Simulation {
    let sim = Simulation::new(SimConfig::seeded(21).with_speed(speed));
    sim.add_city(
        CityData::new("A", Position::new(0.0, 0.0))
            .with_generation_time(Duration::from_millis(50))
            .with_processing_time(Duration::from_millis(5)),
    )
    .unwrap();
    sim.add_city(
        CityData::new("B", Position::new(100.0, 0.0))
            .with_generation_time(HOUR)
            .with_processing_time(Duration::from_millis(5)),
    )
    .unwrap();
    sim.add_one_way_road("A", "B", RoadData::new(100.0)).unwrap();
    sim
}

#[test]
fn test_vehicle_travels_and_is_delivered() {
    // 100 km/h at 1800x covers the 100 units in about two seconds.
    let sim = two_cities(1800.0);
    let road = sim.road("A", "B").unwrap();
    sim.start();

    let vehicle = wait_for(Duration::from_secs(3), || road.vehicles().into_iter().next())
        .expect("no vehicle ever reached the road");
    assert_eq!(vehicle.trip().source(), Some("A"));
    assert_eq!(vehicle.trip().destination(), Some("B"));

    let on_road = |vehicle: &Arc<Vehicle>| {
        road.vehicles()
            .iter()
            .any(|other| Arc::ptr_eq(other, vehicle))
    };

    let mut last = vehicle.progress();
    let mut moved = false;
    let deadline = Instant::now() + Duration::from_secs(10);
    loop {
        let progress = vehicle.progress();
        // Only readings taken while still listed count.
        if !on_road(&vehicle) {
            break;
        }
        assert!(progress >= last, "progress went back: {} -> {}", last, progress);
        assert!(progress < 1.0);
        moved |= progress > last;
        last = progress;
        assert!(Instant::now() < deadline, "vehicle never left the road");
        thread::sleep(Duration::from_millis(10));
    }
    assert!(moved, "vehicle never moved");

    let completed = wait_for(Duration::from_secs(3), || {
        let stats = sim.stats();
        (stats.completed > 0).then_some(stats)
    });
    sim.stop();

    let stats = completed.expect("no trip completed");
    assert!(stats.spawned >= stats.completed);
    assert!(stats.success_rate() > 0.0);
}

#[test]
fn test_remove_destination_while_vehicle_en_route() {
    // Slow enough that the first vehicle is still on the road.
    let sim = two_cities(60.0);
    let road = sim.road("A", "B").unwrap();
    sim.start();

    let vehicle = wait_for(Duration::from_secs(3), || road.vehicles().into_iter().next())
        .expect("no vehicle ever reached the road");

    sim.remove_city("B").unwrap();
    assert!(sim.city("B").is_none());
    assert!(sim.road("A", "B").is_none());
    assert!(sim.city("A").unwrap().roads_out().is_empty());
    assert_eq!(road.vehicle_count(), 0);
    assert!(!road.running());
    assert!(vehicle.road().is_none());
    assert!(sim.stats().discarded >= 1);

    // A keeps running with nowhere to go.
    thread::sleep(Duration::from_millis(150));
    assert!(sim.city("A").unwrap().running());
    assert!(sim.stats().unroutable >= 1);
    sim.stop();
}

#[test]
fn test_remove_road_while_running() {
    let sim = two_cities(60.0);
    let road = sim.road("A", "B").unwrap();
    sim.start();

    wait_for(Duration::from_secs(3), || road.vehicles().into_iter().next())
        .expect("no vehicle ever reached the road");
    sim.remove_road("A", "B").unwrap();
    assert_eq!(road.vehicle_count(), 0);
    assert!(sim.city("A").unwrap().road_to("B").is_none());

    sim.add_one_way_road("A", "B", RoadData::new(100.0)).unwrap();
    let fresh = sim.road("A", "B").unwrap();
    assert!(fresh.running());
    wait_for(Duration::from_secs(3), || fresh.vehicles().into_iter().next())
        .expect("traffic did not resume on the new road");
    sim.stop();
}

#[test]
fn test_vehicle_discarded_when_next_road_is_gone() {
    // A(0,0) -> B(10,0) -> C(20,0); about a second per hop at 600x.
    let sim = Simulation::new(SimConfig::seeded(13).with_speed(600.0));
    sim.add_city(
        CityData::new("A", Position::new(0.0, 0.0))
            .with_generation_time(Duration::from_millis(30))
            .with_processing_time(Duration::from_millis(5)),
    )
    .unwrap();
    for (name, x) in [("B", 10.0), ("C", 20.0)] {
        sim.add_city(
            CityData::new(name, Position::new(x, 0.0))
                .with_generation_time(HOUR)
                .with_processing_time(Duration::from_millis(5)),
        )
        .unwrap();
    }
    let ab = sim.add_one_way_road("A", "B", RoadData::new(100.0)).unwrap();
    sim.add_one_way_road("B", "C", RoadData::new(100.0)).unwrap();
    sim.start();

    let through_b = wait_for(Duration::from_secs(3), || {
        ab.vehicles().into_iter().find(|vehicle| {
            vehicle.trip().destination() == Some("C") && vehicle.progress() < 0.3
        })
    })
    .expect("no vehicle heading for C ever reached A->B");

    sim.remove_road("B", "C").unwrap();
    assert_eq!(through_b.road(), Some(RoadKey::new("A", "B")));
    let discarded = sim.stats().discarded;

    wait_for(Duration::from_secs(5), || {
        sim.vehicle(&through_b.plate()).is_none().then_some(())
    })
    .expect("vehicle was never retired at B");

    assert!(through_b.road().is_none());
    // Moved on to C at B before finding no road there.
    assert_eq!(through_b.trip().cursor(), 2);
    assert!(!through_b.trip().arrived());
    assert!(sim.stats().discarded > discarded);
    assert!(sim.city("B").unwrap().running());
    sim.stop();
}

#[test]
fn test_spawned_plates_skip_placed_ones() {
    let sim = two_cities(60.0);
    let placed = sim
        .place_vehicle(
            "A",
            "B",
            VehicleData {
                plate: Plate::FIRST.next(),
                color: Rgba::WHITE,
                progress: 0.0,
                preferred_speed: 100.0,
            },
        )
        .unwrap();
    let road = sim.road("A", "B").unwrap();
    sim.start();

    wait_for(Duration::from_secs(3), || {
        (road.vehicle_count() >= 4).then_some(())
    })
    .expect("A did not keep spawning");
    sim.stop();

    let plates: Vec<Plate> = road.vehicles().iter().map(|vehicle| vehicle.plate()).collect();
    let unique: HashSet<Plate> = plates.iter().copied().collect();
    assert_eq!(unique.len(), plates.len(), "duplicate plates on the road");
    assert!(plates.contains(&Plate::FIRST));
    assert!(Arc::ptr_eq(&sim.vehicle(&Plate::FIRST.next()).unwrap(), &placed));
}

#[test]
fn test_global_start_stop_is_idempotent() {
    let sim = two_cities(1.0);
    assert!(!sim.running());
    sim.stop();
    assert!(!sim.running());

    sim.start();
    sim.start();
    assert!(sim.running());
    assert!(sim.cities().iter().all(|city| city.running()));
    assert!(sim.roads().iter().all(|road| road.running()));

    sim.stop();
    sim.stop();
    assert!(!sim.running());
    assert!(sim.cities().iter().all(|city| !city.running()));
    assert!(sim.roads().iter().all(|road| !road.running()));

    sim.start();
    assert!(sim.roads().iter().all(|road| road.running()));
    sim.stop();
}

#[test]
fn test_speed_control() {
    let sim = two_cities(1.0);
    assert_eq!(sim.speed(), 1.0);
    sim.set_speed(250.0);
    assert_eq!(sim.speed(), 250.0);
    assert_eq!(sim.snapshot().speed, 250.0);
}

#[test]
fn test_zero_speed_freezes_vehicles() {
    let sim = two_cities(0.0);
    let road = sim.road("A", "B").unwrap();
    sim.start();
    let vehicle = wait_for(Duration::from_secs(3), || road.vehicles().into_iter().next())
        .expect("no vehicle ever reached the road");
    thread::sleep(Duration::from_millis(100));
    assert_eq!(vehicle.progress(), 0.0);
    sim.stop();
}

#[derive(Default)]
struct Recorder {
    cities: AtomicUsize,
    roads: AtomicUsize,
    spawned: AtomicUsize,
    despawned: AtomicUsize,
}

impl SimulationListener for Recorder {
    fn city_added(&self, _city: &Arc<City>) {
        self.cities.fetch_add(1, Ordering::SeqCst);
    }

    fn city_removed(&self, _city: &Arc<City>) {
        self.cities.fetch_sub(1, Ordering::SeqCst);
    }

    fn road_added(&self, _road: &Arc<Road>) {
        self.roads.fetch_add(1, Ordering::SeqCst);
    }

    fn road_removed(&self, _road: &Arc<Road>) {
        self.roads.fetch_sub(1, Ordering::SeqCst);
    }

    fn vehicle_spawned(&self, _vehicle: &Arc<Vehicle>) {
        self.spawned.fetch_add(1, Ordering::SeqCst);
    }

    fn vehicle_despawned(&self, _vehicle: &Arc<Vehicle>, _reason: DespawnReason) {
        self.despawned.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn test_listener_sees_changes() {
    let recorder = Arc::new(Recorder::default());
    let sim = Simulation::new(SimConfig::seeded(2).with_speed(3600.0));
    sim.set_listener(Some(recorder.clone()));

    sim.add_city(
        CityData::new("A", Position::new(0.0, 0.0))
            .with_generation_time(Duration::from_millis(20))
            .with_processing_time(Duration::from_millis(5)),
    )
    .unwrap();
    sim.add_city(
        CityData::new("B", Position::new(10.0, 0.0))
            .with_processing_time(Duration::from_millis(5)),
    )
    .unwrap();
    sim.add_road("A", "B", RoadData::default()).unwrap();
    assert_eq!(recorder.cities.load(Ordering::SeqCst), 2);
    assert_eq!(recorder.roads.load(Ordering::SeqCst), 2);

    sim.start();
    wait_for(Duration::from_secs(5), || {
        (recorder.despawned.load(Ordering::SeqCst) > 0).then_some(())
    })
    .expect("no vehicle ever despawned");
    sim.stop();

    let stats = sim.stats();
    assert_eq!(recorder.spawned.load(Ordering::SeqCst) as u64, stats.spawned);
    assert_eq!(
        recorder.despawned.load(Ordering::SeqCst) as u64,
        stats.completed + stats.discarded
    );

    sim.remove_city("B").unwrap();
    assert_eq!(recorder.cities.load(Ordering::SeqCst), 1);
    assert_eq!(recorder.roads.load(Ordering::SeqCst), 0);

    sim.set_listener(None);
    sim.remove_city("A").unwrap();
    assert_eq!(recorder.cities.load(Ordering::SeqCst), 1);
}

#[test]
fn test_demo_world_runs() {
    let sim = Simulation::create_demo_world(SimConfig::seeded(8).with_speed(20000.0), 6);
    assert_eq!(sim.cities().len(), 6);
    assert_eq!(sim.roads().len(), 14);

    for city in sim.cities() {
        city.set_generation_time(Duration::from_millis(20));
        city.set_processing_time(Duration::from_millis(5));
    }
    sim.start();
    let stats = wait_for(Duration::from_secs(5), || {
        let stats = sim.stats();
        (stats.completed >= 3).then_some(stats)
    });
    sim.stop();
    assert!(stats.is_some(), "demo world completed no trips");

    let snapshot = sim.snapshot();
    assert_eq!(snapshot.cities.len(), 6);
    for record in &snapshot.vehicles {
        assert!(record.data.progress >= 0.0 && record.data.progress < 1.0);
    }
}
