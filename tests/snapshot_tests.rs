//! Snapshots and restore

use autostrade::simulation::{
    CityData, Plate, Position, RoadData, Rgba, SimConfig, Simulation, Snapshot, VehicleData,
};
use std::thread;
use std::time::{Duration, Instant};

fn sample() -> Simulation {
    let sim = Simulation::new(SimConfig::seeded(9).with_speed(42.0));
    sim.add_city(
        CityData::new("Milano", Position::new(0.0, 0.0))
            .with_color(Rgba::opaque(200, 10, 10))
            .with_generation_time(Duration::from_millis(1500)),
    )
    .unwrap();
    sim.add_city(
        CityData::new("Bologna", Position::new(120.0, -80.0))
            .with_processing_time(Duration::from_millis(100)),
    )
    .unwrap();
    sim.add_city(CityData::new("Firenze", Position::new(150.0, -180.0)))
        .unwrap();
    sim.add_road("Milano", "Bologna", RoadData::new(130.0)).unwrap();
    sim.add_one_way_road("Bologna", "Firenze", RoadData::new(90.0))
        .unwrap();

    sim.place_vehicle(
        "Bologna",
        "Firenze",
        VehicleData {
            plate: "AA000AB".parse().unwrap(),
            color: Rgba::opaque(0, 0, 255),
            progress: 0.25,
            preferred_speed: 110.0,
        },
    )
    .unwrap();
    sim.place_vehicle(
        "Milano",
        "Bologna",
        VehicleData {
            plate: "AA000AC".parse().unwrap(),
            color: Rgba::WHITE,
            progress: 0.75,
            preferred_speed: 150.0,
        },
    )
    .unwrap();
    sim
}

#[test]
fn test_snapshot_uses_indices() {
    let snapshot = sample().snapshot();
    assert_eq!(snapshot.speed, 42.0);
    assert_eq!(snapshot.last_plate, Plate::FIRST);

    let names: Vec<&str> = snapshot.cities.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["Milano", "Bologna", "Firenze"]);

    let endpoints: Vec<(usize, usize)> = snapshot
        .roads
        .iter()
        .map(|road| (road.src_index, road.dst_index))
        .collect();
    assert_eq!(endpoints, [(0, 1), (1, 0), (1, 2)]);
    assert_eq!(snapshot.roads[2].data.max_speed, 90.0);

    assert_eq!(snapshot.vehicles.len(), 2);
    let on_first = snapshot
        .vehicles
        .iter()
        .find(|vehicle| vehicle.data.plate.to_string() == "AA000AC")
        .unwrap();
    assert_eq!(on_first.road_index, 0);
    assert_eq!(on_first.data.progress, 0.75);
    let on_last = snapshot
        .vehicles
        .iter()
        .find(|vehicle| vehicle.data.plate.to_string() == "AA000AB")
        .unwrap();
    assert_eq!(on_last.road_index, 2);
}

#[test]
fn test_idle_snapshot_is_byte_stable() {
    let sim = sample();
    let first = sim.snapshot().to_json().unwrap();
    let second = sim.snapshot().to_json().unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_snapshot_round_trip() {
    let sim = sample();
    let snapshot = sim.snapshot();

    let mut buffer = Vec::new();
    snapshot.write_json(&mut buffer).unwrap();
    let parsed = Snapshot::read_json(buffer.as_slice()).unwrap();
    assert_eq!(parsed, snapshot);

    let restored = Simulation::from_snapshot(&parsed, SimConfig::seeded(9)).unwrap();
    let again = restored.snapshot();
    assert_eq!(again.cities, snapshot.cities);
    assert_eq!(again.roads, snapshot.roads);
    assert_eq!(again.vehicles, snapshot.vehicles);
    assert_eq!(restored.speed(), 42.0);

    let vehicle = restored.vehicle(&"AA000AB".parse().unwrap()).unwrap();
    assert_eq!(vehicle.progress(), 0.25);
    assert_eq!(vehicle.trip().current(), Some("Firenze"));
    assert_eq!(
        vehicle.road().map(|key| key.to_string()),
        Some("Bologna->Firenze".to_string())
    );
}

#[test]
fn test_restore_resumes_plates() {
    let sim = sample();
    let mut snapshot = sim.snapshot();
    snapshot.last_plate = "BC123DE".parse().unwrap();

    let restored = Simulation::from_snapshot(&snapshot, SimConfig::default()).unwrap();
    assert_eq!(restored.last_plate().to_string(), "BC123DE");
}

#[test]
fn test_restore_resumes_past_restored_plates() {
    // The sample's vehicles carry plates after its allocator position.
    let snapshot = sample().snapshot();
    assert_eq!(snapshot.last_plate, Plate::FIRST);

    let restored = Simulation::from_snapshot(&snapshot, SimConfig::default()).unwrap();
    assert_eq!(restored.last_plate().to_string(), "AA000AD");
    assert_eq!(restored.snapshot().last_plate.to_string(), "AA000AD");
}

#[test]
fn test_restore_rejects_duplicate_plates() {
    let mut snapshot = sample().snapshot();
    snapshot.vehicles[1].data.plate = snapshot.vehicles[0].data.plate;
    assert!(Simulation::from_snapshot(&snapshot, SimConfig::default()).is_err());
}

#[test]
fn test_snapshot_includes_vehicles_queued_on_a_road() {
    let sim = Simulation::new(SimConfig::seeded(5));
    sim.add_city(
        CityData::new("A", Position::new(0.0, 0.0))
            .with_generation_time(Duration::from_millis(20)),
    )
    .unwrap();
    sim.add_city(CityData::new("B", Position::new(100.0, 0.0))).unwrap();
    let road = sim.add_one_way_road("A", "B", RoadData::default()).unwrap();

    sim.start();
    // A keeps routing onto the road, which no longer drains its queue.
    road.stop();
    let deadline = Instant::now() + Duration::from_secs(3);
    while sim.stats().spawned < 2 && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(5));
    }
    sim.stop();
    assert_eq!(road.vehicle_count(), 0);

    let snapshot = sim.snapshot();
    let spawned = sim.stats().spawned as usize;
    assert!(spawned >= 2);
    assert_eq!(snapshot.vehicles.len(), spawned);
    for record in &snapshot.vehicles {
        assert_eq!(record.road_index, 0);
        assert_eq!(record.data.progress, 0.0);
        let vehicle = sim.vehicle(&record.data.plate).unwrap();
        assert_eq!(vehicle.road(), Some(road.key().clone()));
    }
    let plates: Vec<u64> = snapshot
        .vehicles
        .iter()
        .map(|record| record.data.plate.ordinal())
        .collect();
    assert!(plates.windows(2).all(|pair| pair[0] < pair[1]));
    assert_eq!(sim.snapshot(), snapshot);
}

#[test]
fn test_restore_rejects_dangling_indices() {
    let mut snapshot = sample().snapshot();
    snapshot.roads[0].dst_index = 17;
    assert!(Simulation::from_snapshot(&snapshot, SimConfig::default()).is_err());

    let mut snapshot = sample().snapshot();
    snapshot.vehicles[0].road_index = 99;
    assert!(Simulation::from_snapshot(&snapshot, SimConfig::default()).is_err());
}

#[test]
fn test_snapshot_file_round_trip() {
    let path = std::env::temp_dir().join(format!(
        "autostrade-snapshot-{}.json",
        std::process::id()
    ));
    let snapshot = sample().snapshot();
    snapshot.save(&path).unwrap();
    let loaded = Snapshot::load(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(loaded, snapshot);

    assert!(Snapshot::load(&path).is_err());
}

#[test]
fn test_snapshot_json_layout() {
    let json = sample().snapshot().to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["last_plate"], "AA000AA");
    assert_eq!(value["roads"][2]["max_speed"], 90.0);
    assert_eq!(value["roads"][2]["src_index"], 1);
    assert_eq!(value["vehicles"][0]["plate"], "AA000AC");
    assert_eq!(value["cities"][0]["color"]["r"], 200);
}
