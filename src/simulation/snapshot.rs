//! Serializable copy of a simulation
//!
//! Roads point at cities and vehicles point at roads by index into the
//! snapshot's own lists, so a snapshot is self-contained and can be written
//! as JSON.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use super::plate::Plate;
use super::types::{CityData, RoadData, VehicleData};

/// A road and the indices of its endpoints in [`Snapshot::cities`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadRecord {
    #[serde(flatten)]
    pub data: RoadData,
    pub src_index: usize,
    pub dst_index: usize,
}

/// A vehicle and the index of its road in [`Snapshot::roads`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleRecord {
    #[serde(flatten)]
    pub data: VehicleData,
    pub road_index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub speed: f64,
    /// Plate the allocator resumes from
    pub last_plate: Plate,
    pub cities: Vec<CityData>,
    pub roads: Vec<RoadRecord>,
    pub vehicles: Vec<VehicleRecord>,
}

impl Snapshot {
    pub fn write_json<W: Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer_pretty(writer, self).context("Failed to serialize snapshot")
    }

    pub fn read_json<R: Read>(reader: R) -> Result<Self> {
        serde_json::from_reader(reader).context("Failed to parse snapshot")
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize snapshot")
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse snapshot")
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        self.write_json(&mut writer)?;
        writer
            .flush()
            .with_context(|| format!("Failed to write {}", path.display()))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file =
            File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
        Self::read_json(BufReader::new(file))
            .with_context(|| format!("Failed to load snapshot from {}", path.display()))
    }
}
