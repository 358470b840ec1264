//! Trips: the precomputed path a vehicle follows

use std::fmt;

use super::types::RoadKey;

/// An ordered list of city names plus a cursor on the next city to reach
///
/// The first city is the origin. The cursor only moves forward; once it
/// passes the last city the trip has arrived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trip {
    cities: Vec<String>,
    cursor: usize,
}

impl Trip {
    pub fn new(cities: Vec<String>) -> Self {
        Self { cities, cursor: 0 }
    }

    pub fn advance(&mut self) {
        if !self.arrived() {
            self.cursor += 1;
        }
    }

    pub fn arrived(&self) -> bool {
        self.cursor >= self.cities.len()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn source(&self) -> Option<&str> {
        self.cities.first().map(String::as_str)
    }

    pub fn destination(&self) -> Option<&str> {
        self.cities.last().map(String::as_str)
    }

    /// The city under the cursor, or the destination once arrived
    pub fn current(&self) -> Option<&str> {
        self.cities
            .get(self.cursor)
            .or_else(|| self.cities.last())
            .map(String::as_str)
    }

    pub fn cities(&self) -> &[String] {
        &self.cities
    }

    /// The directed roads between consecutive cities
    pub fn roads(&self) -> Vec<RoadKey> {
        self.cities
            .windows(2)
            .map(|pair| RoadKey::new(pair[0].as_str(), pair[1].as_str()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }
}

impl fmt::Display for Trip {
    /// `A-[B]-C`, brackets marking the cursor
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, city) in self.cities.iter().enumerate() {
            if index > 0 {
                f.write_str("-")?;
            }
            if index == self.cursor {
                write!(f, "[{}]", city)?;
            } else {
                f.write_str(city)?;
            }
        }
        Ok(())
    }
}
