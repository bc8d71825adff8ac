//! Coordinate directory: static place-name → (latitude, longitude) lookup.
//!
//! Built once at startup from a CSV data file and read-only afterwards, so
//! it can be shared by reference across concurrent callers without
//! synchronization. Loading is deliberately forgiving: a missing or broken
//! file yields an empty directory and the service still starts — callers
//! treat "place not found" the same either way.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// A geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// One row of the coordinate data file (`place,latitude,longitude`).
#[derive(Debug, Deserialize)]
struct DirectoryRow {
    place: String,
    latitude: f64,
    longitude: f64,
}

/// Read-only mapping from place name to coordinate.
#[derive(Debug, Clone, Default)]
pub struct CoordinateDirectory {
    places: HashMap<String, Coordinate>,
}

impl CoordinateDirectory {
    /// Load the directory from a CSV file with a `place,latitude,longitude`
    /// header. A file that cannot be opened yields an empty directory;
    /// malformed rows are skipped. Both cases log a warning.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let mut reader = match csv::Reader::from_path(path) {
            Ok(reader) => reader,
            Err(err) => {
                log::warn!(
                    "could not open coordinate data {}: {err}; starting with an empty directory",
                    path.display()
                );
                return Self::default();
            }
        };

        let mut places = HashMap::new();
        for row in reader.deserialize::<DirectoryRow>() {
            match row {
                Ok(row) => {
                    places.insert(row.place, Coordinate::new(row.latitude, row.longitude));
                }
                Err(err) => {
                    log::warn!("skipping malformed row in {}: {err}", path.display());
                }
            }
        }
        log::info!("coordinate directory loaded: {} places", places.len());
        Self { places }
    }

    /// Build a directory from in-memory entries (tests, embedding).
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, Coordinate)>,
        S: Into<String>,
    {
        Self {
            places: entries
                .into_iter()
                .map(|(place, coordinate)| (place.into(), coordinate))
                .collect(),
        }
    }

    /// O(1) lookup. `None` means the place is unknown — an expected
    /// outcome, not an error.
    pub fn lookup(&self, place: &str) -> Option<Coordinate> {
        self.places.get(place).copied()
    }

    pub fn len(&self) -> usize {
        self.places.len()
    }

    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }
}
