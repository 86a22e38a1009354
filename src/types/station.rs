//! Defines the station registries (railway and weather) and the correspondence
//! table produced by matching one to the other.

use crate::types::location::LatLon;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// --- Data Structures ---

/// A railway station as published in the railway operator's station metadata.
///
/// Field names follow the Digitraffic `/metadata/stations` JSON, so the
/// registry can be deserialized directly from that feed. Fields the matcher
/// has no use for (UIC code, country, station type) are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RailwayStation {
    /// The unique short code of the station (e.g. "HKI").
    #[serde(rename = "stationShortCode")]
    pub short_code: String,
    /// Human-readable station name (e.g. "Helsinki asema").
    #[serde(rename = "stationName")]
    pub name: String,
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Whether the station serves passengers.
    #[serde(default)]
    pub passenger_traffic: bool,
}

impl RailwayStation {
    pub fn new(short_code: &str, name: &str, location: LatLon) -> Self {
        Self {
            short_code: short_code.to_string(),
            name: name.to_string(),
            latitude: location.0,
            longitude: location.1,
            passenger_traffic: true,
        }
    }

    pub fn location(&self) -> LatLon {
        LatLon(self.latitude, self.longitude)
    }
}

/// A meteorological observation station (EMS).
///
/// The station name doubles as its identifier; it is unique within a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherStation {
    #[serde(rename = "station_name", alias = "name")]
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl WeatherStation {
    pub fn new(name: &str, location: LatLon) -> Self {
        Self {
            name: name.to_string(),
            latitude: location.0,
            longitude: location.1,
        }
    }

    pub fn location(&self) -> LatLon {
        LatLon(self.latitude, self.longitude)
    }
}

/// The weather station closest to one railway station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationMatch {
    /// Short code of the railway station.
    pub railway_station: String,
    pub railway_location: LatLon,
    /// Name of the nearest weather station.
    pub weather_station: String,
    pub weather_location: LatLon,
    /// Great-circle distance between the two stations, in kilometers.
    pub distance_km: f64,
}

/// Correspondence table from railway station short code to its [`StationMatch`].
///
/// Keeps the matches in the order of the railway registry they were built from.
/// If the registry contained a short code twice, lookups return the first match.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<StationMatch>", into = "Vec<StationMatch>")]
pub struct StationMatchTable {
    matches: Vec<StationMatch>,
    by_code: HashMap<String, usize>,
}

impl StationMatchTable {
    pub fn get(&self, railway_station: &str) -> Option<&StationMatch> {
        self.by_code
            .get(railway_station.trim())
            .map(|&idx| &self.matches[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = &StationMatch> {
        self.matches.iter()
    }

    pub fn as_slice(&self) -> &[StationMatch] {
        &self.matches
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// The largest distance between a railway station and its weather station.
    pub fn max_distance_km(&self) -> Option<f64> {
        self.matches
            .iter()
            .map(|m| m.distance_km)
            .max_by(|a, b| a.total_cmp(b))
    }
}

impl From<Vec<StationMatch>> for StationMatchTable {
    fn from(matches: Vec<StationMatch>) -> Self {
        let mut by_code = HashMap::with_capacity(matches.len());
        for (idx, m) in matches.iter().enumerate() {
            by_code.entry(m.railway_station.trim().to_string()).or_insert(idx);
        }
        Self { matches, by_code }
    }
}

impl From<StationMatchTable> for Vec<StationMatch> {
    fn from(table: StationMatchTable) -> Self {
        table.matches
    }
}

impl<'a> IntoIterator for &'a StationMatchTable {
    type Item = &'a StationMatch;
    type IntoIter = std::slice::Iter<'a, StationMatch>;

    fn into_iter(self) -> Self::IntoIter {
        self.matches.iter()
    }
}
