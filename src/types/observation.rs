//! Weather observations and the per-stop weather record attached to timetable rows.

use crate::types::into_utc_trait::IntoUtcTimestamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Measurement variables of one observation, keyed by variable name
/// (e.g. "Air temperature", "Wind speed"). `None` marks a value the station
/// did not report.
pub type Measurements = BTreeMap<String, Option<f64>>;

/// A single observation made by one weather station at one instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherObservation {
    #[serde(rename = "station_name")]
    pub station: String,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub values: Measurements,
}

impl WeatherObservation {
    /// Creates an observation, resolving `timestamp` to UTC.
    ///
    /// Returns `None` if the timestamp cannot be interpreted.
    ///
    /// # Examples
    ///
    /// ```
    /// use rail_weather::WeatherObservation;
    ///
    /// let obs = WeatherObservation::new(
    ///     "Helsinki Kumpula",
    ///     "2024-01-01 10:00:00",
    ///     [("Air temperature".to_string(), Some(-4.5))],
    /// )
    /// .unwrap();
    /// assert_eq!(obs.value("Air temperature"), Some(-4.5));
    /// ```
    pub fn new(
        station: &str,
        timestamp: impl IntoUtcTimestamp,
        values: impl IntoIterator<Item = (String, Option<f64>)>,
    ) -> Option<Self> {
        Some(Self {
            station: station.to_string(),
            timestamp: timestamp.into_utc_timestamp()?,
            values: values.into_iter().collect(),
        })
    }

    pub fn value(&self, variable: &str) -> Option<f64> {
        self.values.get(variable).copied().flatten()
    }
}

/// Weather attached to a timetable stop.
///
/// Serializes as a flat mapping: the matched weather station's name first
/// (as `station_name`), followed by every measurement of the selected
/// observation. A stop without weather serializes as an empty mapping `{}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherReading {
    #[serde(
        rename = "station_name",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub station: Option<String>,
    #[serde(flatten)]
    pub values: Measurements,
}

impl WeatherReading {
    /// Copies the measurements of `observation`, tagged with the weather
    /// station it was selected from.
    pub fn from_observation(weather_station: &str, observation: &WeatherObservation) -> Self {
        Self {
            station: Some(weather_station.to_string()),
            values: observation.values.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.station.is_none() && self.values.is_empty()
    }

    pub fn value(&self, variable: &str) -> Option<f64> {
        self.values.get(variable).copied().flatten()
    }
}
