//! Per-station, time-ordered observation series with nearest-timestamp lookup.

use crate::types::observation::WeatherObservation;
use chrono::{DateTime, Utc};
use log::{debug, info};
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
struct StationSeries {
    /// Ascending and unique; `timestamps[i]` belongs to `observations[i]`.
    timestamps: Vec<DateTime<Utc>>,
    observations: Vec<WeatherObservation>,
}

impl StationSeries {
    fn nearest(&self, at: DateTime<Utc>) -> Option<&WeatherObservation> {
        nearest_position(&self.timestamps, at).map(|idx| &self.observations[idx])
    }
}

/// Position of the timestamp closest to `at` in an ascending slice.
///
/// Compares the neighbours on both sides of the insertion point and clamps at
/// either end. When both neighbours are equally far away the earlier one wins.
pub(crate) fn nearest_position(timestamps: &[DateTime<Utc>], at: DateTime<Utc>) -> Option<usize> {
    if timestamps.is_empty() {
        return None;
    }
    let idx = timestamps.partition_point(|t| *t < at);
    if idx == 0 {
        return Some(0);
    }
    if idx == timestamps.len() {
        return Some(idx - 1);
    }
    let before = at - timestamps[idx - 1];
    let after = timestamps[idx] - at;
    Some(if after < before { idx } else { idx - 1 })
}

/// All weather observations of a run, grouped by weather station and sorted
/// by time.
///
/// Built once per run; every lookup afterwards is a binary search in the
/// series of a single station. Station names are trimmed of surrounding
/// whitespace. If a station reports the same timestamp more than once, the
/// first observation in input order is kept.
#[derive(Debug, Clone, Default)]
pub struct ObservationIndex {
    series: HashMap<String, StationSeries>,
    observation_count: usize,
    dropped_duplicates: usize,
}

impl ObservationIndex {
    /// # Examples
    ///
    /// ```
    /// use rail_weather::{ObservationIndex, WeatherObservation};
    /// use chrono::{TimeZone, Utc};
    ///
    /// let observations = ["2024-01-01 10:00:00", "2024-01-01 11:00:00"]
    ///     .into_iter()
    ///     .filter_map(|t| WeatherObservation::new("Kumpula", t, []));
    /// let index = ObservationIndex::build(observations);
    ///
    /// let at = Utc.with_ymd_and_hms(2024, 1, 1, 10, 40, 0).unwrap();
    /// let nearest = index.nearest("Kumpula", at).unwrap();
    /// assert_eq!(nearest.timestamp, Utc.with_ymd_and_hms(2024, 1, 1, 11, 0, 0).unwrap());
    /// ```
    pub fn build(observations: impl IntoIterator<Item = WeatherObservation>) -> Self {
        let mut grouped: HashMap<String, Vec<WeatherObservation>> = HashMap::new();
        for mut observation in observations {
            let key = observation.station.trim();
            if key.len() != observation.station.len() {
                observation.station = key.to_string();
            }
            grouped
                .entry(observation.station.clone())
                .or_default()
                .push(observation);
        }

        let mut series = HashMap::with_capacity(grouped.len());
        let mut observation_count = 0;
        let mut dropped_duplicates = 0;
        for (station, mut observations) in grouped {
            // Stable, so equal timestamps stay in input order for dedup_by
            observations.sort_by_key(|obs| obs.timestamp);
            let before = observations.len();
            observations.dedup_by(|later, kept| later.timestamp == kept.timestamp);
            let dropped = before - observations.len();
            if dropped > 0 {
                debug!("Dropped {dropped} duplicate timestamps for weather station '{station}'");
            }
            dropped_duplicates += dropped;
            observation_count += observations.len();

            let timestamps = observations.iter().map(|obs| obs.timestamp).collect();
            series.insert(
                station,
                StationSeries {
                    timestamps,
                    observations,
                },
            );
        }

        info!(
            "Indexed {} observations for {} weather stations ({} duplicate timestamps dropped)",
            observation_count,
            series.len(),
            dropped_duplicates
        );
        Self {
            series,
            observation_count,
            dropped_duplicates,
        }
    }

    /// The observation of `station` closest in time to `at`, or `None` if the
    /// station has no observations.
    pub fn nearest(&self, station: &str, at: DateTime<Utc>) -> Option<&WeatherObservation> {
        self.series.get(station.trim())?.nearest(at)
    }

    /// All observations of `station`, oldest first.
    pub fn series(&self, station: &str) -> Option<&[WeatherObservation]> {
        self.series
            .get(station.trim())
            .map(|s| s.observations.as_slice())
    }

    pub fn contains_station(&self, station: &str) -> bool {
        self.series.contains_key(station.trim())
    }

    pub fn stations(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    pub fn station_count(&self) -> usize {
        self.series.len()
    }

    /// Number of indexed observations, after duplicates were dropped.
    pub fn observation_count(&self) -> usize {
        self.observation_count
    }

    pub fn dropped_duplicates(&self) -> usize {
        self.dropped_duplicates
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

impl FromIterator<WeatherObservation> for ObservationIndex {
    fn from_iter<I: IntoIterator<Item = WeatherObservation>>(iter: I) -> Self {
        Self::build(iter)
    }
}
