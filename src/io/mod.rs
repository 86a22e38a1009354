//! Reading registries, feeds and observation tables from disk, and caching
//! the station match table between runs.

pub mod cache;
pub mod error;
pub mod frame;
pub mod json;

use crate::types::observation::WeatherObservation;
use log::warn;

/// Observations read from a source, with the number of rows that had to be
/// skipped (no station name or no usable timestamp).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadedObservations {
    pub observations: Vec<WeatherObservation>,
    pub skipped_rows: usize,
}

impl LoadedObservations {
    pub(crate) fn push_row(&mut self, observation: Option<WeatherObservation>) {
        match observation {
            Some(observation) => self.observations.push(observation),
            None => self.skipped_rows += 1,
        }
    }

    pub(crate) fn log_skipped(&self, source: &str) {
        if self.skipped_rows > 0 {
            warn!(
                "Skipped {} of {} observation rows from {}",
                self.skipped_rows,
                self.skipped_rows + self.observations.len(),
                source
            );
        }
    }
}
