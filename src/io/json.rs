//! JSON input and output: station registries, train feeds and observations.
//!
//! Readers accept anything implementing [`Read`]; the `*_from_path` variants
//! open and buffer the file themselves.

use crate::io::error::LoadError;
use crate::io::LoadedObservations;
use crate::types::observation::WeatherObservation;
use crate::types::station::{RailwayStation, StationMatchTable, WeatherStation};
use crate::types::timetable::TrainRun;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

fn from_path<T: DeserializeOwned>(path: &Path) -> Result<T, LoadError> {
    let file = File::open(path).map_err(|e| LoadError::Read(path.to_path_buf(), e))?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

fn to_path<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), LoadError> {
    let file = File::create(path).map_err(|e| LoadError::Write(path.to_path_buf(), e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer
        .flush()
        .map_err(|e| LoadError::Write(path.to_path_buf(), e))
}

/// Railway station metadata, e.g. the Digitraffic `/metadata/stations` response.
pub fn read_railway_stations<R: Read>(reader: R) -> Result<Vec<RailwayStation>, LoadError> {
    Ok(serde_json::from_reader(reader)?)
}

pub fn read_railway_stations_from_path(path: &Path) -> Result<Vec<RailwayStation>, LoadError> {
    from_path(path)
}

pub fn read_weather_stations<R: Read>(reader: R) -> Result<Vec<WeatherStation>, LoadError> {
    Ok(serde_json::from_reader(reader)?)
}

pub fn read_weather_stations_from_path(path: &Path) -> Result<Vec<WeatherStation>, LoadError> {
    from_path(path)
}

/// Train runs, e.g. the Digitraffic `/trains/{date}` response.
pub fn read_train_runs<R: Read>(reader: R) -> Result<Vec<TrainRun>, LoadError> {
    Ok(serde_json::from_reader(reader)?)
}

pub fn read_train_runs_from_path(path: &Path) -> Result<Vec<TrainRun>, LoadError> {
    from_path(path)
}

/// Writes (enriched) train runs in the same shape they were read in.
pub fn write_train_runs<W: Write>(writer: W, runs: &[TrainRun]) -> Result<(), LoadError> {
    Ok(serde_json::to_writer_pretty(writer, runs)?)
}

pub fn write_train_runs_to_path(path: &Path, runs: &[TrainRun]) -> Result<(), LoadError> {
    to_path(path, runs)
}

pub fn write_match_table<W: Write>(writer: W, table: &StationMatchTable) -> Result<(), LoadError> {
    Ok(serde_json::to_writer_pretty(writer, table)?)
}

pub fn read_match_table<R: Read>(reader: R) -> Result<StationMatchTable, LoadError> {
    Ok(serde_json::from_reader(reader)?)
}

#[derive(Debug, Deserialize)]
struct ObservationRecord {
    #[serde(default, alias = "station")]
    station_name: Option<String>,
    #[serde(default)]
    timestamp: Option<String>,
    #[serde(flatten)]
    values: Map<String, Value>,
}

impl ObservationRecord {
    fn into_observation(self) -> Option<WeatherObservation> {
        let station = self.station_name?;
        let station = station.trim();
        if station.is_empty() {
            return None;
        }
        // Non-numeric fields are not measurements
        let values = self.values.into_iter().filter_map(|(name, value)| match value {
            Value::Null => Some((name, None)),
            Value::Number(n) => Some((name, n.as_f64())),
            _ => None,
        });
        WeatherObservation::new(station, self.timestamp?.as_str(), values)
    }
}

/// Observations as a JSON array of flat records:
/// `{"station_name": .., "timestamp": .., "<variable>": <number or null>, ..}`.
///
/// Records without a station name or with an unparseable timestamp are
/// skipped and counted.
pub fn read_observations<R: Read>(reader: R) -> Result<LoadedObservations, LoadError> {
    let records: Vec<ObservationRecord> = serde_json::from_reader(reader)?;
    let mut loaded = LoadedObservations::default();
    for record in records {
        loaded.push_row(record.into_observation());
    }
    loaded.log_skipped("JSON records");
    Ok(loaded)
}

pub fn read_observations_from_path(path: &Path) -> Result<LoadedObservations, LoadError> {
    let file = File::open(path).map_err(|e| LoadError::Read(path.to_path_buf(), e))?;
    read_observations(BufReader::new(file))
}
