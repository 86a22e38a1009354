//! Tabular input through polars: observation tables and weather station
//! registries from a `DataFrame`, a CSV file or a parquet file.

use crate::io::error::LoadError;
use crate::io::LoadedObservations;
use crate::types::into_utc_trait::IntoUtcTimestamp;
use crate::types::location::LatLon;
use crate::types::observation::WeatherObservation;
use crate::types::station::WeatherStation;
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use polars::prelude::*;
use std::path::Path;

pub const COL_STATION: &str = "station_name";
pub const COL_TIMESTAMP: &str = "timestamp";
pub const COL_LATITUDE: &str = "latitude";
pub const COL_LONGITUDE: &str = "longitude";

fn get_column<'a>(df: &'a DataFrame, col: &str) -> Result<&'a Column, LoadError> {
    df.column(col)
        .map_err(|e| LoadError::ColumnNotFound(col.to_string(), e))
}

fn cast_column(column: &Column, dtype: &DataType) -> Result<Column, LoadError> {
    column
        .cast(dtype)
        .map_err(|e| LoadError::ColumnConversion(column.name().to_string(), e))
}

/// Trimmed, non-empty strings of a column.
fn string_values(column: &Column) -> Result<Vec<Option<String>>, LoadError> {
    let as_str = cast_column(column, &DataType::String)?;
    let ca = as_str
        .str()
        .map_err(|e| LoadError::ColumnConversion(column.name().to_string(), e))?;
    Ok(ca
        .into_iter()
        .map(|value| {
            value
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        })
        .collect())
}

fn float_values(column: &Column) -> Result<Vec<Option<f64>>, LoadError> {
    let as_f64 = cast_column(column, &DataType::Float64)?;
    let ca = as_f64
        .f64()
        .map_err(|e| LoadError::ColumnConversion(column.name().to_string(), e))?;
    Ok(ca
        .into_iter()
        .map(|value| value.filter(|v| !v.is_nan()))
        .collect())
}

/// Numeric columns are measurements. A column with no values at all is kept
/// too, since CSV inference types it as text.
fn is_measurement(column: &Column) -> bool {
    match column.dtype() {
        DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32
        | DataType::UInt64
        | DataType::Float32
        | DataType::Float64
        | DataType::Null => true,
        _ => column.null_count() == column.len(),
    }
}

/// Datetime columns are read from their physical UTC value, anything else is
/// parsed as text.
fn timestamp_values(column: &Column) -> Result<Vec<Option<DateTime<Utc>>>, LoadError> {
    if let DataType::Datetime(unit, _) = column.dtype() {
        let unit = *unit;
        let physical = cast_column(column, &DataType::Int64)?;
        let ca = physical
            .i64()
            .map_err(|e| LoadError::ColumnConversion(column.name().to_string(), e))?;
        return Ok(ca
            .into_iter()
            .map(|value| {
                value.and_then(|v| match unit {
                    TimeUnit::Milliseconds => DateTime::from_timestamp_millis(v),
                    TimeUnit::Microseconds => DateTime::from_timestamp_micros(v),
                    TimeUnit::Nanoseconds => Some(DateTime::from_timestamp_nanos(v)),
                })
            })
            .collect());
    }
    Ok(string_values(column)?
        .into_iter()
        .map(|value| value.and_then(|s| s.into_utc_timestamp()))
        .collect())
}

/// Converts an observation table into typed observations.
///
/// `station_name` and `timestamp` are required; every other numeric column is
/// a measurement variable, cast to `Float64`, where null and NaN become
/// missing values. Text columns such as quality flags are not measurements and
/// are left out. Rows without a station name or a usable timestamp are skipped.
///
/// # Errors
///
/// Returns [`LoadError::ColumnNotFound`] if a required column is absent, or
/// [`LoadError::ColumnConversion`] if a column cannot be cast.
pub fn observations_from_frame(df: &DataFrame) -> Result<LoadedObservations, LoadError> {
    let stations = string_values(get_column(df, COL_STATION)?)?;
    let timestamps = timestamp_values(get_column(df, COL_TIMESTAMP)?)?;

    let mut variables: Vec<(String, Vec<Option<f64>>)> = Vec::new();
    for column in df.get_columns() {
        let name = column.name().as_str();
        if name == COL_STATION || name == COL_TIMESTAMP {
            continue;
        }
        if !is_measurement(column) {
            debug!("Column '{name}' is not numeric, not a measurement");
            continue;
        }
        variables.push((name.to_string(), float_values(column)?));
    }

    let mut loaded = LoadedObservations::default();
    for (row, (station, timestamp)) in stations.into_iter().zip(timestamps).enumerate() {
        let observation = station.zip(timestamp).and_then(|(station, timestamp)| {
            let values = variables
                .iter()
                .map(|(name, values)| (name.clone(), values[row]));
            WeatherObservation::new(&station, timestamp, values)
        });
        loaded.push_row(observation);
    }
    loaded.log_skipped("DataFrame");
    Ok(loaded)
}

/// Converts a weather station table (`station_name`, `latitude`,
/// `longitude`) into a registry. Rows with a missing field are skipped.
pub fn weather_stations_from_frame(df: &DataFrame) -> Result<Vec<WeatherStation>, LoadError> {
    let names = string_values(get_column(df, COL_STATION)?)?;
    let latitudes = float_values(get_column(df, COL_LATITUDE)?)?;
    let longitudes = float_values(get_column(df, COL_LONGITUDE)?)?;

    let total = names.len();
    let stations: Vec<WeatherStation> = names
        .into_iter()
        .zip(latitudes)
        .zip(longitudes)
        .filter_map(|((name, lat), lon)| Some(WeatherStation::new(&name?, LatLon(lat?, lon?))))
        .collect();
    if stations.len() < total {
        warn!(
            "Skipped {} weather station rows with missing fields",
            total - stations.len()
        );
    }
    Ok(stations)
}

pub fn read_csv(path: &Path) -> Result<DataFrame, LoadError> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(|e| LoadError::TableRead(path.to_path_buf(), e))?
        .finish()
        .map_err(|e| LoadError::TableRead(path.to_path_buf(), e))?;
    info!("Read {} rows from {}", df.height(), path.display());
    Ok(df)
}

pub fn read_parquet(path: &Path) -> Result<DataFrame, LoadError> {
    let df = LazyFrame::scan_parquet(path, Default::default())
        .map_err(|e| LoadError::TableRead(path.to_path_buf(), e))?
        .collect()
        .map_err(|e| LoadError::TableRead(path.to_path_buf(), e))?;
    info!("Read {} rows from {}", df.height(), path.display());
    Ok(df)
}

pub fn observations_from_csv(path: &Path) -> Result<LoadedObservations, LoadError> {
    observations_from_frame(&read_csv(path)?)
}

pub fn observations_from_parquet(path: &Path) -> Result<LoadedObservations, LoadError> {
    observations_from_frame(&read_parquet(path)?)
}

pub fn weather_stations_from_csv(path: &Path) -> Result<Vec<WeatherStation>, LoadError> {
    weather_stations_from_frame(&read_csv(path)?)
}
