//! Train runs and their timetable rows, shaped after the Digitraffic `/trains` feed.

use crate::types::month::Month;
use crate::types::observation::WeatherReading;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Whether a timetable row is an arrival at or a departure from the station.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StopType {
    Arrival,
    Departure,
    #[default]
    #[serde(other)]
    Unknown,
}

/// One scheduled arrival or departure of a train at a station.
///
/// Railway-domain fields are carried through untouched; any field of the feed
/// not named here is kept in `extra`. The joiner only reads
/// `station_short_code` and `scheduled_time`, and only writes
/// `weather_observations`.
///
/// A row missing its station code or scheduled time still loads, with the
/// field left empty; the joiner reports it instead of the whole feed failing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimetableStop {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub station_short_code: String,
    /// Human-readable station name, filled in by
    /// [`crate::filtering::annotate_station_names`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub station_name: Option<String>,
    #[serde(default, rename = "type")]
    pub stop_type: StopType,
    /// Scheduled time as published, e.g. `2024-01-01T04:57:00.000Z`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub scheduled_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_time: Option<String>,
    #[serde(default)]
    pub cancelled: bool,
    /// Delay against the schedule in minutes, when the train has passed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difference_in_minutes: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
    /// Weather at the stop, populated by the joiner.
    #[serde(default, rename = "weather_observations")]
    pub weather_observations: WeatherReading,
}

impl TimetableStop {
    pub fn new(station_short_code: &str, stop_type: StopType, scheduled_time: &str) -> Self {
        Self {
            station_short_code: station_short_code.to_string(),
            station_name: None,
            stop_type,
            scheduled_time: scheduled_time.to_string(),
            actual_time: None,
            cancelled: false,
            difference_in_minutes: None,
            extra: Map::new(),
            weather_observations: WeatherReading::default(),
        }
    }
}

/// A train's run on one service date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainRun {
    pub train_number: u32,
    pub departure_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator_short_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub train_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub train_category: Option<String>,
    #[serde(default)]
    pub cancelled: bool,
    /// Stops in schedule order.
    #[serde(rename = "timeTableRows", default)]
    pub stops: Vec<TimetableStop>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TrainRun {
    pub fn new(train_number: u32, departure_date: NaiveDate, stops: Vec<TimetableStop>) -> Self {
        Self {
            train_number,
            departure_date,
            operator_short_code: None,
            train_type: None,
            train_category: None,
            cancelled: false,
            stops,
            extra: Map::new(),
        }
    }

    /// Distinct station codes the train calls at.
    pub fn station_codes(&self) -> HashSet<&str> {
        self.stops
            .iter()
            .map(|stop| stop.station_short_code.as_str())
            .collect()
    }

    /// Whether the timetable includes every one of `codes`.
    pub fn calls_at_all<S: AsRef<str>>(&self, codes: &[S]) -> bool {
        let calls = self.station_codes();
        codes.iter().all(|code| calls.contains(code.as_ref()))
    }

    pub fn departure_month(&self) -> Month {
        Month::from_date(self.departure_date)
    }
}
