//! Preparation steps around the join: narrowing train runs and observations
//! down to what a batch needs, and filling in station names.

use crate::io::frame::COL_TIMESTAMP;
use crate::types::month::Month;
use crate::types::observation::WeatherObservation;
use crate::types::station::RailwayStation;
use crate::types::timetable::TrainRun;
use chrono::{DateTime, Utc};
use log::{debug, info};
use polars::prelude::{col, lit, DataType, LazyFrame, TimeUnit};
use std::collections::{BTreeMap, HashMap};

/// Station codes of the Helsinki - Oulu - Rovaniemi main line.
pub const HELSINKI_OULU_ROVANIEMI: [&str; 3] = ["HKI", "OL", "ROI"];

/// Sets `station_name` on every stop whose code is in the railway registry.
///
/// Returns the number of stops that received a name. Stops with an unknown
/// code keep whatever name they had.
pub fn annotate_station_names(runs: &mut [TrainRun], stations: &[RailwayStation]) -> usize {
    let mut names: HashMap<&str, &str> = HashMap::with_capacity(stations.len());
    for station in stations {
        names
            .entry(station.short_code.trim())
            .or_insert(station.name.trim());
    }

    let mut annotated = 0;
    for stop in runs.iter_mut().flat_map(|run| run.stops.iter_mut()) {
        if let Some(name) = names.get(stop.station_short_code.trim()) {
            stop.station_name = Some((*name).to_string());
            annotated += 1;
        }
    }
    debug!("Annotated {annotated} stops with station names");
    annotated
}

/// Keeps only the runs whose timetable calls at every one of `codes`,
/// in their original order.
///
/// # Examples
///
/// ```
/// use rail_weather::filtering::{retain_trains_through, HELSINKI_OULU_ROVANIEMI};
///
/// let mut runs = Vec::new();
/// retain_trains_through(&mut runs, &HELSINKI_OULU_ROVANIEMI);
/// assert!(runs.is_empty());
/// ```
pub fn retain_trains_through<S: AsRef<str>>(runs: &mut Vec<TrainRun>, codes: &[S]) {
    let before = runs.len();
    runs.retain(|run| run.calls_at_all(codes));
    info!(
        "Kept {} of {} train runs calling at all of {:?}",
        runs.len(),
        before,
        codes.iter().map(AsRef::as_ref).collect::<Vec<_>>()
    );
}

/// Splits runs by the month of their departure date. Runs keep their
/// relative order within each month.
pub fn group_by_month(runs: Vec<TrainRun>) -> BTreeMap<Month, Vec<TrainRun>> {
    let mut months: BTreeMap<Month, Vec<TrainRun>> = BTreeMap::new();
    for run in runs {
        months.entry(run.departure_month()).or_default().push(run);
    }
    months
}

/// Drops observations outside `start..=end`. Returns how many were dropped.
pub fn retain_observations_between(
    observations: &mut Vec<WeatherObservation>,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> usize {
    let before = observations.len();
    observations.retain(|obs| obs.timestamp >= start && obs.timestamp <= end);
    let dropped = before - observations.len();
    debug!("Dropped {dropped} observations outside {start} - {end}");
    dropped
}

/// Drops observations outside `month`. Returns how many were dropped.
pub fn retain_observations_in_month(
    observations: &mut Vec<WeatherObservation>,
    month: Month,
) -> usize {
    match month.utc_bounds() {
        Some((start, end)) => retain_observations_between(observations, start, end),
        None => {
            let dropped = observations.len();
            observations.clear();
            dropped
        }
    }
}

pub trait ObservationFrameFilterExt {
    /// Filters an observation LazyFrame to timestamps in `start..=end`.
    ///
    /// The `timestamp` column must hold datetimes; string timestamps are
    /// parsed later, by [`crate::io::frame::observations_from_frame`].
    fn filter_observations_between(self, start: DateTime<Utc>, end: DateTime<Utc>) -> LazyFrame;
}

impl ObservationFrameFilterExt for LazyFrame {
    fn filter_observations_between(self, start: DateTime<Utc>, end: DateTime<Utc>) -> LazyFrame {
        let timestamp = || col(COL_TIMESTAMP).cast(DataType::Datetime(TimeUnit::Milliseconds, None));
        self.filter(
            timestamp()
                .gt_eq(lit(start.naive_utc()))
                .and(timestamp().lt_eq(lit(end.naive_utc()))),
        )
    }
}
