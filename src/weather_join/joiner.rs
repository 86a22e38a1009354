use crate::types::into_utc_trait::parse_scheduled_time;
use crate::types::observation::WeatherReading;
use crate::types::station::StationMatchTable;
use crate::types::timetable::{TimetableStop, TrainRun};
use crate::weather_join::error::StopIssue;
use crate::weather_join::observation_index::ObservationIndex;
use crate::weather_join::report::{JoinDiagnostic, JoinReport};
use bon::bon;
use chrono::Duration;
use log::debug;

/// Attaches to every timetable stop the observation of its matched weather
/// station that is closest in time to the stop's scheduled time.
///
/// The joiner only borrows the match table and the observation index, so one
/// index can serve any number of batches.
#[derive(Debug, Clone, Copy)]
pub struct WeatherJoiner<'a> {
    matches: &'a StationMatchTable,
    observations: &'a ObservationIndex,
    max_time_gap: Option<Duration>,
}

#[bon]
impl<'a> WeatherJoiner<'a> {
    /// Creates a joiner.
    ///
    /// # Arguments
    ///
    /// * `.matches(&StationMatchTable)`: **Required.** Railway station to weather station table.
    /// * `.observations(&ObservationIndex)`: **Required.** Indexed observations of the run.
    /// * `.max_time_gap(Duration)`: Optional. Observations further than this from the
    ///   scheduled time are rejected. Unbounded by default.
    ///
    /// # Examples
    ///
    /// ```
    /// use rail_weather::{ObservationIndex, StationMatchTable, WeatherJoiner};
    /// use chrono::Duration;
    ///
    /// let matches = StationMatchTable::default();
    /// let observations = ObservationIndex::default();
    /// let joiner = WeatherJoiner::builder()
    ///     .matches(&matches)
    ///     .observations(&observations)
    ///     .max_time_gap(Duration::hours(3))
    ///     .build();
    /// let report = joiner.join(&mut []);
    /// assert_eq!(report.total_stops, 0);
    /// ```
    #[builder]
    pub fn new(
        matches: &'a StationMatchTable,
        observations: &'a ObservationIndex,
        max_time_gap: Option<Duration>,
    ) -> Self {
        Self {
            matches,
            observations,
            max_time_gap,
        }
    }

    /// Populates `weather_observations` of every stop of every run, in place.
    ///
    /// Runs and stops keep their order. A stop that cannot be enriched is left
    /// with an empty mapping and reported; the batch always completes. Any
    /// weather already present on a stop is replaced, so joining twice gives
    /// the same result as joining once.
    pub fn join(&self, runs: &mut [TrainRun]) -> JoinReport {
        let mut report = JoinReport::default();

        for run in runs.iter_mut() {
            for (stop_index, stop) in run.stops.iter_mut().enumerate() {
                report.total_stops += 1;
                match self.join_stop(stop) {
                    Ok(()) => report.enriched_stops += 1,
                    Err(issue) => {
                        debug!(
                            "Train {} ({}) stop {} at {}: {}",
                            run.train_number,
                            run.departure_date,
                            stop_index,
                            stop.station_short_code,
                            issue
                        );
                        report.diagnostics.push(JoinDiagnostic {
                            train_number: run.train_number,
                            departure_date: run.departure_date,
                            stop_index,
                            station_code: stop.station_short_code.clone(),
                            issue,
                        });
                    }
                }
            }
        }

        report.log_summary();
        report
    }

    /// Enriches a single stop.
    ///
    /// # Errors
    ///
    /// Returns the [`StopIssue`] that kept the stop from being enriched; the
    /// stop's weather mapping is empty in that case.
    pub fn join_stop(&self, stop: &mut TimetableStop) -> Result<(), StopIssue> {
        stop.weather_observations = WeatherReading::default();

        let station_match = Some(stop.station_short_code.trim())
            .filter(|code| !code.is_empty())
            .and_then(|code| self.matches.get(code))
            .ok_or_else(|| StopIssue::UnmatchedStation {
                station: stop.station_short_code.clone(),
            })?;
        let weather_station = station_match.weather_station.trim();

        if !self.observations.contains_station(weather_station) {
            return Err(StopIssue::NoObservations {
                station: stop.station_short_code.clone(),
                weather_station: weather_station.to_string(),
            });
        }

        let scheduled = parse_scheduled_time(&stop.scheduled_time).map_err(|source| {
            StopIssue::Format {
                value: stop.scheduled_time.clone(),
                source,
            }
        })?;

        let observation = self
            .observations
            .nearest(weather_station, scheduled)
            .ok_or_else(|| StopIssue::NoObservations {
                station: stop.station_short_code.clone(),
                weather_station: weather_station.to_string(),
            })?;

        if let Some(max_gap) = self.max_time_gap {
            let gap = (observation.timestamp - scheduled).abs();
            if gap > max_gap {
                return Err(StopIssue::StaleObservation {
                    weather_station: weather_station.to_string(),
                    gap,
                });
            }
        }

        stop.weather_observations = WeatherReading::from_observation(weather_station, observation);
        Ok(())
    }
}
