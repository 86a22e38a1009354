//! The main entry point: holds the station registries and observations of a
//! run, and enriches batches of train runs with weather.

use crate::error::RailWeatherError;
use crate::io::cache::MatchTableCache;
use crate::stations::station_index::WeatherStationIndex;
use crate::stations::station_matcher::{match_stations_with, MatchStrategy};
use crate::types::location::LatLon;
use crate::types::observation::WeatherObservation;
use crate::types::station::{RailwayStation, StationMatchTable, WeatherStation};
use crate::types::timetable::TrainRun;
use crate::weather_join::joiner::WeatherJoiner;
use crate::weather_join::observation_index::ObservationIndex;
use crate::weather_join::report::JoinReport;
use bon::bon;
use chrono::Duration;

/// Matched registries plus indexed observations, ready to enrich train runs.
///
/// Construction does all the per-run work once: stations are matched and
/// observations are indexed per weather station. Each call to
/// [`RailWeather::enrich`] is then a lookup per stop.
///
/// # Examples
///
/// ```
/// use rail_weather::{LatLon, RailWeather, RailwayStation, StopType, TimetableStop, TrainRun, WeatherObservation, WeatherStation};
/// use chrono::NaiveDate;
///
/// # fn main() -> Result<(), rail_weather::RailWeatherError> {
/// let client = RailWeather::builder()
///     .railway_stations(vec![RailwayStation::new("HKI", "Helsinki asema", LatLon(60.1721, 24.9412))])
///     .weather_stations(vec![WeatherStation::new("Helsinki Kaisaniemi", LatLon(60.1751, 24.9441))])
///     .observations(
///         WeatherObservation::new("Helsinki Kaisaniemi", "2024-01-01 05:00:00", [("Air temperature".to_string(), Some(-7.1))])
///             .into_iter()
///             .collect(),
///     )
///     .build()?;
///
/// let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
/// let mut runs = vec![TrainRun::new(
///     1,
///     date,
///     vec![TimetableStop::new("HKI", StopType::Departure, "2024-01-01T04:57:00.000Z")],
/// )];
/// let report = client.enrich().runs(&mut runs).call();
/// assert!(report.is_complete());
/// assert_eq!(runs[0].stops[0].weather_observations.value("Air temperature"), Some(-7.1));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct RailWeather {
    railway_stations: Vec<RailwayStation>,
    weather_stations: Vec<WeatherStation>,
    matches: StationMatchTable,
    observations: ObservationIndex,
    station_index: WeatherStationIndex,
}

#[bon]
impl RailWeather {
    /// Matches the registries and indexes the observations.
    ///
    /// # Arguments
    ///
    /// * `.railway_stations(Vec<RailwayStation>)`: **Required.** The railway station registry.
    /// * `.weather_stations(Vec<WeatherStation>)`: **Required.** The weather station registry.
    /// * `.observations(Vec<WeatherObservation>)`: **Required.** All observations of the run.
    /// * `.strategy(MatchStrategy)`: Optional. Defaults to [`MatchStrategy::Exhaustive`].
    /// * `.cache(MatchTableCache)`: Optional. Reuse a cached match table computed from the
    ///   same registries, storing a fresh one otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`RailWeatherError::MatchStations`] if a registry is empty or a
    /// railway station cannot be matched, and [`RailWeatherError::Load`] if the
    /// cache cannot be written.
    #[builder]
    pub fn new(
        railway_stations: Vec<RailwayStation>,
        weather_stations: Vec<WeatherStation>,
        observations: Vec<WeatherObservation>,
        strategy: Option<MatchStrategy>,
        cache: Option<MatchTableCache>,
    ) -> Result<Self, RailWeatherError> {
        let strategy = strategy.unwrap_or_default();
        let matches = match cache {
            Some(cache) => cache.load_or_match(&railway_stations, &weather_stations, strategy)?,
            None => match_stations_with(&railway_stations, &weather_stations, strategy)?,
        };
        let station_index = WeatherStationIndex::new(&weather_stations);

        Ok(Self {
            railway_stations,
            weather_stations,
            matches,
            observations: ObservationIndex::build(observations),
            station_index,
        })
    }

    pub fn matches(&self) -> &StationMatchTable {
        &self.matches
    }

    pub fn observations(&self) -> &ObservationIndex {
        &self.observations
    }

    pub fn railway_stations(&self) -> &[RailwayStation] {
        &self.railway_stations
    }

    pub fn weather_stations(&self) -> &[WeatherStation] {
        &self.weather_stations
    }

    /// Populates the weather of every stop of `runs`, in place.
    ///
    /// # Arguments
    ///
    /// * `.runs(&mut [TrainRun])`: **Required.** The runs to enrich.
    /// * `.max_time_gap(Duration)`: Optional. Reject observations further than this
    ///   from a stop's scheduled time. Unbounded by default.
    /// * `.annotate_station_names(bool)`: Optional. Also fill in each stop's station
    ///   name from the railway registry. Defaults to `false`.
    #[builder]
    pub fn enrich(
        &self,
        runs: &mut [TrainRun],
        max_time_gap: Option<Duration>,
        annotate_station_names: Option<bool>,
    ) -> JoinReport {
        if annotate_station_names.unwrap_or(false) {
            crate::filtering::annotate_station_names(runs, &self.railway_stations);
        }
        WeatherJoiner::builder()
            .matches(&self.matches)
            .observations(&self.observations)
            .maybe_max_time_gap(max_time_gap)
            .build()
            .join(runs)
    }

    /// Weather stations near a location, closest first, with their distance
    /// in kilometers.
    ///
    /// # Arguments
    ///
    /// * `.location(LatLon)`: **Required.** The point to search around.
    /// * `.max_distance_km(f64)`: Optional. The search radius. Defaults to `50.0`.
    /// * `.station_limit(usize)`: Optional. The maximum number of stations returned. Defaults to `5`.
    #[builder]
    pub fn nearby_weather_stations(
        &self,
        location: LatLon,
        max_distance_km: Option<f64>,
        station_limit: Option<usize>,
    ) -> Vec<(WeatherStation, f64)> {
        let max_distance_km = max_distance_km.unwrap_or(50.0);
        let station_limit = station_limit.unwrap_or(5);
        self.station_index
            .within_radius(location, max_distance_km, station_limit)
            .into_iter()
            .map(|(station, distance_km)| (station.clone(), distance_km))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stations::error::{MatchStationsError, Registry};
    use crate::types::timetable::{StopType, TimetableStop};
    use chrono::NaiveDate;

    fn client(observations: Vec<WeatherObservation>) -> RailWeather {
        RailWeather::builder()
            .railway_stations(vec![
                RailwayStation::new("HKI", "Helsinki asema", LatLon(60.1721, 24.9412)),
                RailwayStation::new("OL", "Oulu asema", LatLon(65.0121, 25.4837)),
            ])
            .weather_stations(vec![
                WeatherStation::new("Helsinki Kaisaniemi", LatLon(60.1751, 24.9441)),
                WeatherStation::new("Helsinki Kumpula", LatLon(60.2033, 24.9611)),
                WeatherStation::new("Oulu lentoasema", LatLon(64.9301, 25.3546)),
            ])
            .observations(observations)
            .strategy(MatchStrategy::Indexed)
            .build()
            .unwrap()
    }

    fn observation(station: &str, time: &str, temperature: f64) -> WeatherObservation {
        WeatherObservation::new(
            station,
            time,
            [("Air temperature".to_string(), Some(temperature))],
        )
        .unwrap()
    }

    #[test]
    fn test_enrich_with_annotation_and_gap() {
        let client = client(vec![
            observation("Helsinki Kaisaniemi", "2024-01-01 05:00:00", -7.1),
            observation("Oulu lentoasema", "2024-01-01 05:00:00", -20.0),
        ]);
        assert_eq!(client.matches().len(), 2);
        assert_eq!(client.observations().station_count(), 2);

        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let mut runs = vec![TrainRun::new(
            21,
            date,
            vec![
                TimetableStop::new("HKI", StopType::Departure, "2024-01-01T05:02:00.000Z"),
                TimetableStop::new("OL", StopType::Arrival, "2024-01-01T11:40:00.000Z"),
            ],
        )];

        let report = client
            .enrich()
            .runs(&mut runs)
            .max_time_gap(Duration::hours(2))
            .annotate_station_names(true)
            .call();
        assert_eq!(report.enriched_stops, 1);
        assert_eq!(report.missing_stops(), 1);
        assert_eq!(runs[0].stops[0].station_name.as_deref(), Some("Helsinki asema"));
        assert_eq!(
            runs[0].stops[0].weather_observations.station.as_deref(),
            Some("Helsinki Kaisaniemi")
        );
        assert!(runs[0].stops[1].weather_observations.is_empty());
    }

    #[test]
    fn test_nearby_weather_stations_defaults() {
        let client = client(vec![]);
        let nearby = client
            .nearby_weather_stations()
            .location(LatLon(60.1721, 24.9412))
            .call();
        let names: Vec<&str> = nearby.iter().map(|(s, _)| s.name.as_str()).collect();
        assert_eq!(names, vec!["Helsinki Kaisaniemi", "Helsinki Kumpula"]);

        let limited = client
            .nearby_weather_stations()
            .location(LatLon(60.1721, 24.9412))
            .max_distance_km(1000.0)
            .station_limit(1)
            .call();
        assert_eq!(limited.len(), 1);
    }

    #[test]
    fn test_empty_registry_fails_construction() {
        let err = RailWeather::builder()
            .railway_stations(vec![])
            .weather_stations(vec![WeatherStation::new("Oulu", LatLon(65.0, 25.5))])
            .observations(vec![])
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            RailWeatherError::MatchStations(MatchStationsError::EmptyInput(Registry::Railway))
        ));
    }
}
