mod error;
pub mod filtering;
pub mod io;
mod rail_weather;
mod stations;
mod types;
mod utils;
mod weather_join;

pub use error::RailWeatherError;
pub use rail_weather::*;

pub use stations::error::{MatchStationsError, Registry};
pub use stations::station_index::WeatherStationIndex;
pub use stations::station_matcher::{match_stations, match_stations_with, MatchStrategy};

pub use types::into_utc_trait::{parse_scheduled_time, IntoUtcTimestamp, SCHEDULED_TIME_FORMAT};
pub use types::location::{LatLon, EARTH_RADIUS_KM};
pub use types::month::Month;
pub use types::observation::{Measurements, WeatherObservation, WeatherReading};
pub use types::station::*;
pub use types::timetable::{StopType, TimetableStop, TrainRun};

pub use weather_join::error::{IssueKind, StopIssue};
pub use weather_join::joiner::WeatherJoiner;
pub use weather_join::observation_index::ObservationIndex;
pub use weather_join::report::{JoinDiagnostic, JoinReport};

pub use io::cache::MatchTableCache;
pub use io::error::LoadError;
pub use io::LoadedObservations;
