use crate::stations::error::{MatchStationsError, Registry};
use crate::stations::station_index::WeatherStationIndex;
use crate::types::location::LatLon;
use crate::types::station::{RailwayStation, StationMatch, StationMatchTable, WeatherStation};
use log::{debug, info};

/// How the nearest weather station is searched for.
///
/// Both strategies return identical tables; `Indexed` only pays off for large
/// weather registries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MatchStrategy {
    /// Compare every railway station with every weather station.
    #[default]
    Exhaustive,
    /// Walk an R-tree of weather stations outwards from each railway station.
    Indexed,
}

/// Matches every railway station with its nearest weather station by
/// great-circle distance, comparing all pairs.
///
/// Weather stations are visited in registry order and the first minimum
/// found is kept, so equidistant candidates resolve to the one listed first.
///
/// # Errors
///
/// Returns [`MatchStationsError::EmptyInput`] if either registry is empty, and
/// [`MatchStationsError::NoFiniteDistance`] if a railway station has no weather
/// station at a finite distance (non-finite coordinates on either side).
///
/// # Examples
///
/// ```
/// use rail_weather::{match_stations, LatLon, RailwayStation, WeatherStation};
///
/// let railway = vec![RailwayStation::new("R1", "Railway 1", LatLon(60.1, 24.1))];
/// let weather = vec![
///     WeatherStation::new("W1", LatLon(60.0, 24.0)),
///     WeatherStation::new("W2", LatLon(61.0, 25.0)),
/// ];
/// let table = match_stations(&railway, &weather).unwrap();
/// assert_eq!(table.get("R1").unwrap().weather_station, "W1");
/// ```
pub fn match_stations(
    railway_stations: &[RailwayStation],
    weather_stations: &[WeatherStation],
) -> Result<StationMatchTable, MatchStationsError> {
    match_stations_with(railway_stations, weather_stations, MatchStrategy::Exhaustive)
}

/// Like [`match_stations`], choosing the search strategy.
pub fn match_stations_with(
    railway_stations: &[RailwayStation],
    weather_stations: &[WeatherStation],
    strategy: MatchStrategy,
) -> Result<StationMatchTable, MatchStationsError> {
    if railway_stations.is_empty() {
        return Err(MatchStationsError::EmptyInput(Registry::Railway));
    }
    if weather_stations.is_empty() {
        return Err(MatchStationsError::EmptyInput(Registry::Weather));
    }

    let matches = match strategy {
        MatchStrategy::Exhaustive => railway_stations
            .iter()
            .map(|railway| {
                let nearest = nearest_weather_station(railway.location(), weather_stations);
                to_match(railway, nearest)
            })
            .collect::<Result<Vec<_>, _>>()?,
        MatchStrategy::Indexed => {
            let index = WeatherStationIndex::new(weather_stations);
            railway_stations
                .iter()
                .map(|railway| to_match(railway, index.nearest(railway.location())))
                .collect::<Result<Vec<_>, _>>()?
        }
    };

    let table = StationMatchTable::from(matches);
    info!(
        "Matched {} railway stations against {} weather stations ({:?}), largest distance {:.2} km",
        table.len(),
        weather_stations.len(),
        strategy,
        table.max_distance_km().unwrap_or(0.0)
    );
    Ok(table)
}

/// Linear scan for the weather station closest to `location`.
///
/// Only a strictly smaller distance replaces the current best; NaN distances
/// never do.
fn nearest_weather_station(
    location: LatLon,
    weather_stations: &[WeatherStation],
) -> Option<(&WeatherStation, f64)> {
    let mut min_distance = f64::INFINITY;
    let mut closest: Option<&WeatherStation> = None;

    for weather in weather_stations {
        let distance_km = location.distance_km(weather.location());
        if distance_km < min_distance {
            min_distance = distance_km;
            closest = Some(weather);
        }
    }

    closest.map(|weather| (weather, min_distance))
}

fn to_match(
    railway: &RailwayStation,
    nearest: Option<(&WeatherStation, f64)>,
) -> Result<StationMatch, MatchStationsError> {
    let Some((weather, distance_km)) = nearest else {
        return Err(MatchStationsError::NoFiniteDistance {
            station: railway.short_code.clone(),
            latitude: railway.latitude,
            longitude: railway.longitude,
        });
    };
    debug!(
        "{} -> {} ({:.2} km)",
        railway.short_code, weather.name, distance_km
    );
    Ok(StationMatch {
        railway_station: railway.short_code.clone(),
        railway_location: railway.location(),
        weather_station: weather.name.clone(),
        weather_location: weather.location(),
        distance_km,
    })
}
