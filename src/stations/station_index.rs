//! Spatial index over a weather station registry.
//!
//! Stations are projected onto the unit sphere before being stored in an
//! R-tree. Straight-line (chord) distance between projected points orders
//! stations exactly as great-circle distance does, so the R-tree's nearest
//! neighbour iteration visits candidates in great-circle order. The final
//! decision is always taken on the haversine distance, with the registry
//! order breaking ties, which keeps results identical to a linear scan.

use crate::types::location::{chord_2_for_distance, LatLon};
use crate::types::station::WeatherStation;
use ordered_float::OrderedFloat;
use rstar::{PointDistance, RTree, RTreeObject, AABB};

// Relative tolerance between chord and haversine rounding
const CHORD_SLACK: f64 = 1e-6;
const CHORD_FLOOR: f64 = 1e-24;

#[derive(Debug, Clone)]
struct IndexedStation {
    point: [f64; 3],
    /// Position in the registry the index was built from.
    order: usize,
    station: WeatherStation,
}

impl RTreeObject for IndexedStation {
    type Envelope = AABB<[f64; 3]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for IndexedStation {
    fn distance_2(&self, point: &[f64; 3]) -> f64 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        let dz = self.point[2] - point[2];
        dx * dx + dy * dy + dz * dz
    }
}

/// R-tree backed lookup of weather stations by position.
#[derive(Debug, Clone)]
pub struct WeatherStationIndex {
    rtree: RTree<IndexedStation>,
}

impl WeatherStationIndex {
    /// Builds the index. Stations with non-finite coordinates can never be the
    /// nearest station and are left out.
    pub fn new(stations: &[WeatherStation]) -> Self {
        let entries: Vec<IndexedStation> = stations
            .iter()
            .enumerate()
            .filter(|(_, station)| station.location().is_finite())
            .map(|(order, station)| IndexedStation {
                point: station.location().unit_vector(),
                order,
                station: station.clone(),
            })
            .collect();
        WeatherStationIndex {
            rtree: RTree::bulk_load(entries),
        }
    }

    pub fn len(&self) -> usize {
        self.rtree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.rtree.size() == 0
    }

    /// The weather station with the smallest great-circle distance to
    /// `location`, and that distance in kilometers.
    ///
    /// Among equidistant stations the one listed first in the registry wins.
    pub fn nearest(&self, location: LatLon) -> Option<(&WeatherStation, f64)> {
        if !location.is_finite() {
            return None;
        }
        let query = location.unit_vector();
        let mut best: Option<(&IndexedStation, f64)> = None;
        let mut window = f64::INFINITY;

        for entry in self.rtree.nearest_neighbor_iter(&query) {
            let chord_2 = entry.distance_2(&query);
            if chord_2 > window {
                break;
            }
            if window.is_infinite() {
                window = chord_2 * (1.0 + CHORD_SLACK) + CHORD_FLOOR;
            }
            let distance_km = location.distance_km(entry.station.location());
            best = match best {
                Some((current, current_km))
                    if current_km < distance_km
                        || (current_km == distance_km && current.order < entry.order) =>
                {
                    Some((current, current_km))
                }
                _ => Some((entry, distance_km)),
            };
        }

        best.map(|(entry, distance_km)| (&entry.station, distance_km))
    }

    /// Up to `limit` weather stations within `max_distance_km` of `location`,
    /// closest first.
    pub fn within_radius(
        &self,
        location: LatLon,
        max_distance_km: f64,
        limit: usize,
    ) -> Vec<(&WeatherStation, f64)> {
        if limit == 0 || !location.is_finite() || max_distance_km.is_nan() || max_distance_km < 0.0
        {
            return vec![];
        }
        let query = location.unit_vector();
        let max_chord_2 = chord_2_for_distance(max_distance_km) * (1.0 + CHORD_SLACK) + CHORD_FLOOR;

        let mut found: Vec<(&IndexedStation, f64)> = Vec::new();
        for entry in self.rtree.nearest_neighbor_iter(&query) {
            if entry.distance_2(&query) > max_chord_2 {
                break;
            }
            let distance_km = location.distance_km(entry.station.location());
            if distance_km <= max_distance_km {
                found.push((entry, distance_km));
            }
        }

        found.sort_by_key(|(entry, distance_km)| (OrderedFloat(*distance_km), entry.order));
        found.truncate(limit);
        found
            .into_iter()
            .map(|(entry, distance_km)| (&entry.station, distance_km))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> Vec<WeatherStation> {
        vec![
            WeatherStation::new("Helsinki Kumpula", LatLon(60.2033, 24.9611)),
            WeatherStation::new("Tampere Härmälä", LatLon(61.4656, 23.7467)),
            WeatherStation::new("Oulu lentoasema", LatLon(64.9301, 25.3546)),
            WeatherStation::new("Rovaniemi lentoasema", LatLon(66.5644, 25.8304)),
            WeatherStation::new("Broken", LatLon(f64::NAN, 25.0)),
        ]
    }

    #[test]
    fn test_nearest_finds_closest_station() {
        let index = WeatherStationIndex::new(&registry());
        assert_eq!(index.len(), 4);

        let (station, distance_km) = index.nearest(LatLon(60.1721, 24.9412)).unwrap();
        assert_eq!(station.name, "Helsinki Kumpula");
        let expected = LatLon(60.1721, 24.9412).distance_km(LatLon(60.2033, 24.9611));
        assert!((distance_km - expected).abs() < 1e-9);

        let (station, _) = index.nearest(LatLon(65.0121, 25.4651)).unwrap();
        assert_eq!(station.name, "Oulu lentoasema");
    }

    #[test]
    fn test_nearest_prefers_first_listed_on_tie() {
        let stations = vec![
            WeatherStation::new("East", LatLon(60.0, 24.1)),
            WeatherStation::new("West", LatLon(60.0, 23.9)),
            WeatherStation::new("East duplicate", LatLon(60.0, 24.1)),
        ];
        let index = WeatherStationIndex::new(&stations);
        let (station, _) = index.nearest(LatLon(60.0, 24.0)).unwrap();
        assert_eq!(station.name, "East");
        let (station, _) = index.nearest(LatLon(60.0, 24.15)).unwrap();
        assert_eq!(station.name, "East");
    }

    #[test]
    fn test_nearest_on_empty_or_invalid() {
        let index = WeatherStationIndex::new(&[]);
        assert!(index.is_empty());
        assert!(index.nearest(LatLon(60.0, 24.0)).is_none());

        let index = WeatherStationIndex::new(&registry());
        assert!(index.nearest(LatLon(f64::NAN, 24.0)).is_none());
    }

    #[test]
    fn test_within_radius_sorted_and_limited() {
        let index = WeatherStationIndex::new(&registry());
        let helsinki = LatLon(60.1721, 24.9412);

        let results = index.within_radius(helsinki, 200.0, 5);
        let names: Vec<&str> = results.iter().map(|(s, _)| s.name.as_str()).collect();
        assert_eq!(names, vec!["Helsinki Kumpula", "Tampere Härmälä"]);
        assert!(results[0].1 <= results[1].1);
        assert!(results.iter().all(|(_, d)| *d <= 200.0));

        assert_eq!(index.within_radius(helsinki, 2000.0, 3).len(), 3);
        assert!(index.within_radius(helsinki, 1.0, 5).is_empty());
        assert!(index.within_radius(helsinki, 2000.0, 0).is_empty());
    }
}
