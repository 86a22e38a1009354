//! On-disk cache of the station match table.
//!
//! The table is stored together with the two registries it was computed
//! from, so a cached table is only reused while both registries are
//! unchanged.

use crate::error::RailWeatherError;
use crate::io::error::LoadError;
use crate::stations::station_matcher::{match_stations_with, MatchStrategy};
use crate::types::station::{RailwayStation, StationMatchTable, WeatherStation};
use crate::utils::{ensure_cache_dir_exists, get_cache_dir};
use bincode::config::{Configuration, Fixint, LittleEndian};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const BINCODE_CACHE_FILE_NAME: &str = "station_matches.bin";
const BINCODE_CONFIG: Configuration<LittleEndian, Fixint> =
    bincode::config::standard().with_fixed_int_encoding();

#[derive(Serialize)]
struct CacheEntryRef<'a> {
    railway_stations: &'a [RailwayStation],
    weather_stations: &'a [WeatherStation],
    matches: &'a StationMatchTable,
}

#[derive(Deserialize)]
struct CacheEntry {
    railway_stations: Vec<RailwayStation>,
    weather_stations: Vec<WeatherStation>,
    matches: StationMatchTable,
}

#[derive(Debug, Clone)]
pub struct MatchTableCache {
    cache_file: PathBuf,
}

impl MatchTableCache {
    /// Uses `cache_dir`, creating it if needed.
    pub fn new(cache_dir: &Path) -> Result<Self, LoadError> {
        ensure_cache_dir_exists(cache_dir)?;
        Ok(Self {
            cache_file: cache_dir.join(BINCODE_CACHE_FILE_NAME),
        })
    }

    /// Uses the platform cache directory, e.g. `~/.cache/rail_weather_cache`
    /// on Linux.
    pub fn in_default_location() -> Result<Self, LoadError> {
        Self::new(&get_cache_dir()?)
    }

    pub fn path(&self) -> &Path {
        &self.cache_file
    }

    /// The cached table, if there is one and it was computed from exactly
    /// these registries.
    pub fn load(
        &self,
        railway_stations: &[RailwayStation],
        weather_stations: &[WeatherStation],
    ) -> Result<Option<StationMatchTable>, LoadError> {
        if !self.cache_file.exists() {
            debug!("No cached match table at {}", self.cache_file.display());
            return Ok(None);
        }
        let bytes = std::fs::read(&self.cache_file)
            .map_err(|e| LoadError::Read(self.cache_file.clone(), e))?;
        let (entry, _) = bincode::serde::decode_from_slice::<CacheEntry, _>(&bytes, BINCODE_CONFIG)
            .map_err(|e| LoadError::CacheDecode(self.cache_file.clone(), Box::from(e)))?;

        if entry.railway_stations != railway_stations || entry.weather_stations != weather_stations {
            info!(
                "Cached match table at {} was built from different registries, ignoring it",
                self.cache_file.display()
            );
            return Ok(None);
        }
        Ok(Some(entry.matches))
    }

    pub fn store(
        &self,
        railway_stations: &[RailwayStation],
        weather_stations: &[WeatherStation],
        matches: &StationMatchTable,
    ) -> Result<(), LoadError> {
        let entry = CacheEntryRef {
            railway_stations,
            weather_stations,
            matches,
        };
        let bincode_data = bincode::serde::encode_to_vec(&entry, BINCODE_CONFIG)
            .map_err(|e| LoadError::CacheEncode(Box::new(e)))?;
        std::fs::write(&self.cache_file, &bincode_data)
            .map_err(|e| LoadError::Write(self.cache_file.clone(), e))?;
        info!(
            "Wrote match table cache ({} bytes) to {}",
            bincode_data.len(),
            self.cache_file.display()
        );
        Ok(())
    }

    /// Returns the cached table for these registries, or matches them and
    /// caches the result. An unreadable cache file is recomputed and replaced.
    pub fn load_or_match(
        &self,
        railway_stations: &[RailwayStation],
        weather_stations: &[WeatherStation],
        strategy: MatchStrategy,
    ) -> Result<StationMatchTable, RailWeatherError> {
        match self.load(railway_stations, weather_stations) {
            Ok(Some(table)) => {
                info!("Using cached match table from {}", self.cache_file.display());
                return Ok(table);
            }
            Ok(None) => {}
            Err(e) => warn!("Ignoring unreadable match table cache: {e}"),
        }
        let table = match_stations_with(railway_stations, weather_stations, strategy)?;
        self.store(railway_stations, weather_stations, &table)?;
        Ok(table)
    }

    pub fn clear(&self) -> Result<(), LoadError> {
        if self.cache_file.exists() {
            std::fs::remove_file(&self.cache_file)
                .map_err(|e| LoadError::Write(self.cache_file.clone(), e))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::location::LatLon;

    fn registries() -> (Vec<RailwayStation>, Vec<WeatherStation>) {
        (
            vec![
                RailwayStation::new("HKI", "Helsinki asema", LatLon(60.1721, 24.9412)),
                RailwayStation::new("OL", "Oulu asema", LatLon(65.0121, 25.4837)),
            ],
            vec![
                WeatherStation::new("Helsinki Kaisaniemi", LatLon(60.1751, 24.9441)),
                WeatherStation::new("Oulu lentoasema", LatLon(64.9301, 25.3546)),
            ],
        )
    }

    #[test]
    fn test_store_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let cache = MatchTableCache::new(&dir.path().join("nested")).unwrap();
        let (railway, weather) = registries();
        assert_eq!(cache.load(&railway, &weather).unwrap(), None);

        let table = cache
            .load_or_match(&railway, &weather, MatchStrategy::Exhaustive)
            .unwrap();
        assert!(cache.path().exists());

        let cached = cache.load(&railway, &weather).unwrap().unwrap();
        assert_eq!(cached, table);
        assert_eq!(cached.get("OL").unwrap().weather_station, "Oulu lentoasema");
    }

    #[test]
    fn test_changed_registry_invalidates_cache() {
        let dir = tempfile::tempdir().unwrap();
        let cache = MatchTableCache::new(dir.path()).unwrap();
        let (railway, mut weather) = registries();
        cache
            .load_or_match(&railway, &weather, MatchStrategy::Exhaustive)
            .unwrap();

        weather.push(WeatherStation::new("Oulu Vihreäsaari", LatLon(65.0064, 25.3930)));
        assert_eq!(cache.load(&railway, &weather).unwrap(), None);
        let table = cache
            .load_or_match(&railway, &weather, MatchStrategy::Indexed)
            .unwrap();
        assert_eq!(table.get("OL").unwrap().weather_station, "Oulu Vihreäsaari");
    }

    #[test]
    fn test_corrupt_cache_is_recomputed() {
        let dir = tempfile::tempdir().unwrap();
        let cache = MatchTableCache::new(dir.path()).unwrap();
        std::fs::write(cache.path(), b"not bincode").unwrap();
        let (railway, weather) = registries();

        assert!(matches!(
            cache.load(&railway, &weather),
            Err(LoadError::CacheDecode(..))
        ));
        let table = cache
            .load_or_match(&railway, &weather, MatchStrategy::Exhaustive)
            .unwrap();
        assert_eq!(table.len(), 2);
        cache.clear().unwrap();
        assert!(!cache.path().exists());
    }
}
