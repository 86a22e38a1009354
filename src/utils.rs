use crate::io::error::LoadError;
use log::info;
use std::path::{Path, PathBuf};

const CACHE_DIR_NAME: &str = "rail_weather_cache";

pub fn get_cache_dir() -> Result<PathBuf, LoadError> {
    dirs::cache_dir()
        .ok_or(LoadError::CacheDirResolution)
        .map(|p| p.join(CACHE_DIR_NAME))
}

pub fn ensure_cache_dir_exists(path: &Path) -> Result<(), LoadError> {
    if path.is_dir() {
        return Ok(());
    }
    info!("Creating cache directory: {}", path.display());
    std::fs::create_dir_all(path).map_err(|e| LoadError::CacheDirCreation(path.to_path_buf(), e))
}
