use crate::io::error::LoadError;
use crate::stations::error::MatchStationsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RailWeatherError {
    #[error(transparent)]
    MatchStations(#[from] MatchStationsError),

    #[error(transparent)]
    Load(#[from] LoadError),
}
