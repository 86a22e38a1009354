use std::fmt;
use thiserror::Error;

/// Which of the two station registries a failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registry {
    Railway,
    Weather,
}

impl fmt::Display for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Registry::Railway => write!(f, "railway"),
            Registry::Weather => write!(f, "weather"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatchStationsError {
    #[error("The {0} station registry is empty")]
    EmptyInput(Registry),

    // Every candidate distance was NaN, e.g. because of missing coordinates
    #[error("No weather station at a finite distance from railway station '{station}' ({latitude}, {longitude})")]
    NoFiniteDistance {
        station: String,
        latitude: f64,
        longitude: f64,
    },
}
