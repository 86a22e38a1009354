pub mod error;
pub mod station_index;
pub mod station_matcher;
