pub mod into_utc_trait;
pub mod location;
pub mod month;
pub mod observation;
pub mod station;
pub mod timetable;
