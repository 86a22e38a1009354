pub mod error;
pub mod joiner;
pub mod observation_index;
pub mod report;
