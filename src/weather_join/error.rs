use chrono::Duration;
use std::fmt;
use thiserror::Error;

/// Why a timetable stop was left without weather.
///
/// None of these abort a join; they are collected into the
/// [`JoinReport`](crate::JoinReport) next to the stop they concern.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StopIssue {
    #[error("Railway station '{station}' has no matching weather station")]
    UnmatchedStation { station: String },

    #[error("No weather observations for weather station '{weather_station}' (matched to '{station}')")]
    NoObservations {
        station: String,
        weather_station: String,
    },

    #[error("Failed to parse scheduled time '{value}'")]
    Format {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error(
        "Closest observation of '{weather_station}' is {} minutes from the scheduled time",
        .gap.num_minutes()
    )]
    StaleObservation {
        weather_station: String,
        gap: Duration,
    },
}

impl StopIssue {
    pub fn kind(&self) -> IssueKind {
        match self {
            StopIssue::UnmatchedStation { .. } => IssueKind::UnmatchedStation,
            StopIssue::NoObservations { .. } => IssueKind::NoObservations,
            StopIssue::Format { .. } => IssueKind::Format,
            StopIssue::StaleObservation { .. } => IssueKind::StaleObservation,
        }
    }
}

/// Field-less discriminant of [`StopIssue`], used for counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IssueKind {
    UnmatchedStation,
    NoObservations,
    Format,
    StaleObservation,
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            IssueKind::UnmatchedStation => "no station match",
            IssueKind::NoObservations => "no weather data for station",
            IssueKind::Format => "unparseable scheduled time",
            IssueKind::StaleObservation => "observation too far in time",
        };
        f.write_str(label)
    }
}
