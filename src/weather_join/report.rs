use crate::weather_join::error::{IssueKind, StopIssue};
use chrono::NaiveDate;
use log::{info, warn};
use std::collections::BTreeMap;
use std::fmt;

/// A stop that was left without weather, and why.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinDiagnostic {
    pub train_number: u32,
    pub departure_date: NaiveDate,
    /// Position of the stop within its train's timetable.
    pub stop_index: usize,
    pub station_code: String,
    pub issue: StopIssue,
}

impl fmt::Display for JoinDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "train {} on {}, stop {} ({}): {}",
            self.train_number, self.departure_date, self.stop_index, self.station_code, self.issue
        )
    }
}

/// Outcome of joining weather onto a batch of train runs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JoinReport {
    pub total_stops: usize,
    /// Stops that received an observation.
    pub enriched_stops: usize,
    /// One entry per stop that did not, in timetable order.
    pub diagnostics: Vec<JoinDiagnostic>,
}

impl JoinReport {
    /// Stops left with an empty weather mapping.
    pub fn missing_stops(&self) -> usize {
        self.total_stops - self.enriched_stops
    }

    pub fn is_complete(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn count(&self, kind: IssueKind) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.issue.kind() == kind)
            .count()
    }

    pub fn counts_by_kind(&self) -> BTreeMap<IssueKind, usize> {
        let mut counts = BTreeMap::new();
        for diagnostic in &self.diagnostics {
            *counts.entry(diagnostic.issue.kind()).or_insert(0) += 1;
        }
        counts
    }

    pub fn diagnostics_of(&self, kind: IssueKind) -> impl Iterator<Item = &JoinDiagnostic> {
        self.diagnostics
            .iter()
            .filter(move |d| d.issue.kind() == kind)
    }

    /// Folds the report of another batch into this one.
    pub fn merge(&mut self, other: JoinReport) {
        self.total_stops += other.total_stops;
        self.enriched_stops += other.enriched_stops;
        self.diagnostics.extend(other.diagnostics);
    }

    /// e.g. `3 of 120 stops had no weather match (no station match: 2, no weather data for station: 1)`
    pub fn summary(&self) -> String {
        let mut summary = format!(
            "{} of {} stops had no weather match",
            self.missing_stops(),
            self.total_stops
        );
        let counts = self.counts_by_kind();
        if !counts.is_empty() {
            let parts: Vec<String> = counts
                .iter()
                .map(|(kind, count)| format!("{kind}: {count}"))
                .collect();
            summary.push_str(&format!(" ({})", parts.join(", ")));
        }
        summary
    }

    pub(crate) fn log_summary(&self) {
        if self.is_complete() {
            info!("{}", self.summary());
        } else {
            warn!("{}", self.summary());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diagnostic(stop_index: usize, issue: StopIssue) -> JoinDiagnostic {
        JoinDiagnostic {
            train_number: 1,
            departure_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            stop_index,
            station_code: "HKI".to_string(),
            issue,
        }
    }

    #[test]
    fn test_summary_and_counts() {
        let report = JoinReport {
            total_stops: 10,
            enriched_stops: 7,
            diagnostics: vec![
                diagnostic(
                    0,
                    StopIssue::UnmatchedStation {
                        station: "XXX".to_string(),
                    },
                ),
                diagnostic(
                    3,
                    StopIssue::NoObservations {
                        station: "HKI".to_string(),
                        weather_station: "Kumpula".to_string(),
                    },
                ),
                diagnostic(
                    5,
                    StopIssue::UnmatchedStation {
                        station: "YYY".to_string(),
                    },
                ),
            ],
        };
        assert_eq!(report.missing_stops(), 3);
        assert!(!report.is_complete());
        assert_eq!(report.count(IssueKind::UnmatchedStation), 2);
        assert_eq!(report.count(IssueKind::Format), 0);
        assert_eq!(
            report.summary(),
            "3 of 10 stops had no weather match (no station match: 2, no weather data for station: 1)"
        );
        let stops: Vec<usize> = report
            .diagnostics_of(IssueKind::UnmatchedStation)
            .map(|d| d.stop_index)
            .collect();
        assert_eq!(stops, vec![0, 5]);
    }

    #[test]
    fn test_merge_and_display() {
        let mut report = JoinReport {
            total_stops: 2,
            enriched_stops: 2,
            diagnostics: vec![],
        };
        assert_eq!(report.summary(), "0 of 2 stops had no weather match");

        report.merge(JoinReport {
            total_stops: 1,
            enriched_stops: 0,
            diagnostics: vec![diagnostic(
                0,
                StopIssue::UnmatchedStation {
                    station: "XXX".to_string(),
                },
            )],
        });
        assert_eq!(report.total_stops, 3);
        assert_eq!(report.missing_stops(), 1);
        assert_eq!(
            report.diagnostics[0].to_string(),
            "train 1 on 2024-01-01, stop 0 (HKI): Railway station 'XXX' has no matching weather station"
        );
    }
}
