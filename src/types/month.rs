use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use std::fmt;
use std::fmt::{Display, Formatter};

/// A calendar month, `Month(year, month)`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Ord, PartialOrd, Hash)]
pub struct Month(pub i32, pub u32);

impl Month {
    pub fn year(self) -> i32 {
        self.0
    }

    pub fn month(self) -> u32 {
        self.1
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self(date.year(), date.month())
    }

    /// First and last instant of the month in UTC, or `None` for an invalid month.
    pub fn utc_bounds(self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let first = NaiveDate::from_ymd_opt(self.0, self.1, 1)?;
        let last = first + Duration::days(i64::from(days_in_month(self.0, self.1)?) - 1);
        Some((
            first.and_hms_opt(0, 0, 0)?.and_utc(),
            last.and_hms_micro_opt(23, 59, 59, 999_999)?.and_utc(),
        ))
    }
}

impl Display for Month {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.0, self.1)
    }
}

pub(crate) fn days_in_month(year: i32, month: u32) -> Option<u32> {
    if !(1..=12).contains(&month) {
        return None;
    }
    let (next_month_year, next_month) = if month == 12 {
        (year.checked_add(1)?, 1)
    } else {
        (year, month + 1)
    };
    let first_day_of_next_month = NaiveDate::from_ymd_opt(next_month_year, next_month, 1)?;
    let last_day_of_current_month = first_day_of_next_month - Duration::days(1);
    Some(last_day_of_current_month.day())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2024, 2), Some(29));
        assert_eq!(days_in_month(2023, 2), Some(28));
        assert_eq!(days_in_month(2024, 12), Some(31));
        assert_eq!(days_in_month(2024, 13), None);
    }

    #[test]
    fn test_utc_bounds_and_display() {
        let (start, end) = Month(2024, 2).utc_bounds().unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap());
        assert_eq!(end.date_naive(), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert_eq!(Month(2024, 2).to_string(), "2024-02");
        assert!(Month(2024, 0).utc_bounds().is_none());
    }
}
