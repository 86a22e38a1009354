use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, ParseResult, TimeZone, Utc};

/// Format of scheduled and actual times in the railway feed,
/// e.g. `2024-01-01T04:57:00.000Z`.
pub const SCHEDULED_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.fZ";

const NAIVE_DATETIME_FORMATS: [&str; 3] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Anything that can be resolved to a UTC timestamp for an observation.
///
/// Naive values are taken to be UTC already.
pub trait IntoUtcTimestamp {
    fn into_utc_timestamp(self) -> Option<DateTime<Utc>>;
}

impl IntoUtcTimestamp for NaiveDateTime {
    fn into_utc_timestamp(self) -> Option<DateTime<Utc>> {
        Some(Utc.from_utc_datetime(&self))
    }
}

impl IntoUtcTimestamp for DateTime<Utc> {
    fn into_utc_timestamp(self) -> Option<DateTime<Utc>> {
        Some(self)
    }
}

impl IntoUtcTimestamp for DateTime<Local> {
    fn into_utc_timestamp(self) -> Option<DateTime<Utc>> {
        Some(self.with_timezone(&Utc))
    }
}

impl IntoUtcTimestamp for DateTime<FixedOffset> {
    fn into_utc_timestamp(self) -> Option<DateTime<Utc>> {
        Some(self.with_timezone(&Utc))
    }
}

impl IntoUtcTimestamp for NaiveDate {
    fn into_utc_timestamp(self) -> Option<DateTime<Utc>> {
        self.and_hms_opt(0, 0, 0)?.into_utc_timestamp()
    }
}

impl IntoUtcTimestamp for &str {
    fn into_utc_timestamp(self) -> Option<DateTime<Utc>> {
        let s = self.trim();
        // Try full UTC parse
        if let Ok(dt) = s.parse::<DateTime<Utc>>() {
            return Some(dt);
        }
        // Try fixed offset (e.g., +02:00)
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return dt.into_utc_timestamp();
        }
        // Try naive datetime
        for format in NAIVE_DATETIME_FORMATS {
            if let Ok(naive_dt) = NaiveDateTime::parse_from_str(s, format) {
                return naive_dt.into_utc_timestamp();
            }
        }
        // Try naive date
        if let Ok(naive_date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            return naive_date.into_utc_timestamp();
        }
        None
    }
}

impl IntoUtcTimestamp for String {
    fn into_utc_timestamp(self) -> Option<DateTime<Utc>> {
        self.as_str().into_utc_timestamp()
    }
}

impl IntoUtcTimestamp for &String {
    fn into_utc_timestamp(self) -> Option<DateTime<Utc>> {
        self.as_str().into_utc_timestamp()
    }
}

/// Parses a stop's scheduled time in the railway feed format
/// ([`SCHEDULED_TIME_FORMAT`]); the fractional seconds are optional.
pub fn parse_scheduled_time(value: &str) -> ParseResult<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(value, SCHEDULED_TIME_FORMAT).map(|dt| Utc.from_utc_datetime(&dt))
}
