use chrono::{DateTime, NaiveDateTime, Utc};
use chrono_tz::Tz;

/// Timezone the transit agency publishes predictions in.
pub const SERVICE_TIMEZONE: Tz = chrono_tz::America::New_York;

/// Current wall-clock time in the service region, offset stripped.
pub fn service_now() -> NaiveDateTime {
    Utc::now().with_timezone(&SERVICE_TIMEZONE).naive_local()
}

/// Parses an API timestamp such as `2024-03-01T17:42:10-05:00` and keeps only
/// the local wall-clock fields.
pub fn parse_arrival(value: &str) -> Option<NaiveDateTime> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|time| time.naive_local())
}

/// Time left until a predicted arrival, floored to whole seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Wait(u32);

impl From<u32> for Wait {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl Wait {
    /// `None` unless `arrival` is strictly later than `now`.
    pub fn between(now: NaiveDateTime, arrival: NaiveDateTime) -> Option<Self> {
        let seconds = (arrival - now).num_seconds();
        if arrival <= now {
            None
        } else {
            Some(Self(u32::try_from(seconds).unwrap_or(u32::MAX)))
        }
    }

    pub const fn from_seconds(secs: u32) -> Self {
        Self(secs)
    }

    pub const fn as_seconds(&self) -> u32 {
        self.0
    }

    pub const fn hours(&self) -> u32 {
        self.0 / 3600
    }

    /// Minutes past the whole hours.
    pub const fn minutes(&self) -> u32 {
        (self.0 % 3600) / 60
    }
}

#[cfg(test)]
fn at(hms: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(&format!("2024-03-01T{hms}"), "%Y-%m-%dT%H:%M:%S").unwrap()
}

#[test]
fn parse_strips_offset() {
    let parsed = parse_arrival("2024-03-01T17:42:10-05:00").unwrap();
    assert_eq!(parsed, at("17:42:10"));
}

#[test]
fn parse_rejects_garbage() {
    assert!(parse_arrival("17:42").is_none());
}

#[test]
fn wait_hours_and_minutes() {
    let wait = Wait::between(at("12:00:00"), at("13:05:30")).unwrap();
    assert_eq!(wait.hours(), 1);
    assert_eq!(wait.minutes(), 5);
}

#[test]
fn wait_floors_seconds() {
    let wait = Wait::between(at("12:00:00"), at("12:01:30")).unwrap();
    assert_eq!(wait.hours(), 0);
    assert_eq!(wait.minutes(), 1);
}

#[test]
fn wait_requires_future() {
    assert!(Wait::between(at("12:00:00"), at("12:00:00")).is_none());
    assert!(Wait::between(at("12:00:00"), at("11:59:00")).is_none());
}
