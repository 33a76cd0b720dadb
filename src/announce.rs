use chrono::NaiveDateTime;
use serde::Serialize;
use std::fmt;
use tracing::warn;

use crate::{
    dialog::Dialog,
    host::Host,
    shared::time::{Wait, parse_arrival},
};

/// Spoken form of one predicted arrival.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Arrival {
    /// One hour or more, less than two minutes over the hour.
    Hours { hours: u32 },
    HoursMinutes { hours: u32, minutes: u32 },
    Minutes { minutes: u32 },
    OneMinute,
    Now,
}

impl From<Wait> for Arrival {
    fn from(wait: Wait) -> Self {
        let hours = wait.hours();
        let minutes = wait.minutes();
        if hours > 0 {
            if minutes < 2 {
                Arrival::Hours { hours }
            } else {
                Arrival::HoursMinutes { hours, minutes }
            }
        } else if minutes > 1 {
            Arrival::Minutes { minutes }
        } else if minutes == 1 {
            Arrival::OneMinute
        } else {
            Arrival::Now
        }
    }
}

impl fmt::Display for Arrival {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arrival::Hours { hours: 1 } => write!(f, "one hour"),
            Arrival::Hours { hours } => write!(f, "{hours} hours"),
            Arrival::HoursMinutes { hours: 1, minutes } => {
                write!(f, "one hour and {minutes} minutes")
            }
            Arrival::HoursMinutes { hours, minutes } => {
                write!(f, "{hours} hours and {minutes} minutes")
            }
            Arrival::Minutes { minutes } => write!(f, "{minutes} minutes"),
            Arrival::OneMinute => write!(f, "one minute"),
            Arrival::Now => write!(f, "arriving now"),
        }
    }
}

/// Spoken buckets for every timestamp strictly later than `now`, in input order.
///
/// Timestamps keep only their local wall-clock fields, `now` must be the
/// service region's local time. Unreadable timestamps are skipped.
pub fn arrivals<S: AsRef<str>>(timestamps: &[S], now: NaiveDateTime) -> Vec<Arrival> {
    timestamps
        .iter()
        .filter_map(|timestamp| {
            let parsed = parse_arrival(timestamp.as_ref());
            if parsed.is_none() {
                warn!("Skipping unreadable arrival time {:?}", timestamp.as_ref());
            }
            parsed
        })
        .filter_map(|arrival| Wait::between(now, arrival))
        .map(Arrival::from)
        .collect()
}

/// Speaks the arrivals at `stop` one line at a time and returns how many were
/// still in the future. Nothing at all is said when none are.
pub fn announce<H, S>(host: &mut H, stop: &str, timestamps: &[S], now: NaiveDateTime) -> usize
where
    H: Host + ?Sized,
    S: AsRef<str>,
{
    let upcoming = arrivals(timestamps, now);
    if upcoming.is_empty() {
        return 0;
    }

    // A tracking poll may fire while an earlier announcement is still playing
    host.wait_while_speaking();
    host.speak(Dialog::ArrivalPrefix {
        stop: stop.to_string(),
    });
    for arrival in upcoming.iter() {
        host.wait_while_speaking();
        host.speak(Dialog::Arrival(*arrival));
    }
    upcoming.len()
}

#[cfg(test)]
fn at(hms: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(&format!("2024-03-01T{hms}"), "%Y-%m-%dT%H:%M:%S").unwrap()
}

#[test]
fn ninety_seconds_is_one_minute() {
    let result = arrivals(&["2024-03-01T12:01:30-05:00"], at("12:00:00"));
    assert_eq!(result, vec![Arrival::OneMinute]);
}

#[test]
fn buckets() {
    let now = at("12:00:00");
    let result = arrivals(
        &[
            "2024-03-01T12:00:40-05:00",
            "2024-03-01T12:07:00-05:00",
            "2024-03-01T13:01:59-05:00",
            "2024-03-01T14:25:00-05:00",
        ],
        now,
    );
    assert_eq!(
        result,
        vec![
            Arrival::Now,
            Arrival::Minutes { minutes: 7 },
            Arrival::Hours { hours: 1 },
            Arrival::HoursMinutes {
                hours: 2,
                minutes: 25
            },
        ]
    );
}

#[test]
fn past_and_present_are_dropped() {
    let result = arrivals(
        &[
            "2024-03-01T11:58:00-05:00",
            "2024-03-01T12:00:00-05:00",
            "2024-03-01T12:05:00-05:00",
        ],
        at("12:00:00"),
    );
    assert_eq!(result, vec![Arrival::Minutes { minutes: 5 }]);
}

#[test]
fn offset_is_ignored() {
    // Same wall clock, different offset: compared as local time
    let result = arrivals(&["2024-03-01T12:10:00-04:00"], at("12:00:00"));
    assert_eq!(result, vec![Arrival::Minutes { minutes: 10 }]);
}

#[test]
fn renders_singular_hour() {
    assert_eq!(Arrival::Hours { hours: 1 }.to_string(), "one hour");
    assert_eq!(
        Arrival::HoursMinutes {
            hours: 1,
            minutes: 5
        }
        .to_string(),
        "one hour and 5 minutes"
    );
}
