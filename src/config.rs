use serde::{Deserialize, Serialize};
use std::{fs, io, path::Path, path::PathBuf, time::Duration};
use thiserror::Error;

use crate::gateway::DEFAULT_BASE_URL;

pub const DEFAULT_MAX_TRACKED: usize = 3;
pub const MIN_TRACKING_INTERVAL_SECS: u64 = 30;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// What a tracking poll does when the agency cannot be reached.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PollFailurePolicy {
    /// A failed poll ends tracking, exactly like the tracked bus passing.
    #[default]
    End,
    /// A failed poll is skipped and the next tick tries again.
    Retry,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub max_tracked: usize,
    pub tracking_interval_secs: u64,
    /// Matches scoring below this are treated as misses. `None` accepts any
    /// best match.
    pub min_confidence: Option<f64>,
    pub poll_failure: PollFailurePolicy,
    pub shortcuts_path: PathBuf,
    pub base_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            max_tracked: DEFAULT_MAX_TRACKED,
            tracking_interval_secs: MIN_TRACKING_INTERVAL_SECS,
            min_confidence: None,
            poll_failure: PollFailurePolicy::default(),
            shortcuts_path: "savedroutes.json".into(),
            base_url: DEFAULT_BASE_URL.into(),
        }
    }
}

impl Config {
    /// Reads a JSON config file. Missing fields keep their defaults and the
    /// floors of [`Config::normalized`] are applied.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, self::Error> {
        let contents = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        Ok(config.normalized())
    }

    /// Clamps values to what the assistant supports: at least one tracked bus
    /// and no polling faster than every 30 seconds. Blank keys count as none.
    pub fn normalized(mut self) -> Self {
        self.max_tracked = self.max_tracked.max(1);
        self.tracking_interval_secs = self
            .tracking_interval_secs
            .max(MIN_TRACKING_INTERVAL_SECS);
        if self.api_key.as_deref().is_some_and(|key| key.trim().is_empty()) {
            self.api_key = None;
        }
        self
    }

    pub fn tracking_interval(&self) -> Duration {
        Duration::from_secs(self.tracking_interval_secs)
    }
}

#[test]
fn defaults() {
    let config = Config::default();
    assert_eq!(config.max_tracked, 3);
    assert_eq!(config.tracking_interval(), Duration::from_secs(30));
    assert_eq!(config.poll_failure, PollFailurePolicy::End);
    assert!(config.min_confidence.is_none());
}

#[test]
fn floors_are_enforced() {
    let config: Config =
        serde_json::from_str(r#"{"max_tracked":0,"tracking_interval_secs":5,"api_key":" "}"#)
            .unwrap();
    let config = config.normalized();
    assert_eq!(config.max_tracked, 1);
    assert_eq!(config.tracking_interval_secs, 30);
    assert!(config.api_key.is_none());
}

#[test]
fn partial_file_keeps_defaults() {
    let config: Config = serde_json::from_str(r#"{"poll_failure":"retry"}"#).unwrap();
    assert_eq!(config.poll_failure, PollFailurePolicy::Retry);
    assert_eq!(config.max_tracked, 3);
    assert_eq!(config.base_url, DEFAULT_BASE_URL);
}
