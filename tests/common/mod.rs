#![allow(dead_code)]

use bustrack::{
    dialog::Dialog,
    gateway::{self, Gateway, Prediction, RouteInfo, StopRecord},
    host::Host,
};
use chrono::NaiveDateTime;
use std::{
    cell::{Cell, RefCell},
    collections::{HashMap, VecDeque},
    path::PathBuf,
    time::Duration,
};

/// In-memory agency. Prediction answers are queued and handed out one per
/// call; an empty queue answers with no predictions.
#[derive(Default)]
pub struct FakeGateway {
    pub routes: Vec<RouteInfo>,
    pub stops: HashMap<(String, usize), Vec<StopRecord>>,
    pub predictions: RefCell<VecDeque<Option<Vec<Prediction>>>>,
    pub fail_routes: Cell<bool>,
    pub fail_stops: Cell<bool>,
    pub route_calls: Cell<usize>,
    pub stop_calls: Cell<usize>,
    pub prediction_calls: Cell<usize>,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
}

impl FakeGateway {
    pub fn new() -> Self {
        let mut stops = HashMap::new();
        stops.insert(
            ("39".to_string(), 0),
            vec![
                stop("20", "Back Bay Station"),
                stop("21", "Huntington Ave @ Ruggles St"),
                stop("22", "South St @ Forest Hills"),
            ],
        );
        stops.insert(
            ("39".to_string(), 1),
            vec![
                stop("10", "Centre St opp Forest Hills"),
                stop("11", "Huntington Ave @ Longwood Ave"),
                stop("12", "Copley Sq"),
            ],
        );
        Self {
            routes: vec![route_39(), route_ct2(), route_70a()],
            stops,
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        let gateway = Self::new();
        gateway.fail_routes.set(true);
        gateway
    }

    /// Queues the answer of the next prediction call.
    pub fn answer(&self, predictions: Vec<Prediction>) {
        self.predictions.borrow_mut().push_back(Some(predictions));
    }

    /// Queues a failed prediction call.
    pub fn answer_error(&self) {
        self.predictions.borrow_mut().push_back(None);
    }
}

impl Gateway for FakeGateway {
    fn routes(&self) -> Result<Vec<RouteInfo>, gateway::Error> {
        self.route_calls.set(self.route_calls.get() + 1);
        if self.fail_routes.get() {
            return Err(gateway::Error::Status(503));
        }
        Ok(self.routes.clone())
    }

    fn stops(&self, route_id: &str, direction: usize) -> Result<Vec<StopRecord>, gateway::Error> {
        self.stop_calls.set(self.stop_calls.get() + 1);
        if self.fail_stops.get() {
            return Err(gateway::Error::Status(503));
        }
        Ok(self
            .stops
            .get(&(route_id.to_string(), direction))
            .cloned()
            .unwrap_or_default())
    }

    fn predictions(
        &self,
        _route_id: &str,
        _direction: usize,
        _stop_id: &str,
    ) -> Result<Vec<Prediction>, gateway::Error> {
        self.prediction_calls.set(self.prediction_calls.get() + 1);
        match self.predictions.borrow_mut().pop_front() {
            Some(Some(predictions)) => Ok(predictions),
            Some(None) => Err(gateway::Error::Status(500)),
            None => Ok(Vec::new()),
        }
    }

    fn set_api_key(&mut self, api_key: Option<String>) {
        self.api_key = api_key;
    }

    fn set_base_url(&mut self, base_url: &str) {
        self.base_url = Some(base_url.to_string());
    }
}

/// Host that remembers everything it was asked to do.
#[derive(Default)]
pub struct RecordingHost {
    pub spoken: Vec<Dialog>,
    pub scheduled: HashMap<String, Duration>,
    pub cancelled: Vec<String>,
    pub vocabulary: Vec<(String, String)>,
    pub waits: usize,
}

impl RecordingHost {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn take_spoken(&mut self) -> Vec<Dialog> {
        std::mem::take(&mut self.spoken)
    }
}

impl Host for RecordingHost {
    fn speak(&mut self, dialog: Dialog) {
        self.spoken.push(dialog);
    }

    fn wait_while_speaking(&mut self) {
        self.waits += 1;
    }

    fn schedule_repeating(&mut self, name: &str, interval: Duration) {
        self.scheduled.insert(name.to_string(), interval);
    }

    fn cancel_scheduled(&mut self, name: &str) {
        if self.scheduled.remove(name).is_some() {
            self.cancelled.push(name.to_string());
        }
    }

    fn register_vocabulary(&mut self, term: &str, kind: &str) {
        self.vocabulary.push((term.to_string(), kind.to_string()));
    }
}

pub fn route_39() -> RouteInfo {
    RouteInfo {
        id: "39".into(),
        short_name: "39".into(),
        long_name: "Forest Hills - Back Bay Station".into(),
        direction_names: vec!["Outbound".into(), "Inbound".into()],
        direction_destinations: vec!["Forest Hills".into(), "Back Bay Station".into()],
    }
}

pub fn route_ct2() -> RouteInfo {
    RouteInfo {
        id: "747".into(),
        short_name: "CT2".into(),
        long_name: "Sullivan Square - Ruggles".into(),
        direction_names: vec!["Outbound".into(), "Inbound".into()],
        direction_destinations: vec!["Ruggles".into(), "Sullivan Square".into()],
    }
}

/// Runs in one direction only.
pub fn route_70a() -> RouteInfo {
    RouteInfo {
        id: "70A".into(),
        short_name: "70A".into(),
        long_name: "North Waltham - University Park".into(),
        direction_names: vec!["Outbound".into()],
        direction_destinations: vec!["North Waltham".into()],
    }
}

pub fn stop(id: &str, name: &str) -> StopRecord {
    StopRecord {
        id: id.into(),
        name: name.into(),
    }
}

/// Prediction for `trip` at `hms` on the day of [`noon`].
pub fn prediction(trip: &str, hms: &str) -> Prediction {
    Prediction {
        arrival_time: format!("2024-03-01T{hms}-05:00"),
        trip_id: trip.into(),
    }
}

pub fn noon() -> NaiveDateTime {
    NaiveDateTime::parse_from_str("2024-03-01T12:00:00", "%Y-%m-%dT%H:%M:%S").unwrap()
}

/// Fresh path under the system temp dir, removed if it already exists.
pub fn temp_file(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "bustrack-{}-{}.json",
        name,
        std::process::id()
    ));
    let _ = std::fs::remove_file(&path);
    path
}
