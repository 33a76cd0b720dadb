use tracing::{debug, info, warn};

use crate::{
    config::{DEFAULT_MAX_TRACKED, PollFailurePolicy},
    gateway::{self, Gateway, Prediction},
    resolver::Target,
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TrackerState {
    #[default]
    Idle,
    /// A single arrivals query is in flight.
    OneShot,
    /// Following buses up to and including `boundary_trip`.
    Tracking { boundary_trip: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Start {
    /// Nothing is scheduled at the stop, tracking did not start.
    NoBuses,
    /// Arrival times of the tracked buses, earliest first.
    Tracking(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Poll {
    /// Arrival times of every bus due up to and including the boundary trip.
    Due(Vec<String>),
    /// The feed could not be read and the failure policy says to try again.
    Skipped,
    /// The boundary trip is gone from the feed. Tracking is over.
    Finished,
}

/// Arrival queries and the poll-based tracking of a bounded set of buses.
///
/// Tracking commits to the first `max_tracked` buses when it starts and ends
/// once the last of them, the boundary trip, no longer shows up in the feed.
#[derive(Debug, Clone)]
pub struct Tracker {
    state: TrackerState,
    max_tracked: usize,
    poll_failure: PollFailurePolicy,
}

impl Default for Tracker {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_TRACKED)
    }
}

impl Tracker {
    pub fn new(max_tracked: usize) -> Self {
        Self {
            state: TrackerState::Idle,
            max_tracked: max_tracked.max(1),
            poll_failure: PollFailurePolicy::default(),
        }
    }

    pub fn with_poll_failure(mut self, poll_failure: PollFailurePolicy) -> Self {
        self.poll_failure = poll_failure;
        self
    }

    /// Applies new limits. A running tracking session keeps its boundary trip.
    pub fn configure(&mut self, max_tracked: usize, poll_failure: PollFailurePolicy) {
        self.max_tracked = max_tracked.max(1);
        self.poll_failure = poll_failure;
    }

    pub fn state(&self) -> &TrackerState {
        &self.state
    }

    pub fn is_tracking(&self) -> bool {
        matches!(self.state, TrackerState::Tracking { .. })
    }

    pub fn boundary_trip(&self) -> Option<&str> {
        match &self.state {
            TrackerState::Tracking { boundary_trip } => Some(boundary_trip),
            _ => None,
        }
    }

    /// Every predicted arrival time at the target, no tracking.
    pub fn arrivals<G: Gateway>(
        &mut self,
        gateway: &G,
        target: Target<'_>,
    ) -> Result<Vec<String>, gateway::Error> {
        self.state = TrackerState::OneShot;
        let predictions = fetch(gateway, target);
        self.state = TrackerState::Idle;
        Ok(arrival_times(&predictions?))
    }

    /// Fetches predictions and, if any, commits to following the first
    /// `max_tracked` of them.
    pub fn start<G: Gateway>(
        &mut self,
        gateway: &G,
        target: Target<'_>,
    ) -> Result<Start, gateway::Error> {
        self.state = TrackerState::Idle;
        let predictions = fetch(gateway, target)?;
        if predictions.is_empty() {
            return Ok(Start::NoBuses);
        }

        let tracked = predictions.len().min(self.max_tracked);
        let boundary_trip = predictions[tracked - 1].trip_id.clone();
        info!("Tracking {tracked} buses, last one is trip {boundary_trip}");
        self.state = TrackerState::Tracking { boundary_trip };
        Ok(Start::Tracking(arrival_times(&predictions[..tracked])))
    }

    /// One tracking tick. Anything but [`Poll::Due`] or [`Poll::Skipped`]
    /// leaves the tracker idle.
    pub fn poll<G: Gateway>(&mut self, gateway: &G, target: Target<'_>) -> Poll {
        let Some(boundary_trip) = self.boundary_trip().map(str::to_string) else {
            return Poll::Finished;
        };

        let predictions = match fetch(gateway, target) {
            Ok(predictions) => predictions,
            Err(err) if self.poll_failure == PollFailurePolicy::Retry => {
                warn!("Tracking poll failed, retrying next tick: {err}");
                return Poll::Skipped;
            }
            Err(err) => {
                warn!("Tracking poll failed, ending tracking: {err}");
                Vec::new()
            }
        };

        match predictions
            .iter()
            .position(|prediction| prediction.trip_id == boundary_trip)
        {
            Some(index) => {
                debug!("Trip {boundary_trip} is number {} in line", index + 1);
                Poll::Due(arrival_times(&predictions[..=index]))
            }
            None => {
                info!("Trip {boundary_trip} has passed, tracking finished");
                self.stop();
                Poll::Finished
            }
        }
    }

    pub fn stop(&mut self) {
        self.state = TrackerState::Idle;
    }
}

fn fetch<G: Gateway>(gateway: &G, target: Target<'_>) -> Result<Vec<Prediction>, gateway::Error> {
    gateway.predictions(target.route_id, target.direction, target.stop_id)
}

fn arrival_times(predictions: &[Prediction]) -> Vec<String> {
    predictions
        .iter()
        .map(|prediction| prediction.arrival_time.clone())
        .collect()
}
