use serde::{Deserialize, Serialize};
use thiserror::Error;

mod mbta;
pub mod models;
pub use mbta::*;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Invalid request url: {0}")]
    Url(String),
    #[error("Server answered with status {0}")]
    Status(u16),
    #[error("Could not decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// One bus line as the assistant knows it.
///
/// `direction_names` and `direction_destinations` are index-paired.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RouteInfo {
    pub id: String,
    pub short_name: String,
    pub long_name: String,
    pub direction_names: Vec<String>,
    pub direction_destinations: Vec<String>,
}

impl RouteInfo {
    /// `(direction, destination)` pairs in direction index order.
    pub fn directions(&self) -> Vec<(&str, &str)> {
        self.direction_names
            .iter()
            .zip(self.direction_destinations.iter())
            .map(|(name, dest)| (name.as_str(), dest.as_str()))
            .collect()
    }

    pub fn direction(&self, index: usize) -> Option<(&str, &str)> {
        let name = self.direction_names.get(index)?;
        let dest = self.direction_destinations.get(index)?;
        Some((name, dest))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopRecord {
    pub id: String,
    pub name: String,
}

/// A forecasted visit of one trip to the selected stop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prediction {
    pub arrival_time: String,
    pub trip_id: String,
}

/// Read access to the transit agency.
///
/// Every call is blocking. An empty `Vec` is the "no data" answer and is
/// distinct from an `Err`, which means the agency could not be reached or
/// answered with something unreadable.
pub trait Gateway {
    /// Bus routes in the agency's display order.
    fn routes(&self) -> Result<Vec<RouteInfo>, self::Error>;

    /// Stops served by `route_id` when travelling in `direction`.
    fn stops(&self, route_id: &str, direction: usize) -> Result<Vec<StopRecord>, self::Error>;

    /// Predictions at `stop_id`, sorted by arrival time.
    fn predictions(
        &self,
        route_id: &str,
        direction: usize,
        stop_id: &str,
    ) -> Result<Vec<Prediction>, self::Error>;

    fn set_api_key(&mut self, _api_key: Option<String>) {}

    fn set_base_url(&mut self, _base_url: &str) {}
}
