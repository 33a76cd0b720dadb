use reqwest::{Url, blocking::Client};
use serde::de::DeserializeOwned;
use std::time::Instant;
use tracing::{debug, error};

use crate::gateway::{
    self, Gateway, Prediction, RouteInfo, StopRecord,
    models::{ApiPrediction, ApiRoute, ApiStop, Document},
};

pub const DEFAULT_BASE_URL: &str = "https://api-v3.mbta.com";

/// Route type of buses in the GTFS route type enumeration.
const BUS_ROUTE_TYPE: &str = "3";

/// Blocking client for the MBTA v3 API.
pub struct MbtaGateway {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl MbtaGateway {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            api_key,
        }
    }

    /// Endpoint URL with the credential, when set, ahead of `args`.
    fn url(&self, end_point: &str, args: &[(&str, &str)]) -> Result<Url, gateway::Error> {
        let mut params: Vec<(&str, &str)> = Vec::with_capacity(args.len() + 1);
        if let Some(api_key) = &self.api_key {
            params.push(("api_key", api_key.as_str()));
        }
        params.extend_from_slice(args);

        let base = format!("{}/{}", self.base_url.trim_end_matches('/'), end_point);
        debug!("GET {base} {args:?}");
        Url::parse_with_params(&base, &params).map_err(|err| gateway::Error::Url(err.to_string()))
    }

    fn routes_url(&self) -> Result<Url, gateway::Error> {
        self.url(
            "routes",
            &[("filter[type]", BUS_ROUTE_TYPE), ("sort", "sort_order")],
        )
    }

    fn stops_url(&self, route_id: &str, direction: usize) -> Result<Url, gateway::Error> {
        let direction = direction.to_string();
        self.url(
            "stops",
            &[
                ("filter[direction_id]", direction.as_str()),
                ("filter[route]", route_id),
            ],
        )
    }

    fn predictions_url(
        &self,
        route_id: &str,
        direction: usize,
        stop_id: &str,
    ) -> Result<Url, gateway::Error> {
        let direction = direction.to_string();
        self.url(
            "predictions",
            &[
                ("filter[direction_id]", direction.as_str()),
                ("filter[route]", route_id),
                ("filter[stop]", stop_id),
                ("sort", "arrival_time,direction_id"),
            ],
        )
    }

    fn get<T>(&self, end_point: &str, url: Url) -> Result<Vec<T>, gateway::Error>
    where
        T: DeserializeOwned,
    {
        let now = Instant::now();
        let response = self.client.get(url).send().map_err(|err| {
            error!("Failed to fetch {end_point}: {err}");
            err
        })?;
        if !response.status().is_success() {
            error!("Fetching {end_point} answered {}", response.status());
            return Err(gateway::Error::Status(response.status().as_u16()));
        }
        let body = response.text()?;
        let document: Document<T> = serde_json::from_str(&body).map_err(|err| {
            error!("Failed to decode {end_point}: {err}");
            err
        })?;
        debug!(
            "Fetching {end_point} returned {} rows in {:?}",
            document.data.len(),
            now.elapsed()
        );
        Ok(document.data)
    }
}

impl Gateway for MbtaGateway {
    fn routes(&self) -> Result<Vec<RouteInfo>, gateway::Error> {
        let routes: Vec<ApiRoute> = self.get("routes", self.routes_url()?)?;
        Ok(routes.into_iter().map(RouteInfo::from).collect())
    }

    fn stops(&self, route_id: &str, direction: usize) -> Result<Vec<StopRecord>, gateway::Error> {
        let stops: Vec<ApiStop> = self.get("stops", self.stops_url(route_id, direction)?)?;
        Ok(stops.into_iter().map(StopRecord::from).collect())
    }

    fn predictions(
        &self,
        route_id: &str,
        direction: usize,
        stop_id: &str,
    ) -> Result<Vec<Prediction>, gateway::Error> {
        let url = self.predictions_url(route_id, direction, stop_id)?;
        let predictions: Vec<ApiPrediction> = self.get("predictions", url)?;
        Ok(predictions
            .into_iter()
            .filter_map(ApiPrediction::into_prediction)
            .collect())
    }

    fn set_api_key(&mut self, api_key: Option<String>) {
        self.api_key = api_key;
    }

    fn set_base_url(&mut self, base_url: &str) {
        self.base_url = base_url.to_string();
    }
}

#[cfg(test)]
fn query(url: &Url) -> Vec<(String, String)> {
    url.query_pairs()
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect()
}

#[cfg(test)]
fn pairs(expected: &[(&str, &str)]) -> Vec<(String, String)> {
    expected
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

#[test]
fn routes_query_filters_buses() {
    let gateway = MbtaGateway::new(DEFAULT_BASE_URL, None);
    let url = gateway.routes_url().unwrap();
    assert_eq!(url.path(), "/routes");
    assert_eq!(
        query(&url),
        pairs(&[("filter[type]", "3"), ("sort", "sort_order")])
    );
}

#[test]
fn stops_query_carries_api_key() {
    let gateway = MbtaGateway::new("https://example.test/v3/", Some("secret".into()));
    let url = gateway.stops_url("39", 1).unwrap();
    assert_eq!(url.path(), "/v3/stops");
    assert_eq!(
        query(&url),
        pairs(&[
            ("api_key", "secret"),
            ("filter[direction_id]", "1"),
            ("filter[route]", "39"),
        ])
    );
}

#[test]
fn predictions_query_sorts_by_arrival() {
    let gateway = MbtaGateway::new(DEFAULT_BASE_URL, None);
    let url = gateway.predictions_url("39", 0, "1939").unwrap();
    assert_eq!(url.path(), "/predictions");
    assert_eq!(
        query(&url),
        pairs(&[
            ("filter[direction_id]", "0"),
            ("filter[route]", "39"),
            ("filter[stop]", "1939"),
            ("sort", "arrival_time,direction_id"),
        ])
    );
}

#[test]
fn unparsable_base_url() {
    let mbta = MbtaGateway::new("not a url", None);
    assert!(matches!(mbta.routes_url(), Err(gateway::Error::Url(_))));
}
