use std::{collections::HashMap, time::Instant};
use tracing::{debug, info};

mod selection;
pub use selection::*;

use crate::{
    gateway::{self, Gateway, RouteInfo, StopRecord},
    shared::fuzzy,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectionMatch {
    pub index: usize,
    pub name: String,
    pub destination: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopMatch {
    pub id: String,
    /// Display name exactly as the agency publishes it.
    pub name: String,
}

/// Turns spoken route, direction and stop names into agency identifiers.
///
/// The bus route table is fetched on first use and kept for the lifetime of
/// the resolver. Stops are fetched again on every call since the candidate
/// set depends on the direction.
#[derive(Debug, Clone, Default)]
pub struct Resolver {
    routes: Option<HashMap<String, RouteInfo>>,
    min_confidence: Option<f64>,
}

impl Resolver {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_min_confidence(mut self, min_confidence: Option<f64>) -> Self {
        self.min_confidence = min_confidence;
        self
    }

    pub fn set_min_confidence(&mut self, min_confidence: Option<f64>) {
        self.min_confidence = min_confidence;
    }

    /// Drops the cached route table, the next lookup fetches it again.
    pub fn invalidate_routes(&mut self) {
        self.routes = None;
    }

    fn load_routes<G: Gateway>(
        &mut self,
        gateway: &G,
    ) -> Result<&HashMap<String, RouteInfo>, gateway::Error> {
        if self.routes.is_none() {
            debug!("Loading routes...");
            let now = Instant::now();
            let routes: HashMap<String, RouteInfo> = gateway
                .routes()?
                .into_iter()
                .map(|route| (route.short_name.clone(), route))
                .collect();
            info!("Loaded {} bus routes in {:?}", routes.len(), now.elapsed());
            self.routes = Some(routes);
        }
        Ok(&*self.routes.get_or_insert_default())
    }

    /// Exact lookup of the normalized route name. `Ok(None)` when no bus
    /// route carries that short name.
    pub fn resolve_route<G: Gateway>(
        &mut self,
        gateway: &G,
        raw: &str,
    ) -> Result<Option<RouteInfo>, gateway::Error> {
        let key = normalize_route_name(raw);
        let route = self.load_routes(gateway)?.get(&key).cloned();
        debug!("Route {raw:?} normalized to {key:?}, found: {}", route.is_some());
        Ok(route)
    }

    /// Fuzzy match against "direction destination" of each direction of `route`.
    pub fn resolve_direction(&self, raw: &str, route: &RouteInfo) -> Option<DirectionMatch> {
        let candidates: Vec<String> = route
            .directions()
            .into_iter()
            .map(|(name, dest)| format!("{name} {dest}"))
            .collect();
        let best = self.accept(fuzzy::match_one(raw, &candidates))?;
        let (name, destination) = route.direction(best.index)?;
        debug!(
            "Direction {raw:?} matched {:?} ({:.2})",
            candidates[best.index], best.score
        );
        Some(DirectionMatch {
            index: best.index,
            name: name.to_string(),
            destination: destination.to_string(),
        })
    }

    /// Fetches the stops of `route` in `direction` and fuzzy matches `raw`
    /// against their normalized names. `Ok(None)` when the route has no stops
    /// in that direction or the best match is below the confidence cutoff.
    pub fn resolve_stop<G: Gateway>(
        &self,
        gateway: &G,
        raw: &str,
        route: &RouteInfo,
        direction: usize,
    ) -> Result<Option<StopMatch>, gateway::Error> {
        let candidates = stop_candidates(gateway.stops(&route.id, direction)?);
        let keys: Vec<&str> = candidates.iter().map(|(key, _)| key.as_str()).collect();
        let Some(best) = self.accept(fuzzy::match_one(raw, &keys)) else {
            return Ok(None);
        };
        let (key, stop) = &candidates[best.index];
        debug!("Stop {raw:?} matched {key:?} ({:.2})", best.score);
        Ok(Some(StopMatch {
            id: stop.id.clone(),
            name: stop.name.clone(),
        }))
    }

    fn accept(&self, best: Option<fuzzy::Match>) -> Option<fuzzy::Match> {
        let best = best?;
        match self.min_confidence {
            Some(min) if best.score < min => {
                debug!("Best match scored {:.2}, below {min:.2}", best.score);
                None
            }
            _ => Some(best),
        }
    }
}

/// Maps a spoken route name onto the agency's short name.
///
/// Whitespace is dropped, "crosstown" and "silverline" become the `CT` and
/// `SL` prefixes, "to" and "for" (speech recognition artifacts for 2 and 4)
/// become digits and the result is uppercased. None of the replaced words can
/// survive or reappear in the output, so applying it twice changes nothing.
pub fn normalize_route_name(raw: &str) -> String {
    let compact: String = raw.to_lowercase().split_whitespace().collect();
    compact
        .replace("crosstown", "ct")
        .replace("silverline", "sl")
        .replace("to", "2")
        .replace("for", "4")
        .to_uppercase()
}

/// Spells out abbreviations so stop names look like what people say.
pub fn format_stop_name(name: &str) -> String {
    name.split(' ')
        .map(|token| match token {
            "St" => "Street",
            "opp" => "opposite",
            other => other,
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Normalized, lowercased key per stop. When two stops share a key the later
/// one replaces the earlier in its place.
fn stop_candidates(stops: Vec<StopRecord>) -> Vec<(String, StopRecord)> {
    let mut candidates: Vec<(String, StopRecord)> = Vec::with_capacity(stops.len());
    for stop in stops {
        let key = format_stop_name(&stop.name).to_lowercase();
        match candidates.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, earlier)) => *earlier = stop,
            None => candidates.push((key, stop)),
        }
    }
    candidates
}

#[test]
fn normalize_prefixes() {
    assert_eq!(normalize_route_name("crosstown 2"), "CT2");
    assert_eq!(normalize_route_name("silver line 4"), "SL4");
    assert_eq!(normalize_route_name("silverline for"), "SL4");
}

#[test]
fn normalize_speech_artifacts() {
    assert_eq!(normalize_route_name("to"), "2");
    assert_eq!(normalize_route_name("for"), "4");
    assert_eq!(normalize_route_name("34 e"), "34E");
}

#[test]
fn normalize_is_idempotent() {
    for raw in ["crosstown to", "SL4", "silver line 5", "34e", "t o", "silverl ine", " 111 "] {
        let once = normalize_route_name(raw);
        assert_eq!(normalize_route_name(&once), once);
        assert_eq!(once.to_uppercase(), once);
    }
}

#[test]
fn stop_names_are_expanded() {
    assert_eq!(
        format_stop_name("Washington St opp Ruggles St"),
        "Washington Street opposite Ruggles Street"
    );
    assert_eq!(format_stop_name("Main St @ Elm"), "Main Street @ Elm");
    assert_eq!(format_stop_name("Stuart St"), "Stuart Street");
}

#[test]
fn duplicate_stop_names_keep_last() {
    let stops = vec![
        StopRecord {
            id: "1".into(),
            name: "Main St".into(),
        },
        StopRecord {
            id: "2".into(),
            name: "Elm St".into(),
        },
        StopRecord {
            id: "3".into(),
            name: "Main Street".into(),
        },
    ];
    let candidates = stop_candidates(stops);
    let ids: Vec<_> = candidates
        .iter()
        .map(|(key, stop)| (key.as_str(), stop.id.as_str()))
        .collect();
    assert_eq!(ids, vec![("main street", "3"), ("elm street", "2")]);
}
