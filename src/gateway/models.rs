//! Wire shapes of the MBTA v3 JSON:API responses. Only the attributes the
//! assistant reads are modelled; everything else is ignored.

use serde::{Deserialize, Serialize};

use crate::gateway::{Prediction, RouteInfo, StopRecord};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Document<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ApiRoute {
    pub id: String,
    pub attributes: ApiRouteAttributes,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ApiRouteAttributes {
    #[serde(default)]
    pub short_name: String,
    #[serde(default)]
    pub long_name: String,
    #[serde(default)]
    pub direction_names: Vec<Option<String>>,
    #[serde(default)]
    pub direction_destinations: Vec<Option<String>>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ApiStop {
    pub id: String,
    pub attributes: ApiStopAttributes,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ApiStopAttributes {
    pub name: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ApiPrediction {
    pub attributes: ApiPredictionAttributes,
    pub relationships: ApiPredictionRelationships,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ApiPredictionAttributes {
    pub arrival_time: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ApiPredictionRelationships {
    pub trip: ApiRelationship,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ApiRelationship {
    pub data: Option<ApiReference>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ApiReference {
    pub id: String,
}

impl From<ApiRoute> for RouteInfo {
    fn from(value: ApiRoute) -> Self {
        let mut direction_names: Vec<String> = value
            .attributes
            .direction_names
            .into_iter()
            .map(Option::unwrap_or_default)
            .collect();
        let mut direction_destinations: Vec<String> = value
            .attributes
            .direction_destinations
            .into_iter()
            .map(Option::unwrap_or_default)
            .collect();
        // Names and destinations are index-paired
        let len = direction_names.len().min(direction_destinations.len());
        direction_names.truncate(len);
        direction_destinations.truncate(len);

        Self {
            id: value.id,
            short_name: value.attributes.short_name,
            long_name: value.attributes.long_name,
            direction_names,
            direction_destinations,
        }
    }
}

impl From<ApiStop> for StopRecord {
    fn from(value: ApiStop) -> Self {
        Self {
            id: value.id,
            name: value.attributes.name,
        }
    }
}

impl ApiPrediction {
    /// Rows without an arrival time (first stop of a trip) or without a trip
    /// reference carry nothing to announce.
    pub fn into_prediction(self) -> Option<Prediction> {
        let arrival_time = self.attributes.arrival_time?;
        let trip_id = self.relationships.trip.data?.id;
        Some(Prediction {
            arrival_time,
            trip_id,
        })
    }
}

#[test]
fn route_directions_are_paired() {
    let json = r#"{"data":[{"id":"1","attributes":{"short_name":"1","long_name":"Harvard - Nubian",
        "direction_names":["Outbound","Inbound"],"direction_destinations":["Nubian",null,"Extra"]}}]}"#;
    let doc: Document<ApiRoute> = serde_json::from_str(json).unwrap();
    let route: RouteInfo = doc.data.into_iter().next().unwrap().into();
    assert_eq!(route.direction_names, vec!["Outbound", "Inbound"]);
    assert_eq!(route.direction_destinations, vec!["Nubian", ""]);
}

#[test]
fn prediction_without_arrival_is_dropped() {
    let json = r#"{"data":[
        {"attributes":{"arrival_time":null},"relationships":{"trip":{"data":{"id":"t1"}}}},
        {"attributes":{"arrival_time":"2024-03-01T17:42:10-05:00"},"relationships":{"trip":{"data":{"id":"t2"}}}}
    ]}"#;
    let doc: Document<ApiPrediction> = serde_json::from_str(json).unwrap();
    let predictions: Vec<_> = doc
        .data
        .into_iter()
        .filter_map(ApiPrediction::into_prediction)
        .collect();
    assert_eq!(predictions.len(), 1);
    assert_eq!(predictions[0].trip_id, "t2");
}

#[test]
fn missing_data_is_empty() {
    let doc: Document<ApiStop> = serde_json::from_str("{}").unwrap();
    assert!(doc.data.is_empty());
}
