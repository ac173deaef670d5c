use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::config::GeocoderConfig;
use crate::database::models::Location;

use super::geo::GeoPoint;

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("Geocoder is not configured")]
    NotConfigured,

    #[error("Geocoder request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Geocoder returned an unexpected response: {0}")]
    Response(String),
}

/// One resolved address
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodedAddress {
    pub point: GeoPoint,
    pub formatted_address: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zipcode: Option<String>,
    pub country: Option<String>,
}

impl GeocodedAddress {
    pub fn into_location(self) -> Location {
        Location {
            kind: "Point".to_string(),
            coordinates: [self.point.longitude, self.point.latitude],
            formatted_address: self.formatted_address,
            street: self.street,
            city: self.city,
            state: self.state,
            zipcode: self.zipcode,
            country: self.country,
        }
    }
}

/// Resolves free-form addresses and postal codes to coordinates
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Best match for `query`, or `None` when nothing matched
    async fn geocode(&self, query: &str) -> Result<Option<GeocodedAddress>, GeocodeError>;
}

/// MapQuest geocoding v1 client
pub struct MapQuestGeocoder {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl MapQuestGeocoder {
    pub fn new(config: &GeocoderConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();
        Self { client, api_key: config.api_key.clone(), base_url: config.base_url.clone() }
    }
}

#[derive(Debug, Deserialize)]
struct MapQuestResponse {
    #[serde(default)]
    results: Vec<MapQuestResult>,
}

#[derive(Debug, Deserialize)]
struct MapQuestResult {
    #[serde(default)]
    locations: Vec<MapQuestLocation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MapQuestLocation {
    #[serde(default)]
    street: Option<String>,
    #[serde(default)]
    admin_area5: Option<String>,
    #[serde(default)]
    admin_area3: Option<String>,
    #[serde(default)]
    admin_area1: Option<String>,
    #[serde(default)]
    postal_code: Option<String>,
    lat_lng: MapQuestLatLng,
}

#[derive(Debug, Deserialize)]
struct MapQuestLatLng {
    lat: f64,
    lng: f64,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

impl MapQuestLocation {
    fn into_address(self) -> GeocodedAddress {
        let street = non_empty(self.street);
        let city = non_empty(self.admin_area5);
        let state = non_empty(self.admin_area3);
        let zipcode = non_empty(self.postal_code);
        let country = non_empty(self.admin_area1);

        let parts: Vec<&str> = [&street, &city, &state, &zipcode, &country]
            .into_iter()
            .filter_map(|p| p.as_deref())
            .collect();
        let formatted_address = (!parts.is_empty()).then(|| parts.join(", "));

        GeocodedAddress {
            point: GeoPoint::new(self.lat_lng.lng, self.lat_lng.lat),
            formatted_address,
            street,
            city,
            state,
            zipcode,
            country,
        }
    }
}

fn first_match(body: MapQuestResponse) -> Option<GeocodedAddress> {
    body.results
        .into_iter()
        .flat_map(|r| r.locations)
        .next()
        .map(MapQuestLocation::into_address)
}

#[async_trait]
impl Geocoder for MapQuestGeocoder {
    async fn geocode(&self, query: &str) -> Result<Option<GeocodedAddress>, GeocodeError> {
        let key = self.api_key.as_deref().ok_or(GeocodeError::NotConfigured)?;

        let response = self
            .client
            .get(&self.base_url)
            .query(&[("key", key), ("location", query)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(GeocodeError::Response(format!("status {}", response.status())));
        }

        let body: MapQuestResponse = response.json().await?;
        let found = first_match(body);
        debug!(query, found = found.is_some(), "geocoded");
        Ok(found)
    }
}
