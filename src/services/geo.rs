use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub longitude: f64,
    pub latitude: f64,
}

impl GeoPoint {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self { longitude, latitude }
    }

    /// Read `coordinates: [lng, lat]` from a stored location object
    pub fn from_location(location: &Value) -> Option<Self> {
        let coords = location.get("coordinates")?.as_array()?;
        match coords.as_slice() {
            [lng, lat] => Some(Self::new(lng.as_f64()?, lat.as_f64()?)),
            _ => None,
        }
    }

    /// Great-circle angle to `other`, in radians (haversine)
    pub fn angular_distance(&self, other: &GeoPoint) -> f64 {
        let (lat1, lat2) = (self.latitude.to_radians(), other.latitude.to_radians());
        let dlat = lat2 - lat1;
        let dlng = (other.longitude - self.longitude).to_radians();
        let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
        2.0 * h.sqrt().min(1.0).asin()
    }
}

/// Unit callers state radius distances in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DistanceUnit {
    Kilometers,
    Miles,
}

impl DistanceUnit {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "km" | "kilometers" | "kilometres" => Some(DistanceUnit::Kilometers),
            "mi" | "miles" => Some(DistanceUnit::Miles),
            _ => None,
        }
    }

    pub fn earth_radius(&self) -> f64 {
        match self {
            DistanceUnit::Kilometers => 6378.0,
            DistanceUnit::Miles => 3963.0,
        }
    }

    /// Distance on the surface to angular radius
    pub fn angular_radius(&self, distance: f64) -> f64 {
        distance / self.earth_radius()
    }
}
