// handlers/bootcamps/radius.rs - GET /api/v1/bootcamps/radius/:zipcode/:distance

use axum::extract::{Path, State};

use crate::database::Document;
use crate::error::ApiError;
use crate::middleware::ListResponse;
use crate::state::AppState;

/// Bootcamps within `distance` (configured unit) of the zipcode's centre
pub async fn get(
    State(state): State<AppState>,
    Path((zipcode, distance)): Path<(String, String)>,
) -> Result<ListResponse<Document>, ApiError> {
    let distance = parse_distance(&distance)?;

    let center = state
        .geocoder
        .geocode(&zipcode)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("No location found for zipcode {}", zipcode)))?
        .point;

    let radians = state.config.geocoder.distance_unit.angular_radius(distance);
    let bootcamps = state.store.bootcamps_within(center, radians).await?;
    tracing::debug!(%zipcode, distance, radians, found = bootcamps.len(), "radius lookup");

    Ok(ListResponse::new(bootcamps))
}

fn parse_distance(raw: &str) -> Result<f64, ApiError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|d| d.is_finite() && *d >= 0.0)
        .ok_or_else(|| ApiError::bad_request(format!("Invalid distance '{}'", raw)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_must_be_a_non_negative_number() {
        assert_eq!(parse_distance("10").unwrap(), 10.0);
        assert_eq!(parse_distance("2.5").unwrap(), 2.5);
        assert!(parse_distance("-1").is_err());
        assert!(parse_distance("ten").is_err());
        assert!(parse_distance("inf").is_err());
    }
}
