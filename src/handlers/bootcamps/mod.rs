pub mod collection;
pub mod photo;
pub mod radius;
pub mod record;

pub use collection::get as bootcamps_get;
pub use collection::post as bootcamps_post;
pub use photo::put as photo_put;
pub use radius::get as radius_get;
pub use record::delete as bootcamp_delete;
pub use record::get as bootcamp_get;
pub use record::put as bootcamp_put;

use tracing::warn;

use crate::database::models::Location;
use crate::error::ApiError;
use crate::services::{GeocodeError, Geocoder};

/// Geocode a bootcamp address. A missing geocoder key or no match stores no location.
pub(crate) async fn locate(geocoder: &dyn Geocoder, address: &str) -> Result<Option<Location>, ApiError> {
    match geocoder.geocode(address).await {
        Ok(found) => Ok(found.map(|a| a.into_location())),
        Err(GeocodeError::NotConfigured) => {
            warn!("Geocoder not configured; saving bootcamp without location");
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}
