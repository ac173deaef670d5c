pub mod advanced_results;
pub mod cascade;
pub mod geo;
pub mod geocoder;
pub mod rating;
pub mod storage;

pub use advanced_results::{advanced_results, AdvancedResults, Populate, QueryError};
pub use geo::{DistanceUnit, GeoPoint};
pub use geocoder::{GeocodeError, GeocodedAddress, Geocoder, MapQuestGeocoder};
pub use rating::refresh_average_rating;
pub use storage::{FileStorage, LocalFileStorage, StorageError};
