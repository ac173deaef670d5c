use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::database::schema::{bootcamp, review, Collection, Document, FieldValue, BOOTCAMP_REF};
use crate::database::{Store, StoreError};
use crate::filter::Condition;

/// Recompute a bootcamp's `averageRating` from its reviews and persist it.
/// With no reviews left the rating becomes null.
pub async fn refresh_average_rating(store: &dyn Store, bootcamp_id: Uuid) -> Result<Option<f64>, StoreError> {
    let conditions = [Condition::eq(&BOOTCAMP_REF, FieldValue::Uuid(bootcamp_id))];
    let average = store.average(Collection::Review, &review::RATING, &conditions).await?;

    let mut changes = Document::new();
    changes.insert(
        bootcamp::AVERAGE_RATING.name.to_string(),
        average.map(Value::from).unwrap_or(Value::Null),
    );
    store.update(Collection::Bootcamp, bootcamp_id, changes).await?;

    debug!(%bootcamp_id, ?average, "refreshed average rating");
    Ok(average)
}
