use std::collections::BTreeSet;

use tracing::info;
use uuid::Uuid;

use crate::database::schema::{document_id, parse_id, Collection, FieldValue, BOOTCAMP_REF, OWNER};
use crate::database::{Store, StoreError};
use crate::filter::{Condition, ListQuery};

use super::rating::refresh_average_rating;

/// Records removed along with a bootcamp
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BootcampRemoval {
    pub courses: u64,
    pub reviews: u64,
}

/// Records removed along with a user
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct UserRemoval {
    pub bootcamps: u64,
    pub courses: u64,
    pub reviews: u64,
}

/// Delete a bootcamp with its courses and reviews
pub async fn delete_bootcamp(store: &dyn Store, id: Uuid) -> Result<BootcampRemoval, StoreError> {
    let children = [Condition::eq(&BOOTCAMP_REF, FieldValue::Uuid(id))];
    let courses = store.delete_many(Collection::Course, &children).await?;
    let reviews = store.delete_many(Collection::Review, &children).await?;
    store.delete(Collection::Bootcamp, id).await?;
    Ok(BootcampRemoval { courses, reviews })
}

/// Delete a user and everything they own.
///
/// Owned bootcamps go with all of their courses and reviews. Reviews the user
/// left on other bootcamps are removed and those bootcamps re-rated.
pub async fn delete_user(store: &dyn Store, id: Uuid) -> Result<UserRemoval, StoreError> {
    let owned = Condition::eq(&OWNER, FieldValue::Uuid(id));
    let mut removal = UserRemoval::default();

    let bootcamps = store.find(Collection::Bootcamp, &ListQuery::new().filter(owned.clone())).await?;
    for bootcamp_id in bootcamps.iter().filter_map(document_id) {
        let children = delete_bootcamp(store, bootcamp_id).await?;
        removal.bootcamps += 1;
        removal.courses += children.courses;
        removal.reviews += children.reviews;
    }

    let reviews = store
        .find(Collection::Review, &ListQuery::new().filter(owned.clone()).select(vec![&BOOTCAMP_REF]))
        .await?;
    let reviewed: BTreeSet<Uuid> = reviews
        .iter()
        .filter_map(|r| r.get(BOOTCAMP_REF.name).and_then(|v| v.as_str()))
        .filter_map(|s| parse_id(s).ok())
        .collect();

    let conditions = [owned];
    removal.reviews += store.delete_many(Collection::Review, &conditions).await?;
    removal.courses += store.delete_many(Collection::Course, &conditions).await?;
    for bootcamp_id in reviewed {
        refresh_average_rating(store, bootcamp_id).await?;
    }

    store.delete(Collection::User, id).await?;
    info!(user = %id, bootcamps = removal.bootcamps, courses = removal.courses, reviews = removal.reviews, "user deleted");
    Ok(removal)
}
