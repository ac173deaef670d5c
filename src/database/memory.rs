use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::filter::{CompareOp, Condition, ListQuery, Predicate, SortDirection, SortKey};
use crate::services::geo::GeoPoint;

use super::schema::{bootcamp, document_id, typed_fields, Collection, Document, FieldDef, FieldValue, ID, OWNER};
use super::store::{Store, StoreError};

/// In-process document store with the same query semantics as Postgres.
/// Used when no `DATABASE_URL` is configured and throughout the tests.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<Collection, Vec<Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn value_of(doc: &Document, field: &FieldDef) -> FieldValue {
    doc.get(field.name)
        .and_then(|v| FieldValue::from_json(field.kind, v).ok())
        .unwrap_or(FieldValue::Null(field.kind))
}

fn matches(doc: &Document, condition: &Condition) -> bool {
    let actual = value_of(doc, condition.field);

    if let FieldValue::TextList(items) = &actual {
        return match &condition.predicate {
            Predicate::Compare(CompareOp::Eq, FieldValue::Text(wanted)) => items.contains(wanted),
            Predicate::In(values) => values
                .iter()
                .any(|v| matches!(v, FieldValue::Text(s) if items.contains(s))),
            _ => false,
        };
    }

    match &condition.predicate {
        Predicate::Compare(CompareOp::Eq, expected) if expected.is_null() => actual.is_null(),
        // Missing values never satisfy a comparison, as with SQL NULL
        _ if actual.is_null() => false,
        Predicate::Compare(op, expected) => actual
            .compare(expected)
            .map(|ordering| op.matches(ordering))
            .unwrap_or(false),
        Predicate::In(values) => values
            .iter()
            .any(|v| actual.compare(v) == Some(Ordering::Equal)),
    }
}

fn matches_all(doc: &Document, conditions: &[Condition]) -> bool {
    conditions.iter().all(|c| matches(doc, c))
}

fn compare_docs(a: &Document, b: &Document, keys: &[SortKey]) -> Ordering {
    for key in keys {
        let ordering = value_of(a, key.field)
            .compare(&value_of(b, key.field))
            .unwrap_or(Ordering::Equal);
        let ordering = match key.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

fn project(doc: &Document, select: Option<&Vec<&'static FieldDef>>) -> Document {
    match select {
        Some(fields) if !fields.is_empty() => fields
            .iter()
            .map(|f| (f.name.to_string(), doc.get(f.name).cloned().unwrap_or(Value::Null)))
            .collect(),
        _ => doc.clone(),
    }
}

fn normalize(collection: Collection, doc: Document) -> Result<Document, StoreError> {
    Ok(typed_fields(collection, &doc)?
        .into_iter()
        .map(|(field, value)| (field.name.to_string(), value.to_json()))
        .collect())
}

fn check_unique(collection: Collection, existing: &[Document], candidate: &Document) -> Result<(), StoreError> {
    let candidate_id = document_id(candidate);
    for key in collection.unique_keys() {
        let values: Vec<FieldValue> = key.iter().map(|f| value_of(candidate, f)).collect();
        if values.iter().any(FieldValue::is_null) {
            continue;
        }
        let clash = existing.iter().any(|doc| {
            document_id(doc) != candidate_id
                && key.iter().zip(&values).all(|(f, v)| value_of(doc, f) == *v)
        });
        if clash {
            return Err(StoreError::Duplicate {
                collection: collection.label(),
                fields: key.iter().map(|f| f.name).collect::<Vec<_>>().join(", "),
            });
        }
    }
    Ok(())
}

fn prepare_insert(collection: Collection, doc: Document) -> Result<Document, StoreError> {
    let doc = normalize(collection, doc)?;
    if document_id(&doc).is_none() {
        return Err(StoreError::InvalidValue {
            field: ID.name.to_string(),
            message: "documents must carry an id".to_string(),
        });
    }
    Ok(doc)
}

fn insert(collection: Collection, docs: &mut Vec<Document>, doc: Document) -> Result<Document, StoreError> {
    check_unique(collection, docs, &doc)?;
    if docs.iter().any(|d| document_id(d) == document_id(&doc)) {
        return Err(StoreError::Duplicate { collection: collection.label(), fields: ID.name.to_string() });
    }
    docs.push(doc.clone());
    Ok(doc)
}

#[async_trait]
impl Store for MemoryStore {
    async fn find(&self, collection: Collection, query: &ListQuery) -> Result<Vec<Document>, StoreError> {
        let collections = self.collections.read().await;
        let mut rows: Vec<&Document> = collections
            .get(&collection)
            .map(|docs| docs.iter().filter(|d| matches_all(d, &query.conditions)).collect())
            .unwrap_or_default();
        rows.sort_by(|a, b| compare_docs(a, b, &query.sort));

        let skip = usize::try_from(query.skip).unwrap_or(usize::MAX);
        let limit = query.limit.and_then(|l| usize::try_from(l).ok()).unwrap_or(usize::MAX);
        Ok(rows
            .into_iter()
            .skip(skip)
            .take(limit)
            .map(|d| project(d, query.select.as_ref()))
            .collect())
    }

    async fn count(&self, collection: Collection, conditions: &[Condition]) -> Result<u64, StoreError> {
        let collections = self.collections.read().await;
        let count = collections
            .get(&collection)
            .map(|docs| docs.iter().filter(|d| matches_all(d, conditions)).count())
            .unwrap_or(0);
        Ok(count as u64)
    }

    async fn get(&self, collection: Collection, id: Uuid) -> Result<Option<Document>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .and_then(|docs| docs.iter().find(|d| document_id(d) == Some(id)))
            .cloned())
    }

    async fn create(&self, collection: Collection, doc: Document) -> Result<Document, StoreError> {
        let doc = prepare_insert(collection, doc)?;
        let mut collections = self.collections.write().await;
        insert(collection, collections.entry(collection).or_default(), doc)
    }

    async fn create_sole_owned(&self, collection: Collection, owner: Uuid, doc: Document) -> Result<Document, StoreError> {
        let doc = prepare_insert(collection, doc)?;
        let owned = [Condition::eq(&OWNER, FieldValue::Uuid(owner))];

        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection).or_default();
        if docs.iter().any(|d| matches_all(d, &owned)) {
            return Err(StoreError::AlreadyOwned { collection: collection.label(), owner });
        }
        insert(collection, docs, doc)
    }

    async fn update(&self, collection: Collection, id: Uuid, changes: Document) -> Result<Option<Document>, StoreError> {
        let mut changes = normalize(collection, changes)?;
        changes.remove(ID.name);

        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection).or_default();
        let Some(index) = docs.iter().position(|d| document_id(d) == Some(id)) else {
            return Ok(None);
        };

        let mut updated = docs[index].clone();
        updated.extend(changes);
        check_unique(collection, docs, &updated)?;
        docs[index] = updated.clone();
        Ok(Some(updated))
    }

    async fn delete(&self, collection: Collection, id: Uuid) -> Result<bool, StoreError> {
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(&collection) else {
            return Ok(false);
        };
        let before = docs.len();
        docs.retain(|d| document_id(d) != Some(id));
        Ok(docs.len() != before)
    }

    async fn delete_many(&self, collection: Collection, conditions: &[Condition]) -> Result<u64, StoreError> {
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(&collection) else {
            return Ok(0);
        };
        let before = docs.len();
        docs.retain(|d| !matches_all(d, conditions));
        Ok((before - docs.len()) as u64)
    }

    async fn average(&self, collection: Collection, field: &'static FieldDef, conditions: &[Condition]) -> Result<Option<f64>, StoreError> {
        let collections = self.collections.read().await;
        let values: Vec<f64> = collections
            .get(&collection)
            .map(|docs| {
                docs.iter()
                    .filter(|d| matches_all(d, conditions))
                    .filter_map(|d| match value_of(d, field) {
                        FieldValue::Integer(i) => Some(i as f64),
                        FieldValue::Float(f) => Some(f),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default();
        if values.is_empty() {
            return Ok(None);
        }
        Ok(Some(values.iter().sum::<f64>() / values.len() as f64))
    }

    async fn bootcamps_within(&self, center: GeoPoint, radians: f64) -> Result<Vec<Document>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&Collection::Bootcamp)
            .map(|docs| {
                docs.iter()
                    .filter(|d| {
                        d.get(bootcamp::LOCATION.name)
                            .and_then(GeoPoint::from_location)
                            .map(|p| center.angular_distance(&p) <= radians)
                            .unwrap_or(false)
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
