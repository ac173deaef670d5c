//! List queries driven by the request's query string.
//!
//! `advanced_results` compiles [`QueryParams`] for a collection, fetches the
//! requested page and the filtered total concurrently, expands relations and
//! attaches `next`/`prev` page links.

use std::collections::HashMap;

use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::config::QueryConfig;
use crate::database::schema::{document_id, Collection, Document, FieldDef, FieldValue, BOOTCAMP_REF, DESCRIPTION, ID, NAME};
use crate::database::{Store, StoreError};
use crate::filter::{Condition, FilterError, ListQuery, Pagination, QueryParams};

/// How related records are embedded into results
#[derive(Debug)]
pub enum Populate {
    /// Replace the id in `field` with the referenced record (restricted to `select`)
    Reference {
        field: &'static FieldDef,
        target: Collection,
        select: &'static [&'static FieldDef],
    },
    /// Attach every `target` record whose `foreign` field points at this record, under `name`
    Children {
        name: &'static str,
        target: Collection,
        foreign: &'static FieldDef,
        select: &'static [&'static FieldDef],
    },
}

static BOOTCAMP_SUMMARY: &[&FieldDef] = &[&NAME, &DESCRIPTION];

pub static BOOTCAMP_COURSES: Populate = Populate::Children {
    name: "courses",
    target: Collection::Course,
    foreign: &BOOTCAMP_REF,
    select: &[],
};

pub static COURSE_BOOTCAMP: Populate = Populate::Reference {
    field: &BOOTCAMP_REF,
    target: Collection::Bootcamp,
    select: BOOTCAMP_SUMMARY,
};

pub static REVIEW_BOOTCAMP: Populate = Populate::Reference {
    field: &BOOTCAMP_REF,
    target: Collection::Bootcamp,
    select: BOOTCAMP_SUMMARY,
};

#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// One page of a translated list query
#[derive(Debug, Clone)]
pub struct AdvancedResults {
    pub total: u64,
    pub pagination: Pagination,
    pub data: Vec<Document>,
}

pub async fn advanced_results(
    store: &dyn Store,
    collection: Collection,
    populate: Option<&Populate>,
    params: &QueryParams,
    config: &QueryConfig,
) -> Result<AdvancedResults, QueryError> {
    let compiled = params.compile(collection, config)?;

    let (mut data, total) = futures::try_join!(
        store.find(collection, &compiled.query),
        store.count(collection, &compiled.query.conditions),
    )?;

    if let Some(populate) = populate {
        expand(store, populate, &mut data).await?;
    }

    let pagination = Pagination::compute(compiled.page, total);
    debug!(
        collection = %collection,
        page = compiled.page.page,
        limit = compiled.page.limit,
        returned = data.len(),
        total,
        "advanced results"
    );

    Ok(AdvancedResults { total, pagination, data })
}

/// Embed related records into `docs` in place
pub async fn expand(store: &dyn Store, populate: &Populate, docs: &mut [Document]) -> Result<(), StoreError> {
    match populate {
        Populate::Reference { field, target, select } => {
            let ids = unique_ids(docs.iter().filter_map(|d| reference_id(d, field)));
            if ids.is_empty() {
                return Ok(());
            }

            let mut query = ListQuery::new().filter(Condition::one_of(&ID, ids));
            if !select.is_empty() {
                let mut fields = vec![&ID];
                fields.extend(select.iter().copied());
                query = query.select(fields);
            }
            let related: HashMap<Uuid, Document> = store
                .find(*target, &query)
                .await?
                .into_iter()
                .filter_map(|d| document_id(&d).map(|id| (id, d)))
                .collect();

            for doc in docs.iter_mut() {
                if let Some(id) = reference_id(doc, field) {
                    let embedded = related.get(&id).cloned().map(Value::Object).unwrap_or(Value::Null);
                    doc.insert(field.name.to_string(), embedded);
                }
            }
        }
        Populate::Children { name, target, foreign, select } => {
            let parents = unique_ids(docs.iter().filter_map(document_id));
            let mut grouped: HashMap<Uuid, Vec<Value>> = HashMap::new();

            if !parents.is_empty() {
                let query = ListQuery::new().filter(Condition::one_of(*foreign, parents));
                for child in store.find(*target, &query).await? {
                    if let Some(parent) = reference_id(&child, foreign) {
                        grouped.entry(parent).or_default().push(Value::Object(project(child, select)));
                    }
                }
            }

            for doc in docs.iter_mut() {
                let children = document_id(doc).and_then(|id| grouped.remove(&id)).unwrap_or_default();
                doc.insert(name.to_string(), Value::Array(children));
            }
        }
    }
    Ok(())
}

fn reference_id(doc: &Document, field: &FieldDef) -> Option<Uuid> {
    doc.get(field.name)
        .and_then(Value::as_str)
        .and_then(|s| Uuid::parse_str(s).ok())
}

fn unique_ids(ids: impl Iterator<Item = Uuid>) -> Vec<FieldValue> {
    let mut seen: Vec<Uuid> = Vec::new();
    for id in ids {
        if !seen.contains(&id) {
            seen.push(id);
        }
    }
    seen.into_iter().map(FieldValue::Uuid).collect()
}

fn project(doc: Document, select: &[&FieldDef]) -> Document {
    if select.is_empty() {
        return doc;
    }
    doc.into_iter()
        .filter(|(key, _)| key == ID.name || select.iter().any(|f| f.name == key))
        .collect()
}
