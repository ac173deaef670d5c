use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::postgres::{PgArguments, PgPoolOptions, PgRow};
use sqlx::query::Query;
use sqlx::{PgPool, Postgres, Row};
use tracing::{debug, info};
use uuid::Uuid;

use crate::filter::filter::{average_sql, count_sql, delete_sql, json_object};
use crate::filter::{Condition, Filter, ListQuery, SqlResult};
use crate::services::geo::GeoPoint;

use super::schema::{typed_fields, Collection, Document, FieldDef, FieldKind, FieldValue, ID, OWNER};
use super::store::{Store, StoreError};

/// Postgres-backed store. Rows are read back as a single JSON `doc` column.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(url: &str, max_connections: u32, acquire_timeout: Duration) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(acquire_timeout)
            .connect(url)
            .await?;
        info!("Connected to database pool (max {} connections)", max_connections);
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("Database migrations applied");
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    async fn fetch_docs(&self, sql: SqlResult) -> Result<Vec<Document>, StoreError> {
        debug!(query = %sql.query, params = sql.params.len(), "fetch");
        let rows = bind_all(&sql).fetch_all(&self.pool).await?;
        rows.iter().map(read_doc).collect()
    }

    async fn fetch_optional_doc(&self, sql: SqlResult, collection: Collection) -> Result<Option<Document>, StoreError> {
        debug!(query = %sql.query, params = sql.params.len(), "fetch one");
        let row = bind_all(&sql)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_write_error(e, collection))?;
        row.as_ref().map(read_doc).transpose()
    }
}

fn read_doc(row: &PgRow) -> Result<Document, StoreError> {
    match row.try_get::<Value, _>("doc")? {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::Query(format!("expected a JSON object row, got {}", other))),
    }
}

fn bind_all(sql: &SqlResult) -> Query<'_, Postgres, PgArguments> {
    sql.params.iter().fold(sqlx::query(&sql.query), |q, p| bind_value(q, p))
}

fn bind_value<'q>(q: Query<'q, Postgres, PgArguments>, v: &FieldValue) -> Query<'q, Postgres, PgArguments> {
    match v {
        FieldValue::Null(kind) => bind_null(q, *kind),
        FieldValue::Uuid(u) => q.bind(*u),
        FieldValue::Text(s) => q.bind(s.clone()),
        FieldValue::Integer(i) => q.bind(*i),
        FieldValue::Float(f) => q.bind(*f),
        FieldValue::Boolean(b) => q.bind(*b),
        FieldValue::Timestamp(t) => q.bind(*t),
        FieldValue::TextList(items) => q.bind(items.clone()),
        FieldValue::Json(value) => q.bind(value.clone()),
    }
}

/// NULL still needs the column's type for Postgres to plan the statement
fn bind_null<'q>(q: Query<'q, Postgres, PgArguments>, kind: FieldKind) -> Query<'q, Postgres, PgArguments> {
    match kind {
        FieldKind::Uuid => q.bind(None::<Uuid>),
        FieldKind::Text => q.bind(None::<String>),
        FieldKind::Integer => q.bind(None::<i64>),
        FieldKind::Float => q.bind(None::<f64>),
        FieldKind::Boolean => q.bind(None::<bool>),
        FieldKind::Timestamp => q.bind(None::<DateTime<Utc>>),
        FieldKind::TextList => q.bind(None::<Vec<String>>),
        FieldKind::Json => q.bind(None::<Value>),
    }
}

fn map_write_error(err: sqlx::Error, collection: Collection) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        if db.code().as_deref() == Some("23505") {
            let fields = db
                .constraint()
                .and_then(|name| unique_fields_for_constraint(collection, name))
                .unwrap_or_else(|| db.constraint().unwrap_or("unique").to_string());
            return StoreError::Duplicate { collection: collection.label(), fields };
        }
    }
    StoreError::Sqlx(err)
}

/// Constraint names follow Postgres defaults: `<table>_<col>[_<col>]_key`
fn unique_fields_for_constraint(collection: Collection, constraint: &str) -> Option<String> {
    collection
        .unique_keys()
        .iter()
        .find(|key| {
            let columns: Vec<&str> = key.iter().map(|f| f.column).collect();
            constraint == format!("{}_{}_key", collection.table(), columns.join("_"))
        })
        .map(|key| key.iter().map(|f| f.name).collect::<Vec<_>>().join(", "))
}

fn insert_values(collection: Collection, doc: &Document) -> Result<Vec<(&'static FieldDef, FieldValue)>, StoreError> {
    let values = typed_fields(collection, doc)?;
    if !values.iter().any(|(f, _)| f.name == ID.name) {
        return Err(StoreError::InvalidValue {
            field: ID.name.to_string(),
            message: "documents must carry an id".to_string(),
        });
    }
    Ok(values)
}

fn no_row_inserted(collection: Collection) -> StoreError {
    StoreError::Query(format!("insert into {} returned no row", collection.table()))
}

fn insert_sql(collection: Collection, values: Vec<(&'static FieldDef, FieldValue)>) -> SqlResult {
    let columns: Vec<String> = values.iter().map(|(f, _)| format!("\"{}\"", f.column)).collect();
    let placeholders: Vec<String> = (1..=values.len()).map(|i| format!("${}", i)).collect();
    SqlResult {
        query: format!(
            "INSERT INTO \"{}\" ({}) VALUES ({}) RETURNING {} AS doc",
            collection.table(),
            columns.join(", "),
            placeholders.join(", "),
            json_object(collection.fields())
        ),
        params: values.into_iter().map(|(_, v)| v).collect(),
    }
}

fn update_sql(collection: Collection, id: Uuid, values: Vec<(&'static FieldDef, FieldValue)>) -> SqlResult {
    let assignments: Vec<String> = values
        .iter()
        .enumerate()
        .map(|(i, (f, _))| format!("\"{}\" = ${}", f.column, i + 1))
        .collect();
    let id_param = values.len() + 1;
    let mut params: Vec<FieldValue> = values.into_iter().map(|(_, v)| v).collect();
    params.push(FieldValue::Uuid(id));
    SqlResult {
        query: format!(
            "UPDATE \"{}\" SET {} WHERE \"id\" = ${} RETURNING {} AS doc",
            collection.table(),
            assignments.join(", "),
            id_param,
            json_object(collection.fields())
        ),
        params,
    }
}

fn get_sql(collection: Collection, id: Uuid) -> SqlResult {
    SqlResult {
        query: format!(
            "SELECT {} AS doc FROM \"{}\" WHERE \"id\" = $1",
            json_object(collection.fields()),
            collection.table()
        ),
        params: vec![FieldValue::Uuid(id)],
    }
}

/// Haversine angle between each bootcamp's stored `[lng, lat]` and `($1, $2)`
fn within_sql(center: GeoPoint, radians: f64) -> SqlResult {
    let lng = "(\"location\"->'coordinates'->>0)::float8";
    let lat = "(\"location\"->'coordinates'->>1)::float8";
    SqlResult {
        query: format!(
            "SELECT {doc} AS doc FROM \"bootcamps\" \
             WHERE \"location\" IS NOT NULL AND 2 * asin(least(1, sqrt(\
             power(sin(radians({lat} - $2) / 2), 2) + \
             cos(radians($2)) * cos(radians({lat})) * power(sin(radians({lng} - $1) / 2), 2)\
             ))) <= $3 ORDER BY \"created_at\" ASC",
            doc = json_object(Collection::Bootcamp.fields()),
            lat = lat,
            lng = lng,
        ),
        params: vec![
            FieldValue::Float(center.longitude),
            FieldValue::Float(center.latitude),
            FieldValue::Float(radians),
        ],
    }
}

#[async_trait]
impl Store for PgStore {
    async fn find(&self, collection: Collection, query: &ListQuery) -> Result<Vec<Document>, StoreError> {
        self.fetch_docs(Filter::new(collection, query).to_sql()).await
    }

    async fn count(&self, collection: Collection, conditions: &[Condition]) -> Result<u64, StoreError> {
        let sql = count_sql(collection, conditions);
        let row = bind_all(&sql).fetch_one(&self.pool).await?;
        let count: i64 = row.try_get("count")?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    async fn get(&self, collection: Collection, id: Uuid) -> Result<Option<Document>, StoreError> {
        self.fetch_optional_doc(get_sql(collection, id), collection).await
    }

    async fn create(&self, collection: Collection, doc: Document) -> Result<Document, StoreError> {
        let values = insert_values(collection, &doc)?;
        self.fetch_optional_doc(insert_sql(collection, values), collection)
            .await?
            .ok_or_else(|| no_row_inserted(collection))
    }

    async fn create_sole_owned(&self, collection: Collection, owner: Uuid, doc: Document) -> Result<Document, StoreError> {
        let values = insert_values(collection, &doc)?;
        let mut tx = self.pool.begin().await?;

        // Held until commit or rollback; serialises inserts for this owner
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
            .bind(format!("{}:{}", collection.table(), owner))
            .execute(&mut *tx)
            .await?;

        let owned = count_sql(collection, &[Condition::eq(&OWNER, FieldValue::Uuid(owner))]);
        let count: i64 = bind_all(&owned).fetch_one(&mut *tx).await?.try_get("count")?;
        if count > 0 {
            return Err(StoreError::AlreadyOwned { collection: collection.label(), owner });
        }

        let sql = insert_sql(collection, values);
        debug!(query = %sql.query, params = sql.params.len(), %owner, "insert sole owned");
        let row = bind_all(&sql)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| map_write_error(e, collection))?;
        let created = row
            .as_ref()
            .map(read_doc)
            .transpose()?
            .ok_or_else(|| no_row_inserted(collection))?;
        tx.commit().await?;
        Ok(created)
    }

    async fn update(&self, collection: Collection, id: Uuid, changes: Document) -> Result<Option<Document>, StoreError> {
        let values: Vec<_> = typed_fields(collection, &changes)?
            .into_iter()
            .filter(|(f, _)| f.name != ID.name)
            .collect();
        if values.is_empty() {
            return self.get(collection, id).await;
        }
        self.fetch_optional_doc(update_sql(collection, id, values), collection).await
    }

    async fn delete(&self, collection: Collection, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query(&format!("DELETE FROM \"{}\" WHERE \"id\" = $1", collection.table()))
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_many(&self, collection: Collection, conditions: &[Condition]) -> Result<u64, StoreError> {
        let sql = delete_sql(collection, conditions);
        Ok(bind_all(&sql).execute(&self.pool).await?.rows_affected())
    }

    async fn average(&self, collection: Collection, field: &'static FieldDef, conditions: &[Condition]) -> Result<Option<f64>, StoreError> {
        let sql = average_sql(collection, field, conditions);
        let row = bind_all(&sql).fetch_one(&self.pool).await?;
        Ok(row.try_get::<Option<f64>, _>("average")?)
    }

    async fn bootcamps_within(&self, center: GeoPoint, radians: f64) -> Result<Vec<Document>, StoreError> {
        self.fetch_docs(within_sql(center, radians)).await
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::schema::{review, BOOTCAMP_REF, TITLE};

    #[test]
    fn insert_returns_full_document() {
        let id = Uuid::new_v4();
        let sql = insert_sql(
            Collection::User,
            vec![(&ID, FieldValue::Uuid(id)), (&crate::database::schema::NAME, FieldValue::Text("Ann".into()))],
        );
        assert!(sql.query.starts_with("INSERT INTO \"users\" (\"id\", \"name\") VALUES ($1, $2) RETURNING json_build_object('id', \"id\""));
        assert_eq!(sql.params.len(), 2);
    }

    #[test]
    fn inserts_require_an_id() {
        let doc: Document = serde_json::from_value(serde_json::json!({ "name": "Ann" })).unwrap();
        let err = insert_values(Collection::User, &doc).unwrap_err();
        assert!(matches!(err, StoreError::InvalidValue { ref field, .. } if field == "id"));
    }

    #[test]
    fn update_binds_id_last() {
        let id = Uuid::new_v4();
        let sql = update_sql(Collection::Review, id, vec![(&TITLE, FieldValue::Text("t".into())), (&review::RATING, FieldValue::Integer(7))]);
        assert!(sql.query.starts_with("UPDATE \"reviews\" SET \"title\" = $1, \"rating\" = $2 WHERE \"id\" = $3"));
        assert_eq!(sql.params.last(), Some(&FieldValue::Uuid(id)));
    }

    #[test]
    fn resolves_default_unique_constraint_names() {
        assert_eq!(
            unique_fields_for_constraint(Collection::Review, "reviews_bootcamp_id_user_id_key"),
            Some(format!("{}, {}", BOOTCAMP_REF.name, OWNER.name))
        );
        assert_eq!(unique_fields_for_constraint(Collection::User, "users_email_key"), Some("email".to_string()));
        assert_eq!(unique_fields_for_constraint(Collection::Course, "courses_pkey"), None);
    }

    #[test]
    fn radius_query_binds_center_then_radius() {
        let sql = within_sql(GeoPoint::new(-71.1, 42.3), 0.01);
        assert!(sql.query.contains("<= $3"));
        assert_eq!(sql.params[0], FieldValue::Float(-71.1));
        assert_eq!(sql.params[2], FieldValue::Float(0.01));
    }
}
