use crate::database::schema::{Collection, FieldDef, FieldValue};

use super::filter_order::FilterOrder;
use super::filter_where::FilterWhere;
use super::types::{Condition, ListQuery};

/// Rendered SQL plus the values to bind, in placeholder order
#[derive(Debug, Clone)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<FieldValue>,
}

/// Builds Postgres statements for a list query over one collection.
/// Rows come back as a single `doc` JSON column keyed by API field names.
pub struct Filter<'a> {
    collection: Collection,
    query: &'a ListQuery,
}

impl<'a> Filter<'a> {
    pub fn new(collection: Collection, query: &'a ListQuery) -> Self {
        Self { collection, query }
    }

    pub fn to_sql(&self) -> SqlResult {
        let fields: Vec<&'static FieldDef> = match &self.query.select {
            Some(fields) if !fields.is_empty() => fields.clone(),
            _ => self.collection.fields().to_vec(),
        };
        let (where_clause, params) = FilterWhere::generate(&self.query.conditions, 0);
        let order_clause = FilterOrder::generate(&self.query.sort);
        let limit_clause = self.build_limit_clause();

        let query = [
            format!("SELECT {} AS doc", json_object(&fields)),
            format!("FROM \"{}\"", self.collection.table()),
            format!("WHERE {}", where_clause),
            order_clause,
            limit_clause,
        ]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

        SqlResult { query, params }
    }

    pub fn to_count_sql(&self) -> SqlResult {
        count_sql(self.collection, &self.query.conditions)
    }

    fn build_limit_clause(&self) -> String {
        match (self.query.limit, self.query.skip) {
            (Some(l), 0) => format!("LIMIT {}", l),
            (Some(l), o) => format!("LIMIT {} OFFSET {}", l, o),
            (None, 0) => String::new(),
            (None, o) => format!("OFFSET {}", o),
        }
    }
}

pub fn count_sql(collection: Collection, conditions: &[Condition]) -> SqlResult {
    let (where_clause, params) = FilterWhere::generate(conditions, 0);
    SqlResult {
        query: format!("SELECT COUNT(*) AS count FROM \"{}\" WHERE {}", collection.table(), where_clause),
        params,
    }
}

pub fn delete_sql(collection: Collection, conditions: &[Condition]) -> SqlResult {
    let (where_clause, params) = FilterWhere::generate(conditions, 0);
    SqlResult {
        query: format!("DELETE FROM \"{}\" WHERE {}", collection.table(), where_clause),
        params,
    }
}

pub fn average_sql(collection: Collection, field: &FieldDef, conditions: &[Condition]) -> SqlResult {
    let (where_clause, params) = FilterWhere::generate(conditions, 0);
    SqlResult {
        query: format!(
            "SELECT AVG(\"{}\")::float8 AS average FROM \"{}\" WHERE {}",
            field.column,
            collection.table(),
            where_clause
        ),
        params,
    }
}

/// `json_build_object('name', "name", ...)` over the given fields
pub fn json_object(fields: &[&FieldDef]) -> String {
    let pairs: Vec<String> = fields
        .iter()
        .map(|f| format!("'{}', \"{}\"", f.name, f.column))
        .collect();
    format!("json_build_object({})", pairs.join(", "))
}
