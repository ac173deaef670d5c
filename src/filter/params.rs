use crate::config::QueryConfig;
use crate::database::schema::{Collection, FieldDef, FieldKind, FieldValue, ID};

use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::types::{CompareOp, Condition, FilterOp, ListQuery, Page, Predicate};

const RESERVED: [&str; 4] = ["select", "sort", "page", "limit"];
const MAX_OFFSET: u64 = i64::MAX as u64;

/// One `field[op]=value` pair from the query string, not yet validated
#[derive(Debug, Clone, PartialEq)]
pub struct RawFilter {
    pub field: String,
    pub op: FilterOp,
    pub value: String,
}

/// Query string split into reserved keys and filter pairs
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParams {
    pub select: Option<String>,
    pub sort: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
    pub filters: Vec<RawFilter>,
}

/// A translated list request ready to run against a store
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    pub query: ListQuery,
    pub page: Page,
}

impl QueryParams {
    pub fn from_query_string(raw: Option<&str>) -> Self {
        let pairs = raw
            .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect::<Vec<_>>())
            .unwrap_or_default();
        Self::from_pairs(pairs)
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut params = QueryParams::default();
        for (key, value) in pairs {
            let key: String = key.into();
            let value: String = value.into();
            match key.as_str() {
                "select" => params.select = Some(value),
                "sort" => params.sort = Some(value),
                "page" => params.page = Some(value),
                "limit" => params.limit = Some(value),
                _ => {
                    let (field, token) = split_bracket_key(&key);
                    // `select[x]=` style keys never reach the filter set
                    if RESERVED.contains(&field) {
                        continue;
                    }
                    params.filters.push(RawFilter {
                        field: field.to_string(),
                        op: FilterOp::from_token(token),
                        value,
                    });
                }
            }
        }
        params
    }

    /// Page and limit, falling back to defaults for anything not a positive integer
    /// Requested window; pages past the largest representable offset are clamped
    pub fn page(&self, config: &QueryConfig) -> Page {
        let page = parse_positive(self.page.as_deref()).unwrap_or(1);
        let limit = parse_positive(self.limit.as_deref())
            .unwrap_or(config.default_limit)
            .min(config.max_limit.max(1));
        // OFFSET is a signed bigint
        let last_page = MAX_OFFSET / limit + 1;
        Page { page: page.min(last_page), limit }
    }

    pub fn compile(&self, collection: Collection, config: &QueryConfig) -> Result<CompiledQuery, FilterError> {
        let mut query = ListQuery::new();

        for raw in &self.filters {
            query.conditions.push(build_condition(collection, raw)?);
        }

        if let Some(select) = self.select.as_deref() {
            query.select = Some(parse_select(collection, select)?);
        }

        if let Some(sort) = self.sort.as_deref() {
            let keys = FilterOrder::parse(collection, sort)?;
            if !keys.is_empty() {
                query.sort = keys;
            }
        }

        let page = self.page(config);
        query.skip = page.start_index();
        query.limit = Some(page.limit);

        if config.debug_logging {
            tracing::debug!(collection = %collection, ?query, "translated list query");
        }

        Ok(CompiledQuery { query, page })
    }
}

fn split_bracket_key(key: &str) -> (&str, Option<&str>) {
    if let Some(open) = key.find('[') {
        if key.ends_with(']') && open > 0 {
            return (&key[..open], Some(&key[open + 1..key.len() - 1]));
        }
    }
    (key, None)
}

fn parse_positive(raw: Option<&str>) -> Option<u64> {
    raw.and_then(|s| s.trim().parse::<u64>().ok()).filter(|n| *n > 0)
}

pub(crate) fn lookup_field(collection: Collection, name: &str) -> Result<&'static FieldDef, FilterError> {
    collection.field(name).ok_or_else(|| FilterError::UnknownField {
        collection: collection.label(),
        field: name.to_string(),
    })
}

fn build_condition(collection: Collection, raw: &RawFilter) -> Result<Condition, FilterError> {
    let field = lookup_field(collection, &raw.field)?;
    if !field.filterable() {
        return Err(FilterError::NotFilterable(field.name.to_string()));
    }

    let coerce = |value: &str| {
        FieldValue::parse(field.kind, value).map_err(|message| FilterError::InvalidValue {
            field: field.name.to_string(),
            message,
        })
    };

    let predicate = match raw.op {
        FilterOp::In => {
            let values = raw
                .value
                .split(',')
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(coerce)
                .collect::<Result<Vec<_>, _>>()?;
            Predicate::In(values)
        }
        FilterOp::Compare(op) => {
            if field.kind == FieldKind::TextList && op != CompareOp::Eq {
                return Err(FilterError::UnsupportedOperator {
                    field: field.name.to_string(),
                    operator: op.to_sql(),
                });
            }
            Predicate::Compare(op, coerce(&raw.value)?)
        }
    };

    Ok(Condition { field, predicate })
}

fn parse_select(collection: Collection, raw: &str) -> Result<Vec<&'static FieldDef>, FilterError> {
    let mut fields: Vec<&'static FieldDef> = vec![&ID];
    for name in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let field = lookup_field(collection, name)?;
        if !fields.contains(&field) {
            fields.push(field);
        }
    }
    Ok(fields)
}
