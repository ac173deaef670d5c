use serde::Serialize;

use crate::database::schema::{FieldDef, FieldValue, CREATED_AT};

/// Comparison operators accepted in bracket syntax (`price[gte]=100`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl CompareOp {
    pub fn to_sql(&self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Gt => ">",
            CompareOp::Gte => ">=",
            CompareOp::Lt => "<",
            CompareOp::Lte => "<=",
        }
    }

    pub fn matches(&self, ordering: std::cmp::Ordering) -> bool {
        use std::cmp::Ordering::*;
        match self {
            CompareOp::Eq => ordering == Equal,
            CompareOp::Gt => ordering == Greater,
            CompareOp::Gte => ordering != Less,
            CompareOp::Lt => ordering == Less,
            CompareOp::Lte => ordering != Greater,
        }
    }
}

/// Operator token found between brackets in a query key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Compare(CompareOp),
    In,
}

impl FilterOp {
    /// Tokens outside `gte, gt, lt, lte, in` fall back to equality
    pub fn from_token(token: Option<&str>) -> Self {
        match token {
            Some("gt") => FilterOp::Compare(CompareOp::Gt),
            Some("gte") => FilterOp::Compare(CompareOp::Gte),
            Some("lt") => FilterOp::Compare(CompareOp::Lt),
            Some("lte") => FilterOp::Compare(CompareOp::Lte),
            Some("in") => FilterOp::In,
            _ => FilterOp::Compare(CompareOp::Eq),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Compare(CompareOp, FieldValue),
    In(Vec<FieldValue>),
}

/// One typed filter condition against a known field
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub field: &'static FieldDef,
    pub predicate: Predicate,
}

impl Condition {
    pub fn eq(field: &'static FieldDef, value: FieldValue) -> Self {
        Self { field, predicate: Predicate::Compare(CompareOp::Eq, value) }
    }

    pub fn compare(field: &'static FieldDef, op: CompareOp, value: FieldValue) -> Self {
        Self { field, predicate: Predicate::Compare(op, value) }
    }

    pub fn one_of(field: &'static FieldDef, values: Vec<FieldValue>) -> Self {
        Self { field, predicate: Predicate::In(values) }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SortKey {
    pub field: &'static FieldDef,
    pub direction: SortDirection,
}

/// Store-agnostic list query: filters, projection, ordering and window
#[derive(Debug, Clone, PartialEq)]
pub struct ListQuery {
    pub conditions: Vec<Condition>,
    pub select: Option<Vec<&'static FieldDef>>,
    pub sort: Vec<SortKey>,
    pub skip: u64,
    pub limit: Option<u64>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            conditions: vec![],
            select: None,
            sort: vec![SortKey { field: &CREATED_AT, direction: SortDirection::Asc }],
            skip: 0,
            limit: None,
        }
    }
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn select(mut self, fields: Vec<&'static FieldDef>) -> Self {
        self.select = Some(fields);
        self
    }

    pub fn window(mut self, skip: u64, limit: u64) -> Self {
        self.skip = skip;
        self.limit = Some(limit);
        self
    }
}

/// Requested page and page size, both 1-based and positive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: u64,
    pub limit: u64,
}

impl Page {
    pub fn start_index(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageLink {
    pub page: u64,
    pub limit: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Pagination {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<PageLink>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<PageLink>,
}

impl Pagination {
    /// Neighbouring page links for a page within `total` matching records
    pub fn compute(page: Page, total: u64) -> Self {
        let start = page.start_index();
        let next = (start.saturating_add(page.limit) < total)
            .then(|| PageLink { page: page.page + 1, limit: page.limit });
        let prev = (start > 0).then(|| PageLink { page: page.page - 1, limit: page.limit });
        Self { next, prev }
    }
}
