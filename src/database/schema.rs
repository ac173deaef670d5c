use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::store::StoreError;

/// A stored record keyed by API (camelCase) field names.
pub type Document = Map<String, Value>;

/// Named collections backed by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Collection {
    Bootcamp,
    Course,
    Review,
    User,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Uuid,
    Text,
    Integer,
    Float,
    Boolean,
    Timestamp,
    TextList,
    Json,
}

/// A field exposed through the API and the column that stores it
#[derive(Debug, PartialEq, Eq)]
pub struct FieldDef {
    pub name: &'static str,
    pub column: &'static str,
    pub kind: FieldKind,
}

impl FieldDef {
    const fn new(name: &'static str, column: &'static str, kind: FieldKind) -> Self {
        Self { name, column, kind }
    }

    /// JSON blobs can be selected but never filtered on
    pub fn filterable(&self) -> bool {
        !matches!(self.kind, FieldKind::Json)
    }
}

impl fmt::Display for FieldDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

// Fields shared by several collections
pub static ID: FieldDef = FieldDef::new("id", "id", FieldKind::Uuid);
pub static CREATED_AT: FieldDef = FieldDef::new("createdAt", "created_at", FieldKind::Timestamp);
pub static OWNER: FieldDef = FieldDef::new("user", "user_id", FieldKind::Uuid);
pub static BOOTCAMP_REF: FieldDef = FieldDef::new("bootcamp", "bootcamp_id", FieldKind::Uuid);
pub static NAME: FieldDef = FieldDef::new("name", "name", FieldKind::Text);
pub static TITLE: FieldDef = FieldDef::new("title", "title", FieldKind::Text);
pub static DESCRIPTION: FieldDef = FieldDef::new("description", "description", FieldKind::Text);
pub static EMAIL: FieldDef = FieldDef::new("email", "email", FieldKind::Text);

pub mod bootcamp {
    use super::{FieldDef, FieldKind};

    pub static WEBSITE: FieldDef = FieldDef::new("website", "website", FieldKind::Text);
    pub static PHONE: FieldDef = FieldDef::new("phone", "phone", FieldKind::Text);
    pub static ADDRESS: FieldDef = FieldDef::new("address", "address", FieldKind::Text);
    pub static LOCATION: FieldDef = FieldDef::new("location", "location", FieldKind::Json);
    pub static CAREERS: FieldDef = FieldDef::new("careers", "careers", FieldKind::TextList);
    pub static AVERAGE_RATING: FieldDef =
        FieldDef::new("averageRating", "average_rating", FieldKind::Float);
    pub static AVERAGE_COST: FieldDef =
        FieldDef::new("averageCost", "average_cost", FieldKind::Float);
    pub static PHOTO: FieldDef = FieldDef::new("photo", "photo", FieldKind::Text);
    pub static HOUSING: FieldDef = FieldDef::new("housing", "housing", FieldKind::Boolean);
    pub static JOB_ASSISTANCE: FieldDef =
        FieldDef::new("jobAssistance", "job_assistance", FieldKind::Boolean);
    pub static JOB_GUARANTEE: FieldDef =
        FieldDef::new("jobGuarantee", "job_guarantee", FieldKind::Boolean);
    pub static ACCEPT_GI: FieldDef = FieldDef::new("acceptGi", "accept_gi", FieldKind::Boolean);
}

pub mod course {
    use super::{FieldDef, FieldKind};

    pub static WEEKS: FieldDef = FieldDef::new("weeks", "weeks", FieldKind::Integer);
    pub static TUITION: FieldDef = FieldDef::new("tuition", "tuition", FieldKind::Float);
    pub static MINIMUM_SKILL: FieldDef =
        FieldDef::new("minimumSkill", "minimum_skill", FieldKind::Text);
    pub static SCHOLARSHIP_AVAILABLE: FieldDef =
        FieldDef::new("scholarshipAvailable", "scholarship_available", FieldKind::Boolean);
}

pub mod review {
    use super::{FieldDef, FieldKind};

    pub static TEXT: FieldDef = FieldDef::new("text", "text", FieldKind::Text);
    pub static RATING: FieldDef = FieldDef::new("rating", "rating", FieldKind::Integer);
}

pub mod user {
    use super::{FieldDef, FieldKind};

    pub static ROLE: FieldDef = FieldDef::new("role", "role", FieldKind::Text);
}

static BOOTCAMP_FIELDS: &[&FieldDef] = &[
    &ID,
    &NAME,
    &DESCRIPTION,
    &bootcamp::WEBSITE,
    &bootcamp::PHONE,
    &EMAIL,
    &bootcamp::ADDRESS,
    &bootcamp::LOCATION,
    &bootcamp::CAREERS,
    &bootcamp::AVERAGE_RATING,
    &bootcamp::AVERAGE_COST,
    &bootcamp::PHOTO,
    &bootcamp::HOUSING,
    &bootcamp::JOB_ASSISTANCE,
    &bootcamp::JOB_GUARANTEE,
    &bootcamp::ACCEPT_GI,
    &OWNER,
    &CREATED_AT,
];

static COURSE_FIELDS: &[&FieldDef] = &[
    &ID,
    &TITLE,
    &DESCRIPTION,
    &course::WEEKS,
    &course::TUITION,
    &course::MINIMUM_SKILL,
    &course::SCHOLARSHIP_AVAILABLE,
    &BOOTCAMP_REF,
    &OWNER,
    &CREATED_AT,
];

static REVIEW_FIELDS: &[&FieldDef] = &[
    &ID,
    &TITLE,
    &review::TEXT,
    &review::RATING,
    &BOOTCAMP_REF,
    &OWNER,
    &CREATED_AT,
];

static USER_FIELDS: &[&FieldDef] = &[&ID, &NAME, &EMAIL, &user::ROLE, &CREATED_AT];

static BOOTCAMP_UNIQUE: &[&[&FieldDef]] = &[&[&NAME]];
static REVIEW_UNIQUE: &[&[&FieldDef]] = &[&[&BOOTCAMP_REF, &OWNER]];
static USER_UNIQUE: &[&[&FieldDef]] = &[&[&EMAIL]];

impl Collection {
    pub const ALL: [Collection; 4] = [
        Collection::User,
        Collection::Bootcamp,
        Collection::Course,
        Collection::Review,
    ];

    pub fn table(&self) -> &'static str {
        match self {
            Collection::Bootcamp => "bootcamps",
            Collection::Course => "courses",
            Collection::Review => "reviews",
            Collection::User => "users",
        }
    }

    /// Human readable name used in error messages
    pub fn label(&self) -> &'static str {
        match self {
            Collection::Bootcamp => "Bootcamp",
            Collection::Course => "Course",
            Collection::Review => "Review",
            Collection::User => "User",
        }
    }

    pub fn fields(&self) -> &'static [&'static FieldDef] {
        match self {
            Collection::Bootcamp => BOOTCAMP_FIELDS,
            Collection::Course => COURSE_FIELDS,
            Collection::Review => REVIEW_FIELDS,
            Collection::User => USER_FIELDS,
        }
    }

    pub fn field(&self, name: &str) -> Option<&'static FieldDef> {
        self.fields().iter().copied().find(|f| f.name == name)
    }

    /// Field groups that must be unique across the collection
    pub fn unique_keys(&self) -> &'static [&'static [&'static FieldDef]] {
        match self {
            Collection::Bootcamp => BOOTCAMP_UNIQUE,
            Collection::Course => &[],
            Collection::Review => REVIEW_UNIQUE,
            Collection::User => USER_UNIQUE,
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A typed value for a single field, used for filters and writes
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null(FieldKind),
    Uuid(Uuid),
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Timestamp(DateTime<Utc>),
    TextList(Vec<String>),
    Json(Value),
}

impl FieldValue {
    /// Coerce a raw query-string value into the field's kind.
    /// List fields compare element-wise, so a single raw value is one element.
    pub fn parse(kind: FieldKind, raw: &str) -> Result<Self, String> {
        let raw = raw.trim();
        match kind {
            FieldKind::Uuid => Uuid::parse_str(raw)
                .map(FieldValue::Uuid)
                .map_err(|_| format!("'{}' is not a valid id", raw)),
            FieldKind::Text | FieldKind::TextList => Ok(FieldValue::Text(raw.to_string())),
            FieldKind::Integer => raw
                .parse::<i64>()
                .map(FieldValue::Integer)
                .map_err(|_| format!("'{}' is not an integer", raw)),
            FieldKind::Float => raw
                .parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .map(FieldValue::Float)
                .ok_or_else(|| format!("'{}' is not a number", raw)),
            FieldKind::Boolean => match raw.to_ascii_lowercase().as_str() {
                "true" | "1" => Ok(FieldValue::Boolean(true)),
                "false" | "0" => Ok(FieldValue::Boolean(false)),
                _ => Err(format!("'{}' is not a boolean", raw)),
            },
            FieldKind::Timestamp => parse_timestamp(raw)
                .map(FieldValue::Timestamp)
                .ok_or_else(|| format!("'{}' is not a valid date", raw)),
            FieldKind::Json => Err("field cannot be filtered".to_string()),
        }
    }

    /// Read a document value as the given kind
    pub fn from_json(kind: FieldKind, value: &Value) -> Result<Self, String> {
        if value.is_null() {
            return Ok(FieldValue::Null(kind));
        }
        match kind {
            FieldKind::Uuid => value
                .as_str()
                .and_then(|s| Uuid::parse_str(s).ok())
                .map(FieldValue::Uuid)
                .ok_or_else(|| format!("expected id, got {}", value)),
            FieldKind::Text => value
                .as_str()
                .map(|s| FieldValue::Text(s.to_string()))
                .ok_or_else(|| format!("expected string, got {}", value)),
            FieldKind::Integer => value
                .as_i64()
                .or_else(|| value.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
                .map(FieldValue::Integer)
                .ok_or_else(|| format!("expected integer, got {}", value)),
            FieldKind::Float => value
                .as_f64()
                .map(FieldValue::Float)
                .ok_or_else(|| format!("expected number, got {}", value)),
            FieldKind::Boolean => value
                .as_bool()
                .map(FieldValue::Boolean)
                .ok_or_else(|| format!("expected boolean, got {}", value)),
            FieldKind::Timestamp => value
                .as_str()
                .and_then(parse_timestamp)
                .map(FieldValue::Timestamp)
                .ok_or_else(|| format!("expected timestamp, got {}", value)),
            FieldKind::TextList => value
                .as_array()
                .and_then(|items| {
                    items
                        .iter()
                        .map(|v| v.as_str().map(str::to_string))
                        .collect::<Option<Vec<_>>>()
                })
                .map(FieldValue::TextList)
                .ok_or_else(|| format!("expected list of strings, got {}", value)),
            FieldKind::Json => Ok(FieldValue::Json(value.clone())),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null(_))
    }

    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Null(_) => Value::Null,
            FieldValue::Uuid(u) => Value::String(u.to_string()),
            FieldValue::Text(s) => Value::String(s.clone()),
            FieldValue::Integer(i) => Value::from(*i),
            FieldValue::Float(f) => Value::from(*f),
            FieldValue::Boolean(b) => Value::Bool(*b),
            FieldValue::Timestamp(t) => Value::String(t.to_rfc3339()),
            FieldValue::TextList(items) => Value::from(items.clone()),
            FieldValue::Json(v) => v.clone(),
        }
    }

    /// Ordering between two values of the same kind. Integer and float mix freely.
    pub fn compare(&self, other: &FieldValue) -> Option<Ordering> {
        use FieldValue::*;
        match (self, other) {
            (Null(_), Null(_)) => Some(Ordering::Equal),
            (Null(_), _) => Some(Ordering::Less),
            (_, Null(_)) => Some(Ordering::Greater),
            (Uuid(a), Uuid(b)) => Some(a.cmp(b)),
            (Text(a), Text(b)) => Some(a.cmp(b)),
            (Integer(a), Integer(b)) => Some(a.cmp(b)),
            (Integer(a), Float(b)) => (*a as f64).partial_cmp(b),
            (Float(a), Integer(b)) => a.partial_cmp(&(*b as f64)),
            (Float(a), Float(b)) => a.partial_cmp(b),
            (Boolean(a), Boolean(b)) => Some(a.cmp(b)),
            (Timestamp(a), Timestamp(b)) => Some(a.cmp(b)),
            (TextList(a), TextList(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    // Bare dates filter from midnight UTC
    chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Parse a path id, reporting malformed ids with the offending value
pub fn parse_id(raw: &str) -> Result<Uuid, StoreError> {
    Uuid::parse_str(raw.trim()).map_err(|_| StoreError::InvalidId(raw.to_string()))
}

pub fn to_document<T: Serialize>(value: &T) -> Result<Document, StoreError> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::Query(format!("expected an object, got {}", other))),
    }
}

pub fn from_document<T: DeserializeOwned>(doc: Document) -> Result<T, StoreError> {
    Ok(serde_json::from_value(Value::Object(doc))?)
}

/// Resolve each key of a write against the collection and coerce its value.
/// Unknown keys and mistyped values are rejected.
pub fn typed_fields(
    collection: Collection,
    doc: &Document,
) -> Result<Vec<(&'static FieldDef, FieldValue)>, StoreError> {
    doc.iter()
        .map(|(key, value)| {
            let field = collection.field(key).ok_or_else(|| StoreError::InvalidValue {
                field: key.clone(),
                message: format!("unknown field for {}", collection),
            })?;
            let typed = FieldValue::from_json(field.kind, value)
                .map_err(|message| StoreError::InvalidValue { field: key.clone(), message })?;
            Ok((field, typed))
        })
        .collect()
}

/// Id of a document, if it carries a well-formed one
pub fn document_id(doc: &Document) -> Option<Uuid> {
    doc.get(ID.name)
        .and_then(Value::as_str)
        .and_then(|s| Uuid::parse_str(s).ok())
}
