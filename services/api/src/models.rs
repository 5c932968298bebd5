//! Entity schemas and the normalized record shape
//!
//! Every journal collection is described by a static [`EntitySchema`]: the
//! fields a record must have, the nullable fields it may have, whether it
//! carries tags, and which timestamps the store maintains. The generic
//! entity store reads these declarations to build its SQL and to coerce
//! request bodies.

use serde::Serialize;
use serde_json::{Map, Value};

pub mod activity;
pub mod book;
pub mod diary;
pub mod movie;
pub mod quote;

/// JSON key of the tag list
pub const TAGS_KEY: &str = "tags";
/// JSON key of the creation timestamp
pub const CREATED_AT_KEY: &str = "createdAt";
/// JSON key of the last-update timestamp
pub const UPDATED_AT_KEY: &str = "updatedAt";

/// Column storage class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
}

/// One declared field: its JSON key, its column and its storage class
#[derive(Debug)]
pub struct Field {
    pub name: &'static str,
    pub column: &'static str,
    pub kind: FieldKind,
}

impl Field {
    pub const fn text(name: &'static str, column: &'static str) -> Self {
        Self {
            name,
            column,
            kind: FieldKind::Text,
        }
    }

    pub const fn integer(name: &'static str, column: &'static str) -> Self {
        Self {
            name,
            column,
            kind: FieldKind::Integer,
        }
    }
}

/// Who sets `createdAt`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreatedAt {
    /// The entity has no creation timestamp
    Untracked,
    /// Always the insertion time
    Server,
    /// The caller's value when given, else the insertion time
    CallerOrServer,
}

/// Declaration of one journal collection
#[derive(Debug)]
pub struct EntitySchema {
    /// Singular name used in log lines
    pub name: &'static str,
    pub table: &'static str,
    /// URL segment, e.g. `books` in `/users/:userId/books`
    pub path: &'static str,
    /// Text fields that must be non-empty on create
    pub required: &'static [Field],
    /// Nullable fields
    pub optional: &'static [Field],
    /// Whether the entity has a `tags` column
    pub tags: bool,
    pub created_at: CreatedAt,
    /// Whether `updatedAt` is refreshed on every update
    pub tracks_updates: bool,
    /// Whether the unscoped `GET /<path>` listing exists
    pub global_list: bool,
}

/// A scalar ready to bind into a statement
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Text(String),
    Integer(i64),
}

/// What a request body asks to do with one column
#[derive(Debug, Clone, PartialEq)]
pub enum FieldUpdate {
    /// The key was absent
    Unchanged,
    /// The key was `null` or `""`
    Cleared,
    /// The key carried a value
    Assigned(SqlValue),
}

impl FieldUpdate {
    /// The value to insert for a new record; absent and cleared both mean NULL
    pub fn into_insert_value(self) -> Option<SqlValue> {
        match self {
            FieldUpdate::Assigned(value) => Some(value),
            FieldUpdate::Unchanged | FieldUpdate::Cleared => None,
        }
    }
}

impl Field {
    /// Read this field from a request body as a nullable field
    pub fn parse_optional(&self, body: &Map<String, Value>) -> Result<FieldUpdate, String> {
        let Some(value) = body.get(self.name) else {
            return Ok(FieldUpdate::Unchanged);
        };

        match (self.kind, value) {
            (_, Value::Null) => Ok(FieldUpdate::Cleared),
            (_, Value::String(s)) if s.is_empty() => Ok(FieldUpdate::Cleared),
            (FieldKind::Text, Value::String(s)) => {
                Ok(FieldUpdate::Assigned(SqlValue::Text(s.clone())))
            }
            (FieldKind::Text, Value::Number(n)) => {
                Ok(FieldUpdate::Assigned(SqlValue::Text(n.to_string())))
            }
            (FieldKind::Text, Value::Bool(b)) => {
                Ok(FieldUpdate::Assigned(SqlValue::Text(b.to_string())))
            }
            (FieldKind::Integer, Value::Number(n)) => integer_from_number(n)
                .map(|i| FieldUpdate::Assigned(SqlValue::Integer(i)))
                .ok_or_else(|| format!("{} must be a whole number", self.name)),
            (FieldKind::Integer, Value::String(s)) => s
                .trim()
                .parse::<i64>()
                .map(|i| FieldUpdate::Assigned(SqlValue::Integer(i)))
                .map_err(|_| format!("{} must be a whole number", self.name)),
            (FieldKind::Integer, _) => Err(format!("{} must be a whole number", self.name)),
            (FieldKind::Text, _) => Err(format!("{} must be text", self.name)),
        }
    }

    /// Read this field from a request body as a required text field
    ///
    /// Absent keys are reported as [`FieldUpdate::Unchanged`]; present keys
    /// must hold non-blank text.
    pub fn parse_required(&self, body: &Map<String, Value>) -> Result<FieldUpdate, String> {
        match body.get(self.name) {
            None => Ok(FieldUpdate::Unchanged),
            Some(Value::String(s)) if !s.trim().is_empty() => {
                Ok(FieldUpdate::Assigned(SqlValue::Text(s.clone())))
            }
            Some(Value::Number(n)) => Ok(FieldUpdate::Assigned(SqlValue::Text(n.to_string()))),
            Some(_) => Err(format!("{} cannot be empty", self.name)),
        }
    }
}

fn integer_from_number(n: &serde_json::Number) -> Option<i64> {
    if let Some(i) = n.as_i64() {
        return Some(i);
    }
    n.as_f64()
        .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
        .map(|f| f as i64)
}

/// A record as returned to callers
///
/// `fields` holds every declared field of the schema, with explicit `null`
/// for absent values, plus `tags` and the timestamps where the schema has
/// them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub id: i64,
    #[serde(rename = "userId")]
    pub owner_id: i64,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Record {
    /// Look up one field of the record
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }
}
