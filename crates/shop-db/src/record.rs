//! # Schema Descriptors
//!
//! Typed column names and values that the generic repository turns into SQL.
//!
//! ## How a Predicate Becomes SQL
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Fields::<Ticket>::new()                                               │
//! │      .with(TicketColumn::Code, "ABC123")                               │
//! │      .with(TicketColumn::Available, true)                              │
//! │             │                                                           │
//! │             ▼  where_clause(1)                                          │
//! │  WHERE "code" IS ?1 AND "available" IS ?2                              │
//! │             │                                                           │
//! │             ▼  bind_values(query, values)                               │
//! │  ?1 ← Text("ABC123")   ?2 ← Bool(true)                                 │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Column names come from `Column::name()` on a closed enum per entity, so a
//! misspelled attribute is a compile error rather than a runtime one. Values
//! are always bound, never spliced into the SQL text.
//!
//! Predicates compare with `IS`, SQLite's null-safe equality, so a `Null`
//! value matches rows where the column is NULL.

use chrono::{DateTime, Utc};
use sqlx::query::{QueryAs, QueryScalar};
use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{FromRow, Sqlite};
use std::fmt;

// =============================================================================
// Traits
// =============================================================================

/// A persisted attribute of an entity.
pub trait Column: Copy + fmt::Debug + Send + Sync + 'static {
    /// The column name in the table.
    fn name(self) -> &'static str;
}

/// A row type the generic repository can read and write.
pub trait Entity:
    for<'r> FromRow<'r, SqliteRow> + fmt::Debug + Clone + Send + Unpin + 'static
{
    /// The entity's column enum.
    type Column: Column;

    /// Table name.
    const TABLE: &'static str;

    /// Human-readable name used in errors and logs.
    const NAME: &'static str;

    /// The identity column.
    const ID: Self::Column;

    /// The database-assigned identity.
    fn id(&self) -> i64;
}

// =============================================================================
// Value
// =============================================================================

/// A value bound to a query parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Text(String),
    Bool(bool),
    Timestamp(DateTime<Utc>),
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v.into())
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::Text(v.clone())
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Timestamp(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(inner) => inner.into(),
            None => Value::Null,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Integer(v) => write!(f, "{}", v),
            Value::Text(v) => f.write_str(v),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Timestamp(v) => write!(f, "{}", v.to_rfc3339()),
        }
    }
}

// =============================================================================
// Fields
// =============================================================================

/// An ordered set of `(column, value)` pairs.
///
/// Used three ways: as an equality predicate (`get`, `filter`), as the
/// values of an insert (`create`), and as the assignments of an `update`.
#[derive(Debug, Clone)]
pub struct Fields<E: Entity> {
    pairs: Vec<(E::Column, Value)>,
}

impl<E: Entity> Default for Fields<E> {
    fn default() -> Self {
        Fields { pairs: Vec::new() }
    }
}

impl<E: Entity> Fields<E> {
    /// An empty field set. As a predicate it matches every row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a pair.
    pub fn with(mut self, column: E::Column, value: impl Into<Value>) -> Self {
        self.pairs.push((column, value.into()));
        self
    }

    /// Predicate on the identity column.
    pub fn by_id(id: i64) -> Self {
        Self::new().with(E::ID, id)
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// The value paired with the column named `column`, if any.
    pub(crate) fn value_of(&self, column: &str) -> Option<&Value> {
        self.pairs
            .iter()
            .find(|(col, _)| col.name() == column)
            .map(|(_, v)| v)
    }

    /// Iterates the pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &(E::Column, Value)> {
        self.pairs.iter()
    }

    /// Consumes the set, yielding the values in order for binding.
    pub(crate) fn into_values(self) -> Vec<Value> {
        self.pairs.into_iter().map(|(_, v)| v).collect()
    }

    /// `WHERE "a" IS ?n AND "b" IS ?n+1`, or an empty string.
    fn where_clause(&self, first_param: usize) -> String {
        if self.pairs.is_empty() {
            return String::new();
        }

        let conditions: Vec<String> = self
            .pairs
            .iter()
            .enumerate()
            .map(|(i, (col, _))| format!("{} IS ?{}", quote(col.name()), first_param + i))
            .collect();

        format!(" WHERE {}", conditions.join(" AND "))
    }
}

// =============================================================================
// SQL Builders
// =============================================================================

fn quote(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}

/// `SELECT * FROM "t" [WHERE ...] ORDER BY "id" [LIMIT n]`
pub(crate) fn select_sql<E: Entity>(predicate: &Fields<E>, limit: Option<u32>) -> String {
    let mut sql = format!(
        "SELECT * FROM {}{} ORDER BY {}",
        quote(E::TABLE),
        predicate.where_clause(1),
        quote(E::ID.name())
    );
    if let Some(limit) = limit {
        sql.push_str(&format!(" LIMIT {}", limit));
    }
    sql
}

/// `SELECT COUNT(*) FROM "t" [WHERE ...]`
pub(crate) fn count_sql<E: Entity>(predicate: &Fields<E>) -> String {
    format!(
        "SELECT COUNT(*) FROM {}{}",
        quote(E::TABLE),
        predicate.where_clause(1)
    )
}

/// `INSERT INTO "t" ("a", "b") VALUES (?1, ?2) RETURNING *`
pub(crate) fn insert_sql<E: Entity>(fields: &Fields<E>) -> String {
    if fields.is_empty() {
        return format!("INSERT INTO {} DEFAULT VALUES RETURNING *", quote(E::TABLE));
    }

    let columns: Vec<String> = fields.iter().map(|(col, _)| quote(col.name())).collect();
    let params: Vec<String> = (1..=fields.len()).map(|i| format!("?{}", i)).collect();

    format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING *",
        quote(E::TABLE),
        columns.join(", "),
        params.join(", ")
    )
}

/// `UPDATE "t" SET "a" = ?1, "b" = ?2 WHERE "id" = ?3 RETURNING *`
///
/// The id is bound last, after the assignment values.
pub(crate) fn update_sql<E: Entity>(fields: &Fields<E>) -> String {
    let assignments: Vec<String> = fields
        .iter()
        .enumerate()
        .map(|(i, (col, _))| format!("{} = ?{}", quote(col.name()), i + 1))
        .collect();

    format!(
        "UPDATE {} SET {} WHERE {} = ?{} RETURNING *",
        quote(E::TABLE),
        assignments.join(", "),
        quote(E::ID.name()),
        fields.len() + 1
    )
}

/// Binds values in order onto a `query_as`.
pub(crate) fn bind_values<'q, O>(
    mut query: QueryAs<'q, Sqlite, O, SqliteArguments<'q>>,
    values: Vec<Value>,
) -> QueryAs<'q, Sqlite, O, SqliteArguments<'q>> {
    for value in values {
        query = match value {
            Value::Null => query.bind(None::<i64>),
            Value::Integer(v) => query.bind(v),
            Value::Text(v) => query.bind(v),
            Value::Bool(v) => query.bind(v),
            Value::Timestamp(v) => query.bind(v),
        };
    }
    query
}

/// Binds values in order onto a `query_scalar`.
pub(crate) fn bind_scalar_values<'q, O>(
    mut query: QueryScalar<'q, Sqlite, O, SqliteArguments<'q>>,
    values: Vec<Value>,
) -> QueryScalar<'q, Sqlite, O, SqliteArguments<'q>> {
    for value in values {
        query = match value {
            Value::Null => query.bind(None::<i64>),
            Value::Integer(v) => query.bind(v),
            Value::Text(v) => query.bind(v),
            Value::Bool(v) => query.bind(v),
            Value::Timestamp(v) => query.bind(v),
        };
    }
    query
}

// =============================================================================
// Unit Tests
// =============================================================================
