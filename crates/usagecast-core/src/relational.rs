//! # Relational Projector
//!
//! Projects a fact set into rows of two fixed tables:
//! - `user` (`rk` primary key, `email`)
//! - `table_usage` (`user_rk`, `table_rk` composite primary key, `read_count`)
//!
//! Each fact yields its user row followed by its usage row. Repeated users
//! produce repeated user rows; the loader upserts by primary key.

use crate::keys::{entity_key, user_key};
use crate::options::{ProjectionOptions, SeenUsers};
use crate::primitives::{TABLE_USAGE_TABLE_NAME, USER_TABLE_NAME};
use crate::{FactSet, PropertyValue, UsageFact};
use serde::{Deserialize, Serialize};
use std::iter::FusedIterator;
use std::slice;

// =============================================================================
// SCHEMAS
// =============================================================================

/// Fixed description of a target table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSchema {
    /// Table name.
    pub name: &'static str,
    /// Column names, in the order `Row::values` returns them.
    pub columns: &'static [&'static str],
    /// Primary key columns.
    pub primary_key: &'static [&'static str],
}

/// The user table.
pub const USER_TABLE: TableSchema = TableSchema {
    name: USER_TABLE_NAME,
    columns: &["rk", "email"],
    primary_key: &["rk"],
};

/// The table usage fact table.
pub const TABLE_USAGE_TABLE: TableSchema = TableSchema {
    name: TABLE_USAGE_TABLE_NAME,
    columns: &["user_rk", "table_rk", "read_count"],
    primary_key: &["user_rk", "table_rk"],
};

// =============================================================================
// ROWS
// =============================================================================

/// A row of the `user` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRow {
    pub rk: String,
    pub email: String,
}

/// A row of the `table_usage` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableUsageRow {
    pub user_rk: String,
    pub table_rk: String,
    pub read_count: u64,
}

/// A row tagged with its target table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "table", rename_all = "snake_case")]
pub enum Row {
    User(UserRow),
    TableUsage(TableUsageRow),
}

impl Row {
    /// Schema of the table this row belongs to.
    #[must_use]
    pub fn schema(&self) -> &'static TableSchema {
        match self {
            Self::User(_) => &USER_TABLE,
            Self::TableUsage(_) => &TABLE_USAGE_TABLE,
        }
    }

    /// Column values in schema order.
    #[must_use]
    pub fn values(&self) -> Vec<PropertyValue> {
        match self {
            Self::User(row) => vec![
                PropertyValue::from(row.rk.as_str()),
                PropertyValue::from(row.email.as_str()),
            ],
            Self::TableUsage(row) => vec![
                PropertyValue::from(row.user_rk.as_str()),
                PropertyValue::from(row.table_rk.as_str()),
                PropertyValue::from(row.read_count),
            ],
        }
    }

    /// Primary key values, in the schema's primary key order.
    #[must_use]
    pub fn primary_key(&self) -> Vec<&str> {
        match self {
            Self::User(row) => vec![row.rk.as_str()],
            Self::TableUsage(row) => vec![row.user_rk.as_str(), row.table_rk.as_str()],
        }
    }
}

/// Build the user row of a fact.
#[must_use]
pub fn user_row(fact: &UsageFact) -> UserRow {
    UserRow {
        rk: user_key(&fact.user_email).into_string(),
        email: fact.user_email.clone(),
    }
}

/// Build the usage row of a fact.
#[must_use]
pub fn table_usage_row(fact: &UsageFact) -> TableUsageRow {
    TableUsageRow {
        user_rk: user_key(&fact.user_email).into_string(),
        table_rk: entity_key(fact).into_string(),
        read_count: fact.read_count,
    }
}

// =============================================================================
// PRODUCER TRAIT
// =============================================================================

/// Pull interface of a relational loader.
pub trait RowProducer {
    /// Next row, or `None` at end of sequence.
    fn next_row(&mut self) -> Option<Row>;
}

// =============================================================================
// CURSOR
// =============================================================================

/// Lazy sequence of rows: user row then usage row, per fact in input order.
///
/// At most one row is buffered between calls.
#[derive(Debug, Clone)]
pub struct RowCursor<'a> {
    facts: slice::Iter<'a, UsageFact>,
    pending: Option<Row>,
    seen: SeenUsers,
}

impl<'a> RowCursor<'a> {
    /// Create a row cursor positioned before the first fact.
    #[must_use]
    pub fn new(facts: &'a FactSet, options: &ProjectionOptions) -> Self {
        Self {
            facts: facts.iter(),
            pending: None,
            seen: SeenUsers::new(options),
        }
    }
}

impl Iterator for RowCursor<'_> {
    type Item = Row;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(row) = self.pending.take() {
            return Some(row);
        }

        let fact = self.facts.next()?;
        let user = user_row(fact);
        let usage = Row::TableUsage(table_usage_row(fact));

        if self.seen.admit(&user_key(&fact.user_email)) {
            self.pending = Some(usage);
            Some(Row::User(user))
        } else {
            Some(usage)
        }
    }
}

impl FusedIterator for RowCursor<'_> {}

impl RowProducer for RowCursor<'_> {
    fn next_row(&mut self) -> Option<Row> {
        let row = self.next();
        if row.is_none() {
            tracing::trace!("relational row sequence exhausted");
        }
        row
    }
}

// =============================================================================
// TESTS
// =============================================================================
