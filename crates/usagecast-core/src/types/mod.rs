//! # Core Type Definitions
//!
//! This module contains the shared types of the usagecast engine:
//! - The input record (`UsageFact`)
//! - Derived keys (`EntityKey`, `UserKey`, `ReaderKey`)
//! - Property values carried by output units (`PropertyValue`, `Properties`)
//! - The target model selector (`Model`)
//! - Error types (`UsageError`)
//!
//! ## Determinism Guarantees
//!
//! - Property maps are `BTreeMap`, so attribute order never depends on insertion
//! - Keys are plain strings derived by pure functions (see `keys`)
//! - No floating-point values anywhere in an output unit

use crate::primitives::WHOLE_ENTITY_COLUMN;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// =============================================================================
// USAGE FACT
// =============================================================================

/// One observed read event, aggregated to a count.
///
/// A fact says "`user_email` read the table addressed by
/// `database://cluster.schema/table` `read_count` times". Only whole-entity
/// usage is modeled: `column` must be `"*"` for the fact to be accepted by
/// the validator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UsageFact {
    /// Database (source system) of the used table, e.g. `hive`.
    pub database: String,
    /// Cluster the table lives in.
    pub cluster: String,
    /// Schema the table lives in.
    pub schema: String,
    /// Table name.
    pub table: String,
    /// Column that was read. Only the whole-entity marker `"*"` is supported.
    #[serde(default = "default_column")]
    pub column: String,
    /// Identity of the reader (an email address in practice).
    pub user_email: String,
    /// Number of reads. Must be positive.
    #[serde(default = "default_read_count")]
    pub read_count: u64,
}

fn default_column() -> String {
    WHOLE_ENTITY_COLUMN.to_string()
}

const fn default_read_count() -> u64 {
    1
}

impl UsageFact {
    /// Create a whole-entity fact with a read count of 1.
    #[must_use]
    pub fn new(
        database: impl Into<String>,
        cluster: impl Into<String>,
        schema: impl Into<String>,
        table: impl Into<String>,
        user_email: impl Into<String>,
    ) -> Self {
        Self {
            database: database.into(),
            cluster: cluster.into(),
            schema: schema.into(),
            table: table.into(),
            column: default_column(),
            user_email: user_email.into(),
            read_count: default_read_count(),
        }
    }

    /// Replace the read count.
    #[must_use]
    pub fn with_read_count(mut self, read_count: u64) -> Self {
        self.read_count = read_count;
        self
    }

    /// Replace the column.
    #[must_use]
    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = column.into();
        self
    }

    /// Whether this fact describes usage of the whole entity.
    #[must_use]
    pub fn is_whole_entity(&self) -> bool {
        self.column == WHOLE_ENTITY_COLUMN
    }
}

// =============================================================================
// DERIVED KEYS
// =============================================================================

macro_rules! string_key {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Get the key as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the key, returning the owned string.
            #[must_use]
            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<$name> for String {
            fn from(key: $name) -> Self {
                key.0
            }
        }
    };
}

string_key!(
    /// Canonical key of the used entity, e.g. `hive://gold.sales/orders`.
    ///
    /// Identical across the graph, relational and catalog projections of a fact.
    EntityKey
);

string_key!(
    /// Canonical key of the reading user.
    UserKey
);

string_key!(
    /// Key of the (entity, user) usage relationship:
    /// `{EntityKey}/_reader/{user identity}`.
    ReaderKey
);

// Construction stays inside the crate so every key goes through `keys`.
impl EntityKey {
    pub(crate) fn from_formatted(s: String) -> Self {
        Self(s)
    }
}

impl UserKey {
    pub(crate) fn from_formatted(s: String) -> Self {
        Self(s)
    }
}

impl ReaderKey {
    pub(crate) fn from_formatted(s: String) -> Self {
        Self(s)
    }
}

// =============================================================================
// PROPERTY VALUES
// =============================================================================

/// A scalar attached to a node, edge, row column or catalog attribute.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    /// Unsigned integer (counts).
    Int(u64),
    /// Text (keys, emails, URIs).
    Text(String),
}

impl PropertyValue {
    /// The integer value, if this is an `Int`.
    #[must_use]
    pub fn as_int(&self) -> Option<u64> {
        match self {
            Self::Int(v) => Some(*v),
            Self::Text(_) => None,
        }
    }

    /// The text value, if this is a `Text`.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Int(_) => None,
            Self::Text(s) => Some(s),
        }
    }
}

impl From<u64> for PropertyValue {
    fn from(v: u64) -> Self {
        Self::Int(v)
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Named properties of an output unit, ordered by name.
pub type Properties = BTreeMap<String, PropertyValue>;

// =============================================================================
// MODEL SELECTOR
// =============================================================================

/// The three target models a fact set is projected into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Model {
    /// Property graph: nodes and typed edges.
    Graph,
    /// Relational: rows of the user and table-usage tables.
    Relational,
    /// Knowledge graph / metadata catalog: entities and relationships.
    Catalog,
}

impl Model {
    /// All models, in canonical order.
    pub const ALL: [Model; 3] = [Model::Graph, Model::Relational, Model::Catalog];

    /// Lowercase name used in config files, CLI flags and file names.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Graph => "graph",
            Self::Relational => "relational",
            Self::Catalog => "catalog",
        }
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Model {
    type Err = UsageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "graph" => Ok(Self::Graph),
            "relational" => Ok(Self::Relational),
            "catalog" => Ok(Self::Catalog),
            other => Err(UsageError::UnknownModel(other.to_string())),
        }
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the usagecast engine.
///
/// Fact errors are raised while a fact set is being built and abort the
/// whole batch. Running out of output is never an error: cursors return
/// `None` instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UsageError {
    /// The fact reads a single column; only whole-entity usage (`"*"`) is supported.
    #[error("Unsupported granularity: column '{column}' of {entity} (only '*' is supported)")]
    UnsupportedGranularity {
        /// The rejected column value.
        column: String,
        /// Entity key of the offending fact.
        entity: String,
    },

    /// The fact has a read count of zero.
    #[error("Invalid read count 0 for {user} on {entity}")]
    InvalidReadCount {
        /// Entity key of the offending fact.
        entity: String,
        /// User identity of the offending fact.
        user: String,
    },

    /// The string is not a well-formed entity key.
    #[error("Invalid entity key: {0}")]
    InvalidKey(String),

    /// The model name is not one of graph, relational, catalog.
    #[error("Unknown model: {0}")]
    UnknownModel(String),

    /// A serialization error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

// =============================================================================
// TESTS
// =============================================================================
