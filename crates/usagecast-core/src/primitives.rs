//! # Model Primitives
//!
//! Fixed labels, type names and key fragments shared by the projectors.
//!
//! These values are part of the contract with the downstream graph database,
//! relational loader and metadata catalog. Changing any of them changes the
//! keys or labels those backends upsert on.

/// Column marker meaning "the whole entity was read".
pub const WHOLE_ENTITY_COLUMN: &str = "*";

/// Path segment separating the entity key from the user in a reader key.
pub const READER_KEY_SEGMENT: &str = "_reader";

// =============================================================================
// GRAPH MODEL
// =============================================================================

/// Node label of the used table.
pub const TABLE_NODE_LABEL: &str = "Table";

/// Node label of the reading user.
pub const USER_NODE_LABEL: &str = "User";

/// Relationship type from table to user.
pub const TABLE_USER_RELATION_TYPE: &str = "READ_BY";

/// Relationship type from user to table (reverse of `READ_BY`).
pub const USER_TABLE_RELATION_TYPE: &str = "READ";

/// Edge property carrying the read count.
pub const READ_COUNT_PROPERTY: &str = "read_count";

/// User node property carrying the identity.
pub const EMAIL_PROPERTY: &str = "email";

// =============================================================================
// RELATIONAL MODEL
// =============================================================================

/// Table holding one row per user.
pub const USER_TABLE_NAME: &str = "user";

/// Table holding one row per (user, table) usage fact.
pub const TABLE_USAGE_TABLE_NAME: &str = "table_usage";

// =============================================================================
// CATALOG MODEL
// =============================================================================

/// Catalog type of the used entity.
pub const CATALOG_TABLE_TYPE: &str = "Table";

/// Catalog type of the user entity.
pub const CATALOG_USER_TYPE: &str = "User";

/// Catalog type of the synthetic reader entity.
pub const CATALOG_READER_TYPE: &str = "Reader";

/// Relationship type linking an entity to one of its readers.
pub const ENTITY_READER_RELATIONSHIP: &str = "Referenceable__Reader";

/// Relationship type linking a reader to its user.
pub const READER_USER_RELATIONSHIP: &str = "Reader__User";

/// Reader attribute carrying the read count.
pub const COUNT_ATTRIBUTE: &str = "count";

/// Reader attribute carrying the entity key.
pub const ENTITY_URI_ATTRIBUTE: &str = "entityUri";

// =============================================================================
// INPUT LIMITS
// =============================================================================

/// Maximum number of facts accepted in one batch.
///
/// Larger batches are rejected by callers that load facts from files.
pub const MAX_FACT_COUNT: usize = 1_000_000;
