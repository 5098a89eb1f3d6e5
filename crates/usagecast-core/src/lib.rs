//! # usagecast-core
//!
//! The deterministic multi-model fact serialization engine.
//!
//! Takes a batch of usage facts ("user U read table T N times") and projects
//! each fact into three independently consumable models:
//! - a property graph (`graph`): user nodes and `READ_BY`/`READ` edges
//! - a relational model (`relational`): `user` and `table_usage` rows
//! - a metadata catalog (`catalog`): user/reader entities and their relationships
//!
//! ## Guarantees
//!
//! - Facts are validated eagerly; one bad fact rejects the whole batch
//! - Every projection preserves input order
//! - Keys are pure functions of the fact, identical across models and runs
//! - Output is pulled lazily, one unit at a time, through independent cursors
//!
//! ## Architectural Constraints
//!
//! - No I/O, no async, no background work
//! - Deterministic: `BTreeMap` only, no floats, no randomness

// =============================================================================
// MODULES
// =============================================================================

pub mod catalog;
pub mod engine;
pub mod export;
pub mod facts;
pub mod graph;
pub mod keys;
pub mod options;
pub mod primitives;
pub mod relational;
pub mod types;
pub mod validator;

// =============================================================================
// RE-EXPORTS: Core Types
// =============================================================================

pub use types::{
    EntityKey, Model, Properties, PropertyValue, ReaderKey, UsageError, UsageFact, UserKey,
};

// =============================================================================
// RE-EXPORTS: Engine
// =============================================================================

pub use catalog::{
    CatalogEntity, CatalogProjector, CatalogRelationship, EntityCursor, EntityOperation,
    EntityRelationshipProducer, RelationshipCursor,
};
pub use engine::UsageEngine;
pub use facts::FactSet;
pub use graph::{EdgeCursor, GraphEdge, GraphNode, GraphProjector, NodeCursor, NodeEdgeProducer};
pub use keys::{
    EntityAddress, entity_key, format_entity_key, parse_entity_key, reader_key, user_key,
};
pub use options::ProjectionOptions;
pub use relational::{
    Row, RowCursor, RowProducer, TABLE_USAGE_TABLE, TableSchema, TableUsageRow, USER_TABLE,
    UserRow,
};
pub use validator::FactValidator;

// =============================================================================
// RE-EXPORTS: Canonical Export
// =============================================================================

pub use export::{
    CanonicalHeader, Checksum, RunFingerprint, canonical_bytes, fingerprint, model_checksum,
    read_canonical_header,
};
