//! # Canonical Export Module
//!
//! Bit-exact encoding of a model's complete output, used to check that two
//! runs over the same facts produce the same units (and therefore the same
//! upsert keys downstream).
//!
//! Format of `canonical_bytes`:
//! ```text
//! [header_len: u32 LE] [CanonicalHeader (postcard)] [unit (postcard)]*
//! ```
//!
//! Units are written in emission order. For two-sequence models the first
//! sequence (nodes, entities) is written completely before the second.

use crate::catalog::{CatalogEntity, CatalogRelationship, EntityRelationshipProducer};
use crate::graph::{GraphEdge, GraphNode, NodeEdgeProducer};
use crate::relational::{Row, RowProducer};
use crate::{Model, UsageEngine, UsageError};
use serde::{Deserialize, Serialize};

// =============================================================================
// CANONICAL FORMAT
// =============================================================================

/// Magic bytes for canonical export format.
pub const CANONICAL_MAGIC: [u8; 4] = *b"UCST";

/// Current canonical format version.
pub const CANONICAL_VERSION: u8 = 1;

/// Header of a canonical export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalHeader {
    /// Magic bytes to identify the format.
    pub magic: [u8; 4],

    /// Format version for compatibility.
    pub version: u8,

    /// The model the units belong to.
    pub model: Model,

    /// Number of units following the header.
    pub unit_count: u64,

    /// Checksum of the unit section.
    pub checksum: u64,
}

impl CanonicalHeader {
    /// Create a header for the current format version.
    #[must_use]
    pub fn new(model: Model, unit_count: u64, checksum: u64) -> Self {
        Self {
            magic: CANONICAL_MAGIC,
            version: CANONICAL_VERSION,
            model,
            unit_count,
            checksum,
        }
    }

    /// Validate magic and version.
    pub fn validate(&self) -> Result<(), UsageError> {
        if self.magic != CANONICAL_MAGIC {
            return Err(UsageError::SerializationError(
                "Invalid file format".to_string(),
            ));
        }
        if self.version != CANONICAL_VERSION {
            return Err(UsageError::SerializationError(
                "Unsupported file version".to_string(),
            ));
        }
        Ok(())
    }
}

/// One output unit of any model, as written to the canonical stream.
#[derive(Debug, Serialize)]
enum CanonicalUnit<'u> {
    Node(&'u GraphNode),
    Edge(&'u GraphEdge),
    Row(&'u Row),
    Entity(&'u CatalogEntity),
    Relationship(&'u CatalogRelationship),
}

// =============================================================================
// CHECKSUM
// =============================================================================

/// Order-sensitive 64-bit checksum (FNV-1a).
///
/// Integer-only and deterministic. NOT a cryptographic hash; enable the
/// `crypto-hash` feature for BLAKE3 digests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checksum(u64);

impl Checksum {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    /// Start a new checksum.
    #[must_use]
    pub const fn new() -> Self {
        Self(Self::OFFSET)
    }

    /// Feed bytes into the checksum.
    pub fn update(&mut self, bytes: &[u8]) {
        for byte in bytes {
            self.0 ^= u64::from(*byte);
            self.0 = self.0.wrapping_mul(Self::PRIME);
        }
    }

    /// The current checksum value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl Default for Checksum {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// TRAVERSAL
// =============================================================================

/// Drive a fresh projector of `model` to exhaustion, handing each unit's
/// postcard bytes to `sink`. Returns the number of units.
fn for_each_encoded(
    engine: &UsageEngine,
    model: Model,
    mut sink: impl FnMut(&[u8]),
) -> Result<u64, UsageError> {
    let mut count: u64 = 0;
    let mut emit = |unit: CanonicalUnit<'_>| -> Result<(), UsageError> {
        let bytes = postcard::to_allocvec(&unit)
            .map_err(|e| UsageError::SerializationError(format!("Unit: {}", e)))?;
        sink(&bytes);
        count += 1;
        Ok(())
    };

    match model {
        Model::Graph => {
            let mut graph = engine.graph();
            while let Some(node) = graph.next_node() {
                emit(CanonicalUnit::Node(&node))?;
            }
            while let Some(edge) = graph.next_edge() {
                emit(CanonicalUnit::Edge(&edge))?;
            }
        }
        Model::Relational => {
            let mut rows = engine.relational();
            while let Some(row) = rows.next_row() {
                emit(CanonicalUnit::Row(&row))?;
            }
        }
        Model::Catalog => {
            let mut catalog = engine.catalog();
            while let Some(entity) = catalog.next_entity() {
                emit(CanonicalUnit::Entity(&entity))?;
            }
            while let Some(relationship) = catalog.next_relationship() {
                emit(CanonicalUnit::Relationship(&relationship))?;
            }
        }
    }

    Ok(count)
}

// =============================================================================
// EXPORT FUNCTIONS
// =============================================================================

/// Encode the complete output of one model in canonical form.
pub fn canonical_bytes(engine: &UsageEngine, model: Model) -> Result<Vec<u8>, UsageError> {
    let mut body = Vec::new();
    let mut checksum = Checksum::new();
    let unit_count = for_each_encoded(engine, model, |bytes| {
        checksum.update(bytes);
        body.extend_from_slice(bytes);
    })?;

    let header = CanonicalHeader::new(model, unit_count, checksum.value());
    let header_bytes = postcard::to_allocvec(&header)
        .map_err(|e| UsageError::SerializationError(format!("Header: {}", e)))?;
    let header_len = u32::try_from(header_bytes.len())
        .map_err(|_| UsageError::SerializationError("Header too large".to_string()))?;

    let mut result = Vec::with_capacity(4 + header_bytes.len() + body.len());
    result.extend_from_slice(&header_len.to_le_bytes());
    result.extend_from_slice(&header_bytes);
    result.extend_from_slice(&body);

    Ok(result)
}

/// Read and validate the header of a canonical export, checking the unit
/// section against its checksum.
pub fn read_canonical_header(data: &[u8]) -> Result<CanonicalHeader, UsageError> {
    let len_bytes: [u8; 4] = data
        .get(..4)
        .and_then(|b| b.try_into().ok())
        .ok_or_else(|| UsageError::SerializationError("Data too short".to_string()))?;
    let header_len = u32::from_le_bytes(len_bytes) as usize;

    let header_bytes = data
        .get(4..4 + header_len)
        .ok_or_else(|| UsageError::SerializationError("Data too short for header".to_string()))?;
    let header: CanonicalHeader = postcard::from_bytes(header_bytes)
        .map_err(|e| UsageError::SerializationError(format!("Header: {}", e)))?;
    header.validate()?;

    let mut checksum = Checksum::new();
    checksum.update(&data[4 + header_len..]);
    if checksum.value() != header.checksum {
        return Err(UsageError::SerializationError(format!(
            "Checksum mismatch: expected {}, got {}",
            header.checksum,
            checksum.value()
        )));
    }

    Ok(header)
}

/// Per-model checksums of one engine run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunFingerprint {
    pub graph: u64,
    pub relational: u64,
    pub catalog: u64,
}

impl RunFingerprint {
    /// The checksum of one model.
    #[must_use]
    pub const fn get(&self, model: Model) -> u64 {
        match model {
            Model::Graph => self.graph,
            Model::Relational => self.relational,
            Model::Catalog => self.catalog,
        }
    }
}

/// Checksum of one model's canonical unit stream, computed without
/// buffering the stream.
pub fn model_checksum(engine: &UsageEngine, model: Model) -> Result<u64, UsageError> {
    let mut checksum = Checksum::new();
    for_each_encoded(engine, model, |bytes| checksum.update(bytes))?;
    Ok(checksum.value())
}

/// Fingerprint every model of an engine run.
pub fn fingerprint(engine: &UsageEngine) -> Result<RunFingerprint, UsageError> {
    Ok(RunFingerprint {
        graph: model_checksum(engine, Model::Graph)?,
        relational: model_checksum(engine, Model::Relational)?,
        catalog: model_checksum(engine, Model::Catalog)?,
    })
}

// =============================================================================
// CRYPTOGRAPHIC HASH SUPPORT
// =============================================================================

/// BLAKE3 hex digest of one model's canonical export.
///
/// Only available with the `crypto-hash` feature.
#[cfg(feature = "crypto-hash")]
pub fn canonical_crypto_hash(engine: &UsageEngine, model: Model) -> Result<String, UsageError> {
    let data = canonical_bytes(engine, model)?;
    Ok(blake3::hash(&data).to_hex().to_string())
}

// =============================================================================
// TESTS
// =============================================================================
