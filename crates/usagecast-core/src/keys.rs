//! # Key Formatter
//!
//! Pure functions mapping a fact's identifying fields to the canonical string
//! keys shared by every model.
//!
//! - Entity key: `{database}://{cluster}.{schema}/{table}`
//! - User key: the user identity itself
//! - Reader key: `{entity key}/_reader/{user identity}`
//!
//! The separators `:`, `.` and `/` (and the escape character `%`) are
//! percent-encoded inside components, so the entity key format is injective:
//! `parse_entity_key` recovers the exact components of any key produced here.
//! Components without those characters are emitted unchanged.

use crate::primitives::READER_KEY_SEGMENT;
use crate::{EntityKey, ReaderKey, UsageError, UsageFact, UserKey};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Characters that are escaped inside a key component.
const RESERVED: [(char, &str); 4] = [('%', "%25"), ('.', "%2E"), ('/', "%2F"), (':', "%3A")];

// =============================================================================
// FORMATTING
// =============================================================================

/// Entity key of the table a fact refers to.
#[must_use]
pub fn entity_key(fact: &UsageFact) -> EntityKey {
    format_entity_key(&fact.database, &fact.cluster, &fact.schema, &fact.table)
}

/// Entity key of an explicit table address.
#[must_use]
pub fn format_entity_key(database: &str, cluster: &str, schema: &str, table: &str) -> EntityKey {
    EntityKey::from_formatted(format!(
        "{}://{}.{}/{}",
        escape(database),
        escape(cluster),
        escape(schema),
        escape(table)
    ))
}

/// User key of a user identity.
#[must_use]
pub fn user_key(identity: &str) -> UserKey {
    UserKey::from_formatted(identity.to_string())
}

/// Reader key of an (entity, user) pair.
#[must_use]
pub fn reader_key(entity: &EntityKey, identity: &str) -> ReaderKey {
    ReaderKey::from_formatted(format!("{entity}/{READER_KEY_SEGMENT}/{identity}"))
}

fn escape(component: &str) -> Cow<'_, str> {
    if !component.contains(['%', '.', '/', ':']) {
        return Cow::Borrowed(component);
    }

    let mut out = String::with_capacity(component.len() + 8);
    for c in component.chars() {
        match RESERVED.iter().find(|(reserved, _)| *reserved == c) {
            Some((_, encoded)) => out.push_str(encoded),
            None => out.push(c),
        }
    }
    Cow::Owned(out)
}

// =============================================================================
// PARSING
// =============================================================================

/// The physical address of a table, recovered from an entity key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityAddress {
    /// Database (source system), e.g. `hive`.
    pub database: String,
    /// Cluster the table lives in.
    pub cluster: String,
    /// Schema the table lives in.
    pub schema: String,
    /// Table name.
    pub table: String,
}

impl EntityAddress {
    /// Format this address back into its entity key.
    #[must_use]
    pub fn to_key(&self) -> EntityKey {
        format_entity_key(&self.database, &self.cluster, &self.schema, &self.table)
    }
}

/// Parse an entity key back into its components.
///
/// Only keys in canonical form are accepted: formatting the parsed address
/// must reproduce `key` byte for byte.
pub fn parse_entity_key(key: &str) -> Result<EntityAddress, UsageError> {
    let invalid = || UsageError::InvalidKey(key.to_string());

    let (database, rest) = key.split_once("://").ok_or_else(invalid)?;
    let (cluster_schema, table) = rest.split_once('/').ok_or_else(invalid)?;
    let (cluster, schema) = cluster_schema.split_once('.').ok_or_else(invalid)?;

    let address = EntityAddress {
        database: unescape(database).ok_or_else(invalid)?,
        cluster: unescape(cluster).ok_or_else(invalid)?,
        schema: unescape(schema).ok_or_else(invalid)?,
        table: unescape(table).ok_or_else(invalid)?,
    };

    if address.to_key().as_str() != key {
        return Err(invalid());
    }
    Ok(address)
}

fn unescape(component: &str) -> Option<String> {
    let mut out = String::with_capacity(component.len());
    let mut rest = component;

    while let Some(pos) = rest.find('%') {
        out.push_str(&rest[..pos]);
        let code = rest.get(pos..pos + 3)?;
        let (decoded, _) = RESERVED.iter().find(|(_, encoded)| *encoded == code)?;
        out.push(*decoded);
        rest = &rest[pos + 3..];
    }
    out.push_str(rest);
    Some(out)
}

// =============================================================================
// TESTS
// =============================================================================
