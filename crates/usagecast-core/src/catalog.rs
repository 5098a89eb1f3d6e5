//! # Catalog Projector
//!
//! Projects a fact set into the metadata catalog model.
//!
//! Per fact, four units across two sequences:
//! - entities: the `User`, then the synthetic `Reader` keyed by the reader key
//! - relationships: `Table`→`Reader` (`Referenceable__Reader`, carries `count`),
//!   then `Reader`→`User` (`Reader__User`, no attributes)
//!
//! The catalog has no edge attributes, so the read count lives on the reader
//! entity. Every entity is emitted with `CREATE`; the catalog upserts on
//! qualified name.

use crate::keys::{entity_key, reader_key, user_key};
use crate::primitives::{
    CATALOG_READER_TYPE, CATALOG_TABLE_TYPE, CATALOG_USER_TYPE, COUNT_ATTRIBUTE,
    EMAIL_PROPERTY, ENTITY_READER_RELATIONSHIP, ENTITY_URI_ATTRIBUTE, READER_USER_RELATIONSHIP,
};
use crate::{FactSet, Properties, PropertyValue, UsageFact};
use serde::{Deserialize, Serialize};
use std::iter::FusedIterator;
use std::slice;

// =============================================================================
// OUTPUT UNITS
// =============================================================================

/// How the catalog should apply an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntityOperation {
    /// Create, or update in place if the qualified name exists.
    Create,
}

/// A typed catalog entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntity {
    pub type_name: String,
    pub operation: EntityOperation,
    pub qualified_name: String,
    pub attributes: Properties,
}

/// A typed relationship between two catalog entities, each addressed by
/// (type, qualified name).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogRelationship {
    pub relationship_type: String,
    pub entity_type_1: String,
    pub entity_qualified_name_1: String,
    pub entity_type_2: String,
    pub entity_qualified_name_2: String,
    pub attributes: Properties,
}

/// Build the user entity of a fact.
#[must_use]
pub fn user_entity(fact: &UsageFact) -> CatalogEntity {
    let mut attributes = Properties::new();
    attributes.insert(
        EMAIL_PROPERTY.to_string(),
        PropertyValue::from(fact.user_email.as_str()),
    );

    CatalogEntity {
        type_name: CATALOG_USER_TYPE.to_string(),
        operation: EntityOperation::Create,
        qualified_name: user_key(&fact.user_email).into_string(),
        attributes,
    }
}

/// Build the reader entity of a fact.
#[must_use]
pub fn reader_entity(fact: &UsageFact) -> CatalogEntity {
    let entity = entity_key(fact);
    let reader = reader_key(&entity, &fact.user_email);

    let mut attributes = Properties::new();
    attributes.insert(
        COUNT_ATTRIBUTE.to_string(),
        PropertyValue::from(fact.read_count),
    );
    attributes.insert(
        ENTITY_URI_ATTRIBUTE.to_string(),
        PropertyValue::from(entity.into_string()),
    );

    CatalogEntity {
        type_name: CATALOG_READER_TYPE.to_string(),
        operation: EntityOperation::Create,
        qualified_name: reader.into_string(),
        attributes,
    }
}

/// Build the entity→reader relationship of a fact.
#[must_use]
pub fn entity_reader_relationship(fact: &UsageFact) -> CatalogRelationship {
    let entity = entity_key(fact);
    let reader = reader_key(&entity, &fact.user_email);

    let mut attributes = Properties::new();
    attributes.insert(
        COUNT_ATTRIBUTE.to_string(),
        PropertyValue::from(fact.read_count),
    );

    CatalogRelationship {
        relationship_type: ENTITY_READER_RELATIONSHIP.to_string(),
        entity_type_1: CATALOG_TABLE_TYPE.to_string(),
        entity_qualified_name_1: entity.into_string(),
        entity_type_2: CATALOG_READER_TYPE.to_string(),
        entity_qualified_name_2: reader.into_string(),
        attributes,
    }
}

/// Build the reader→user relationship of a fact.
#[must_use]
pub fn reader_user_relationship(fact: &UsageFact) -> CatalogRelationship {
    let reader = reader_key(&entity_key(fact), &fact.user_email);

    CatalogRelationship {
        relationship_type: READER_USER_RELATIONSHIP.to_string(),
        entity_type_1: CATALOG_READER_TYPE.to_string(),
        entity_qualified_name_1: reader.into_string(),
        entity_type_2: CATALOG_USER_TYPE.to_string(),
        entity_qualified_name_2: user_key(&fact.user_email).into_string(),
        attributes: Properties::new(),
    }
}

// =============================================================================
// PRODUCER TRAIT
// =============================================================================

/// Pull interface of a catalog loader.
///
/// Entities and relationships are separate sequences; callers may interleave
/// the two in any order.
pub trait EntityRelationshipProducer {
    /// Next entity, or `None` at end of sequence.
    fn next_entity(&mut self) -> Option<CatalogEntity>;

    /// Next relationship, or `None` at end of sequence.
    fn next_relationship(&mut self) -> Option<CatalogRelationship>;
}

// =============================================================================
// CURSORS
// =============================================================================

/// Emits two units per fact: `first` now, `second` on the following pull.
#[derive(Debug, Clone)]
struct PairCursor<'a, T> {
    facts: slice::Iter<'a, UsageFact>,
    pending: Option<T>,
    first: fn(&UsageFact) -> T,
    second: fn(&UsageFact) -> T,
}

impl<'a, T> PairCursor<'a, T> {
    fn new(facts: &'a FactSet, first: fn(&UsageFact) -> T, second: fn(&UsageFact) -> T) -> Self {
        Self {
            facts: facts.iter(),
            pending: None,
            first,
            second,
        }
    }

    fn pull(&mut self) -> Option<T> {
        if let Some(unit) = self.pending.take() {
            return Some(unit);
        }
        let fact = self.facts.next()?;
        self.pending = Some((self.second)(fact));
        Some((self.first)(fact))
    }

    fn remaining(&self) -> usize {
        self.facts.len() * 2 + usize::from(self.pending.is_some())
    }
}

/// Lazy sequence of catalog entities: user then reader, per fact.
#[derive(Debug, Clone)]
pub struct EntityCursor<'a> {
    inner: PairCursor<'a, CatalogEntity>,
}

impl<'a> EntityCursor<'a> {
    /// Create an entity cursor positioned before the first fact.
    #[must_use]
    pub fn new(facts: &'a FactSet) -> Self {
        Self {
            inner: PairCursor::new(facts, user_entity, reader_entity),
        }
    }
}

impl Iterator for EntityCursor<'_> {
    type Item = CatalogEntity;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.pull()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.inner.remaining();
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for EntityCursor<'_> {}

impl FusedIterator for EntityCursor<'_> {}

/// Lazy sequence of catalog relationships: entity→reader then reader→user,
/// per fact.
#[derive(Debug, Clone)]
pub struct RelationshipCursor<'a> {
    inner: PairCursor<'a, CatalogRelationship>,
}

impl<'a> RelationshipCursor<'a> {
    /// Create a relationship cursor positioned before the first fact.
    #[must_use]
    pub fn new(facts: &'a FactSet) -> Self {
        Self {
            inner: PairCursor::new(facts, entity_reader_relationship, reader_user_relationship),
        }
    }
}

impl Iterator for RelationshipCursor<'_> {
    type Item = CatalogRelationship;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.pull()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.inner.remaining();
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for RelationshipCursor<'_> {}

impl FusedIterator for RelationshipCursor<'_> {}

// =============================================================================
// PROJECTOR
// =============================================================================

/// The catalog projection of a fact set.
#[derive(Debug, Clone)]
pub struct CatalogProjector<'a> {
    entities: EntityCursor<'a>,
    relationships: RelationshipCursor<'a>,
}

impl<'a> CatalogProjector<'a> {
    /// Create a projector with both cursors at the start.
    #[must_use]
    pub fn new(facts: &'a FactSet) -> Self {
        Self {
            entities: EntityCursor::new(facts),
            relationships: RelationshipCursor::new(facts),
        }
    }

    /// Split into the two cursors.
    #[must_use]
    pub fn into_cursors(self) -> (EntityCursor<'a>, RelationshipCursor<'a>) {
        (self.entities, self.relationships)
    }
}

impl EntityRelationshipProducer for CatalogProjector<'_> {
    fn next_entity(&mut self) -> Option<CatalogEntity> {
        let entity = self.entities.next();
        if entity.is_none() {
            tracing::trace!("catalog entity sequence exhausted");
        }
        entity
    }

    fn next_relationship(&mut self) -> Option<CatalogRelationship> {
        let relationship = self.relationships.next();
        if relationship.is_none() {
            tracing::trace!("catalog relationship sequence exhausted");
        }
        relationship
    }
}

// =============================================================================
// TESTS
// =============================================================================
