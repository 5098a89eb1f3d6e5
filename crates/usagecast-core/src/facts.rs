//! # Fact Set
//!
//! The validated, immutable batch of usage facts every projector reads from.
//!
//! A `FactSet` can only be built through validation, so holding one is proof
//! that every fact in it is a whole-entity fact with a positive read count.

use crate::validator::FactValidator;
use crate::{UsageError, UsageFact};
use std::ops::Deref;

/// An ordered, validated, read-only collection of facts.
///
/// Order is the caller's input order and is preserved by every projection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FactSet {
    facts: Box<[UsageFact]>,
}

impl FactSet {
    /// Validate and take ownership of a batch of facts.
    ///
    /// Fails on the first invalid fact; nothing is retained in that case.
    pub fn new(facts: impl IntoIterator<Item = UsageFact>) -> Result<Self, UsageError> {
        let facts: Box<[UsageFact]> = facts.into_iter().collect();
        let count = FactValidator::validate_all(facts.iter())?;
        tracing::debug!(count, "validated usage fact batch");
        Ok(Self { facts })
    }

    /// The facts, in input order.
    #[must_use]
    pub fn as_slice(&self) -> &[UsageFact] {
        &self.facts
    }
}

impl Deref for FactSet {
    type Target = [UsageFact];

    fn deref(&self) -> &Self::Target {
        &self.facts
    }
}

impl<'a> IntoIterator for &'a FactSet {
    type Item = &'a UsageFact;
    type IntoIter = std::slice::Iter<'a, UsageFact>;

    fn into_iter(self) -> Self::IntoIter {
        self.facts.iter()
    }
}

impl TryFrom<Vec<UsageFact>> for FactSet {
    type Error = UsageError;

    fn try_from(facts: Vec<UsageFact>) -> Result<Self, Self::Error> {
        Self::new(facts)
    }
}
