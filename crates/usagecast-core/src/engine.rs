//! # Usage Engine
//!
//! Owns a validated fact set and hands out one projector per model.
//!
//! Every call to `graph()`, `relational()` or `catalog()` returns a fresh
//! projector positioned at the start of its sequences; a projector itself
//! can never be rewound. Projectors borrow the fact set read-only and keep
//! their cursor state to themselves, so projectors of different models can
//! be driven from different threads at the same time.

use crate::catalog::CatalogProjector;
use crate::graph::GraphProjector;
use crate::options::ProjectionOptions;
use crate::relational::RowCursor;
use crate::{FactSet, UsageError, UsageFact};

/// Single entry point of the engine.
#[derive(Debug, Clone, Default)]
pub struct UsageEngine {
    facts: FactSet,
    options: ProjectionOptions,
}

impl UsageEngine {
    /// Validate `facts` and build an engine with default options.
    pub fn new(facts: impl IntoIterator<Item = UsageFact>) -> Result<Self, UsageError> {
        Self::with_options(facts, ProjectionOptions::default())
    }

    /// Validate `facts` and build an engine with the given options.
    pub fn with_options(
        facts: impl IntoIterator<Item = UsageFact>,
        options: ProjectionOptions,
    ) -> Result<Self, UsageError> {
        let facts = FactSet::new(facts)?;
        Ok(Self::from_fact_set(facts, options))
    }

    /// Build an engine over an already validated fact set.
    #[must_use]
    pub fn from_fact_set(facts: FactSet, options: ProjectionOptions) -> Self {
        tracing::debug!(
            facts = facts.len(),
            dedup_users = options.dedup_users,
            "usage engine ready"
        );
        Self { facts, options }
    }

    /// The facts this engine projects.
    #[must_use]
    pub fn facts(&self) -> &FactSet {
        &self.facts
    }

    /// The options every projector is created with.
    #[must_use]
    pub fn options(&self) -> &ProjectionOptions {
        &self.options
    }

    /// A fresh graph projector (nodes + edges).
    #[must_use]
    pub fn graph(&self) -> GraphProjector<'_> {
        GraphProjector::new(&self.facts, &self.options)
    }

    /// A fresh relational row cursor.
    #[must_use]
    pub fn relational(&self) -> RowCursor<'_> {
        RowCursor::new(&self.facts, &self.options)
    }

    /// A fresh catalog projector (entities + relationships).
    #[must_use]
    pub fn catalog(&self) -> CatalogProjector<'_> {
        CatalogProjector::new(&self.facts)
    }
}

// =============================================================================
// TESTS
// =============================================================================
