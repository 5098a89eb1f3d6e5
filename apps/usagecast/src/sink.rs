//! # Unit Sinks
//!
//! Streams engine output as JSON Lines, one unit per line, pulling one unit
//! at a time from the engine's cursors.
//!
//! - `StreamSink`: every unit to one writer, wrapped in a
//!   `{"model", "kind", "unit"}` envelope
//! - `DirectorySink`: one file per sequence, e.g. `graph_nodes.jsonl`,
//!   holding bare units for the matching backend loader

use crate::error::AppError;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use usagecast_core::{
    EntityRelationshipProducer, Model, NodeEdgeProducer, RowProducer, UsageEngine,
};

/// The sequence a unit was pulled from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitKind {
    Nodes,
    Edges,
    Rows,
    Entities,
    Relationships,
}

impl UnitKind {
    /// Lowercase name used in file names and envelopes.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Nodes => "nodes",
            Self::Edges => "edges",
            Self::Rows => "rows",
            Self::Entities => "entities",
            Self::Relationships => "relationships",
        }
    }

    /// The sequences a model produces, in write order.
    #[must_use]
    pub const fn for_model(model: Model) -> &'static [UnitKind] {
        match model {
            Model::Graph => &[Self::Nodes, Self::Edges],
            Model::Relational => &[Self::Rows],
            Model::Catalog => &[Self::Entities, Self::Relationships],
        }
    }
}

/// A destination for output units.
pub trait UnitSink {
    /// Write one unit.
    fn write_unit<T: Serialize>(
        &mut self,
        model: Model,
        kind: UnitKind,
        unit: &T,
    ) -> Result<(), AppError>;

    /// Flush everything written so far.
    fn finish(&mut self) -> Result<(), AppError>;
}

// =============================================================================
// STREAM SINK
// =============================================================================

#[derive(Serialize)]
struct Envelope<'a, T> {
    model: Model,
    kind: UnitKind,
    unit: &'a T,
}

/// Writes enveloped units to a single writer.
pub struct StreamSink<W: Write> {
    writer: BufWriter<W>,
}

impl<W: Write> StreamSink<W> {
    /// Wrap a writer.
    pub fn new(writer: W) -> Self {
        Self {
            writer: BufWriter::new(writer),
        }
    }

    /// Flush and return the underlying writer.
    pub fn into_inner(self) -> Result<W, AppError> {
        self.writer
            .into_inner()
            .map_err(|e| AppError::Io(e.into_error()))
    }
}

impl<W: Write> UnitSink for StreamSink<W> {
    fn write_unit<T: Serialize>(
        &mut self,
        model: Model,
        kind: UnitKind,
        unit: &T,
    ) -> Result<(), AppError> {
        serde_json::to_writer(&mut self.writer, &Envelope { model, kind, unit })?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), AppError> {
        self.writer.flush()?;
        Ok(())
    }
}

// =============================================================================
// DIRECTORY SINK
// =============================================================================

/// Writes bare units to one JSON Lines file per (model, sequence).
pub struct DirectorySink {
    files: BTreeMap<(Model, UnitKind), BufWriter<File>>,
}

impl DirectorySink {
    /// Create (or truncate) the files of every selected model under `dir`.
    pub fn create(dir: &Path, models: &[Model]) -> Result<Self, AppError> {
        std::fs::create_dir_all(dir)?;

        let mut files = BTreeMap::new();
        for &model in models {
            for &kind in UnitKind::for_model(model) {
                let path = Self::file_path(dir, model, kind);
                let file = File::create(&path)?;
                tracing::debug!("Writing {} {} to {:?}", model, kind.name(), path);
                files.insert((model, kind), BufWriter::new(file));
            }
        }
        Ok(Self { files })
    }

    /// Path of the file holding one sequence.
    #[must_use]
    pub fn file_path(dir: &Path, model: Model, kind: UnitKind) -> PathBuf {
        dir.join(format!("{}_{}.jsonl", model.name(), kind.name()))
    }
}

impl UnitSink for DirectorySink {
    fn write_unit<T: Serialize>(
        &mut self,
        model: Model,
        kind: UnitKind,
        unit: &T,
    ) -> Result<(), AppError> {
        let writer = self.files.get_mut(&(model, kind)).ok_or_else(|| {
            AppError::Config(format!("No output file for {} {}", model, kind.name()))
        })?;
        serde_json::to_writer(&mut *writer, unit)?;
        writer.write_all(b"\n")?;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), AppError> {
        for writer in self.files.values_mut() {
            writer.flush()?;
        }
        Ok(())
    }
}

// =============================================================================
// PROJECTION DRIVER
// =============================================================================

/// Unit counts of one projection run, keyed by `model.kind`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProjectionSummary {
    pub facts: usize,
    pub units: BTreeMap<String, u64>,
}

impl ProjectionSummary {
    fn record(&mut self, model: Model, kind: UnitKind) {
        *self
            .units
            .entry(format!("{}.{}", model.name(), kind.name()))
            .or_insert(0) += 1;
    }

    /// Number of units written for one sequence.
    #[must_use]
    pub fn count(&self, model: Model, kind: UnitKind) -> u64 {
        self.units
            .get(&format!("{}.{}", model.name(), kind.name()))
            .copied()
            .unwrap_or(0)
    }
}

/// Drive fresh projectors for `models` to exhaustion, writing every unit.
pub fn project<S: UnitSink>(
    engine: &UsageEngine,
    models: &[Model],
    sink: &mut S,
) -> Result<ProjectionSummary, AppError> {
    let mut summary = ProjectionSummary {
        facts: engine.facts().len(),
        ..ProjectionSummary::default()
    };

    for &model in models {
        match model {
            Model::Graph => {
                let mut graph = engine.graph();
                while let Some(node) = graph.next_node() {
                    sink.write_unit(model, UnitKind::Nodes, &node)?;
                    summary.record(model, UnitKind::Nodes);
                }
                while let Some(edge) = graph.next_edge() {
                    sink.write_unit(model, UnitKind::Edges, &edge)?;
                    summary.record(model, UnitKind::Edges);
                }
            }
            Model::Relational => {
                let mut rows = engine.relational();
                while let Some(row) = rows.next_row() {
                    sink.write_unit(model, UnitKind::Rows, &row)?;
                    summary.record(model, UnitKind::Rows);
                }
            }
            Model::Catalog => {
                let mut catalog = engine.catalog();
                while let Some(entity) = catalog.next_entity() {
                    sink.write_unit(model, UnitKind::Entities, &entity)?;
                    summary.record(model, UnitKind::Entities);
                }
                while let Some(relationship) = catalog.next_relationship() {
                    sink.write_unit(model, UnitKind::Relationships, &relationship)?;
                    summary.record(model, UnitKind::Relationships);
                }
            }
        }
        tracing::debug!("Finished {} projection", model);
    }

    sink.finish()?;
    Ok(summary)
}

// =============================================================================
// TESTS
// =============================================================================
