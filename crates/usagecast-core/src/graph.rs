//! # Graph Projector
//!
//! Projects a fact set into the property-graph model.
//!
//! - One `User` node per fact (repeats are kept unless `dedup_users` is set)
//! - One `(Table)-[READ_BY]->(User)` edge per fact, with `READ` as its
//!   reverse type and the read count as the `read_count` property
//!
//! Nodes and edges are two independent cursors over the same facts. Pulling
//! one never advances the other.

use crate::keys::{entity_key, user_key};
use crate::options::{ProjectionOptions, SeenUsers};
use crate::primitives::{
    EMAIL_PROPERTY, READ_COUNT_PROPERTY, TABLE_NODE_LABEL, TABLE_USER_RELATION_TYPE,
    USER_NODE_LABEL, USER_TABLE_RELATION_TYPE,
};
use crate::{FactSet, Properties, PropertyValue, UsageFact};
use serde::{Deserialize, Serialize};
use std::iter::FusedIterator;
use std::slice;

// =============================================================================
// OUTPUT UNITS
// =============================================================================

/// A labeled node, upserted by (label, key) in the graph database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    pub label: String,
    pub key: String,
    pub properties: Properties,
}

/// A typed edge with its reverse type.
///
/// Forward and reverse form one logical relationship, not two facts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub start_label: String,
    pub start_key: String,
    pub end_label: String,
    pub end_key: String,
    #[serde(rename = "type")]
    pub edge_type: String,
    pub reverse_type: String,
    pub properties: Properties,
}

/// Build the user node of a fact.
#[must_use]
pub fn user_node(fact: &UsageFact) -> GraphNode {
    let mut properties = Properties::new();
    properties.insert(
        EMAIL_PROPERTY.to_string(),
        PropertyValue::from(fact.user_email.as_str()),
    );

    GraphNode {
        label: USER_NODE_LABEL.to_string(),
        key: user_key(&fact.user_email).into_string(),
        properties,
    }
}

/// Build the `READ_BY` / `READ` edge of a fact.
#[must_use]
pub fn read_edge(fact: &UsageFact) -> GraphEdge {
    let mut properties = Properties::new();
    properties.insert(
        READ_COUNT_PROPERTY.to_string(),
        PropertyValue::from(fact.read_count),
    );

    GraphEdge {
        start_label: TABLE_NODE_LABEL.to_string(),
        start_key: entity_key(fact).into_string(),
        end_label: USER_NODE_LABEL.to_string(),
        end_key: user_key(&fact.user_email).into_string(),
        edge_type: TABLE_USER_RELATION_TYPE.to_string(),
        reverse_type: USER_TABLE_RELATION_TYPE.to_string(),
        properties,
    }
}

// =============================================================================
// PRODUCER TRAIT
// =============================================================================

/// Pull interface of a graph loader.
///
/// Each method returns the next unit of its sequence, or `None` once that
/// sequence is exhausted. Calls past exhaustion keep returning `None`.
pub trait NodeEdgeProducer {
    /// Next node, or `None` at end of sequence.
    fn next_node(&mut self) -> Option<GraphNode>;

    /// Next edge, or `None` at end of sequence.
    fn next_edge(&mut self) -> Option<GraphEdge>;
}

// =============================================================================
// CURSORS
// =============================================================================

/// Lazy sequence of user nodes, one per fact in input order.
#[derive(Debug, Clone)]
pub struct NodeCursor<'a> {
    facts: slice::Iter<'a, UsageFact>,
    seen: SeenUsers,
}

impl<'a> NodeCursor<'a> {
    /// Create a node cursor positioned before the first fact.
    #[must_use]
    pub fn new(facts: &'a FactSet, options: &ProjectionOptions) -> Self {
        Self {
            facts: facts.iter(),
            seen: SeenUsers::new(options),
        }
    }
}

impl Iterator for NodeCursor<'_> {
    type Item = GraphNode;

    fn next(&mut self) -> Option<Self::Item> {
        for fact in self.facts.by_ref() {
            if self.seen.admit(&user_key(&fact.user_email)) {
                return Some(user_node(fact));
            }
        }
        None
    }
}

impl FusedIterator for NodeCursor<'_> {}

/// Lazy sequence of read edges, one per fact in input order.
#[derive(Debug, Clone)]
pub struct EdgeCursor<'a> {
    facts: slice::Iter<'a, UsageFact>,
}

impl<'a> EdgeCursor<'a> {
    /// Create an edge cursor positioned before the first fact.
    #[must_use]
    pub fn new(facts: &'a FactSet) -> Self {
        Self { facts: facts.iter() }
    }
}

impl Iterator for EdgeCursor<'_> {
    type Item = GraphEdge;

    fn next(&mut self) -> Option<Self::Item> {
        self.facts.next().map(read_edge)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.facts.size_hint()
    }
}

impl ExactSizeIterator for EdgeCursor<'_> {}

impl FusedIterator for EdgeCursor<'_> {}

// =============================================================================
// PROJECTOR
// =============================================================================

/// The graph projection of a fact set: a node cursor and an edge cursor.
#[derive(Debug, Clone)]
pub struct GraphProjector<'a> {
    nodes: NodeCursor<'a>,
    edges: EdgeCursor<'a>,
}

impl<'a> GraphProjector<'a> {
    /// Create a projector with both cursors at the start.
    #[must_use]
    pub fn new(facts: &'a FactSet, options: &ProjectionOptions) -> Self {
        Self {
            nodes: NodeCursor::new(facts, options),
            edges: EdgeCursor::new(facts),
        }
    }

    /// Split into the two cursors, e.g. to drive them from separate threads.
    #[must_use]
    pub fn into_cursors(self) -> (NodeCursor<'a>, EdgeCursor<'a>) {
        (self.nodes, self.edges)
    }
}

impl NodeEdgeProducer for GraphProjector<'_> {
    fn next_node(&mut self) -> Option<GraphNode> {
        let node = self.nodes.next();
        if node.is_none() {
            tracing::trace!("graph node sequence exhausted");
        }
        node
    }

    fn next_edge(&mut self) -> Option<GraphEdge> {
        let edge = self.edges.next();
        if edge.is_none() {
            tracing::trace!("graph edge sequence exhausted");
        }
        edge
    }
}

// =============================================================================
// TESTS
// =============================================================================
