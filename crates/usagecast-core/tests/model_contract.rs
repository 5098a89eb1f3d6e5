//! # Model Contract Tests (T0-T4)
//!
//! If ANY tier fails, the loaders downstream can no longer rely on the output.
//!
//! ## Tiers
//! - T0: Fact Validation
//! - T1: Graph Model
//! - T2: Relational Model
//! - T3: Catalog Model
//! - T4: Engine Cursors & Concurrency

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use usagecast_core::{
    CatalogEntity, EntityOperation, EntityRelationshipProducer, GraphEdge, GraphNode,
    NodeEdgeProducer, ProjectionOptions, PropertyValue, Row, RowProducer, TableUsageRow,
    UsageEngine, UsageError, UsageFact, UserRow, parse_entity_key,
};

/// The worked example: alice read hive://gold.sales/orders three times.
fn orders_fact() -> UsageFact {
    UsageFact::new("hive", "gold", "sales", "orders", "alice@co").with_read_count(3)
}

fn drain_nodes(engine: &UsageEngine) -> Vec<GraphNode> {
    let mut graph = engine.graph();
    let mut nodes = Vec::new();
    while let Some(node) = graph.next_node() {
        nodes.push(node);
    }
    nodes
}

fn drain_edges(engine: &UsageEngine) -> Vec<GraphEdge> {
    let mut graph = engine.graph();
    let mut edges = Vec::new();
    while let Some(edge) = graph.next_edge() {
        edges.push(edge);
    }
    edges
}

fn drain_rows(engine: &UsageEngine) -> Vec<Row> {
    let mut cursor = engine.relational();
    let mut rows = Vec::new();
    while let Some(row) = cursor.next_row() {
        rows.push(row);
    }
    rows
}

fn drain_entities(engine: &UsageEngine) -> Vec<CatalogEntity> {
    let mut catalog = engine.catalog();
    let mut entities = Vec::new();
    while let Some(entity) = catalog.next_entity() {
        entities.push(entity);
    }
    entities
}

// =============================================================================
// TIER T0: FACT VALIDATION
// =============================================================================

mod t0_fact_validation {
    use super::*;

    /// T0.1: Whole-entity facts are accepted.
    #[test]
    fn whole_entity_fact_accepted() {
        assert!(UsageEngine::new(vec![orders_fact()]).is_ok());
    }

    /// T0.2: Column usage is rejected with the column named.
    #[test]
    fn column_fact_rejected() {
        let result = UsageEngine::new(vec![orders_fact().with_column("amount")]);
        match result {
            Err(UsageError::UnsupportedGranularity { column, entity }) => {
                assert_eq!(column, "amount");
                assert_eq!(entity, "hive://gold.sales/orders");
            }
            other => panic!("expected granularity error, got {:?}", other.map(|_| ())),
        }
    }

    /// T0.3: A bad fact anywhere in the batch rejects the batch.
    #[test]
    fn bad_fact_rejects_whole_batch() {
        let facts = vec![orders_fact(), orders_fact(), orders_fact().with_column("id")];
        assert!(matches!(
            UsageEngine::new(facts),
            Err(UsageError::UnsupportedGranularity { .. })
        ));
    }

    /// T0.4: Zero read counts are rejected.
    #[test]
    fn zero_read_count_rejected() {
        assert!(matches!(
            UsageEngine::new(vec![orders_fact().with_read_count(0)]),
            Err(UsageError::InvalidReadCount { .. })
        ));
    }

    /// T0.5: Empty identifying fields are projected, not rejected.
    #[test]
    fn empty_identifying_field_accepted() {
        let engine = UsageEngine::new(vec![UsageFact::new("hive", "", "sales", "orders", "alice@co")])
            .expect("valid");
        let edges = drain_edges(&engine);

        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].start_key, "hive://.sales/orders");
        let address = parse_entity_key(&edges[0].start_key).expect("parse");
        assert_eq!(address.cluster, "");
        assert_eq!(address.table, "orders");
    }

    /// T0.6: An empty batch yields empty sequences, not errors.
    #[test]
    fn empty_batch_yields_nothing() {
        let engine = UsageEngine::new(Vec::new()).expect("valid");
        assert!(engine.graph().next_node().is_none());
        assert!(engine.graph().next_edge().is_none());
        assert!(engine.relational().next_row().is_none());
        assert!(engine.catalog().next_entity().is_none());
        assert!(engine.catalog().next_relationship().is_none());
    }
}

// =============================================================================
// TIER T1: GRAPH MODEL
// =============================================================================

mod t1_graph_model {
    use super::*;

    /// T1.1: The worked example edge.
    #[test]
    fn worked_example_edge() {
        let engine = UsageEngine::new(vec![orders_fact()]).expect("valid");
        let edges = drain_edges(&engine);

        assert_eq!(edges.len(), 1);
        let edge = &edges[0];
        assert_eq!(edge.start_label, "Table");
        assert_eq!(edge.start_key, "hive://gold.sales/orders");
        assert_eq!(edge.edge_type, "READ_BY");
        assert_eq!(edge.reverse_type, "READ");
        assert_eq!(edge.end_label, "User");
        assert_eq!(edge.end_key, "alice@co");
        assert_eq!(
            edge.properties.get("read_count"),
            Some(&PropertyValue::Int(3))
        );
    }

    /// T1.2: Repeated users produce repeated nodes by default.
    #[test]
    fn duplicate_user_nodes_kept() {
        let engine = UsageEngine::new(vec![orders_fact(), orders_fact()]).expect("valid");
        let nodes = drain_nodes(&engine);
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0], nodes[1]);
    }

    /// T1.3: Deduplication keeps first occurrence order.
    #[test]
    fn dedup_keeps_first_occurrence() {
        let engine = UsageEngine::with_options(
            vec![
                UsageFact::new("hive", "gold", "sales", "orders", "bob@co"),
                orders_fact(),
                UsageFact::new("hive", "gold", "sales", "items", "bob@co"),
            ],
            ProjectionOptions::dedup_users(),
        )
        .expect("valid");

        let keys: Vec<_> = drain_nodes(&engine).into_iter().map(|n| n.key).collect();
        assert_eq!(keys, vec!["bob@co", "alice@co"]);
        assert_eq!(drain_edges(&engine).len(), 3);
    }
}

// =============================================================================
// TIER T2: RELATIONAL MODEL
// =============================================================================

mod t2_relational_model {
    use super::*;

    /// T2.1: The worked example rows.
    #[test]
    fn worked_example_rows() {
        let engine = UsageEngine::new(vec![orders_fact()]).expect("valid");
        let rows = drain_rows(&engine);

        assert_eq!(
            rows,
            vec![
                Row::User(UserRow {
                    rk: "alice@co".to_string(),
                    email: "alice@co".to_string(),
                }),
                Row::TableUsage(TableUsageRow {
                    user_rk: "alice@co".to_string(),
                    table_rk: "hive://gold.sales/orders".to_string(),
                    read_count: 3,
                }),
            ]
        );
    }

    /// T2.2: Rows are tagged with their target table.
    #[test]
    fn rows_carry_schema() {
        let engine = UsageEngine::new(vec![orders_fact()]).expect("valid");
        let rows = drain_rows(&engine);

        assert_eq!(rows[0].schema().name, "user");
        assert_eq!(rows[0].schema().primary_key, &["rk"]);
        assert_eq!(rows[1].schema().name, "table_usage");
        assert_eq!(
            rows[1].values(),
            vec![
                PropertyValue::from("alice@co"),
                PropertyValue::from("hive://gold.sales/orders"),
                PropertyValue::Int(3),
            ]
        );
    }

    /// T2.3: Same (entity, user) twice is not aggregated.
    #[test]
    fn same_pair_emitted_twice() {
        let fact = orders_fact().with_read_count(1);
        let engine = UsageEngine::new(vec![fact.clone(), fact]).expect("valid");
        let usage: Vec<_> = drain_rows(&engine)
            .into_iter()
            .filter(|r| matches!(r, Row::TableUsage(_)))
            .collect();
        assert_eq!(usage.len(), 2);
        assert_eq!(usage[0], usage[1]);
    }
}

// =============================================================================
// TIER T3: CATALOG MODEL
// =============================================================================

mod t3_catalog_model {
    use super::*;

    /// T3.1: The worked example reader entity.
    #[test]
    fn worked_example_reader() {
        let engine = UsageEngine::new(vec![orders_fact()]).expect("valid");
        let entities = drain_entities(&engine);

        assert_eq!(entities.len(), 2);
        let reader = &entities[1];
        assert_eq!(reader.type_name, "Reader");
        assert_eq!(reader.operation, EntityOperation::Create);
        assert_eq!(
            reader.qualified_name,
            "hive://gold.sales/orders/_reader/alice@co"
        );
        assert_eq!(reader.attributes.get("count"), Some(&PropertyValue::Int(3)));
        assert_eq!(
            reader.attributes.get("entityUri"),
            Some(&PropertyValue::from("hive://gold.sales/orders"))
        );
    }

    /// T3.2: Four units per fact, split across two sequences.
    #[test]
    fn four_units_per_fact() {
        let engine = UsageEngine::new(vec![
            orders_fact(),
            UsageFact::new("hive", "gold", "sales", "items", "bob@co"),
        ])
        .expect("valid");

        let (entities, relationships) = engine.catalog().into_cursors();
        assert_eq!(entities.count() + relationships.count(), 8);
    }

    /// T3.3: Two identical facts produce two reader emissions.
    #[test]
    fn duplicate_facts_emit_duplicate_readers() {
        let fact = orders_fact().with_read_count(1);
        let engine = UsageEngine::new(vec![fact.clone(), fact]).expect("valid");
        let readers = drain_entities(&engine)
            .into_iter()
            .filter(|e| e.type_name == "Reader")
            .count();
        assert_eq!(readers, 2);
    }

    /// T3.4: Dedup never touches catalog output.
    #[test]
    fn dedup_ignored_by_catalog() {
        let engine = UsageEngine::with_options(
            vec![orders_fact(), orders_fact()],
            ProjectionOptions::dedup_users(),
        )
        .expect("valid");
        assert_eq!(drain_entities(&engine).len(), 4);
    }
}

// =============================================================================
// TIER T4: ENGINE CURSORS & CONCURRENCY
// =============================================================================

mod t4_engine {
    use super::*;

    fn engine() -> UsageEngine {
        let facts = (0..50).map(|i| {
            UsageFact::new("hive", "gold", "sales", format!("t{i}"), format!("u{}@co", i % 7))
                .with_read_count(i + 1)
        });
        UsageEngine::new(facts).expect("valid")
    }

    /// T4.1: Models traversed on separate threads match a sequential run.
    #[test]
    fn parallel_traversal_matches_sequential() {
        let engine = engine();

        let (nodes, rows, entities) = std::thread::scope(|scope| {
            let nodes = scope.spawn(|| drain_nodes(&engine));
            let rows = scope.spawn(|| drain_rows(&engine));
            let entities = scope.spawn(|| drain_entities(&engine));
            (
                nodes.join().expect("graph thread"),
                rows.join().expect("relational thread"),
                entities.join().expect("catalog thread"),
            )
        });

        assert_eq!(nodes, drain_nodes(&engine));
        assert_eq!(rows, drain_rows(&engine));
        assert_eq!(entities, drain_entities(&engine));
    }

    /// T4.2: Split cursors of one projector run on separate threads.
    #[test]
    fn split_cursors_run_independently() {
        let engine = engine();
        let (entities, relationships) = engine.catalog().into_cursors();

        let (entity_count, relationship_count) = std::thread::scope(|scope| {
            let e = scope.spawn(move || entities.count());
            let r = scope.spawn(move || relationships.count());
            (e.join().expect("entities"), r.join().expect("relationships"))
        });

        assert_eq!(entity_count, 100);
        assert_eq!(relationship_count, 100);
    }

    /// T4.3: Keys do not change between engine instances.
    #[test]
    fn keys_stable_across_instances() {
        assert_eq!(drain_edges(&engine()), drain_edges(&engine()));
        assert_eq!(drain_entities(&engine()), drain_entities(&engine()));
    }
}
