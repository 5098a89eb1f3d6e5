//! # Property-Based Tests
//!
//! Determinism and consistency invariants of the projection engine,
//! checked with proptest.

use proptest::collection::vec;
use proptest::prelude::*;
use usagecast_core::{
    EntityRelationshipProducer, Model, NodeEdgeProducer, PropertyValue, Row, RowProducer,
    UsageEngine, UsageError, UsageFact, entity_key, fingerprint, format_entity_key,
    parse_entity_key,
};

// =============================================================================
// STRATEGIES
// =============================================================================

/// Components drawn from a small alphabet that includes every separator,
/// so collisions would show up if the key format were ambiguous.
fn component() -> impl Strategy<Value = String> {
    "[a-c.:/%]{0,6}"
}

fn identity() -> impl Strategy<Value = String> {
    "[a-z]{1,5}@[a-z]{1,3}\\.co"
}

fn fact() -> impl Strategy<Value = UsageFact> {
    (
        component(),
        component(),
        component(),
        component(),
        identity(),
        1u64..1000,
    )
        .prop_map(|(db, cluster, schema, table, user, count)| {
            UsageFact::new(db, cluster, schema, table, user).with_read_count(count)
        })
}

// =============================================================================
// PROPERTY TESTS
// =============================================================================

proptest! {
    /// Distinct addresses never format to the same entity key.
    #[test]
    fn entity_key_is_injective(
        a in (component(), component(), component(), component()),
        b in (component(), component(), component(), component()),
    ) {
        let key_a = format_entity_key(&a.0, &a.1, &a.2, &a.3);
        let key_b = format_entity_key(&b.0, &b.1, &b.2, &b.3);
        prop_assert_eq!(a == b, key_a == key_b);
    }

    /// Parsing an entity key recovers the exact address.
    #[test]
    fn entity_key_round_trips(
        (db, cluster, schema, table) in (component(), component(), component(), component()),
    ) {
        let key = format_entity_key(&db, &cluster, &schema, &table);
        let address = parse_entity_key(key.as_str()).expect("parse");
        prop_assert_eq!(address.database, db);
        prop_assert_eq!(address.cluster, cluster);
        prop_assert_eq!(address.schema, schema);
        prop_assert_eq!(address.table, table);
    }

    /// Each model emits its per-fact units in input order.
    #[test]
    fn projections_preserve_fact_order(facts in vec(fact(), 0..30)) {
        let engine = UsageEngine::new(facts.clone()).expect("valid");

        let mut graph = engine.graph();
        for fact in &facts {
            let node = graph.next_node().expect("node");
            let edge = graph.next_edge().expect("edge");
            prop_assert_eq!(&node.key, &fact.user_email);
            prop_assert_eq!(edge.start_key, entity_key(fact).into_string());
        }
        prop_assert!(graph.next_node().is_none());
        prop_assert!(graph.next_edge().is_none());

        let mut rows = engine.relational();
        for fact in &facts {
            let user = rows.next_row().expect("user row");
            let usage = rows.next_row().expect("usage row");
            prop_assert!(matches!(user, Row::User(ref r) if r.rk == fact.user_email));
            prop_assert!(matches!(usage, Row::TableUsage(ref r) if r.read_count == fact.read_count));
        }
        prop_assert!(rows.next_row().is_none());

        let mut catalog = engine.catalog();
        for fact in &facts {
            let user = catalog.next_entity().expect("user entity");
            let reader = catalog.next_entity().expect("reader entity");
            prop_assert_eq!(&user.qualified_name, &fact.user_email);
            prop_assert_eq!(reader.attributes.get("count"), Some(&PropertyValue::Int(fact.read_count)));
        }
        prop_assert!(catalog.next_entity().is_none());
    }

    /// The entity key is byte-identical in every model.
    #[test]
    fn entity_key_is_consistent_across_models(facts in vec(fact(), 1..20)) {
        let engine = UsageEngine::new(facts.clone()).expect("valid");

        let mut graph = engine.graph();
        let mut rows = engine.relational();
        let mut catalog = engine.catalog();

        for fact in &facts {
            let expected = entity_key(fact).into_string();

            let edge = graph.next_edge().expect("edge");

            rows.next_row().expect("user row");
            let table_rk = match rows.next_row().expect("usage row") {
                Row::TableUsage(r) => r.table_rk,
                Row::User(_) => String::new(),
            };

            catalog.next_entity().expect("user entity");
            let reader = catalog.next_entity().expect("reader entity");
            let relationship = catalog.next_relationship().expect("relationship");
            catalog.next_relationship().expect("relationship");

            prop_assert_eq!(&edge.start_key, &expected);
            prop_assert_eq!(&table_rk, &expected);
            prop_assert_eq!(reader.attributes.get("entityUri"), Some(&PropertyValue::Text(expected.clone())));
            prop_assert_eq!(&relationship.entity_qualified_name_1, &expected);
        }
    }

    /// Two engines over the same facts produce identical output.
    #[test]
    fn two_runs_are_identical(facts in vec(fact(), 0..30)) {
        let first = UsageEngine::new(facts.clone()).expect("valid");
        let second = UsageEngine::new(facts).expect("valid");

        prop_assert_eq!(fingerprint(&first).expect("fp"), fingerprint(&second).expect("fp"));

        let (nodes_a, edges_a) = first.graph().into_cursors();
        let (nodes_b, edges_b) = second.graph().into_cursors();
        prop_assert!(nodes_a.eq(nodes_b));
        prop_assert!(edges_a.eq(edges_b));
        prop_assert!(first.relational().eq(second.relational()));
    }

    /// Pulling past the end keeps returning `None`.
    #[test]
    fn exhaustion_is_sticky(facts in vec(fact(), 0..10), extra in 1usize..5) {
        let engine = UsageEngine::new(facts).expect("valid");
        let mut catalog = engine.catalog();
        while catalog.next_relationship().is_some() {}
        for _ in 0..extra {
            prop_assert!(catalog.next_relationship().is_none());
        }
    }

    /// Any column other than `*` rejects the whole batch.
    #[test]
    fn column_usage_rejects_batch(
        facts in vec(fact(), 0..10),
        column in "[a-z_]{1,10}",
        position in any::<prop::sample::Index>(),
    ) {
        let mut facts = facts;
        let bad = UsageFact::new("hive", "gold", "sales", "orders", "x@co").with_column(column);
        let at = position.index(facts.len() + 1);
        facts.insert(at, bad);

        let result = UsageEngine::new(facts);
        let is_granularity_error = matches!(result, Err(UsageError::UnsupportedGranularity { .. }));
        prop_assert!(is_granularity_error);
    }

    /// Model names round-trip through their string form.
    #[test]
    fn model_names_parse(index in 0usize..3) {
        let model = Model::ALL[index];
        prop_assert_eq!(model.name().parse::<Model>(), Ok(model));
    }
}
