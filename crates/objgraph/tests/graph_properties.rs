// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com
//
// End-to-end properties of dispatch and traversal through the public API.
//
// Resolution: exact entries win, otherwise the most specific ancestor wins,
// ties between contracts go to the one declared first, and unknown requests
// report "not found" without panicking.
//
// Traversal: cycles terminate and map onto cycles, shared nodes stay shared,
// and a clone always compares equal to its source, NaN leaves included.

#![allow(clippy::unwrap_used)]
#![allow(clippy::missing_panics_doc)]

use objgraph::{
    Field, GraphConfig, GraphEngine, HandlerRegistry, Node, NodeId, NodeRef, ResolvedBy, Shape,
    TypeHierarchy, TypeTag, Value,
};
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::thread;

fn tag(name: &str) -> TypeTag {
    TypeTag::new(name)
}

fn zoo() -> Arc<TypeHierarchy> {
    Arc::new(
        TypeHierarchy::builder()
            .contract("Swims", &[])
            .contract("Flies", &[])
            .class_implementing("Bird", "record", &["Flies"])
            .class_implementing("Duck", "Bird", &["Swims"])
            .class_implementing("Penguin", "Bird", &["Swims", "Flies"])
            .class_implementing("Amphibian", "record", &["Swims", "Flies"])
            .class_implementing("Frog", "Amphibian", &[])
            .build()
            .unwrap(),
    )
}

fn engine() -> GraphEngine {
    let _ = env_logger::builder().is_test(true).try_init();
    GraphConfig::default().build_engine().unwrap()
}

// ============================================================================
// Resolution
// ============================================================================

#[test]
fn exact_registration_is_returned() {
    let registry = HandlerRegistry::new(zoo());
    registry.register("Duck", "string", "duck").unwrap();
    registry.register("Bird", "string", "bird").unwrap();

    assert_eq!(registry.resolve(&tag("Duck"), &tag("string")), Some("duck"));
    assert_eq!(registry.resolve(&tag("Bird"), &tag("string")), Some("bird"));
}

#[test]
fn exact_match_beats_object() {
    let registry = HandlerRegistry::new(Arc::new(TypeHierarchy::builtin()));
    registry.register("string", "int", "parse").unwrap();
    registry.register("object", "int", "generic").unwrap();

    let found = registry.lookup(&tag("string"), &tag("int")).unwrap();
    assert_eq!(found.handler, "parse");
    assert_eq!(found.by, ResolvedBy::Exact);
}

#[test]
fn most_specific_ancestor_wins() {
    let registry = HandlerRegistry::new(zoo());
    registry.register("record", "string", "record").unwrap();
    registry.register("Bird", "string", "bird").unwrap();
    registry.register("Swims", "string", "swims").unwrap();

    // Bird is on the class chain of Duck, so it beats the Swims contract.
    assert_eq!(registry.resolve(&tag("Duck"), &tag("string")), Some("bird"));
    // Frog reaches record through its chain before any contract.
    assert_eq!(registry.resolve(&tag("Frog"), &tag("string")), Some("record"));
}

#[test]
fn contract_ties_follow_declaration_order() {
    for _ in 0..10 {
        let registry = HandlerRegistry::new(zoo());
        registry.register("Swims", "int", "swims").unwrap();
        registry.register("Flies", "int", "flies").unwrap();

        // Amphibian declares Swims before Flies.
        assert_eq!(registry.resolve(&tag("Frog"), &tag("int")), Some("swims"));
        // Duck's own Swims comes before the Flies it inherits from Bird.
        assert_eq!(registry.resolve(&tag("Duck"), &tag("int")), Some("swims"));
    }
}

#[test]
fn unregistered_request_is_not_found() {
    let registry: HandlerRegistry<&'static str> = HandlerRegistry::new(zoo());
    assert_eq!(registry.resolve(&tag("Nope"), &tag("Nada")), None);
    assert_eq!(registry.resolve(&tag("Duck"), &tag("string")), None);
    assert_eq!(registry.stats().misses, 2);
}

// ============================================================================
// Traversal
// ============================================================================

fn record(ty: &str, val: i64) -> NodeRef {
    NodeRef::new(Node::record(ty, vec![Field::new("val", "int", val)]))
}

fn follow(node: &NodeRef, field: &str) -> NodeRef {
    node.field(field).and_then(|v| v.as_node().cloned()).unwrap()
}

#[test]
fn self_cycle_maps_to_itself() {
    let engine = engine();
    let n = record("record", 1);
    n.set_field("me", n.clone()).unwrap();

    let copy = engine.deep_clone(&Value::from(n.clone())).unwrap();
    let copy = copy.as_node().unwrap();
    assert!(follow(copy, "me").ptr_eq(copy));
    assert!(!copy.ptr_eq(&n));

    n.clear();
    copy.clear();
}

#[test]
fn mutual_cycle_compares_equal() {
    let engine = engine();
    let a = record("record", 5);
    let b = record("record", 5);
    a.set_field("peer", b.clone()).unwrap();
    b.set_field("peer", a.clone()).unwrap();

    assert!(engine
        .compare_equal(&Value::from(a.clone()), &Value::from(b.clone()))
        .unwrap());

    a.clear();
}

#[test]
fn shared_node_stays_shared() {
    let engine = engine();
    let shared = record("record", 9);
    let left = record("record", 1);
    let right = record("record", 2);
    left.set_field("child", shared.clone()).unwrap();
    right.set_field("child", shared.clone()).unwrap();
    let root = NodeRef::new(Node::record(
        "record",
        vec![
            Field::new("left", "record", left),
            Field::new("right", "record", right),
        ],
    ));

    let copy = engine.deep_clone(&Value::from(root)).unwrap();
    let copy = copy.as_node().unwrap();
    let via_left = follow(&follow(copy, "left"), "child");
    let via_right = follow(&follow(copy, "right"), "child");
    assert!(via_left.ptr_eq(&via_right));
    assert!(!via_left.ptr_eq(&shared));
}

#[test]
fn three_cycle_returns_after_three_hops() {
    let engine = engine();
    let a = record("record", 1);
    let b = record("record", 2);
    let c = record("record", 3);
    a.set_field("next", b.clone()).unwrap();
    b.set_field("next", c.clone()).unwrap();
    c.set_field("next", a.clone()).unwrap();

    let copy = engine.deep_clone(&Value::from(a.clone())).unwrap();
    let ca = copy.as_node().unwrap();
    let back = follow(&follow(&follow(ca, "next"), "next"), "next");
    assert!(back.ptr_eq(ca));
    assert_eq!(follow(ca, "next").field("val").unwrap().as_int(), Some(2));

    a.clear();
    ca.clear();
}

// ============================================================================
// Random graphs
// ============================================================================

/// `n` nodes, each with a value and a list of links. Node `i` always links
/// to `i + 1` so everything is reachable from node 0; the rest is random,
/// including self links and back edges.
fn random_graph(rng: &mut fastrand::Rng, n: usize) -> Vec<NodeRef> {
    let nodes: Vec<NodeRef> = (0..n).map(|_| record("record", rng.i64(-100..100))).collect();
    for (i, node) in nodes.iter().enumerate() {
        let mut links = vec![Value::from(nodes[(i + 1) % n].clone())];
        for _ in 0..rng.usize(0..4) {
            links.push(Value::from(nodes[rng.usize(0..n)].clone()));
        }
        if rng.bool() {
            links.push(Value::Null);
        }
        let list = NodeRef::new(Node::list("list", "record", links));
        node.set_field("links", list).unwrap();
    }
    nodes
}

/// Distinct nodes reachable from `root`.
fn reachable(root: &NodeRef) -> Vec<NodeRef> {
    let mut seen: HashSet<NodeId> = HashSet::new();
    let mut out = Vec::new();
    let mut queue = VecDeque::from([root.clone()]);
    while let Some(node) = queue.pop_front() {
        if !seen.insert(node.id()) {
            continue;
        }
        let children: Vec<Value> = match &node.read().shape {
            Shape::Record(fields) => fields.iter().map(|f| f.value.clone()).collect(),
            Shape::List { items, .. } => items.clone(),
            Shape::Map { entries, .. } => entries
                .iter()
                .flat_map(|(k, v)| [k.clone(), v.clone()])
                .collect(),
        };
        queue.extend(children.iter().filter_map(|v| v.as_node().cloned()));
        out.push(node);
    }
    out
}

fn release(nodes: &[NodeRef]) {
    for node in nodes {
        node.clear();
    }
}

#[test]
fn random_cyclic_graphs_clone_and_compare() {
    let engine = engine();
    let mut rng = fastrand::Rng::with_seed(0x0b_6a_f4);

    for round in 0..25 {
        let n = rng.usize(1..40);
        let nodes = random_graph(&mut rng, n);
        let root = Value::from(nodes[0].clone());

        let copy = engine.deep_clone(&root).unwrap();
        let source_nodes = reachable(&nodes[0]);
        let copy_nodes = reachable(copy.as_node().unwrap());

        // Same number of distinct nodes, none shared with the source.
        assert_eq!(copy_nodes.len(), source_nodes.len(), "round {round}");
        let source_ids: HashSet<NodeId> = source_nodes.iter().map(NodeRef::id).collect();
        assert!(copy_nodes.iter().all(|c| !source_ids.contains(&c.id())));

        assert!(engine.compare_equal(&root, &copy).unwrap(), "round {round}");

        // Any single leaf change is detected.
        let victim = &copy_nodes[rng.usize(0..copy_nodes.len())];
        if victim.type_tag() == tag("record") {
            let old = victim.field("val").and_then(|v| v.as_int()).unwrap();
            victim.set_field("val", old + 1).unwrap();
            let found = engine.first_mismatch(&root, &copy).unwrap();
            assert!(found.is_some(), "round {round}");
            assert!(found.unwrap().path.ends_with(".val"));
        }

        release(&source_nodes);
        release(&copy_nodes);
    }
}

#[test]
fn nan_leaves_compare_equal_after_clone() {
    let engine = engine();
    let mut rng = fastrand::Rng::with_seed(7);

    let nodes = random_graph(&mut rng, 12);
    for node in &nodes {
        let weight = if rng.bool() { f64::NAN } else { rng.f64() };
        node.set_field("weight", weight).unwrap();
    }
    let root = Value::from(nodes[0].clone());
    let copy = engine.deep_clone(&root).unwrap();
    assert!(engine.compare_equal(&root, &copy).unwrap());

    let source_nodes = reachable(&nodes[0]);
    let copy_nodes = reachable(copy.as_node().unwrap());
    release(&source_nodes);
    release(&copy_nodes);
}

#[test]
fn engine_is_shared_across_threads() {
    let engine = Arc::new(engine());

    let workers: Vec<_> = (0..4u64)
        .map(|seed| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                let mut rng = fastrand::Rng::with_seed(seed);
                for _ in 0..10 {
                    let nodes = random_graph(&mut rng, 16);
                    let root = Value::from(nodes[0].clone());
                    let copy = engine.deep_clone(&root).unwrap();
                    assert!(engine.compare_equal(&root, &copy).unwrap());
                    release(&reachable(&nodes[0]));
                    release(&reachable(copy.as_node().unwrap()));
                }
            })
        })
        .collect();

    for worker in workers {
        worker.join().unwrap();
    }
    assert!(engine.handlers().stats().cache_hits > 0);
}
