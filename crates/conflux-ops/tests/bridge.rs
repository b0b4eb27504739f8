use conflux_node::{Node, NodeOptions};
use conflux_ops::{DynamicOps, JsonOps, NodeOps, OpsError};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn counting_node_ops(counter: &Arc<AtomicUsize>) -> NodeOps {
    let counter = Arc::clone(counter);
    NodeOps::builder()
        .factory(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Node::empty()
        })
        .build()
}

fn sample() -> Node {
    Node::from_json(
        NodeOptions::default(),
        &json!({"items": {"0": {"id": "minecraft:stick", "Count": 3}}, "tags": ["a", "b"]}),
    )
    .unwrap()
}

#[test]
fn node_to_node_conversion_is_identity() {
    let created = Arc::new(AtomicUsize::new(0));
    let target = counting_node_ops(&created);

    let node = sample();
    let tags_ptr = node.child("tags").unwrap().children_list().as_ptr();

    let converted = NodeOps::new().convert_to(&target, node).unwrap();

    assert_eq!(created.load(Ordering::SeqCst), 0);
    assert_eq!(
        converted.child("tags").unwrap().children_list().as_ptr(),
        tags_ptr
    );
    assert_eq!(converted, sample());
}

#[test]
fn foreign_conversion_decomposes() {
    let created = Arc::new(AtomicUsize::new(0));
    let target = counting_node_ops(&created);

    let json = NodeOps::new().convert_to(&JsonOps, sample()).unwrap();
    let back = JsonOps.convert_to(&target, json).unwrap();

    assert!(created.load(Ordering::SeqCst) > 0);
    assert_eq!(back, sample());
}

#[test]
fn json_to_json_is_identity() {
    let value = json!({"a": [1, 2.5, "x", null, true]});
    assert_eq!(JsonOps.convert_to(&JsonOps, value.clone()).unwrap(), value);
}

#[test]
fn bridge_never_mutates_inputs() {
    let ops = NodeOps::new();
    let original = sample();
    let snapshot = original.to_json().unwrap();

    let _ = ops.set(&original, "extra", ops.create_int(1));
    let _ = ops.remove(&original, "tags");
    let _ = ops.update(&original, "items", |_| ops.create_string("gone"));
    let _ = ops.merge_to_map(&original, &ops.create_string("k"), ops.create_int(2));
    if let Ok(mut values) = ops.get_map_values(&original) {
        for (_, value) in &mut values {
            value.set("changed");
        }
    }
    if let Ok(mut items) = ops.get_stream(original.child("tags").unwrap()) {
        items[0].set("changed");
    }

    assert_eq!(original.to_json().unwrap(), snapshot);
}

#[test]
fn merge_shape_errors() {
    let ops = NodeOps::new();
    let scalar = ops.create_int(1);
    assert!(matches!(
        ops.merge_to_list(&scalar, ops.create_int(2)),
        Err(OpsError::TypeMismatch { .. })
    ));
    assert!(matches!(
        ops.merge_to_map(&scalar, &ops.create_string("k"), ops.create_int(2)),
        Err(OpsError::TypeMismatch { .. })
    ));
}

fn arb_json() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        (-1.0e6..1.0e6f64).prop_map(Value::from),
        "[a-z]{0,6}".prop_map(Value::from),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,3}", inner, 0..4)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

proptest! {
    #[test]
    fn json_through_nodes_is_lossless(value in arb_json()) {
        let node = JsonOps.convert_to(&NodeOps::new(), value.clone()).unwrap();
        let back = NodeOps::new().convert_to(&JsonOps, node).unwrap();
        prop_assert_eq!(back, value);
    }
}
