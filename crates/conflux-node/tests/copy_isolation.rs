use conflux_node::{Node, NodeOptions, NodePath, NodeValue};
use proptest::prelude::*;
use serde_json::{json, Value};

fn arb_json() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i32>().prop_map(Value::from),
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

#[derive(Debug, Clone)]
enum Mutation {
    SetRoot(i32),
    SetChild(String, String),
    Append(bool),
    RemoveChild(String),
    Clear,
}

fn arb_mutation() -> impl Strategy<Value = Mutation> {
    prop_oneof![
        any::<i32>().prop_map(Mutation::SetRoot),
        ("[a-z]{1,3}", "[a-z]{0,4}").prop_map(|(k, v)| Mutation::SetChild(k, v)),
        any::<bool>().prop_map(Mutation::Append),
        "[a-z]{1,3}".prop_map(Mutation::RemoveChild),
        Just(Mutation::Clear),
    ]
}

fn apply(node: &mut Node, mutation: &Mutation) {
    match mutation {
        Mutation::SetRoot(v) => {
            node.set(*v);
        }
        Mutation::SetChild(k, v) => {
            node.child_or_insert(k).set(v.as_str());
        }
        Mutation::Append(b) => {
            node.append(*b);
        }
        Mutation::RemoveChild(k) => {
            node.remove_child(k);
        }
        Mutation::Clear => {
            node.set(NodeValue::Null);
        }
    }
}

proptest! {
    #[test]
    fn mutating_a_copy_never_changes_the_original(
        value in arb_json(),
        mutations in prop::collection::vec(arb_mutation(), 1..6),
    ) {
        let original = Node::from_json(NodeOptions::default(), &value).unwrap();
        let snapshot = original.to_json().unwrap();

        let mut copy = original.copy();
        for mutation in &mutations {
            apply(&mut copy, mutation);
        }

        prop_assert_eq!(original.to_json().unwrap(), snapshot);
    }

    #[test]
    fn json_conversion_is_lossless(value in arb_json()) {
        let node = Node::from_json(NodeOptions::default(), &value).unwrap();
        prop_assert_eq!(node.to_json().unwrap(), value);
    }
}

#[test]
fn nested_copy_mutation_is_isolated() {
    let original = Node::from_json(
        NodeOptions::default(),
        &json!({"items": {"0": {"id": "minecraft:stick", "Count": 3}}}),
    )
    .unwrap();

    let path: NodePath = "items.0.Count".parse().unwrap();
    let mut copy = original.copy();
    copy.at_mut(&path).unwrap().set(6);

    assert_eq!(original.at(&path).and_then(Node::as_i32), Some(3));
    assert_eq!(copy.at(&path).and_then(Node::as_i32), Some(6));
}
