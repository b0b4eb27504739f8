use conflux_node::{Node, NodeOptions};
use conflux_symbol::{Identifier, DEFAULT_NAMESPACE};
use proptest::prelude::*;

fn arb_identifier() -> impl Strategy<Value = Identifier> {
    ("[a-z0-9_.-]{0,8}", "[a-z0-9_./-]{1,16}")
        .prop_map(|(namespace, path)| Identifier::new(namespace, path).unwrap())
}

proptest! {
    #[test]
    fn canonical_string_round_trips(id in arb_identifier()) {
        let parsed = Identifier::parse(&id.to_canonical_string()).unwrap();
        prop_assert_eq!(parsed, id);
    }

    #[test]
    fn node_forms_round_trip(id in arb_identifier()) {
        let mut node = Node::root(NodeOptions::default());
        id.to_node(&mut node);
        prop_assert_eq!(Identifier::from_node(&node).unwrap(), id.clone());

        let mut pair = Node::empty();
        pair.append(id.namespace());
        pair.append(id.path());
        prop_assert_eq!(Identifier::from_node(&pair).unwrap(), id);
    }

    #[test]
    fn ordering_matches_canonical_strings(a in arb_identifier(), b in arb_identifier()) {
        prop_assert_eq!(a.cmp(&b), a.to_string().cmp(&b.to_string()));
    }

    #[test]
    fn uppercase_is_rejected(path in "[a-z]{0,4}[A-Z][a-z]{0,4}") {
        prop_assert!(Identifier::parse(&path).is_err());
    }
}

#[test]
fn default_namespace_is_explicit_in_canonical_form() {
    let id = Identifier::parse("stone").unwrap();
    assert_eq!(id.namespace(), DEFAULT_NAMESPACE);
    assert_eq!(id.to_canonical_string(), format!("{DEFAULT_NAMESPACE}:stone"));
}

#[test]
fn serde_uses_canonical_string() {
    let id: Identifier = serde_json::from_str("\"ns:item\"").unwrap();
    assert_eq!(serde_json::to_string(&id).unwrap(), "\"ns:item\"");
    assert!(serde_json::from_str::<Identifier>("\"NS:item\"").is_err());
}
