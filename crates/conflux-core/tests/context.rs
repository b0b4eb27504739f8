use conflux_core::{Conflux, ConfluxConfig, ConfluxError};
use conflux_migrate::{MigrationOutcome, PathPattern};
use conflux_node::NodePath;
use conflux_ops::{DynamicOps, JsonOps, ListCodec, StringCodec};
use conflux_symbol::{ReferenceSet, RegistryRef, SymbolError};
use conflux_test_utils::{
    block_key, id, item_key, sample_conflux, sample_items, Block, DoublingEngine, Item,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::json;
use std::sync::Arc;

#[test]
fn registry_members_round_trip() -> anyhow::Result<()> {
    let conflux = sample_conflux();

    let node = conflux.parse_json(r#""minecraft:oak_log""#)?;
    assert_eq!(node.get_as::<Item>()?, Item(17));

    let mut out = conflux.empty_node();
    out.set_as(&Block(3))?;
    assert_eq!(out.to_json()?, json!("minecraft:dirt"));
    Ok(())
}

#[test]
fn unknown_member_is_not_found() -> anyhow::Result<()> {
    let conflux = sample_conflux();
    let err = conflux
        .parse_json(r#""minecraft:diamond""#)?
        .get_as::<Item>()
        .unwrap_err();
    assert!(matches!(
        err.source_as::<SymbolError>(),
        Some(SymbolError::NotFound { .. })
    ));
    Ok(())
}

#[test]
fn reference_sets_resolve_and_keep_shape() -> anyhow::Result<()> {
    let conflux = sample_conflux();
    let input = json!(["minecraft:stick", {"id": "#minecraft:fuel", "required": false}]);
    let node = conflux.adopt(conflux_test_utils::tree(input.clone()));

    let set = node.get_as::<ReferenceSet<Item>>()?;
    assert_eq!(
        set.resolve()?,
        &[Item(280), Item(17), Item(18), Item(263)][..]
    );

    let mut out = conflux.empty_node();
    out.set_as(&set)?;
    assert_eq!(out.to_json()?, input);
    Ok(())
}

#[test]
fn absent_reference_set_is_empty() -> anyhow::Result<()> {
    let conflux = sample_conflux();
    let set = conflux.empty_node().get_as::<ReferenceSet<Item>>()?;
    assert!(set.resolve()?.is_empty());
    Ok(())
}

#[test]
fn registry_refs_check_membership() -> anyhow::Result<()> {
    let conflux = sample_conflux();

    let reference = conflux
        .parse_json(r#""dirt""#)?
        .get_as::<RegistryRef<Block>>()?;
    assert_eq!(reference.id(), &id("dirt"));
    assert_eq!(conflux.access().resolve_ref(&reference)?, Block(3));

    assert!(conflux
        .parse_json(r#""minecraft:lava""#)?
        .get_as::<RegistryRef<Block>>()
        .is_err());
    Ok(())
}

#[test]
fn late_publication_is_retryable() -> anyhow::Result<()> {
    let conflux = Conflux::builder().register_tagged_registry(item_key()).build()?;
    let node = conflux.parse_json(r#""minecraft:coal""#)?;

    let err = ConfluxError::from(node.get_as::<Item>().unwrap_err());
    assert!(err.is_retryable());

    conflux.publish::<Item>(Arc::new(sample_items()));
    assert_eq!(node.get_as::<Item>()?, Item(263));
    Ok(())
}

#[test]
fn manifest_keeps_first_declaration() -> anyhow::Result<()> {
    let conflux = Conflux::builder()
        .register_registry(item_key())
        .register_tagged_registry(item_key())
        .register_registry(block_key())
        .build()?;

    let manifest = conflux.manifest();
    assert_eq!(manifest.len(), 2);
    assert_eq!(manifest[0].registry(), &id("item"));
    assert!(!manifest[0].is_tagged());
    assert!(!conflux.serializers().contains::<ReferenceSet<Item>>());
    assert!(conflux.serializers().contains::<RegistryRef<Item>>());
    Ok(())
}

#[test]
fn configuration_flows_into_bridge_and_migration() -> anyhow::Result<()> {
    let config = ConfluxConfig::from_toml_str(
        r#"
        version_key = "meta.version"
        compress_maps = true
        "#,
    )?;
    let conflux = Conflux::builder().config(config).build()?;
    assert!(conflux.ops().compress_maps());

    let engine = Arc::new(DoublingEngine::new(2));
    let migration = conflux
        .migration(engine.clone())
        .add_path_rule("item", "items.*".parse::<PathPattern>()?)
        .build()?;
    assert_eq!(migration.target_version(), 2);

    let mut node = conflux.parse_json(r#"{"items": [{"id": "minecraft:stick", "Count": 4}]}"#)?;
    assert_eq!(
        migration.migrate(&mut node)?,
        MigrationOutcome::Migrated { from: -1, to: 2 }
    );
    assert_eq!(migration.migrate(&mut node)?, MigrationOutcome::Current);
    assert_eq!(engine.calls(), 1);

    let version_path: NodePath = "meta.version".parse()?;
    assert_eq!(node.at(&version_path).and_then(|n| n.as_i32()), Some(2));
    assert_eq!(
        conflux.wrap(node).convert(JsonOps)?.into_value(),
        json!({"items": [{"id": "minecraft:stick", "Count": 8}], "meta": {"version": 2}})
    );
    Ok(())
}

#[test]
fn codecs_register_as_serializers() -> anyhow::Result<()> {
    let conflux = Conflux::builder()
        .codec::<Vec<String>, _>(ListCodec::new(StringCodec))
        .build()?;

    let node = conflux.parse_json(r#"["a", "b"]"#)?;
    assert_eq!(node.get_as::<Vec<String>>()?, vec!["a".to_string(), "b".to_string()]);
    Ok(())
}

#[test]
fn invalid_version_key_fails_build() {
    let result = Conflux::builder()
        .config(ConfluxConfig::new().with_version_key("a..b"))
        .build();
    assert!(matches!(result, Err(ConfluxError::InvalidConfig { .. })));
}

proptest! {
    #[test]
    fn config_survives_toml(
        filter in "[a-z]{1,8}(=(debug|info|warn))?",
        key in "[a-z]{1,5}(\\.[a-z]{1,5}){0,2}",
        json_logs in any::<bool>(),
        compress in any::<bool>(),
    ) {
        let config = ConfluxConfig::new()
            .with_log_filter(filter)
            .with_version_key(key)
            .with_log_json(json_logs)
            .with_compress_maps(compress);
        let text = config.to_toml_string().unwrap();
        prop_assert_eq!(ConfluxConfig::from_toml_str(&text).unwrap(), config);
    }
}
