//! The Conflux context
//!
//! A [`Conflux`] is built once during host startup. The host declares every
//! registry it wants serializers for (the manifest), optionally publishes
//! registry snapshots, and then hands the context's [`NodeOptions`] and
//! [`NodeOps`] to format loaders and migration code. Registry snapshots can
//! also be published after the context is built; serializers look them up
//! when they run.

use crate::config::ConfluxConfig;
use crate::error::Result;
use crate::logging;
use conflux_migrate::{MigrationEngine, VersionedTransformationBuilder};
use conflux_node::{
    Node, NodeOptions, NodePath, SerializerCollection, SerializerCollectionBuilder, TypeSerializer,
};
use conflux_ops::{Codec, CodecSerializer, Dynamic, NodeOps};
use conflux_symbol::{
    Identifier, IdentifierSerializer, ReferenceSet, ReferenceSetSerializer, Registry,
    RegistryAccess, RegistryKey, RegistryRef, RegistryRefSerializer, RegistrySerializer,
};
use std::fmt;
use std::sync::Arc;

/// One declared registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    registry: Identifier,
    value_type: &'static str,
    tagged: bool,
}

impl ManifestEntry {
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &Identifier {
        &self.registry
    }

    /// Rust type name of the registry's values
    #[inline]
    #[must_use]
    pub fn value_type(&self) -> &'static str {
        self.value_type
    }

    /// True if reference sets of this registry have a serializer
    #[inline]
    #[must_use]
    pub fn is_tagged(&self) -> bool {
        self.tagged
    }
}

/// Serializers, registries and settings shared by one host
pub struct Conflux {
    config: ConfluxConfig,
    version_path: NodePath,
    access: Arc<RegistryAccess>,
    serializers: Arc<SerializerCollection>,
    manifest: Vec<ManifestEntry>,
}

impl Conflux {
    #[inline]
    #[must_use]
    pub fn builder() -> ConfluxBuilder {
        ConfluxBuilder::default()
    }

    /// Builder publishing into an existing registry table
    #[must_use]
    pub fn builder_with_access(access: Arc<RegistryAccess>) -> ConfluxBuilder {
        ConfluxBuilder {
            access,
            ..ConfluxBuilder::default()
        }
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &ConfluxConfig {
        &self.config
    }

    #[inline]
    #[must_use]
    pub fn access(&self) -> &Arc<RegistryAccess> {
        &self.access
    }

    #[inline]
    #[must_use]
    pub fn serializers(&self) -> &Arc<SerializerCollection> {
        &self.serializers
    }

    /// Declared registries, in declaration order
    #[inline]
    #[must_use]
    pub fn manifest(&self) -> &[ManifestEntry] {
        &self.manifest
    }

    #[must_use]
    pub fn is_declared(&self, registry: &Identifier) -> bool {
        self.manifest.iter().any(|entry| &entry.registry == registry)
    }

    /// Publish or replace a registry snapshot
    ///
    /// Returns `true` if a snapshot for the same registry was replaced.
    pub fn publish<T: 'static>(&self, registry: Arc<dyn Registry<T>>) -> bool {
        let id = registry.key().id().clone();
        if !self.is_declared(&id) {
            tracing::warn!(registry = %id, "published registry has no serializers");
        }
        self.access.insert(registry)
    }

    /// Options carrying this context's serializers
    #[must_use]
    pub fn node_options(&self) -> NodeOptions {
        NodeOptions::from_serializers(Arc::clone(&self.serializers))
    }

    /// Empty root node with this context's options
    #[must_use]
    pub fn empty_node(&self) -> Node {
        Node::root(self.node_options())
    }

    /// Move `node` under this context's options
    #[must_use]
    pub fn adopt(&self, node: Node) -> Node {
        Node::with_value(self.node_options(), node)
    }

    /// Parse JSON text into a tree using this context's options
    ///
    /// # Errors
    /// Returns error if the text is not valid JSON
    pub fn parse_json(&self, text: &str) -> Result<Node> {
        Ok(self.adopt(Node::from_json_str(text)?))
    }

    /// Parse YAML text into a tree using this context's options
    ///
    /// # Errors
    /// Returns error if the text is not valid YAML
    pub fn parse_yaml(&self, text: &str) -> Result<Node> {
        Ok(self.adopt(Node::from_yaml_str(text)?))
    }

    /// Bridge producing nodes with this context's options
    #[must_use]
    pub fn ops(&self) -> NodeOps {
        NodeOps::builder()
            .factory_from_serializers(Arc::clone(&self.serializers))
            .compressed(self.config.compress_maps)
            .build()
    }

    /// Pair `node` with [`Self::ops`]
    #[must_use]
    pub fn wrap(&self, node: Node) -> Dynamic<NodeOps> {
        Dynamic::new(self.ops(), node)
    }

    /// Migration builder using `engine` and the configured version key
    #[must_use]
    pub fn migration(&self, engine: Arc<dyn MigrationEngine>) -> VersionedTransformationBuilder {
        conflux_migrate::VersionedTransformation::builder()
            .engine(engine)
            .version_path(self.version_path.clone())
    }

    /// Install the global tracing subscriber described by the configuration
    pub fn init_logging(&self) -> bool {
        logging::init_from_config(&self.config)
    }
}

impl fmt::Debug for Conflux {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Conflux")
            .field("config", &self.config)
            .field("registries", &self.manifest.len())
            .field("published", &self.access.len())
            .finish()
    }
}

/// Builder for [`Conflux`]
pub struct ConfluxBuilder {
    config: ConfluxConfig,
    access: Arc<RegistryAccess>,
    serializers: SerializerCollectionBuilder,
    manifest: Vec<ManifestEntry>,
}

impl Default for ConfluxBuilder {
    fn default() -> Self {
        Self {
            config: ConfluxConfig::default(),
            access: Arc::new(RegistryAccess::new()),
            serializers: SerializerCollection::builder().register::<Identifier>(IdentifierSerializer),
            manifest: Vec::new(),
        }
    }
}

impl ConfluxBuilder {
    #[must_use]
    pub fn config(mut self, config: ConfluxConfig) -> Self {
        self.config = config;
        self
    }

    /// Declare a registry: its values and references get serializers
    ///
    /// Declaring the same registry twice keeps the first declaration.
    #[must_use]
    pub fn register_registry<T: 'static>(self, key: RegistryKey<T>) -> Self {
        self.declare(key, false)
    }

    /// Declare a registry whose reference sets are also serializable
    #[must_use]
    pub fn register_tagged_registry<T>(self, key: RegistryKey<T>) -> Self
    where
        T: Clone + PartialEq + 'static,
    {
        if self.is_declared(key.id()) {
            tracing::debug!(registry = %key, "registry already declared");
            return self;
        }
        let access = Arc::clone(&self.access);
        let mut builder = self.declare(key.clone(), true);
        builder
            .serializers
            .insert::<ReferenceSet<T>>(Arc::new(ReferenceSetSerializer::from_access(access, key)));
        builder
    }

    /// Declare and publish a registry in one step
    #[must_use]
    pub fn with_registry<T>(self, registry: Arc<dyn Registry<T>>) -> Self
    where
        T: Clone + PartialEq + 'static,
    {
        let builder = self.register_tagged_registry(registry.key().clone());
        builder.access.insert(registry);
        builder
    }

    /// Register an additional serializer
    #[must_use]
    pub fn serializer<T: 'static>(mut self, serializer: impl TypeSerializer<T> + 'static) -> Self {
        self.serializers = self.serializers.register::<T>(serializer);
        self
    }

    /// Register a codec-backed serializer for `T`
    #[must_use]
    pub fn codec<T, C>(self, codec: C) -> Self
    where
        T: 'static,
        C: Codec<T> + 'static,
    {
        self.serializer::<T>(CodecSerializer::new(codec))
    }

    /// # Errors
    /// Returns [`crate::ConfluxError::InvalidConfig`] if the configured
    /// version key is not a usable path
    pub fn build(self) -> Result<Conflux> {
        let version_path = self.config.version_path()?;

        for id in self.access.keys() {
            if !self.is_declared(&id) {
                tracing::warn!(registry = %id, "published registry has no serializers");
            }
        }
        tracing::info!(
            registries = self.manifest.len(),
            published = self.access.len(),
            "conflux context ready"
        );

        Ok(Conflux {
            config: self.config,
            version_path,
            access: self.access,
            serializers: Arc::new(self.serializers.build()),
            manifest: self.manifest,
        })
    }

    fn is_declared(&self, registry: &Identifier) -> bool {
        self.manifest.iter().any(|entry| &entry.registry == registry)
    }

    fn declare<T: 'static>(mut self, key: RegistryKey<T>, tagged: bool) -> Self {
        if self.is_declared(key.id()) {
            tracing::debug!(registry = %key, "registry already declared");
            return self;
        }
        tracing::debug!(registry = %key, tagged, "registering registry serializers");

        self.manifest.push(ManifestEntry {
            registry: key.id().clone(),
            value_type: std::any::type_name::<T>(),
            tagged,
        });
        self.serializers.insert::<T>(Arc::new(RegistrySerializer::new(
            Arc::clone(&self.access),
            key.clone(),
        )));
        self.serializers.insert::<RegistryRef<T>>(Arc::new(RegistryRefSerializer::new(
            Arc::clone(&self.access),
            key,
        )));
        self
    }
}
