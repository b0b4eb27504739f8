//! Context configuration

use crate::error::{ConfluxError, Result};
use conflux_migrate::DEFAULT_VERSION_KEY;
use conflux_node::NodePath;
use serde::{Deserialize, Serialize};

/// Conflux configuration
///
/// Missing keys take their default, so an empty document is a valid
/// configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfluxConfig {
    /// Filter directive used when `RUST_LOG` is unset
    pub log_filter: String,
    /// Emit logs as JSON lines
    pub log_json: bool,
    /// Dotted path of the version marker in migrated trees
    pub version_key: String,
    /// Whether bridged maps are flagged as compressed
    pub compress_maps: bool,
}

impl ConfluxConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn with_log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = filter.into();
        self
    }

    #[inline]
    #[must_use]
    pub fn with_log_json(mut self, json: bool) -> Self {
        self.log_json = json;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_version_key(mut self, key: impl Into<String>) -> Self {
        self.version_key = key.into();
        self
    }

    #[inline]
    #[must_use]
    pub fn with_compress_maps(mut self, compress: bool) -> Self {
        self.compress_maps = compress;
        self
    }

    /// Parse a TOML document
    ///
    /// # Errors
    /// Returns [`ConfluxError::Config`] for malformed TOML and
    /// [`ConfluxError::InvalidConfig`] if the version key is not a valid path
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.version_path()?;
        Ok(config)
    }

    /// Render as a TOML document
    ///
    /// # Errors
    /// Returns error if serialization fails
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string(self)?)
    }

    /// The version key as a path
    ///
    /// # Errors
    /// Returns [`ConfluxError::InvalidConfig`] for an empty key or empty
    /// path segments
    pub fn version_path(&self) -> Result<NodePath> {
        let invalid = |message: String| ConfluxError::InvalidConfig {
            field: "version_key",
            message,
        };
        let path: NodePath = self
            .version_key
            .parse()
            .map_err(|err: conflux_node::PathError| invalid(err.to_string()))?;
        if path.is_empty() {
            return Err(invalid("the version marker cannot be the root".to_string()));
        }
        Ok(path)
    }
}

impl Default for ConfluxConfig {
    fn default() -> Self {
        Self {
            log_filter: "info".to_string(),
            log_json: false,
            version_key: DEFAULT_VERSION_KEY.to_string(),
            compress_maps: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_document_is_default() {
        assert_eq!(ConfluxConfig::from_toml_str("").unwrap(), ConfluxConfig::default());
    }

    #[test]
    fn partial_document_overrides() {
        let config = ConfluxConfig::from_toml_str(
            r#"
            version_key = "meta.version"
            compress_maps = true
            "#,
        )
        .unwrap();
        assert_eq!(config.version_key, "meta.version");
        assert!(config.compress_maps);
        assert_eq!(config.log_filter, "info");
        assert_eq!(config.version_path().unwrap().len(), 2);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            ConfluxConfig::from_toml_str("compress_maps = \"yes\""),
            Err(ConfluxError::Config(_))
        ));
        assert!(matches!(
            ConfluxConfig::from_toml_str("version_key = \"a..b\""),
            Err(ConfluxError::InvalidConfig { field: "version_key", .. })
        ));
        assert!(ConfluxConfig::new().with_version_key("").version_path().is_err());
    }

    #[test]
    fn toml_round_trip() {
        let config = ConfluxConfig::new()
            .with_log_filter("conflux=debug")
            .with_log_json(true);
        let text = config.to_toml_string().unwrap();
        assert_eq!(ConfluxConfig::from_toml_str(&text).unwrap(), config);
    }
}
