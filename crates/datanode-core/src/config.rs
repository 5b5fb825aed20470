//! Configuration management for the datanode replica
//!
//! Sources, lowest precedence first:
//! - Hardcoded defaults
//! - `/etc/datanode/datanode.{yaml,toml,json}`
//! - `./config/datanode.{yaml,toml,json}`
//! - File named by the `DATANODE_CONFIG` environment variable
//! - `DATANODE__*` environment variables

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Upper bound accepted for the registry capacity hints.
pub const MAX_CAPACITY_HINT: usize = 1 << 20;

/// Root configuration structure for a datanode
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct DatanodeConfig {
    #[serde(default)]
    pub replica: ReplicaConfig,
}

impl DatanodeConfig {
    /// Load configuration from every source, then validate it.
    pub fn load() -> Result<Self, ConfigError> {
        let mut builder = Self::set_defaults(Config::builder())?;

        builder = builder
            .add_source(File::with_name("/etc/datanode/datanode").required(false))
            .add_source(File::with_name("./config/datanode").required(false));

        if let Ok(config_path) = std::env::var("DATANODE_CONFIG") {
            builder = builder.add_source(File::with_name(&config_path).required(false));
        }

        // Example: DATANODE__REPLICA__DUPLICATE_POLICY=tolerate
        builder = builder.add_source(
            Environment::with_prefix("DATANODE")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config: DatanodeConfig = builder.build()?.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    fn set_defaults(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        builder
            .set_default("replica.duplicate_policy", "reject")?
            .set_default("replica.collection_capacity", 16)?
            .set_default("replica.segment_capacity", 256)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.replica.validate()
    }

    /// Load configuration from a specific file path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config: DatanodeConfig = Self::set_defaults(Config::builder())?
            .add_source(File::from(path.as_ref()))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }
}

/// What the registries do when an identifier is registered twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// Fail the insert with `AlreadyExists`.
    #[default]
    Reject,
    /// Store the duplicate behind the original. Lookups, updates and
    /// removals act on the entry registered first.
    Tolerate,
}

/// Replica registry configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReplicaConfig {
    #[serde(default)]
    pub duplicate_policy: DuplicatePolicy,

    /// Initial capacity reserved for the collection set
    pub collection_capacity: usize,

    /// Initial capacity reserved for the segment set
    pub segment_capacity: usize,
}

impl Default for ReplicaConfig {
    fn default() -> Self {
        Self {
            duplicate_policy: DuplicatePolicy::Reject,
            collection_capacity: 16,
            segment_capacity: 256,
        }
    }
}

impl ReplicaConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.collection_capacity > MAX_CAPACITY_HINT {
            return Err(ConfigError::Message(format!(
                "replica.collection_capacity must be <= {}",
                MAX_CAPACITY_HINT
            )));
        }

        if self.segment_capacity > MAX_CAPACITY_HINT {
            return Err(ConfigError::Message(format!(
                "replica.segment_capacity must be <= {}",
                MAX_CAPACITY_HINT
            )));
        }

        Ok(())
    }
}
