//! Engine configuration loading
//!
//! Administrative collaborators persist a key table `{key_name, public_key,
//! is_default}` and a chain registry table `{service_name,
//! chain_definition}` where `chain_definition` is the serialized JSON node
//! list. This module reads the same shapes from a TOML file and builds the
//! engine's key ring and registry from them; the one-default-key invariant
//! is enforced at load.

use std::path::Path;

use serde::Deserialize;

use warden_core::{PublicKey, Result, WardenError};

use crate::chain::ServiceChainDefinition;
use crate::registry::{KeyRing, PublicKeyRecord, ServiceChainRegistry};

/// One row of the key table
#[derive(Debug, Clone, Deserialize)]
pub struct KeyEntry {
    /// Name tokens pin this key by
    pub key_name: String,

    /// Hex-encoded Ed25519 public key
    pub public_key: String,

    /// Whether unpinned tokens resolve against this key
    #[serde(default)]
    pub is_default: bool,
}

/// One row of the chain registry table
#[derive(Debug, Clone, Deserialize)]
pub struct ChainEntry {
    /// Service the chain governs
    pub service_name: String,

    /// JSON array of `{component, public_key}` objects in pipeline order
    pub chain_definition: String,
}

/// Parsed engine configuration file
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Configuration version, carried into the key ring
    #[serde(default)]
    pub version: u64,

    /// Key table rows
    #[serde(default)]
    pub keys: Vec<KeyEntry>,

    /// Chain registry rows
    #[serde(default)]
    pub chains: Vec<ChainEntry>,
}

impl EngineConfig {
    /// Parse configuration from TOML text
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| WardenError::invalid_config(format!("config: {e}")))
    }

    /// Read and parse a configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            WardenError::invalid_config(format!("read {}: {e}", path.display()))
        })?;
        Self::from_toml(&text)
    }

    /// Build the key ring declared by this configuration
    pub fn key_ring(&self) -> Result<KeyRing> {
        let records = self
            .keys
            .iter()
            .map(|entry| {
                Ok(PublicKeyRecord {
                    key_name: entry.key_name.clone(),
                    public_key: PublicKey::from_hex(&entry.public_key).map_err(|e| {
                        WardenError::invalid_config(format!("key {}: {e}", entry.key_name))
                    })?,
                    is_default: entry.is_default,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        KeyRing::new(self.version, records)
    }

    /// Parse every chain definition declared by this configuration
    pub fn chain_definitions(&self) -> Result<Vec<ServiceChainDefinition>> {
        self.chains
            .iter()
            .map(|entry| {
                ServiceChainDefinition::from_json(&entry.service_name, &entry.chain_definition)
                    .map_err(|e| {
                        WardenError::invalid_config(format!(
                            "chain {}: {e}",
                            entry.service_name
                        ))
                    })
            })
            .collect()
    }
}

/// Load a configuration file into a ready key ring and registry
pub fn load_engine_config(path: impl AsRef<Path>) -> Result<(KeyRing, ServiceChainRegistry)> {
    let config = EngineConfig::from_file(path)?;
    let ring = config.key_ring()?;
    let registry = ServiceChainRegistry::from_definitions(config.chain_definitions()?)?;
    tracing::debug!(
        version = ring.version(),
        keys = ring.records().len(),
        "engine configuration loaded"
    );
    Ok((ring, registry))
}
