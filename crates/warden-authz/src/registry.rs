//! Read-only key material and service chain registry
//!
//! Both stores hand out `Arc` snapshots: a verification request takes the
//! snapshot once and works against it for the whole decision, so an
//! administrative replacement mid-flight is never observed partially.
//! Replacement swaps the entire snapshot under a short write lock;
//! steady-state verification traffic only ever takes the read lock to clone
//! the `Arc`.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use warden_core::{PublicKey, Result, WardenError};

use crate::chain::ServiceChainDefinition;

/// A named public key as persisted in the key table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicKeyRecord {
    /// Name tokens use to pin this key
    pub key_name: String,

    /// The key material
    pub public_key: PublicKey,

    /// Whether unpinned tokens resolve against this key
    pub is_default: bool,
}

/// A versioned, immutable set of named public keys
///
/// Exactly one record is marked default. The ring is an explicit input to
/// token decoding rather than ambient global state, so verification stays a
/// pure function of its inputs.
#[derive(Debug, Clone)]
pub struct KeyRing {
    version: u64,
    records: Vec<PublicKeyRecord>,
    default_index: usize,
}

impl KeyRing {
    /// Build a key ring, enforcing the one-default invariant
    pub fn new(version: u64, records: Vec<PublicKeyRecord>) -> Result<Self> {
        let defaults: Vec<usize> = records
            .iter()
            .enumerate()
            .filter(|(_, r)| r.is_default)
            .map(|(i, _)| i)
            .collect();
        let default_index = match defaults.as_slice() {
            [single] => *single,
            [] => {
                return Err(WardenError::invalid_config(
                    "key ring has no default key".to_string(),
                ))
            }
            many => {
                return Err(WardenError::invalid_config(format!(
                    "key ring has {} default keys, expected exactly one",
                    many.len()
                )))
            }
        };

        let mut seen = HashMap::new();
        for record in &records {
            if seen.insert(record.key_name.clone(), ()).is_some() {
                return Err(WardenError::invalid_config(format!(
                    "duplicate key name: {}",
                    record.key_name
                )));
            }
        }

        Ok(Self {
            version,
            records,
            default_index,
        })
    }

    /// Configuration version this ring was built from
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Look up a key by name
    pub fn get(&self, key_name: &str) -> Option<&PublicKey> {
        self.records
            .iter()
            .find(|r| r.key_name == key_name)
            .map(|r| &r.public_key)
    }

    /// The key unpinned tokens resolve against
    pub fn default_key(&self) -> &PublicKey {
        &self.records[self.default_index].public_key
    }

    /// All records in the ring
    pub fn records(&self) -> &[PublicKeyRecord] {
        &self.records
    }
}

/// Shared handle to the current key ring
///
/// Reads clone an `Arc`; administrative replacement swaps the whole ring
/// atomically and is only visible to requests that start afterwards.
#[derive(Debug)]
pub struct KeyStore {
    inner: RwLock<Arc<KeyRing>>,
}

impl KeyStore {
    /// Create a store holding the given ring
    pub fn new(ring: KeyRing) -> Self {
        Self {
            inner: RwLock::new(Arc::new(ring)),
        }
    }

    /// Snapshot the current ring
    pub fn current(&self) -> Arc<KeyRing> {
        self.inner.read().clone()
    }

    /// Atomically replace the ring
    pub fn replace(&self, ring: KeyRing) {
        *self.inner.write() = Arc::new(ring);
    }
}

#[derive(Debug, Default)]
struct RegistrySnapshot {
    chains: HashMap<String, ServiceChainDefinition>,
}

/// Read-only lookup from a service name to its canonical chain definition
///
/// Absence is a normal outcome, not an error; callers branch on "service
/// not found" distinctly from "verification failed."
#[derive(Debug, Default)]
pub struct ServiceChainRegistry {
    inner: RwLock<Arc<RegistrySnapshot>>,
}

impl ServiceChainRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from chain definitions, rejecting duplicate names
    pub fn from_definitions(definitions: Vec<ServiceChainDefinition>) -> Result<Self> {
        let registry = Self::new();
        registry.replace(definitions)?;
        Ok(registry)
    }

    /// Look up the canonical chain definition for a service
    pub fn lookup(&self, service_name: &str) -> Option<ServiceChainDefinition> {
        self.inner.read().chains.get(service_name).cloned()
    }

    /// Atomically replace every definition in the registry
    ///
    /// In-flight lookups keep whichever snapshot they already took.
    pub fn replace(&self, definitions: Vec<ServiceChainDefinition>) -> Result<()> {
        let mut chains = HashMap::with_capacity(definitions.len());
        for definition in definitions {
            if chains
                .insert(definition.service_name.clone(), definition)
                .is_some()
            {
                return Err(WardenError::invalid_config(
                    "duplicate service chain definition".to_string(),
                ));
            }
        }
        *self.inner.write() = Arc::new(RegistrySnapshot { chains });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::ChainNode;
    use ed25519_dalek::SigningKey;
    use warden_core::verifying_key_from_signing;

    fn key(seed: u8) -> PublicKey {
        verifying_key_from_signing(&SigningKey::from_bytes(&[seed; 32]))
    }

    fn record(name: &str, seed: u8, is_default: bool) -> PublicKeyRecord {
        PublicKeyRecord {
            key_name: name.to_string(),
            public_key: key(seed),
            is_default,
        }
    }

    #[test]
    fn test_key_ring_requires_exactly_one_default() {
        assert!(KeyRing::new(1, vec![record("a", 1, false)]).is_err());
        assert!(KeyRing::new(1, vec![record("a", 1, true), record("b", 2, true)]).is_err());
        assert!(KeyRing::new(1, vec![record("a", 1, true), record("b", 2, false)]).is_ok());
    }

    #[test]
    fn test_key_ring_rejects_duplicate_names() {
        let result = KeyRing::new(1, vec![record("a", 1, true), record("a", 2, false)]);
        assert!(result.is_err());
    }

    #[test]
    fn test_key_ring_lookup() {
        let ring = KeyRing::new(7, vec![record("a", 1, true), record("b", 2, false)]).unwrap();
        assert_eq!(ring.version(), 7);
        assert_eq!(ring.get("b"), Some(&key(2)));
        assert_eq!(ring.get("missing"), None);
        assert_eq!(*ring.default_key(), key(1));
    }

    #[test]
    fn test_key_store_snapshot_survives_replacement() {
        let store = KeyStore::new(KeyRing::new(1, vec![record("a", 1, true)]).unwrap());
        let snapshot = store.current();

        store.replace(KeyRing::new(2, vec![record("a", 9, true)]).unwrap());

        // The old snapshot is unchanged; new requests see the new ring.
        assert_eq!(snapshot.version(), 1);
        assert_eq!(*snapshot.default_key(), key(1));
        assert_eq!(store.current().version(), 2);
    }

    #[test]
    fn test_registry_lookup_miss_is_none() {
        let registry = ServiceChainRegistry::new();
        assert!(registry.lookup("nope").is_none());
    }

    #[test]
    fn test_registry_replace_is_atomic() {
        let def = ServiceChainDefinition::new(
            "pipeline",
            vec![ChainNode {
                component: "auth_service".to_string(),
                public_key: key(3),
            }],
        );
        let registry = ServiceChainRegistry::from_definitions(vec![def.clone()]).unwrap();
        assert!(registry.lookup("pipeline").is_some());

        registry.replace(Vec::new()).unwrap();
        assert!(registry.lookup("pipeline").is_none());
    }

    #[test]
    fn test_registry_rejects_duplicate_service_names() {
        let def = ServiceChainDefinition::new("pipeline", Vec::new());
        let result = ServiceChainRegistry::from_definitions(vec![def.clone(), def]);
        assert!(result.is_err());
    }
}
