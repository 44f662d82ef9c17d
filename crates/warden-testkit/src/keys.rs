//! Deterministic key fixtures
//!
//! Seeded Ed25519 keys so tests are reproducible, plus builders for the
//! key rings and chain definitions the engine consumes.

use ed25519_dalek::SigningKey;
use rand::rngs::OsRng;

use warden_authz::{ChainNode, KeyRing, PublicKeyRecord, ServiceChainDefinition};
use warden_core::{verifying_key_from_signing, PublicKey};

/// A deterministic Ed25519 keypair for tests
#[derive(Clone)]
pub struct KeyFixture {
    signing_key: SigningKey,
}

impl std::fmt::Debug for KeyFixture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyFixture")
            .field("public_key", &self.public_key().to_hex())
            .finish()
    }
}

impl KeyFixture {
    /// Derive a fixture from a single-byte seed
    pub fn from_seed(seed: u8) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(&[seed; 32]),
        }
    }

    /// Derive a fixture from full seed bytes
    pub fn from_seed_bytes(seed: &[u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    /// A fresh random fixture
    pub fn random() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    /// The private signing key
    pub fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }

    /// The corresponding public key
    pub fn public_key(&self) -> PublicKey {
        verifying_key_from_signing(&self.signing_key)
    }
}

/// Build a key ring from `(name, fixture, is_default)` entries
pub fn key_ring(version: u64, entries: &[(&str, &KeyFixture, bool)]) -> KeyRing {
    let records = entries
        .iter()
        .map(|(name, fixture, is_default)| PublicKeyRecord {
            key_name: name.to_string(),
            public_key: fixture.public_key(),
            is_default: *is_default,
        })
        .collect();
    KeyRing::new(version, records).unwrap()
}

/// Build a canonical chain definition from ordered `(component, fixture)` stages
pub fn chain_definition(service_name: &str, stages: &[(&str, &KeyFixture)]) -> ServiceChainDefinition {
    let nodes = stages
        .iter()
        .map(|(component, fixture)| ChainNode {
            component: component.to_string(),
            public_key: fixture.public_key(),
        })
        .collect();
    ServiceChainDefinition::new(service_name, nodes)
}
