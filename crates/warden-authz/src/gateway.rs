//! Access gateway: the public decision surface
//!
//! Composes the decoder, the base evaluator, and the chain verifier into
//! the operations callers actually invoke, and decides what payload
//! (content or access level) to release. Decisions are tagged values, not
//! rows with nullable fields: `Denied` carries nothing and `Authorized`
//! always carries its payload, so no mixed state can exist.
//!
//! Each request moves through Received → Decoded → BaseVerified →
//! {ChainVerified | ChainSkipped} → Decided. Nothing is cached across
//! requests; a decode failure surfaces as an explicit error rather than a
//! silent deny.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use warden_core::{unix_now, Result, WardenError};

use crate::chain::{verify_chain, ChainNode};
use crate::evaluator;
use crate::registry::{KeyStore, ServiceChainRegistry};
use crate::token::{self, DecodedToken};

/// Outcome of an access request
///
/// Replaces the row-with-nullable-payload convention: the payload exists
/// exactly when the request was authorized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccessDecision<T> {
    /// Access denied; no payload is released
    Denied,

    /// Access granted with the released payload
    Authorized(T),
}

impl<T> AccessDecision<T> {
    /// Whether the request was authorized
    pub fn is_authorized(&self) -> bool {
        matches!(self, AccessDecision::Authorized(_))
    }

    /// Borrow the released payload, if any
    pub fn payload(&self) -> Option<&T> {
        match self {
            AccessDecision::Authorized(payload) => Some(payload),
            AccessDecision::Denied => None,
        }
    }

    /// Consume the decision and take the payload, if any
    pub fn into_payload(self) -> Option<T> {
        match self {
            AccessDecision::Authorized(payload) => Some(payload),
            AccessDecision::Denied => None,
        }
    }
}

/// Service access outcome, with the chain verdict when chains applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceAccess {
    /// The access decision and released access level
    pub decision: AccessDecision<String>,

    /// `Some` only when the resource is chain-governed; `None` means chain
    /// semantics were skipped (including when base verification failed)
    pub chain_verified: Option<bool>,
}

/// Read-only payload source for protected resources and services
///
/// Owned by the persistence collaborator; the engine only reads it.
pub trait ResourceStore {
    /// Content released when resource access is authorized
    fn content(&self, resource: &str) -> Option<Vec<u8>>;

    /// Access level released when service access is authorized
    fn access_level(&self, resource: &str) -> Option<String>;
}

/// In-memory [`ResourceStore`]
#[derive(Debug, Clone, Default)]
pub struct MemoryResourceStore {
    contents: HashMap<String, Vec<u8>>,
    access_levels: HashMap<String, String>,
}

impl MemoryResourceStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Register content for a protected resource
    pub fn insert_content(&mut self, resource: impl Into<String>, content: impl Into<Vec<u8>>) {
        self.contents.insert(resource.into(), content.into());
    }

    /// Register the access level for a service
    pub fn insert_access_level(&mut self, resource: impl Into<String>, level: impl Into<String>) {
        self.access_levels.insert(resource.into(), level.into());
    }
}

impl ResourceStore for MemoryResourceStore {
    fn content(&self, resource: &str) -> Option<Vec<u8>> {
        self.contents.get(resource).cloned()
    }

    fn access_level(&self, resource: &str) -> Option<String> {
        self.access_levels.get(resource).cloned()
    }
}

/// The engine's public decision surface
///
/// Holds the read-only key store, the chain registry, and the payload
/// store. Every operation is stateless across requests; concurrent calls
/// share nothing but the snapshot handles.
pub struct AccessGateway<S: ResourceStore> {
    keys: KeyStore,
    registry: ServiceChainRegistry,
    store: S,
}

impl<S: ResourceStore> AccessGateway<S> {
    /// Create a gateway over the given key store, registry, and payloads
    pub fn new(keys: KeyStore, registry: ServiceChainRegistry, store: S) -> Self {
        Self {
            keys,
            registry,
            store,
        }
    }

    /// Key store handle, for administrative replacement
    pub fn key_store(&self) -> &KeyStore {
        &self.keys
    }

    /// Chain registry handle, for administrative replacement
    pub fn registry(&self) -> &ServiceChainRegistry {
        &self.registry
    }

    /// Decode and base-verify; `Ok(None)` means a plain deny
    fn base_verified(
        &self,
        token: &str,
        subject: &str,
        resource: &str,
    ) -> Result<Option<DecodedToken>> {
        let keys = self.keys.current();
        let decoded = token::decode(token, &keys)?;
        tracing::debug!(resource = %decoded.resource, stage = "decoded", "token decoded");

        if !evaluator::verify(&decoded, subject, resource, unix_now()) {
            tracing::debug!(stage = "decided", authorized = false, "base verification failed");
            return Ok(None);
        }
        tracing::debug!(stage = "base_verified", "base verification passed");
        Ok(Some(decoded))
    }

    /// Single-hop verification: subject, resource, expiry
    pub fn verify_token(&self, token: &str, subject: &str, resource: &str) -> Result<bool> {
        Ok(self.base_verified(token, subject, resource)?.is_some())
    }

    /// Verify a token against an inline chain descriptor and target stage
    ///
    /// The descriptor is the caller-supplied canonical ordering. This and
    /// [`verify_service_chain_by_name`](Self::verify_service_chain_by_name)
    /// route through the same [`verify_chain`] routine, so equal chain
    /// content yields identical decisions on either path.
    pub fn verify_service_chain(
        &self,
        token: &str,
        subject: &str,
        resource: &str,
        chain: &[ChainNode],
        component: &str,
    ) -> Result<bool> {
        let decoded = match self.base_verified(token, subject, resource)? {
            Some(decoded) => decoded,
            None => return Ok(false),
        };

        let verified = verify_chain(chain, &decoded.attestations, component);
        tracing::debug!(
            stage = "decided",
            component,
            authorized = verified,
            "chain verification complete"
        );
        Ok(verified)
    }

    /// Verify a token against the registry-resolved chain for `resource`
    ///
    /// A missing chain definition is [`WardenError::ServiceNotFound`],
    /// distinct from a failed verification.
    pub fn verify_service_chain_by_name(
        &self,
        token: &str,
        subject: &str,
        resource: &str,
        component: &str,
    ) -> Result<bool> {
        let definition = self
            .registry
            .lookup(resource)
            .ok_or_else(|| WardenError::service_not_found(resource))?;
        self.verify_service_chain(token, subject, resource, &definition.nodes, component)
    }

    /// Base-verify and release the protected resource's content
    pub fn resource_access(
        &self,
        token: &str,
        subject: &str,
        resource: &str,
    ) -> Result<AccessDecision<Vec<u8>>> {
        match self.base_verified(token, subject, resource)? {
            Some(_) => {
                let content = self
                    .store
                    .content(resource)
                    .ok_or_else(|| WardenError::missing_payload(resource))?;
                Ok(AccessDecision::Authorized(content))
            }
            None => Ok(AccessDecision::Denied),
        }
    }

    /// Base-verify and release the service's access level (no chain check)
    pub fn service_access(
        &self,
        token: &str,
        subject: &str,
        resource: &str,
    ) -> Result<AccessDecision<String>> {
        match self.base_verified(token, subject, resource)? {
            Some(_) => {
                let level = self
                    .store
                    .access_level(resource)
                    .ok_or_else(|| WardenError::missing_payload(resource))?;
                Ok(AccessDecision::Authorized(level))
            }
            None => Ok(AccessDecision::Denied),
        }
    }

    /// Service access with registry-backed chain verification
    ///
    /// Chain semantics apply iff the registry has a definition for
    /// `resource`; otherwise the base decision stands alone and
    /// `chain_verified` is absent. A token failing base verification is
    /// never reported chain-verified.
    pub fn service_access_with_chain(
        &self,
        token: &str,
        subject: &str,
        resource: &str,
        component: &str,
    ) -> Result<ServiceAccess> {
        let decoded = match self.base_verified(token, subject, resource)? {
            Some(decoded) => decoded,
            None => {
                return Ok(ServiceAccess {
                    decision: AccessDecision::Denied,
                    chain_verified: None,
                })
            }
        };

        match self.registry.lookup(resource) {
            None => {
                tracing::debug!(stage = "chain_skipped", resource, "resource not chain-governed");
                let level = self
                    .store
                    .access_level(resource)
                    .ok_or_else(|| WardenError::missing_payload(resource))?;
                Ok(ServiceAccess {
                    decision: AccessDecision::Authorized(level),
                    chain_verified: None,
                })
            }
            Some(definition) => {
                let verified = verify_chain(&definition.nodes, &decoded.attestations, component);
                tracing::debug!(
                    stage = "decided",
                    component,
                    chain_verified = verified,
                    "chain-governed service access"
                );
                if verified {
                    let level = self
                        .store
                        .access_level(resource)
                        .ok_or_else(|| WardenError::missing_payload(resource))?;
                    Ok(ServiceAccess {
                        decision: AccessDecision::Authorized(level),
                        chain_verified: Some(true),
                    })
                } else {
                    Ok(ServiceAccess {
                        decision: AccessDecision::Denied,
                        chain_verified: Some(false),
                    })
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_payload_discipline() {
        let denied: AccessDecision<String> = AccessDecision::Denied;
        assert!(!denied.is_authorized());
        assert!(denied.payload().is_none());

        let granted = AccessDecision::Authorized("read".to_string());
        assert!(granted.is_authorized());
        assert_eq!(granted.payload().map(String::as_str), Some("read"));
        assert_eq!(granted.into_payload().as_deref(), Some("read"));
    }

    #[test]
    fn test_memory_store_lookup() {
        let mut store = MemoryResourceStore::new();
        store.insert_content("order-pipeline", b"payload".to_vec());
        store.insert_access_level("order-pipeline", "write");

        assert_eq!(store.content("order-pipeline").as_deref(), Some(&b"payload"[..]));
        assert_eq!(store.access_level("order-pipeline").as_deref(), Some("write"));
        assert!(store.content("other").is_none());
        assert!(store.access_level("other").is_none());
    }
}
