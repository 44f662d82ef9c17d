//! Service chain verification
//!
//! A pipeline has a fixed canonical ordering of stages, declared by its
//! [`ServiceChainDefinition`]. A token's attestations represent the prefix
//! of stages it has legitimately passed through, in order. Verifying a
//! component checks that the token's prefix reaches that component's
//! canonical position, so early stages are easier to satisfy than late ones.
//!
//! Every public entry point, inline descriptor or registry-backed, routes
//! through the single [`verify_chain`] function; the two paths cannot
//! diverge because there is only one path.

use serde::{Deserialize, Serialize};

use warden_core::{PublicKey, Result, WardenError};

use crate::token::VerifiedAttestation;

/// One stage of a service pipeline, bound to the key that attests it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainNode {
    /// Stage name; order within the definition is significant
    pub component: String,

    /// Public key whose attestation proves the stage was passed
    pub public_key: PublicKey,
}

/// Canonical ordered chain definition for one service
///
/// The node order *is* the canonical stage ordering; position is 1-based
/// and nothing about the stage count is hard-coded anywhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceChainDefinition {
    /// Unique service name the registry is keyed by
    pub service_name: String,

    /// Ordered pipeline stages
    pub nodes: Vec<ChainNode>,
}

impl ServiceChainDefinition {
    /// Create a definition from ordered nodes
    pub fn new(service_name: impl Into<String>, nodes: Vec<ChainNode>) -> Self {
        Self {
            service_name: service_name.into(),
            nodes,
        }
    }

    /// Parse the persisted chain format: a JSON array of
    /// `{"component": ..., "public_key": ...}` objects in pipeline order
    pub fn from_json(service_name: impl Into<String>, json: &str) -> Result<Self> {
        let nodes: Vec<ChainNode> = serde_json::from_str(json)
            .map_err(|e| WardenError::serialization(format!("chain definition: {e}")))?;
        Ok(Self::new(service_name, nodes))
    }

    /// Serialize the nodes back to the persisted JSON format
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(&self.nodes)
            .map_err(|e| WardenError::serialization(format!("chain definition: {e}")))
    }

    /// 1-based canonical position of a component, if it is a known stage
    pub fn position_of(&self, component: &str) -> Option<usize> {
        self.nodes
            .iter()
            .position(|n| n.component == component)
            .map(|i| i + 1)
    }
}

/// Verify a token's attestation prefix against a canonical stage ordering
///
/// Succeeds iff `component` appears in `canonical` at 1-based position `P`,
/// the token carries at least `P` attestations, and the first `P`
/// attestations match the canonical stage identities and keys in order.
/// The decoder already proved each attestation's signature under its
/// attested key; matching that key against the canonical node's key pins
/// the attestation to the stage the pipeline actually declared.
///
/// Pure function: same inputs always yield the same result.
pub fn verify_chain(
    canonical: &[ChainNode],
    attestations: &[VerifiedAttestation],
    component: &str,
) -> bool {
    let position = match canonical.iter().position(|n| n.component == component) {
        Some(index) => index + 1,
        None => {
            // Unknown components are never authorized.
            tracing::debug!(component, "component not in canonical chain");
            return false;
        }
    };

    if attestations.len() < position {
        tracing::debug!(
            component,
            required = position,
            present = attestations.len(),
            "attestation prefix too short"
        );
        return false;
    }

    canonical
        .iter()
        .take(position)
        .zip(attestations)
        .all(|(node, attestation)| {
            node.component == attestation.component && node.public_key == attestation.public_key
        })
}
