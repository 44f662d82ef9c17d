//! Token wire format and decoder
//!
//! A token is base64 text over a bincode envelope: one authority block
//! (subject, resource, expiry, optional pinned key name) signed by the
//! issuer, followed by ordered attestation blocks, one per pipeline stage
//! passed. Each attestation signs its own block bytes concatenated with the
//! previous signature, so a block's authenticity derives from the prior
//! block plus its declared key and the chain cannot be reordered or spliced.
//!
//! Decoding verifies the whole linkage but decides nothing: authorization
//! belongs to the evaluator and the chain verifier.

use serde::{Deserialize, Serialize};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

use warden_core::{ed25519_verify, Ed25519Signature, PublicKey, Result, WardenError};

use crate::registry::KeyRing;

/// The first block of every token: who may do what, until when
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorityBlock {
    /// Subject the token was issued to
    pub subject: String,

    /// Resource the token grants access to
    pub resource: String,

    /// Unix expiry in seconds; `None` never expires
    pub expiry: Option<u64>,

    /// Key ring entry the issuer signature resolves against;
    /// `None` resolves against the ring's default key
    pub key_name: Option<String>,
}

impl AuthorityBlock {
    /// Serialize to the exact bytes the issuer signature covers
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self)
            .map_err(|e| WardenError::serialization(format!("authority block: {e}")))
    }

    /// Parse authority block bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        bincode::deserialize(bytes)
            .map_err(|e| WardenError::invalid_token(format!("authority block: {e}")))
    }
}

/// One stage attestation: the component name and the key that signed it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttestationBlock {
    /// Pipeline stage that attested
    pub component: String,

    /// Key the attestation signature verifies under
    pub public_key: PublicKey,
}

impl AttestationBlock {
    /// Serialize to the exact bytes the attestation signature covers
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self)
            .map_err(|e| WardenError::serialization(format!("attestation block: {e}")))
    }

    /// Parse attestation block bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        bincode::deserialize(bytes)
            .map_err(|e| WardenError::invalid_token(format!("attestation block: {e}")))
    }
}

/// Serialized block bytes plus the signature that covers them
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignedBlock {
    /// Bincode-encoded block payload
    pub payload: Vec<u8>,

    /// Signature over `payload || previous signature`
    pub signature: Ed25519Signature,
}

/// The complete signed token as it travels on the wire
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenEnvelope {
    /// Bincode-encoded [`AuthorityBlock`]
    pub authority: Vec<u8>,

    /// Issuer signature over the authority bytes
    pub authority_signature: Ed25519Signature,

    /// Ordered stage attestations, one per pipeline hop
    pub attestations: Vec<SignedBlock>,
}

impl TokenEnvelope {
    /// Encode to the base64 text form callers present
    pub fn encode(&self) -> Result<String> {
        let raw = bincode::serialize(self)
            .map_err(|e| WardenError::serialization(format!("token envelope: {e}")))?;
        Ok(BASE64.encode(raw))
    }

    /// Parse base64 token text back into an envelope
    ///
    /// Structural parsing only; no signature is checked here.
    pub fn from_encoded(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(WardenError::invalid_token("empty token"));
        }
        let bytes = BASE64
            .decode(trimmed)
            .map_err(|e| WardenError::invalid_token(format!("base64: {e}")))?;
        bincode::deserialize(&bytes)
            .map_err(|e| WardenError::invalid_token(format!("envelope: {e}")))
    }

    /// The exact message an attestation signature covers
    pub fn linkage_message(payload: &[u8], previous: &Ed25519Signature) -> Vec<u8> {
        let mut message = Vec::with_capacity(payload.len() + 64);
        message.extend_from_slice(payload);
        message.extend_from_slice(&previous.to_bytes());
        message
    }
}

/// A stage attestation whose signature the decoder has already verified
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedAttestation {
    /// Pipeline stage that attested
    pub component: String,

    /// Key the attestation was proven under
    pub public_key: PublicKey,
}

/// A fully parsed and linkage-verified token
///
/// Exposes facts; never decides authorization.
#[derive(Debug, Clone)]
pub struct DecodedToken {
    /// Subject the token was issued to
    pub subject: String,

    /// Resource the token grants access to
    pub resource: String,

    /// Unix expiry in seconds, if any
    pub expiry: Option<u64>,

    /// Verified stage attestations in pipeline order
    pub attestations: Vec<VerifiedAttestation>,

    /// Stable per-block revocation identifiers (hex of each signature),
    /// authority first
    pub revocation_ids: Vec<String>,
}

/// Decode raw token text and verify its signature linkage
///
/// The issuer signature resolves against the pinned key ring entry, or the
/// ring's default key when unpinned. Attestation links verify under the key
/// declared in each block; verification stops at the first failing link.
/// Pure function of the token bytes and the ring snapshot.
pub fn decode(raw: &str, keys: &KeyRing) -> Result<DecodedToken> {
    let envelope = TokenEnvelope::from_encoded(raw)?;
    let authority = AuthorityBlock::from_bytes(&envelope.authority)?;

    let issuer_key = match &authority.key_name {
        Some(name) => keys.get(name).ok_or_else(|| {
            WardenError::invalid_token(format!("token pins unknown key: {name}"))
        })?,
        None => keys.default_key(),
    };

    ed25519_verify(issuer_key, &envelope.authority, &envelope.authority_signature).map_err(
        |_| {
            tracing::debug!(
                resource = %authority.resource,
                keyring_version = keys.version(),
                "authority signature rejected"
            );
            WardenError::invalid_token("authority signature verification failed")
        },
    )?;

    let mut attestations = Vec::with_capacity(envelope.attestations.len());
    let mut revocation_ids = vec![envelope.authority_signature.to_hex()];
    let mut previous = envelope.authority_signature;

    for (index, block) in envelope.attestations.iter().enumerate() {
        let attestation = AttestationBlock::from_bytes(&block.payload)?;
        let message = TokenEnvelope::linkage_message(&block.payload, &previous);

        if ed25519_verify(&attestation.public_key, &message, &block.signature).is_err() {
            tracing::debug!(
                component = %attestation.component,
                link = index + 1,
                "attestation signature rejected"
            );
            return Err(WardenError::chain_signature_invalid(format!(
                "link {} ({}) failed verification",
                index + 1,
                attestation.component
            )));
        }

        revocation_ids.push(block.signature.to_hex());
        previous = block.signature;
        attestations.push(VerifiedAttestation {
            component: attestation.component,
            public_key: attestation.public_key,
        });
    }

    Ok(DecodedToken {
        subject: authority.subject,
        resource: authority.resource,
        expiry: authority.expiry,
        attestations,
        revocation_ids,
    })
}
