//! Token forge
//!
//! Reproduces the engine's wire format so tests can mint tokens, append
//! stage attestations with the correct signature linkage, and deliberately
//! break tokens for negative cases.

use ed25519_dalek::SigningKey;

use warden_authz::token::{AttestationBlock, AuthorityBlock, SignedBlock, TokenEnvelope};
use warden_core::{ed25519_sign, verifying_key_from_signing, Ed25519Signature, PublicKey};

/// Mints tokens signed by one issuer key
pub struct TokenForge {
    issuer: SigningKey,
    key_name: Option<String>,
}

impl std::fmt::Debug for TokenForge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenForge")
            .field("issuer", &self.issuer_public().to_hex())
            .field("key_name", &self.key_name)
            .finish()
    }
}

impl TokenForge {
    /// Forge whose tokens resolve against the key ring's default key
    pub fn new(issuer: SigningKey) -> Self {
        Self {
            issuer,
            key_name: None,
        }
    }

    /// Forge whose tokens pin a named key ring entry
    pub fn pinned(issuer: SigningKey, key_name: &str) -> Self {
        Self {
            issuer,
            key_name: Some(key_name.to_string()),
        }
    }

    /// Public key of the issuer, for building key rings
    pub fn issuer_public(&self) -> PublicKey {
        verifying_key_from_signing(&self.issuer)
    }

    /// Mint a token without expiry
    pub fn mint(&self, subject: &str, resource: &str) -> ForgedToken {
        self.mint_with_expiry(subject, resource, None)
    }

    /// Mint a token with an optional unix expiry
    pub fn mint_with_expiry(
        &self,
        subject: &str,
        resource: &str,
        expiry: Option<u64>,
    ) -> ForgedToken {
        let authority = AuthorityBlock {
            subject: subject.to_string(),
            resource: resource.to_string(),
            expiry,
            key_name: self.key_name.clone(),
        };
        let authority_bytes = authority.to_bytes().unwrap();
        let authority_signature = ed25519_sign(&self.issuer, &authority_bytes);

        ForgedToken {
            envelope: TokenEnvelope {
                authority: authority_bytes,
                authority_signature,
                attestations: Vec::new(),
            },
            last_signature: authority_signature,
        }
    }
}

/// A minted token that can accumulate stage attestations
#[derive(Debug, Clone)]
pub struct ForgedToken {
    envelope: TokenEnvelope,
    last_signature: Ed25519Signature,
}

impl ForgedToken {
    /// Append a stage attestation signed by that stage's key
    pub fn attest(mut self, component: &str, key: &SigningKey) -> Self {
        let block = AttestationBlock {
            component: component.to_string(),
            public_key: verifying_key_from_signing(key),
        };
        let payload = block.to_bytes().unwrap();
        let message = TokenEnvelope::linkage_message(&payload, &self.last_signature);
        let signature = ed25519_sign(key, &message);

        self.envelope.attestations.push(SignedBlock { payload, signature });
        self.last_signature = signature;
        self
    }

    /// The base64 text form the engine decodes
    pub fn encode(&self) -> String {
        self.envelope.encode().unwrap()
    }

    /// A copy keeping only the first `stages` attestations
    ///
    /// The linkage signs backwards, so any prefix remains valid.
    pub fn truncated(&self, stages: usize) -> Self {
        let mut copy = self.clone();
        copy.envelope.attestations.truncate(stages);
        copy.last_signature = copy
            .envelope
            .attestations
            .last()
            .map(|block| block.signature)
            .unwrap_or(copy.envelope.authority_signature);
        copy
    }

    /// Encoded token with a flipped byte in the authority block
    pub fn corrupt_authority(&self) -> String {
        let mut copy = self.clone();
        if let Some(byte) = copy.envelope.authority.first_mut() {
            *byte ^= 0xff;
        }
        copy.envelope.encode().unwrap()
    }

    /// Encoded token with a flipped byte in one attestation signature
    pub fn corrupt_link(&self, link: usize) -> String {
        let mut copy = self.clone();
        let mut bytes = copy.envelope.attestations[link].signature.to_bytes();
        bytes[0] ^= 0xff;
        copy.envelope.attestations[link].signature =
            Ed25519Signature::from_slice(&bytes).unwrap();
        copy.envelope.encode().unwrap()
    }

    /// Access the underlying envelope
    pub fn envelope(&self) -> &TokenEnvelope {
        &self.envelope
    }
}
