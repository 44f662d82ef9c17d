//! Ed25519 key and signature wrappers
//!
//! Thin abstractions over `ed25519-dalek` used everywhere the engine signs
//! or verifies. Public keys carry a canonical lowercase-hex text form, which
//! is also how they appear in persisted chain definitions and key tables.

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};

use crate::errors::WardenError;

/// Ed25519 signature in its 64-byte wire form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ed25519Signature(pub Signature);

impl Ed25519Signature {
    /// Parse a signature from a 64-byte slice
    pub fn from_slice(bytes: &[u8]) -> Result<Self, WardenError> {
        let sig_bytes: [u8; 64] = bytes.try_into().map_err(|_| {
            WardenError::crypto(format!("signature must be 64 bytes, got {}", bytes.len()))
        })?;
        Ok(Ed25519Signature(Signature::from_bytes(&sig_bytes)))
    }

    /// Get signature as bytes
    pub fn to_bytes(&self) -> [u8; 64] {
        self.0.to_bytes()
    }

    /// Lowercase-hex text form, used as a stable revocation identifier
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }
}

/// Ed25519 public key with a canonical hex text form
///
/// Serializes as a lowercase-hex string so it can live directly inside the
/// JSON chain-definition format and TOML key tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublicKey(VerifyingKey);

impl PublicKey {
    /// Create a public key from raw bytes
    pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self, WardenError> {
        VerifyingKey::from_bytes(bytes)
            .map(PublicKey)
            .map_err(|e| WardenError::crypto(format!("Invalid public key: {e}")))
    }

    /// Parse a public key from its hex text form
    pub fn from_hex(s: &str) -> Result<Self, WardenError> {
        let raw = hex::decode(s.trim())
            .map_err(|e| WardenError::crypto(format!("Invalid public key hex: {e}")))?;
        let bytes: [u8; 32] = raw.as_slice().try_into().map_err(|_| {
            WardenError::crypto(format!(
                "Invalid public key length: expected 32 bytes, got {}",
                raw.len()
            ))
        })?;
        Self::from_bytes(&bytes)
    }

    /// Get the raw key bytes
    pub fn to_bytes(&self) -> [u8; 32] {
        self.0.to_bytes()
    }

    /// Lowercase-hex text form
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Access the underlying verifying key
    pub fn verifying_key(&self) -> &VerifyingKey {
        &self.0
    }
}

impl std::fmt::Display for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Serialize for PublicKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        PublicKey::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Sign data with Ed25519
pub fn ed25519_sign(signing_key: &SigningKey, data: &[u8]) -> Ed25519Signature {
    Ed25519Signature(signing_key.sign(data))
}

/// Verify an Ed25519 signature
pub fn ed25519_verify(
    public_key: &PublicKey,
    data: &[u8],
    signature: &Ed25519Signature,
) -> Result<(), WardenError> {
    public_key
        .verifying_key()
        .verify(data, &signature.0)
        .map_err(|e| WardenError::crypto(e.to_string()))
}

/// Get the public key corresponding to a signing key
pub fn verifying_key_from_signing(signing_key: &SigningKey) -> PublicKey {
    PublicKey(signing_key.verifying_key())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;

    #[test]
    fn test_sign_and_verify() {
        let signing = SigningKey::generate(&mut OsRng);
        let public = verifying_key_from_signing(&signing);

        let sig = ed25519_sign(&signing, b"payload");
        assert!(ed25519_verify(&public, b"payload", &sig).is_ok());
        assert!(ed25519_verify(&public, b"tampered", &sig).is_err());
    }

    #[test]
    fn test_verify_with_wrong_key_fails() {
        let signing = SigningKey::generate(&mut OsRng);
        let other = verifying_key_from_signing(&SigningKey::generate(&mut OsRng));

        let sig = ed25519_sign(&signing, b"payload");
        assert!(ed25519_verify(&other, b"payload", &sig).is_err());
    }

    #[test]
    fn test_public_key_hex_roundtrip() {
        let signing = SigningKey::generate(&mut OsRng);
        let public = verifying_key_from_signing(&signing);

        let restored = PublicKey::from_hex(&public.to_hex()).unwrap();
        assert_eq!(restored, public);
    }

    #[test]
    fn test_public_key_rejects_bad_hex() {
        assert!(PublicKey::from_hex("not hex").is_err());
        assert!(PublicKey::from_hex("abcd").is_err());
    }

    #[test]
    fn test_public_key_serializes_as_hex_string() {
        let signing = SigningKey::generate(&mut OsRng);
        let public = verifying_key_from_signing(&signing);

        let json = serde_json::to_string(&public).unwrap();
        assert_eq!(json, format!("\"{}\"", public.to_hex()));
    }

    #[test]
    fn test_signature_from_slice_length_check() {
        assert!(matches!(
            Ed25519Signature::from_slice(&[0u8; 63]),
            Err(WardenError::Crypto { .. })
        ));
        assert!(Ed25519Signature::from_slice(&[0u8; 64]).is_ok());
    }
}
