//! Unified error system for Warden
//!
//! A single error enum shared by every crate in the workspace. Hard failures
//! (malformed tokens, broken signature linkage) are distinct variants so
//! callers can tell "unusable request" apart from an ordinary deny, which is
//! reported as `false`/`Denied` and never as an error.

use serde::{Deserialize, Serialize};

/// Unified error type for all Warden operations
#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
pub enum WardenError {
    /// Token bytes are empty, unparseable, or structurally invalid
    #[error("Invalid token: {message}")]
    InvalidToken {
        /// What made the token unusable
        message: String,
    },

    /// A chain link's signature attestation failed cryptographic check
    #[error("Chain signature invalid: {message}")]
    ChainSignatureInvalid {
        /// Which link failed and why
        message: String,
    },

    /// Registry lookup miss; distinct from a failed verification
    #[error("Service not found: {service}")]
    ServiceNotFound {
        /// The service name that has no registered chain definition
        service: String,
    },

    /// The payload store has no row for an authorized resource
    #[error("No payload registered for resource: {resource}")]
    MissingPayload {
        /// The resource the store could not serve
        resource: String,
    },

    /// Key ring or chain configuration is malformed
    #[error("Invalid config: {message}")]
    InvalidConfig {
        /// What made the configuration unusable
        message: String,
    },

    /// Cryptographic operation failed
    #[error("Crypto error: {message}")]
    Crypto {
        /// Description of the cryptographic failure
        message: String,
    },

    /// Serialization/deserialization error
    #[error("Serialization error: {message}")]
    Serialization {
        /// Description of the serialization failure
        message: String,
    },
}

impl WardenError {
    /// Create an invalid token error
    pub fn invalid_token(message: impl Into<String>) -> Self {
        Self::InvalidToken {
            message: message.into(),
        }
    }

    /// Create a chain signature error
    pub fn chain_signature_invalid(message: impl Into<String>) -> Self {
        Self::ChainSignatureInvalid {
            message: message.into(),
        }
    }

    /// Create a service not found error
    pub fn service_not_found(service: impl Into<String>) -> Self {
        Self::ServiceNotFound {
            service: service.into(),
        }
    }

    /// Create a missing payload error
    pub fn missing_payload(resource: impl Into<String>) -> Self {
        Self::MissingPayload {
            resource: resource.into(),
        }
    }

    /// Create an invalid config error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create a crypto error
    pub fn crypto(message: impl Into<String>) -> Self {
        Self::Crypto {
            message: message.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }
}

/// Result type alias used throughout the workspace
pub type Result<T> = std::result::Result<T, WardenError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = WardenError::invalid_token("empty input");
        assert_eq!(err.to_string(), "Invalid token: empty input");

        let err = WardenError::service_not_found("order-pipeline");
        assert_eq!(err.to_string(), "Service not found: order-pipeline");

        let err = WardenError::missing_payload("order-pipeline");
        assert_eq!(
            err.to_string(),
            "No payload registered for resource: order-pipeline"
        );
    }

    #[test]
    fn test_error_roundtrip() {
        let err = WardenError::chain_signature_invalid("link 2");
        let json = serde_json::to_string(&err).unwrap();
        let back: WardenError = serde_json::from_str(&json).unwrap();
        assert_eq!(back.to_string(), err.to_string());
    }
}
