//! Base capability evaluation
//!
//! The single-hop decision: does this decoded token cover the claimed
//! subject and target resource, and is it still live? This is also the
//! prerequisite gate before any chain verification; a token that fails
//! here is never reported chain-verified.

use warden_core::is_expired;

use crate::token::DecodedToken;

/// Check a decoded token against the caller-supplied subject and resource
///
/// True iff the token's subject and resource match exactly and the token
/// has not expired at `now`. Pure function; the caller supplies the clock.
pub fn verify(token: &DecodedToken, subject: &str, resource: &str, now: u64) -> bool {
    if token.subject != subject {
        tracing::debug!(claimed = subject, "subject mismatch");
        return false;
    }
    if token.resource != resource {
        tracing::debug!(requested = resource, "resource mismatch");
        return false;
    }
    if is_expired(token.expiry, now) {
        tracing::debug!(expiry = ?token.expiry, now, "token expired");
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decoded(subject: &str, resource: &str, expiry: Option<u64>) -> DecodedToken {
        DecodedToken {
            subject: subject.to_string(),
            resource: resource.to_string(),
            expiry,
            attestations: Vec::new(),
            revocation_ids: Vec::new(),
        }
    }

    #[test]
    fn test_exact_match_succeeds() {
        let token = decoded("svc:order-client", "order-pipeline", None);
        assert!(verify(&token, "svc:order-client", "order-pipeline", 1000));
    }

    #[test]
    fn test_subject_and_resource_must_both_match() {
        let token = decoded("svc:order-client", "order-pipeline", None);
        assert!(!verify(&token, "svc:other", "order-pipeline", 1000));
        assert!(!verify(&token, "svc:order-client", "other-resource", 1000));
    }

    #[test]
    fn test_expired_token_is_denied() {
        let token = decoded("s", "r", Some(500));
        assert!(verify(&token, "s", "r", 500));
        assert!(!verify(&token, "s", "r", 501));
    }
}
