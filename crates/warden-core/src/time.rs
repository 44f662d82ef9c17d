//! Pure time helpers
//!
//! Verification takes an explicit `now` so the decision stays a pure
//! function of its inputs; `unix_now` is only called at the outermost
//! entry points.

/// Get the current unix timestamp in seconds
pub fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Check whether an optional expiry has passed at `now`
///
/// `None` means the token never expires.
pub fn is_expired(expiry: Option<u64>, now: u64) -> bool {
    match expiry {
        Some(expires_at) => now > expires_at,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_expiry_never_expires() {
        assert!(!is_expired(None, u64::MAX));
    }

    #[test]
    fn test_expiry_boundary() {
        assert!(!is_expired(Some(100), 100));
        assert!(is_expired(Some(100), 101));
        assert!(!is_expired(Some(100), 99));
    }
}
