//! Core types shared across the Warden authorization engine
//!
//! This crate carries the unified error type, Ed25519 key and signature
//! wrappers, and the pure time helpers the verification path depends on.
//! It has no opinion about tokens or chains; those live in `warden-authz`.

pub mod errors;
pub mod keys;
pub mod time;

pub use errors::{Result, WardenError};
pub use keys::{
    ed25519_sign, ed25519_verify, verifying_key_from_signing, Ed25519Signature, PublicKey,
};
pub use time::{is_expired, unix_now};
