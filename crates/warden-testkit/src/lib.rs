//! Warden testing infrastructure
//!
//! Deterministic key fixtures and a token forge for exercising the
//! verification paths end to end. Token issuance is deliberately not part
//! of the engine itself; this crate reproduces the wire format the decoder
//! checks so tests can mint, attest, truncate, and tamper with tokens.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

pub mod forge;
pub mod keys;

pub use forge::{ForgedToken, TokenForge};
pub use keys::{chain_definition, key_ring, KeyFixture};
