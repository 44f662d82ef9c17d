//! Capability-token authorization engine
//!
//! Warden decides, given a presented token, a claimed subject, a target
//! resource, and (for multi-hop flows) a named processing stage, whether
//! access is granted. The engine is a pure decision function over the token
//! bytes and read-only key/chain state; it owns no long-lived network state
//! and keeps no per-request cache.
//!
//! The pieces compose in one direction:
//!
//! - [`token`] parses raw token text into a chain of signed blocks and
//!   verifies the signature linkage between them.
//! - [`evaluator`] performs the base subject/resource/expiry check.
//! - [`registry`] serves read-only key material and canonical service chain
//!   definitions from atomically swappable snapshots.
//! - [`chain`] validates a token's attestation prefix against a canonical
//!   stage ordering; both the inline and registry-backed entry points route
//!   through the same [`chain::verify_chain`] routine.
//! - [`gateway`] composes the above into the public decision surface and
//!   decides what payload to release.

pub mod chain;
pub mod config;
pub mod evaluator;
pub mod gateway;
pub mod registry;
pub mod token;

pub use chain::{verify_chain, ChainNode, ServiceChainDefinition};
pub use config::{load_engine_config, EngineConfig};
pub use gateway::{AccessDecision, AccessGateway, MemoryResourceStore, ResourceStore, ServiceAccess};
pub use registry::{KeyRing, KeyStore, PublicKeyRecord, ServiceChainRegistry};
pub use token::{decode, DecodedToken, VerifiedAttestation};

pub use warden_core::{Result, WardenError};
