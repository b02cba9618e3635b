//! Manifest inference and lock engine.
//!
//! This crate provides:
//! - A composable attribute rule engine with per-domain rule sets
//! - Service field typing
//! - The manifest builder and canonicalizer
//! - Lock building with stable identities, content hashes and enum aggregation
//! - Verification, statistics, binary/JSON codecs and an on-disk artifact store

pub mod builder;
pub mod canon;
pub mod codec;
pub mod error;
pub mod hashing;
pub mod infer;
pub mod lock;
pub mod stable_id;
pub mod stats;
pub mod store;
pub mod units;
pub mod verify;

pub use builder::ManifestBuilder;
pub use canon::canonicalize;
pub use error::ManifestError;
pub use infer::{AttributeRule, DomainRuleSet, RuleRegistry, ServiceTyping};
pub use lock::LockBuilder;
pub use stats::ManifestStats;
pub use store::{ArtifactStore, StoreError};
pub use verify::{verify, VerifyReport};
