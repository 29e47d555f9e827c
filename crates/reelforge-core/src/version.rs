//! Common version strings shared across crates.

/// Schema version embedded in persisted manifests and plans.
pub const SCHEMA_VERSION_V1: &str = "v1";

/// Crate version, re-exported for diagnostics (`doctor`, `--version`).
pub const CRATE_VERSION: &str = env!("CARGO_PKG_VERSION");
