//! reelforge-core
//!
//! Core primitives for Reelforge: identifiers, the blueprint document model,
//! the canonical graph builder, dimension expansion into a concrete producer
//! graph, the incremental planner's dirty-diff/layering algorithm, and the
//! on-disk data shapes (events, manifest, execution plan).
//!
//! This crate performs no filesystem or network I/O. Every timestamp is
//! injected via [`clock::Clock`]; every byte this crate hashes or
//! canonicalizes is handed to it by a caller.

pub mod clock;
pub mod config;
pub mod determinism;
pub mod errors;
pub mod expander;
pub mod graph_builder;
pub mod ids;
pub mod model;
pub mod planner;
pub mod producer;
pub mod version;

pub use errors::{CoreError, CoreResult};

/// Convenience re-exports for downstream crates.
pub mod prelude {
    pub use crate::clock::{Clock, FixedClock};
    pub use crate::determinism::canonical_json::canonicalize_json;
    pub use crate::determinism::hashing::{hash_inputs, hash_payload, HashDigest};
    pub use crate::errors::{CoreError, CoreResult};
    pub use crate::ids::{CanonicalId, MovieId, RevisionId};
    pub use crate::model::blueprint::BlueprintDoc;
    pub use crate::model::events::{ArtefactEvent, ArtefactOutput, ArtefactStatus, InputEvent};
    pub use crate::model::graph::BlueprintGraph;
    pub use crate::model::manifest::{Manifest, Pointer};
    pub use crate::model::plan::{ExecutionPlan, Job};
    pub use crate::model::producer_graph::{JobId, ProducerGraph, ProducerGraphNode};
    pub use crate::producer::{
        ProduceRequest, ProduceResult, ProducedArtefact, ProducerHandler,
    };
}
