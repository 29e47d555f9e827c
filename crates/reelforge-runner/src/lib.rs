//! reelforge-runner
//!
//! The concurrent per-layer executor (§4.8, §5): takes a persisted
//! `ExecutionPlan` from `reelforge-planner` and a `ProducerResolver` from
//! `reelforge-producers`, and drives each layer's jobs to completion against
//! a `reelforge-store` storage context, appending artefact events as it
//! goes. Cooperative cancellation is checked between layers, never inside
//! one, so a layer always finishes the jobs it started.

pub mod cancellation;
pub mod errors;
pub mod runner;

pub use cancellation::CancellationToken;
pub use errors::{RunError, RunnerResult};
pub use runner::{JobOutcome, RunContext, RunResult, Runner};
