//! reelforge-planner
//!
//! Blueprint loading (YAML, with recursive sub-blueprint resolution) and
//! the `PlanningService` orchestrator that turns a blueprint plus pending
//! edits into a persisted `ExecutionPlan` (§4.9). Depends on
//! `reelforge-core` for the algorithms and `reelforge-store` for the
//! filesystem-backed event log, manifest service, and storage context.

pub mod blueprint_loader;
pub mod errors;
pub mod planning_service;

pub use blueprint_loader::{BlueprintLoader, BlueprintSource, InMemoryBlueprintSource};
pub use errors::{PlannerError, PlannerResult};
pub use planning_service::{
    GeneratePlanArgs, GeneratePlanResult, PendingArtefactEdit, PendingInputEdit, PlanningService,
};
