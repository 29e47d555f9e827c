//! Entry point for the cross-crate integration suite. Each scenario lives
//! in its own module under `tests/integration/`; `support` holds the
//! fixtures and full-cycle helper they share.

#[path = "integration/support.rs"]
mod support;

#[path = "integration/initial_run.rs"]
mod initial_run;

#[path = "integration/unchanged_inputs_noop.rs"]
mod unchanged_inputs_noop;

#[path = "integration/downstream_invalidation.rs"]
mod downstream_invalidation;

#[path = "integration/targeted_config_change.rs"]
mod targeted_config_change;

#[path = "integration/manual_artifact_edit.rs"]
mod manual_artifact_edit;

#[path = "integration/manifest_conflict.rs"]
mod manifest_conflict;

#[path = "integration/planner_properties.rs"]
mod planner_properties;
