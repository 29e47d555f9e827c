//! `PlanningService`: the orchestrator external callers (the CLI, a driver
//! script, a future API layer) invoke to go from "a blueprint plus pending
//! edits" to a persisted `ExecutionPlan` (§4.9).

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;

use reelforge_core::clock::Clock;
use reelforge_core::determinism::hashing::hash_input_payload;
use reelforge_core::graph_builder::build_graph;
use reelforge_core::expander::expand;
use reelforge_core::ids::{CanonicalId, RevisionId};
use reelforge_core::model::blueprint::{InputSpec, ResolvedBlueprint};
use reelforge_core::model::events::{ArtefactEvent, ArtefactOutput, ArtefactStatus, EditedBy, InputEvent, MANUAL_EDIT_INPUTS_HASH};
use reelforge_core::model::manifest::Manifest;
use reelforge_core::model::plan::ExecutionPlan;
use reelforge_core::planner::plan as core_plan;
use reelforge_store::storage_context::resolve as resolve_path;
use reelforge_store::{EventLog, ManifestService, StorageContext, StoreError};

use crate::errors::PlannerResult;

/// A single caller-supplied input value for the run being planned.
#[derive(Debug, Clone)]
pub struct PendingInputEdit {
    pub id: String,
    pub value: Value,
    pub edited_by: EditedBy,
}

/// A caller-supplied manual artefact override, recorded with
/// `inputsHash = "manual-edit"` (§3.5).
#[derive(Debug, Clone)]
pub struct PendingArtefactEdit {
    pub artefact_id: String,
    pub output: ArtefactOutput,
    pub produced_by: String,
}

pub struct GeneratePlanArgs {
    pub movie_id: String,
    pub blueprint: ResolvedBlueprint,
    pub input_edits: Vec<PendingInputEdit>,
    pub pending_artefacts: Vec<PendingArtefactEdit>,
    /// Explicit `countInput` overrides, keyed by the qualified dimension
    /// symbol (§4.6); falls back to the `NumOf<Plural>` convention.
    pub dimension_counters: BTreeMap<String, String>,
}

pub struct GeneratePlanResult {
    pub plan: ExecutionPlan,
    pub plan_path: String,
    pub target_revision: String,
    pub manifest: Manifest,
    pub manifest_hash: Option<String>,
    pub input_events: Vec<InputEvent>,
    pub resolved_inputs: BTreeMap<String, Value>,
}

pub struct PlanningService {
    ctx: Arc<dyn StorageContext>,
    clock: Arc<dyn Clock>,
}

/// Mirrors `GraphNode::canonical_base_id`'s `InputSource` branch (§3.3):
/// the graph builder only ever produces that id from a node's
/// `namespace_path`/`name`, and this needs to reach the same id before any
/// `GraphNode` exists, to resolve blueprint-declared defaults.
fn canonical_input_id(ns_path: &str, name: &str) -> String {
    if ns_path == "root" {
        format!("Input:{name}")
    } else {
        let ns = ns_path.strip_prefix("root.").unwrap_or(ns_path);
        format!("Input:{ns}.{name}")
    }
}

fn collect_input_specs(ns_path: &str, rb: &ResolvedBlueprint, out: &mut BTreeMap<String, InputSpec>) {
    for input in &rb.doc.inputs {
        out.insert(canonical_input_id(ns_path, &input.name), input.clone());
    }
    for subref in &rb.doc.sub_blueprints {
        if let Some(child) = rb.children.get(&subref.namespace) {
            collect_input_specs(&format!("{ns_path}.{}", subref.namespace), child, out);
        }
    }
}

impl PlanningService {
    pub fn new(ctx: Arc<dyn StorageContext>, clock: Arc<dyn Clock>) -> Self {
        Self { ctx, clock }
    }

    /// `PlanningService.generatePlan` (§4.9), run in the eight documented
    /// steps.
    pub fn generate_plan(&self, args: GeneratePlanArgs) -> PlannerResult<GeneratePlanResult> {
        let manifest_service = ManifestService::new(self.ctx.clone());
        let event_log = EventLog::new(self.ctx.clone());

        // Step 1: load or synthesize the current manifest.
        let (current_manifest, current_hash) = match manifest_service.load_current(&args.movie_id) {
            Ok(loaded) => (loaded.manifest, Some(loaded.hash)),
            Err(StoreError::ManifestNotFound(_)) => {
                (Manifest::empty_at("rev-0000", self.clock.now()), None)
            }
            Err(other) => return Err(other.into()),
        };

        // Step 2: pick a free target revision.
        let mut candidate = RevisionId::next_after(Some(&current_manifest.revision));
        let target_revision = loop {
            let plan_path = resolve_path(
                &args.movie_id,
                &["runs", &format!("{candidate}-plan.json")],
            )?;
            if !self.ctx.file_exists(&plan_path) {
                break candidate.as_str().to_string();
            }
            candidate = candidate.next();
        };

        // Step 3: append InputEvents for canonical pending edits.
        let mut input_events = Vec::with_capacity(args.input_edits.len());
        let mut edited_values: BTreeMap<String, Value> = BTreeMap::new();
        for edit in &args.input_edits {
            if !CanonicalId::is_input(&edit.id) {
                return Err(crate::errors::PlannerError::NonCanonicalInput(edit.id.clone()));
            }
            let digest = hash_input_payload(&edit.value)?;
            let event = InputEvent {
                id: edit.id.clone(),
                revision: target_revision.clone(),
                hash: digest.hash,
                payload: edit.value.clone(),
                edited_by: edit.edited_by.clone(),
                created_at: self.clock.now(),
            };
            event_log.append_input(&args.movie_id, &event)?;
            edited_values.insert(event.id.clone(), edit.value.clone());
            input_events.push(event);
        }

        // Step 4: resolve the value for every declared input. A canonical
        // pending edit wins; failing that, the last value this id was ever
        // recorded with (replayed from the input event log — the manifest
        // itself only carries a hash/payload digest, never the payload, so
        // it cannot answer "what was it last set to"); only once neither
        // exists does a blueprint default apply, recording a
        // system-authored event so the default is itself durable history.
        let mut specs = BTreeMap::new();
        collect_input_specs("root", &args.blueprint, &mut specs);
        let mut last_recorded: BTreeMap<String, Value> = BTreeMap::new();
        for event in event_log.stream_inputs(&args.movie_id, None)? {
            last_recorded.insert(event.id, event.payload);
        }
        let mut resolved_inputs: BTreeMap<String, Value> = BTreeMap::new();
        for (canonical_id, spec) in &specs {
            if let Some(v) = edited_values.get(canonical_id) {
                resolved_inputs.insert(canonical_id.clone(), v.clone());
                continue;
            }
            if let Some(v) = last_recorded.get(canonical_id) {
                resolved_inputs.insert(canonical_id.clone(), v.clone());
                continue;
            }
            if let Some(default) = &spec.default_value {
                let digest = hash_input_payload(default)?;
                let event = InputEvent {
                    id: canonical_id.clone(),
                    revision: target_revision.clone(),
                    hash: digest.hash,
                    payload: default.clone(),
                    edited_by: EditedBy::System,
                    created_at: self.clock.now(),
                };
                event_log.append_input(&args.movie_id, &event)?;
                resolved_inputs.insert(canonical_id.clone(), default.clone());
                input_events.push(event);
            }
        }

        // Step 5: append caller-provided pending artefacts as manual edits.
        for pending in &args.pending_artefacts {
            let event = ArtefactEvent {
                artefact_id: pending.artefact_id.clone(),
                revision: target_revision.clone(),
                inputs_hash: MANUAL_EDIT_INPUTS_HASH.to_string(),
                output: pending.output.clone(),
                status: ArtefactStatus::Succeeded,
                produced_by: pending.produced_by.clone(),
                diagnostics: None,
                created_at: self.clock.now(),
            };
            event_log.append_artefact(&args.movie_id, &event)?;
        }

        // Step 6: build the canonical graph and expand the producer graph.
        let graph = build_graph(&args.blueprint)?;
        let producer_graph = expand(&graph, &resolved_inputs, &args.dimension_counters)?;

        // Step 7: invoke the planner and persist the plan.
        let artefact_events_since_manifest =
            event_log.stream_artefacts(&args.movie_id, Some(&current_manifest.revision))?;
        let plan = core_plan(
            &current_manifest,
            current_hash.as_deref(),
            &producer_graph,
            &target_revision,
            &input_events,
            &artefact_events_since_manifest,
            self.clock.as_ref(),
        )?;
        let plan_path = resolve_path(&args.movie_id, &["runs", &format!("{target_revision}-plan.json")])?;
        let plan_bytes = serde_json::to_vec_pretty(&plan).map_err(reelforge_core::CoreError::from)?;
        self.ctx.write_file_atomic(&plan_path, &plan_bytes)?;

        // Step 8.
        Ok(GeneratePlanResult {
            plan,
            plan_path,
            target_revision,
            manifest: current_manifest,
            manifest_hash: current_hash,
            input_events,
            resolved_inputs,
        })
    }
}
