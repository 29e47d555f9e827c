use std::collections::BTreeMap;
use std::sync::Arc;

use reelforge_core::clock::{Clock, FixedClock};
use reelforge_core::model::blueprint::{
    ArtefactSpec, BlueprintDoc, EdgeSpec, InputSpec, Meta, ProducerSpec, ResolvedBlueprint,
};
use reelforge_core::model::events::EditedBy;
use reelforge_planner::{GeneratePlanArgs, GeneratePlanResult, PendingArtefactEdit, PendingInputEdit, PlanningService};
use reelforge_producers::{ProducerRegistry, ProducerResolver};
use reelforge_runner::{CancellationToken, RunContext, RunResult, Runner};
use reelforge_store::{InMemoryStorageContext, ManifestService, StorageContext};

/// A one-input, one-producer, one-artefact blueprint with no fan-out — the
/// smallest shape that exercises a full plan/run/manifest cycle.
pub fn single_producer_blueprint() -> ResolvedBlueprint {
    ResolvedBlueprint::leaf(BlueprintDoc {
        meta: Meta {
            id: "root".into(),
            name: "Root".into(),
            version: None,
            description: None,
            author: None,
            license: None,
        },
        inputs: vec![InputSpec {
            name: "InquiryPrompt".into(),
            type_name: "string".into(),
            required: true,
            description: None,
            default_value: None,
        }],
        artefacts: vec![ArtefactSpec {
            name: "NarrationScript".into(),
            type_name: "string".into(),
            description: None,
            item_type: None,
            count_input: None,
            required: true,
        }],
        sub_blueprints: vec![],
        producers: vec![ProducerSpec {
            name: "StubTextProducer".into(),
            provider: "stub".into(),
            model: "v1".into(),
            settings: None,
            system_prompt: None,
            user_prompt: None,
            json_schema: None,
            text_format: None,
            variables: None,
            sdk_mapping: None,
            outputs: None,
            config: None,
            extra_fields: BTreeMap::new(),
        }],
        edges: vec![
            EdgeSpec { from: "InquiryPrompt".into(), to: "StubTextProducer".into(), note: None },
            EdgeSpec { from: "StubTextProducer".into(), to: "NarrationScript".into(), note: None },
        ],
        collectors: vec![],
    })
}

/// A script-then-fan-out-to-audio-per-segment blueprint: `StubTextProducer`
/// produces `NarrationScript` from `InquiryPrompt`, then `StubAudioProducer`
/// fans out over `NumOfSegments` to produce one `Audio[segment]` each.
pub fn fanout_blueprint() -> ResolvedBlueprint {
    ResolvedBlueprint::leaf(BlueprintDoc {
        meta: Meta {
            id: "movie".into(),
            name: "movie".into(),
            version: None,
            description: None,
            author: None,
            license: None,
        },
        inputs: vec![
            InputSpec {
                name: "InquiryPrompt".into(),
                type_name: "string".into(),
                required: true,
                description: None,
                default_value: None,
            },
            InputSpec {
                name: "NumOfSegments".into(),
                type_name: "number".into(),
                required: true,
                description: None,
                default_value: None,
            },
        ],
        artefacts: vec![
            ArtefactSpec {
                name: "NarrationScript".into(),
                type_name: "text".into(),
                description: None,
                item_type: None,
                count_input: None,
                required: true,
            },
            ArtefactSpec {
                name: "Audio".into(),
                type_name: "audio".into(),
                description: None,
                item_type: None,
                count_input: Some("NumOfSegments".into()),
                required: true,
            },
        ],
        sub_blueprints: vec![],
        producers: vec![
            ProducerSpec {
                name: "StubTextProducer".into(),
                provider: "stub".into(),
                model: "v1".into(),
                settings: None,
                system_prompt: None,
                user_prompt: None,
                json_schema: None,
                text_format: None,
                variables: None,
                sdk_mapping: None,
                outputs: None,
                config: None,
                extra_fields: BTreeMap::new(),
            },
            ProducerSpec {
                name: "StubAudioProducer".into(),
                provider: "stub".into(),
                model: "v1".into(),
                settings: None,
                system_prompt: None,
                user_prompt: None,
                json_schema: None,
                text_format: None,
                variables: None,
                sdk_mapping: None,
                outputs: None,
                config: None,
                extra_fields: BTreeMap::new(),
            },
        ],
        edges: vec![
            EdgeSpec { from: "InquiryPrompt".into(), to: "StubTextProducer".into(), note: None },
            EdgeSpec { from: "StubTextProducer".into(), to: "NarrationScript".into(), note: None },
            EdgeSpec { from: "NarrationScript".into(), to: "StubAudioProducer[segment]".into(), note: None },
            EdgeSpec { from: "StubAudioProducer[segment]".into(), to: "Audio[segment]".into(), note: None },
        ],
        collectors: vec![],
    })
}

pub fn input_edit(id: &str, value: serde_json::Value) -> PendingInputEdit {
    PendingInputEdit { id: id.to_string(), value, edited_by: EditedBy::User }
}

pub fn resolver() -> Arc<ProducerResolver> {
    let registry: ProducerRegistry = reelforge_producers::builtin_registry();
    Arc::new(ProducerResolver::new(Arc::new(registry)))
}

/// Outcome of one full plan -> run -> manifest cycle, bundled for
/// assertions.
pub struct CycleResult {
    pub plan_result: GeneratePlanResult,
    pub run_result: RunResult,
    pub manifest: reelforge_core::model::manifest::Manifest,
    pub manifest_hash: String,
}

/// Drives `PlanningService::generate_plan` -> `Runner::execute` ->
/// `RunResult::build_manifest` -> `ManifestService::save_manifest` for one
/// movie, the way the CLI's `plan` and `run` subcommands do it in sequence.
pub fn run_full_cycle(
    ctx: Arc<dyn StorageContext>,
    clock: Arc<dyn Clock>,
    movie_id: &str,
    blueprint: ResolvedBlueprint,
    input_edits: Vec<PendingInputEdit>,
    pending_artefacts: Vec<PendingArtefactEdit>,
    dimension_counters: BTreeMap<String, String>,
) -> CycleResult {
    let planning_service = PlanningService::new(ctx.clone(), clock.clone());
    let plan_result = planning_service
        .generate_plan(GeneratePlanArgs {
            movie_id: movie_id.to_string(),
            blueprint,
            input_edits,
            pending_artefacts,
            dimension_counters,
        })
        .expect("generate_plan should succeed for a well-formed fixture");

    let runner = Runner::new(ctx.clone(), resolver(), clock.clone(), 4);
    let run_context = RunContext {
        movie_id: movie_id.to_string(),
        base_revision: plan_result.manifest_hash.as_ref().map(|_| plan_result.manifest.revision.clone()),
        resolved_inputs: plan_result.resolved_inputs.clone(),
        cancellation: CancellationToken::new(),
    };

    let run_result = futures_block_on(runner.execute(&plan_result.plan, run_context));

    let manifest = run_result.build_manifest().expect("build_manifest should succeed");
    let manifest_service = ManifestService::new(ctx.clone());
    let manifest_hash = manifest_service
        .save_manifest(movie_id, &manifest, plan_result.manifest_hash.as_deref(), clock.as_ref())
        .expect("save_manifest should succeed against a fresh pointer");

    CycleResult { plan_result, run_result, manifest, manifest_hash }
}

/// Blocks the current thread on a future using a small multi-thread Tokio
/// runtime, so plain `#[test]` functions (not `#[tokio::test]`) can drive
/// the async `Runner::execute` without nesting runtimes across helpers.
pub fn futures_block_on<F: std::future::Future>(fut: F) -> F::Output {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .expect("building a test tokio runtime")
        .block_on(fut)
}

pub fn fixed_clock() -> Arc<dyn Clock> {
    Arc::new(FixedClock::epoch())
}

pub fn in_memory_ctx() -> Arc<dyn StorageContext> {
    Arc::new(InMemoryStorageContext::new())
}
