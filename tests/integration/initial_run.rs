use serde_json::json;

use crate::support::{fixed_clock, in_memory_ctx, input_edit, run_full_cycle, single_producer_blueprint};

/// First run for a movie: no current manifest, one input, one producer. The
/// plan should schedule exactly one job in one layer, the run should
/// succeed, and the resulting manifest should carry the produced artefact.
#[test]
fn first_run_produces_one_artefact_and_a_saved_manifest() {
    let ctx = in_memory_ctx();
    let clock = fixed_clock();

    let cycle = run_full_cycle(
        ctx,
        clock,
        "movie-initial",
        single_producer_blueprint(),
        vec![input_edit("Input:InquiryPrompt", json!("Tell me a story"))],
        vec![],
        Default::default(),
    );

    assert_eq!(cycle.plan_result.target_revision, "rev-0001");
    assert_eq!(cycle.plan_result.plan.layers.len(), 1);
    assert_eq!(cycle.plan_result.plan.layers[0].len(), 1);
    assert!(!cycle.run_result.cancelled_before_completion);
    assert_eq!(cycle.run_result.job_outcomes.len(), 1);

    assert_eq!(cycle.manifest.revision, "rev-0001");
    assert!(cycle.manifest.artefacts.contains_key("Artifact:NarrationScript"));
    assert!(cycle.manifest.inputs.contains_key("Input:InquiryPrompt"));
    assert!(!cycle.manifest_hash.is_empty());
}
