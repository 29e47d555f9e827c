use serde_json::json;

use crate::support::{fixed_clock, in_memory_ctx, input_edit, run_full_cycle, single_producer_blueprint};

/// Re-submitting the same input value on a second run, once the first run's
/// manifest already records that exact hash, should dirty nothing: the
/// second plan has no jobs at all, and the manifest carries forward
/// unchanged.
#[test]
fn resubmitting_an_unchanged_input_plans_no_jobs() {
    let ctx = in_memory_ctx();
    let clock = fixed_clock();

    let first = run_full_cycle(
        ctx.clone(),
        clock.clone(),
        "movie-noop",
        single_producer_blueprint(),
        vec![input_edit("Input:InquiryPrompt", json!("Tell me a story"))],
        vec![],
        Default::default(),
    );
    assert_eq!(first.plan_result.plan.layers[0].len(), 1);

    let second = run_full_cycle(
        ctx,
        clock,
        "movie-noop",
        single_producer_blueprint(),
        vec![input_edit("Input:InquiryPrompt", json!("Tell me a story"))],
        vec![],
        Default::default(),
    );

    assert_eq!(second.plan_result.target_revision, "rev-0002");
    assert!(second.plan_result.plan.layers.iter().all(Vec::is_empty) || second.plan_result.plan.layers.is_empty());
    assert!(second.run_result.job_outcomes.is_empty());
    assert_eq!(second.manifest.artefacts, first.manifest.artefacts);
}
