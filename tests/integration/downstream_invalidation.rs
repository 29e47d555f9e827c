use serde_json::json;

use crate::support::{fanout_blueprint, fixed_clock, in_memory_ctx, input_edit, run_full_cycle};

/// A two-segment fan-out: one `StubTextProducer` job feeding two
/// `StubAudioProducer[segment]` jobs. Changing the upstream prompt should
/// redirty the script job and both downstream audio jobs, even though
/// `NumOfSegments` itself is unchanged and not resupplied on the second
/// run — its value must be recovered from the input event log, not
/// collapsed to the fan-out's default cardinality of one.
#[test]
fn changing_the_upstream_prompt_redirties_every_fanned_out_instance() {
    let ctx = in_memory_ctx();
    let clock = fixed_clock();

    let first = run_full_cycle(
        ctx.clone(),
        clock.clone(),
        "movie-fanout",
        fanout_blueprint(),
        vec![
            input_edit("Input:InquiryPrompt", json!("A story about a lighthouse")),
            input_edit("Input:NumOfSegments", json!(2)),
        ],
        vec![],
        Default::default(),
    );
    assert_eq!(first.run_result.job_outcomes.len(), 3);
    assert_eq!(
        first.manifest.artefacts.keys().filter(|k| k.starts_with("Artifact:Audio")).count(),
        2
    );

    let second = run_full_cycle(
        ctx,
        clock,
        "movie-fanout",
        fanout_blueprint(),
        vec![input_edit("Input:InquiryPrompt", json!("A story about a submarine"))],
        vec![],
        Default::default(),
    );

    // Script job plus both audio jobs redirtied: three jobs in the new plan,
    // even though only the upstream prompt changed.
    let job_count: usize = second.plan_result.plan.layers.iter().map(Vec::len).sum();
    assert_eq!(job_count, 3);
    assert_eq!(second.run_result.job_outcomes.len(), 3);
    assert!(second
        .run_result
        .job_outcomes
        .iter()
        .all(|o| o.status == reelforge_core::model::events::ArtefactStatus::Succeeded));

    // The stub producers are deterministic by job identity rather than by
    // input content, so the re-produced artefacts land on the same hash —
    // what matters here is that every one of them actually ran again.
    for id in first.manifest.artefacts.keys() {
        assert!(second.manifest.artefacts.contains_key(id));
    }
}
