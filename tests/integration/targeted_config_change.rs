use serde_json::json;

use crate::support::{fanout_blueprint, fixed_clock, in_memory_ctx, input_edit, run_full_cycle};

/// Raising `NumOfSegments` from 2 to 3 adds one new `Audio[segment=2]`
/// instance. The script job and the two already-produced audio instances
/// have nothing new to react to and should be skipped entirely — only the
/// new instance should run.
#[test]
fn raising_segment_count_only_schedules_the_new_instance() {
    let ctx = in_memory_ctx();
    let clock = fixed_clock();

    let first = run_full_cycle(
        ctx.clone(),
        clock.clone(),
        "movie-targeted",
        fanout_blueprint(),
        vec![
            input_edit("Input:InquiryPrompt", json!("A story about a lighthouse")),
            input_edit("Input:NumOfSegments", json!(2)),
        ],
        vec![],
        Default::default(),
    );
    assert_eq!(first.run_result.job_outcomes.len(), 3);

    let second = run_full_cycle(
        ctx,
        clock,
        "movie-targeted",
        fanout_blueprint(),
        vec![
            input_edit("Input:InquiryPrompt", json!("A story about a lighthouse")),
            input_edit("Input:NumOfSegments", json!(3)),
        ],
        vec![],
        Default::default(),
    );

    let job_count: usize = second.plan_result.plan.layers.iter().map(Vec::len).sum();
    assert_eq!(job_count, 1, "only the newly fanned-out segment instance should be scheduled");
    assert_eq!(second.run_result.job_outcomes.len(), 1);

    assert_eq!(
        second.manifest.artefacts.keys().filter(|k| k.starts_with("Artifact:Audio")).count(),
        3
    );
    // The previously produced segments are carried forward untouched.
    for id in ["Artifact:Audio[segment=0]", "Artifact:Audio[segment=1]"] {
        assert_eq!(second.manifest.artefacts[id].hash, first.manifest.artefacts[id].hash);
    }
}
