use serde_json::json;

use reelforge_core::model::events::ArtefactOutput;
use reelforge_planner::PendingArtefactEdit;

use crate::support::{fanout_blueprint, fixed_clock, in_memory_ctx, input_edit, run_full_cycle};

/// An out-of-band manual edit to `NarrationScript` (produced by
/// `StubTextProducer`, consumed by both `StubAudioProducer[segment]`
/// instances) is recorded with the `manual-edit` inputs hash sentinel. It
/// must redirty `NarrationScript`'s *consumers* on the next plan, but never
/// the script producer itself — its output is already "newer" than
/// anything the producer would generate.
#[test]
fn manual_artefact_edit_redirties_consumers_not_its_own_producer() {
    let ctx = in_memory_ctx();
    let clock = fixed_clock();

    let first = run_full_cycle(
        ctx.clone(),
        clock.clone(),
        "movie-manual-edit",
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
        "movie-manual-edit",
        fanout_blueprint(),
        // Neither input is resupplied: `StubAudioProducer[segment]` (once
        // redirtied by the manual artefact edit below, through its
        // `NarrationScript` input) must still resolve both inputs from the
        // values last recorded for them in the input event log.
        vec![],
        vec![PendingArtefactEdit {
            artefact_id: "Artifact:NarrationScript".to_string(),
            output: ArtefactOutput { blob: None, inline: Some("hand-edited narration".to_string()) },
            produced_by: "manual".to_string(),
        }],
        Default::default(),
    );

    // Only the two audio jobs rerun — the manual edit dirties
    // `NarrationScript`'s consumers, never `StubTextProducer` itself.
    let job_ids: Vec<&str> = second
        .plan_result
        .plan
        .layers
        .iter()
        .flatten()
        .map(|j| j.job_id.as_str())
        .collect();
    assert_eq!(job_ids.len(), 2);
    assert!(job_ids.iter().all(|id| id.starts_with("StubAudioProducer")));
    assert!(!job_ids.iter().any(|id| *id == "StubTextProducer"));

    assert_eq!(second.run_result.job_outcomes.len(), 2);

    // The hand-edited value survives untouched: nothing reran the producer
    // that would otherwise overwrite it.
    let script_entry = &second.manifest.artefacts["Artifact:NarrationScript"];
    assert_eq!(script_entry.inline.as_deref(), Some("hand-edited narration"));
    assert_eq!(script_entry.produced_by, "manual");

    // Both audio artefacts are still present, having rerun against the
    // edited script.
    assert!(second.manifest.artefacts.contains_key("Artifact:Audio[segment=0]"));
    assert!(second.manifest.artefacts.contains_key("Artifact:Audio[segment=1]"));
}
