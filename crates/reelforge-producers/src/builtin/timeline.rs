use async_trait::async_trait;
use serde_json::json;

use reelforge_core::model::events::ArtefactStatus;
use reelforge_core::producer::{ProduceRequest, ProduceResult, ProducedArtefact, ProducerHandler, ResolvedInput};

/// Folds every resolved input of a collector edge into a single ordered
/// JSON array, standing in for a real timeline-assembly producer (cut
/// ordering, transitions, mixdown) without doing any actual media work.
pub struct StubTimelineAssembler {
    label: String,
}

impl StubTimelineAssembler {
    pub fn new(label: impl Into<String>) -> Self {
        Self { label: label.into() }
    }
}

fn render_input(name: &str, input: &ResolvedInput) -> serde_json::Value {
    match input {
        ResolvedInput::Value { value } => json!({ "input": name, "value": value }),
        ResolvedInput::ArtefactInline { text } => json!({ "input": name, "text": text }),
        ResolvedInput::ArtefactBlob { mime_type, .. } => json!({ "input": name, "blobMimeType": mime_type }),
    }
}

#[async_trait]
impl ProducerHandler for StubTimelineAssembler {
    async fn produce(&self, request: ProduceRequest) -> anyhow::Result<ProduceResult> {
        // Collector-folded inputs carry their own ordering (§4.6); render
        // those first, in binding order, then whatever's left over from a
        // direct (non-folded) input, in id order.
        let mut rendered = Vec::new();
        let mut seen = std::collections::BTreeSet::new();
        for ids in request.job.context.collector_bindings.values() {
            for id in ids {
                if let Some(input) = request.resolved_inputs.get(id) {
                    rendered.push(render_input(id, input));
                    seen.insert(id.clone());
                }
            }
        }
        for (name, input) in &request.resolved_inputs {
            if !seen.contains(name) {
                rendered.push(render_input(name, input));
            }
        }
        let timeline = json!({ "assembledBy": self.label, "segments": rendered });

        let artefacts = request
            .job
            .produces
            .iter()
            .map(|artefact_id| ProducedArtefact {
                artefact_id: artefact_id.clone(),
                status: ArtefactStatus::Succeeded,
                inline: Some(timeline.to_string()),
                blob: None,
                diagnostics: None,
            })
            .collect();
        Ok(ProduceResult {
            status: Some(ArtefactStatus::Succeeded),
            artefacts,
            diagnostics: None,
        })
    }
}
