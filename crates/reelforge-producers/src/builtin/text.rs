use async_trait::async_trait;
use reelforge_core::model::events::ArtefactStatus;
use reelforge_core::producer::{ProduceRequest, ProduceResult, ProducedArtefact, ProducerHandler};

/// Emits a deterministic inline string per requested artefact, naming the
/// producer and the artefact id. Stands in for an LLM script/narration
/// producer in tests and `doctor` smoke checks.
pub struct StubTextProducer {
    label: String,
}

impl StubTextProducer {
    pub fn new(label: impl Into<String>) -> Self {
        Self { label: label.into() }
    }
}

#[async_trait]
impl ProducerHandler for StubTextProducer {
    async fn produce(&self, request: ProduceRequest) -> anyhow::Result<ProduceResult> {
        let artefacts = request
            .job
            .produces
            .iter()
            .map(|artefact_id| ProducedArtefact {
                artefact_id: artefact_id.clone(),
                status: ArtefactStatus::Succeeded,
                inline: Some(format!("[{}] generated text for {artefact_id}", self.label)),
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
