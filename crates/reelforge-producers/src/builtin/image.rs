use async_trait::async_trait;
use reelforge_core::model::events::ArtefactStatus;
use reelforge_core::producer::{ProduceRequest, ProduceResult, ProducedArtefact, ProducerHandler, RawBlob};

const PNG_MAGIC: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// Emits a minimal valid PNG magic-header blob per requested artefact,
/// standing in for an image-generation provider in tests and smoke checks.
pub struct StubImageProducer {
    label: String,
}

impl StubImageProducer {
    pub fn new(label: impl Into<String>) -> Self {
        Self { label: label.into() }
    }
}

fn fake_png(seed: &str) -> Vec<u8> {
    let mut data = PNG_MAGIC.to_vec();
    data.extend_from_slice(seed.as_bytes());
    data
}

#[async_trait]
impl ProducerHandler for StubImageProducer {
    async fn produce(&self, request: ProduceRequest) -> anyhow::Result<ProduceResult> {
        let artefacts = request
            .job
            .produces
            .iter()
            .map(|artefact_id| ProducedArtefact {
                artefact_id: artefact_id.clone(),
                status: ArtefactStatus::Succeeded,
                inline: None,
                blob: Some(RawBlob {
                    data: fake_png(&format!("{}:{artefact_id}", self.label)),
                    mime_type: "image/png".to_string(),
                }),
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
