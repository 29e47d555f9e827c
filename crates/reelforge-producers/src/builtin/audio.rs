use async_trait::async_trait;
use reelforge_core::model::events::ArtefactStatus;
use reelforge_core::producer::{ProduceRequest, ProduceResult, ProducedArtefact, ProducerHandler, RawBlob};

/// Synthesizes a tiny deterministic "audio" blob (a WAV-ish byte pattern
/// derived from the job id) rather than calling out to a TTS provider.
pub struct StubAudioProducer {
    label: String,
}

impl StubAudioProducer {
    pub fn new(label: impl Into<String>) -> Self {
        Self { label: label.into() }
    }
}

fn fake_wave(seed: &str, len: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(len);
    let mut state: u32 = seed.bytes().fold(2166136261u32, |acc, b| (acc ^ b as u32).wrapping_mul(16777619));
    for _ in 0..len {
        state = state.wrapping_mul(1664525).wrapping_add(1013904223);
        out.push((state >> 24) as u8);
    }
    out
}

#[async_trait]
impl ProducerHandler for StubAudioProducer {
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
                    data: fake_wave(&format!("{}:{artefact_id}", self.label), 256),
                    mime_type: "audio/wav".to_string(),
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
