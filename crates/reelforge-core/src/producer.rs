//! The produce callback contract (§6.3): the one seam through which the
//! core depends on generative work, injected at construction rather than
//! resolved through a global plugin registry (§9 design notes).

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::events::ArtefactStatus;
use crate::model::plan::Job;

/// A resolved input value, handed to the producer so it never has to read
/// storage itself (§4.8 step 2 is the runner's job, not the producer's).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum ResolvedInput {
    /// A plain input value, taken verbatim from `resolvedInputs`.
    Value { value: Value },
    /// An upstream artefact whose output carried an `inline` string.
    ArtefactInline { text: String },
    /// An upstream artefact whose output carried a blob, already fetched
    /// from `blobs/<hash[0:2]>/<hash>`.
    ArtefactBlob { data: Vec<u8>, mime_type: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProduceRequest {
    pub movie_id: String,
    pub job: Job,
    pub layer_index: usize,
    pub attempt: u32,
    pub revision: String,
    pub resolved_inputs: BTreeMap<String, ResolvedInput>,
}

/// A raw blob payload as returned by a producer, prior to the runner
/// hashing and persisting it (§4.8 step 4).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBlob {
    pub data: Vec<u8>,
    pub mime_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProducedArtefact {
    pub artefact_id: String,
    pub status: ArtefactStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blob: Option<RawBlob>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProduceResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ArtefactStatus>,
    pub artefacts: Vec<ProducedArtefact>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<Value>,
}

/// The produce callback contract, as an object-safe async trait so the
/// runner can be constructed with any implementation — a real provider
/// bridge, a builtin stub, or a test double. Returning `Err` is equivalent
/// to the callback throwing: the runner treats it as job failure (§6.3).
#[async_trait]
pub trait ProducerHandler: Send + Sync {
    async fn produce(&self, request: ProduceRequest) -> anyhow::Result<ProduceResult>;
}
