//! Append-only event records: `InputEvent` and `ArtefactEvent`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Who (or what) produced an input edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditedBy {
    User,
    Workflow,
    System,
}

/// One event per `(input id, revision)` actually edited. `hash` is the
/// canonical content hash of `payload`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputEvent {
    pub id: String,
    pub revision: String,
    pub hash: String,
    pub payload: Value,
    pub edited_by: EditedBy,
    pub created_at: String,
}

/// A content-addressed blob reference, recorded in place of raw bytes once
/// the runner has persisted them under `blobs/<hash[0:2]>/<hash>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlobRef {
    pub hash: String,
    pub size: u64,
    pub mime_type: String,
}

/// An artefact's materialized output: either a blob reference or an inline
/// string, never both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ArtefactOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blob: Option<BlobRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline: Option<String>,
}

/// Terminal state of a job's contribution to one artefact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtefactStatus {
    Succeeded,
    Failed,
    Skipped,
}

/// `inputsHash` is `hash(sorted(inputs))` of the producing job — see
/// [`crate::determinism::hashing::hash_inputs`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtefactEvent {
    pub artefact_id: String,
    pub revision: String,
    pub inputs_hash: String,
    pub output: ArtefactOutput,
    pub status: ArtefactStatus,
    pub produced_by: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<Value>,
    pub created_at: String,
}

/// Sentinel `inputsHash` recorded for artefact events appended directly by a
/// caller as "pending artefacts" rather than produced by a job.
pub const MANUAL_EDIT_INPUTS_HASH: &str = "manual-edit";
