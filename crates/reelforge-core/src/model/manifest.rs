//! The manifest snapshot and the on-disk pointer that names the current
//! revision (§3.6).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::events::{ArtefactStatus, BlobRef};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestInputEntry {
    pub hash: String,
    pub payload_digest: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestArtefactEntry {
    pub hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blob: Option<BlobRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline: Option<String>,
    pub produced_by: String,
    pub status: ArtefactStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<Value>,
    pub created_at: String,
}

/// A rebuildable snapshot of "current state": the latest succeeded event per
/// input/artefact id as of `revision`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub revision: String,
    pub base_revision: Option<String>,
    pub created_at: String,
    pub inputs: BTreeMap<String, ManifestInputEntry>,
    pub artefacts: BTreeMap<String, ManifestArtefactEntry>,
    #[serde(default)]
    pub timeline: Value,
}

impl Manifest {
    /// The empty pseudo-manifest synthesized when a movie has no pointer
    /// yet (§4.9 step 1).
    pub fn empty_at(revision: impl Into<String>, created_at: impl Into<String>) -> Self {
        Self {
            revision: revision.into(),
            base_revision: None,
            created_at: created_at.into(),
            inputs: BTreeMap::new(),
            artefacts: BTreeMap::new(),
            timeline: Value::Object(serde_json::Map::new()),
        }
    }
}

/// `<movie>/current.json`: the atomically swapped pointer to the current
/// manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Pointer {
    pub revision: Option<String>,
    pub manifest_path: Option<String>,
    pub hash: Option<String>,
    pub updated_at: Option<String>,
}

impl Pointer {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.revision.is_none() && self.manifest_path.is_none() && self.hash.is_none()
    }
}
