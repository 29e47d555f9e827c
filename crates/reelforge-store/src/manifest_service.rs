//! Manifest load/save/rebuild (§4.4): pointer-mediated optimistic
//! concurrency over atomically written snapshots.

use std::sync::Arc;

use reelforge_core::clock::Clock;
use reelforge_core::determinism::hashing::hash_bytes_hex;
use reelforge_core::model::events::ArtefactStatus;
use reelforge_core::model::manifest::{Manifest, ManifestArtefactEntry, ManifestInputEntry, Pointer};

use crate::errors::{StoreError, StoreResult};
use crate::event_log::EventLog;
use crate::storage_context::{resolve, StorageContext};

pub struct ManifestService {
    ctx: Arc<dyn StorageContext>,
}

/// A loaded manifest alongside the pointer's recorded hash, so callers can
/// pass it straight back as `previousHash` on the next `save_manifest`.
pub struct LoadedManifest {
    pub manifest: Manifest,
    pub hash: String,
}

impl ManifestService {
    pub fn new(ctx: Arc<dyn StorageContext>) -> Self {
        Self { ctx }
    }

    fn pointer_path(movie_id: &str) -> StoreResult<String> {
        resolve(movie_id, &["current.json"])
    }

    fn manifest_path(revision: &str) -> String {
        format!("manifests/{revision}.json")
    }

    fn read_pointer(&self, movie_id: &str) -> StoreResult<Option<Pointer>> {
        let path = Self::pointer_path(movie_id)?;
        if !self.ctx.file_exists(&path) {
            return Ok(None);
        }
        let bytes = self.ctx.read_to_buffer(&path)?;
        let pointer: Pointer = serde_json::from_slice(&bytes)?;
        if pointer.is_empty() {
            return Ok(None);
        }
        Ok(Some(pointer))
    }

    /// `loadCurrent` (§4.4): `ManifestNotFound` if the pointer is absent or
    /// empty; `ManifestConflict` if the pointer's recorded hash disagrees
    /// with the manifest file's actual bytes.
    pub fn load_current(&self, movie_id: &str) -> StoreResult<LoadedManifest> {
        let pointer = self
            .read_pointer(movie_id)?
            .ok_or_else(|| StoreError::ManifestNotFound(movie_id.to_string()))?;
        let manifest_path = pointer
            .manifest_path
            .clone()
            .ok_or_else(|| StoreError::ManifestNotFound(movie_id.to_string()))?;
        let full_path = resolve(movie_id, &manifest_path.split('/').collect::<Vec<_>>())?;
        let bytes = self.ctx.read_to_buffer(&full_path)?;
        let actual_hash = hash_bytes_hex(&bytes);
        if Some(&actual_hash) != pointer.hash.as_ref() {
            return Err(StoreError::ManifestConflict {
                expected: pointer.hash.clone(),
                found: Some(actual_hash),
            });
        }
        let manifest: Manifest = serde_json::from_slice(&bytes)?;
        Ok(LoadedManifest {
            manifest,
            hash: actual_hash,
        })
    }

    /// `saveManifest` (§4.4): optimistic-concurrency check against
    /// `previous_hash` (with `None == None`), then atomic manifest write
    /// followed by atomic pointer swap. The previous snapshot is never
    /// deleted.
    pub fn save_manifest(
        &self,
        movie_id: &str,
        manifest: &Manifest,
        previous_hash: Option<&str>,
        clock: &dyn Clock,
    ) -> StoreResult<String> {
        let current = self.read_pointer(movie_id)?;
        let current_hash = current.as_ref().and_then(|p| p.hash.clone());
        if current_hash.as_deref() != previous_hash {
            return Err(StoreError::ManifestConflict {
                expected: previous_hash.map(str::to_string),
                found: current_hash,
            });
        }

        let manifest_rel = Self::manifest_path(&manifest.revision);
        let manifest_path = resolve(movie_id, &manifest_rel.split('/').collect::<Vec<_>>())?;
        let bytes = serde_json::to_vec_pretty(manifest)?;
        self.ctx.write_file_atomic(&manifest_path, &bytes)?;
        let new_hash = hash_bytes_hex(&bytes);

        let pointer = Pointer {
            revision: Some(manifest.revision.clone()),
            manifest_path: Some(manifest_rel),
            hash: Some(new_hash.clone()),
            updated_at: Some(clock.now()),
        };
        let pointer_path = Self::pointer_path(movie_id)?;
        let pointer_bytes = serde_json::to_vec_pretty(&pointer)?;
        self.ctx.write_file_atomic(&pointer_path, &pointer_bytes)?;
        Ok(new_hash)
    }

    /// `buildFromEvents` (§4.4): scan both logs in revision order, keeping
    /// the latest edit per input id and the latest `succeeded` event per
    /// artefact id.
    pub fn build_from_events(
        &self,
        movie_id: &str,
        target_revision: &str,
        base_revision: Option<&str>,
        event_log: &EventLog,
        clock: &dyn Clock,
    ) -> StoreResult<Manifest> {
        let mut manifest = Manifest::empty_at(target_revision, clock.now());
        manifest.base_revision = base_revision.map(str::to_string);

        for event in event_log.stream_inputs(movie_id, None)? {
            manifest.inputs.insert(
                event.id.clone(),
                ManifestInputEntry {
                    hash: event.hash.clone(),
                    payload_digest: event.hash,
                    created_at: event.created_at,
                },
            );
        }

        for event in event_log.stream_artefacts(movie_id, None)? {
            if event.status != ArtefactStatus::Succeeded {
                continue;
            }
            manifest.artefacts.insert(
                event.artefact_id.clone(),
                ManifestArtefactEntry {
                    hash: reelforge_core::determinism::hashing::hash_artefact_output(&event.output)?.hash,
                    blob: event.output.blob,
                    inline: event.output.inline,
                    produced_by: event.produced_by,
                    status: event.status,
                    diagnostics: event.diagnostics,
                    created_at: event.created_at,
                },
            );
        }

        Ok(manifest)
    }
}
