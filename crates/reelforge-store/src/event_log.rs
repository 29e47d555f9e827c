//! The append-only per-movie event logs (§3.5, §4.3): `events/inputs.log`
//! and `events/artefacts.log`, one JSON object per line.

use std::sync::Arc;

use reelforge_core::model::events::{ArtefactEvent, InputEvent};

use crate::errors::StoreResult;
use crate::storage_context::{resolve, StorageContext};

pub struct EventLog {
    ctx: Arc<dyn StorageContext>,
}

impl EventLog {
    pub fn new(ctx: Arc<dyn StorageContext>) -> Self {
        Self { ctx }
    }

    pub fn append_input(&self, movie_id: &str, event: &InputEvent) -> StoreResult<()> {
        let path = resolve(movie_id, &["events", "inputs.log"])?;
        let mut line = serde_json::to_vec(event)?;
        line.push(b'\n');
        self.ctx.append(&path, &line)
    }

    pub fn append_artefact(&self, movie_id: &str, event: &ArtefactEvent) -> StoreResult<()> {
        let path = resolve(movie_id, &["events", "artefacts.log"])?;
        let mut line = serde_json::to_vec(event)?;
        line.push(b'\n');
        self.ctx.append(&path, &line)
    }

    /// Lazy in the sense that it re-reads the underlying file fresh each
    /// call rather than caching a cursor (§9 design notes); finite because
    /// the log is bounded, restartable because calling this again from
    /// scratch yields the same sequence.
    pub fn stream_inputs(&self, movie_id: &str, since_revision: Option<&str>) -> StoreResult<Vec<InputEvent>> {
        let path = resolve(movie_id, &["events", "inputs.log"])?;
        self.read_lines(&path, since_revision, |e: &InputEvent| e.revision.as_str())
    }

    pub fn stream_artefacts(
        &self,
        movie_id: &str,
        since_revision: Option<&str>,
    ) -> StoreResult<Vec<ArtefactEvent>> {
        let path = resolve(movie_id, &["events", "artefacts.log"])?;
        self.read_lines(&path, since_revision, |e: &ArtefactEvent| e.revision.as_str())
    }

    fn read_lines<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        since_revision: Option<&str>,
        revision_of: fn(&T) -> &str,
    ) -> StoreResult<Vec<T>> {
        if !self.ctx.file_exists(path) {
            return Ok(Vec::new());
        }
        let contents = self.ctx.read_to_string(path)?;
        let mut out = Vec::new();
        for line in contents.lines() {
            if line.trim().is_empty() {
                continue;
            }
            let event: T = serde_json::from_str(line)?;
            let keep = match since_revision {
                Some(since) => revision_numeric(revision_of(&event)) > revision_numeric(since),
                None => true,
            };
            if keep {
                out.push(event);
            }
        }
        Ok(out)
    }
}

fn revision_numeric(rev: &str) -> u64 {
    rev.strip_prefix("rev-").and_then(|s| s.parse().ok()).unwrap_or(0)
}
