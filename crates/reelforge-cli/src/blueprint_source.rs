//! A filesystem-backed `BlueprintSource`. `reelforge-planner` only ships an
//! in-memory source for tests — it stays strictly I/O-free so the rest of
//! the planner crate does too. Resolving a `sub_blueprints[].source` string
//! to an actual file on disk is this crate's job, the way `reelforge-store`
//! is the only crate that touches movie storage.

use std::path::{Path, PathBuf};

use reelforge_planner::{BlueprintSource, PlannerError, PlannerResult};

pub struct FsBlueprintSource {
    root: PathBuf,
}

impl FsBlueprintSource {
    /// `root` is the directory every `source` string is resolved relative
    /// to — in practice, the root blueprint file's parent directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolved_path(&self, source: &str) -> PathBuf {
        let candidate = Path::new(source);
        if candidate.is_absolute() {
            candidate.to_path_buf()
        } else {
            self.root.join(candidate)
        }
    }
}

impl BlueprintSource for FsBlueprintSource {
    fn load(&self, source: &str) -> PlannerResult<String> {
        let path = self.resolved_path(source);
        std::fs::read_to_string(&path)
            .map_err(|e| PlannerError::SourceNotFound(format!("{}: {e}", path.display())))
    }
}
