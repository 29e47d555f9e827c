use std::path::Path;

use anyhow::Result;
use serde::Serialize;

use reelforge_store::{ManifestService, StoreConfig, StoreError};

use crate::output;

#[derive(Debug, Serialize)]
pub struct Check {
    pub name: String,
    pub ok: bool,
    pub detail: String,
}

#[derive(Debug, Serialize)]
pub struct DoctorOut {
    pub ok: bool,
    pub checks: Vec<Check>,
}

pub async fn run(store_root: &str, movie_id: Option<&str>) -> Result<()> {
    let mut checks = Vec::new();

    let root = Path::new(store_root);
    let root_exists = root.exists();
    checks.push(Check {
        name: "store_root_exists".to_string(),
        ok: root_exists,
        detail: format!("{store_root} (created lazily by `init` if absent)"),
    });

    let writable = is_writable(root);
    checks.push(Check {
        name: "store_root_writable".to_string(),
        ok: writable,
        detail: "probe write + remove under the store root".to_string(),
    });

    if let Some(movie_id) = movie_id {
        let ctx = StoreConfig::local_dev(store_root).open();
        let service = ManifestService::new(ctx);
        let (ok, detail) = match service.load_current(movie_id) {
            Ok(loaded) => (true, format!("pointer ok, revision {}", loaded.manifest.revision)),
            Err(StoreError::ManifestNotFound(_)) => (true, "no pointer yet (movie uninitialized or empty)".to_string()),
            Err(other) => (false, other.to_string()),
        };
        checks.push(Check {
            name: format!("movie_pointer[{movie_id}]"),
            ok,
            detail,
        });
    }

    let ok = checks.iter().all(|c| c.ok);
    output::print(&DoctorOut { ok, checks })?;
    Ok(())
}

fn is_writable(root: &Path) -> bool {
    let probe = root.join(".reelforge-doctor-probe");
    if std::fs::create_dir_all(root).is_err() {
        return false;
    }
    let wrote = std::fs::write(&probe, b"ok").is_ok();
    let _ = std::fs::remove_file(&probe);
    wrote
}
