//! Supplemental helper: the set of blob hashes referenced by a manifest,
//! for callers that want to garbage-collect orphaned blobs. The core spec
//! promises no file is ever deleted automatically (§6.1); this only
//! computes the live set, it never deletes anything itself.

use std::collections::BTreeSet;
use std::path::Path;

use reelforge_core::model::manifest::Manifest;

/// Every blob hash reachable from `manifest`'s artefact entries.
pub fn referenced_blob_hashes(manifest: &Manifest) -> BTreeSet<String> {
    manifest
        .artefacts
        .values()
        .filter_map(|entry| entry.blob.as_ref().map(|b| b.hash.clone()))
        .collect()
}

/// Every blob hash actually present under a movie's `blobs/` directory on
/// local disk, named by its file name rather than re-derived from content.
/// Pair with [`referenced_blob_hashes`] to find orphaned blobs; nothing here
/// deletes anything.
pub fn local_blob_hashes_on_disk(movie_blobs_dir: &Path) -> BTreeSet<String> {
    if !movie_blobs_dir.is_dir() {
        return BTreeSet::new();
    }
    walkdir::WalkDir::new(movie_blobs_dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
        .collect()
}
