use reelforge_core::clock::FixedClock;
use reelforge_core::model::manifest::Manifest;
use reelforge_store::{ManifestService, StoreError};

use crate::support::in_memory_ctx;

/// `save_manifest` is optimistic-concurrency guarded: a stale or wrong
/// `previousHash` is rejected rather than silently overwriting whatever is
/// actually on the pointer.
#[test]
fn save_manifest_rejects_a_stale_previous_hash() {
    let ctx = in_memory_ctx();
    let service = ManifestService::new(ctx);
    let clock = FixedClock::epoch();

    let first = Manifest::empty_at("rev-0001", clock.now());
    let first_hash = service.save_manifest("movie-conflict", &first, None, &clock).unwrap();

    let second = Manifest::empty_at("rev-0002", clock.now());
    // Saving against `None` again, as if this caller never saw rev-0001,
    // should be rejected now that the pointer has moved on.
    let result = service.save_manifest("movie-conflict", &second, None, &clock);
    assert!(matches!(result, Err(StoreError::ManifestConflict { .. })));

    // Saving with the correct previous hash succeeds and moves the pointer.
    let second_hash = service
        .save_manifest("movie-conflict", &second, Some(&first_hash), &clock)
        .unwrap();
    assert_ne!(first_hash, second_hash);

    let loaded = service.load_current("movie-conflict").unwrap();
    assert_eq!(loaded.manifest.revision, "rev-0002");
    assert_eq!(loaded.hash, second_hash);
}
