//! Content-addressed blob storage: `blobs/<hash[0:2]>/<hash>`, written
//! atomically and immutable once present (§3.8, §4.8 step 4).

use reelforge_core::determinism::hashing::hash_bytes_hex;

use crate::errors::StoreResult;
use crate::storage_context::{resolve, StorageContext};

/// Relative path of a blob given its hash, rooted at the movie directory.
pub fn blob_path(movie_id: &str, hash: &str) -> StoreResult<String> {
    let prefix = &hash[..hash.len().min(2)];
    resolve(movie_id, &["blobs", prefix, hash])
}

/// Persist `bytes` under its sha256 hash, idempotent if already present.
/// Returns the hash.
pub fn put_blob(ctx: &dyn StorageContext, movie_id: &str, bytes: &[u8]) -> StoreResult<String> {
    let hash = hash_bytes_hex(bytes);
    let path = blob_path(movie_id, &hash)?;
    if !ctx.file_exists(&path) {
        ctx.write_file_atomic(&path, bytes)?;
    }
    Ok(hash)
}

pub fn get_blob(ctx: &dyn StorageContext, movie_id: &str, hash: &str) -> StoreResult<Vec<u8>> {
    let path = blob_path(movie_id, hash)?;
    ctx.read_to_buffer(&path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage_context::InMemoryStorageContext;

    #[test]
    fn put_then_get_round_trips() {
        let ctx = InMemoryStorageContext::new();
        let hash = put_blob(&ctx, "movie-1", b"hello").unwrap();
        assert_eq!(get_blob(&ctx, "movie-1", &hash).unwrap(), b"hello");
    }

    #[test]
    fn put_is_idempotent() {
        let ctx = InMemoryStorageContext::new();
        let h1 = put_blob(&ctx, "movie-1", b"same").unwrap();
        let h2 = put_blob(&ctx, "movie-1", b"same").unwrap();
        assert_eq!(h1, h2);
    }
}
