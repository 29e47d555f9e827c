//! A thin path abstraction over a backing store (§4.1): local directory or
//! in-memory, chosen at construction. Every write that must be crash-safe
//! goes through `write_file_atomic`; every append goes through a per-path
//! serialized queue so concurrent writers never interleave a line.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write as _;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::errors::{StoreError, StoreResult};

/// Join a movie id and path segments into a normalized, traversal-free
/// POSIX relative path.
pub fn resolve(movie_id: &str, segments: &[&str]) -> StoreResult<String> {
    if movie_id.is_empty() {
        return Err(StoreError::InvalidPath("empty movieId".into()));
    }
    let mut parts = vec![movie_id];
    for seg in segments {
        if seg.is_empty() || seg.contains("..") || seg.contains('\\') {
            return Err(StoreError::InvalidPath(format!(
                "invalid path segment: '{seg}'"
            )));
        }
        parts.push(seg);
    }
    Ok(path_clean::clean(parts.join("/")).to_string_lossy().replace('\\', "/"))
}

/// A registry of per-path mutexes, keyed by normalized relative path, so
/// concurrent appends to the same file never interleave (§4.1).
#[derive(Default)]
struct AppendLocks {
    locks: Mutex<BTreeMap<String, Arc<Mutex<()>>>>,
}

impl AppendLocks {
    fn lock_for(&self, path: &str) -> Arc<Mutex<()>> {
        self.locks
            .lock()
            .entry(path.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

/// Storage operations the rest of the store crate depends on. Implemented
/// by a local filesystem backend and an in-memory backend for tests.
pub trait StorageContext: Send + Sync {
    fn write_file_atomic(&self, path: &str, bytes: &[u8]) -> StoreResult<()>;
    fn append(&self, path: &str, data: &[u8]) -> StoreResult<()>;
    fn read_to_buffer(&self, path: &str) -> StoreResult<Vec<u8>>;
    fn file_exists(&self, path: &str) -> bool;
    fn directory_exists(&self, path: &str) -> bool;
    fn create_directory(&self, path: &str) -> StoreResult<()>;
    fn move_file(&self, from: &str, to: &str) -> StoreResult<()>;

    fn read_to_string(&self, path: &str) -> StoreResult<String> {
        let bytes = self.read_to_buffer(path)?;
        String::from_utf8(bytes).map_err(|e| StoreError::InvalidPath(e.to_string()))
    }
}

/// Local-filesystem backend rooted at `base_path`.
pub struct LocalStorageContext {
    base_path: PathBuf,
    append_locks: AppendLocks,
    tmp_counter: AtomicU64,
}

impl LocalStorageContext {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            append_locks: AppendLocks::default(),
            tmp_counter: AtomicU64::new(0),
        }
    }

    fn full_path(&self, path: &str) -> PathBuf {
        self.base_path.join(path)
    }
}

impl StorageContext for LocalStorageContext {
    fn write_file_atomic(&self, path: &str, bytes: &[u8]) -> StoreResult<()> {
        let full = self.full_path(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent)?;
        }
        let n = self.tmp_counter.fetch_add(1, Ordering::Relaxed);
        let tmp = full.with_extension(format!("tmp-{n}"));
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, &full)?;
        Ok(())
    }

    fn append(&self, path: &str, data: &[u8]) -> StoreResult<()> {
        let lock = self.append_locks.lock_for(path);
        let _guard = lock.lock();
        let full = self.full_path(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut f = fs::OpenOptions::new().create(true).append(true).open(&full)?;
        f.write_all(data)?;
        Ok(())
    }

    fn read_to_buffer(&self, path: &str) -> StoreResult<Vec<u8>> {
        Ok(fs::read(self.full_path(path))?)
    }

    fn file_exists(&self, path: &str) -> bool {
        self.full_path(path).is_file()
    }

    fn directory_exists(&self, path: &str) -> bool {
        self.full_path(path).is_dir()
    }

    fn create_directory(&self, path: &str) -> StoreResult<()> {
        fs::create_dir_all(self.full_path(path))?;
        Ok(())
    }

    fn move_file(&self, from: &str, to: &str) -> StoreResult<()> {
        let to_full = self.full_path(to);
        if let Some(parent) = to_full.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::rename(self.full_path(from), to_full)?;
        Ok(())
    }
}

/// In-memory backend for tests: a flat map from normalized path to bytes.
#[derive(Default)]
pub struct InMemoryStorageContext {
    files: RwLock<BTreeMap<String, Vec<u8>>>,
    directories: RwLock<std::collections::BTreeSet<String>>,
    append_locks: AppendLocks,
}

impl InMemoryStorageContext {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageContext for InMemoryStorageContext {
    fn write_file_atomic(&self, path: &str, bytes: &[u8]) -> StoreResult<()> {
        self.files.write().insert(path.to_string(), bytes.to_vec());
        Ok(())
    }

    fn append(&self, path: &str, data: &[u8]) -> StoreResult<()> {
        let lock = self.append_locks.lock_for(path);
        let _guard = lock.lock();
        let mut files = self.files.write();
        let entry = files.entry(path.to_string()).or_default();
        entry.extend_from_slice(data);
        Ok(())
    }

    fn read_to_buffer(&self, path: &str) -> StoreResult<Vec<u8>> {
        self.files
            .read()
            .get(path)
            .cloned()
            .ok_or_else(|| StoreError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, path)))
    }

    fn file_exists(&self, path: &str) -> bool {
        self.files.read().contains_key(path)
    }

    fn directory_exists(&self, path: &str) -> bool {
        self.directories.read().contains(path)
            || self.files.read().keys().any(|p| p.starts_with(&format!("{path}/")))
    }

    fn create_directory(&self, path: &str) -> StoreResult<()> {
        self.directories.write().insert(path.to_string());
        Ok(())
    }

    fn move_file(&self, from: &str, to: &str) -> StoreResult<()> {
        let mut files = self.files.write();
        let bytes = files
            .remove(from)
            .ok_or_else(|| StoreError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, from)))?;
        files.insert(to.to_string(), bytes);
        Ok(())
    }
}

/// `initializeMovieStorage` (§4.1): create the per-movie directory
/// skeleton and the zero-length event logs, optionally seeding an empty
/// pointer.
pub fn initialize_movie_storage(
    ctx: &dyn StorageContext,
    movie_id: &str,
    seed_current_json: bool,
) -> StoreResult<()> {
    for dir in ["manifests", "events", "runs", "blobs"] {
        ctx.create_directory(&resolve(movie_id, &[dir])?)?;
    }
    for log in ["events/inputs.log", "events/artefacts.log"] {
        let path = resolve(movie_id, &log.split('/').collect::<Vec<_>>())?;
        if !ctx.file_exists(&path) {
            ctx.write_file_atomic(&path, b"")?;
        }
    }
    if seed_current_json {
        let pointer_path = resolve(movie_id, &["current.json"])?;
        if !ctx.file_exists(&pointer_path) {
            let empty = reelforge_core::prelude::Pointer::empty();
            let bytes = serde_json::to_vec_pretty(&empty)?;
            ctx.write_file_atomic(&pointer_path, &bytes)?;
        }
    }
    Ok(())
}
