//! Deterministic hashing utilities.
//!
//! `hash_payload` is the single entry point every other hashing helper in
//! this system builds on: it canonicalizes a JSON-like value and hashes the
//! canonical bytes with sha256.

use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::determinism::canonical_json::{canonicalize_value, to_canonical_bytes};
use crate::errors::CoreResult;
use crate::model::events::ArtefactOutput;

/// A value's canonical encoding alongside its hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashDigest {
    pub canonical: Value,
    pub hash: String,
}

/// Hash raw bytes, returning a lowercase hex-encoded sha256 digest.
pub fn hash_bytes_hex(bytes: &[u8]) -> String {
    let mut h = Sha256::new();
    h.update(bytes);
    hex::encode(h.finalize())
}

/// Canonicalize and hash an arbitrary serializable payload.
pub fn hash_payload<T: Serialize>(v: &T) -> CoreResult<HashDigest> {
    let canonical = canonicalize_value(v)?;
    let bytes = to_canonical_bytes(&canonical)?;
    Ok(HashDigest {
        canonical,
        hash: hash_bytes_hex(&bytes),
    })
}

/// Hash an input's payload. Thin, named wrapper over [`hash_payload`] so call
/// sites read as domain operations rather than generic JSON hashing.
pub fn hash_input_payload(payload: &Value) -> CoreResult<HashDigest> {
    hash_payload(payload)
}

/// Hash an artefact's output (`{blob?, inline?}`).
pub fn hash_artefact_output(output: &ArtefactOutput) -> CoreResult<HashDigest> {
    hash_payload(output)
}

/// `hash(sorted(ids))` — the `inputsHash` recorded on every `ArtefactEvent`
/// and used by the runner to key produced artefacts to the set of inputs
/// that produced them.
pub fn hash_inputs(ids: &[String]) -> CoreResult<String> {
    let mut sorted = ids.to_vec();
    sorted.sort();
    Ok(hash_payload(&sorted)?.hash)
}
