//! Canonical JSON encoding.
//!
//! Canonicalization rules (fixed, not configurable — every hash in this
//! system depends on them never drifting):
//! - `null` and missing/absent values canonicalize to JSON `null`.
//! - object keys are sorted ascending, byte-wise, and recursed into.
//! - arrays retain their original order; elements are recursed into.
//! - non-finite numbers (`NaN`, `Infinity`, `-Infinity`) canonicalize to
//!   their textual form as a JSON string, since JSON itself has no way to
//!   represent them.
//! - every other scalar passes through unchanged.

use serde_json::Value;

use crate::errors::{CoreError, CoreResult};

/// Canonicalize a JSON value according to the rules above.
pub fn canonicalize_json(v: &Value) -> CoreResult<Value> {
    Ok(canonicalize_inner(v))
}

fn canonicalize_inner(v: &Value) -> Value {
    match v {
        Value::Null => Value::Null,
        Value::Bool(b) => Value::Bool(*b),
        Value::Number(n) => match n.as_f64() {
            Some(f) if !f.is_finite() => Value::String(non_finite_token(f)),
            _ => Value::Number(n.clone()),
        },
        Value::String(s) => Value::String(s.clone()),
        Value::Array(items) => Value::Array(items.iter().map(canonicalize_inner).collect()),
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut out = serde_json::Map::with_capacity(map.len());
            for k in keys {
                out.insert(k.clone(), canonicalize_inner(&map[k]));
            }
            Value::Object(out)
        }
    }
}

fn non_finite_token(f: f64) -> String {
    if f.is_nan() {
        "NaN".to_string()
    } else if f > 0.0 {
        "Infinity".to_string()
    } else {
        "-Infinity".to_string()
    }
}

/// Canonicalize an arbitrary serializable value, treating `None`/missing as
/// `null` the same way `serde_json::to_value` already does for `Option`.
pub fn canonicalize_value<T: serde::Serialize>(v: &T) -> CoreResult<Value> {
    let raw = serde_json::to_value(v).map_err(|e| CoreError::serialization(e.to_string()))?;
    canonicalize_json(&raw)
}

/// Serialize a canonical value to its deterministic byte representation.
/// Object keys are already sorted by [`canonicalize_json`]; `serde_json`
/// preserves insertion order for `Map`, so a compact `to_vec` over the
/// canonical value is itself deterministic.
pub fn to_canonical_bytes(v: &Value) -> CoreResult<Vec<u8>> {
    let canonical = canonicalize_json(v)?;
    serde_json::to_vec(&canonical).map_err(|e| CoreError::serialization(e.to_string()))
}
