//! Hashing System - SHA-256 for Compiled Icons
//!
//! Provides deterministic, reproducible hashes so a re-authored draft can be
//! checked for actual change.

use sha2::{Sha256, Digest};
use serde::Serialize;
use serde_json::{Value, to_string};

/// Lowercase hex SHA-256 digest. Both icon hashes go through here.
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    hex::encode(result)
}

/// Compact JSON with object keys sorted at every depth, so field order
/// never changes a hash.
pub fn canonical_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let v: Value = serde_json::to_value(value)?;
    to_string(&sort_value(&v))
}

fn sort_value(v: &Value) -> Value {
    match v {
        Value::Object(map) => {
            let mut sorted: Vec<_> = map.iter().collect();
            sorted.sort_by(|a, b| a.0.cmp(b.0));
            let sorted_map: serde_json::Map<String, Value> = sorted
                .into_iter()
                .map(|(k, v)| (k.clone(), sort_value(v)))
                .collect();
            Value::Object(sorted_map)
        }
        Value::Array(arr) => {
            Value::Array(arr.iter().map(sort_value).collect())
        }
        _ => v.clone()
    }
}

/// `specHash`: digest of the expanded spec in canonical form.
pub fn compute_spec_hash<T: Serialize>(spec: &T) -> Result<String, serde_json::Error> {
    let canonical = canonical_json(spec)?;
    Ok(sha256_hex(canonical.as_bytes()))
}

/// `svgHash`: digest of the minified markup.
pub fn compute_svg_hash(svg_minified: &str) -> String {
    sha256_hex(svg_minified.as_bytes())
}

// sha2 hands back raw bytes
mod hex {
    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        bytes.as_ref().iter().map(|b| format!("{:02x}", b)).collect()
    }
}
