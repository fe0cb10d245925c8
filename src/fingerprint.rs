//! Stable fingerprinting for cache keys.
//!
//! Board states and piece sets are hashed via a canonical JSON encoding
//! (sorted object keys, no insignificant whitespace) fed through SHA-1,
//! mirroring `_hash_json`/`hash_board_state`/`hash_pieces` from the
//! reference implementation this crate's session/cache layer generalizes.
//! Per spec, the pieces hash is invariant under piece-list reordering: it
//! is computed over pieces sorted by id and reduced to `(id, shape)`.

use serde::Serialize;
use serde_json::{json, Value};
use sha1::{Digest, Sha1};

use crate::grid::Board;
use crate::pieces::Piece;

/// Serializes `value` to JSON with object keys sorted, then hex-encodes its
/// SHA-1 digest.
fn hash_json<T: Serialize>(value: &T) -> String {
    let json = serde_json::to_value(value).expect("fingerprint inputs are always serializable");
    let canonical = canonicalize_value(&json);

    let mut hasher = Sha1::new();
    hasher.update(canonical.as_bytes());
    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

/// Renders a `serde_json::Value` with object keys in sorted order and no
/// extraneous whitespace, recursively.
fn canonicalize_value(value: &Value) -> String {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let parts: Vec<String> = keys
                .into_iter()
                .map(|k| {
                    format!(
                        "{}:{}",
                        serde_json::to_string(k).unwrap(),
                        canonicalize_value(&map[k])
                    )
                })
                .collect();
            format!("{{{}}}", parts.join(","))
        }
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().map(canonicalize_value).collect();
            format!("[{}]", parts.join(","))
        }
        other => other.to_string(),
    }
}

/// Hashes `{w, h, board}` for use in a cache key.
pub fn hash_board_state(width: usize, height: usize, board: &Board) -> String {
    hash_json(&json!({ "w": width, "h": height, "board": board }))
}

/// Hashes a piece set for use in a cache key: pieces are sorted by id and
/// reduced to `(id, shape)` first, so the hash is invariant under
/// piece-list reordering and ignores `name`/`color`.
pub fn hash_pieces(pieces: &[Piece]) -> String {
    let mut reduced: Vec<Value> = pieces
        .iter()
        .map(|p| json!({ "id": p.id, "shape": p.shape }))
        .collect();
    reduced.sort_by_key(|v| v["id"].as_u64().unwrap());
    hash_json(&reduced)
}

/// The pair of cache keys for a given solve request: the solutions list key
/// and its companion metadata key.
pub struct CacheKeys {
    pub solutions_key: String,
    pub meta_key: String,
}

/// Builds the cache key pair for a `width`x`height` board with this piece
/// set and board state, following the reference naming scheme:
/// `kanoodle:solutions:<W>x<H>:<pieces-hash>:<board-hash>` plus a `:meta`
/// suffix for the companion key.
pub fn make_cache_keys(width: usize, height: usize, pieces: &[Piece], board: &Board) -> CacheKeys {
    let pieces_hash = hash_pieces(pieces);
    let board_hash = hash_board_state(width, height, board);
    let base = format!("kanoodle:solutions:{width}x{height}:{pieces_hash}:{board_hash}");
    CacheKeys {
        meta_key: format!("{base}:meta"),
        solutions_key: base,
    }
}
