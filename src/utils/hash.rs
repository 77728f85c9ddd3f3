use hex;
use sha2::{Digest, Sha256};

use crate::blockchain::Block;

/// SHA-256 digest of a block over its canonical JSON form.
///
/// The block is first converted to a `serde_json::Value`; the value's object
/// map is BTree-backed, so keys always serialize in sorted order and two
/// structurally identical blocks hash to the same digest no matter how their
/// fields were ordered on the wire. The validator and the proof-of-work
/// engine both rely on this being byte-identical across nodes.
pub fn hash_block(block: &Block) -> String {
    let canonical = serde_json::to_value(block)
        .expect("a block always converts to a JSON value");
    let serialized = serde_json::to_string(&canonical)
        .expect("a JSON value always serializes");

    let mut hasher = Sha256::new();
    hasher.update(serialized.as_bytes());

    hex::encode(hasher.finalize())
}
