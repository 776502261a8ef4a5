//! Opaque versioned binary snapshots for the undo/redo stack.
//!
//! Layout: 4-byte magic, little-endian u32 format version, bincode payload.
//! Any mismatch is a fatal load error for the affected state; recovery is the
//! persistence layer's problem, not ours.

use serde::de::DeserializeOwned;
use serde::Serialize;

const MAGIC: [u8; 4] = *b"MPSS";
const FORMAT_VERSION: u32 = 1;

pub fn save_snapshot<T: Serialize>(value: &T) -> Result<Vec<u8>, String> {
    let payload =
        bincode::serialize(value).map_err(|e| format!("snapshot encode failed: {e}"))?;
    let mut out = Vec::with_capacity(8 + payload.len());
    out.extend_from_slice(&MAGIC);
    out.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    out.extend_from_slice(&payload);
    Ok(out)
}

pub fn load_snapshot<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, String> {
    if bytes.len() < 8 {
        return Err("snapshot truncated: missing header".to_string());
    }
    if bytes[0..4] != MAGIC {
        return Err("snapshot rejected: bad magic".to_string());
    }
    let version = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
    if version != FORMAT_VERSION {
        return Err(format!(
            "snapshot rejected: format version {version}, expected {FORMAT_VERSION}"
        ));
    }
    bincode::deserialize(&bytes[8..]).map_err(|e| format!("snapshot decode failed: {e}"))
}
