//! Content fingerprints used to skip redundant saves.

use crc32fast::Hasher;
use customfly_model::PageData;

/// CRC32 of the serialized pages
pub fn fingerprint(pages: &[PageData]) -> Result<u32, serde_json::Error> {
    let json = serde_json::to_vec(pages)?;
    let mut hasher = Hasher::new();
    hasher.update(&json);
    Ok(hasher.finalize())
}
