//! Content-addressed tree identity.
//!
//! A tree is identified by its identity-bearing traits only, never by year
//! or height, so the same tree hashes identically in every year it appears.

use canopy_core::TreeRecord;

/// 32-bit identity hash of a tree.
pub type TreeId = u32;

const IDENTITY_SEED: u32 = 0;

/// xxHash32 over the little-endian bytes of (SLA, Wooddens, Longevity).
pub fn tree_identity(record: &TreeRecord) -> TreeId {
    let mut bytes = [0u8; 12];
    bytes[0..4].copy_from_slice(&record.sla.to_le_bytes());
    bytes[4..8].copy_from_slice(&record.wood_density.to_le_bytes());
    bytes[8..12].copy_from_slice(&record.longevity.to_le_bytes());
    xxhash_rust::xxh32::xxh32(&bytes, IDENTITY_SEED)
}
