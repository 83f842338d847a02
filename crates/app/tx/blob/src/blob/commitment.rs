//! Share commitments.
//!
//! For square size `k` the blob's shares are grouped left to right into
//! subtrees of width `largest power of two <= min(k, remaining)`. Each subtree
//! is hashed into a merkle root and the commitment is the merkle root over
//! those subtree roots.

use sha2::{Digest, Sha256};

use crate::blob::shares::split_blob;
use crate::blob::types::{BlobError, Namespace};

pub type Commitment = [u8; 32];

const LEAF_PREFIX: u8 = 0x00;
const INNER_PREFIX: u8 = 0x01;

/// Computes the commitment to `data` under `namespace` for `square_size`.
pub fn create_commitment(
    square_size: u64,
    namespace: &Namespace,
    data: &[u8],
) -> Result<Commitment, BlobError> {
    if !square_size.is_power_of_two() {
        return Err(BlobError::InvalidSquareSize(square_size));
    }
    if data.is_empty() {
        return Err(BlobError::EmptyBlob);
    }
    if u32::try_from(data.len()).is_err() {
        return Err(BlobError::BlobTooLarge(data.len()));
    }

    let leaves: Vec<[u8; 32]> = split_blob(namespace, data)
        .iter()
        .map(|share| {
            let mut hasher = Sha256::new();
            hasher.update([LEAF_PREFIX]);
            hasher.update(namespace.as_bytes());
            hasher.update(share);
            hasher.finalize().into()
        })
        .collect();

    let max_width = usize::try_from(square_size).unwrap_or(usize::MAX);
    let mut remaining = leaves.as_slice();
    let mut subtree_roots = Vec::new();
    for width in subtree_widths(leaves.len(), max_width) {
        let (subtree, rest) = remaining.split_at(width);
        subtree_roots.push(merkle_root(subtree));
        remaining = rest;
    }

    Ok(merkle_root(&subtree_roots))
}

/// Widths of the subtrees `share_count` shares are grouped into.
pub fn subtree_widths(share_count: usize, max_width: usize) -> Vec<usize> {
    let mut widths = Vec::new();
    let mut remaining = share_count;
    while remaining > 0 {
        let cap = remaining.min(max_width.max(1));
        let width = if cap.is_power_of_two() {
            cap
        } else {
            cap.next_power_of_two() / 2
        };
        widths.push(width);
        remaining -= width;
    }
    widths
}

fn merkle_root(hashes: &[[u8; 32]]) -> [u8; 32] {
    if hashes.is_empty() {
        return Sha256::digest(b"").into();
    }

    let mut level = hashes.to_vec();
    while level.len() > 1 {
        level = level
            .chunks(2)
            .map(|pair| match pair {
                [left, right] => {
                    let mut hasher = Sha256::new();
                    hasher.update([INNER_PREFIX]);
                    hasher.update(left);
                    hasher.update(right);
                    hasher.finalize().into()
                }
                // odd node is promoted unchanged
                [single] => *single,
                _ => Sha256::digest(b"").into(),
            })
            .collect();
    }
    level.first().copied().unwrap_or_default()
}
