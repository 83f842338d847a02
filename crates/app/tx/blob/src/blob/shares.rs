//! Share layout.
//!
//! ```text
//! first share:        | namespace (8) | info = 1 | blob len u32 BE (4) | data ... | 0 pad |
//! continuation share: | namespace (8) | info = 0 | data ...                      | 0 pad |
//! ```

use crate::blob::types::Namespace;

pub const SHARE_SIZE: usize = 512;
pub const NAMESPACE_SIZE: usize = 8;

const INFO_BYTES: usize = 1;
const SEQUENCE_LEN_BYTES: usize = 4;

const SEQUENCE_START: u8 = 1;
const CONTINUATION: u8 = 0;

/// Data bytes that fit in the first share of a blob.
pub const FIRST_SHARE_CAPACITY: usize = SHARE_SIZE - NAMESPACE_SIZE - INFO_BYTES - SEQUENCE_LEN_BYTES;
/// Data bytes that fit in every following share.
pub const CONTINUATION_SHARE_CAPACITY: usize = SHARE_SIZE - NAMESPACE_SIZE - INFO_BYTES;

pub type Share = [u8; SHARE_SIZE];

/// Number of shares a blob of `len` bytes occupies.
pub fn shares_needed(len: usize) -> usize {
    if len <= FIRST_SHARE_CAPACITY {
        return 1;
    }
    1 + (len - FIRST_SHARE_CAPACITY).div_ceil(CONTINUATION_SHARE_CAPACITY)
}

/// Splits `data` into namespaced shares.
///
/// The caller guarantees `data.len()` fits in a `u32`.
pub fn split_blob(namespace: &Namespace, data: &[u8]) -> Vec<Share> {
    let mut shares = Vec::with_capacity(shares_needed(data.len()));
    let (first, rest) = data.split_at(data.len().min(FIRST_SHARE_CAPACITY));

    let mut prefix = Vec::with_capacity(NAMESPACE_SIZE + INFO_BYTES + SEQUENCE_LEN_BYTES);
    prefix.extend_from_slice(namespace.as_bytes());
    prefix.push(SEQUENCE_START);
    prefix.extend_from_slice(&(data.len() as u32).to_be_bytes());
    shares.push(make_share(&prefix, first));

    for chunk in rest.chunks(CONTINUATION_SHARE_CAPACITY) {
        let mut prefix = Vec::with_capacity(NAMESPACE_SIZE + INFO_BYTES);
        prefix.extend_from_slice(namespace.as_bytes());
        prefix.push(CONTINUATION);
        shares.push(make_share(&prefix, chunk));
    }

    shares
}

fn make_share(prefix: &[u8], data: &[u8]) -> Share {
    let mut share = [0u8; SHARE_SIZE];
    for (dst, src) in share.iter_mut().zip(prefix.iter().chain(data)) {
        *dst = *src;
    }
    share
}

#[cfg(test)]
#[allow(clippy::indexing_slicing)]
mod tests {
    use super::*;

    const NS: Namespace = Namespace([0, 0, 0, 0, 0, 0, 1, 2]);

    #[test]
    fn test_shares_needed_boundaries() {
        assert_eq!(shares_needed(1), 1);
        assert_eq!(shares_needed(FIRST_SHARE_CAPACITY), 1);
        assert_eq!(shares_needed(FIRST_SHARE_CAPACITY + 1), 2);
        assert_eq!(
            shares_needed(FIRST_SHARE_CAPACITY + CONTINUATION_SHARE_CAPACITY),
            2
        );
        assert_eq!(
            shares_needed(FIRST_SHARE_CAPACITY + CONTINUATION_SHARE_CAPACITY + 1),
            3
        );
    }

    #[test]
    fn test_split_matches_count() {
        for len in [1, 498, 499, 500, 1002, 1003, 3000, 9000] {
            let data = vec![0xAB; len];
            assert_eq!(split_blob(&NS, &data).len(), shares_needed(len), "len={len}");
        }
    }

    #[test]
    fn test_first_share_layout() {
        let data = vec![0x42; 10];
        let shares = split_blob(&NS, &data);
        let share = &shares[0];
        assert_eq!(&share[..NAMESPACE_SIZE], NS.as_bytes());
        assert_eq!(share[NAMESPACE_SIZE], SEQUENCE_START);
        assert_eq!(&share[9..13], &10u32.to_be_bytes());
        assert_eq!(&share[13..23], &data[..]);
        assert!(share[23..].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_continuation_share_layout() {
        let data: Vec<u8> = (0..FIRST_SHARE_CAPACITY + 5).map(|i| i as u8).collect();
        let shares = split_blob(&NS, &data);
        assert_eq!(shares.len(), 2);
        let share = &shares[1];
        assert_eq!(&share[..NAMESPACE_SIZE], NS.as_bytes());
        assert_eq!(share[NAMESPACE_SIZE], CONTINUATION);
        assert_eq!(&share[9..14], &data[FIRST_SHARE_CAPACITY..]);
    }
}
