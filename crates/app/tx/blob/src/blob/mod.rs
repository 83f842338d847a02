//! Blob data, share layout and share commitments.
//!
//! A blob is split into fixed-size shares and committed to with a merkle root
//! whose shape depends on the square size the block producer will use. A
//! wrapped message therefore carries one commitment (and one signature) per
//! candidate square size; malleation picks exactly one of them.

mod commitment;
mod shares;
mod types;

pub use commitment::{create_commitment, subtree_widths, Commitment};
pub use shares::{
    shares_needed, split_blob, Share, CONTINUATION_SHARE_CAPACITY, FIRST_SHARE_CAPACITY,
    NAMESPACE_SIZE, SHARE_SIZE,
};
pub use types::{
    Blob, BlobError, MsgPayForBlob, MsgWirePayForBlob, Namespace, ShareCommitAndSignature,
};
