//! Blob message types.

use std::collections::BTreeSet;
use std::fmt;

use borsh::{BorshDeserialize, BorshSerialize};
use thiserror::Error;

use crate::blob::commitment::{create_commitment, Commitment};
use crate::blob::shares::NAMESPACE_SIZE;

/// Errors from blob validation and commitment computation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlobError {
    #[error("blob is empty")]
    EmptyBlob,

    #[error("blob of {0} bytes exceeds the u32 size limit")]
    BlobTooLarge(usize),

    #[error("declared blob size {declared} does not match actual size {actual}")]
    BlobSizeMismatch { declared: u32, actual: usize },

    #[error("namespace {0} is reserved")]
    ReservedNamespace(Namespace),

    #[error("no share commitments present")]
    NoSquareSizes,

    #[error("square size {0} is not a power of two")]
    InvalidSquareSize(u64),

    #[error("square size {0} appears more than once")]
    DuplicateSquareSize(u64),

    #[error("square size {square_size} outside allowed range [{min}, {max}]")]
    SquareSizeOutOfRange { square_size: u64, min: u64, max: u64 },

    #[error("blob needs {shares} shares and fits none of the committed square sizes")]
    BlobDoesNotFit { shares: usize },

    #[error("share commitment for square size {0} does not match the blob")]
    CommitmentMismatch(u64),
}

/// Namespace a blob is published under.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(BorshSerialize, BorshDeserialize)]
pub struct Namespace(pub [u8; NAMESPACE_SIZE]);

impl Namespace {
    pub const PARITY: Namespace = Namespace([0xFF; NAMESPACE_SIZE]);

    pub fn as_bytes(&self) -> &[u8; NAMESPACE_SIZE] {
        &self.0
    }

    /// Namespaces up to `0x00000000000000FF` and the parity namespace are
    /// reserved for protocol use.
    pub fn is_reserved(&self) -> bool {
        let (head, _) = self.0.split_at(NAMESPACE_SIZE - 1);
        head.iter().all(|b| *b == 0) || *self == Self::PARITY
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

/// Blob handed to the block producer once a wrapped message is malleated.
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct Blob {
    pub namespace: Namespace,
    pub data: Vec<u8>,
}

/// Commitment and signature for one candidate square size.
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct ShareCommitAndSignature {
    pub square_size: u64,
    pub share_commitment: Commitment,
    /// Signature over the sign bytes of the malleated transaction for
    /// `square_size`. Empty until signed.
    pub signature: Vec<u8>,
}

/// Wrapped pay-for-blob message as submitted by a user.
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct MsgWirePayForBlob {
    pub signer: String,
    pub namespace: Namespace,
    pub blob: Vec<u8>,
    pub blob_size: u32,
    pub share_commitments: Vec<ShareCommitAndSignature>,
}

/// Final pay-for-blob message included on chain.
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct MsgPayForBlob {
    pub signer: String,
    pub namespace: Namespace,
    pub blob_size: u32,
    pub share_commitment: Commitment,
}

impl MsgWirePayForBlob {
    /// Creates an unsigned wrapped message with one commitment per square size.
    pub fn new(
        signer: impl Into<String>,
        namespace: Namespace,
        blob: Vec<u8>,
        square_sizes: &[u64],
    ) -> Result<Self, BlobError> {
        let blob_size =
            u32::try_from(blob.len()).map_err(|_| BlobError::BlobTooLarge(blob.len()))?;
        let share_commitments = square_sizes
            .iter()
            .map(|&square_size| {
                Ok(ShareCommitAndSignature {
                    square_size,
                    share_commitment: create_commitment(square_size, &namespace, &blob)?,
                    signature: Vec::new(),
                })
            })
            .collect::<Result<Vec<_>, BlobError>>()?;

        let msg = Self {
            signer: signer.into(),
            namespace,
            blob,
            blob_size,
            share_commitments,
        };
        msg.validate_basic()?;
        Ok(msg)
    }

    /// Stateless structural checks. Commitments are not recomputed here.
    pub fn validate_basic(&self) -> Result<(), BlobError> {
        if self.namespace.is_reserved() {
            return Err(BlobError::ReservedNamespace(self.namespace));
        }
        if self.blob.is_empty() {
            return Err(BlobError::EmptyBlob);
        }
        if usize::try_from(self.blob_size).ok() != Some(self.blob.len()) {
            return Err(BlobError::BlobSizeMismatch {
                declared: self.blob_size,
                actual: self.blob.len(),
            });
        }
        if self.share_commitments.is_empty() {
            return Err(BlobError::NoSquareSizes);
        }

        let mut seen = BTreeSet::new();
        for commit in &self.share_commitments {
            if !commit.square_size.is_power_of_two() {
                return Err(BlobError::InvalidSquareSize(commit.square_size));
            }
            if !seen.insert(commit.square_size) {
                return Err(BlobError::DuplicateSquareSize(commit.square_size));
            }
        }
        Ok(())
    }

    pub fn square_sizes(&self) -> impl Iterator<Item = u64> + '_ {
        self.share_commitments.iter().map(|c| c.square_size)
    }

    pub fn commitment_for(&self, square_size: u64) -> Option<&ShareCommitAndSignature> {
        self.share_commitments
            .iter()
            .find(|c| c.square_size == square_size)
    }

    /// The final message for a given commitment.
    pub fn unsigned_pay_for_blob(&self, share_commitment: Commitment) -> MsgPayForBlob {
        MsgPayForBlob {
            signer: self.signer.clone(),
            namespace: self.namespace,
            blob_size: self.blob_size,
            share_commitment,
        }
    }

    pub fn to_blob(&self) -> Blob {
        Blob {
            namespace: self.namespace,
            data: self.blob.clone(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const NS: Namespace = Namespace([0, 0, 0, 0, 0, 0, 1, 2]);

    #[test]
    fn test_reserved_namespaces() {
        assert!(Namespace([0; 8]).is_reserved());
        assert!(Namespace([0, 0, 0, 0, 0, 0, 0, 0xFF]).is_reserved());
        assert!(Namespace::PARITY.is_reserved());
        assert!(!NS.is_reserved());
    }

    #[test]
    fn test_new_computes_commitments() {
        let msg = MsgWirePayForBlob::new("signer", NS, vec![1u8; 3000], &[2, 4, 8]).unwrap();
        assert_eq!(msg.blob_size, 3000);
        assert_eq!(msg.square_sizes().collect::<Vec<_>>(), vec![2, 4, 8]);
        for commit in &msg.share_commitments {
            assert!(commit.signature.is_empty());
            assert_eq!(
                commit.share_commitment,
                create_commitment(commit.square_size, &NS, &msg.blob).unwrap()
            );
        }
    }

    #[test]
    fn test_new_rejects_invalid_input() {
        assert_eq!(
            MsgWirePayForBlob::new("s", Namespace([0; 8]), vec![1], &[4]).unwrap_err(),
            BlobError::ReservedNamespace(Namespace([0; 8]))
        );
        assert_eq!(
            MsgWirePayForBlob::new("s", NS, vec![], &[4]).unwrap_err(),
            BlobError::EmptyBlob
        );
        assert_eq!(
            MsgWirePayForBlob::new("s", NS, vec![1], &[]).unwrap_err(),
            BlobError::NoSquareSizes
        );
        assert_eq!(
            MsgWirePayForBlob::new("s", NS, vec![1], &[6]).unwrap_err(),
            BlobError::InvalidSquareSize(6)
        );
        assert_eq!(
            MsgWirePayForBlob::new("s", NS, vec![1], &[4, 4]).unwrap_err(),
            BlobError::DuplicateSquareSize(4)
        );
    }

    #[test]
    fn test_validate_basic_size_mismatch() {
        let mut msg = MsgWirePayForBlob::new("s", NS, vec![1u8; 10], &[4]).unwrap();
        msg.blob_size = 11;
        assert_eq!(
            msg.validate_basic().unwrap_err(),
            BlobError::BlobSizeMismatch {
                declared: 11,
                actual: 10
            }
        );
    }

    #[test]
    fn test_unsigned_pay_for_blob_copies_fields() {
        let msg = MsgWirePayForBlob::new("signer", NS, vec![1u8; 10], &[4]).unwrap();
        let commitment = msg.commitment_for(4).unwrap().share_commitment;
        let pfb = msg.unsigned_pay_for_blob(commitment);
        assert_eq!(pfb.signer, "signer");
        assert_eq!(pfb.namespace, NS);
        assert_eq!(pfb.blob_size, 10);
        assert_eq!(pfb.share_commitment, commitment);
        assert!(msg.commitment_for(8).is_none());
    }
}
