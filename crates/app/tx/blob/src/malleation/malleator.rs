use crate::blob::{create_commitment, shares_needed, BlobError, MsgWirePayForBlob};
use crate::config::BlobParams;
use crate::error::{VerifyError, VerifyResult};
use crate::malleation::{Malleated, Malleator, Selection};

/// Selects the smallest candidate square size the blob fits in.
///
/// A blob occupying `n` shares fits a `k x k` square when `n <= k * k`.
/// The selected candidate's commitment is recomputed from the blob and must
/// match the one the author signed against.
#[derive(Clone, Debug, Default)]
pub struct SquareSizeMalleator {
    params: BlobParams,
}

impl SquareSizeMalleator {
    pub fn new(params: BlobParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &BlobParams {
        &self.params
    }

    fn select(&self, msg: &MsgWirePayForBlob) -> Result<Malleated, BlobError> {
        msg.validate_basic()?;

        let BlobParams {
            min_square_size: min,
            max_square_size: max,
        } = self.params;
        for commit in &msg.share_commitments {
            if commit.square_size < min || commit.square_size > max {
                return Err(BlobError::SquareSizeOutOfRange {
                    square_size: commit.square_size,
                    min,
                    max,
                });
            }
        }

        let shares = shares_needed(msg.blob.len());
        let selected = msg
            .share_commitments
            .iter()
            .filter(|commit| fits(shares, commit.square_size))
            .min_by_key(|commit| commit.square_size)
            .ok_or(BlobError::BlobDoesNotFit { shares })?;

        let commitment = create_commitment(selected.square_size, &msg.namespace, &msg.blob)?;
        if commitment != selected.share_commitment {
            return Err(BlobError::CommitmentMismatch(selected.square_size));
        }

        Ok(Malleated {
            pfb: msg.unsigned_pay_for_blob(commitment),
            signature: selected.signature.clone(),
            selection: Selection {
                square_size: selected.square_size,
                blob: msg.to_blob(),
            },
        })
    }
}

impl Malleator for SquareSizeMalleator {
    fn malleate(&self, msg: &MsgWirePayForBlob) -> VerifyResult<Malleated> {
        self.select(msg)
            .map_err(|e| VerifyError::TransformFailed(e.to_string()))
    }
}

fn fits(shares: usize, square_size: u64) -> bool {
    let capacity = u128::from(square_size) * u128::from(square_size);
    (shares as u128) <= capacity
}
