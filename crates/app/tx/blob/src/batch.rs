//! Parallel verification of independent transactions.

use rayon::prelude::*;

use crate::error::VerifyResult;
use crate::signing::SignerData;
use crate::verifier::SignatureVerifier;

/// Verification outcome of one transaction in a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchVerificationResult {
    /// Position of the transaction in the input batch.
    pub index: usize,
    pub result: VerifyResult<bool>,
}

impl BatchVerificationResult {
    /// True only for a well-formed transaction with a valid signature.
    pub fn is_verified(&self) -> bool {
        matches!(self.result, Ok(true))
    }
}

/// Verifies `(signer, tx)` pairs across the rayon pool.
///
/// Results are returned in input order, one per item.
pub fn verify_batch_parallel<T, V>(
    verifier: &V,
    items: &[(SignerData, T)],
) -> Vec<BatchVerificationResult>
where
    T: Sync,
    V: SignatureVerifier<T> + ?Sized,
{
    items
        .par_iter()
        .enumerate()
        .map(|(index, (signer, tx))| BatchVerificationResult {
            index,
            result: verifier.verify_signature(signer, tx),
        })
        .collect()
}

/// Keeps the transactions whose result is `Ok(true)`.
///
/// Returns the kept transactions together with their original indices.
pub fn filter_verified<T>(txs: Vec<T>, results: &[BatchVerificationResult]) -> (Vec<T>, Vec<usize>) {
    let mut verified = Vec::with_capacity(txs.len());
    let mut indices = Vec::with_capacity(txs.len());

    for (tx, result) in txs.into_iter().zip(results.iter()) {
        if result.is_verified() {
            indices.push(result.index);
            verified.push(tx);
        }
    }

    (verified, indices)
}
