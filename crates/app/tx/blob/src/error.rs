//! Verification error types.

use thiserror::Error;

/// Structural failures surfaced by signature and malleation verification.
///
/// A cryptographic mismatch is never an error: it is reported as `Ok(false)`.
/// Every variant here means the input could not be verified at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerifyError {
    /// Signature count is not exactly one, or the single signature is not a
    /// single-signer payload.
    #[error("only a single signer is supported")]
    SingleSignerExpected,

    /// The codec could not produce sign bytes for the transaction.
    #[error("failed to compute sign bytes: {0}")]
    SignBytesComputationFailed(String),

    /// The signature entries attached to the transaction are inconsistent.
    #[error("failed to decode signatures: {0}")]
    SignatureDecodeFailed(String),

    /// The transaction does not carry a wrapped pay-for-blob message.
    #[error("transaction does not contain a MsgWirePayForBlob: {0}")]
    ExtractionFailed(String),

    /// The wrapped message could not be malleated.
    #[error("failed to malleate wrapped message: {0}")]
    TransformFailed(String),

    /// The malleated transaction could not be assembled.
    #[error("failed to build malleated transaction: {0}")]
    BuildFailed(String),
}

/// Fieldless discriminant of [`VerifyError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    SingleSignerExpected,
    SignBytesComputationFailed,
    SignatureDecodeFailed,
    ExtractionFailed,
    TransformFailed,
    BuildFailed,
}

impl VerifyError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            VerifyError::SingleSignerExpected => ErrorKind::SingleSignerExpected,
            VerifyError::SignBytesComputationFailed(_) => ErrorKind::SignBytesComputationFailed,
            VerifyError::SignatureDecodeFailed(_) => ErrorKind::SignatureDecodeFailed,
            VerifyError::ExtractionFailed(_) => ErrorKind::ExtractionFailed,
            VerifyError::TransformFailed(_) => ErrorKind::TransformFailed,
            VerifyError::BuildFailed(_) => ErrorKind::BuildFailed,
        }
    }
}

/// Result type for verification operations.
pub type VerifyResult<T> = Result<T, VerifyError>;
