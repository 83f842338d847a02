//! Admission gateway for blob transactions.
//!
//! The gateway is responsible for:
//! 1. Checking the signer's chain id against the configured one
//! 2. Routing wrapped transactions through malleation and final ones straight
//!    to signature verification
//! 3. Producing an [`AdmittedTx`] carrying the final transaction and its blob

use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::blob::Blob;
use crate::config::{BlobConfig, BlobParams};
use crate::error::{VerifyError, VerifyResult};
use crate::malleation::MalleationVerifier;
use crate::signing::{DirectCodec, SignBytesCodec, SignerData};
use crate::tx::{Msg, Tx};
use crate::verifier::{verify_sig, SignatureVerifier};

/// Error type for gateway operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("failed to decode transaction: {0}")]
    DecodeFailed(String),

    #[error("invalid chain id: expected {expected}, got {actual}")]
    InvalidChainId { expected: String, actual: String },

    #[error("unsupported transaction: {0}")]
    Unsupported(String),

    /// Well-formed transaction whose signature does not verify.
    #[error("invalid signature")]
    InvalidSignature,

    #[error("malformed transaction: {0}")]
    Malformed(#[from] VerifyError),

    #[error("failed to encode transaction: {0}")]
    EncodeFailed(String),
}

/// A verified transaction ready to be handed to the mempool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdmittedTx {
    /// The final transaction: the malleated one for wrapped input.
    pub tx: Tx,
    /// Core blob split off a wrapped transaction.
    pub blob: Option<Blob>,
    /// Square size selected during malleation.
    pub square_size: Option<u64>,
    /// SHA-256 of the borsh-encoded final transaction.
    pub tx_hash: [u8; 32],
}

impl AdmittedTx {
    fn new(tx: Tx, blob: Option<Blob>, square_size: Option<u64>) -> Result<Self, GatewayError> {
        let bytes = tx
            .to_bytes()
            .map_err(|e| GatewayError::EncodeFailed(e.to_string()))?;
        Ok(Self {
            tx,
            blob,
            square_size,
            tx_hash: Sha256::digest(&bytes).into(),
        })
    }

    pub fn tx_hash_hex(&self) -> String {
        hex::encode(self.tx_hash)
    }
}

enum Route {
    Wrapped,
    Final,
}

fn route(tx: &Tx) -> Result<Route, GatewayError> {
    if tx
        .msgs()
        .iter()
        .any(|msg| matches!(msg, Msg::WirePayForBlob(_)))
    {
        return Ok(Route::Wrapped);
    }
    match tx.msgs() {
        [Msg::PayForBlob(_)] => Ok(Route::Final),
        [other] => Err(GatewayError::Unsupported(format!(
            "message type {}",
            other.type_name()
        ))),
        msgs => Err(GatewayError::Unsupported(format!(
            "{} messages without a wrapped blob",
            msgs.len()
        ))),
    }
}

/// Gateway for blob transactions.
pub struct BlobTxGateway<C = DirectCodec> {
    chain_id: String,
    codec: C,
    malleation: MalleationVerifier,
}

impl BlobTxGateway {
    /// Gateway using direct-mode sign bytes and the configured square sizes.
    pub fn from_config(config: &BlobConfig) -> Self {
        Self::new(config.chain_id.clone(), DirectCodec, config.blob)
    }
}

impl<C: SignBytesCodec> BlobTxGateway<C> {
    pub fn new(chain_id: impl Into<String>, codec: C, params: BlobParams) -> Self {
        Self {
            chain_id: chain_id.into(),
            codec,
            malleation: MalleationVerifier::new(params),
        }
    }

    pub fn chain_id(&self) -> &str {
        &self.chain_id
    }

    /// Decode a borsh-encoded transaction and admit it.
    pub fn decode_and_admit(
        &self,
        signer: &SignerData,
        raw: &[u8],
    ) -> Result<AdmittedTx, GatewayError> {
        let tx = Tx::from_bytes(raw).map_err(|e| GatewayError::DecodeFailed(e.to_string()));
        match tx {
            Ok(tx) => self.admit(signer, &tx),
            Err(err) => {
                tracing::warn!(error = %err, "gateway: rejected undecodable transaction");
                Err(err)
            }
        }
    }

    /// Verify `tx` for `signer` and produce the transaction to include.
    pub fn admit(&self, signer: &SignerData, tx: &Tx) -> Result<AdmittedTx, GatewayError> {
        let result = self.admit_inner(signer, tx);
        match &result {
            Ok(admitted) => tracing::debug!(
                tx_hash = %admitted.tx_hash_hex(),
                square_size = ?admitted.square_size,
                signer = %signer.pub_key.address_hex(),
                "gateway: admitted transaction"
            ),
            Err(err) => tracing::warn!(
                error = %err,
                signer = %signer.pub_key.address_hex(),
                "gateway: rejected transaction"
            ),
        }
        result
    }

    fn admit_inner(&self, signer: &SignerData, tx: &Tx) -> Result<AdmittedTx, GatewayError> {
        if signer.chain_id != self.chain_id {
            return Err(GatewayError::InvalidChainId {
                expected: self.chain_id.clone(),
                actual: signer.chain_id.clone(),
            });
        }

        match route(tx)? {
            Route::Wrapped => {
                let malleated = self.malleation.malleate(tx)?;
                ensure_valid(verify_sig(signer, &self.codec, &malleated.tx))?;
                AdmittedTx::new(
                    malleated.tx,
                    Some(malleated.selection.blob),
                    Some(malleated.selection.square_size),
                )
            }
            Route::Final => {
                ensure_valid(verify_sig(signer, &self.codec, tx))?;
                AdmittedTx::new(tx.clone(), None, None)
            }
        }
    }
}

fn ensure_valid(result: VerifyResult<bool>) -> Result<(), GatewayError> {
    match result? {
        true => Ok(()),
        false => Err(GatewayError::InvalidSignature),
    }
}

/// Wrapped transactions are malleated first; anything else is verified as-is.
/// No chain id check and no logging.
impl<C: SignBytesCodec> SignatureVerifier<Tx> for BlobTxGateway<C> {
    fn verify_signature(&self, signer: &SignerData, tx: &Tx) -> VerifyResult<bool> {
        match route(tx) {
            Ok(Route::Wrapped) => self.malleation.verify(signer, &self.codec, tx),
            _ => verify_sig(signer, &self.codec, tx),
        }
    }
}
