//! Canonical sign bytes.
//!
//! Signatures cover a [`SignDoc`]: the borsh encodings of the transaction
//! body and auth info, plus the chain id and account number taken from the
//! caller's [`SignerData`]. Raw signatures are never part of the document.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use crate::error::{VerifyError, VerifyResult};
use crate::keys::PubKey;
use crate::tx::Tx;

/// Identity of the expected signer, supplied by the caller.
///
/// Never derived from the transaction under test.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SignerData {
    pub chain_id: String,
    pub account_number: u64,
    pub sequence: u64,
    pub pub_key: PubKey,
}

/// The document whose encoding is signed in direct mode.
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct SignDoc {
    pub body_bytes: Vec<u8>,
    pub auth_info_bytes: Vec<u8>,
    pub chain_id: String,
    pub account_number: u64,
}

/// Computes sign bytes under one fixed encoding mode.
///
/// Implementations must be deterministic: identical inputs always produce
/// identical bytes.
pub trait SignBytesCodec: Send + Sync {
    fn sign_bytes(&self, signer: &SignerData, tx: &Tx) -> VerifyResult<Vec<u8>>;
}

/// Direct-mode codec backed by borsh.
#[derive(Clone, Copy, Debug, Default)]
pub struct DirectCodec;

impl DirectCodec {
    pub fn new() -> Self {
        Self
    }

    pub fn sign_doc(&self, signer: &SignerData, tx: &Tx) -> VerifyResult<SignDoc> {
        Ok(SignDoc {
            body_bytes: encode(&tx.body)?,
            auth_info_bytes: encode(&tx.auth_info)?,
            chain_id: signer.chain_id.clone(),
            account_number: signer.account_number,
        })
    }
}

impl SignBytesCodec for DirectCodec {
    fn sign_bytes(&self, signer: &SignerData, tx: &Tx) -> VerifyResult<Vec<u8>> {
        encode(&self.sign_doc(signer, tx)?)
    }
}

fn encode<T: BorshSerialize>(value: &T) -> VerifyResult<Vec<u8>> {
    borsh::to_vec(value).map_err(|e| VerifyError::SignBytesComputationFailed(e.to_string()))
}
