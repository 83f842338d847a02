//! Public and private key types used to sign and verify transactions.
//!
//! Two schemes are supported:
//! - **Ed25519**: 32-byte public key, 64-byte signature, strict verification.
//! - **secp256k1**: 33-byte compressed public key, 64-byte `r || s` signature
//!   over `SHA-256(msg)`. High-S signatures are rejected.

use borsh::{BorshDeserialize, BorshSerialize};
// ed25519-dalek and k256 share these traits.
use k256::ecdsa::signature::{Signer as _, Verifier as _};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Length of an address derived from a public key.
pub const ADDRESS_LENGTH: usize = 20;

/// Verification capability of a public key.
///
/// Cryptographic mismatch is a value, not a fault: malformed keys or
/// signatures simply fail to verify.
pub trait VerifySignature {
    fn verify_signature(&self, msg: &[u8], sig: &[u8]) -> bool;
}

/// Errors from parsing keys.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("invalid {scheme} key length: expected {expected} bytes, got {actual}")]
    InvalidLength {
        scheme: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("unknown key type {0:?}")]
    UnknownType(String),
}

/// A signer's public key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, BorshSerialize, BorshDeserialize)]
#[derive(Serialize, Deserialize)]
#[serde(try_from = "PubKeyJson", into = "PubKeyJson")]
pub enum PubKey {
    Ed25519([u8; 32]),
    Secp256k1([u8; 33]),
}

impl PubKey {
    /// Scheme name used in serialized form.
    pub fn type_name(&self) -> &'static str {
        match self {
            PubKey::Ed25519(_) => "ed25519",
            PubKey::Secp256k1(_) => "secp256k1",
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            PubKey::Ed25519(bytes) => bytes,
            PubKey::Secp256k1(bytes) => bytes,
        }
    }

    /// Parse a key of the given scheme from its hex encoding.
    pub fn from_hex(type_name: &str, key: &str) -> Result<Self, KeyError> {
        let bytes = hex::decode(key)?;
        match type_name {
            "ed25519" => Ok(PubKey::Ed25519(fixed_bytes("ed25519", &bytes)?)),
            "secp256k1" => Ok(PubKey::Secp256k1(fixed_bytes("secp256k1", &bytes)?)),
            other => Err(KeyError::UnknownType(other.to_string())),
        }
    }

    /// First 20 bytes of `SHA-256(key)`.
    pub fn address(&self) -> [u8; ADDRESS_LENGTH] {
        let digest = Sha256::digest(self.as_bytes());
        let mut out = [0u8; ADDRESS_LENGTH];
        for (dst, src) in out.iter_mut().zip(digest.iter()) {
            *dst = *src;
        }
        out
    }

    /// Hex-encoded [`PubKey::address`].
    pub fn address_hex(&self) -> String {
        hex::encode(self.address())
    }
}

impl VerifySignature for PubKey {
    fn verify_signature(&self, msg: &[u8], sig: &[u8]) -> bool {
        match self {
            PubKey::Ed25519(bytes) => {
                let Ok(key) = ed25519_dalek::VerifyingKey::from_bytes(bytes) else {
                    return false;
                };
                let Ok(sig) = ed25519_dalek::Signature::from_slice(sig) else {
                    return false;
                };
                key.verify_strict(msg, &sig).is_ok()
            }
            PubKey::Secp256k1(bytes) => {
                let Ok(key) = k256::ecdsa::VerifyingKey::from_sec1_bytes(bytes) else {
                    return false;
                };
                let Ok(sig) = k256::ecdsa::Signature::from_slice(sig) else {
                    return false;
                };
                // Only the low-S form is canonical.
                if sig.normalize_s().is_some() {
                    return false;
                }
                key.verify(msg, &sig).is_ok()
            }
        }
    }
}

fn fixed_bytes<const N: usize>(scheme: &'static str, bytes: &[u8]) -> Result<[u8; N], KeyError> {
    bytes.try_into().map_err(|_| KeyError::InvalidLength {
        scheme,
        expected: N,
        actual: bytes.len(),
    })
}

/// Serialized form of [`PubKey`]: `{"type": "ed25519", "key": "<hex>"}`.
#[derive(Clone, Debug, Serialize, Deserialize)]
struct PubKeyJson {
    #[serde(rename = "type")]
    type_name: String,
    key: String,
}

impl TryFrom<PubKeyJson> for PubKey {
    type Error = KeyError;

    fn try_from(value: PubKeyJson) -> Result<Self, Self::Error> {
        PubKey::from_hex(&value.type_name, &value.key)
    }
}

impl From<PubKey> for PubKeyJson {
    fn from(value: PubKey) -> Self {
        PubKeyJson {
            type_name: value.type_name().to_string(),
            key: hex::encode(value.as_bytes()),
        }
    }
}

/// A private key able to produce signatures verifiable by its [`PubKey`].
#[derive(Clone, Debug)]
pub enum PrivKey {
    Ed25519(ed25519_dalek::SigningKey),
    Secp256k1(k256::ecdsa::SigningKey),
}

impl PrivKey {
    pub fn pub_key(&self) -> PubKey {
        match self {
            PrivKey::Ed25519(key) => PubKey::Ed25519(key.verifying_key().to_bytes()),
            PrivKey::Secp256k1(key) => {
                let point = key.verifying_key().to_encoded_point(true);
                let mut bytes = [0u8; 33];
                bytes.copy_from_slice(point.as_bytes());
                PubKey::Secp256k1(bytes)
            }
        }
    }

    pub fn sign(&self, msg: &[u8]) -> Vec<u8> {
        match self {
            PrivKey::Ed25519(key) => key.sign(msg).to_bytes().to_vec(),
            PrivKey::Secp256k1(key) => {
                // k256 always emits low-S signatures.
                let sig: k256::ecdsa::Signature = key.sign(msg);
                sig.to_bytes().to_vec()
            }
        }
    }
}
