//! Signature verification for pay-for-blob transactions.
//!
//! Two verifiers are provided:
//!
//! - [`verify_sig`] checks a single-signer, direct-mode signature over the
//!   canonical sign bytes of a transaction.
//! - [`MalleationVerifier`] checks a wrapped transaction by deterministically
//!   deriving the final transaction the network would include, then
//!   verifying the author's pre-computed signature against it.
//!
//! # Usage
//!
//! ```text
//! use blobsig_tx::{BlobTxGateway, load_config};
//!
//! let config = load_config("blobsig.yaml")?;
//! let gateway = BlobTxGateway::from_config(&config);
//!
//! // Verify a wrapped transaction and get the final one back
//! let admitted = gateway.decode_and_admit(&signer_data, raw_tx)?;
//! mempool.add(admitted.tx)?;
//! ```
//!
//! # Architecture
//!
//! 1. [`SignBytesCodec`] - Canonical sign bytes for a transaction
//! 2. [`VerifySignature`] - Public key verification capability
//! 3. [`WireMsgExtractor`], [`Malleator`], [`MalleatedTxBuilder`] - The
//!    injected steps of malleation
//! 4. [`BlobTxGateway`] - Chain id checks, routing and logging

pub mod batch;
pub mod blob;
pub mod config;
pub mod error;
pub mod gateway;
pub mod keys;
pub mod malleation;
pub mod signing;
pub mod tx;
pub mod verifier;

// Re-export main types
pub use batch::{filter_verified, verify_batch_parallel, BatchVerificationResult};
pub use blob::{
    Blob, BlobError, MsgPayForBlob, MsgWirePayForBlob, Namespace, ShareCommitAndSignature,
};
pub use config::{load_config, load_config_from_str, BlobConfig, BlobParams, ConfigError};
pub use error::*;
pub use gateway::{AdmittedTx, BlobTxGateway, GatewayError};
pub use keys::{KeyError, PrivKey, PubKey, VerifySignature};
pub use malleation::{
    sign_wire_pfb_tx, ExtractWirePfb, MalleatedTx, MalleatedTxBuilder, MalleationVerifier,
    Malleator, PfbTxBuilder, SquareSizeMalleator, WireMsgExtractor,
};
pub use signing::{DirectCodec, SignBytesCodec, SignDoc, SignerData};
pub use tx::{Msg, Tx, TxBuilder};
pub use verifier::{verify_sig, SignatureVerifier, SingleSignerVerifier};
