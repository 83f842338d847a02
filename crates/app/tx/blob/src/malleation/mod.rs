//! Malleation-aware verification of wrapped pay-for-blob transactions.
//!
//! A wrapped transaction is signed once by its author, but what lands on
//! chain is a different transaction: the block producer picks one square
//! size, swaps the wrapped message for the matching [`MsgPayForBlob`] and
//! attaches the signature the author pre-computed for that square size.
//!
//! Verification replays that process independently:
//!
//! 1. [`WireMsgExtractor`] pulls the wrapped message out of the transaction.
//! 2. [`Malleator`] selects the square size and recomputes the commitment.
//! 3. [`MalleatedTxBuilder`] assembles the final transaction, carrying over
//!    the wrapped transaction's auth info.
//! 4. [`verify_sig`] checks the candidate signature against the final
//!    transaction's sign bytes.
//!
//! Any disagreement between what was signed and what the replay produces
//! surfaces as `Ok(false)` in step 4.

mod builder;
mod extract;
mod malleator;
mod sign;

pub use builder::PfbTxBuilder;
pub use extract::ExtractWirePfb;
pub use malleator::SquareSizeMalleator;
pub use sign::sign_wire_pfb_tx;

use crate::blob::{Blob, MsgPayForBlob, MsgWirePayForBlob};
use crate::config::BlobParams;
use crate::error::VerifyResult;
use crate::keys::PrivKey;
use crate::signing::{SignBytesCodec, SignerData};
use crate::tx::{Tx, TxBuilder};
use crate::verifier::verify_sig;

/// Obtains the wrapped message from a transaction.
pub trait WireMsgExtractor: Send + Sync {
    fn extract<'a>(&self, tx: &'a Tx) -> VerifyResult<&'a MsgWirePayForBlob>;
}

/// Deterministic wrap to final transform.
///
/// Must be a pure function of the wrapped message: no block state, no
/// caller-supplied hints, exactly one outcome.
pub trait Malleator: Send + Sync {
    fn malleate(&self, msg: &MsgWirePayForBlob) -> VerifyResult<Malleated>;
}

/// Builds the final transaction from the wrapped one.
pub trait MalleatedTxBuilder: Send + Sync {
    fn build(&self, wire_tx: &Tx, signature: Vec<u8>, pfb: MsgPayForBlob) -> VerifyResult<Tx>;
}

/// Which outcome the transform selected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selection {
    pub square_size: u64,
    pub blob: Blob,
}

/// Output of a [`Malleator`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Malleated {
    pub pfb: MsgPayForBlob,
    pub signature: Vec<u8>,
    pub selection: Selection,
}

/// A fully malleated transaction ready for signature verification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MalleatedTx {
    pub tx: Tx,
    pub selection: Selection,
}

/// Verifies wrapped transactions by replaying malleation.
#[derive(Clone, Debug)]
pub struct MalleationVerifier<E = ExtractWirePfb, M = SquareSizeMalleator, B = PfbTxBuilder> {
    extractor: E,
    malleator: M,
    builder: B,
}

impl MalleationVerifier {
    /// Verifier with the default extractor, malleator and builder.
    pub fn new(params: BlobParams) -> Self {
        Self::with_parts(ExtractWirePfb, SquareSizeMalleator::new(params), PfbTxBuilder)
    }
}

impl Default for MalleationVerifier {
    fn default() -> Self {
        Self::new(BlobParams::default())
    }
}

impl<E, M, B> MalleationVerifier<E, M, B>
where
    E: WireMsgExtractor,
    M: Malleator,
    B: MalleatedTxBuilder,
{
    pub fn with_parts(extractor: E, malleator: M, builder: B) -> Self {
        Self {
            extractor,
            malleator,
            builder,
        }
    }

    /// Extract, transform and build: everything but the signature check.
    pub fn malleate(&self, wire_tx: &Tx) -> VerifyResult<MalleatedTx> {
        let wire_msg = self.extractor.extract(wire_tx)?;
        let Malleated {
            pfb,
            signature,
            selection,
        } = self.malleator.malleate(wire_msg)?;
        let tx = self.builder.build(wire_tx, signature, pfb)?;
        Ok(MalleatedTx { tx, selection })
    }

    /// Checks that the signer authorized the final transaction the network
    /// would derive from `wire_tx`.
    pub fn verify<C>(&self, signer: &SignerData, codec: &C, wire_tx: &Tx) -> VerifyResult<bool>
    where
        C: SignBytesCodec + ?Sized,
    {
        let malleated = self.malleate(wire_tx)?;
        verify_sig(signer, codec, &malleated.tx)
    }

    /// Signs `msg` for every candidate square size using this verifier's
    /// builder, then signs the wrapped transaction itself.
    pub fn sign_wire_pfb_tx<C>(
        &self,
        key: &PrivKey,
        signer: &SignerData,
        codec: &C,
        template: &TxBuilder,
        msg: MsgWirePayForBlob,
    ) -> VerifyResult<Tx>
    where
        C: SignBytesCodec + ?Sized,
    {
        sign_wire_pfb_tx(key, signer, codec, &self.builder, template, msg)
    }
}
