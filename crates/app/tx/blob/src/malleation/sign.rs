use crate::blob::MsgWirePayForBlob;
use crate::error::{VerifyError, VerifyResult};
use crate::keys::PrivKey;
use crate::malleation::MalleatedTxBuilder;
use crate::signing::{SignBytesCodec, SignerData};
use crate::tx::{Msg, SignMode, SignatureData, SignatureV2, Tx, TxBuilder};

/// Produces a signed wrapped transaction for `msg`.
///
/// `template` supplies fee, gas limit, memo and timeout. For every candidate
/// square size the final transaction is built with `builder` and signed, so
/// verification succeeds whichever candidate the network selects, provided it
/// uses the same builder. The wrapped transaction is then signed as a whole.
pub fn sign_wire_pfb_tx<C, B>(
    key: &PrivKey,
    signer: &SignerData,
    codec: &C,
    builder: &B,
    template: &TxBuilder,
    mut msg: MsgWirePayForBlob,
) -> VerifyResult<Tx>
where
    C: SignBytesCodec + ?Sized,
    B: MalleatedTxBuilder + ?Sized,
{
    let placeholder = |signature: Vec<u8>| SignatureV2 {
        pub_key: Some(key.pub_key()),
        data: SignatureData::Single {
            mode: SignMode::Direct,
            signature,
        },
        sequence: signer.sequence,
    };

    let mut wire = template.clone();
    wire.set_signatures(vec![placeholder(Vec::new())])
        .map_err(|e| VerifyError::BuildFailed(e.to_string()))?;
    let skeleton = wire.get_tx();

    let signatures = msg
        .share_commitments
        .iter()
        .map(|commit| {
            let pfb = msg.unsigned_pay_for_blob(commit.share_commitment);
            let final_tx = builder.build(&skeleton, Vec::new(), pfb)?;
            Ok(key.sign(&codec.sign_bytes(signer, &final_tx)?))
        })
        .collect::<VerifyResult<Vec<_>>>()?;
    for (commit, signature) in msg.share_commitments.iter_mut().zip(signatures) {
        commit.signature = signature;
    }

    wire.set_msgs(vec![Msg::WirePayForBlob(msg)]);
    let sign_bytes = codec.sign_bytes(signer, &wire.get_tx())?;
    wire.set_signatures(vec![placeholder(key.sign(&sign_bytes))])
        .map_err(|e| VerifyError::BuildFailed(e.to_string()))?;

    Ok(wire.into_tx())
}
