use crate::blob::MsgPayForBlob;
use crate::error::{VerifyError, VerifyResult};
use crate::malleation::MalleatedTxBuilder;
use crate::tx::{Msg, SignMode, SignatureData, SignatureV2, Tx, TxBuilder};

/// Builds the final transaction for a selected [`MsgPayForBlob`].
///
/// Fee, gas limit, memo and timeout are copied from the wrapped transaction.
/// Every signer info keeps its public key and sequence and receives the
/// selected candidate signature in single direct mode.
#[derive(Clone, Copy, Debug, Default)]
pub struct PfbTxBuilder;

impl MalleatedTxBuilder for PfbTxBuilder {
    fn build(&self, wire_tx: &Tx, signature: Vec<u8>, pfb: MsgPayForBlob) -> VerifyResult<Tx> {
        let signer_infos = &wire_tx.auth_info.signer_infos;
        if signer_infos.is_empty() {
            return Err(VerifyError::BuildFailed(
                "wrapped transaction has no signer infos".into(),
            ));
        }
        if signer_infos.len() != wire_tx.signatures.len() {
            return Err(VerifyError::BuildFailed(format!(
                "{} signer infos but {} signatures",
                signer_infos.len(),
                wire_tx.signatures.len()
            )));
        }

        let fee = wire_tx.fee();
        let mut builder = TxBuilder::new();
        builder
            .set_msgs(vec![Msg::PayForBlob(pfb)])
            .set_memo(wire_tx.body.memo.clone())
            .set_timeout_height(wire_tx.body.timeout_height)
            .set_gas_limit(fee.gas_limit)
            .set_fee_amount(fee.amount.clone())
            .set_fee_payer(fee.payer.clone())
            .set_fee_granter(fee.granter.clone());

        let sigs = signer_infos
            .iter()
            .map(|info| SignatureV2 {
                pub_key: info.public_key.clone(),
                data: SignatureData::Single {
                    mode: SignMode::Direct,
                    signature: signature.clone(),
                },
                sequence: info.sequence,
            })
            .collect();
        builder
            .set_signatures(sigs)
            .map_err(|e| VerifyError::BuildFailed(e.to_string()))?;

        Ok(builder.into_tx())
    }
}
