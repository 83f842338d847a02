//! Single-signer signature verification.

use crate::error::{VerifyError, VerifyResult};
use crate::keys::VerifySignature;
use crate::signing::{DirectCodec, SignBytesCodec, SignerData};
use crate::tx::{SignatureData, Tx};

/// Checks that `tx` carries exactly one single-signer signature that
/// `signer.pub_key` produced over the codec's sign bytes.
///
/// Returns `Ok(false)` on a cryptographic mismatch and `Err` when the
/// transaction is structurally unverifiable.
pub fn verify_sig<C>(signer: &SignerData, codec: &C, tx: &Tx) -> VerifyResult<bool>
where
    C: SignBytesCodec + ?Sized,
{
    let sign_bytes = codec.sign_bytes(signer, tx)?;

    let sigs = tx.signatures_v2()?;
    let [sig] = sigs.as_slice() else {
        return Err(VerifyError::SingleSignerExpected);
    };

    match &sig.data {
        SignatureData::Single { signature, .. } => {
            Ok(signer.pub_key.verify_signature(&sign_bytes, signature))
        }
        SignatureData::Multi { .. } => Err(VerifyError::SingleSignerExpected),
    }
}

/// Verifies the signature of a transaction for a known signer.
///
/// Implementations must be pure: no state access, no mutation. This is what
/// allows [`crate::batch::verify_batch_parallel`] to fan out across threads.
pub trait SignatureVerifier<T>: Send + Sync {
    fn verify_signature(&self, signer: &SignerData, tx: &T) -> VerifyResult<bool>;
}

/// [`verify_sig`] bound to a codec.
#[derive(Clone, Debug, Default)]
pub struct SingleSignerVerifier<C = DirectCodec> {
    codec: C,
}

impl<C: SignBytesCodec> SingleSignerVerifier<C> {
    pub fn new(codec: C) -> Self {
        Self { codec }
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }
}

impl<C: SignBytesCodec> SignatureVerifier<Tx> for SingleSignerVerifier<C> {
    fn verify_signature(&self, signer: &SignerData, tx: &Tx) -> VerifyResult<bool> {
        verify_sig(signer, &self.codec, tx)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::keys::{PrivKey, PubKey};
    use crate::tx::{Msg, MsgSend, SignMode, SignatureV2, TxBuilder};
    use rand::rngs::OsRng;

    struct FailingCodec;

    impl SignBytesCodec for FailingCodec {
        fn sign_bytes(&self, _: &SignerData, _: &Tx) -> VerifyResult<Vec<u8>> {
            Err(VerifyError::SignBytesComputationFailed("unsupported".into()))
        }
    }

    fn key() -> PrivKey {
        PrivKey::Ed25519(ed25519_dalek::SigningKey::generate(&mut OsRng))
    }

    fn signer_data(pub_key: PubKey) -> SignerData {
        SignerData {
            chain_id: "test-chain".into(),
            account_number: 12,
            sequence: 3,
            pub_key,
        }
    }

    fn unsigned(pub_key: &PubKey, entries: usize) -> TxBuilder {
        let mut builder = TxBuilder::new();
        builder
            .set_msgs(vec![Msg::Send(MsgSend {
                from_address: pub_key.address_hex(),
                to_address: "bob".into(),
                amount: vec![],
            })])
            .set_gas_limit(100_000);
        let sigs = (0..entries)
            .map(|_| SignatureV2 {
                pub_key: Some(pub_key.clone()),
                data: SignatureData::Single {
                    mode: SignMode::Direct,
                    signature: Vec::new(),
                },
                sequence: 3,
            })
            .collect();
        builder.set_signatures(sigs).unwrap();
        builder
    }

    fn signed_tx(key: &PrivKey) -> Tx {
        let signer = signer_data(key.pub_key());
        let mut tx = unsigned(&key.pub_key(), 1).into_tx();
        let bytes = DirectCodec.sign_bytes(&signer, &tx).unwrap();
        tx.signatures[0] = key.sign(&bytes);
        tx
    }

    #[test]
    fn test_valid_signature() {
        let key = key();
        let tx = signed_tx(&key);
        assert_eq!(
            verify_sig(&signer_data(key.pub_key()), &DirectCodec, &tx),
            Ok(true)
        );
    }

    #[test]
    fn test_wrong_signer_is_false() {
        let tx = signed_tx(&key());
        assert_eq!(
            verify_sig(&signer_data(key().pub_key()), &DirectCodec, &tx),
            Ok(false)
        );
    }

    #[test]
    fn test_tampered_body_is_false() {
        let key = key();
        let mut tx = signed_tx(&key);
        tx.body.memo = "tampered".into();
        assert_eq!(
            verify_sig(&signer_data(key.pub_key()), &DirectCodec, &tx),
            Ok(false)
        );
    }

    #[test]
    fn test_zero_and_two_signatures_rejected() {
        let key = key();
        for entries in [0, 2] {
            let tx = unsigned(&key.pub_key(), entries).into_tx();
            assert_eq!(
                verify_sig(&signer_data(key.pub_key()), &DirectCodec, &tx),
                Err(VerifyError::SingleSignerExpected)
            );
        }
    }

    #[test]
    fn test_multisig_payload_rejected() {
        let key = key();
        let mut builder = unsigned(&key.pub_key(), 0);
        builder
            .set_signatures(vec![SignatureV2 {
                pub_key: Some(key.pub_key()),
                data: SignatureData::Multi {
                    bitarray: vec![true],
                    signatures: vec![SignatureData::Single {
                        mode: SignMode::Direct,
                        signature: vec![0u8; 64],
                    }],
                },
                sequence: 3,
            }])
            .unwrap();
        assert_eq!(
            verify_sig(
                &signer_data(key.pub_key()),
                &DirectCodec,
                &builder.into_tx()
            ),
            Err(VerifyError::SingleSignerExpected)
        );
    }

    #[test]
    fn test_codec_failure_propagates() {
        let key = key();
        let tx = signed_tx(&key);
        let err = verify_sig(&signer_data(key.pub_key()), &FailingCodec, &tx).unwrap_err();
        assert!(matches!(err, VerifyError::SignBytesComputationFailed(_)));
    }

    #[test]
    fn test_trait_object_verifier() {
        let key = key();
        let tx = signed_tx(&key);
        let verifier: Box<dyn SignatureVerifier<Tx>> =
            Box::new(SingleSignerVerifier::new(DirectCodec));
        assert_eq!(
            verifier.verify_signature(&signer_data(key.pub_key()), &tx),
            Ok(true)
        );
    }
}
