//! Transaction model: body, auth info, signer infos and attached signatures.
//!
//! The layout mirrors a Cosmos SDK transaction:
//!
//! ```text
//! Tx
//! ├── body:       messages, memo, timeout height
//! ├── auth_info:  signer infos (public key, mode info, sequence), fee
//! └── signatures: one raw signature per signer info
//! ```
//!
//! Only the body and auth info are covered by sign bytes; the raw signatures
//! are attached afterwards.

use std::io::{self, Read, Write};

use borsh::{BorshDeserialize, BorshSerialize};

use crate::blob::{MsgPayForBlob, MsgWirePayForBlob};
use crate::error::{VerifyError, VerifyResult};
use crate::keys::PubKey;

/// Signing modes. Only the direct mode exists; there is nothing to negotiate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, BorshSerialize, BorshDeserialize)]
pub enum SignMode {
    Direct,
}

/// Deepest multisig nesting accepted when encoding or decoding.
pub const MAX_MODE_INFO_DEPTH: usize = 100;

/// How the raw signature of a signer info is to be interpreted.
///
/// Recursive, so the borsh impls are written by hand to bound nesting at
/// [`MAX_MODE_INFO_DEPTH`]. The wire layout matches the derived one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ModeInfo {
    Single { mode: SignMode },
    Multi {
        bitarray: Vec<bool>,
        mode_infos: Vec<ModeInfo>,
    },
}

const MODE_INFO_SINGLE: u8 = 0;
const MODE_INFO_MULTI: u8 = 1;

fn too_deep() -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidData,
        format!("mode info nested deeper than {MAX_MODE_INFO_DEPTH}"),
    )
}

impl ModeInfo {
    fn write_at<W: Write>(&self, writer: &mut W, depth: usize) -> io::Result<()> {
        if depth > MAX_MODE_INFO_DEPTH {
            return Err(too_deep());
        }
        match self {
            ModeInfo::Single { mode } => {
                MODE_INFO_SINGLE.serialize(writer)?;
                mode.serialize(writer)
            }
            ModeInfo::Multi {
                bitarray,
                mode_infos,
            } => {
                MODE_INFO_MULTI.serialize(writer)?;
                bitarray.serialize(writer)?;
                let len = u32::try_from(mode_infos.len())
                    .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "too many mode infos"))?;
                len.serialize(writer)?;
                for info in mode_infos {
                    info.write_at(writer, depth + 1)?;
                }
                Ok(())
            }
        }
    }

    fn read_at<R: Read>(reader: &mut R, depth: usize) -> io::Result<Self> {
        if depth > MAX_MODE_INFO_DEPTH {
            return Err(too_deep());
        }
        match u8::deserialize_reader(reader)? {
            MODE_INFO_SINGLE => Ok(ModeInfo::Single {
                mode: SignMode::deserialize_reader(reader)?,
            }),
            MODE_INFO_MULTI => {
                let bitarray = Vec::<bool>::deserialize_reader(reader)?;
                let len = u32::deserialize_reader(reader)?;
                // length is untrusted: grow as entries actually decode
                let mut mode_infos = Vec::new();
                for _ in 0..len {
                    mode_infos.push(Self::read_at(reader, depth + 1)?);
                }
                Ok(ModeInfo::Multi {
                    bitarray,
                    mode_infos,
                })
            }
            tag => Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("unknown mode info variant {tag}"),
            )),
        }
    }
}

impl BorshSerialize for ModeInfo {
    fn serialize<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        self.write_at(writer, 0)
    }
}

impl BorshDeserialize for ModeInfo {
    fn deserialize_reader<R: Read>(reader: &mut R) -> io::Result<Self> {
        Self::read_at(reader, 0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct SignerInfo {
    pub public_key: Option<PubKey>,
    pub mode_info: ModeInfo,
    pub sequence: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct Coin {
    pub denom: String,
    pub amount: u128,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct Fee {
    pub amount: Vec<Coin>,
    pub gas_limit: u64,
    pub payer: String,
    pub granter: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct AuthInfo {
    pub signer_infos: Vec<SignerInfo>,
    pub fee: Fee,
}

/// Plain token transfer.
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct MsgSend {
    pub from_address: String,
    pub to_address: String,
    pub amount: Vec<Coin>,
}

/// Messages a transaction body can carry.
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub enum Msg {
    Send(MsgSend),
    WirePayForBlob(MsgWirePayForBlob),
    PayForBlob(MsgPayForBlob),
}

impl Msg {
    /// Type URL style name, used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Msg::Send(_) => "MsgSend",
            Msg::WirePayForBlob(_) => "MsgWirePayForBlob",
            Msg::PayForBlob(_) => "MsgPayForBlob",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct TxBody {
    pub messages: Vec<Msg>,
    pub memo: String,
    pub timeout_height: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct Tx {
    pub body: TxBody,
    pub auth_info: AuthInfo,
    pub signatures: Vec<Vec<u8>>,
}

/// Signature payload of one signer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SignatureData {
    Single {
        mode: SignMode,
        signature: Vec<u8>,
    },
    Multi {
        bitarray: Vec<bool>,
        signatures: Vec<SignatureData>,
    },
}

/// A signer info joined with its raw signature.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignatureV2 {
    pub pub_key: Option<PubKey>,
    pub data: SignatureData,
    pub sequence: u64,
}

/// Wire form of a multisignature payload.
#[derive(BorshSerialize, BorshDeserialize)]
struct MultiSignature {
    signatures: Vec<Vec<u8>>,
}

impl Tx {
    pub fn msgs(&self) -> &[Msg] {
        &self.body.messages
    }

    pub fn fee(&self) -> &Fee {
        &self.auth_info.fee
    }

    pub fn gas_limit(&self) -> u64 {
        self.auth_info.fee.gas_limit
    }

    /// Joins every signer info with its raw signature.
    pub fn signatures_v2(&self) -> VerifyResult<Vec<SignatureV2>> {
        let infos = &self.auth_info.signer_infos;
        if infos.len() != self.signatures.len() {
            return Err(VerifyError::SignatureDecodeFailed(format!(
                "{} signer infos but {} signatures",
                infos.len(),
                self.signatures.len()
            )));
        }

        infos
            .iter()
            .zip(&self.signatures)
            .map(|(info, raw)| {
                Ok(SignatureV2 {
                    pub_key: info.public_key.clone(),
                    data: decode_signature_data(&info.mode_info, raw, 0)?,
                    sequence: info.sequence,
                })
            })
            .collect()
    }

    pub fn to_bytes(&self) -> io::Result<Vec<u8>> {
        borsh::to_vec(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> io::Result<Self> {
        borsh::from_slice(bytes)
    }
}

fn decode_signature_data(
    mode_info: &ModeInfo,
    raw: &[u8],
    depth: usize,
) -> VerifyResult<SignatureData> {
    if depth > MAX_MODE_INFO_DEPTH {
        return Err(VerifyError::SignatureDecodeFailed(too_deep().to_string()));
    }
    match mode_info {
        ModeInfo::Single { mode } => Ok(SignatureData::Single {
            mode: *mode,
            signature: raw.to_vec(),
        }),
        ModeInfo::Multi {
            bitarray,
            mode_infos,
        } => {
            let multi: MultiSignature = borsh::from_slice(raw)
                .map_err(|e| VerifyError::SignatureDecodeFailed(e.to_string()))?;
            if multi.signatures.len() != mode_infos.len() {
                return Err(VerifyError::SignatureDecodeFailed(format!(
                    "{} multisig mode infos but {} signatures",
                    mode_infos.len(),
                    multi.signatures.len()
                )));
            }
            let signatures = mode_infos
                .iter()
                .zip(&multi.signatures)
                .map(|(info, sig)| decode_signature_data(info, sig, depth + 1))
                .collect::<VerifyResult<Vec<_>>>()?;
            Ok(SignatureData::Multi {
                bitarray: bitarray.clone(),
                signatures,
            })
        }
    }
}

fn encode_signature_data(data: &SignatureData, depth: usize) -> io::Result<(ModeInfo, Vec<u8>)> {
    if depth > MAX_MODE_INFO_DEPTH {
        return Err(too_deep());
    }
    match data {
        SignatureData::Single { mode, signature } => {
            Ok((ModeInfo::Single { mode: *mode }, signature.clone()))
        }
        SignatureData::Multi {
            bitarray,
            signatures,
        } => {
            let mut mode_infos = Vec::with_capacity(signatures.len());
            let mut raws = Vec::with_capacity(signatures.len());
            for sig in signatures {
                let (info, raw) = encode_signature_data(sig, depth + 1)?;
                mode_infos.push(info);
                raws.push(raw);
            }
            let raw = borsh::to_vec(&MultiSignature { signatures: raws })?;
            Ok((
                ModeInfo::Multi {
                    bitarray: bitarray.clone(),
                    mode_infos,
                },
                raw,
            ))
        }
    }
}

/// Incrementally assembles a [`Tx`].
#[derive(Clone, Debug, Default)]
pub struct TxBuilder {
    tx: Tx,
}

impl TxBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_msgs(&mut self, msgs: Vec<Msg>) -> &mut Self {
        self.tx.body.messages = msgs;
        self
    }

    pub fn set_memo(&mut self, memo: impl Into<String>) -> &mut Self {
        self.tx.body.memo = memo.into();
        self
    }

    pub fn set_timeout_height(&mut self, height: u64) -> &mut Self {
        self.tx.body.timeout_height = height;
        self
    }

    pub fn set_gas_limit(&mut self, gas_limit: u64) -> &mut Self {
        self.tx.auth_info.fee.gas_limit = gas_limit;
        self
    }

    pub fn set_fee_amount(&mut self, amount: Vec<Coin>) -> &mut Self {
        self.tx.auth_info.fee.amount = amount;
        self
    }

    pub fn set_fee_payer(&mut self, payer: impl Into<String>) -> &mut Self {
        self.tx.auth_info.fee.payer = payer.into();
        self
    }

    pub fn set_fee_granter(&mut self, granter: impl Into<String>) -> &mut Self {
        self.tx.auth_info.fee.granter = granter.into();
        self
    }

    /// Replaces signer infos and raw signatures with the given entries.
    pub fn set_signatures(&mut self, sigs: Vec<SignatureV2>) -> io::Result<&mut Self> {
        let mut infos = Vec::with_capacity(sigs.len());
        let mut raws = Vec::with_capacity(sigs.len());
        for sig in sigs {
            let (mode_info, raw) = encode_signature_data(&sig.data, 0)?;
            infos.push(SignerInfo {
                public_key: sig.pub_key,
                mode_info,
                sequence: sig.sequence,
            });
            raws.push(raw);
        }
        self.tx.auth_info.signer_infos = infos;
        self.tx.signatures = raws;
        Ok(self)
    }

    pub fn get_tx(&self) -> Tx {
        self.tx.clone()
    }

    pub fn into_tx(self) -> Tx {
        self.tx
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn single(sig: &[u8]) -> SignatureData {
        SignatureData::Single {
            mode: SignMode::Direct,
            signature: sig.to_vec(),
        }
    }

    #[test]
    fn test_set_signatures_roundtrip() {
        let key = PubKey::Ed25519([7u8; 32]);
        let mut builder = TxBuilder::new();
        builder
            .set_signatures(vec![SignatureV2 {
                pub_key: Some(key.clone()),
                data: single(b"sig"),
                sequence: 3,
            }])
            .unwrap();
        let tx = builder.into_tx();

        let sigs = tx.signatures_v2().unwrap();
        assert_eq!(sigs.len(), 1);
        assert_eq!(sigs[0].pub_key, Some(key));
        assert_eq!(sigs[0].sequence, 3);
        assert_eq!(sigs[0].data, single(b"sig"));
    }

    #[test]
    fn test_multisig_roundtrip() {
        let multi = SignatureData::Multi {
            bitarray: vec![true, false, true],
            signatures: vec![single(b"a"), single(b"b")],
        };
        let mut builder = TxBuilder::new();
        builder
            .set_signatures(vec![SignatureV2 {
                pub_key: None,
                data: multi.clone(),
                sequence: 0,
            }])
            .unwrap();
        let tx = builder.into_tx();

        assert!(matches!(
            tx.auth_info.signer_infos[0].mode_info,
            ModeInfo::Multi { .. }
        ));
        assert_eq!(tx.signatures_v2().unwrap()[0].data, multi);
    }

    #[test]
    fn test_count_mismatch_is_decode_error() {
        let mut tx = Tx::default();
        tx.signatures.push(b"orphan".to_vec());
        let err = tx.signatures_v2().unwrap_err();
        assert!(matches!(err, VerifyError::SignatureDecodeFailed(_)));
    }

    #[test]
    fn test_garbage_multisig_payload_is_decode_error() {
        let mut tx = Tx::default();
        tx.auth_info.signer_infos.push(SignerInfo {
            public_key: None,
            mode_info: ModeInfo::Multi {
                bitarray: vec![true],
                mode_infos: vec![ModeInfo::Single {
                    mode: SignMode::Direct,
                }],
            },
            sequence: 0,
        });
        tx.signatures.push(vec![0xff]);
        assert!(matches!(
            tx.signatures_v2(),
            Err(VerifyError::SignatureDecodeFailed(_))
        ));
    }

    #[test]
    fn test_builder_sets_auth_fields() {
        let mut builder = TxBuilder::new();
        builder
            .set_memo("hello")
            .set_timeout_height(42)
            .set_gas_limit(200_000)
            .set_fee_amount(vec![Coin {
                denom: "utia".into(),
                amount: 2_000,
            }])
            .set_fee_payer("payer")
            .set_fee_granter("granter");
        let tx = builder.get_tx();

        assert_eq!(tx.body.memo, "hello");
        assert_eq!(tx.body.timeout_height, 42);
        assert_eq!(tx.gas_limit(), 200_000);
        assert_eq!(tx.fee().amount[0].amount, 2_000);
        assert_eq!(tx.fee().payer, "payer");
        assert_eq!(tx.fee().granter, "granter");
    }

    #[test]
    fn test_bytes_roundtrip() {
        let mut builder = TxBuilder::new();
        builder.set_msgs(vec![Msg::Send(MsgSend {
            from_address: "a".into(),
            to_address: "b".into(),
            amount: vec![],
        })]);
        let tx = builder.into_tx();
        let decoded = Tx::from_bytes(&tx.to_bytes().unwrap()).unwrap();
        assert_eq!(decoded, tx);
    }

    /// `depth` multisig wrappers around a single direct mode info.
    fn nested_mode_info(depth: usize) -> ModeInfo {
        let mut info = ModeInfo::Single {
            mode: SignMode::Direct,
        };
        for _ in 0..depth {
            info = ModeInfo::Multi {
                bitarray: vec![],
                mode_infos: vec![info],
            };
        }
        info
    }

    fn nested_mode_info_bytes(depth: usize) -> Vec<u8> {
        let mut bytes = Vec::new();
        for _ in 0..depth {
            bytes.push(1);
            bytes.extend_from_slice(&0u32.to_le_bytes());
            bytes.extend_from_slice(&1u32.to_le_bytes());
        }
        bytes.extend_from_slice(&[0, 0]);
        bytes
    }

    #[test]
    fn test_mode_info_wire_layout() {
        let single = ModeInfo::Single {
            mode: SignMode::Direct,
        };
        assert_eq!(borsh::to_vec(&single).unwrap(), vec![0, 0]);
        assert_eq!(
            borsh::to_vec(&nested_mode_info(1)).unwrap(),
            nested_mode_info_bytes(1)
        );
    }

    #[test]
    fn test_mode_info_depth_limit() {
        let at_limit = nested_mode_info(MAX_MODE_INFO_DEPTH);
        let bytes = borsh::to_vec(&at_limit).unwrap();
        assert_eq!(borsh::from_slice::<ModeInfo>(&bytes).unwrap(), at_limit);

        assert!(borsh::to_vec(&nested_mode_info(MAX_MODE_INFO_DEPTH + 1)).is_err());
        assert!(
            borsh::from_slice::<ModeInfo>(&nested_mode_info_bytes(MAX_MODE_INFO_DEPTH + 1)).is_err()
        );
    }

    #[test]
    fn test_deeply_nested_bytes_are_rejected() {
        let err = borsh::from_slice::<ModeInfo>(&nested_mode_info_bytes(50_000)).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_unknown_mode_info_variant() {
        assert!(borsh::from_slice::<ModeInfo>(&[2, 0]).is_err());
    }

    #[test]
    fn test_nested_signature_data_is_bounded() {
        let mut data = single(b"sig");
        for _ in 0..=MAX_MODE_INFO_DEPTH {
            data = SignatureData::Multi {
                bitarray: vec![true],
                signatures: vec![data],
            };
        }
        let mut builder = TxBuilder::new();
        assert!(builder
            .set_signatures(vec![SignatureV2 {
                pub_key: None,
                data,
                sequence: 0,
            }])
            .is_err());

        let mut tx = Tx::default();
        tx.auth_info.signer_infos.push(SignerInfo {
            public_key: None,
            mode_info: nested_mode_info(MAX_MODE_INFO_DEPTH + 1),
            sequence: 0,
        });
        tx.signatures.push(vec![]);
        assert!(matches!(
            tx.signatures_v2(),
            Err(VerifyError::SignatureDecodeFailed(_))
        ));
    }
}
