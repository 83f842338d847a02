use crate::blob::MsgWirePayForBlob;
use crate::error::{VerifyError, VerifyResult};
use crate::malleation::WireMsgExtractor;
use crate::tx::{Msg, Tx};

/// Accepts transactions carrying exactly one [`Msg::WirePayForBlob`].
#[derive(Clone, Copy, Debug, Default)]
pub struct ExtractWirePfb;

impl WireMsgExtractor for ExtractWirePfb {
    fn extract<'a>(&self, tx: &'a Tx) -> VerifyResult<&'a MsgWirePayForBlob> {
        match tx.msgs() {
            [Msg::WirePayForBlob(msg)] => Ok(msg),
            [other] => Err(VerifyError::ExtractionFailed(format!(
                "unexpected message type {}",
                other.type_name()
            ))),
            msgs => Err(VerifyError::ExtractionFailed(format!(
                "expected exactly one message, got {}",
                msgs.len()
            ))),
        }
    }
}
