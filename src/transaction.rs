//! Transaction codec: base64 envelope in, structured transaction out.
//!
//! The aggregator hands back an unsigned serialized transaction; this
//! module decodes it into a [`VersionedTransaction`] (legacy and v0
//! framings share one deserializer) and produces the message-only
//! bytes that get signed. Both transforms are pure.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use solana_sdk::message::VersionedMessage;
use solana_sdk::transaction::VersionedTransaction;

use crate::error::ClientError;

/// Deserializes a transaction from a base64 string.
pub fn transaction_from_base64(tx_base64: &str) -> Result<VersionedTransaction, ClientError> {
    let tx_bytes = BASE64
        .decode(tx_base64)
        .map_err(ClientError::TransactionBase64)?;

    bincode::deserialize(&tx_bytes).map_err(ClientError::TransactionLayout)
}

/// Serializes the message only, excluding signature slots. These are
/// the bytes a signature commits to.
pub fn message_bytes(message: &VersionedMessage) -> Result<Vec<u8>, ClientError> {
    bincode::serialize(message).map_err(ClientError::MessageSerialize)
}
