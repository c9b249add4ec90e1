//! Error types for the client, monitor and aggregator API surfaces
//!
//! Every lower-layer failure is wrapped with the name of the operation
//! that failed. Expected-transient confirmation states (`StatusUnavailable`,
//! `NotFinalized`) are distinct variants so callers can tell them apart
//! from transport failures and re-poll instead of aborting.

use thiserror::Error;

/// Transport-level error surfaced by the RPC capability.
pub type RpcError = solana_client::client_error::ClientError;

/// Error type for the Solana client: broadcast, polling and balance paths.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Construction-time configuration error, never retried.
    #[error("rpc endpoint is required when no RPC service is provided")]
    MissingRpcEndpoint,

    /// The base64 envelope of a serialized transaction is malformed.
    #[error("could not decode transaction: {0}")]
    TransactionBase64(#[source] base64::DecodeError),

    /// The binary transaction layout is malformed (truncated account-key
    /// table, instruction count mismatch, bad shortvec framing).
    #[error("could not deserialize transaction: {0}")]
    TransactionLayout(#[source] bincode::Error),

    /// Message-only serialization failed while preparing bytes to sign.
    #[error("could not serialize transaction message: {0}")]
    MessageSerialize(#[source] bincode::Error),

    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    /// Corrupt key or serialization bug, never transient.
    #[error("could not sign transaction: {0}")]
    Signing(String),

    #[error("could not get latest blockhash: {0}")]
    BlockhashFetch(#[source] RpcError),

    #[error("could not send transaction: {0}")]
    Submit(#[source] RpcError),

    #[error("could not convert signature from base58: {0}")]
    InvalidSignature(#[from] solana_sdk::signature::ParseSignatureError),

    #[error("could not get signature status: {0}")]
    StatusQuery(#[source] RpcError),

    /// The queried node has not seen the signature yet. Expected-transient.
    #[error("could not confirm transaction: no valid status")]
    StatusUnavailable,

    /// The signature is known but below the requested commitment.
    /// Expected-transient; callers re-poll on an interval.
    #[error("transaction not finalized yet")]
    NotFinalized,

    #[error("could not parse token account public key: {0}")]
    InvalidTokenAccount(#[from] solana_sdk::pubkey::ParsePubkeyError),

    #[error("could not get token account balance: {0}")]
    BalanceQuery(#[source] RpcError),

    /// The node returned an amount string that is not a valid decimal.
    #[error("could not parse token amount {amount:?}: {source}")]
    AmountParse {
        amount: String,
        source: rust_decimal::Error,
    },

    #[error("unsupported commitment status: {0:?}")]
    UnsupportedCommitment(String),

    #[error("could not close rpc transport: {0}")]
    Close(#[source] RpcError),
}

/// Error type for the push-subscription confirmation tracker.
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("ws endpoint is required when no subscription service is provided")]
    MissingWsEndpoint,

    #[error("could not connect to ws: {0}")]
    Connect(String),

    #[error("invalid txID: {0}")]
    InvalidTxId(#[source] solana_sdk::signature::ParseSignatureError),

    #[error("could not subscribe to signature: {0}")]
    Subscribe(String),

    /// The subscription channel reported a transport failure.
    #[error("subscription error: {0}")]
    Subscription(String),

    /// The caller's cancellation token fired before any event arrived.
    #[error("context cancelled")]
    Cancelled,

    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Error type for the Jupiter aggregator HTTP API.
#[derive(Debug, Error)]
pub enum JupiterError {
    #[error("could not create Jupiter client: {0}")]
    Build(#[source] reqwest::Error),

    #[error("could not call {operation}: {source}")]
    Request {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("Jupiter API returned status {status}: {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("could not decode {operation} response: {source}")]
    Decode {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },
}
