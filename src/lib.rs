//! Jupiter swap client for Solana.
//!
//! Two halves, glued by a base64-encoded transaction:
//! - [`jupiter`]: a thin HTTP client for the Jupiter aggregator API
//!   (best-price quote, swap transaction build).
//! - [`Client`] / [`Monitor`]: the broadcast and confirmation-tracking
//!   core: stamp a fresh blockhash, sign, submit with bounded
//!   transport retries, then learn the outcome either by polling
//!   ([`Client::check_signature`]) or by push subscription
//!   ([`Monitor::wait_for_commitment_status`]).
//!
//! Transports are capability traits ([`RpcService`],
//! [`SubscriptionService`]) injected at construction, so tests and
//! alternative RPC providers plug in without touching call sites.

pub mod client;
pub mod commitment;
pub mod error;
pub mod jupiter;
pub mod monitor;
pub mod rpc;
pub mod subscription;
pub mod transaction;
pub mod wallet;

pub use client::{Client, ClientConfig, TokenBalance, TxId, DEFAULT_MAX_RETRIES};
pub use commitment::{CommitmentStatus, CommitmentWait, ConfirmationResult};
pub use error::{ClientError, JupiterError, MonitorError};
pub use monitor::Monitor;
pub use rpc::{LatestBlockhash, RpcService, SendOpts, SolanaRpcService};
pub use subscription::{
    PubsubSubscriptionService, SignatureNotification, SignatureSubscription, SubscriptionService,
};
pub use transaction::{message_bytes, transaction_from_base64};
pub use wallet::Wallet;
