//! Solana client: broadcast engine, single-shot signature polling and
//! token balance queries over a pluggable RPC transport.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use solana_sdk::commitment_config::{CommitmentConfig, CommitmentLevel};
use solana_sdk::signature::Signature;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::commitment::{CommitmentStatus, CommitmentWait, ConfirmationResult};
use crate::error::{ClientError, MonitorError};
use crate::rpc::{RpcService, SendOpts, SolanaRpcService};
use crate::transaction::transaction_from_base64;
use crate::wallet::Wallet;

/// Re-broadcast bound the transport applies when submitting.
pub const DEFAULT_MAX_RETRIES: usize = 20;

/// Opaque identifier of a submitted transaction: the base58-encoded
/// signature. Produced only by a successful broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TxId(String);

impl TxId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub(crate) fn to_signature(&self) -> Result<Signature, solana_sdk::signature::ParseSignatureError> {
        Signature::from_str(&self.0)
    }
}

impl From<Signature> for TxId {
    fn from(signature: Signature) -> Self {
        Self(signature.to_string())
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A token account balance in the token's smallest unit, exact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenBalance {
    pub amount: Decimal,
    pub decimals: u8,
}

/// Immutable client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Transport-level re-broadcast bound for submits.
    pub max_retries: usize,
    /// Commitment used for blockhash fetches and balance queries.
    pub commitment: CommitmentConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            commitment: CommitmentConfig::default(),
        }
    }
}

/// Solana client owning a wallet and an RPC transport.
///
/// Holds no mutable state across calls; one instance is safe for
/// concurrent use by multiple in-flight operations.
pub struct Client {
    config: ClientConfig,
    rpc: Arc<dyn RpcService>,
    wallet: Wallet,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Creates a client against a real RPC endpoint with defaults.
    pub fn new(wallet: Wallet, rpc_endpoint: &str) -> Result<Self, ClientError> {
        Self::with_config(wallet, rpc_endpoint, ClientConfig::default())
    }

    /// Creates a client against a real RPC endpoint.
    pub fn with_config(
        wallet: Wallet,
        rpc_endpoint: &str,
        config: ClientConfig,
    ) -> Result<Self, ClientError> {
        if rpc_endpoint.is_empty() {
            return Err(ClientError::MissingRpcEndpoint);
        }

        let rpc = Arc::new(SolanaRpcService::new(rpc_endpoint));

        Ok(Self::with_rpc_service(wallet, rpc, config))
    }

    /// Creates a client over an injected transport (testing, or a
    /// specific RPC provider implementation).
    pub fn with_rpc_service(
        wallet: Wallet,
        rpc: Arc<dyn RpcService>,
        config: ClientConfig,
    ) -> Self {
        Self {
            config,
            rpc,
            wallet,
        }
    }

    /// Sends a transaction on-chain.
    ///
    /// Strictly sequential: fetch a fresh blockhash, decode the
    /// serialized transaction, stamp the blockhash, sign, submit. The
    /// submit carries the transport retry bound, a min-context-slot
    /// equal to the slot the blockhash was observed at, and a
    /// `processed` preflight commitment. No retries happen at this
    /// layer; the transport re-announces the same signed bytes under
    /// the same signature.
    pub async fn send_transaction_on_chain(&self, tx_base64: &str) -> Result<TxId, ClientError> {
        let latest_blockhash = self
            .rpc
            .latest_blockhash(self.config.commitment)
            .await
            .map_err(ClientError::BlockhashFetch)?;

        let mut tx = transaction_from_base64(tx_base64)?;
        tx.message.set_recent_blockhash(latest_blockhash.blockhash);

        let tx = self.wallet.sign_transaction(tx)?;

        let signature = self
            .rpc
            .send_transaction(
                &tx,
                SendOpts {
                    max_retries: self.config.max_retries,
                    min_context_slot: latest_blockhash.slot,
                    preflight_commitment: CommitmentLevel::Processed,
                },
            )
            .await
            .map_err(ClientError::Submit)?;

        info!(%signature, "sent transaction");

        Ok(TxId::from(signature))
    }

    /// Checks whether a transaction has been finalized on-chain.
    ///
    /// Single-shot, not a loop: callers needing eventual confirmation
    /// re-invoke on an interval. A missing status or a status below
    /// `finalized` is reported as an expected-transient error; a
    /// finalized transaction whose program logic failed is a success
    /// with the instruction error populated.
    pub async fn check_signature(&self, tx_id: &TxId) -> Result<ConfirmationResult, ClientError> {
        self.check_commitment(tx_id, CommitmentStatus::Finalized)
            .await
    }

    async fn check_commitment(
        &self,
        tx_id: &TxId,
        target: CommitmentStatus,
    ) -> Result<ConfirmationResult, ClientError> {
        let signature = tx_id.to_signature()?;

        let status = self
            .rpc
            .signature_status(&signature)
            .await
            .map_err(ClientError::StatusQuery)?
            .ok_or(ClientError::StatusUnavailable)?;

        let reached = status
            .confirmation_status
            .as_ref()
            .map(CommitmentStatus::from)
            .is_some_and(|s| s >= target);

        if !reached {
            return Err(ClientError::NotFinalized);
        }

        Ok(ConfirmationResult {
            reached: true,
            instruction_error: status.err,
        })
    }

    /// Fetches a token account's balance as an exact decimal plus the
    /// token's decimal-places hint.
    pub async fn get_token_account_balance(
        &self,
        account: &str,
    ) -> Result<TokenBalance, ClientError> {
        let pubkey = account.parse().map_err(ClientError::InvalidTokenAccount)?;

        let balance = self
            .rpc
            .token_account_balance(&pubkey, self.config.commitment)
            .await
            .map_err(ClientError::BalanceQuery)?;

        let amount = balance
            .amount
            .parse::<Decimal>()
            .map_err(|source| ClientError::AmountParse {
                amount: balance.amount.clone(),
                source,
            })?;

        Ok(TokenBalance {
            amount,
            decimals: balance.decimals,
        })
    }

    /// Closes the underlying RPC transport.
    pub async fn close(&self) -> Result<(), ClientError> {
        self.rpc.close().await.map_err(ClientError::Close)
    }
}

#[async_trait]
impl CommitmentWait for Client {
    /// Polling strategy: a single status check against the target
    /// commitment. Cancellation is the caller ceasing to re-invoke, so
    /// the token is not consulted here.
    async fn wait_for_commitment(
        &self,
        tx_id: &TxId,
        status: CommitmentStatus,
        _cancel: CancellationToken,
    ) -> Result<ConfirmationResult, MonitorError> {
        self.check_commitment(tx_id, status)
            .await
            .map_err(MonitorError::from)
    }
}
