//! RPC capability: the minimal network surface the client needs,
//! behind a trait so transports can be swapped at construction time
//! (real node, specific provider endpoint, or a test mock).

use async_trait::async_trait;
use serde_json::json;
use solana_account_decoder::parse_token::UiTokenAmount;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_rpc_client_api::config::RpcSendTransactionConfig;
use solana_rpc_client_api::request::RpcRequest;
use solana_rpc_client_api::response::{Response, RpcBlockhash};
use solana_sdk::clock::Slot;
use solana_sdk::commitment_config::{CommitmentConfig, CommitmentLevel};
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::VersionedTransaction;
use solana_transaction_status::{TransactionStatus, UiTransactionEncoding};
use tracing::debug;

use crate::error::RpcError;

/// A recent blockhash together with the context it was observed in.
///
/// The slot feeds the submit call's min-context-slot bound so the node
/// never processes the transaction against state older than the
/// blockhash fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatestBlockhash {
    pub blockhash: Hash,
    pub slot: Slot,
    pub last_valid_block_height: u64,
}

/// Submit options applied by the transport, not looped by the caller.
#[derive(Debug, Clone, Copy)]
pub struct SendOpts {
    /// Re-broadcast bound applied internally by the node/transport.
    pub max_retries: usize,
    /// Slot observed when the blockhash was fetched.
    pub min_context_slot: Slot,
    /// Simulation strictness before the node accepts the transaction.
    pub preflight_commitment: CommitmentLevel,
}

/// Minimal RPC surface consumed by [`crate::Client`].
#[async_trait]
pub trait RpcService: Send + Sync {
    async fn send_transaction(
        &self,
        tx: &VersionedTransaction,
        opts: SendOpts,
    ) -> Result<Signature, RpcError>;

    async fn latest_blockhash(
        &self,
        commitment: CommitmentConfig,
    ) -> Result<LatestBlockhash, RpcError>;

    /// Status of a single signature; no transaction-history search.
    async fn signature_status(
        &self,
        signature: &Signature,
    ) -> Result<Option<TransactionStatus>, RpcError>;

    async fn token_account_balance(
        &self,
        pubkey: &Pubkey,
        commitment: CommitmentConfig,
    ) -> Result<UiTokenAmount, RpcError>;

    async fn close(&self) -> Result<(), RpcError>;
}

/// Real transport over a nonblocking Solana RPC client.
pub struct SolanaRpcService {
    inner: RpcClient,
}

impl SolanaRpcService {
    pub fn new(endpoint: &str) -> Self {
        Self {
            inner: RpcClient::new(endpoint.to_string()),
        }
    }
}

#[async_trait]
impl RpcService for SolanaRpcService {
    async fn send_transaction(
        &self,
        tx: &VersionedTransaction,
        opts: SendOpts,
    ) -> Result<Signature, RpcError> {
        let config = RpcSendTransactionConfig {
            skip_preflight: false,
            preflight_commitment: Some(opts.preflight_commitment),
            encoding: Some(UiTransactionEncoding::Base64),
            max_retries: Some(opts.max_retries),
            min_context_slot: Some(opts.min_context_slot),
        };

        self.inner.send_transaction_with_config(tx, config).await
    }

    async fn latest_blockhash(
        &self,
        commitment: CommitmentConfig,
    ) -> Result<LatestBlockhash, RpcError> {
        // Raw request instead of the convenience getter: the context
        // slot is needed for the submit min-context-slot bound.
        let response: Response<RpcBlockhash> = self
            .inner
            .send(RpcRequest::GetLatestBlockhash, json!([commitment]))
            .await?;

        let blockhash = response
            .value
            .blockhash
            .parse::<Hash>()
            .map_err(|e| RpcError::new_with_request(
                solana_client::client_error::ClientErrorKind::Custom(format!(
                    "invalid blockhash in response: {e}"
                )),
                RpcRequest::GetLatestBlockhash,
            ))?;

        Ok(LatestBlockhash {
            blockhash,
            slot: response.context.slot,
            last_valid_block_height: response.value.last_valid_block_height,
        })
    }

    async fn signature_status(
        &self,
        signature: &Signature,
    ) -> Result<Option<TransactionStatus>, RpcError> {
        let response = self.inner.get_signature_statuses(&[*signature]).await?;

        Ok(response.value.into_iter().next().flatten())
    }

    async fn token_account_balance(
        &self,
        pubkey: &Pubkey,
        commitment: CommitmentConfig,
    ) -> Result<UiTokenAmount, RpcError> {
        let response = self
            .inner
            .get_token_account_balance_with_commitment(pubkey, commitment)
            .await?;

        Ok(response.value)
    }

    async fn close(&self) -> Result<(), RpcError> {
        // The underlying HTTP client tears down its connections on drop.
        debug!(url = %self.inner.url(), "closing rpc transport");
        Ok(())
    }
}
