//! Commitment model: the ordered durability tiers a transaction moves
//! through and their mapping to the RPC vocabulary.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::transaction::TransactionError;
use solana_transaction_status::TransactionConfirmationStatus;
use tokio_util::sync::CancellationToken;

use crate::client::TxId;
use crate::error::{ClientError, MonitorError};

/// Durability tier of a submitted transaction.
///
/// The ordering is part of the contract: `Finalized` strictly implies
/// `Confirmed` implies `Processed`.
/// See <https://docs.solanalabs.com/consensus/commitments>.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CommitmentStatus {
    Processed,
    Confirmed,
    Finalized,
}

impl CommitmentStatus {
    /// Total, injective mapping into the RPC commitment vocabulary.
    pub fn to_commitment_config(self) -> CommitmentConfig {
        match self {
            Self::Processed => CommitmentConfig::processed(),
            Self::Confirmed => CommitmentConfig::confirmed(),
            Self::Finalized => CommitmentConfig::finalized(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Processed => "processed",
            Self::Confirmed => "confirmed",
            Self::Finalized => "finalized",
        }
    }
}

impl fmt::Display for CommitmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommitmentStatus {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "processed" => Ok(Self::Processed),
            "confirmed" => Ok(Self::Confirmed),
            "finalized" => Ok(Self::Finalized),
            other => Err(ClientError::UnsupportedCommitment(other.to_string())),
        }
    }
}

impl From<&TransactionConfirmationStatus> for CommitmentStatus {
    fn from(status: &TransactionConfirmationStatus) -> Self {
        match status {
            TransactionConfirmationStatus::Processed => Self::Processed,
            TransactionConfirmationStatus::Confirmed => Self::Confirmed,
            TransactionConfirmationStatus::Finalized => Self::Finalized,
        }
    }
}

/// Terminal outcome of a confirmation wait.
///
/// `reached` reports whether the transaction hit the requested
/// commitment. An on-chain instruction error is not a call failure:
/// the transaction landed in a block but its program logic failed, so
/// it travels alongside the success flag instead of as an `Err`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationResult {
    pub reached: bool,
    pub instruction_error: Option<TransactionError>,
}

/// Single "await commitment" capability satisfied by both tracking
/// strategies: the single-shot polling check on [`crate::Client`] and
/// the push-subscription wait on [`crate::Monitor`]. Callers can swap
/// transport without changing call sites.
#[async_trait]
pub trait CommitmentWait: Send + Sync {
    async fn wait_for_commitment(
        &self,
        tx_id: &TxId,
        status: CommitmentStatus,
        cancel: CancellationToken,
    ) -> Result<ConfirmationResult, MonitorError>;
}
