//! Push-subscription confirmation tracker.
//!
//! Where [`crate::Client::check_signature`] polls, the monitor opens a
//! signature subscription at the target commitment and blocks until
//! exactly one of three events: a status notification, a transport
//! failure, or the caller's cancellation. The subscription is released
//! on every exit path.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::client::TxId;
use crate::commitment::{CommitmentStatus, CommitmentWait, ConfirmationResult};
use crate::error::MonitorError;
use crate::subscription::{PubsubSubscriptionService, SubscriptionService};

/// Confirmation tracker over a pluggable subscription transport.
pub struct Monitor {
    subscriptions: Arc<dyn SubscriptionService>,
}

impl Monitor {
    /// Connects a monitor to a real pubsub websocket endpoint.
    pub async fn connect(ws_endpoint: &str) -> Result<Self, MonitorError> {
        let service = PubsubSubscriptionService::connect(ws_endpoint).await?;

        Ok(Self::with_subscription_service(Arc::new(service)))
    }

    /// Creates a monitor over an injected subscription transport.
    pub fn with_subscription_service(subscriptions: Arc<dyn SubscriptionService>) -> Self {
        Self { subscriptions }
    }

    /// Waits for a transaction to reach a specific commitment status.
    ///
    /// Consumes exactly one terminal event; it does not loop or
    /// re-subscribe. An on-chain instruction error still reports
    /// `reached: true`: the transaction hit the commitment, its
    /// program logic failed.
    pub async fn wait_for_commitment_status(
        &self,
        tx_id: &TxId,
        status: CommitmentStatus,
        cancel: CancellationToken,
    ) -> Result<ConfirmationResult, MonitorError> {
        let signature = tx_id.to_signature().map_err(MonitorError::InvalidTxId)?;

        let mut subscription = self
            .subscriptions
            .signature_subscribe(&signature, status.to_commitment_config())
            .await?;

        debug!(%signature, %status, "waiting for commitment status");

        let outcome = tokio::select! {
            _ = cancel.cancelled() => Err(MonitorError::Cancelled),
            notification = subscription.notifications.recv() => match notification {
                Some(notification) => Ok(ConfirmationResult {
                    reached: true,
                    instruction_error: notification.instruction_error,
                }),
                None => Err(MonitorError::Subscription(
                    "notification channel closed".to_string(),
                )),
            },
            failure = subscription.failures.recv() => {
                let reason = failure.unwrap_or_else(|| "failure channel closed".to_string());
                Err(MonitorError::Subscription(reason))
            }
        };

        // Dropping the handle releases the subscription; this covers
        // completion, transport failure and cancellation alike.
        drop(subscription);

        outcome
    }
}

#[async_trait]
impl CommitmentWait for Monitor {
    async fn wait_for_commitment(
        &self,
        tx_id: &TxId,
        status: CommitmentStatus,
        cancel: CancellationToken,
    ) -> Result<ConfirmationResult, MonitorError> {
        self.wait_for_commitment_status(tx_id, status, cancel).await
    }
}
