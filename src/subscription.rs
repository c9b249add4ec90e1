//! Signature-subscription capability: the push-based channel a
//! [`crate::Monitor`] waits on, behind a trait so the websocket
//! transport can be replaced by a mock.

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::StreamExt;
use solana_client::nonblocking::pubsub_client::PubsubClient;
use solana_rpc_client_api::config::RpcSignatureSubscribeConfig;
use solana_rpc_client_api::response::{Response, RpcSignatureResult};
use solana_sdk::clock::Slot;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::TransactionError;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use crate::error::MonitorError;

/// A status event for a subscribed signature: the transaction reached
/// the subscribed commitment level, possibly with an on-chain
/// instruction error.
#[derive(Debug, Clone)]
pub struct SignatureNotification {
    pub slot: Slot,
    pub instruction_error: Option<TransactionError>,
}

impl SignatureNotification {
    fn from_rpc(response: Response<RpcSignatureResult>) -> Self {
        let instruction_error = match response.value {
            RpcSignatureResult::ProcessedSignature(result) => result.err,
            // Received notifications are disabled at subscribe time.
            RpcSignatureResult::ReceivedSignature(_) => None,
        };

        Self {
            slot: response.context.slot,
            instruction_error,
        }
    }
}

/// Live subscription scoped to one signature and commitment level.
///
/// Carries one channel for status notifications and one for transport
/// failures. The underlying subscription is released when this handle
/// drops, so every exit path of a wait (completion, error,
/// cancellation) unsubscribes exactly once.
pub struct SignatureSubscription {
    pub(crate) notifications: mpsc::Receiver<SignatureNotification>,
    pub(crate) failures: mpsc::Receiver<String>,
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl SignatureSubscription {
    /// Builds a subscription handle from its parts. The release hook is
    /// invoked exactly once, on drop.
    pub fn new(
        notifications: mpsc::Receiver<SignatureNotification>,
        failures: mpsc::Receiver<String>,
        release: impl FnOnce() + Send + 'static,
    ) -> Self {
        Self {
            notifications,
            failures,
            release: Some(Box::new(release)),
        }
    }
}

impl Drop for SignatureSubscription {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

/// Capability for opening signature subscriptions.
#[async_trait]
pub trait SubscriptionService: Send + Sync {
    async fn signature_subscribe(
        &self,
        signature: &Signature,
        commitment: CommitmentConfig,
    ) -> Result<SignatureSubscription, MonitorError>;
}

/// Real subscription transport over the Solana pubsub websocket.
///
/// The connection is long-lived and multiplexes; one service instance
/// serves any number of concurrent subscriptions.
pub struct PubsubSubscriptionService {
    client: Arc<PubsubClient>,
}

impl std::fmt::Debug for PubsubSubscriptionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PubsubSubscriptionService")
            .finish_non_exhaustive()
    }
}

impl PubsubSubscriptionService {
    pub async fn connect(ws_endpoint: &str) -> Result<Self, MonitorError> {
        if ws_endpoint.is_empty() {
            return Err(MonitorError::MissingWsEndpoint);
        }

        let client = PubsubClient::new(ws_endpoint)
            .await
            .map_err(|e| MonitorError::Connect(e.to_string()))?;

        Ok(Self {
            client: Arc::new(client),
        })
    }
}

#[async_trait]
impl SubscriptionService for PubsubSubscriptionService {
    async fn signature_subscribe(
        &self,
        signature: &Signature,
        commitment: CommitmentConfig,
    ) -> Result<SignatureSubscription, MonitorError> {
        let (notification_tx, notification_rx) = mpsc::channel(1);
        let (failure_tx, failure_rx) = mpsc::channel(1);
        let (ready_tx, ready_rx) = oneshot::channel::<Result<(), String>>();
        let (release_tx, mut release_rx) = oneshot::channel::<()>();

        let client = Arc::clone(&self.client);
        let signature = *signature;

        // The pubsub stream borrows the client, so a forwarder task owns
        // both and bridges into the subscription handle's channels.
        tokio::spawn(async move {
            let config = RpcSignatureSubscribeConfig {
                commitment: Some(commitment),
                enable_received_notification: Some(false),
            };

            let (mut notifications, unsubscribe) =
                match client.signature_subscribe(&signature, Some(config)).await {
                    Ok(subscription) => {
                        let _ = ready_tx.send(Ok(()));
                        subscription
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(e.to_string()));
                        return;
                    }
                };

            loop {
                tokio::select! {
                    _ = &mut release_rx => {
                        debug!(%signature, "signature subscription released");
                        break;
                    }
                    item = notifications.next() => match item {
                        Some(response) => {
                            let notification = SignatureNotification::from_rpc(response);
                            if notification_tx.send(notification).await.is_err() {
                                break;
                            }
                        }
                        None => {
                            warn!(%signature, "signature subscription stream closed");
                            let _ = failure_tx
                                .send("subscription stream closed by transport".to_string())
                                .await;
                            break;
                        }
                    }
                }
            }

            unsubscribe().await;
        });

        match ready_rx.await {
            Ok(Ok(())) => {}
            Ok(Err(reason)) => return Err(MonitorError::Subscribe(reason)),
            Err(_) => {
                return Err(MonitorError::Subscribe(
                    "subscription task exited before subscribing".to_string(),
                ))
            }
        }

        Ok(SignatureSubscription::new(
            notification_rx,
            failure_rx,
            move || {
                let _ = release_tx.send(());
            },
        ))
    }
}
