//! Client integration tests against a mock RPC transport.

use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use solana_account_decoder::parse_token::UiTokenAmount;
use solana_client::client_error::ClientErrorKind;
use solana_sdk::commitment_config::{CommitmentConfig, CommitmentLevel};
use solana_sdk::hash::Hash;
use solana_sdk::instruction::InstructionError;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::{TransactionError, VersionedTransaction};
use solana_transaction_status::{TransactionConfirmationStatus, TransactionStatus};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use jup_client::error::RpcError;
use jup_client::{
    Client, ClientConfig, ClientError, CommitmentStatus, CommitmentWait, LatestBlockhash,
    MonitorError, RpcService, SendOpts, TxId, Wallet,
};

const TEST_PK: &str =
    "5473ZnvEhn35BdcCcPLKnzsyP6TsgqQrNFpn4i2gFegFiiJLyWginpa9GoFn2cy6Aq2EAuxLt2u2bjFDBPvNY6nw";
const TEST_TX: &str = "AAEAAQPrM+1WcczVrvBstwqcH1lXpPpbHuKVFpSj9kZOi1GITD6KBh4ENmDzZ4cG9x+7s1w6q77AoogJbaz28WWsI0elAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAANgS9CVZkT3oU8ECpERHXI92vwg8ofvcIVgdQtcOK3NgECAgABDAIAAACghgEAAAAAAA==";
const TEST_SIGNATURE: &str =
    "24jRjMP3medE9iMqVSPRbkwfe9GdPmLfeftKPuwRHZdYTZJ6UyzNMGGKo4BHrTu2zVj4CgFF3CEuzS79QXUo2CMC";
const PROCESSING_SIGNATURE: &str =
    "24jRjMP3medE9iMqVSPRbkwfe9GdPmLfeftKPuwRHZdYTZJ6UyzNMGGKo4BHrTu2zVj4CgFF3CEuzS79QXUo2CPC";
const TEST_BLOCKHASH: &str = "uiYzZ5PCq6C8BRSLSUGBScrXo62bBFbRFP9EkPcaWN9";
const TOKEN_ACCOUNT: &str = "9K4NT8o4VyXv8RiHWfr7tchGEbsrV7KHYwMQDSgt1pnZ";
const MOCK_SLOT: u64 = 123;

fn mocked_error() -> RpcError {
    RpcError::from(ClientErrorKind::RpcError(
        solana_rpc_client_api::request::RpcError::ForUser("mocked error".to_string()),
    ))
}

/// Signature whose status is finalized but carries an instruction error.
fn failed_signature() -> Signature {
    Signature::from([7u8; 64])
}

/// Signature the mock has never seen.
fn unknown_signature() -> Signature {
    Signature::from([9u8; 64])
}

#[derive(Default)]
struct RpcMock {
    fail_latest_blockhash: bool,
    fail_send_transaction: bool,
    fail_signature_status: bool,
    fail_token_balance: bool,
    bad_token_amount: bool,
    sent: Mutex<Option<(VersionedTransaction, SendOpts)>>,
    closed: AtomicUsize,
}

#[async_trait]
impl RpcService for RpcMock {
    async fn send_transaction(
        &self,
        tx: &VersionedTransaction,
        opts: SendOpts,
    ) -> Result<Signature, RpcError> {
        if self.fail_send_transaction {
            return Err(mocked_error());
        }

        *self.sent.lock().await = Some((tx.clone(), opts));

        Ok(Signature::from_str(TEST_SIGNATURE).unwrap())
    }

    async fn latest_blockhash(
        &self,
        _commitment: CommitmentConfig,
    ) -> Result<LatestBlockhash, RpcError> {
        if self.fail_latest_blockhash {
            return Err(mocked_error());
        }

        Ok(LatestBlockhash {
            blockhash: Hash::from_str(TEST_BLOCKHASH).unwrap(),
            slot: MOCK_SLOT,
            last_valid_block_height: 123,
        })
    }

    async fn signature_status(
        &self,
        signature: &Signature,
    ) -> Result<Option<TransactionStatus>, RpcError> {
        if self.fail_signature_status {
            return Err(mocked_error());
        }

        if *signature == unknown_signature() {
            return Ok(None);
        }

        let (confirmation_status, err) = if *signature
            == Signature::from_str(PROCESSING_SIGNATURE).unwrap()
        {
            (TransactionConfirmationStatus::Processed, None)
        } else if *signature == failed_signature() {
            (
                TransactionConfirmationStatus::Finalized,
                Some(TransactionError::InstructionError(
                    0,
                    InstructionError::Custom(6001),
                )),
            )
        } else {
            (TransactionConfirmationStatus::Finalized, None)
        };

        Ok(Some(TransactionStatus {
            slot: MOCK_SLOT,
            confirmations: None,
            status: Ok(()),
            err: err.clone(),
            confirmation_status: Some(confirmation_status),
        }))
    }

    async fn token_account_balance(
        &self,
        _pubkey: &Pubkey,
        _commitment: CommitmentConfig,
    ) -> Result<UiTokenAmount, RpcError> {
        if self.fail_token_balance {
            return Err(mocked_error());
        }

        let amount = if self.bad_token_amount {
            "not-a-number".to_string()
        } else {
            "1000000000".to_string()
        };

        Ok(UiTokenAmount {
            ui_amount: Some(1.0),
            decimals: 9,
            amount,
            ui_amount_string: "1".to_string(),
        })
    }

    async fn close(&self) -> Result<(), RpcError> {
        self.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn test_wallet() -> Wallet {
    Wallet::from_private_key_base58(TEST_PK).unwrap()
}

fn client_with(mock: RpcMock) -> (Client, Arc<RpcMock>) {
    let mock = Arc::new(mock);
    let client = Client::with_rpc_service(test_wallet(), mock.clone(), ClientConfig::default());
    (client, mock)
}

#[test]
fn rejects_empty_rpc_endpoint() {
    let err = Client::new(test_wallet(), "").unwrap_err();
    assert!(matches!(err, ClientError::MissingRpcEndpoint));
}

#[tokio::test]
async fn broadcasts_a_valid_swap_transaction() {
    let (client, mock) = client_with(RpcMock::default());

    let tx_id = client.send_transaction_on_chain(TEST_TX).await.unwrap();
    assert_eq!(tx_id, TxId::new(TEST_SIGNATURE));

    let (tx, opts) = mock.sent.lock().await.clone().unwrap();
    assert_eq!(tx.signatures.len(), 1);
    assert_eq!(
        *tx.message.recent_blockhash(),
        Hash::from_str(TEST_BLOCKHASH).unwrap()
    );
    assert_eq!(opts.max_retries, 20);
    assert_eq!(opts.min_context_slot, MOCK_SLOT);
    assert_eq!(opts.preflight_commitment, CommitmentLevel::Processed);
}

#[tokio::test]
async fn honors_a_configured_retry_bound() {
    let mock = Arc::new(RpcMock::default());
    let client = Client::with_rpc_service(
        test_wallet(),
        mock.clone(),
        ClientConfig {
            max_retries: 5,
            ..ClientConfig::default()
        },
    );

    client.send_transaction_on_chain(TEST_TX).await.unwrap();

    let (_, opts) = mock.sent.lock().await.clone().unwrap();
    assert_eq!(opts.max_retries, 5);
}

#[tokio::test]
async fn surfaces_blockhash_fetch_failure() {
    let (client, _) = client_with(RpcMock {
        fail_latest_blockhash: true,
        ..RpcMock::default()
    });

    let err = client.send_transaction_on_chain(TEST_TX).await.unwrap_err();
    assert!(matches!(err, ClientError::BlockhashFetch(_)));
    assert_eq!(
        err.to_string(),
        "could not get latest blockhash: mocked error"
    );
}

#[tokio::test]
async fn surfaces_submit_failure() {
    let (client, _) = client_with(RpcMock {
        fail_send_transaction: true,
        ..RpcMock::default()
    });

    let err = client.send_transaction_on_chain(TEST_TX).await.unwrap_err();
    assert!(matches!(err, ClientError::Submit(_)));
}

#[tokio::test]
async fn rejects_malformed_transaction_payload() {
    let (client, mock) = client_with(RpcMock::default());

    let err = client
        .send_transaction_on_chain("not-base64!!")
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::TransactionBase64(_)));
    assert!(mock.sent.lock().await.is_none());
}

#[tokio::test]
async fn check_signature_rejects_malformed_tx_id() {
    let (client, _) = client_with(RpcMock::default());

    let err = client
        .check_signature(&TxId::new("l//invalid//"))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::InvalidSignature(_)));
}

#[tokio::test]
async fn check_signature_surfaces_status_query_failure() {
    let (client, _) = client_with(RpcMock {
        fail_signature_status: true,
        ..RpcMock::default()
    });

    let err = client
        .check_signature(&TxId::new(TEST_SIGNATURE))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::StatusQuery(_)));
}

#[tokio::test]
async fn check_signature_reports_missing_status_as_unconfirmed() {
    let (client, _) = client_with(RpcMock::default());

    let err = client
        .check_signature(&TxId::from(unknown_signature()))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::StatusUnavailable));
}

#[tokio::test]
async fn check_signature_reports_pending_below_finalized() {
    let (client, _) = client_with(RpcMock::default());

    let err = client
        .check_signature(&TxId::new(PROCESSING_SIGNATURE))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::NotFinalized));
    assert_eq!(err.to_string(), "transaction not finalized yet");
}

#[tokio::test]
async fn check_signature_confirms_finalized_transaction() {
    let (client, _) = client_with(RpcMock::default());

    let result = client
        .check_signature(&TxId::new(TEST_SIGNATURE))
        .await
        .unwrap();
    assert!(result.reached);
    assert!(result.instruction_error.is_none());
}

#[tokio::test]
async fn check_signature_reports_instruction_error_alongside_success() {
    let (client, _) = client_with(RpcMock::default());

    let result = client
        .check_signature(&TxId::from(failed_signature()))
        .await
        .unwrap();
    assert!(result.reached);
    assert_eq!(
        result.instruction_error,
        Some(TransactionError::InstructionError(
            0,
            InstructionError::Custom(6001)
        ))
    );
}

#[tokio::test]
async fn polling_strategy_respects_commitment_ordering() {
    let (client, _) = client_with(RpcMock::default());
    let cancel = CancellationToken::new();

    // Processed status does not satisfy a confirmed target.
    let err = client
        .wait_for_commitment(
            &TxId::new(PROCESSING_SIGNATURE),
            CommitmentStatus::Confirmed,
            cancel.clone(),
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        MonitorError::Client(ClientError::NotFinalized)
    ));

    // Processed status satisfies a processed target.
    let result = client
        .wait_for_commitment(
            &TxId::new(PROCESSING_SIGNATURE),
            CommitmentStatus::Processed,
            cancel.clone(),
        )
        .await
        .unwrap();
    assert!(result.reached);

    // Finalized satisfies everything below it.
    let result = client
        .wait_for_commitment(
            &TxId::new(TEST_SIGNATURE),
            CommitmentStatus::Confirmed,
            cancel,
        )
        .await
        .unwrap();
    assert!(result.reached);
}

#[tokio::test]
async fn balance_query_rejects_invalid_address() {
    let (client, _) = client_with(RpcMock::default());

    let err = client
        .get_token_account_balance("invalid token account address")
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::InvalidTokenAccount(_)));
}

#[tokio::test]
async fn balance_query_surfaces_rpc_failure() {
    let (client, _) = client_with(RpcMock {
        fail_token_balance: true,
        ..RpcMock::default()
    });

    let err = client
        .get_token_account_balance(TOKEN_ACCOUNT)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::BalanceQuery(_)));
}

#[tokio::test]
async fn balance_query_rejects_non_decimal_amount() {
    let (client, _) = client_with(RpcMock {
        bad_token_amount: true,
        ..RpcMock::default()
    });

    let err = client
        .get_token_account_balance(TOKEN_ACCOUNT)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::AmountParse { .. }));
}

#[tokio::test]
async fn balance_query_returns_exact_amount() {
    let (client, _) = client_with(RpcMock::default());

    let balance = client
        .get_token_account_balance(TOKEN_ACCOUNT)
        .await
        .unwrap();
    assert_eq!(balance.amount.to_string(), "1000000000");
    assert_eq!(balance.decimals, 9);
}

#[tokio::test]
async fn close_tears_down_the_transport() {
    let (client, mock) = client_with(RpcMock::default());

    client.close().await.unwrap();
    assert_eq!(mock.closed.load(Ordering::SeqCst), 1);
}
