//! Wallet: keypair custody and message signing.
//!
//! The keypair never leaves this module except as a produced signature.
//! It is held behind an `Arc` and read-only during signing, so one
//! wallet is safe for concurrent use by multiple in-flight broadcasts.

use std::sync::Arc;

use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Keypair;
use solana_sdk::signer::Signer;
use solana_sdk::transaction::VersionedTransaction;

use crate::error::ClientError;
use crate::transaction::message_bytes;

/// Single-signer wallet wrapping a Solana keypair.
#[derive(Clone)]
pub struct Wallet {
    keypair: Arc<Keypair>,
}

impl Wallet {
    /// Creates a wallet from a base58-encoded private key.
    pub fn from_private_key_base58(private_key: &str) -> Result<Self, ClientError> {
        let bytes = bs58::decode(private_key)
            .into_vec()
            .map_err(|e| ClientError::InvalidPrivateKey(e.to_string()))?;

        let keypair = Keypair::try_from(bytes.as_slice())
            .map_err(|e| ClientError::InvalidPrivateKey(e.to_string()))?;

        Ok(Self::from_keypair(keypair))
    }

    /// Creates a wallet from an existing keypair.
    pub fn from_keypair(keypair: Keypair) -> Self {
        Self {
            keypair: Arc::new(keypair),
        }
    }

    /// The wallet's public key.
    pub fn pubkey(&self) -> Pubkey {
        self.keypair.pubkey()
    }

    /// Signs a transaction with the wallet's private key.
    ///
    /// The signature is computed over the serialized message bytes only
    /// (never over existing signature slots) and installed as the
    /// transaction's sole signature. Multi-signer transactions are out
    /// of scope.
    pub fn sign_transaction(
        &self,
        mut tx: VersionedTransaction,
    ) -> Result<VersionedTransaction, ClientError> {
        let tx_message_bytes = message_bytes(&tx.message)?;

        let signature = self
            .keypair
            .try_sign_message(&tx_message_bytes)
            .map_err(|e| ClientError::Signing(e.to_string()))?;

        tx.signatures = vec![signature];

        Ok(tx)
    }
}

impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet")
            .field("pubkey", &self.pubkey())
            .finish_non_exhaustive()
    }
}
