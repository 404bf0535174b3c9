//! Wallet adapters.
//!
//! The adapter owns key material; the session only ever sees addresses and
//! signatures.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chain_sol::{
    compile_transaction, sign_transaction, signer_address, signing_key_from_keypair_bytes,
    Address, Signature,
};
use ed25519_dalek::SigningKey;
use sol_rpc::LedgerClient;
use tokio::sync::Mutex;
use tracing::{debug, info};
use zeroize::Zeroizing;

use crate::error::{ConnectError, SignError};
use crate::transfer::TransferRequest;

#[async_trait]
pub trait WalletAdapter: Send + Sync {
    /// Whether a wallet is present at all. `false` means "not installed".
    fn is_available(&self) -> bool;

    /// Ask the wallet for access to its account.
    async fn request_connection(&self) -> Result<Address, ConnectError>;

    /// Sign `request` as the fee payer and submit it through `ledger`.
    async fn sign_and_submit(
        &self,
        request: &TransferRequest,
        ledger: &dyn LedgerClient,
    ) -> Result<Signature, SignError>;

    async fn disconnect(&self);
}

#[async_trait]
impl<T: WalletAdapter + ?Sized> WalletAdapter for Arc<T> {
    fn is_available(&self) -> bool {
        (**self).is_available()
    }

    async fn request_connection(&self) -> Result<Address, ConnectError> {
        (**self).request_connection().await
    }

    async fn sign_and_submit(
        &self,
        request: &TransferRequest,
        ledger: &dyn LedgerClient,
    ) -> Result<Signature, SignError> {
        (**self).sign_and_submit(request, ledger).await
    }

    async fn disconnect(&self) {
        (**self).disconnect().await
    }
}

// ─── Keypair wallet ──────────────────────────────────────────────────

enum KeySource {
    /// Solana CLI keypair file: a JSON array of 64 bytes.
    File(PathBuf),
    Memory(SigningKey),
}

/// Headless wallet backed by a local Ed25519 keypair.
pub struct KeypairWallet {
    source: KeySource,
    active: Mutex<Option<SigningKey>>,
}

impl KeypairWallet {
    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        Self {
            source: KeySource::File(path.into()),
            active: Mutex::new(None),
        }
    }

    pub fn from_signing_key(signing_key: SigningKey) -> Self {
        Self {
            source: KeySource::Memory(signing_key),
            active: Mutex::new(None),
        }
    }

    fn load(&self) -> Result<SigningKey, ConnectError> {
        match &self.source {
            KeySource::Memory(key) => Ok(key.clone()),
            KeySource::File(path) => read_keypair_file(path),
        }
    }
}

fn read_keypair_file(path: &Path) -> Result<SigningKey, ConnectError> {
    let raw = Zeroizing::new(std::fs::read_to_string(path).map_err(|e| {
        ConnectError::NotReady(format!("cannot read keypair {}: {e}", path.display()))
    })?);
    let bytes: Zeroizing<Vec<u8>> = Zeroizing::new(serde_json::from_str(&raw).map_err(|e| {
        ConnectError::NotReady(format!("malformed keypair {}: {e}", path.display()))
    })?);
    signing_key_from_keypair_bytes(&bytes)
        .map_err(|e| ConnectError::NotReady(format!("invalid keypair {}: {e}", path.display())))
}

#[async_trait]
impl WalletAdapter for KeypairWallet {
    fn is_available(&self) -> bool {
        match &self.source {
            KeySource::File(path) => path.is_file(),
            KeySource::Memory(_) => true,
        }
    }

    async fn request_connection(&self) -> Result<Address, ConnectError> {
        let mut active = self.active.lock().await;
        if let Some(key) = active.as_ref() {
            return Ok(signer_address(key));
        }
        let key = self.load()?;
        let address = signer_address(&key);
        *active = Some(key);
        info!(%address, "keypair wallet unlocked");
        Ok(address)
    }

    async fn sign_and_submit(
        &self,
        request: &TransferRequest,
        ledger: &dyn LedgerClient,
    ) -> Result<Signature, SignError> {
        let blockhash = ledger.latest_blockhash().await?;

        let (wire, local_signature) = {
            let active = self.active.lock().await;
            let key = active
                .as_ref()
                .ok_or_else(|| SignError::SigningFailed("wallet is not connected".into()))?;
            let payer = signer_address(key);
            let tx = compile_transaction(std::slice::from_ref(&request.instruction), &payer, &blockhash)
                .map_err(|e| SignError::SigningFailed(e.to_string()))?;
            sign_transaction(&tx, key).map_err(|e| SignError::SigningFailed(e.to_string()))?
        };
        debug!(
            signature = %local_signature,
            bytes = wire.len(),
            data = %hex::encode(&request.instruction.data),
            "transaction signed"
        );

        let signature = ledger.submit(&wire).await?;
        if signature != local_signature {
            debug!(%signature, %local_signature, "ledger returned a different signature");
        }
        Ok(signature)
    }

    async fn disconnect(&self) {
        // SigningKey zeroizes on drop
        self.active.lock().await.take();
    }
}
