//! The ledger contract the session core depends on.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chain_sol::{Address, Signature};
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

/// How final a transaction must be before it counts as confirmed.
///
/// Variants are ordered from weakest to strongest, so `a >= b` means "`a`
/// satisfies a request for `b`".
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Commitment {
    Processed,
    #[default]
    Confirmed,
    Finalized,
}

impl Commitment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Commitment::Processed => "processed",
            Commitment::Confirmed => "confirmed",
            Commitment::Finalized => "finalized",
        }
    }
}

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Remote ledger operations.
///
/// Implementations must be cheap to share: the session polls balances from a
/// background task while transfers run on the caller's task.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Balance of `address` in lamports.
    async fn get_balance(&self, address: &Address) -> Result<u64, LedgerError>;

    /// A recent blockhash to anchor a new transaction.
    async fn latest_blockhash(&self) -> Result<[u8; 32], LedgerError>;

    /// Submit a signed wire-format transaction.
    async fn submit(&self, signed_transaction: &[u8]) -> Result<Signature, LedgerError>;

    /// Wait until `signature` reaches `commitment`, or fails on chain.
    ///
    /// This may wait indefinitely; callers bound it with a timeout.
    async fn confirm(&self, signature: &Signature, commitment: Commitment)
        -> Result<(), LedgerError>;

    /// Check that the endpoint is reachable.
    async fn ping(&self) -> Result<(), LedgerError>;
}

#[async_trait]
impl<T: LedgerClient + ?Sized> LedgerClient for Arc<T> {
    async fn get_balance(&self, address: &Address) -> Result<u64, LedgerError> {
        (**self).get_balance(address).await
    }

    async fn latest_blockhash(&self) -> Result<[u8; 32], LedgerError> {
        (**self).latest_blockhash().await
    }

    async fn submit(&self, signed_transaction: &[u8]) -> Result<Signature, LedgerError> {
        (**self).submit(signed_transaction).await
    }

    async fn confirm(
        &self,
        signature: &Signature,
        commitment: Commitment,
    ) -> Result<(), LedgerError> {
        (**self).confirm(signature, commitment).await
    }

    async fn ping(&self) -> Result<(), LedgerError> {
        (**self).ping().await
    }
}
