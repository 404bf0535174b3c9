use chain_sol::{Signature, SolError};
use thiserror::Error;

/// Ledger client errors. Every variant is recoverable: callers report it and
/// carry on.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("http transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("malformed rpc response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("rpc response to {0} carried no result")]
    MissingResult(String),

    #[error("invalid data from ledger: {0}")]
    InvalidData(#[from] SolError),

    #[error("transaction {signature} failed: {reason}")]
    TransactionFailed { signature: Signature, reason: String },
}
