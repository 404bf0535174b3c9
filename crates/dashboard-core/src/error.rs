use std::path::PathBuf;
use std::time::Duration;

use chain_sol::{Signature, SolError};
use sol_rpc::LedgerError;
use thiserror::Error;

use crate::session::ConnectionStatus;

/// User-facing error taxonomy. Every failure that reaches the presentation
/// layer is reduced to one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    WalletNotInstalled,
    WalletNotReady,
    WalletConnectFailed,
    BalanceFetchFailed,
    ValidationFailed,
    SigningRejected,
    SubmissionFailed,
    ConfirmationTimeout,
    NetworkUnreachable,
}

impl ErrorKind {
    /// Fixed message shown to the user. Never carries internal detail.
    pub fn user_message(&self) -> &'static str {
        match self {
            ErrorKind::WalletNotInstalled => {
                "Phantom wallet is not installed. Please install it from https://phantom.app/"
            }
            ErrorKind::WalletNotReady => {
                "Please make sure the Phantom wallet extension is installed and unlocked."
            }
            ErrorKind::WalletConnectFailed => "Failed to connect wallet. Please try again.",
            ErrorKind::BalanceFetchFailed => "Failed to fetch balance. Please try again.",
            ErrorKind::ValidationFailed => "Please enter a valid amount greater than zero.",
            ErrorKind::SigningRejected => "The transaction was rejected in the wallet.",
            ErrorKind::SubmissionFailed => {
                "The transaction could not be completed. Please try again."
            }
            ErrorKind::ConfirmationTimeout => {
                "The transaction was not confirmed in time. Check its status in a block explorer before retrying."
            }
            ErrorKind::NetworkUnreachable => {
                "Failed to connect to Solana network. Please try again later."
            }
        }
    }
}

/// Errors returned by [`SessionController`](crate::controller::SessionController)
/// operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("wallet is not connected")]
    NotConnected,

    #[error("operation not allowed while {0}")]
    InvalidState(ConnectionStatus),

    #[error("another deposit or withdrawal is already in progress")]
    OperationInProgress,

    #[error("wallet is not installed")]
    WalletNotInstalled,

    #[error("wallet is not ready: {0}")]
    WalletNotReady(String),

    #[error("wallet connection failed: {0}")]
    WalletConnectFailed(String),

    #[error("balance fetch failed: {0}")]
    BalanceFetchFailed(#[source] LedgerError),

    #[error("ledger unreachable: {0}")]
    NetworkUnreachable(#[source] LedgerError),

    #[error("deposit failed: {0}")]
    DepositFailed(#[source] TransferFailure),

    #[error("withdraw failed: {0}")]
    WithdrawFailed(#[source] TransferFailure),
}

impl SessionError {
    /// Taxonomy kind, or `None` for state-precondition errors that are
    /// returned to the caller but never surfaced.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            SessionError::NotConnected
            | SessionError::InvalidState(_)
            | SessionError::OperationInProgress => None,
            SessionError::WalletNotInstalled => Some(ErrorKind::WalletNotInstalled),
            SessionError::WalletNotReady(_) => Some(ErrorKind::WalletNotReady),
            SessionError::WalletConnectFailed(_) => Some(ErrorKind::WalletConnectFailed),
            SessionError::BalanceFetchFailed(_) => Some(ErrorKind::BalanceFetchFailed),
            SessionError::NetworkUnreachable(_) => Some(ErrorKind::NetworkUnreachable),
            SessionError::DepositFailed(cause) | SessionError::WithdrawFailed(cause) => {
                Some(cause.kind())
            }
        }
    }
}

/// Why a deposit or withdrawal did not complete.
#[derive(Debug, Error)]
pub enum TransferFailure {
    #[error("invalid amount: {0}")]
    InvalidAmount(#[from] AmountError),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("vault balance lookup failed: {0}")]
    VaultBalance(#[source] LedgerError),

    #[error("signing rejected in the wallet")]
    SigningRejected,

    #[error("signing failed: {0}")]
    SigningFailed(String),

    #[error("submission failed: {0}")]
    Submission(#[source] LedgerError),

    #[error("transaction {signature} failed: {source}")]
    Rejected {
        signature: Signature,
        #[source]
        source: LedgerError,
    },

    #[error("transaction {signature} not confirmed within {waited:?}")]
    ConfirmationTimeout {
        signature: Signature,
        waited: Duration,
    },
}

impl TransferFailure {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TransferFailure::InvalidAmount(_) | TransferFailure::InvalidRequest(_) => {
                ErrorKind::ValidationFailed
            }
            TransferFailure::VaultBalance(_) => ErrorKind::BalanceFetchFailed,
            TransferFailure::SigningRejected => ErrorKind::SigningRejected,
            TransferFailure::SigningFailed(_)
            | TransferFailure::Submission(_)
            | TransferFailure::Rejected { .. } => ErrorKind::SubmissionFailed,
            TransferFailure::ConfirmationTimeout { .. } => ErrorKind::ConfirmationTimeout,
        }
    }
}

impl From<SolError> for TransferFailure {
    fn from(e: SolError) -> Self {
        TransferFailure::InvalidRequest(e.to_string())
    }
}

impl From<SignError> for TransferFailure {
    fn from(e: SignError) -> Self {
        match e {
            SignError::UserRejected => TransferFailure::SigningRejected,
            SignError::SigningFailed(reason) => TransferFailure::SigningFailed(reason),
            SignError::Submission(source) => TransferFailure::Submission(source),
        }
    }
}

/// Amount validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("amount is empty")]
    Empty,

    #[error("amount is not a number: {0:?}")]
    NotANumber(String),

    #[error("amount must be finite")]
    NotFinite,

    #[error("amount must not be negative")]
    Negative,

    #[error("amount must be greater than zero")]
    Zero,

    #[error("amount has more than 9 decimal places")]
    TooPrecise,

    #[error("amount is too large")]
    Overflow,
}

/// Wallet connection failures reported by a [`WalletAdapter`](crate::wallet::WalletAdapter).
#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("wallet not ready: {0}")]
    NotReady(String),

    #[error("connection rejected: {0}")]
    Rejected(String),
}

/// Signing / submission failures reported by a wallet.
#[derive(Debug, Error)]
pub enum SignError {
    #[error("user rejected the request")]
    UserRejected,

    #[error("signing failed: {0}")]
    SigningFailed(String),

    #[error("submission failed: {0}")]
    Submission(#[from] LedgerError),
}

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config syntax: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}
