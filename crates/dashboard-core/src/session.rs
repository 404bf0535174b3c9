//! The observable wallet session.

use std::fmt;

use chain_sol::Address;

use crate::amount::format_sol;
use crate::error::ErrorKind;
use crate::transfer::{PendingOperation, TransferKind};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ConnectionStatus::Disconnected => "disconnected",
            ConnectionStatus::Connecting => "connecting",
            ConnectionStatus::Connected => "connected",
        })
    }
}

/// Status as shown to the user: the connection status, or `Error` while a
/// transient error is displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisplayStatus {
    Disconnected,
    Connecting,
    Connected,
    Error,
}

/// A user-facing error annotation. It expires on its own and never changes
/// the connection status underneath.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransientError {
    pub kind: ErrorKind,
    pub operation: Option<TransferKind>,
    pub message: String,
    pub(crate) generation: u64,
}

impl TransientError {
    pub(crate) fn new(kind: ErrorKind, operation: Option<TransferKind>, generation: u64) -> Self {
        let message = match operation {
            Some(op) => format!("{} failed. {}", op.label(), kind.user_message()),
            None => kind.user_message().to_string(),
        };
        Self {
            kind,
            operation,
            message,
            generation,
        }
    }
}

impl fmt::Display for TransientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Snapshot of one wallet session.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub status: ConnectionStatus,
    /// Set iff `status == Connected`.
    pub account: Option<Address>,
    /// Last balance reported by the ledger.
    pub balance_lamports: u64,
    pub error: Option<TransientError>,
    pub pending: Option<PendingOperation>,
}

impl Session {
    pub fn display_status(&self) -> DisplayStatus {
        if self.error.is_some() {
            return DisplayStatus::Error;
        }
        match self.status {
            ConnectionStatus::Disconnected => DisplayStatus::Disconnected,
            ConnectionStatus::Connecting => DisplayStatus::Connecting,
            ConnectionStatus::Connected => DisplayStatus::Connected,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.status == ConnectionStatus::Connected
    }

    pub fn balance_display(&self) -> String {
        format!("{} SOL", format_sol(self.balance_lamports))
    }
}
