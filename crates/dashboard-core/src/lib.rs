//! Wallet session and transaction orchestration for the agent dashboard.
//!
//! A [`SessionController`] owns one wallet [`Session`]: it connects a
//! [`WalletAdapter`], keeps the account balance fresh from a
//! [`LedgerClient`](sol_rpc::LedgerClient), and runs deposits into and
//! withdrawals out of the agent vault. Every state change is published on a
//! `tokio::sync::watch` channel for the presentation layer to render.

pub mod amount;
pub mod config;
pub mod controller;
pub mod error;
mod poller;
pub mod session;
pub mod transfer;
pub mod vault;
pub mod wallet;

pub use amount::{format_sol, parse_sol_amount, WithdrawAmount};
pub use config::{DashboardConfig, Destination};
pub use controller::SessionController;
pub use error::{
    AmountError, ConfigError, ConnectError, ErrorKind, SessionError, SignError, TransferFailure,
};
pub use session::{ConnectionStatus, DisplayStatus, Session, TransientError};
pub use transfer::{PendingOperation, TransferKind, TransferReceipt, TransferRequest};
pub use vault::VaultAddressResolver;
pub use wallet::{KeypairWallet, WalletAdapter};
