//! Ledger access for the agent dashboard.
//!
//! [`LedgerClient`] is the narrow contract the session core talks to:
//! balances, blockhashes, submission, confirmation and a reachability check.
//! [`RpcLedgerClient`] implements it against a Solana JSON-RPC endpoint.

pub mod client;
pub mod error;
pub mod network;
pub mod rpc;

pub use client::{Commitment, LedgerClient};
pub use error::LedgerError;
pub use network::Network;
pub use rpc::RpcLedgerClient;
