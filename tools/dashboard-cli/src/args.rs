use std::path::PathBuf;

use clap::{Parser, Subcommand};
use sol_rpc::Network;

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless host for the agent dashboard wallet session")]
pub struct Args {
    /// TOML config file; built-in defaults are used when omitted.
    #[arg(long, env = "DASHBOARD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Overrides the configured network.
    #[arg(long, env = "DASHBOARD_NETWORK")]
    pub network: Option<Network>,

    /// Overrides the network's JSON-RPC endpoint.
    #[arg(long, env = "RPC_URL")]
    pub rpc_url: Option<String>,

    /// Solana CLI keypair file. Defaults to ~/.config/solana/id.json.
    #[arg(long, env = "DASHBOARD_KEYPAIR")]
    pub keypair: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check that the ledger endpoint answers.
    Ping,
    /// Show the vault address derived from the configured program and seed.
    Vault,
    /// Connect the wallet and print its balance.
    Balance,
    /// Deposit SOL into the vault (or agent account).
    Deposit {
        /// Amount in SOL, e.g. 0.25
        amount: String,
    },
    /// Withdraw SOL from the vault.
    Withdraw {
        /// Amount in SOL, or `all`
        amount: String,
    },
}

impl Args {
    pub fn keypair_path(&self) -> PathBuf {
        if let Some(path) = &self.keypair {
            return path.clone();
        }
        let home = std::env::var_os("HOME").map(PathBuf::from).unwrap_or_default();
        home.join(".config").join("solana").join("id.json")
    }
}
