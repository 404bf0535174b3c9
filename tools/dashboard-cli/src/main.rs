mod args;

use std::sync::Arc;

use anyhow::{Context, Result};
use args::{Args, Command};
use chain_sol::Address;
use clap::Parser;
use dashboard_core::{
    format_sol, DashboardConfig, KeypairWallet, SessionController, SessionError,
};
use sol_rpc::{LedgerClient, RpcLedgerClient};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => DashboardConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => DashboardConfig::default(),
    };
    if let Some(network) = args.network {
        config.network = network;
    }
    if let Some(url) = &args.rpc_url {
        config.rpc_url = Some(url.clone());
    }
    config.validate().context("invalid configuration")?;

    let ledger = Arc::new(
        RpcLedgerClient::new(config.rpc_url())
            .context("building RPC client")?
            .with_commitment(config.commitment),
    );
    let wallet = Arc::new(KeypairWallet::from_file(args.keypair_path()));
    let controller = SessionController::new(&config, wallet, ledger.clone());
    info!(network = %config.network, rpc = %config.rpc_url(), "agent dashboard");
    let reachable = startup_check(&controller).await;

    match args.command {
        Command::Ping => {
            if !reachable {
                anyhow::bail!("{} is unreachable", config.rpc_url());
            }
            println!("{} is reachable", config.rpc_url());
        }
        Command::Vault => {
            let (vault, bump) = controller
                .vault()
                .resolve_with_bump()
                .context("deriving vault address")?;
            let held = ledger
                .get_balance(&vault)
                .await
                .context("fetching vault balance")?;
            println!("program: {}", controller.vault().program_id());
            println!("seed:    {}", String::from_utf8_lossy(controller.vault().seed()));
            println!("vault:   {vault} (bump {bump})");
            println!("balance: {} SOL", format_sol(held));
        }
        Command::Balance => {
            let account = connect(&controller).await?;
            let session = controller.snapshot();
            println!("{account}: {}", session.balance_display());
        }
        Command::Deposit { amount } => {
            connect(&controller).await?;
            let receipt = controller
                .deposit(&amount)
                .await
                .map_err(|e| user_facing(&controller, e))?;
            println!(
                "deposited {} SOL: {}",
                format_sol(receipt.amount_lamports),
                receipt.signature
            );
            println!("balance: {}", controller.snapshot().balance_display());
        }
        Command::Withdraw { amount } => {
            connect(&controller).await?;
            let receipt = controller
                .withdraw(&amount)
                .await
                .map_err(|e| user_facing(&controller, e))?;
            println!(
                "withdrew {} SOL: {}",
                format_sol(receipt.amount_lamports),
                receipt.signature
            );
            println!("balance: {}", controller.snapshot().balance_display());
        }
    }

    controller.disconnect().await?;
    Ok(())
}

/// Ping the ledger once. An unreachable ledger is reported and the
/// command still runs.
async fn startup_check(controller: &SessionController) -> bool {
    match controller.check_connectivity().await {
        Ok(()) => true,
        Err(err) => {
            warn!(error = %err, "ledger connectivity check failed");
            if let Some(shown) = controller.snapshot().error {
                eprintln!("{shown}");
            }
            false
        }
    }
}

async fn connect(controller: &SessionController) -> Result<Address> {
    controller
        .connect()
        .await
        .map_err(|e| user_facing(controller, e))
}

/// Print the message the session surfaced and keep the full error for the
/// exit report.
fn user_facing(controller: &SessionController, err: SessionError) -> anyhow::Error {
    if let Some(shown) = controller.snapshot().error {
        eprintln!("{shown}");
    }
    anyhow::Error::new(err)
}
