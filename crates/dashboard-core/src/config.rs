//! Dashboard configuration, loaded from TOML.
//!
//! ```toml
//! network = "devnet"
//! # rpc_url = "http://127.0.0.1:8899"
//! program_id = "Fg6PaFpoGXkYsidMpWTK6W2BeZ7FEfcYkg476zPFsLnS"
//! vault_seed = "trading_bot"
//! poll_interval_secs = 10
//! commitment = "confirmed"
//! confirm_timeout_secs = 60
//! error_display_secs = 5
//!
//! [destination]
//! kind = "vault"
//! ```

use std::path::Path;
use std::time::Duration;

use chain_sol::pda::MAX_SEED_LEN;
use chain_sol::{Address, DEFAULT_VAULT_PROGRAM_ID, DEFAULT_VAULT_SEED};
use serde::{Deserialize, Serialize};
use sol_rpc::{Commitment, Network};

use crate::error::ConfigError;

/// Where deposits go and withdrawals come from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Destination {
    /// The program-derived vault of `program_id` / `vault_seed`.
    #[default]
    Vault,
    /// A fixed agent account. Deposit-only: the user cannot sign for it.
    Agent { address: Address },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DashboardConfig {
    pub network: Network,
    /// Overrides the network's public endpoint.
    pub rpc_url: Option<String>,
    pub program_id: Address,
    pub vault_seed: String,
    pub destination: Destination,
    pub poll_interval_secs: u64,
    pub commitment: Commitment,
    pub confirm_timeout_secs: u64,
    pub error_display_secs: u64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            network: Network::Devnet,
            rpc_url: None,
            program_id: DEFAULT_VAULT_PROGRAM_ID,
            vault_seed: String::from_utf8_lossy(DEFAULT_VAULT_SEED).into_owned(),
            destination: Destination::Vault,
            poll_interval_secs: 10,
            commitment: Commitment::Confirmed,
            confirm_timeout_secs: 60,
            error_display_secs: 5,
        }
    }
}

impl DashboardConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval_secs == 0 {
            return Err(ConfigError::Invalid("poll_interval_secs must be > 0".into()));
        }
        if self.confirm_timeout_secs == 0 {
            return Err(ConfigError::Invalid("confirm_timeout_secs must be > 0".into()));
        }
        if self.error_display_secs == 0 {
            return Err(ConfigError::Invalid("error_display_secs must be > 0".into()));
        }
        if self.vault_seed.is_empty() || self.vault_seed.len() > MAX_SEED_LEN {
            return Err(ConfigError::Invalid(format!(
                "vault_seed must be 1..={MAX_SEED_LEN} bytes"
            )));
        }
        if let Some(url) = &self.rpc_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::Invalid(format!(
                    "rpc_url must be an http(s) URL, got {url:?}"
                )));
            }
        }
        Ok(())
    }

    /// Effective JSON-RPC endpoint.
    pub fn rpc_url(&self) -> &str {
        self.rpc_url
            .as_deref()
            .unwrap_or_else(|| self.network.rpc_url())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn confirm_timeout(&self) -> Duration {
        Duration::from_secs(self.confirm_timeout_secs)
    }

    pub fn error_display(&self) -> Duration {
        Duration::from_secs(self.error_display_secs)
    }
}
