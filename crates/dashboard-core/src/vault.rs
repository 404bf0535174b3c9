//! Vault program-derived address, derived once per resolver.

use std::sync::OnceLock;

use chain_sol::{derive_vault_address, Address, SolError};

use crate::config::DashboardConfig;

/// Resolves (and remembers) the vault program-derived address.
#[derive(Debug)]
pub struct VaultAddressResolver {
    program_id: Address,
    seed: Vec<u8>,
    resolved: OnceLock<(Address, u8)>,
}

impl VaultAddressResolver {
    pub fn new(program_id: Address, seed: impl Into<Vec<u8>>) -> Self {
        Self {
            program_id,
            seed: seed.into(),
            resolved: OnceLock::new(),
        }
    }

    pub fn from_config(config: &DashboardConfig) -> Self {
        Self::new(config.program_id, config.vault_seed.as_bytes())
    }

    pub fn program_id(&self) -> &Address {
        &self.program_id
    }

    pub fn seed(&self) -> &[u8] {
        &self.seed
    }

    /// The vault address and its bump seed.
    pub fn resolve_with_bump(&self) -> Result<(Address, u8), SolError> {
        if let Some(resolved) = self.resolved.get() {
            return Ok(*resolved);
        }
        let derived = derive_vault_address(&self.program_id, &self.seed)?;
        // a concurrent caller may have won the race; both derived the same value
        Ok(*self.resolved.get_or_init(|| derived))
    }

    pub fn resolve(&self) -> Result<Address, SolError> {
        self.resolve_with_bump().map(|(address, _)| address)
    }
}
