//! Transfer requests handed to the wallet, and their outcomes.

use std::fmt;

use chain_sol::{
    deposit_instruction, system_transfer_instruction, withdraw_instruction, Address, Signature,
    SolError, SolInstruction,
};
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransferKind {
    Deposit,
    Withdraw,
}

impl TransferKind {
    pub fn label(&self) -> &'static str {
        match self {
            TransferKind::Deposit => "Deposit",
            TransferKind::Withdraw => "Withdrawal",
        }
    }
}

impl fmt::Display for TransferKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferKind::Deposit => f.write_str("deposit"),
            TransferKind::Withdraw => f.write_str("withdraw"),
        }
    }
}

/// A single value movement, ready for the wallet to sign.
///
/// `from`/`to` describe where the lamports flow; the fee payer and only
/// signer is always the connected wallet account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    pub from: Address,
    pub to: Address,
    pub amount_lamports: u64,
    pub instruction: SolInstruction,
}

impl TransferRequest {
    /// Vault program `deposit`: `user` -> `vault`.
    pub fn vault_deposit(
        program_id: &Address,
        user: Address,
        vault: Address,
        amount_lamports: u64,
    ) -> Result<Self, SolError> {
        Ok(Self {
            from: user,
            to: vault,
            amount_lamports,
            instruction: deposit_instruction(program_id, &user, &vault, amount_lamports)?,
        })
    }

    /// Vault program `withdraw`: `vault` -> `user`.
    pub fn vault_withdraw(
        program_id: &Address,
        user: Address,
        vault: Address,
        amount_lamports: u64,
    ) -> Result<Self, SolError> {
        Ok(Self {
            from: vault,
            to: user,
            amount_lamports,
            instruction: withdraw_instruction(program_id, &user, &vault, amount_lamports)?,
        })
    }

    /// Plain system transfer to a fixed account.
    pub fn system_transfer(from: Address, to: Address, amount_lamports: u64) -> Result<Self, SolError> {
        if amount_lamports == 0 {
            return Err(SolError::TransactionBuildError(
                "transfer amount must be > 0".into(),
            ));
        }
        Ok(Self {
            from,
            to,
            amount_lamports,
            instruction: system_transfer_instruction(&from, &to, amount_lamports),
        })
    }
}

/// A confirmed transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferReceipt {
    pub kind: TransferKind,
    pub signature: Signature,
    pub amount_lamports: u64,
}

/// The transfer currently in flight, if any.
#[derive(Debug, Clone)]
pub struct PendingOperation {
    pub kind: TransferKind,
    pub request: TransferRequest,
    pub submitted_at: Instant,
}
