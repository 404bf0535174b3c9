//! Instruction encoding for the agent vault program.
//!
//! The vault program is an Anchor program exposing `deposit(amount)` and
//! `withdraw(amount)`. Anchor prefixes instruction data with an 8-byte
//! discriminator, `SHA-256("global:<name>")[..8]`, followed by the Borsh
//! arguments (here a single little-endian `u64`).
//!
//! Both instructions take the same accounts:
//!
//! | # | account        | signer | writable |
//! |---|----------------|--------|----------|
//! | 0 | user           | yes    | yes      |
//! | 1 | vault (PDA)    | no     | yes      |
//! | 2 | system program | no     | no       |

use sha2::{Digest, Sha256};

use crate::address::Address;
use crate::error::SolError;
use crate::pda::find_program_address;
use crate::transaction::{SolAccountMeta, SolInstruction, SYSTEM_PROGRAM_ID};

/// Program ID of the trading-bot vault program deployed on devnet:
/// `Fg6PaFpoGXkYsidMpWTK6W2BeZ7FEfcYkg476zPFsLnS`
pub const DEFAULT_VAULT_PROGRAM_ID: Address = Address::new([
    0xda, 0x07, 0x5c, 0xb2, 0xff, 0x5e, 0xc6, 0x81, 0x76, 0x13, 0xde, 0x53, 0x0b, 0x69,
    0x2a, 0x87, 0x35, 0x47, 0x77, 0x69, 0xda, 0x47, 0x43, 0x0c, 0xbd, 0x81, 0x54, 0x33,
    0x5c, 0x4a, 0x83, 0x27,
]);

/// Seed the vault program uses for its vault PDA.
pub const DEFAULT_VAULT_SEED: &[u8] = b"trading_bot";

/// Compute the Anchor instruction discriminator for `name`.
pub fn instruction_discriminator(name: &str) -> [u8; 8] {
    let hash = Sha256::new()
        .chain_update(b"global:")
        .chain_update(name.as_bytes())
        .finalize();
    let mut disc = [0u8; 8];
    disc.copy_from_slice(&hash[..8]);
    disc
}

/// Derive the vault PDA for `program_id` and `seed`.
pub fn derive_vault_address(program_id: &Address, seed: &[u8]) -> Result<(Address, u8), SolError> {
    find_program_address(&[seed], program_id)
}

/// Build the `deposit(amount)` instruction: `user` pays `lamports` into `vault`.
pub fn deposit_instruction(
    program_id: &Address,
    user: &Address,
    vault: &Address,
    lamports: u64,
) -> Result<SolInstruction, SolError> {
    vault_instruction("deposit", program_id, user, vault, lamports)
}

/// Build the `withdraw(amount)` instruction: `vault` pays `lamports` back to `user`.
pub fn withdraw_instruction(
    program_id: &Address,
    user: &Address,
    vault: &Address,
    lamports: u64,
) -> Result<SolInstruction, SolError> {
    vault_instruction("withdraw", program_id, user, vault, lamports)
}

fn vault_instruction(
    name: &str,
    program_id: &Address,
    user: &Address,
    vault: &Address,
    lamports: u64,
) -> Result<SolInstruction, SolError> {
    if lamports == 0 {
        return Err(SolError::TransactionBuildError(format!(
            "{name} amount must be > 0"
        )));
    }

    let mut data = Vec::with_capacity(16);
    data.extend_from_slice(&instruction_discriminator(name));
    data.extend_from_slice(&lamports.to_le_bytes());

    Ok(SolInstruction {
        program_id: *program_id,
        accounts: vec![
            SolAccountMeta::writable(*user, true),
            SolAccountMeta::writable(*vault, false),
            SolAccountMeta::readonly(SYSTEM_PROGRAM_ID, false),
        ],
        data,
    })
}
