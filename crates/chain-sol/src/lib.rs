//! Solana ledger primitives for the agent dashboard.
//!
//! This crate handles addresses, signatures, program-derived addresses, the
//! compact transaction wire format and the vault program's instruction
//! encoding, without pulling in `solana-sdk` and its 200+ transitive
//! dependencies. Nothing here performs I/O.
//!
//! Signing uses `ed25519-dalek`, PDA curve checks use `curve25519-dalek`,
//! and Base58 goes through `bs58`.

pub mod address;
pub mod error;
pub mod keypair;
pub mod pda;
pub mod signature;
pub mod transaction;
pub mod vault_program;

pub use address::Address;
pub use error::SolError;
pub use keypair::{signer_address, signing_key_from_keypair_bytes};
pub use pda::{find_program_address, is_on_curve};
pub use signature::Signature;
pub use transaction::{
    compile_transaction, serialize_message, sign_transaction,
    system_transfer_instruction, SolAccountMeta, SolInstruction, SolTransaction,
    SYSTEM_PROGRAM_ID,
};
pub use vault_program::{
    deposit_instruction, derive_vault_address, withdraw_instruction, DEFAULT_VAULT_PROGRAM_ID,
    DEFAULT_VAULT_SEED,
};

/// Lamports per SOL (10^9).
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;
