//! Ed25519 keypairs in the Solana CLI layout.
//!
//! A Solana keypair is 64 bytes: the 32-byte Ed25519 secret seed followed by
//! the 32-byte public key. The public half is checked against the one
//! recomputed from the seed so a corrupted file is rejected up front.

use ed25519_dalek::SigningKey;
use zeroize::Zeroize;

use crate::address::Address;
use crate::error::SolError;

/// Length of a serialized keypair.
pub const KEYPAIR_LEN: usize = 64;

/// Parse a 64-byte keypair into a signing key.
pub fn signing_key_from_keypair_bytes(bytes: &[u8]) -> Result<SigningKey, SolError> {
    if bytes.len() != KEYPAIR_LEN {
        return Err(SolError::InvalidKeypair(format!(
            "expected {KEYPAIR_LEN} bytes, got {}",
            bytes.len()
        )));
    }

    let mut seed = [0u8; 32];
    seed.copy_from_slice(&bytes[..32]);
    let signing_key = SigningKey::from_bytes(&seed);
    seed.zeroize();

    if signing_key.verifying_key().as_bytes() != &bytes[32..] {
        return Err(SolError::InvalidKeypair(
            "public key does not match secret key".into(),
        ));
    }

    Ok(signing_key)
}

/// Address (public key) of a signing key.
pub fn signer_address(signing_key: &SigningKey) -> Address {
    Address::new(signing_key.verifying_key().to_bytes())
}
