//! Transaction signatures.
//!
//! The first signature of a transaction doubles as its identifier on the
//! ledger, so [`Signature`] is also the handle used to track confirmation.

use std::fmt;
use std::str::FromStr;

use crate::error::SolError;

/// A 64-byte Ed25519 transaction signature.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature([u8; 64]);

impl Signature {
    pub const LEN: usize = 64;

    pub const fn new(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    pub const fn to_bytes(&self) -> [u8; 64] {
        self.0
    }

    /// Read the first signature slot of a signed wire-format transaction.
    pub fn from_wire_transaction(wire: &[u8]) -> Result<Self, SolError> {
        let (count, prefix) = crate::transaction::decode_compact_u16(wire)?;
        if count == 0 {
            return Err(SolError::InvalidSignature(
                "transaction has zero signatures".into(),
            ));
        }
        let slot = wire.get(prefix..prefix + Self::LEN).ok_or_else(|| {
            SolError::InvalidSignature("transaction too short for signature slot".into())
        })?;
        let mut bytes = [0u8; 64];
        bytes.copy_from_slice(slot);
        Ok(Self(bytes))
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(self.0).into_string())
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({self})")
    }
}

impl FromStr for Signature {
    type Err = SolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|e| SolError::InvalidSignature(format!("base58 decode failed: {e}")))?;
        let arr: [u8; 64] = bytes.try_into().map_err(|v: Vec<u8>| {
            SolError::InvalidSignature(format!("expected 64 bytes, got {}", v.len()))
        })?;
        Ok(Self(arr))
    }
}
