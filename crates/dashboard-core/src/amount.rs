//! SOL amount parsing and display.
//!
//! User input is parsed as an exact decimal string rather than through `f64`,
//! so `"0.1"` is exactly 100_000_000 lamports.

use std::fmt;
use std::str::FromStr;

use chain_sol::LAMPORTS_PER_SOL;

use crate::error::AmountError;

/// Number of fractional digits in one SOL (1 SOL = 10^9 lamports).
pub const SOL_DECIMALS: usize = 9;

/// Parse a user-entered decimal SOL amount into lamports.
///
/// Accepts `123`, `1.5`, `.25`, `2.` with at most 9 fractional digits
/// (trailing zeros beyond that are ignored). Rejects empty input, signs,
/// exponents, `NaN`/`inf`, zero and values that do not fit in a `u64`.
pub fn parse_sol_amount(input: &str) -> Result<u64, AmountError> {
    let s = input.trim();
    if s.is_empty() {
        return Err(AmountError::Empty);
    }

    let lower = s.to_ascii_lowercase();
    let unsigned = lower.trim_start_matches(['+', '-']);
    if matches!(unsigned, "nan" | "inf" | "infinity") {
        return Err(AmountError::NotFinite);
    }
    if let Some(rest) = s.strip_prefix('-') {
        // "-0" is still zero, anything else negative is rejected as such
        return match parse_sol_amount(rest) {
            Err(AmountError::Zero) => Err(AmountError::Zero),
            Ok(_) => Err(AmountError::Negative),
            Err(e) => Err(e),
        };
    }

    let (whole, frac) = match s.split_once('.') {
        Some((w, f)) => (w, f),
        None => (s, ""),
    };
    let is_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if (whole.is_empty() && frac.is_empty()) || !is_digits(whole) || !is_digits(frac) {
        return Err(AmountError::NotANumber(s.to_string()));
    }

    let frac = frac.trim_end_matches('0');
    if frac.len() > SOL_DECIMALS {
        return Err(AmountError::TooPrecise);
    }

    let whole_lamports = if whole.is_empty() {
        0
    } else {
        whole
            .parse::<u64>()
            .map_err(|_| AmountError::Overflow)?
            .checked_mul(LAMPORTS_PER_SOL)
            .ok_or(AmountError::Overflow)?
    };
    let frac_lamports = if frac.is_empty() {
        0
    } else {
        // right-pad to 9 digits: "25" -> 250_000_000
        format!("{frac:0<SOL_DECIMALS$}")
            .parse::<u64>()
            .map_err(|_| AmountError::NotANumber(s.to_string()))?
    };

    let lamports = whole_lamports
        .checked_add(frac_lamports)
        .ok_or(AmountError::Overflow)?;
    if lamports == 0 {
        return Err(AmountError::Zero);
    }
    Ok(lamports)
}

/// Format lamports as SOL with up to 9 fractional digits, trailing zeros
/// removed: `7_500_000_000` -> `"7.5"`, `1` -> `"0.000000001"`.
pub fn format_sol(lamports: u64) -> String {
    let whole = lamports / LAMPORTS_PER_SOL;
    let frac = lamports % LAMPORTS_PER_SOL;
    if frac == 0 {
        return format!("{whole}.0");
    }
    let frac = format!("{frac:0>SOL_DECIMALS$}");
    format!("{whole}.{}", frac.trim_end_matches('0'))
}

/// Requested withdrawal size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WithdrawAmount {
    /// Everything currently held by the vault.
    All,
    Lamports(u64),
}

impl FromStr for WithdrawAmount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(WithdrawAmount::All)
        } else {
            parse_sol_amount(s).map(WithdrawAmount::Lamports)
        }
    }
}

impl fmt::Display for WithdrawAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WithdrawAmount::All => f.write_str("all"),
            WithdrawAmount::Lamports(l) => write!(f, "{} SOL", format_sol(*l)),
        }
    }
}
