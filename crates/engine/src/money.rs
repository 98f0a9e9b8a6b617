use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Signed Rupiah amount.
///
/// Rupiah has no subunit in this domain, so the value is a plain integer
/// number of Rupiah. Balances and deltas are signed:
/// - positive = money flowing into a wallet
/// - negative = money flowing out of a wallet
///
/// # Examples
///
/// ```rust
/// use engine::Rupiah;
///
/// let amount = Rupiah::new(1_250_000);
/// assert_eq!(amount.to_string(), "Rp 1.250.000");
/// assert_eq!("Rp 10.000".parse::<Rupiah>().unwrap().value(), 10_000);
/// assert!("10,5".parse::<Rupiah>().is_err());
/// ```
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Rupiah(i64);

impl Rupiah {
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }
}

impl fmt::Display for Rupiah {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let digits = self.0.unsigned_abs().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (idx, ch) in digits.chars().enumerate() {
            if idx > 0 && (digits.len() - idx) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(ch);
        }
        write!(f, "{sign}Rp {grouped}")
    }
}

impl FromStr for Rupiah {
    type Err = EngineError;

    /// Parses user input into Rupiah.
    ///
    /// Accepts an optional `Rp` prefix, an optional leading `+`/`-` and `.`
    /// as thousands separator. Fractions (`,` decimals) are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let empty = || EngineError::InvalidAmount("empty amount".to_string());
        let invalid = || EngineError::InvalidAmount("invalid amount".to_string());

        let trimmed = s.trim();
        let (sign, rest) = if let Some(stripped) = trimmed.strip_prefix('-') {
            (-1i64, stripped)
        } else if let Some(stripped) = trimmed.strip_prefix('+') {
            (1i64, stripped)
        } else {
            (1i64, trimmed)
        };

        let rest = rest.trim();
        let rest = rest
            .strip_prefix("Rp")
            .or_else(|| rest.strip_prefix("rp"))
            .or_else(|| rest.strip_prefix("RP"))
            .unwrap_or(rest)
            .trim();
        if rest.is_empty() {
            return Err(empty());
        }

        if rest.contains(',') {
            return Err(EngineError::InvalidAmount(
                "rupiah amounts have no decimals".to_string(),
            ));
        }

        let digits: String = rest.chars().filter(|c| *c != '.').collect();
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }

        let value: i64 = digits
            .parse()
            .map_err(|_| EngineError::InvalidAmount("amount too large".to_string()))?;

        Ok(Rupiah(sign * value))
    }
}
