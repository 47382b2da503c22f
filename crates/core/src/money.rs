//! Fixed-point monetary amounts.
//!
//! Amounts are stored as signed cents (`i64`), giving exactly two fractional
//! digits. Float arithmetic never touches a balance.

use core::str::FromStr;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::LedgerError;

/// A signed amount with two fractional digits, stored in cents.
///
/// Positive = credit, negative = debit. Serializes as a decimal string
/// (`"40.00"`) to match the persisted `decimal(10,2)` wire form.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub const fn cents(&self) -> i64 {
        self.0
    }

    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Flip the sign (credit <-> debit).
    pub const fn negated(&self) -> Self {
        Self(-self.0)
    }

    /// Checked addition; `None` on overflow.
    pub fn checked_add(&self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    /// Parse a decimal string with at most two fractional digits.
    ///
    /// Accepts `"7"`, `"-12.5"`, `"40.00"`. Rejects empty input, more than two
    /// fractional digits, and values that overflow the cents range.
    pub fn parse(input: &str) -> Result<Self, LedgerError> {
        let trimmed = input.trim();
        let (negative, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };

        let (whole, frac) = match digits.split_once('.') {
            Some((w, f)) => (w, f),
            None => (digits, ""),
        };

        if whole.is_empty() && frac.is_empty() {
            return Err(LedgerError::invalid_amount(format!("'{input}' is not a number")));
        }
        if frac.len() > 2 {
            return Err(LedgerError::invalid_amount(format!(
                "'{input}' has more than 2 decimal places"
            )));
        }
        if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit()) {
            return Err(LedgerError::invalid_amount(format!("'{input}' is not a number")));
        }

        let whole_part: i64 = if whole.is_empty() {
            0
        } else {
            whole
                .parse()
                .map_err(|_| LedgerError::invalid_amount(format!("'{input}' is out of range")))?
        };

        let frac_part: i64 = match frac.len() {
            0 => 0,
            1 => frac.parse::<i64>().map_err(|_| LedgerError::invalid_amount(input))? * 10,
            _ => frac.parse::<i64>().map_err(|_| LedgerError::invalid_amount(input))?,
        };

        let cents = whole_part
            .checked_mul(100)
            .and_then(|c| c.checked_add(frac_part))
            .ok_or_else(|| LedgerError::invalid_amount(format!("'{input}' is out of range")))?;

        Ok(Self(if negative { -cents } else { cents }))
    }
}

impl core::fmt::Display for Money {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl FromStr for Money {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Money::parse(&s).map_err(serde::de::Error::custom)
    }
}
