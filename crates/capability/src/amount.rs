//! Fixed-point coin amounts.
//!
//! Amounts are raw integer units plus a decimal precision, never floats.
//! Comparison is scale-aware: `1.50` at 2 decimals equals `1.5000` at 4.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Highest precision a coin may declare.
pub const MAX_DECIMALS: u8 = 18;

/// A non-negative fixed-point amount: `raw` units at `decimals` precision.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Amount {
    raw: u128,
    decimals: u8,
}

impl Amount {
    /// Create an amount from raw units.
    pub fn new(raw: u128, decimals: u8) -> Result<Self> {
        if decimals > MAX_DECIMALS {
            return Err(Error::InvalidAmount(format!(
                "precision {decimals} exceeds maximum {MAX_DECIMALS}"
            )));
        }
        Ok(Self { raw, decimals })
    }

    pub fn zero(decimals: u8) -> Self {
        Self { raw: 0, decimals }
    }

    /// Parse a decimal string (`"12.34"`) at the given precision.
    pub fn parse(text: &str, decimals: u8) -> Result<Self> {
        if decimals > MAX_DECIMALS {
            return Err(Error::InvalidAmount(format!(
                "precision {decimals} exceeds maximum {MAX_DECIMALS}"
            )));
        }
        let invalid = || Error::InvalidAmount(text.to_string());

        let (int_part, frac_part) = match text.split_once('.') {
            Some((i, f)) => (i, f),
            None => (text, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid());
        }
        if frac_part.len() > decimals as usize {
            return Err(Error::InvalidAmount(format!(
                "{text} has more than {decimals} decimal places"
            )));
        }

        let int: u128 = if int_part.is_empty() {
            0
        } else {
            int_part.parse().map_err(|_| invalid())?
        };
        let frac: u128 = if frac_part.is_empty() {
            0
        } else {
            frac_part.parse().map_err(|_| invalid())?
        };
        let frac = frac * pow10(decimals - frac_part.len() as u8);

        let raw = int
            .checked_mul(pow10(decimals))
            .and_then(|v| v.checked_add(frac))
            .ok_or_else(|| Error::InvalidAmount(format!("{text} overflows")))?;

        Ok(Self { raw, decimals })
    }

    pub fn raw(&self) -> u128 {
        self.raw
    }

    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    pub fn is_zero(&self) -> bool {
        self.raw == 0
    }

    /// Integer and fractional parts, the fraction rescaled to `decimals`
    /// places. The fraction is below `10^MAX_DECIMALS`, so rescaling within
    /// `MAX_DECIMALS` never overflows.
    fn parts(&self, decimals: u8) -> (u128, u128) {
        let scale = pow10(self.decimals);
        let int = self.raw / scale;
        let frac = self.raw % scale;
        (int, frac * pow10(decimals - self.decimals))
    }
}

fn pow10(n: u8) -> u128 {
    10u128.pow(u32::from(n))
}

impl PartialEq for Amount {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Amount {}

impl Ord for Amount {
    fn cmp(&self, other: &Self) -> Ordering {
        let decimals = self.decimals.max(other.decimals);
        self.parts(decimals).cmp(&other.parts(decimals))
    }
}

impl PartialOrd for Amount {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scale = pow10(self.decimals);
        let int = self.raw / scale;
        let frac = self.raw % scale;
        if self.decimals == 0 {
            write!(f, "{int}")
        } else {
            write!(f, "{int}.{frac:0width$}", width = self.decimals as usize)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_whole_and_fractional() {
        assert_eq!(Amount::parse("12", 2).unwrap().raw(), 1200);
        assert_eq!(Amount::parse("12.3", 2).unwrap().raw(), 1230);
        assert_eq!(Amount::parse(".5", 2).unwrap().raw(), 50);
        assert_eq!(Amount::parse("0", 0).unwrap().raw(), 0);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(Amount::parse("", 2).is_err());
        assert!(Amount::parse(".", 2).is_err());
        assert!(Amount::parse("1.2.3", 2).is_err());
        assert!(Amount::parse("-1", 2).is_err());
        assert!(Amount::parse("abc", 2).is_err());
    }

    #[test]
    fn parse_rejects_excess_precision() {
        assert!(Amount::parse("1.234", 2).is_err());
        assert!(Amount::new(1, MAX_DECIMALS + 1).is_err());
    }

    #[test]
    fn compares_across_scales() {
        let a = Amount::parse("1.50", 2).unwrap();
        let b = Amount::parse("1.5000", 4).unwrap();
        let c = Amount::parse("1.5001", 4).unwrap();
        assert_eq!(a, b);
        assert!(a < c);
        assert!(c > b);
    }

    #[test]
    fn compares_large_values() {
        let a = Amount::new(u128::MAX, 18).unwrap();
        let b = Amount::new(1, 0).unwrap();
        assert!(a > b);
    }

    #[test]
    fn displays_fixed_point() {
        assert_eq!(Amount::parse("12.3", 2).unwrap().to_string(), "12.30");
        assert_eq!(Amount::parse("7", 0).unwrap().to_string(), "7");
    }
}
