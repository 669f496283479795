//! Fixed-point amount type.
//!
//! # Motivation
//!
//! The commerce platform serializes every monetary value as a decimal string
//! (`"24.95"`) plus a currency code. Strings are fine on the wire but unusable
//! for totals, so all arithmetic in this workspace happens on `Amount`: a
//! 1e-6 (micros) fixed-point value stored as `i64`.
//!
//! Wrapping the raw `i64` keeps money from mixing with unrelated integers
//! (quantities, counters) without a compile-time signal:
//! - No `From<i64>` impl — construction goes through [`Amount::from_micros`]
//!   or [`Amount::parse`].
//! - Multiplication by a line quantity is explicit and overflow-checked.
//!
//! # Scale
//!
//! 1 major currency unit = 1_000_000 micros. Fractional parts beyond six
//! digits cannot be represented and are rejected at parse time rather than
//! rounded — the platform never emits them.

use std::ops::{Add, AddAssign};

/// Micros per major currency unit.
pub const MICROS_PER_UNIT: i64 = 1_000_000;

// ---------------------------------------------------------------------------
// Amount newtype
// ---------------------------------------------------------------------------

/// A fixed-point monetary amount at 1e-6 scale.
///
/// `Amount` is currency-agnostic; pairing it with a currency code is the
/// caller's job (see [`crate::Money`]).
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(i64);

impl Amount {
    /// Zero amount.
    pub const ZERO: Amount = Amount(0);

    /// Construct from a raw micros value.
    #[inline]
    pub const fn from_micros(micros: i64) -> Self {
        Amount(micros)
    }

    /// The underlying micros value.
    #[inline]
    pub const fn micros(self) -> i64 {
        self.0
    }

    /// Parse a platform decimal string (`"24.95"`, `"0.0"`, `"-1.5"`).
    ///
    /// # Errors
    /// Rejects empty input, non-digit characters, more than six fractional
    /// digits, and values that overflow `i64` micros.
    pub fn parse(s: &str) -> Result<Self, AmountParseError> {
        let t = s.trim();
        if t.is_empty() {
            return Err(AmountParseError::Empty);
        }

        let (negative, rest) = match t.strip_prefix('-') {
            Some(r) => (true, r),
            None => (false, t),
        };

        let (int_part, frac_part) = match rest.split_once('.') {
            Some((i, f)) => (i, f),
            None => (rest, ""),
        };

        if int_part.is_empty() && frac_part.is_empty() {
            return Err(AmountParseError::Invalid(s.to_string()));
        }
        if !int_part.chars().all(|c| c.is_ascii_digit())
            || !frac_part.chars().all(|c| c.is_ascii_digit())
        {
            return Err(AmountParseError::Invalid(s.to_string()));
        }
        if frac_part.len() > 6 {
            return Err(AmountParseError::TooPrecise(s.to_string()));
        }

        let int_val: i64 = if int_part.is_empty() {
            0
        } else {
            int_part
                .parse()
                .map_err(|_| AmountParseError::Overflow(s.to_string()))?
        };

        // Right-pad the fractional digits to micros.
        let mut frac_val: i64 = 0;
        if !frac_part.is_empty() {
            frac_val = frac_part
                .parse()
                .map_err(|_| AmountParseError::Overflow(s.to_string()))?;
            for _ in 0..(6 - frac_part.len()) {
                frac_val *= 10;
            }
        }

        let magnitude = int_val
            .checked_mul(MICROS_PER_UNIT)
            .and_then(|v| v.checked_add(frac_val))
            .ok_or_else(|| AmountParseError::Overflow(s.to_string()))?;

        Ok(Amount(if negative { -magnitude } else { magnitude }))
    }

    /// Checked addition. `None` on overflow.
    #[inline]
    pub fn checked_add(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_add(rhs.0).map(Amount)
    }

    /// Saturating addition — clamps at the `i64` bounds.
    #[inline]
    pub fn saturating_add(self, rhs: Amount) -> Amount {
        Amount(self.0.saturating_add(rhs.0))
    }

    /// Multiply a per-unit amount by a line quantity, checking for overflow.
    ///
    /// Callers MUST handle `None` explicitly; an overflowing line total is a
    /// data error, not a routine saturation.
    #[inline]
    pub fn checked_mul_qty(self, qty: u32) -> Option<Amount> {
        self.0.checked_mul(i64::from(qty)).map(Amount)
    }
}

impl Add for Amount {
    type Output = Amount;
    #[inline]
    fn add(self, rhs: Amount) -> Amount {
        Amount(self.0 + rhs.0)
    }
}

impl AddAssign for Amount {
    #[inline]
    fn add_assign(&mut self, rhs: Amount) {
        self.0 += rhs.0;
    }
}

// ---------------------------------------------------------------------------
// Display — canonical platform decimal form
// ---------------------------------------------------------------------------

impl std::fmt::Display for Amount {
    /// Formats in the platform's decimal form: trailing zeros trimmed from the
    /// fractional part, but always at least one fractional digit (`"0.0"`,
    /// `"24.95"`, `"12.5"`).
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let units = self.0 / MICROS_PER_UNIT;
        let frac = (self.0 % MICROS_PER_UNIT).abs();

        let mut frac_str = format!("{frac:06}");
        while frac_str.len() > 1 && frac_str.ends_with('0') {
            frac_str.pop();
        }

        // units truncates toward zero, losing the sign for -0.x values.
        if self.0 < 0 && units == 0 {
            write!(f, "-{units}.{frac_str}")
        } else {
            write!(f, "{units}.{frac_str}")
        }
    }
}

// ---------------------------------------------------------------------------
// AmountParseError
// ---------------------------------------------------------------------------

/// Returned when a decimal string cannot be represented as an [`Amount`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AmountParseError {
    Empty,
    Invalid(String),
    TooPrecise(String),
    Overflow(String),
}

impl std::fmt::Display for AmountParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AmountParseError::Empty => write!(f, "empty amount string"),
            AmountParseError::Invalid(s) => write!(f, "invalid amount string: {s:?}"),
            AmountParseError::TooPrecise(s) => {
                write!(f, "amount has more than six fractional digits: {s:?}")
            }
            AmountParseError::Overflow(s) => write!(f, "amount overflows i64 micros: {s:?}"),
        }
    }
}

impl std::error::Error for AmountParseError {}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
