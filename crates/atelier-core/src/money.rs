//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  In many retail systems:                                                │
//! │    £10.00 / 3 = £3.33 (×3 = £9.99)  → Lost £0.01!                      │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Pence                                            │
//! │    1000 pence / 3 = 333 pence (×3 = 999 pence)                         │
//! │    We KNOW we lost 1 penny, and handle it explicitly                   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Legacy Decimal Inputs
//! The storefront's original document store held monetary fields as
//! arbitrary-precision decimals, and older documents serialize them as
//! decimal strings or floating numbers. [`Money::parse`] and the custom
//! `Deserialize` implementation normalize every legacy form to pence:
//!
//! | Input            | Result        |
//! |------------------|---------------|
//! | integer `10050`  | 10050 pence   |
//! | float `100.5`    | 10050 pence   |
//! | string `"100.50"`| 10050 pence   |
//! | null / absent    | 0 pence       |
//!
//! ## Usage
//! ```rust
//! use atelier_core::money::Money;
//!
//! // Create from pence (preferred)
//! let price = Money::from_pence(1099); // £10.99
//!
//! // Arithmetic operations
//! let doubled = price * 2;            // £21.98
//! let total = price + Money::from_pence(500); // £15.99
//! ```

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (pence for GBP).
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values for refunds and adjustments
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Serializes as pence**: The database, calculations, and API all use
///   pence; only the UI converts to pounds for display
///
/// ## Where Money Flows
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Material/Size/Finish prices ──► unit price ──► line total              │
/// │                                                                         │
/// │  Cart.subtotal ──► Offer discount ──► Shipping fee ──► Order total     │
/// │                                                                         │
/// │  EVERY monetary value in the system flows through this type            │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from pence (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use atelier_core::money::Money;
    ///
    /// let price = Money::from_pence(1099); // Represents £10.99
    /// assert_eq!(price.pence(), 1099);
    /// ```
    #[inline]
    pub const fn from_pence(pence: i64) -> Self {
        Money(pence)
    }

    /// Creates a Money value from major and minor units (pounds and pence).
    ///
    /// ## Example
    /// ```rust
    /// use atelier_core::money::Money;
    ///
    /// let price = Money::from_major_minor(10, 99); // £10.99
    /// assert_eq!(price.pence(), 1099);
    /// ```
    ///
    /// ## Note
    /// For negative amounts, only the major unit should be negative.
    /// `from_major_minor(-5, 50)` = -£5.50, not -£4.50
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Parses a legacy decimal representation into pence.
    ///
    /// This is the single coercion point for values arriving from the
    /// document store or client payloads as decimal strings. Two decimal
    /// places are kept, rounding half away from zero.
    ///
    /// ## Example
    /// ```rust
    /// use atelier_core::money::Money;
    ///
    /// assert_eq!(Money::parse("100.50").unwrap().pence(), 10050);
    /// assert_eq!(Money::parse("100").unwrap().pence(), 10000);
    /// assert_eq!(Money::parse("0.005").unwrap().pence(), 1);
    /// assert!(Money::parse("not money").is_err());
    /// ```
    pub fn parse(raw: &str) -> Result<Self, ParseMoneyError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(Money::zero());
        }

        let (negative, digits) = match raw.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, raw.strip_prefix('+').unwrap_or(raw)),
        };

        let (whole, frac) = match digits.split_once('.') {
            Some((w, f)) => (w, f),
            None => (digits, ""),
        };

        if whole.is_empty() && frac.is_empty() {
            return Err(ParseMoneyError::new(raw));
        }
        if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit())
        {
            return Err(ParseMoneyError::new(raw));
        }

        let major: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| ParseMoneyError::new(raw))?
        };

        // Keep two fractional digits; a third digit decides the rounding.
        let mut frac_digits = frac.chars().map(|c| c as i64 - '0' as i64);
        let d1 = frac_digits.next().unwrap_or(0);
        let d2 = frac_digits.next().unwrap_or(0);
        let d3 = frac_digits.next().unwrap_or(0);
        let minor = d1 * 10 + d2 + if d3 >= 5 { 1 } else { 0 };

        let pence = major * 100 + minor;
        Ok(Money(if negative { -pence } else { pence }))
    }

    /// Converts a floating decimal amount in pounds to pence.
    ///
    /// Used only at deserialization boundaries for legacy documents; all
    /// internal arithmetic stays in integer pence.
    pub fn from_decimal_f64(pounds: f64) -> Self {
        Money((pounds * 100.0).round() as i64)
    }

    /// Returns the value in pence (smallest currency unit).
    #[inline]
    pub const fn pence(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (pounds) portion.
    #[inline]
    pub const fn pounds(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit (pence) portion (always 0-99).
    #[inline]
    pub const fn pence_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Returns the smaller of two amounts.
    #[inline]
    pub fn min(self, other: Money) -> Money {
        Money(self.0.min(other.0))
    }

    /// Subtracts, clamping the result at zero.
    ///
    /// Discounts can never push a total negative:
    /// `£20 subtract_clamped £30 = £0`.
    #[inline]
    pub const fn subtract_clamped(self, other: Money) -> Money {
        let diff = self.0 - other.0;
        Money(if diff < 0 { 0 } else { diff })
    }

    /// Calculates a percentage of this amount with half-up rounding.
    ///
    /// ## Rounding
    /// We use integer math: `(amount × bps + 5000) / 10000`.
    /// The +5000 provides rounding (5000/10000 = 0.5), matching the
    /// two-decimal-place rounding customers see on their discounts.
    ///
    /// ## Example
    /// ```rust
    /// use atelier_core::money::Money;
    ///
    /// let subtotal = Money::from_pence(20000); // £200.00
    /// let discount = subtotal.percentage_of(1000); // 10% (basis points)
    /// assert_eq!(discount.pence(), 2000); // £20.00
    /// ```
    pub fn percentage_of(&self, bps: u32) -> Money {
        // i128 prevents overflow on large amounts
        let amount = (self.0 as i128 * bps as i128 + 5000) / 10000;
        Money::from_pence(amount as i64)
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use atelier_core::money::Money;
    ///
    /// let unit_price = Money::from_pence(10000); // £100.00
    /// let line_total = unit_price.multiply_quantity(2);
    /// assert_eq!(line_total.pence(), 20000); // £200.00
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

/// Error returned when a legacy decimal string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseMoneyError {
    raw: String,
}

impl ParseMoneyError {
    fn new(raw: &str) -> Self {
        ParseMoneyError {
            raw: raw.to_string(),
        }
    }
}

impl fmt::Display for ParseMoneyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid monetary value: '{}'", self.raw)
    }
}

impl std::error::Error for ParseMoneyError {}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// ## Note
/// This is for debugging and log output. Use frontend formatting for
/// actual UI display to handle localization properly.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}£{}.{:02}",
            sign,
            self.pounds().abs(),
            self.pence_part()
        )
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

/// Addition of two Money values.
impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

/// Addition assignment (+=).
impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

/// Subtraction of two Money values.
impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

/// Subtraction assignment (-=).
impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by integer (for quantity calculations).
impl Mul<i32> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i32) -> Self {
        Money(self.0 * qty as i64)
    }
}

/// Multiplication by i64.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::zero(), Add::add)
    }
}

/// Flexible deserialization implementing the legacy coercion contract.
///
/// Integers are pence. Floats and strings are decimal pounds (legacy
/// document forms). Null coerces to zero.
impl<'de> Deserialize<'de> for Money {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct MoneyVisitor;

        impl<'de> Visitor<'de> for MoneyVisitor {
            type Value = Money;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an integer pence amount, a decimal string, or null")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Money, E> {
                Ok(Money::from_pence(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Money, E> {
                Ok(Money::from_pence(v as i64))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Money, E> {
                Ok(Money::from_decimal_f64(v))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Money, E> {
                Money::parse(v).map_err(de::Error::custom)
            }

            fn visit_none<E: de::Error>(self) -> Result<Money, E> {
                Ok(Money::zero())
            }

            fn visit_unit<E: de::Error>(self) -> Result<Money, E> {
                Ok(Money::zero())
            }

            fn visit_some<D2>(self, deserializer: D2) -> Result<Money, D2::Error>
            where
                D2: Deserializer<'de>,
            {
                deserializer.deserialize_any(MoneyVisitor)
            }
        }

        deserializer.deserialize_any(MoneyVisitor)
    }
}

// =============================================================================
// VAT Rate
// =============================================================================

/// VAT rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 2000 bps = 20% (UK standard rate)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct VatRate(u32);

/// The UK standard VAT rate (20%), applied when no configured rate exists.
pub const STANDARD_VAT_RATE: VatRate = VatRate(2000);

impl VatRate {
    /// Creates a VAT rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        VatRate(bps)
    }

    /// Creates a VAT rate from a percentage (for convenience).
    pub fn from_percentage(pct: f64) -> Self {
        VatRate((pct * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero VAT rate.
    #[inline]
    pub const fn zero() -> Self {
        VatRate(0)
    }

    /// Checks if the rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for VatRate {
    fn default() -> Self {
        STANDARD_VAT_RATE
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_pence() {
        let money = Money::from_pence(1099);
        assert_eq!(money.pence(), 1099);
        assert_eq!(money.pounds(), 10);
        assert_eq!(money.pence_part(), 99);
    }

    #[test]
    fn test_from_major_minor() {
        let money = Money::from_major_minor(10, 99);
        assert_eq!(money.pence(), 1099);

        let negative = Money::from_major_minor(-5, 50);
        assert_eq!(negative.pence(), -550);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_pence(1099)), "£10.99");
        assert_eq!(format!("{}", Money::from_pence(500)), "£5.00");
        assert_eq!(format!("{}", Money::from_pence(-550)), "-£5.50");
        assert_eq!(format!("{}", Money::from_pence(0)), "£0.00");
    }

    #[test]
    fn test_parse_decimal_strings() {
        assert_eq!(Money::parse("100.50").unwrap().pence(), 10050);
        assert_eq!(Money::parse("100").unwrap().pence(), 10000);
        assert_eq!(Money::parse("0.5").unwrap().pence(), 50);
        assert_eq!(Money::parse(".5").unwrap().pence(), 50);
        assert_eq!(Money::parse("-12.34").unwrap().pence(), -1234);
        // Third decimal digit rounds half up
        assert_eq!(Money::parse("1.005").unwrap().pence(), 101);
        assert_eq!(Money::parse("1.004").unwrap().pence(), 100);
        // Empty coerces to zero, like absent document fields
        assert_eq!(Money::parse("").unwrap(), Money::zero());

        assert!(Money::parse("abc").is_err());
        assert!(Money::parse("1.2.3").is_err());
        assert!(Money::parse("£5").is_err());
    }

    #[test]
    fn test_deserialize_legacy_forms() {
        // Integer JSON numbers are pence
        let m: Money = serde_json::from_str("1099").unwrap();
        assert_eq!(m.pence(), 1099);

        // Floats are decimal pounds (legacy document form)
        let m: Money = serde_json::from_str("100.5").unwrap();
        assert_eq!(m.pence(), 10050);

        // Decimal strings are decimal pounds
        let m: Money = serde_json::from_str("\"100.50\"").unwrap();
        assert_eq!(m.pence(), 10050);

        // Null coerces to zero
        let m: Money = serde_json::from_str("null").unwrap();
        assert_eq!(m, Money::zero());
    }

    #[test]
    fn test_serialize_roundtrip() {
        let m = Money::from_pence(10050);
        let json = serde_json::to_string(&m).unwrap();
        assert_eq!(json, "10050");
        let back: Money = serde_json::from_str(&json).unwrap();
        assert_eq!(back, m);
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_pence(1000);
        let b = Money::from_pence(500);

        assert_eq!((a + b).pence(), 1500);
        assert_eq!((a - b).pence(), 500);
        let result: Money = a * 3;
        assert_eq!(result.pence(), 3000);
    }

    #[test]
    fn test_subtract_clamped() {
        let subtotal = Money::from_pence(2000);
        let big_discount = Money::from_pence(3000);
        assert_eq!(subtotal.subtract_clamped(big_discount), Money::zero());
        assert_eq!(
            subtotal.subtract_clamped(Money::from_pence(500)).pence(),
            1500
        );
    }

    #[test]
    fn test_percentage_of() {
        // £200.00 at 10% = £20.00
        let subtotal = Money::from_pence(20000);
        assert_eq!(subtotal.percentage_of(1000).pence(), 2000);

        // Half-up rounding: £0.05 at 10% = £0.005 → £0.01
        assert_eq!(Money::from_pence(5).percentage_of(1000).pence(), 1);
    }

    #[test]
    fn test_multiply_quantity() {
        let unit_price = Money::from_pence(10000);
        let line_total = unit_price.multiply_quantity(2);
        assert_eq!(line_total.pence(), 20000);
    }

    #[test]
    fn test_sum() {
        let total: Money = [100, 250, 399]
            .iter()
            .map(|p| Money::from_pence(*p))
            .sum();
        assert_eq!(total.pence(), 749);
    }

    #[test]
    fn test_vat_rate() {
        let rate = VatRate::from_bps(2000);
        assert_eq!(rate.bps(), 2000);
        assert!((rate.percentage() - 20.0).abs() < 0.001);

        let rate = VatRate::from_percentage(20.0);
        assert_eq!(rate, STANDARD_VAT_RATE);

        assert_eq!(VatRate::default(), STANDARD_VAT_RATE);
    }
}
