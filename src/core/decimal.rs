//! Purpose: Arbitrary-precision decimal as an integer magnitude plus a non-negative scale.
//! Exports: `Decimal`, `Rounding`, `DECIMAL_GRAMMAR`.
//! Role: Value type behind decimal holders; exact text round-trip for marshalled amounts.
//! Invariants: Scale is never negative; a negative request fails instead of shifting the magnitude.
//! Invariants: Values are immutable; every operation returns a new instance.
//! Invariants: Equality, ordering and hashing are by numeric value (`1.0 == 1.00`).
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Add, Mul, Neg, Sub};
use std::str::FromStr;

use num_bigint::BigInt;
use num_traits::{Signed, Zero};

use crate::core::error::{Error, ErrorKind};

pub const DECIMAL_GRAMMAR: &str = "decimal literal: optional '-', digits, optional '.' followed by digits";

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Rounding {
    /// Round to nearest; ties go to the even neighbour.
    #[default]
    HalfEven,
    /// Round to nearest; ties go away from zero.
    HalfUp,
    /// Round to nearest; ties go toward zero.
    HalfDown,
    /// Truncate toward zero.
    Down,
    /// Away from zero.
    Up,
    Ceiling,
    Floor,
    /// Toward zero, unless the kept last digit would be 0 or 5; then away from zero.
    ZeroFiveUp,
}

impl FromStr for Rounding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "half-even" => Ok(Self::HalfEven),
            "half-up" => Ok(Self::HalfUp),
            "half-down" => Ok(Self::HalfDown),
            "down" => Ok(Self::Down),
            "up" => Ok(Self::Up),
            "ceiling" => Ok(Self::Ceiling),
            "floor" => Ok(Self::Floor),
            "05up" => Ok(Self::ZeroFiveUp),
            other => Err(Error::new(ErrorKind::Usage)
                .with_message(format!("unknown rounding mode {other:?}"))
                .with_hint("use half-even, half-up, half-down, down, up, ceiling, floor or 05up")),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Decimal {
    magnitude: BigInt,
    scale: u32,
}

fn pow10(exp: u32) -> BigInt {
    BigInt::from(10u8).pow(exp)
}

/// `value / divisor` rounded per `mode`; `divisor` is positive.
fn div_rounded(value: &BigInt, divisor: &BigInt, mode: Rounding) -> BigInt {
    let quot = value / divisor;
    let rem = value % divisor;
    if rem.is_zero() {
        return quot;
    }
    let away = if value.is_negative() { &quot - 1 } else { &quot + 1 };
    let twice: BigInt = rem.abs() * 2u8;
    let tie = twice.cmp(divisor);
    match mode {
        Rounding::Down => quot,
        Rounding::Up => away,
        Rounding::Ceiling if value.is_positive() => away,
        Rounding::Ceiling => quot,
        Rounding::Floor if value.is_negative() => away,
        Rounding::Floor => quot,
        Rounding::ZeroFiveUp if (&quot % 5u8).is_zero() => away,
        Rounding::ZeroFiveUp => quot,
        Rounding::HalfUp | Rounding::HalfDown | Rounding::HalfEven => match tie {
            Ordering::Greater => away,
            Ordering::Less => quot,
            Ordering::Equal => match mode {
                Rounding::HalfUp => away,
                Rounding::HalfEven if !(&quot % 2u8).is_zero() => away,
                _ => quot,
            },
        },
    }
}

impl Decimal {
    /// Builds a decimal from a signed scale; negative scales are rejected.
    pub fn new(magnitude: BigInt, scale: i64) -> Result<Self, Error> {
        let scale = u32::try_from(scale).map_err(|_| {
            Error::new(ErrorKind::InvalidScale)
                .with_message(format!("scale {scale} is outside 0..={}", u32::MAX))
        })?;
        Ok(Self::from_parts(magnitude, scale))
    }

    pub fn from_parts(magnitude: BigInt, scale: u32) -> Self {
        Self { magnitude, scale }
    }

    pub fn parse(text: &str) -> Result<Self, Error> {
        let invalid = || Error::literal(ErrorKind::InvalidNumericLiteral, text, DECIMAL_GRAMMAR);
        let (negative, unsigned) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text),
        };
        let (int_part, frac_part) = match unsigned.split_once('.') {
            Some((int_part, frac_part)) => (int_part, Some(frac_part)),
            None => (unsigned, None),
        };
        let all_digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
        if !all_digits(int_part) || !frac_part.is_none_or(all_digits) {
            return Err(invalid());
        }
        let frac_part = frac_part.unwrap_or("");
        let scale = u32::try_from(frac_part.len()).map_err(|_| invalid())?;
        let mut digits = String::with_capacity(int_part.len() + frac_part.len());
        digits.push_str(int_part);
        digits.push_str(frac_part);
        let magnitude = BigInt::parse_bytes(digits.as_bytes(), 10).ok_or_else(invalid)?;
        Ok(Self::from_parts(if negative { -magnitude } else { magnitude }, scale))
    }

    pub fn magnitude(&self) -> &BigInt {
        &self.magnitude
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    pub fn is_zero(&self) -> bool {
        self.magnitude.is_zero()
    }

    pub fn signum(&self) -> i32 {
        if self.magnitude.is_zero() {
            0
        } else if self.magnitude.is_negative() {
            -1
        } else {
            1
        }
    }

    pub fn to_text(&self) -> String {
        let digits = self.magnitude.abs().to_string();
        let scale = self.scale as usize;
        let mut out = String::with_capacity(digits.len() + scale + 3);
        if self.magnitude.is_negative() {
            out.push('-');
        }
        if scale == 0 {
            out.push_str(&digits);
        } else if digits.len() > scale {
            let (whole, frac) = digits.split_at(digits.len() - scale);
            out.push_str(whole);
            out.push('.');
            out.push_str(frac);
        } else {
            out.push_str("0.");
            out.extend(std::iter::repeat_n('0', scale - digits.len()));
            out.push_str(&digits);
        }
        out
    }

    /// Same value expressed with `scale` fractional digits, rounding when digits are dropped.
    pub fn rescale(&self, scale: u32, rounding: Rounding) -> Self {
        match scale.cmp(&self.scale) {
            Ordering::Equal => self.clone(),
            Ordering::Greater => {
                Self::from_parts(&self.magnitude * pow10(scale - self.scale), scale)
            }
            Ordering::Less => Self::from_parts(
                div_rounded(&self.magnitude, &pow10(self.scale - scale), rounding),
                scale,
            ),
        }
    }

    /// Smallest scale that keeps the value unchanged.
    pub fn normalized(&self) -> Self {
        if self.magnitude.is_zero() {
            return Self::default();
        }
        let ten = BigInt::from(10u8);
        let mut magnitude = self.magnitude.clone();
        let mut scale = self.scale;
        while scale > 0 && (&magnitude % &ten).is_zero() {
            magnitude /= &ten;
            scale -= 1;
        }
        Self::from_parts(magnitude, scale)
    }

    /// Both magnitudes expressed at the larger of the two scales.
    fn aligned(&self, other: &Self) -> (BigInt, BigInt, u32) {
        let scale = self.scale.max(other.scale);
        (
            &self.magnitude * pow10(scale - self.scale),
            &other.magnitude * pow10(scale - other.scale),
            scale,
        )
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl FromStr for Decimal {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<BigInt> for Decimal {
    fn from(magnitude: BigInt) -> Self {
        Self::from_parts(magnitude, 0)
    }
}

impl From<i64> for Decimal {
    fn from(value: i64) -> Self {
        Self::from_parts(BigInt::from(value), 0)
    }
}

impl PartialEq for Decimal {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Decimal {}

impl PartialOrd for Decimal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Decimal {
    fn cmp(&self, other: &Self) -> Ordering {
        if self.scale == other.scale {
            return self.magnitude.cmp(&other.magnitude);
        }
        let (lhs, rhs, _) = self.aligned(other);
        lhs.cmp(&rhs)
    }
}

impl Hash for Decimal {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let normalized = self.normalized();
        normalized.magnitude.hash(state);
        normalized.scale.hash(state);
    }
}

impl Add for &Decimal {
    type Output = Decimal;

    fn add(self, rhs: &Decimal) -> Decimal {
        let (lhs, rhs, scale) = self.aligned(rhs);
        Decimal::from_parts(lhs + rhs, scale)
    }
}

impl Add for Decimal {
    type Output = Decimal;

    fn add(self, rhs: Decimal) -> Decimal {
        &self + &rhs
    }
}

impl Sub for &Decimal {
    type Output = Decimal;

    fn sub(self, rhs: &Decimal) -> Decimal {
        let (lhs, rhs, scale) = self.aligned(rhs);
        Decimal::from_parts(lhs - rhs, scale)
    }
}

impl Sub for Decimal {
    type Output = Decimal;

    fn sub(self, rhs: Decimal) -> Decimal {
        &self - &rhs
    }
}

impl Mul for &Decimal {
    type Output = Decimal;

    fn mul(self, rhs: &Decimal) -> Decimal {
        Decimal::from_parts(&self.magnitude * &rhs.magnitude, self.scale + rhs.scale)
    }
}

impl Mul for Decimal {
    type Output = Decimal;

    fn mul(self, rhs: Decimal) -> Decimal {
        &self * &rhs
    }
}

impl Neg for Decimal {
    type Output = Decimal;

    fn neg(self) -> Decimal {
        Decimal::from_parts(-self.magnitude, self.scale)
    }
}

impl Neg for &Decimal {
    type Output = Decimal;

    fn neg(self) -> Decimal {
        Decimal::from_parts(-&self.magnitude, self.scale)
    }
}
