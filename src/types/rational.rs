use anyhow::Result;
use anyhow::{anyhow, bail};
use std::cmp::Ordering;
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};
use std::str::FromStr;

/// Exact fraction used for every duration and timestamp.
///
/// Values are always stored reduced, with the sign on the numerator and a
/// positive denominator. A zero denominator encodes the non-finite values:
/// `1/0` is +infinity, `-1/0` is -infinity and `0/0` is NaN.
#[derive(Clone, Copy)]
pub struct RationalNumber {
    num: i64,
    den: i64,
}

impl RationalNumber {
    pub const fn zero() -> Self {
        Self { num: 0, den: 1 }
    }

    pub const fn one() -> Self {
        Self { num: 1, den: 1 }
    }

    pub const fn infinity() -> Self {
        Self { num: 1, den: 0 }
    }

    pub const fn neg_infinity() -> Self {
        Self { num: -1, den: 0 }
    }

    pub const fn nan() -> Self {
        Self { num: 0, den: 0 }
    }

    pub const fn from_integer(value: i64) -> Self {
        Self { num: value, den: 1 }
    }

    /// Builds `numerator / denominator` in reduced form.
    ///
    /// A zero denominator gives +inf or -inf following the numerator's sign,
    /// and NaN for `0/0`.
    pub fn new(numerator: i64, denominator: i64) -> Self {
        Self::from_wide(numerator as i128, denominator as i128)
    }

    fn from_wide(num: i128, den: i128) -> Self {
        if den == 0 {
            return match num.signum() {
                1 => Self::infinity(),
                -1 => Self::neg_infinity(),
                _ => Self::nan(),
            };
        }
        let (mut num, mut den) = if den < 0 { (-num, -den) } else { (num, den) };
        let divisor = gcd(num.unsigned_abs(), den.unsigned_abs()) as i128;
        if divisor > 1 {
            num /= divisor;
            den /= divisor;
        }
        match (i64::try_from(num), i64::try_from(den)) {
            (Ok(num), Ok(den)) => Self { num, den },
            // out of the representable range
            _ => Self::nan(),
        }
    }

    /// Maps the float result of an operation on a non-finite operand back
    /// onto the rational encodings. The only finite outcome is zero (`x / inf`).
    fn from_non_finite(value: f64) -> Self {
        if value.is_nan() {
            Self::nan()
        } else if value == f64::INFINITY {
            Self::infinity()
        } else if value == f64::NEG_INFINITY {
            Self::neg_infinity()
        } else {
            Self::zero()
        }
    }

    pub fn numerator(&self) -> i64 {
        self.num
    }

    pub fn denominator(&self) -> i64 {
        self.den
    }

    pub fn is_negative(&self) -> bool {
        self.num < 0
    }

    pub fn is_positive(&self) -> bool {
        self.num > 0
    }

    pub fn is_zero(&self) -> bool {
        self.num == 0 && self.den != 0
    }

    pub fn is_non_zero(&self) -> bool {
        self.num != 0
    }

    pub fn is_non_negative(&self) -> bool {
        !self.is_nan() && self.num >= 0
    }

    pub fn is_non_positive(&self) -> bool {
        !self.is_nan() && self.num <= 0
    }

    pub fn is_finite(&self) -> bool {
        self.den != 0
    }

    pub fn is_infinite(&self) -> bool {
        self.den == 0 && self.num != 0
    }

    pub fn is_nan(&self) -> bool {
        self.den == 0 && self.num == 0
    }

    pub fn is_integer(&self) -> bool {
        self.den == 1
    }

    pub fn to_f64(&self) -> f64 {
        self.num as f64 / self.den as f64
    }

    /// Integer part, truncated toward zero. `None` for non-finite values.
    pub fn to_integer(&self) -> Option<i64> {
        if self.is_finite() {
            Some(self.num / self.den)
        } else {
            None
        }
    }

    pub fn abs(&self) -> Self {
        Self::from_wide((self.num as i128).abs(), self.den as i128)
    }

    /// Renders as a mixed fraction, e.g. `1_3/4` with `_` as separator.
    /// Integers, proper fractions and non-finite values render as `Display` does.
    pub fn to_mixed_string(&self, separator: &str) -> String {
        if !self.is_finite() || self.is_integer() || self.num.unsigned_abs() < self.den as u64 {
            return self.to_string();
        }
        let (num, den) = self.wide();
        let whole = num / den;
        let remainder = (num % den).unsigned_abs();
        format!("{}{}{}/{}", whole, separator, remainder, den)
    }

    fn infinite_rank(&self) -> i8 {
        match (self.is_finite(), self.num.signum()) {
            (true, _) => 0,
            (false, sign) => sign as i8,
        }
    }

    fn wide(&self) -> (i128, i128) {
        (self.num as i128, self.den as i128)
    }
}

fn gcd(mut a: u128, mut b: u128) -> u128 {
    while b != 0 {
        let r = a % b;
        a = b;
        b = r;
    }
    a
}

impl Default for RationalNumber {
    fn default() -> Self {
        Self::zero()
    }
}

impl From<i64> for RationalNumber {
    fn from(value: i64) -> Self {
        Self::from_integer(value)
    }
}

impl From<i32> for RationalNumber {
    fn from(value: i32) -> Self {
        Self::from_integer(value as i64)
    }
}

impl Add for RationalNumber {
    type Output = Self;

    fn add(self, other: Self) -> Self::Output {
        if !(self.is_finite() && other.is_finite()) {
            return Self::from_non_finite(self.to_f64() + other.to_f64());
        }
        let (a, b) = self.wide();
        let (c, d) = other.wide();
        Self::from_wide(a * d + c * b, b * d)
    }
}

impl Sub for RationalNumber {
    type Output = Self;

    fn sub(self, other: Self) -> Self::Output {
        if !(self.is_finite() && other.is_finite()) {
            return Self::from_non_finite(self.to_f64() - other.to_f64());
        }
        let (a, b) = self.wide();
        let (c, d) = other.wide();
        Self::from_wide(a * d - c * b, b * d)
    }
}

impl Mul for RationalNumber {
    type Output = Self;

    fn mul(self, other: Self) -> Self::Output {
        if !(self.is_finite() && other.is_finite()) {
            return Self::from_non_finite(self.to_f64() * other.to_f64());
        }
        let (a, b) = self.wide();
        let (c, d) = other.wide();
        Self::from_wide(a * c, b * d)
    }
}

impl Div for RationalNumber {
    type Output = Self;

    fn div(self, other: Self) -> Self::Output {
        if !(self.is_finite() && other.is_finite()) {
            return Self::from_non_finite(self.to_f64() / other.to_f64());
        }
        let (a, b) = self.wide();
        let (c, d) = other.wide();
        Self::from_wide(a * d, b * c)
    }
}

impl Neg for RationalNumber {
    type Output = Self;

    fn neg(self) -> Self::Output {
        let (num, den) = self.wide();
        Self::from_wide(-num, den)
    }
}

macro_rules! impl_integer_ops {
    ($($trait:ident $method:ident $assign_trait:ident $assign_method:ident),*) => {
        $(
            impl $trait<i64> for RationalNumber {
                type Output = Self;

                fn $method(self, other: i64) -> Self::Output {
                    $trait::$method(self, Self::from_integer(other))
                }
            }

            impl $assign_trait for RationalNumber {
                fn $assign_method(&mut self, other: Self) {
                    *self = $trait::$method(*self, other);
                }
            }

            impl $assign_trait<i64> for RationalNumber {
                fn $assign_method(&mut self, other: i64) {
                    *self = $trait::$method(*self, Self::from_integer(other));
                }
            }
        )*
    };
}

impl_integer_ops!(
    Add add AddAssign add_assign,
    Sub sub SubAssign sub_assign,
    Mul mul MulAssign mul_assign,
    Div div DivAssign div_assign
);

impl PartialEq for RationalNumber {
    fn eq(&self, other: &Self) -> bool {
        self.partial_cmp(other) == Some(Ordering::Equal)
    }
}

impl PartialEq<i64> for RationalNumber {
    fn eq(&self, other: &i64) -> bool {
        *self == Self::from_integer(*other)
    }
}

impl PartialOrd for RationalNumber {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self.is_nan() || other.is_nan() {
            return None;
        }
        if self.is_finite() && other.is_finite() {
            let lhs = self.num as i128 * other.den as i128;
            let rhs = other.num as i128 * self.den as i128;
            return Some(lhs.cmp(&rhs));
        }
        Some(self.infinite_rank().cmp(&other.infinite_rank()))
    }
}

impl PartialOrd<i64> for RationalNumber {
    fn partial_cmp(&self, other: &i64) -> Option<Ordering> {
        self.partial_cmp(&Self::from_integer(*other))
    }
}

impl Sum for RationalNumber {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::zero(), |acc, value| acc + value)
    }
}

impl<'a> Sum<&'a RationalNumber> for RationalNumber {
    fn sum<I: Iterator<Item = &'a RationalNumber>>(iter: I) -> Self {
        iter.fold(Self::zero(), |acc, value| acc + *value)
    }
}

impl fmt::Display for RationalNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = if self.is_nan() {
            "nan".to_string()
        } else if self.is_infinite() {
            if self.num > 0 { "inf" } else { "-inf" }.to_string()
        } else if self.is_integer() {
            self.num.to_string()
        } else {
            format!("{}/{}", self.num, self.den)
        };
        f.pad(&text)
    }
}

impl fmt::Debug for RationalNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rational({})", self)
    }
}

fn parse_digits(part: &str, original: &str) -> Result<i64> {
    if part.is_empty() || !part.chars().all(|c| c.is_ascii_digit()) {
        return Err(anyhow!("Invalid rational number: {}", original));
    }
    part.parse()
        .map_err(|_e| anyhow!("Invalid rational number: {}", original))
}

impl FromStr for RationalNumber {
    type Err = anyhow::Error;

    /// Accepts `n`, `n/d`, mixed `w_n/d`, an optional leading `-`, and the
    /// `inf`, `-inf` and `nan` renderings.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        match s {
            "inf" => return Ok(Self::infinity()),
            "-inf" => return Ok(Self::neg_infinity()),
            "nan" => return Ok(Self::nan()),
            _ => {}
        }

        let (negative, body) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let (whole, fraction) = match body.split_once('_') {
            Some((whole, fraction)) => (Some(whole), fraction),
            None => (None, body),
        };

        let value = match fraction.split_once('/') {
            Some((num, den)) => {
                let num = parse_digits(num, s)?;
                let den = parse_digits(den, s)?;
                if den == 0 {
                    bail!("Zero denominator in rational number: {}", s);
                }
                Self::new(num, den)
            }
            None if whole.is_some() => bail!("Invalid mixed fraction: {}", s),
            None => Self::from_integer(parse_digits(fraction, s)?),
        };
        let value = match whole {
            Some(whole) => value + Self::from_integer(parse_digits(whole, s)?),
            None => value,
        };

        Ok(if negative { -value } else { value })
    }
}
