//! The bigint primitive type.

use num_traits::{FromPrimitive, One, Signed, ToPrimitive, Zero};
use std::{
    fmt::{self, Display},
    rc::Rc,
};

/// The raw bigint type.
pub type RawBigInt = num_bigint::BigInt;

/// An arbitrary-precision integer primitive.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JsBigInt {
    inner: Rc<RawBigInt>,
}

impl JsBigInt {
    /// Creates a new [`JsBigInt`].
    #[must_use]
    pub fn new<T: Into<Self>>(value: T) -> Self {
        value.into()
    }

    /// Creates a [`JsBigInt`] with value `0`.
    #[must_use]
    pub fn zero() -> Self {
        Self {
            inner: Rc::new(RawBigInt::zero()),
        }
    }

    /// Checks if the value is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.inner.is_zero()
    }

    /// Creates a [`JsBigInt`] with value `1`.
    #[must_use]
    pub fn one() -> Self {
        Self {
            inner: Rc::new(RawBigInt::one()),
        }
    }

    /// Returns a reference to the raw integer.
    #[must_use]
    pub fn as_inner(&self) -> &RawBigInt {
        &self.inner
    }

    /// Converts the bigint to a string with the given radix.
    #[must_use]
    pub fn to_string_radix(&self, radix: u32) -> String {
        self.inner.to_str_radix(radix)
    }

    /// Converts the bigint to an `f64`, returning `f64::INFINITY` for values
    /// too big to represent.
    #[must_use]
    pub fn to_f64(&self) -> f64 {
        self.inner.to_f64().unwrap_or(f64::INFINITY)
    }

    /// Parses a string into a bigint with the specified radix.
    #[must_use]
    pub fn from_string_radix(buf: &str, radix: u32) -> Option<Self> {
        Some(Self {
            inner: Rc::new(RawBigInt::parse_bytes(buf.as_bytes(), radix)?),
        })
    }

    /// `StringToBigInt ( str )`
    #[must_use]
    pub fn from_string(mut string: &str) -> Option<Self> {
        string = string.trim();

        if string.is_empty() {
            return Some(Self::zero());
        }

        let mut radix = 10;
        if string.starts_with("0b") || string.starts_with("0B") {
            radix = 2;
            string = &string[2..];
        } else if string.starts_with("0x") || string.starts_with("0X") {
            radix = 16;
            string = &string[2..];
        } else if string.starts_with("0o") || string.starts_with("0O") {
            radix = 8;
            string = &string[2..];
        }

        Self::from_string_radix(string, radix)
    }

    /// Creates a bigint from an `f64` with an integral value.
    #[must_use]
    pub fn from_f64(value: f64) -> Option<Self> {
        RawBigInt::from_f64(value).map(|inner| Self {
            inner: Rc::new(inner),
        })
    }

    /// Truncates the value to a signed 64-bit integer, wrapping modulo 2^64.
    #[must_use]
    pub fn to_big_int64(&self) -> i64 {
        let modulus = RawBigInt::one() << 64u32;
        let mut rem = (&*self.inner) % &modulus;
        if rem.is_negative() {
            rem += &modulus;
        }
        let unsigned = rem.to_u64().unwrap_or(0);
        unsigned as i64
    }

    /// Truncates the value to an unsigned 64-bit integer, wrapping modulo 2^64.
    #[must_use]
    pub fn to_big_uint64(&self) -> u64 {
        self.to_big_int64() as u64
    }

    /// Checks for mathematical equality.
    #[must_use]
    pub fn equal(x: &Self, y: &Self) -> bool {
        x == y
    }
}

impl Display for JsBigInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl From<RawBigInt> for JsBigInt {
    fn from(value: RawBigInt) -> Self {
        Self {
            inner: Rc::new(value),
        }
    }
}

impl From<i64> for JsBigInt {
    fn from(value: i64) -> Self {
        Self {
            inner: Rc::new(RawBigInt::from(value)),
        }
    }
}

impl From<u64> for JsBigInt {
    fn from(value: u64) -> Self {
        Self {
            inner: Rc::new(RawBigInt::from(value)),
        }
    }
}

impl From<i32> for JsBigInt {
    fn from(value: i32) -> Self {
        Self {
            inner: Rc::new(RawBigInt::from(value)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::JsBigInt;

    #[test]
    fn wrapping_to_64_bits() {
        assert_eq!(JsBigInt::from(-1i64).to_big_uint64(), u64::MAX);
        assert_eq!(JsBigInt::from(u64::MAX).to_big_int64(), -1);
        assert_eq!(JsBigInt::from(42i64).to_big_int64(), 42);
    }

    #[test]
    fn parsing() {
        assert_eq!(JsBigInt::from_string("42"), Some(JsBigInt::from(42i64)));
        assert_eq!(JsBigInt::from_string("0x10"), Some(JsBigInt::from(16i64)));
        assert_eq!(JsBigInt::from_string(""), Some(JsBigInt::zero()));
        assert_eq!(JsBigInt::from_string("nope"), None);
    }
}
