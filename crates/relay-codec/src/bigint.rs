//! Arbitrary-precision integer used by the handshake. Wraps `num-bigint` rather than carrying a
//! hand-rolled limb representation; the surface below mirrors the reference client's own
//! `BigNumber` rather than `num-bigint`'s native API, so callers never see the backing crate.

use crate::error::BigIntError;
use num_bigint::{BigInt, BigUint, RandBigInt, Sign};
use num_traits::{Signed, Zero};
use rand::rngs::OsRng;
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Div, Mul, Rem, Sub};

/// Byte order used by [`BigNumber::from_bytes`] / [`BigNumber::to_bytes`]. The handshake mixes
/// both: the session key arrives big-endian off the wire, scratch values are little-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Big,
    Little,
}

#[derive(Clone, Eq)]
pub struct BigNumber(BigInt);

impl BigNumber {
    pub fn zero() -> Self {
        BigNumber(BigInt::zero())
    }

    pub fn one() -> Self {
        BigNumber(BigInt::from(1u32))
    }

    pub fn from_u32(value: u32) -> Self {
        BigNumber(BigInt::from(value))
    }

    pub fn from_u64(value: u64) -> Self {
        BigNumber(BigInt::from(value))
    }

    /// Builds from a raw byte string, unsigned, in the given byte order.
    pub fn from_bytes(bytes: &[u8], endian: Endian) -> Self {
        let magnitude = match endian {
            Endian::Big => BigUint::from_bytes_be(bytes),
            Endian::Little => BigUint::from_bytes_le(bytes),
        };
        BigNumber(BigInt::from_biguint(Sign::Plus, magnitude))
    }

    pub fn from_hex_str(s: &str) -> Result<Self, BigIntError> {
        let magnitude = BigUint::parse_bytes(s.as_bytes(), 16).ok_or(BigIntError::ParseError)?;
        Ok(BigNumber(BigInt::from_biguint(Sign::Plus, magnitude)))
    }

    pub fn from_dec_str(s: &str) -> Result<Self, BigIntError> {
        s.parse::<BigInt>().map(BigNumber).map_err(|_| BigIntError::ParseError)
    }

    /// Fills with `bits` bits of cryptographically secure randomness.
    pub fn set_random(bits: u64) -> Self {
        let magnitude = OsRng.gen_biguint(bits);
        BigNumber(BigInt::from_biguint(Sign::Plus, magnitude))
    }

    pub fn negate(&mut self) {
        self.0 = -self.0.clone();
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_one(&self) -> bool {
        self.0 == BigInt::from(1u32)
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_negative()
    }

    pub fn is_odd(&self) -> bool {
        self.0.magnitude().bit(0)
    }

    pub fn is_even(&self) -> bool {
        !self.is_odd()
    }

    /// `self^exponent mod modulus`, non-negative operands only — the handshake never needs a
    /// signed modular exponentiation.
    pub fn mod_exp(&self, exponent: &BigNumber, modulus: &BigNumber) -> Result<BigNumber, BigIntError> {
        if modulus.is_zero() {
            return Err(BigIntError::DivisionByZero);
        }
        let base = self.0.magnitude();
        let exp = exponent.0.magnitude();
        let m = modulus.0.magnitude();
        let result = base.modpow(exp, m);
        Ok(BigNumber(BigInt::from_biguint(Sign::Plus, result)))
    }

    /// `self^exponent`, unsigned small exponent only.
    pub fn exp(&self, exponent: &BigNumber) -> BigNumber {
        let e = exponent
            .0
            .magnitude()
            .to_u32_digits()
            .first()
            .copied()
            .unwrap_or(0);
        BigNumber(self.0.pow(e))
    }

    pub fn num_bytes(&self) -> usize {
        (self.0.bits() as usize + 7) / 8
    }

    /// Low 32 bits, matching the reference's `AsDword`.
    pub fn as_dword(&self) -> u32 {
        let digits = self.0.magnitude().to_u32_digits();
        digits.first().copied().unwrap_or(0)
    }

    /// Byte representation padded up to `min_size` bytes (never truncated below the value's
    /// natural length) in the requested order.
    pub fn to_bytes(&self, min_size: usize, endian: Endian) -> Vec<u8> {
        let magnitude = self.0.magnitude();
        let mut be = magnitude.to_bytes_be();
        if be.len() < min_size {
            let mut padded = vec![0u8; min_size - be.len()];
            padded.append(&mut be);
            be = padded;
        }
        match endian {
            Endian::Big => be,
            Endian::Little => {
                be.reverse();
                be
            }
        }
    }

    pub fn to_hex_str(&self) -> String {
        self.0.magnitude().to_str_radix(16).to_uppercase()
    }

    pub fn to_dec_str(&self) -> String {
        self.0.to_string()
    }

    pub fn checked_div(&self, other: &BigNumber) -> Option<BigNumber> {
        if other.is_zero() {
            None
        } else {
            Some(BigNumber(&self.0 / &other.0))
        }
    }

    pub fn checked_rem(&self, other: &BigNumber) -> Option<BigNumber> {
        if other.is_zero() {
            None
        } else {
            Some(BigNumber(&self.0 % &other.0))
        }
    }
}

impl PartialEq for BigNumber {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl PartialOrd for BigNumber {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.0.cmp(&other.0))
    }
}

impl Ord for BigNumber {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl fmt::Debug for BigNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BigNumber({})", self.to_hex_str())
    }
}

macro_rules! impl_binop {
    ($trait:ident, $method:ident, $op:tt) => {
        impl $trait for BigNumber {
            type Output = BigNumber;
            fn $method(self, rhs: BigNumber) -> BigNumber {
                BigNumber(self.0 $op rhs.0)
            }
        }
        impl<'a> $trait<&'a BigNumber> for &'a BigNumber {
            type Output = BigNumber;
            fn $method(self, rhs: &'a BigNumber) -> BigNumber {
                BigNumber(&self.0 $op &rhs.0)
            }
        }
    };
}

impl_binop!(Add, add, +);
impl_binop!(Sub, sub, -);
impl_binop!(Mul, mul, *);

/// Division by zero is fatal, matching the reference implementation and the behaviour of
/// dividing a primitive integer by zero.
impl<'a> Div<&'a BigNumber> for &'a BigNumber {
    type Output = BigNumber;
    fn div(self, rhs: &'a BigNumber) -> BigNumber {
        self.checked_div(rhs).expect("big integer division by zero")
    }
}

impl<'a> Rem<&'a BigNumber> for &'a BigNumber {
    type Output = BigNumber;
    fn rem(self, rhs: &'a BigNumber) -> BigNumber {
        self.checked_rem(rhs).expect("big integer division by zero")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_and_one() {
        assert!(BigNumber::zero().is_zero());
        assert!(BigNumber::one().is_one());
        assert!(!BigNumber::one().is_zero());
    }

    #[test]
    fn from_bytes_round_trips_through_to_bytes() {
        let n = BigNumber::from_bytes(&[0x01, 0x02, 0x03], Endian::Big);
        assert_eq!(n.to_bytes(3, Endian::Big), vec![0x01, 0x02, 0x03]);
        assert_eq!(n.to_bytes(3, Endian::Little), vec![0x03, 0x02, 0x01]);
    }

    #[test]
    fn to_bytes_pads_but_never_truncates() {
        let n = BigNumber::from_u32(0xFF);
        assert_eq!(n.to_bytes(4, Endian::Big), vec![0x00, 0x00, 0x00, 0xFF]);
        // value needs 1 byte, asking for 0 must not lose it
        assert_eq!(n.to_bytes(0, Endian::Big), vec![0xFF]);
    }

    #[test]
    fn odd_even_and_negate() {
        let three = BigNumber::from_u32(3);
        assert!(three.is_odd());
        let four = BigNumber::from_u32(4);
        assert!(four.is_even());
        let mut neg = BigNumber::from_u32(5);
        neg.negate();
        assert!(neg.is_negative());
    }

    #[test]
    fn arithmetic() {
        let a = BigNumber::from_u32(10);
        let b = BigNumber::from_u32(3);
        assert_eq!((&a + &b).to_dec_str(), "13");
        assert_eq!((&a - &b).to_dec_str(), "7");
        assert_eq!((&a * &b).to_dec_str(), "30");
        assert_eq!((&a / &b).to_dec_str(), "3");
        assert_eq!((&a % &b).to_dec_str(), "1");
    }

    #[test]
    fn division_by_zero_is_none_when_checked() {
        let a = BigNumber::from_u32(10);
        assert!(a.checked_div(&BigNumber::zero()).is_none());
        assert!(a.checked_rem(&BigNumber::zero()).is_none());
    }

    #[test]
    #[should_panic(expected = "division by zero")]
    fn division_by_zero_panics_via_operator() {
        let a = BigNumber::from_u32(10);
        let _ = &a / &BigNumber::zero();
    }

    #[test]
    fn mod_exp_matches_naive_computation() {
        let base = BigNumber::from_u32(4);
        let exp = BigNumber::from_u32(13);
        let modulus = BigNumber::from_u32(497);
        // 4^13 mod 497 == 445, a standard textbook modexp example
        let result = base.mod_exp(&exp, &modulus).unwrap();
        assert_eq!(result.to_dec_str(), "445");
    }

    #[test]
    fn mod_exp_rejects_zero_modulus() {
        let base = BigNumber::from_u32(4);
        let exp = BigNumber::from_u32(13);
        assert_eq!(base.mod_exp(&exp, &BigNumber::zero()), Err(BigIntError::DivisionByZero));
    }

    #[test]
    fn exp_matches_pow() {
        let base = BigNumber::from_u32(2);
        let exp = BigNumber::from_u32(10);
        assert_eq!(base.exp(&exp).to_dec_str(), "1024");
    }

    #[test]
    fn hex_and_dec_round_trip() {
        let n = BigNumber::from_hex_str("1A").unwrap();
        assert_eq!(n.to_dec_str(), "26");
        assert_eq!(n.to_hex_str(), "1A");
    }

    #[test]
    fn set_random_respects_bit_length_ceiling() {
        let n = BigNumber::set_random(64);
        assert!(n.num_bytes() <= 8);
    }

    #[test]
    fn ordering() {
        let a = BigNumber::from_u32(5);
        let b = BigNumber::from_u32(9);
        assert!(a < b);
        assert_eq!(a, BigNumber::from_u32(5));
    }
}
