//! Universal numeric value for schema literals.
//!
//! JSON documents do not announce which native width produced a literal, so
//! `minimum: 5` may meet a subject parsed as `u64`, `i32`, or `f64`. This type
//! stores the literal in its original kind (no widening on construction) and
//! compares/hashes across kinds by true mathematical value.
//!
//! Comparison rule:
//! - If both operands convert exactly into a 128-bit decimal, compare there.
//!   This is lossless for every integer width/signedness (including `u64`
//!   values above `i64::MAX`) and for `Decimal` itself.
//! - Otherwise (floats beyond the decimal's range, infinities, NaN) fall back
//!   to `f64` with IEEE semantics. NaN is incomparable, never a panic.
//! - Booleans participate as 0/1.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use ordered_float::OrderedFloat;
use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};

#[derive(Debug, Clone, Copy)]
pub enum UniversalNumber {
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    Float32(f32),
    Float64(f64),
    Decimal128(Decimal),
    Bool(bool),
}

// ------------------------------ Construction ------------------------------ //

macro_rules! from_native {
    ($($variant:ident: $native:ty),* $(,)?) => {
        $(impl From<$native> for UniversalNumber {
            fn from(value: $native) -> Self { Self::$variant(value) }
        })*
    };
}

from_native! {
    Int8: i8, Int16: i16, Int32: i32, Int64: i64,
    UInt8: u8, UInt16: u16, UInt32: u32, UInt64: u64,
    Float32: f32, Float64: f64,
    Decimal128: Decimal, Bool: bool,
}

impl UniversalNumber {
    /// Lossless lift out of a JSON number. `serde_json` already classified the
    /// literal as i64 / u64 / f64; we keep that classification.
    pub fn from_json_number(n: &serde_json::Number) -> Self {
        if let Some(i) = n.as_i64() {
            Self::Int64(i)
        } else if let Some(u) = n.as_u64() {
            Self::UInt64(u)
        } else {
            // serde_json numbers are always one of the three arms.
            Self::Float64(n.as_f64().unwrap_or(f64::NAN))
        }
    }

    pub fn is_integer_kind(&self) -> bool {
        matches!(
            self,
            Self::Int8(_) | Self::Int16(_) | Self::Int32(_) | Self::Int64(_)
                | Self::UInt8(_) | Self::UInt16(_) | Self::UInt32(_) | Self::UInt64(_)
        )
    }

    pub fn is_float_kind(&self) -> bool {
        matches!(self, Self::Float32(_) | Self::Float64(_))
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, Self::Bool(_))
    }

    // ------------------------------ Promotion ------------------------------ //

    /// Exact decimal rendition, or `None` when the value falls outside the
    /// decimal's exactly-representable range (very large/small floats, ±inf,
    /// NaN). Integer kinds and booleans always succeed.
    pub fn as_decimal(&self) -> Option<Decimal> {
        match *self {
            Self::Int8(v) => Some(Decimal::from(v)),
            Self::Int16(v) => Some(Decimal::from(v)),
            Self::Int32(v) => Some(Decimal::from(v)),
            Self::Int64(v) => Some(Decimal::from(v)),
            Self::UInt8(v) => Some(Decimal::from(v)),
            Self::UInt16(v) => Some(Decimal::from(v)),
            Self::UInt32(v) => Some(Decimal::from(v)),
            Self::UInt64(v) => Some(Decimal::from(v)),
            Self::Float32(v) => Decimal::from_f32(v),
            Self::Float64(v) => Decimal::from_f64(v),
            Self::Decimal128(v) => Some(v),
            Self::Bool(v) => Some(Decimal::from(v as u8)),
        }
    }

    /// Lossy double rendition; the comparison fallback path.
    pub fn as_f64(&self) -> f64 {
        match *self {
            Self::Int8(v) => v as f64,
            Self::Int16(v) => v as f64,
            Self::Int32(v) => v as f64,
            Self::Int64(v) => v as f64,
            Self::UInt8(v) => v as f64,
            Self::UInt16(v) => v as f64,
            Self::UInt32(v) => v as f64,
            Self::UInt64(v) => v as f64,
            Self::Float32(v) => v as f64,
            Self::Float64(v) => v,
            Self::Decimal128(v) => v.to_f64().unwrap_or(f64::NAN),
            Self::Bool(v) => v as u8 as f64,
        }
    }

    // ------------------------------ Arithmetic ----------------------------- //

    /// Exact multiple-of test under the same promotion rule as comparison.
    /// A zero or non-finite divisor is never a divisor of anything.
    pub fn is_multiple_of(&self, divisor: &Self) -> bool {
        if let (Some(x), Some(m)) = (self.as_decimal(), divisor.as_decimal()) {
            if m.is_zero() {
                return false;
            }
            return (x % m).is_zero();
        }
        let (x, m) = (self.as_f64(), divisor.as_f64());
        if m == 0.0 || !m.is_finite() || !x.is_finite() {
            return false;
        }
        x % m == 0.0
    }
}

// ------------------------------ Comparison -------------------------------- //

impl PartialEq for UniversalNumber {
    fn eq(&self, other: &Self) -> bool {
        self.partial_cmp(other) == Some(Ordering::Equal)
    }
}

impl PartialOrd for UniversalNumber {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self.as_decimal(), other.as_decimal()) {
            (Some(a), Some(b)) => Some(a.cmp(&b)),
            _ => self.as_f64().partial_cmp(&other.as_f64()),
        }
    }
}

/// Hash agrees with `PartialEq` across kinds: the decimal path hashes the
/// normalized decimal (`5`, `5.0`, `5u8` collapse together); the fallback
/// path hashes the f64 bits.
///
/// A value at the very top of the decimal range can have an f64 image that
/// rounds *past* the range (e.g. `Decimal::MAX` rounds up to 2^96) and so
/// compare equal to a float on the f64 fallback path. Such a value must hash
/// on the f64 path as well, or equal values would hash apart.
impl Hash for UniversalNumber {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self.as_decimal() {
            Some(d) if Decimal::from_f64(self.as_f64()).is_some() => d.normalize().hash(state),
            _ => OrderedFloat(self.as_f64()).hash(state),
        }
    }
}

// ------------------------------ Formatting -------------------------------- //

/// Renders the stored kind's natural representation.
impl fmt::Display for UniversalNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int8(v) => write!(f, "{v}"),
            Self::Int16(v) => write!(f, "{v}"),
            Self::Int32(v) => write!(f, "{v}"),
            Self::Int64(v) => write!(f, "{v}"),
            Self::UInt8(v) => write!(f, "{v}"),
            Self::UInt16(v) => write!(f, "{v}"),
            Self::UInt32(v) => write!(f, "{v}"),
            Self::UInt64(v) => write!(f, "{v}"),
            Self::Float32(v) => write!(f, "{v}"),
            Self::Float64(v) => write!(f, "{v}"),
            Self::Decimal128(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
        }
    }
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn hash_of(n: &UniversalNumber) -> u64 {
        let mut h = DefaultHasher::new();
        n.hash(&mut h);
        h.finish()
    }

    #[test]
    fn equal_across_kinds_at_low_and_high_magnitudes() {
        // every pair of the 11 numeric kinds at a matching low and a matching
        // high magnitude
        let low: Vec<UniversalNumber> = vec![
            5i8.into(), 5i16.into(), 5i32.into(), 5i64.into(),
            5u8.into(), 5u16.into(), 5u32.into(), 5u64.into(),
            5.0f32.into(), 5.0f64.into(), Decimal::from(5).into(),
        ];
        let high: Vec<UniversalNumber> = vec![
            100i8.into(), 100i16.into(), 100i32.into(), 100i64.into(),
            100u8.into(), 100u16.into(), 100u32.into(), 100u64.into(),
            100.0f32.into(), 100.0f64.into(), Decimal::from(100).into(),
        ];
        for (a, b) in low.iter().zip(low.iter().cycle().skip(1)) {
            assert_eq!(a.partial_cmp(b), Some(Ordering::Equal), "{a:?} vs {b:?}");
            assert_eq!(hash_of(a), hash_of(b), "{a:?} vs {b:?}");
        }
        for (a, b) in high.iter().zip(high.iter().cycle().skip(3)) {
            assert_eq!(a.partial_cmp(b), Some(Ordering::Equal), "{a:?} vs {b:?}");
        }
        for a in &low {
            for b in &high {
                assert_eq!(a.partial_cmp(b), Some(Ordering::Less), "{a:?} vs {b:?}");
                assert_eq!(b.partial_cmp(a), Some(Ordering::Greater), "{b:?} vs {a:?}");
            }
        }
    }

    #[test]
    fn ordering_matches_mathematics_not_bit_patterns() {
        let low = UniversalNumber::from(-3i32);
        let high = UniversalNumber::from(7u8);
        assert!(low < high);
        assert!(high > low);
        assert!(UniversalNumber::from(2.5f64) < UniversalNumber::from(3u16));
    }

    #[test]
    fn u64_max_vs_i64_min_does_not_misorder() {
        // The classic bug: casting u64::MAX into i64 yields -1.
        let huge = UniversalNumber::from(u64::MAX);
        let tiny = UniversalNumber::from(i64::MIN);
        assert_eq!(huge.partial_cmp(&tiny), Some(Ordering::Greater));
        assert_eq!(tiny.partial_cmp(&huge), Some(Ordering::Less));
        // And u64::MAX survives exactly, no float truncation.
        assert!(UniversalNumber::from(u64::MAX) > UniversalNumber::from(u64::MAX - 1));
    }

    #[test]
    fn i64_precision_not_truncated_through_floats() {
        let a = UniversalNumber::from(i64::MAX);
        let b = UniversalNumber::from(i64::MAX - 1);
        // Both are 2^63-ish; as f64 they collide. The decimal path must not.
        assert!(a > b);
        assert_ne!(a, b);
    }

    #[test]
    fn bools_compare_as_zero_and_one() {
        assert_eq!(UniversalNumber::from(true), UniversalNumber::from(1u8));
        assert_eq!(UniversalNumber::from(false), UniversalNumber::from(0i64));
        assert!(UniversalNumber::from(false) < UniversalNumber::from(true));
    }

    #[test]
    fn decimal_exactness_boundary() {
        // 1e28 still fits the decimal's exact range; 1e29 does not and drops
        // to the f64 fallback. Both must order correctly against integers.
        let inside = UniversalNumber::from(1e28f64);
        let outside = UniversalNumber::from(1e29f64);
        assert!(inside.as_decimal().is_some());
        assert!(outside.as_decimal().is_none());
        assert!(inside < outside);
        assert!(outside > UniversalNumber::from(u64::MAX));
    }

    #[test]
    fn hash_stays_consistent_at_the_decimal_range_edge() {
        // Decimal::MAX is 2^96 - 1; its nearest f64 is 2^96, just past the
        // decimal range. The two compare equal on the f64 fallback path, so
        // they must hash together as well.
        let edge = UniversalNumber::from(Decimal::MAX);
        let float_image = UniversalNumber::from(edge.as_f64());
        assert!(float_image.as_decimal().is_none());
        assert_eq!(edge, float_image);
        assert_eq!(hash_of(&edge), hash_of(&float_image));
        // and the low-magnitude decimal path is untouched
        assert_eq!(
            hash_of(&UniversalNumber::from(Decimal::from(5))),
            hash_of(&UniversalNumber::from(5.0f64))
        );
    }

    #[test]
    fn nan_is_incomparable_but_never_panics() {
        let nan = UniversalNumber::from(f64::NAN);
        let five = UniversalNumber::from(5i32);
        assert_eq!(nan.partial_cmp(&five), None);
        assert_eq!(five.partial_cmp(&nan), None);
        assert_ne!(nan, nan);
        let _ = hash_of(&nan); // fallback hash path, no panic
    }

    #[test]
    fn multiple_of_is_exact() {
        let ten = UniversalNumber::from(10u32);
        assert!(ten.is_multiple_of(&UniversalNumber::from(5i8)));
        assert!(ten.is_multiple_of(&UniversalNumber::from(2.5f64)));
        assert!(!ten.is_multiple_of(&UniversalNumber::from(3i64)));
        assert!(!ten.is_multiple_of(&UniversalNumber::from(0i32)));
        // 0.1 + 0.2 style traps stay exact on the decimal path
        let subject = UniversalNumber::from(Decimal::new(3, 1)); // 0.3
        assert!(subject.is_multiple_of(&UniversalNumber::from(Decimal::new(1, 1))));
    }

    #[test]
    fn display_preserves_the_stored_kind() {
        assert_eq!(UniversalNumber::from(5i32).to_string(), "5");
        assert_eq!(UniversalNumber::from(2.5f64).to_string(), "2.5");
        assert_eq!(UniversalNumber::from(true).to_string(), "true");
        assert_eq!(UniversalNumber::from(Decimal::new(105, 1)).to_string(), "10.5");
    }

    #[test]
    fn json_number_lift_keeps_classification() {
        let v: serde_json::Value = serde_json::json!(18446744073709551615u64);
        let n = v.as_number().unwrap();
        let u = UniversalNumber::from_json_number(n);
        assert!(matches!(u, UniversalNumber::UInt64(_)));
        assert_eq!(u, UniversalNumber::from(u64::MAX));

        let v: serde_json::Value = serde_json::json!(-4);
        let u = UniversalNumber::from_json_number(v.as_number().unwrap());
        assert!(matches!(u, UniversalNumber::Int64(-4)));
    }
}
