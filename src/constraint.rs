//! Schema-level bound predicates: numeric ranges, count ranges, patterns.
//!
//! Every constraint validates an *optional* subject. Absence is never a range
//! violation by itself; only `PatternConstraint { required: true }` fails on
//! an absent subject. Bound checks promote through [`UniversalNumber`], so a
//! `u64` subject meets an `f64` minimum without misordering.

use bitflags::bitflags;
use regex::{Regex, RegexBuilder};
use thiserror::Error;

use crate::number::UniversalNumber;

bitflags! {
    /// Inclusivity of the two range bounds. A missing flag means the
    /// corresponding bound (when present) is exclusive.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct RangeOptions: u8 {
        const MINIMUM_INCLUSIVE = 1 << 0;
        const MAXIMUM_INCLUSIVE = 1 << 1;
        const INCLUSIVE = Self::MINIMUM_INCLUSIVE.bits() | Self::MAXIMUM_INCLUSIVE.bits();
    }
}

impl Default for RangeOptions {
    fn default() -> Self {
        Self::empty()
    }
}

#[derive(Debug, Error)]
pub enum ConstraintError {
    #[error("invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

// Shared bound check. An incomparable subject (NaN) fails any present bound.
fn bounds_ok<T: PartialOrd>(
    subject: &T,
    minimum: Option<&T>,
    maximum: Option<&T>,
    options: RangeOptions,
) -> bool {
    if let Some(min) = minimum {
        match subject.partial_cmp(min) {
            Some(std::cmp::Ordering::Greater) => {}
            Some(std::cmp::Ordering::Equal)
                if options.contains(RangeOptions::MINIMUM_INCLUSIVE) => {}
            _ => return false,
        }
    }
    if let Some(max) = maximum {
        match subject.partial_cmp(max) {
            Some(std::cmp::Ordering::Less) => {}
            Some(std::cmp::Ordering::Equal)
                if options.contains(RangeOptions::MAXIMUM_INCLUSIVE) => {}
            _ => return false,
        }
    }
    true
}

// A bound flag is meaningless without its bound; clear it so equality and
// hashing see one canonical shape.
fn canonical_options<A, B>(
    minimum: &Option<A>,
    maximum: &Option<B>,
    mut options: RangeOptions,
) -> RangeOptions {
    if minimum.is_none() {
        options.remove(RangeOptions::MINIMUM_INCLUSIVE);
    }
    if maximum.is_none() {
        options.remove(RangeOptions::MAXIMUM_INCLUSIVE);
    }
    options
}

// ---------------------------- NumberConstraint ---------------------------- //

/// `minimum` / `maximum` / `multipleOf` over any numeric kind.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NumberConstraint {
    minimum: Option<UniversalNumber>,
    maximum: Option<UniversalNumber>,
    multiple_of: Option<UniversalNumber>,
    options: RangeOptions,
}

impl NumberConstraint {
    pub fn new(
        minimum: Option<UniversalNumber>,
        maximum: Option<UniversalNumber>,
        options: RangeOptions,
    ) -> Self {
        let options = canonical_options(&minimum, &maximum, options);
        Self { minimum, maximum, multiple_of: None, options }
    }

    pub fn with_multiple_of(mut self, multiple_of: UniversalNumber) -> Self {
        self.multiple_of = Some(multiple_of);
        self
    }

    pub fn minimum(&self) -> Option<&UniversalNumber> {
        self.minimum.as_ref()
    }

    pub fn maximum(&self) -> Option<&UniversalNumber> {
        self.maximum.as_ref()
    }

    pub fn multiple_of(&self) -> Option<&UniversalNumber> {
        self.multiple_of.as_ref()
    }

    pub fn options(&self) -> RangeOptions {
        self.options
    }

    /// True iff either bound is present.
    pub fn has_value(&self) -> bool {
        self.minimum.is_some() || self.maximum.is_some()
    }

    pub fn is_valid(&self, subject: Option<&UniversalNumber>) -> bool {
        let Some(subject) = subject else { return true };
        if !bounds_ok(subject, self.minimum.as_ref(), self.maximum.as_ref(), self.options) {
            return false;
        }
        match &self.multiple_of {
            Some(divisor) => subject.is_multiple_of(divisor),
            None => true,
        }
    }
}

// ---------------------------- IntegerConstraint --------------------------- //

/// Range constraint for integer-typed schema fields. Same bound semantics as
/// [`NumberConstraint`], no `multipleOf`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IntegerConstraint {
    minimum: Option<UniversalNumber>,
    maximum: Option<UniversalNumber>,
    options: RangeOptions,
}

impl IntegerConstraint {
    pub fn new(
        minimum: Option<UniversalNumber>,
        maximum: Option<UniversalNumber>,
        options: RangeOptions,
    ) -> Self {
        let options = canonical_options(&minimum, &maximum, options);
        Self { minimum, maximum, options }
    }

    pub fn minimum(&self) -> Option<&UniversalNumber> {
        self.minimum.as_ref()
    }

    pub fn maximum(&self) -> Option<&UniversalNumber> {
        self.maximum.as_ref()
    }

    pub fn options(&self) -> RangeOptions {
        self.options
    }

    pub fn has_value(&self) -> bool {
        self.minimum.is_some() || self.maximum.is_some()
    }

    pub fn is_valid(&self, subject: Option<&UniversalNumber>) -> bool {
        let Some(subject) = subject else { return true };
        bounds_ok(subject, self.minimum.as_ref(), self.maximum.as_ref(), self.options)
    }
}

// ----------------------------- CountConstraint ---------------------------- //

/// Non-negative count bounds: string lengths, item counts, property counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CountConstraint {
    minimum: Option<u32>,
    maximum: Option<u32>,
    options: RangeOptions,
}

impl CountConstraint {
    pub fn new(minimum: Option<u32>, maximum: Option<u32>, options: RangeOptions) -> Self {
        let options = canonical_options(&minimum, &maximum, options);
        Self { minimum, maximum, options }
    }

    /// Exactly `n`: sugar for `{ minimum: n, maximum: n, INCLUSIVE }`,
    /// value-equal to the spelled-out form.
    pub fn exact(n: u32) -> Self {
        Self::new(Some(n), Some(n), RangeOptions::INCLUSIVE)
    }

    pub fn minimum(&self) -> Option<u32> {
        self.minimum
    }

    pub fn maximum(&self) -> Option<u32> {
        self.maximum
    }

    pub fn options(&self) -> RangeOptions {
        self.options
    }

    pub fn has_value(&self) -> bool {
        self.minimum.is_some() || self.maximum.is_some()
    }

    pub fn is_valid(&self, subject: Option<u32>) -> bool {
        let Some(subject) = subject else { return true };
        bounds_ok(&subject, self.minimum.as_ref(), self.maximum.as_ref(), self.options)
    }
}

// ---------------------------- PatternConstraint --------------------------- //

/// Full-string regex match, case-insensitive. `required` makes an absent
/// subject a failure in its own right.
#[derive(Debug, Clone)]
pub struct PatternConstraint {
    pattern: Regex,
    required: bool,
}

impl PatternConstraint {
    pub fn new(pattern: &str, required: bool) -> Result<Self, ConstraintError> {
        // Anchor explicitly: schema patterns constrain the whole subject, a
        // substring hit is not a match.
        let pattern = RegexBuilder::new(&format!("^(?:{pattern})$"))
            .case_insensitive(true)
            .build()?;
        Ok(Self { pattern, required })
    }

    pub fn required(&self) -> bool {
        self.required
    }

    pub fn is_valid(&self, subject: Option<&str>) -> bool {
        match subject {
            None => !self.required,
            Some(s) => self.pattern.is_match(s),
        }
    }
}

// `Regex` carries no equality of its own; two pattern constraints are equal
// when their source texts and requiredness agree.
impl PartialEq for PatternConstraint {
    fn eq(&self, other: &Self) -> bool {
        self.required == other.required && self.pattern.as_str() == other.pattern.as_str()
    }
}

// ------------------------------- Tests ------------------------------------ //
