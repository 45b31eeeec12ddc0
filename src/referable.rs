//! Value-or-reference wrapper used by every document-model field that the
//! OpenAPI specification allows to be inline or `$ref`'d.

use std::fmt;
use std::str::FromStr;

use crate::pointer::JsonPointer;
use crate::reference::{Reference, ReferenceError};

/// Exactly one tag is active; `Empty` is the default for absent fields.
#[derive(Debug, Clone, PartialEq)]
pub enum Referable<T> {
    Value(T),
    Reference(Reference),
    Empty,
}

impl<T> Default for Referable<T> {
    fn default() -> Self {
        Self::Empty
    }
}

impl<T> Referable<T> {
    pub fn value(value: T) -> Self {
        Self::Value(value)
    }

    pub fn reference(reference: Reference) -> Self {
        Self::Reference(reference)
    }

    /// Pointer-tagged construction; fails on the empty pointer, which does
    /// not denote a reference.
    pub fn from_pointer(pointer: JsonPointer) -> Result<Self, ReferenceError> {
        Reference::from_pointer(pointer).map(Self::Reference)
    }

    /// URL-tagged construction; the URL may carry a pointer fragment.
    pub fn from_url(url: &str) -> Result<Self, ReferenceError> {
        Reference::from_url(url).map(Self::Reference)
    }

    pub fn is_value(&self) -> bool {
        matches!(self, Self::Value(_))
    }

    pub fn is_reference(&self) -> bool {
        matches!(self, Self::Reference(_))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    pub fn has_value(&self) -> bool {
        self.is_value() || self.is_reference()
    }

    pub fn as_value(&self) -> Option<&T> {
        match self {
            Self::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_reference(&self) -> Option<&Reference> {
        match self {
            Self::Reference(r) => Some(r),
            _ => None,
        }
    }

    /// Map the inline value, leaving references and emptiness untouched.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Referable<U> {
        match self {
            Self::Value(v) => Referable::Value(f(v)),
            Self::Reference(r) => Referable::Reference(r),
            Self::Empty => Referable::Empty,
        }
    }
}

impl<T> From<Reference> for Referable<T> {
    fn from(reference: Reference) -> Self {
        Self::Reference(reference)
    }
}

impl<T> TryFrom<JsonPointer> for Referable<T> {
    type Error = ReferenceError;

    fn try_from(pointer: JsonPointer) -> Result<Self, Self::Error> {
        Self::from_pointer(pointer)
    }
}

/// String construction goes through the reference grammar: a URI with an
/// optional pointer fragment.
impl<T> TryFrom<&str> for Referable<T> {
    type Error = ReferenceError;

    fn try_from(text: &str) -> Result<Self, Self::Error> {
        Reference::parse_url(text).map(Self::Reference)
    }
}

impl<T> FromStr for Referable<T> {
    type Err = ReferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s)
    }
}

/// URI form when referencing, the value's own form when inline, empty string
/// when empty.
impl<T: fmt::Display> fmt::Display for Referable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => v.fmt(f),
            Self::Reference(r) => r.fmt(f),
            Self::Empty => Ok(()),
        }
    }
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use crate::number::UniversalNumber;

    #[test]
    fn string_construction_parses_as_a_reference() {
        let r: Referable<String> = "#/components/schemas/Pet".try_into().unwrap();
        assert!(r.is_reference());
        assert!(r.has_value());
        assert!(!r.is_value());
        assert_eq!(
            r.as_reference().unwrap().pointer().tokens(),
            &["components", "schemas", "Pet"]
        );
    }

    #[test]
    fn bare_hash_is_not_a_referable() {
        assert!(Referable::<String>::try_from("#").is_err());
        assert!(Referable::<String>::from_pointer(JsonPointer::root()).is_err());
    }

    #[test]
    fn tags_compare_before_payloads() {
        let inline = Referable::value("Pet".to_string());
        let by_ref: Referable<String> = "#/components/schemas/Pet".try_into().unwrap();
        let empty = Referable::<String>::Empty;
        assert_ne!(inline, by_ref);
        assert_ne!(inline, empty);
        assert_ne!(by_ref, empty);
        assert_eq!(empty, Referable::<String>::default());
    }

    #[test]
    fn equal_payloads_compare_equal() {
        let a: Referable<String> = "pets.json#/a".try_into().unwrap();
        let b: Referable<String> = "pets.json#/a".try_into().unwrap();
        assert_eq!(a, b);
        assert_eq!(Referable::value(5u32), Referable::value(5u32));
        assert_ne!(Referable::value(5u32), Referable::value(6u32));
    }

    #[test]
    fn display_follows_the_active_tag() {
        let inline = Referable::value(UniversalNumber::from(42i32));
        assert_eq!(inline.to_string(), "42");
        let by_ref: Referable<UniversalNumber> = "#/answer".try_into().unwrap();
        assert_eq!(by_ref.to_string(), "#/answer");
        assert_eq!(Referable::<UniversalNumber>::Empty.to_string(), "");
    }

    #[test]
    fn map_touches_only_the_inline_value() {
        let inline = Referable::value(2u32).map(|n| n * 2);
        assert_eq!(inline, Referable::value(4u32));
        let by_ref: Referable<u32> = "#/x".try_into().unwrap();
        let mapped = by_ref.clone().map(|n| n * 2);
        assert_eq!(mapped, by_ref);
        assert_eq!(Referable::<u32>::Empty.map(|n| n * 2), Referable::Empty);
    }
}
