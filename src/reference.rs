//! References: a URL and/or a JSON Pointer naming a sub-value elsewhere.
//!
//! The pointer travels in the URI fragment (`doc.json#/components/schemas/Pet`).
//! A reference must actually point somewhere: "the whole current document with
//! no URL" is no reference at all, and a URL that carries its own fragment
//! cannot also take an explicit pointer. Both are rejected at construction, so
//! an invalid `Reference` never exists.

use std::fmt;
use std::str::FromStr;

use percent_encoding::{AsciiSet, CONTROLS, percent_decode_str, utf8_percent_encode};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::pointer::{JsonPointer, PointerError};

// RFC 3986 fragment: encode controls, space, and the characters excluded from
// the fragment production. `%` must round-trip through decode, so it is
// encoded on the way out.
const FRAGMENT_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'#')
    .add(b'%');

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReferenceError {
    #[error("a reference needs a url or a non-empty pointer")]
    Empty,
    #[error("url {url:?} already carries a fragment; an explicit pointer is not allowed")]
    ConflictingFragment { url: String },
    #[error("fragment is not valid pointer syntax: {0}")]
    BadFragment(#[from] PointerError),
    #[error("fragment is not valid percent-encoding: {fragment:?}")]
    BadPercentEncoding { fragment: String },
}

/// `{ url, pointer }`, at least one of them meaningful.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Reference {
    url: Option<String>,
    pointer: JsonPointer,
}

impl Reference {
    /// URL and/or pointer. The URL must not carry its own fragment when a
    /// non-empty pointer is supplied.
    pub fn new(url: Option<&str>, pointer: JsonPointer) -> Result<Self, ReferenceError> {
        match url {
            None => {
                if pointer.is_root() {
                    return Err(ReferenceError::Empty);
                }
                Ok(Self { url: None, pointer })
            }
            Some(url) if url.contains('#') => {
                if !pointer.is_root() {
                    return Err(ReferenceError::ConflictingFragment { url: url.to_string() });
                }
                // Fold the URL's own fragment into the pointer instead of
                // double-encoding it.
                Self::parse_url(url)
            }
            Some(url) => {
                if url.is_empty() && pointer.is_root() {
                    return Err(ReferenceError::Empty);
                }
                // An empty url string is no url; keep one canonical shape.
                let url = (!url.is_empty()).then(|| url.to_string());
                Ok(Self { url, pointer })
            }
        }
    }

    /// Pointer-only reference into the current document; the pointer must be
    /// non-empty.
    pub fn from_pointer(pointer: JsonPointer) -> Result<Self, ReferenceError> {
        Self::new(None, pointer)
    }

    /// URL-only reference (the URL may still carry a fragment of its own).
    pub fn from_url(url: &str) -> Result<Self, ReferenceError> {
        Self::new(Some(url), JsonPointer::root())
    }

    /// Decompose a URI into `{url, pointer}` by extracting the fragment.
    /// `"#"` alone and the empty string denote the whole document and are
    /// rejected, mirroring the constructor invariant.
    pub fn parse_url(uri: &str) -> Result<Self, ReferenceError> {
        let (base, fragment) = match uri.split_once('#') {
            Some((base, fragment)) => (base, Some(fragment)),
            None => (uri, None),
        };
        let pointer = match fragment {
            None | Some("") => JsonPointer::root(),
            Some(raw) => {
                let decoded = percent_decode_str(raw).decode_utf8().map_err(|_| {
                    ReferenceError::BadPercentEncoding { fragment: raw.to_string() }
                })?;
                JsonPointer::parse(&decoded)?
            }
        };
        if base.is_empty() && pointer.is_root() {
            return Err(ReferenceError::Empty);
        }
        let url = (!base.is_empty()).then(|| base.to_string());
        Ok(Self { url, pointer })
    }

    /// Non-throwing variant of [`Reference::parse_url`].
    pub fn try_parse_url(uri: &str) -> Option<Self> {
        Self::parse_url(uri).ok()
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn pointer(&self) -> &JsonPointer {
        &self.pointer
    }

    /// Compose the URI form: url + `#` + escaped pointer. An empty pointer
    /// drops the fragment marker; a missing url yields a fragment-only URI.
    pub fn to_uri(&self) -> String {
        let url = self.url.as_deref().unwrap_or("");
        if self.pointer.is_root() {
            return url.to_string();
        }
        let fragment =
            utf8_percent_encode(&self.pointer.to_string(), FRAGMENT_ENCODE_SET).to_string();
        format!("{url}#{fragment}")
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_uri())
    }
}

impl FromStr for Reference {
    type Err = ReferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_url(s)
    }
}

impl TryFrom<&str> for Reference {
    type Error = ReferenceError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::parse_url(s)
    }
}

impl TryFrom<JsonPointer> for Reference {
    type Error = ReferenceError;

    fn try_from(pointer: JsonPointer) -> Result<Self, Self::Error> {
        Self::from_pointer(pointer)
    }
}

impl Serialize for Reference {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Reference {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse_url(&text).map_err(serde::de::Error::custom)
    }
}

// ------------------------------- Tests ------------------------------------ //
