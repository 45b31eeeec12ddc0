//! RFC 6901 JSON Pointers: parse, escape, format, and tree evaluation.
//!
//! Tokens are held *unescaped* (`~1`/`~0` already resolved); escaping is a
//! formatting concern only. Evaluation walks a borrowed `serde_json::Value`
//! and never mutates it. Fault tolerance is a composable bit-flag policy:
//! strict evaluation raises [`EvaluationError`], tolerant combinations turn
//! the matching failure into a null result instead.

use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use thiserror::Error;

// ------------------------------- Errors ----------------------------------- //

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PointerError {
    #[error("json pointer must start with '/' or be empty: {0:?}")]
    MissingLeadingSlash(String),
    #[error("invalid escape sequence {sequence:?} in token {token:?}")]
    InvalidEscape { token: String, sequence: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvaluationError {
    #[error("member {token:?} not found (token {index} of {pointer})")]
    MissingMember { pointer: String, token: String, index: usize },
    #[error("index {token:?} out of range (token {index} of {pointer})")]
    IndexOutOfRange { pointer: String, token: String, index: usize },
    #[error("{token:?} is not a valid array index (token {index} of {pointer})")]
    InvalidIndex { pointer: String, token: String, index: usize },
    #[error("cannot index into a primitive value (token {index} of {pointer})")]
    PrimitiveIndexed { pointer: String, index: usize },
    #[error("cannot traverse through null (token {index} of {pointer})")]
    NullTraversal { pointer: String, index: usize },
}

// ------------------------------- Options ---------------------------------- //

bitflags! {
    /// Fault-tolerance policy for [`JsonPointer::evaluate`]. Flags compose by
    /// OR; with none set, every failure is an error.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct JsonPointerEvaluationOptions: u8 {
        /// A missing object key yields null instead of erroring.
        const MISSING_MEMBERS_ARE_NULL = 1 << 0;
        /// Indexing into a scalar yields null instead of erroring.
        const PRIMITIVE_MEMBERS_AND_INDICIES_ARE_NULL = 1 << 1;
        /// An object-style key looked up on an array yields null.
        const ARRAY_MEMBERS_ARE_NULL = 1 << 2;
        /// An out-of-range, `-`, or malformed array index yields null.
        const INVALID_INDICIES_ARE_NULL = 1 << 3;
        /// Once any step yields null, skip the remaining tokens and return
        /// null, instead of erroring on traversal through null.
        const NULL_COALESCING = 1 << 4;
    }
}

impl Default for JsonPointerEvaluationOptions {
    fn default() -> Self {
        Self::empty()
    }
}

// ------------------------------- Pointer ---------------------------------- //

/// An ordered sequence of unescaped reference tokens. Zero tokens denotes the
/// whole document and formats as the empty string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct JsonPointer {
    tokens: Vec<String>,
}

impl JsonPointer {
    /// The whole-document pointer.
    pub fn root() -> Self {
        Self::default()
    }

    /// Build from already-unescaped tokens. Tokens may freely contain `~`
    /// and `/`; formatting re-escapes them.
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { tokens: tokens.into_iter().map(Into::into).collect() }
    }

    pub fn parse(text: &str) -> Result<Self, PointerError> {
        if text.is_empty() {
            return Ok(Self::root());
        }
        let Some(rest) = text.strip_prefix('/') else {
            return Err(PointerError::MissingLeadingSlash(text.to_string()));
        };
        let tokens = rest
            .split('/')
            .map(unescape_token)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { tokens })
    }

    pub fn is_root(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Child pointer: this pointer extended by one (unescaped) token.
    pub fn child(&self, token: impl Into<String>) -> Self {
        let mut tokens = self.tokens.clone();
        tokens.push(token.into());
        Self { tokens }
    }

    /// Everything but the last token; the root pointer has no parent.
    pub fn parent(&self) -> Option<Self> {
        if self.tokens.is_empty() {
            return None;
        }
        Some(Self { tokens: self.tokens[..self.tokens.len() - 1].to_vec() })
    }

    // ------------------------------ Evaluate ------------------------------ //

    /// Walk the tokens against a borrowed JSON tree.
    ///
    /// `Ok(Some(node))` is a resolved node, `Ok(None)` is a null produced by
    /// a tolerant option. The empty pointer returns the root unchanged under
    /// every option combination.
    pub fn evaluate<'a>(
        &self,
        root: &'a Value,
        options: JsonPointerEvaluationOptions,
    ) -> Result<Option<&'a Value>, EvaluationError> {
        use JsonPointerEvaluationOptions as Opt;

        let mut current: Option<&'a Value> = Some(root);
        for (index, token) in self.tokens.iter().enumerate() {
            let node = match current {
                Some(node) => node,
                // A previous step already yielded null; only coalescing may
                // traverse past it.
                None => {
                    if options.contains(Opt::NULL_COALESCING) {
                        return Ok(None);
                    }
                    return Err(EvaluationError::NullTraversal {
                        pointer: self.to_string(),
                        index,
                    });
                }
            };

            current = match node {
                Value::Object(map) => match map.get(token) {
                    Some(child) => Some(child),
                    None if options.contains(Opt::MISSING_MEMBERS_ARE_NULL) => None,
                    None => {
                        return Err(EvaluationError::MissingMember {
                            pointer: self.to_string(),
                            token: token.clone(),
                            index,
                        });
                    }
                },
                Value::Array(items) => match parse_array_index(token) {
                    IndexToken::Valid(i) if i < items.len() => Some(&items[i]),
                    IndexToken::Valid(_) | IndexToken::PastEnd => {
                        if options.contains(Opt::INVALID_INDICIES_ARE_NULL) {
                            None
                        } else {
                            return Err(EvaluationError::IndexOutOfRange {
                                pointer: self.to_string(),
                                token: token.clone(),
                                index,
                            });
                        }
                    }
                    IndexToken::NotAnIndex => {
                        if options
                            .intersects(Opt::ARRAY_MEMBERS_ARE_NULL | Opt::INVALID_INDICIES_ARE_NULL)
                        {
                            None
                        } else {
                            return Err(EvaluationError::InvalidIndex {
                                pointer: self.to_string(),
                                token: token.clone(),
                                index,
                            });
                        }
                    }
                },
                // Scalars (incl. literal null nodes) cannot be indexed.
                _ => {
                    if options.contains(Opt::PRIMITIVE_MEMBERS_AND_INDICIES_ARE_NULL) {
                        None
                    } else {
                        return Err(EvaluationError::PrimitiveIndexed {
                            pointer: self.to_string(),
                            index,
                        });
                    }
                }
            };
        }
        Ok(current)
    }

    /// Strict evaluation: no tolerance, a resolved node or an error.
    pub fn evaluate_strict<'a>(&self, root: &'a Value) -> Result<&'a Value, EvaluationError> {
        // Strict options can only yield Some or Err.
        Ok(self
            .evaluate(root, JsonPointerEvaluationOptions::empty())?
            .unwrap_or(&Value::Null))
    }
}

enum IndexToken {
    Valid(usize),
    /// `-`: one past the end. A legal reference target for appenders, never a
    /// readable element.
    PastEnd,
    NotAnIndex,
}

// RFC 6901 array-index grammar: `0` or a digit sequence without a leading
// zero. Anything else (incl. overflow) is not an index.
fn parse_array_index(token: &str) -> IndexToken {
    if token == "-" {
        return IndexToken::PastEnd;
    }
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return IndexToken::NotAnIndex;
    }
    if token.len() > 1 && token.starts_with('0') {
        return IndexToken::NotAnIndex;
    }
    match token.parse::<usize>() {
        Ok(i) => IndexToken::Valid(i),
        Err(_) => IndexToken::NotAnIndex,
    }
}

// ------------------------------ Escaping ---------------------------------- //

// Unescape `~1` → `/`, `~0` → `~`. A single scan resolves the ordering
// hazard: each `~` consumes exactly one following `0`/`1`, so a literal `~1`
// escaped as `~01` never double-translates.
fn unescape_token(raw: &str) -> Result<String, PointerError> {
    if !raw.contains('~') {
        return Ok(raw.to_string());
    }
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '~' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('0') => out.push('~'),
            Some('1') => out.push('/'),
            other => {
                let sequence = match other {
                    Some(x) => format!("~{x}"),
                    None => "~".to_string(),
                };
                return Err(PointerError::InvalidEscape {
                    token: raw.to_string(),
                    sequence,
                });
            }
        }
    }
    Ok(out)
}

// Escape `~` → `~0` first, then `/` → `~1`; the per-char scan applies both in
// one pass without re-reading produced output.
fn escape_token(token: &str) -> String {
    let mut out = String::with_capacity(token.len());
    for c in token.chars() {
        match c {
            '~' => out.push_str("~0"),
            '/' => out.push_str("~1"),
            _ => out.push(c),
        }
    }
    out
}

// ----------------------------- Conversions -------------------------------- //

impl fmt::Display for JsonPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for token in &self.tokens {
            write!(f, "/{}", escape_token(token))?;
        }
        Ok(())
    }
}

impl FromStr for JsonPointer {
    type Err = PointerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for JsonPointer {
    type Error = PointerError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl Serialize for JsonPointer {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for JsonPointer {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    type Opt = JsonPointerEvaluationOptions;

    #[test]
    fn empty_text_is_the_root_pointer() {
        let p = JsonPointer::parse("").unwrap();
        assert!(p.is_root());
        assert_eq!(p.to_string(), "");
        assert_eq!(p, JsonPointer::root());
    }

    #[test]
    fn missing_leading_slash_is_a_format_error() {
        assert!(matches!(
            JsonPointer::parse("a/b"),
            Err(PointerError::MissingLeadingSlash(_))
        ));
    }

    #[test]
    fn empty_tokens_are_legal_and_format_back() {
        // "/" is one empty token; "//" is two.
        let p = JsonPointer::parse("/").unwrap();
        assert_eq!(p.tokens(), &[""]);
        assert_eq!(p.to_string(), "/");
        let p = JsonPointer::parse("//").unwrap();
        assert_eq!(p.len(), 2);
    }

    #[test]
    fn escapes_unescape_in_the_right_order() {
        let p = JsonPointer::parse("/a~1b/~0/~01").unwrap();
        assert_eq!(p.tokens(), &["a/b", "~", "~1"]);
    }

    #[test]
    fn malformed_escapes_are_format_errors() {
        assert!(matches!(
            JsonPointer::parse("/bad~2escape"),
            Err(PointerError::InvalidEscape { .. })
        ));
        // trailing naked tilde
        assert!(matches!(
            JsonPointer::parse("/trailing~"),
            Err(PointerError::InvalidEscape { .. })
        ));
    }

    #[test]
    fn parse_format_round_trips_arbitrary_tokens() {
        let nasty = ["a/b", "~", "~1", "~0", "", "m~n/o", "plain", "-", "0"];
        let p = JsonPointer::from_tokens(nasty);
        let reparsed = JsonPointer::parse(&p.to_string()).unwrap();
        assert_eq!(reparsed, p);
    }

    #[test]
    fn serde_uses_the_string_form() {
        let p = JsonPointer::parse("/a~1b/c").unwrap();
        let text = serde_json::to_string(&p).unwrap();
        assert_eq!(text, "\"/a~1b/c\"");
        let back: JsonPointer = serde_json::from_str(&text).unwrap();
        assert_eq!(back, p);
    }

    #[test]
    fn child_and_parent_walk_the_token_list() {
        let p = JsonPointer::root().child("components").child("schemas");
        assert_eq!(p.to_string(), "/components/schemas");
        assert_eq!(p.parent().unwrap().to_string(), "/components");
        assert!(JsonPointer::root().parent().is_none());
    }

    // --------------------------- evaluation --------------------------- //

    fn doc() -> serde_json::Value {
        json!({
            "a/b": 1,
            "foo6": [10, 20, 30],
            "deep": { "leaf": null, "obj": { "x": true } },
            "scalar": "text"
        })
    }

    #[test]
    fn root_pointer_returns_the_root_under_all_options() {
        let tree = doc();
        for bits in 0..=Opt::all().bits() {
            let options = Opt::from_bits_truncate(bits);
            let got = JsonPointer::root().evaluate(&tree, options).unwrap();
            assert_eq!(got, Some(&tree));
        }
    }

    #[test]
    fn escaped_member_lookup() {
        let tree = doc();
        let p = JsonPointer::parse("/a~1b").unwrap();
        assert_eq!(p.evaluate_strict(&tree).unwrap(), &json!(1));
    }

    #[test]
    fn array_indexing_follows_rfc_grammar() {
        let tree = doc();
        let p = JsonPointer::parse("/foo6/1").unwrap();
        assert_eq!(p.evaluate_strict(&tree).unwrap(), &json!(20));
        // leading zeros are not indices
        let p = JsonPointer::parse("/foo6/01").unwrap();
        assert!(matches!(
            p.evaluate_strict(&tree),
            Err(EvaluationError::InvalidIndex { .. })
        ));
    }

    #[test]
    fn dash_index_errors_strictly_but_nulls_tolerantly() {
        let tree = doc();
        let p = JsonPointer::parse("/foo6/-").unwrap();
        assert!(matches!(
            p.evaluate(&tree, Opt::empty()),
            Err(EvaluationError::IndexOutOfRange { .. })
        ));
        let got = p.evaluate(&tree, Opt::INVALID_INDICIES_ARE_NULL).unwrap();
        assert_eq!(got, None);
    }

    #[test]
    fn out_of_range_index_respects_the_same_flag() {
        let tree = doc();
        let p = JsonPointer::parse("/foo6/99").unwrap();
        assert!(p.evaluate(&tree, Opt::empty()).is_err());
        assert_eq!(p.evaluate(&tree, Opt::INVALID_INDICIES_ARE_NULL).unwrap(), None);
    }

    #[test]
    fn object_key_on_array_is_governed_by_array_members_flag() {
        let tree = doc();
        let p = JsonPointer::parse("/foo6/name").unwrap();
        assert!(matches!(
            p.evaluate(&tree, Opt::empty()),
            Err(EvaluationError::InvalidIndex { .. })
        ));
        assert_eq!(p.evaluate(&tree, Opt::ARRAY_MEMBERS_ARE_NULL).unwrap(), None);
        // INVALID_INDICIES covers the non-numeric case too
        assert_eq!(p.evaluate(&tree, Opt::INVALID_INDICIES_ARE_NULL).unwrap(), None);
    }

    #[test]
    fn missing_member_nulls_only_under_its_flag() {
        let tree = doc();
        let p = JsonPointer::parse("/deep/missing").unwrap();
        assert!(matches!(
            p.evaluate(&tree, Opt::empty()),
            Err(EvaluationError::MissingMember { .. })
        ));
        assert_eq!(p.evaluate(&tree, Opt::MISSING_MEMBERS_ARE_NULL).unwrap(), None);
    }

    #[test]
    fn traversing_through_a_synthesized_null_needs_coalescing() {
        let tree = doc();
        let p = JsonPointer::parse("/deep/missing/further").unwrap();
        // tolerated at the missing step, but the walk continues into null
        assert!(matches!(
            p.evaluate(&tree, Opt::MISSING_MEMBERS_ARE_NULL),
            Err(EvaluationError::NullTraversal { .. })
        ));
        let got = p
            .evaluate(&tree, Opt::MISSING_MEMBERS_ARE_NULL | Opt::NULL_COALESCING)
            .unwrap();
        assert_eq!(got, None);
    }

    #[test]
    fn indexing_into_scalars_is_governed_by_primitive_flag() {
        let tree = doc();
        let p = JsonPointer::parse("/scalar/anything").unwrap();
        assert!(matches!(
            p.evaluate(&tree, Opt::empty()),
            Err(EvaluationError::PrimitiveIndexed { .. })
        ));
        let got = p
            .evaluate(&tree, Opt::PRIMITIVE_MEMBERS_AND_INDICIES_ARE_NULL)
            .unwrap();
        assert_eq!(got, None);
        // a literal null node is a scalar for this purpose
        let p = JsonPointer::parse("/deep/leaf/x").unwrap();
        assert!(p.evaluate(&tree, Opt::empty()).is_err());
    }

    #[test]
    fn resolved_null_nodes_are_returned_as_nodes() {
        let tree = doc();
        let p = JsonPointer::parse("/deep/leaf").unwrap();
        assert_eq!(p.evaluate_strict(&tree).unwrap(), &Value::Null);
    }

    #[test]
    fn deep_mixed_walk() {
        let tree = doc();
        let p = JsonPointer::parse("/deep/obj/x").unwrap();
        assert_eq!(p.evaluate_strict(&tree).unwrap(), &json!(true));
    }
}
