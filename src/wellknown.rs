//! Preconstructed well-known values: HTTP response keys and the standard
//! `/components/*` roots. Built lazily, immutable for the process lifetime.

use indexmap::IndexMap;
use once_cell::sync::Lazy;

use crate::pointer::JsonPointer;

/// Response-map key for responses that match no listed status code.
pub const DEFAULT_RESPONSE_KEY: &str = "default";

/// Wildcard response-map keys for the five status classes.
pub const STATUS_RANGE_KEYS: [&str; 5] = ["1XX", "2XX", "3XX", "4XX", "5XX"];

/// Status codes that routinely appear as response-map keys, with their reason
/// phrases. Insertion order follows numeric order, preserved by the map.
pub static STATUS_RESPONSE_KEYS: Lazy<IndexMap<u16, &'static str>> = Lazy::new(|| {
    IndexMap::from([
        (200, "OK"),
        (201, "Created"),
        (202, "Accepted"),
        (204, "No Content"),
        (301, "Moved Permanently"),
        (302, "Found"),
        (304, "Not Modified"),
        (400, "Bad Request"),
        (401, "Unauthorized"),
        (403, "Forbidden"),
        (404, "Not Found"),
        (405, "Method Not Allowed"),
        (406, "Not Acceptable"),
        (409, "Conflict"),
        (410, "Gone"),
        (415, "Unsupported Media Type"),
        (422, "Unprocessable Content"),
        (429, "Too Many Requests"),
        (500, "Internal Server Error"),
        (501, "Not Implemented"),
        (502, "Bad Gateway"),
        (503, "Service Unavailable"),
        (504, "Gateway Timeout"),
    ])
});

/// The response-map key for a concrete status code, or the `NXX` range key
/// when the code is not individually well-known.
pub fn response_key(status: u16) -> Option<String> {
    if STATUS_RESPONSE_KEYS.contains_key(&status) {
        return Some(status.to_string());
    }
    match status / 100 {
        class @ 1..=5 => Some(STATUS_RANGE_KEYS[class as usize - 1].to_string()),
        _ => None,
    }
}

/// The reusable-component sections of an OpenAPI document, in specification
/// order, each with its preconstructed pointer.
pub static COMPONENT_SECTIONS: Lazy<IndexMap<&'static str, JsonPointer>> = Lazy::new(|| {
    [
        "schemas",
        "responses",
        "parameters",
        "examples",
        "requestBodies",
        "headers",
        "securitySchemes",
        "links",
        "callbacks",
        "pathItems",
    ]
    .into_iter()
    .map(|section| (section, JsonPointer::root().child("components").child(section)))
    .collect()
});

/// `/components/<section>/<name>`. The name travels as a single token, so
/// names containing `/` or `~` are escaped on format rather than split.
pub fn component_pointer(section: &str, name: &str) -> JsonPointer {
    JsonPointer::root()
        .child("components")
        .child(section)
        .child(name)
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concrete_codes_take_priority_over_range_keys() {
        assert_eq!(response_key(404).as_deref(), Some("404"));
        assert_eq!(response_key(418).as_deref(), Some("4XX"));
        assert_eq!(response_key(299).as_deref(), Some("2XX"));
        assert_eq!(response_key(99), None);
        assert_eq!(response_key(600), None);
    }

    #[test]
    fn section_pointers_are_preconstructed_and_ordered() {
        assert_eq!(
            COMPONENT_SECTIONS.get("schemas").unwrap().to_string(),
            "/components/schemas"
        );
        let first = COMPONENT_SECTIONS.keys().next().unwrap();
        assert_eq!(*first, "schemas");
    }

    #[test]
    fn component_pointer_escapes_awkward_names() {
        let p = component_pointer("schemas", "a/b");
        assert_eq!(p.to_string(), "/components/schemas/a~1b");
        assert_eq!(p.tokens().last().map(String::as_str), Some("a/b"));
    }
}
