//! Payload loading and the frontmatter merge policy
//!
//! The payload is loaded once per run and shared read-only across every
//! file. It may be written either as bare YAML pairs or as a complete
//! frontmatter block wrapped in `---`/`...` markers; the wrapper is
//! stripped before parsing.

use crate::error::{RewriteError, RewriteResult};
use crate::frontmatter::strip_bom;
use serde_yaml::{Mapping, Value};

const UUID_KEY: &str = "uuid";

/// Unwrap a payload that was written as a full frontmatter block.
///
/// Bare YAML text is returned unchanged. A payload that opens with `---`
/// but never closes is rejected, mirroring how note files are treated.
pub fn normalize_payload_text(text: &str) -> RewriteResult<&str> {
    let text = strip_bom(text);
    let Some(first_end) = text.find('\n') else {
        return if text.trim_end_matches('\r') == "---" {
            Err(RewriteError::MissingClosingMarker)
        } else {
            Ok(text)
        };
    };
    if text[..first_end].trim_end_matches('\r') != "---" {
        return Ok(text);
    }

    let interior_start = first_end + 1;
    let mut offset = interior_start;
    for line in text[interior_start..].split_inclusive('\n') {
        let bare = line.trim_end_matches('\n').trim_end_matches('\r');
        if bare == "---" || bare == "..." {
            return Ok(&text[interior_start..offset]);
        }
        offset += line.len();
    }
    Err(RewriteError::MissingClosingMarker)
}

/// Parse normalized payload text into an order-preserving mapping.
pub fn parse_payload(text: &str) -> RewriteResult<Mapping> {
    if text.trim().is_empty() {
        return Ok(Mapping::new());
    }
    let value: Value =
        serde_yaml::from_str(text).map_err(|e| RewriteError::malformed(e.to_string()))?;
    match value {
        Value::Mapping(mapping) => Ok(mapping),
        _ => Err(RewriteError::malformed("payload is not a YAML mapping")),
    }
}

/// Merge a resolved payload with the surviving parts of the existing
/// frontmatter.
///
/// The only key that survives from the existing block is a top-level
/// `uuid` (case-sensitive): when present its value replaces any payload
/// `uuid` at the payload's own position, or is inserted first when the
/// payload has none. Every other pre-existing key is dropped. Returns the
/// final mapping and whether a uuid was preserved.
pub fn merge(resolved: Mapping, existing: Option<&Mapping>) -> (Mapping, bool) {
    let existing_uuid = existing.and_then(|mapping| mapping.get(UUID_KEY)).cloned();

    let Some(existing_uuid) = existing_uuid else {
        return (resolved, false);
    };

    let mut merged = Mapping::with_capacity(resolved.len() + 1);
    if !resolved.contains_key(UUID_KEY) {
        merged.insert(Value::String(UUID_KEY.to_string()), existing_uuid.clone());
    }
    for (key, value) in resolved {
        if key.as_str() == Some(UUID_KEY) {
            merged.insert(key, existing_uuid.clone());
        } else {
            merged.insert(key, value);
        }
    }
    (merged, true)
}
