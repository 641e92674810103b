//! Frontmatter detection and extraction
//!
//! A frontmatter block is recognized only when the very first line of the
//! file is exactly `---`. The block runs until the first subsequent line
//! that is exactly `---` or `...`; everything after that line is the body
//! and is never inspected or modified. The interior must parse as a single
//! YAML mapping. Top-level key order is preserved (needed by the merge
//! policy); nested values are carried through as opaque YAML.

use crate::error::{RewriteError, RewriteResult};
use serde_yaml::Mapping;

/// A parsed frontmatter block
#[derive(Debug, Clone)]
pub struct FrontmatterBlock {
    /// Top-level mapping, in source order
    pub mapping: Mapping,
    /// Raw interior text between the markers
    pub raw: String,
    /// The line that closed the block (`---` or `...`)
    pub close_marker: String,
}

/// Strip a UTF-8 byte order mark, if present
pub fn strip_bom(text: &str) -> &str {
    text.strip_prefix('\u{feff}').unwrap_or(text)
}

/// Return `\r\n` when the text contains a CRLF, otherwise `\n`
pub fn detect_newline(text: &str) -> &'static str {
    if text.contains("\r\n") {
        "\r\n"
    } else {
        "\n"
    }
}

fn is_open_marker(line: &str) -> bool {
    line.trim_end_matches('\r') == "---"
}

fn is_close_marker(line: &str) -> &str {
    match line.trim_end_matches('\r') {
        "---" => "---",
        "..." => "...",
        _ => "",
    }
}

/// Split `text` into an optional frontmatter block and the body.
///
/// Returns `(None, text)` when the file does not open with a marker line.
/// Fails with [`RewriteError::MissingClosingMarker`] when a block is opened
/// but never closed, and [`RewriteError::MalformedYaml`] when the interior
/// is not a YAML mapping. Callers must leave the file untouched on error.
pub fn parse(text: &str) -> RewriteResult<(Option<FrontmatterBlock>, &str)> {
    let mut lines = text.split_inclusive('\n');

    let Some(first) = lines.next() else {
        return Ok((None, text));
    };
    if !is_open_marker(first.trim_end_matches('\n')) {
        return Ok((None, text));
    }

    let mut offset = first.len();
    let interior_start = offset;

    for line in lines {
        let bare = line.trim_end_matches('\n');
        let marker = is_close_marker(bare);
        if !marker.is_empty() {
            let interior = &text[interior_start..offset];
            let body = &text[offset + line.len()..];
            let mapping = parse_interior(interior)?;
            return Ok((
                Some(FrontmatterBlock {
                    mapping,
                    raw: interior.to_string(),
                    close_marker: marker.to_string(),
                }),
                body,
            ));
        }
        offset += line.len();
    }

    Err(RewriteError::MissingClosingMarker)
}

fn parse_interior(interior: &str) -> RewriteResult<Mapping> {
    if interior.trim().is_empty() {
        return Ok(Mapping::new());
    }

    let value: serde_yaml::Value = serde_yaml::from_str(interior)
        .map_err(|e| RewriteError::malformed(e.to_string()))?;
    match value {
        serde_yaml::Value::Mapping(mapping) => Ok(mapping),
        other => Err(RewriteError::malformed(format!(
            "expected a mapping, found {}",
            yaml_kind(&other)
        ))),
    }
}

fn yaml_kind(value: &serde_yaml::Value) -> &'static str {
    match value {
        serde_yaml::Value::Null => "null",
        serde_yaml::Value::Bool(_) => "a boolean",
        serde_yaml::Value::Number(_) => "a number",
        serde_yaml::Value::String(_) => "a string",
        serde_yaml::Value::Sequence(_) => "a sequence",
        serde_yaml::Value::Mapping(_) => "a mapping",
        serde_yaml::Value::Tagged(_) => "a tagged value",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_frontmatter_returns_full_body() {
        let text = "# Heading\n\nSome body.\n";
        let (block, body) = parse(text).unwrap();
        assert!(block.is_none());
        assert_eq!(body, text);
    }

    #[test]
    fn marker_must_be_first_line() {
        let text = "\n---\ntitle: x\n---\nbody\n";
        let (block, body) = parse(text).unwrap();
        assert!(block.is_none());
        assert_eq!(body, text);
    }

    #[test]
    fn parses_simple_block() {
        let text = "---\ntitle: Hello\nuuid: abc\n---\n# Body\n";
        let (block, body) = parse(text).unwrap();
        let block = block.unwrap();
        assert_eq!(block.mapping.len(), 2);
        assert_eq!(body, "# Body\n");
        assert_eq!(block.close_marker, "---");
        assert_eq!(block.raw, "title: Hello\nuuid: abc\n");
    }

    #[test]
    fn dots_close_marker() {
        let text = "---\ntitle: Hello\n...\nbody\n";
        let (block, body) = parse(text).unwrap();
        assert_eq!(block.unwrap().close_marker, "...");
        assert_eq!(body, "body\n");
    }

    #[test]
    fn preserves_key_order() {
        let text = "---\nzeta: 1\nalpha: 2\nmid: 3\n---\n";
        let (block, _) = parse(text).unwrap();
        let keys: Vec<_> = block
            .unwrap()
            .mapping
            .keys()
            .map(|k| k.as_str().unwrap().to_string())
            .collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn missing_closer_is_an_error() {
        let err = parse("---\nkey: 1\n").unwrap_err();
        assert!(matches!(err, RewriteError::MissingClosingMarker));
    }

    #[test]
    fn non_mapping_interior_is_malformed() {
        let err = parse("---\n- just\n- a list\n---\nbody\n").unwrap_err();
        assert!(matches!(err, RewriteError::MalformedYaml(_)));
    }

    #[test]
    fn empty_interior_is_an_empty_mapping() {
        let (block, body) = parse("---\n---\nbody\n").unwrap();
        assert!(block.unwrap().mapping.is_empty());
        assert_eq!(body, "body\n");
    }

    #[test]
    fn crlf_markers_are_recognized() {
        let text = "---\r\ntitle: x\r\n---\r\nbody\r\n";
        let (block, body) = parse(text).unwrap();
        assert!(block.is_some());
        assert_eq!(body, "body\r\n");
    }

    #[test]
    fn nested_values_are_opaque() {
        let text = "---\nmeta:\n  author: someone\n  tags: [a, b]\n---\n";
        let (block, _) = parse(text).unwrap();
        let block = block.unwrap();
        assert!(block.mapping.get("meta").unwrap().is_mapping());
    }

    #[test]
    fn strip_bom_removes_leading_bom() {
        assert_eq!(strip_bom("\u{feff}---\n"), "---\n");
        assert_eq!(strip_bom("plain"), "plain");
    }

    #[test]
    fn detect_newline_prefers_crlf() {
        assert_eq!(detect_newline("a\r\nb"), "\r\n");
        assert_eq!(detect_newline("a\nb"), "\n");
        assert_eq!(detect_newline("no newline"), "\n");
    }
}
