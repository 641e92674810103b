//! Token substitution for payload values
//!
//! Payload string values may embed brace-delimited tokens: `{uuidv7}` and
//! `{file_date}` / `{file_date:<fmt>}`. A value is tokenized into a tagged
//! sequence first, then each token is resolved independently. Anything
//! that is not one of the two recognized token kinds stays literal,
//! unmatched braces included.

use crate::error::{RewriteError, RewriteResult};
use crate::path_context::PathContext;
use chrono::NaiveDate;
use serde_yaml::{Mapping, Value};
use std::fmt::Write as _;
use uuid::Uuid;

/// One segment of a tokenized payload value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Literal text, copied through unchanged
    Literal(String),
    /// `{uuidv7}`: a fresh version-7 UUID per occurrence
    UuidV7,
    /// `{file_date}` or `{file_date:<fmt>}`; `None` means ISO `%Y-%m-%d`
    FileDate(Option<String>),
}

/// Split a string value into literal and token segments.
pub fn tokenize(value: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut literal = String::new();
    let mut rest = value;

    while let Some(open) = rest.find('{') {
        literal.push_str(&rest[..open]);
        rest = &rest[open..];

        let Some(close) = rest.find('}') else {
            break;
        };
        match classify(&rest[1..close]) {
            Some(token) => {
                if !literal.is_empty() {
                    tokens.push(Token::Literal(std::mem::take(&mut literal)));
                }
                tokens.push(token);
                rest = &rest[close + 1..];
            }
            None => {
                // Not a recognized token; the brace itself stays literal
                // and scanning resumes right after it.
                literal.push('{');
                rest = &rest[1..];
            }
        }
    }

    literal.push_str(rest);
    if !literal.is_empty() {
        tokens.push(Token::Literal(literal));
    }
    tokens
}

fn classify(inner: &str) -> Option<Token> {
    if inner == "uuidv7" {
        return Some(Token::UuidV7);
    }
    if inner == "file_date" {
        return Some(Token::FileDate(None));
    }
    if let Some(fmt) = inner.strip_prefix("file_date:") {
        if !fmt.is_empty() {
            return Some(Token::FileDate(Some(fmt.to_string())));
        }
    }
    None
}

/// Check whether any string value of a payload carries a date token.
pub fn payload_needs_file_date(payload: &Mapping) -> bool {
    payload.values().any(|value| match value {
        Value::String(s) => tokenize(s)
            .iter()
            .any(|t| matches!(t, Token::FileDate(_))),
        _ => false,
    })
}

/// Result of resolving a payload against one file's context
#[derive(Debug)]
pub struct ResolvedPayload {
    /// Payload with all tokens substituted, order unchanged
    pub mapping: Mapping,
    /// First UUID generated by a `{uuidv7}` token, if any fired
    pub generated_uuid: Option<String>,
    /// Date used by `{file_date}` tokens, if any fired
    pub file_date: Option<NaiveDate>,
}

/// Resolves payload tokens against a single file's [`PathContext`]
pub struct TokenResolver<'a> {
    context: &'a PathContext,
}

impl<'a> TokenResolver<'a> {
    pub fn new(context: &'a PathContext) -> Self {
        Self { context }
    }

    /// Substitute tokens in every top-level string value of `payload`.
    ///
    /// Non-string values pass through untouched. The file date is resolved
    /// at most once per file; each `{uuidv7}` occurrence gets its own
    /// freshly generated UUID.
    pub fn resolve(&self, payload: &Mapping) -> RewriteResult<ResolvedPayload> {
        self.resolve_skipping(payload, None)
    }

    /// Like [`resolve`](Self::resolve), but suppresses UUID generation for
    /// the value of `skip_key`. Used when an existing `uuid` is about to
    /// replace the payload's entry anyway: no discarded UUID gets generated
    /// or reported, while date tokens in that value still must resolve and
    /// still fail the file when they cannot.
    pub fn resolve_skipping(
        &self,
        payload: &Mapping,
        skip_key: Option<&str>,
    ) -> RewriteResult<ResolvedPayload> {
        let mut mapping = Mapping::with_capacity(payload.len());
        let mut generated_uuid = None;
        let mut file_date = None;

        for (key, value) in payload {
            let skipped = skip_key.is_some() && key.as_str() == skip_key;
            let resolved = match value {
                Value::String(s) if skipped => {
                    self.check_date_tokens(s, &mut file_date)?;
                    value.clone()
                }
                Value::String(s) => {
                    Value::String(self.resolve_str(s, &mut generated_uuid, &mut file_date)?)
                }
                other => other.clone(),
            };
            mapping.insert(key.clone(), resolved);
        }

        Ok(ResolvedPayload {
            mapping,
            generated_uuid,
            file_date,
        })
    }

    /// Validate date tokens in a value whose substitution result is going
    /// to be discarded. Resolution failures still surface as errors.
    fn check_date_tokens(
        &self,
        value: &str,
        file_date: &mut Option<NaiveDate>,
    ) -> RewriteResult<()> {
        for token in tokenize(value) {
            if let Token::FileDate(fmt) = token {
                let date = match *file_date {
                    Some(date) => date,
                    None => {
                        let date = self.context.file_date()?;
                        *file_date = Some(date);
                        date
                    }
                };
                render_date(date, fmt.as_deref())?;
            }
        }
        Ok(())
    }

    fn resolve_str(
        &self,
        value: &str,
        generated_uuid: &mut Option<String>,
        file_date: &mut Option<NaiveDate>,
    ) -> RewriteResult<String> {
        let mut out = String::with_capacity(value.len());
        for token in tokenize(value) {
            match token {
                Token::Literal(text) => out.push_str(&text),
                Token::UuidV7 => {
                    let id = Uuid::now_v7().to_string();
                    tracing::debug!(uuid = %id, "generated uuidv7 for token");
                    if generated_uuid.is_none() {
                        *generated_uuid = Some(id.clone());
                    }
                    out.push_str(&id);
                }
                Token::FileDate(fmt) => {
                    let date = match *file_date {
                        Some(date) => date,
                        None => {
                            let date = self.context.file_date()?;
                            *file_date = Some(date);
                            date
                        }
                    };
                    out.push_str(&render_date(date, fmt.as_deref())?);
                }
            }
        }
        Ok(out)
    }
}

fn render_date(date: NaiveDate, fmt: Option<&str>) -> RewriteResult<String> {
    let fmt = fmt.unwrap_or("%Y-%m-%d");
    let mut out = String::new();
    // chrono reports bad format strings through fmt::Error; capture it
    // instead of letting Display panic.
    write!(out, "{}", date.format(fmt))
        .map_err(|_| RewriteError::unresolved_date(format!("invalid date format '{fmt}'")))?;
    Ok(out)
}
