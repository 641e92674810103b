//! Per-note rewrite orchestration
//!
//! Drives one file through parse → resolve → merge → render → classify and
//! reports a structured [`Outcome`]. Every failure is scoped to the file:
//! the outcome carries the reason and the file on disk is untouched.

use crate::atomic;
use crate::error::{RewriteError, RewriteResult};
use crate::frontmatter::{self, detect_newline, strip_bom};
use crate::path_context::PathContext;
use crate::payload::merge;
use crate::token::TokenResolver;
use chrono::NaiveDate;
use serde::Serialize;
use serde_yaml::Mapping;
use std::fs;
use std::path::Path;

const UUID_KEY: &str = "uuid";

/// Terminal classification of one candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Changed,
    Unchanged,
    Skipped,
    Error,
}

/// Per-candidate processing record, one per file (or skipped directory)
#[derive(Debug, Clone, Serialize)]
pub struct Outcome {
    pub path: String,
    pub status: Status,
    pub had_frontmatter: bool,
    pub preserved_uuid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_uuid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_dir: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_date: Option<String>,
}

impl Outcome {
    fn new(path: &Path, status: Status) -> Self {
        Self {
            path: path.display().to_string(),
            status,
            had_frontmatter: false,
            preserved_uuid: false,
            generated_uuid: None,
            reason: None,
            is_dir: None,
            file_date: None,
        }
    }

    fn error(path: &Path, reason: impl Into<String>) -> Self {
        Self {
            reason: Some(reason.into()),
            ..Self::new(path, Status::Error)
        }
    }

    /// Record for a directory pruned by exclude rules
    pub fn skipped_dir(path: &Path) -> Self {
        Self {
            reason: Some("excluded_dir".to_string()),
            is_dir: Some(true),
            ..Self::new(path, Status::Skipped)
        }
    }
}

/// The rendered result of rewriting one note in memory
#[derive(Debug)]
pub struct Rewrite {
    /// Full new file content (frontmatter block plus untouched body)
    pub new_text: String,
    /// Whether the new content differs from the original
    pub changed: bool,
    pub had_frontmatter: bool,
    pub preserved_uuid: bool,
    pub generated_uuid: Option<String>,
    pub file_date: Option<NaiveDate>,
}

/// Applies one payload to many notes, sequentially
pub struct NoteRewriter {
    payload: Mapping,
    year_month_override: Option<(i32, u32)>,
}

impl NoteRewriter {
    pub fn new(payload: Mapping, year_month_override: Option<(i32, u32)>) -> Self {
        Self {
            payload,
            year_month_override,
        }
    }

    /// The shared payload, read-only for the whole run
    pub fn payload(&self) -> &Mapping {
        &self.payload
    }

    /// Rewrite one note's text in memory. No filesystem access.
    pub fn rewrite(&self, path: &Path, text: &str) -> RewriteResult<Rewrite> {
        let clean = strip_bom(text);
        let newline = detect_newline(clean);

        let (block, body) = frontmatter::parse(clean)?;
        let had_frontmatter = block.is_some();
        let existing = block.as_ref().map(|b| &b.mapping);

        // When an existing uuid is about to win the merge, the payload's
        // own uuid entry never takes effect; skip resolving it so no
        // discarded UUID gets generated or reported.
        let uuid_preserved = existing.is_some_and(|m| m.contains_key(UUID_KEY));
        let skip = uuid_preserved.then_some(UUID_KEY);

        let context = PathContext::derive(path, self.year_month_override);
        let resolver = TokenResolver::new(&context);
        let resolved = resolver.resolve_skipping(&self.payload, skip)?;

        let (final_mapping, preserved_uuid) = merge(resolved.mapping, existing);

        let mut yaml = serde_yaml::to_string(&final_mapping)
            .map_err(|e| RewriteError::malformed(e.to_string()))?;
        if newline == "\r\n" {
            yaml = yaml.replace('\n', "\r\n");
        }
        let new_text = format!("---{newline}{yaml}---{newline}{body}");
        let changed = new_text != text;

        tracing::debug!(
            path = %path.display(),
            changed,
            had_frontmatter,
            preserved_uuid,
            "note rewritten in memory"
        );

        Ok(Rewrite {
            new_text,
            changed,
            had_frontmatter,
            preserved_uuid,
            generated_uuid: resolved.generated_uuid,
            file_date: resolved.file_date,
        })
    }

    /// Read, rewrite and (in apply mode) atomically replace one file,
    /// converting every per-file failure into an `error` outcome.
    pub fn process_file(&self, path: &Path, apply: bool) -> Outcome {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => return Outcome::error(path, format!("read failed: {e}")),
        };
        let text = match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(_) => return Outcome::error(path, RewriteError::Encoding.to_string()),
        };

        let rewrite = match self.rewrite(path, &text) {
            Ok(rewrite) => rewrite,
            Err(e) => {
                // A missing closer or bad YAML means a block was opened;
                // reflect that in the record even though parsing failed.
                let mut outcome = Outcome::error(path, e.to_string());
                outcome.had_frontmatter = matches!(
                    e,
                    RewriteError::MissingClosingMarker | RewriteError::MalformedYaml(_)
                );
                return outcome;
            }
        };

        let mut outcome = Outcome::new(path, Status::Unchanged);
        outcome.had_frontmatter = rewrite.had_frontmatter;
        outcome.preserved_uuid = rewrite.preserved_uuid;
        outcome.generated_uuid = rewrite.generated_uuid;
        outcome.file_date = rewrite.file_date.map(|d| d.to_string());

        if !rewrite.changed {
            return outcome;
        }

        outcome.status = Status::Changed;
        if !apply {
            outcome.reason = Some("dry_run".to_string());
            return outcome;
        }

        if let Err(e) = atomic::replace_file(path, &rewrite.new_text) {
            outcome.status = Status::Error;
            outcome.reason = Some(e.to_string());
        }
        outcome
    }
}
