//! # Matterpress Core
//!
//! Frontmatter rewriting engine for Markdown note vaults: detect and parse
//! the leading YAML block, resolve payload tokens against the file's path,
//! merge under the uuid-preservation policy, render, and atomically apply.
//!
//! Processing is strictly sequential and per-file; every failure is scoped
//! to one candidate and the file on disk is guaranteed untouched on error.

pub mod atomic;
mod error;
pub mod frontmatter;
pub mod path_context;
pub mod payload;
pub mod rewrite;
pub mod token;

pub use error::{RewriteError, RewriteResult};
pub use frontmatter::FrontmatterBlock;
pub use path_context::{parse_year_month, PathContext, YearMonthSource};
pub use rewrite::{NoteRewriter, Outcome, Status};
pub use token::{payload_needs_file_date, Token, TokenResolver};
