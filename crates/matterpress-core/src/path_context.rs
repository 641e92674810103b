//! Per-file date inputs derived from the path
//!
//! Date tokens need two pieces of information: a day number taken from the
//! leading digits of the filename stem (`03_monday.md` → 3) and a
//! year-month taken either from a CLI override or from the path itself.
//! Both derivations are pure functions over path data so they can be
//! tested without touching the filesystem.

use crate::error::{RewriteError, RewriteResult};
use chrono::NaiveDate;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

static DAY_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})(?:\b|_)").unwrap());
static YEAR_MONTH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{4})[-_](\d{2})").unwrap());
static YEAR_MONTH_FLAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})[-_](\d{2})$").unwrap());

/// Where a resolved year-month came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YearMonthSource {
    /// Matched in a path segment
    Path,
    /// Supplied via `--year-month`
    CliOverride,
    /// Not resolvable
    None,
}

/// Read-only per-file context for date token resolution
#[derive(Debug, Clone)]
pub struct PathContext {
    day: Option<u32>,
    year_month: Option<(i32, u32)>,
    source: YearMonthSource,
}

impl PathContext {
    /// Derive the context for one file.
    ///
    /// An explicit override wins over anything found in the path; when no
    /// override is supplied the path segments are scanned root-to-file and
    /// the last `YYYY-MM` / `YYYY_MM` match is used.
    pub fn derive(path: &Path, year_month_override: Option<(i32, u32)>) -> Self {
        let day = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .and_then(day_prefix);

        let (year_month, source) = match year_month_override {
            Some(ym) => (Some(ym), YearMonthSource::CliOverride),
            None => match year_month_from_segments(
                path.iter().filter_map(|segment| segment.to_str()),
            ) {
                Some(ym) => (Some(ym), YearMonthSource::Path),
                None => (None, YearMonthSource::None),
            },
        };

        Self {
            day,
            year_month,
            source,
        }
    }

    /// Day number from the filename stem, if the stem has one
    pub fn day(&self) -> Option<u32> {
        self.day
    }

    /// Resolved year-month, if any
    pub fn year_month(&self) -> Option<(i32, u32)> {
        self.year_month
    }

    /// Where the year-month came from
    pub fn source(&self) -> YearMonthSource {
        self.source
    }

    /// Resolve the full date for this file, or explain why it cannot be.
    pub fn file_date(&self) -> RewriteResult<NaiveDate> {
        let day = self
            .day
            .ok_or_else(|| RewriteError::unresolved_date("filename has no leading day number"))?;
        let (year, month) = self.year_month.ok_or_else(|| {
            RewriteError::unresolved_date("year-month not found in path and no override given")
        })?;
        NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
            RewriteError::unresolved_date(format!(
                "{year:04}-{month:02}-{day:02} is not a valid date"
            ))
        })
    }
}

/// Leading day number of a filename stem (`03_monday` → 3, `4.tuesday` → 4)
pub fn day_prefix(stem: &str) -> Option<u32> {
    DAY_PREFIX_RE
        .captures(stem)
        .and_then(|caps| caps[1].parse().ok())
}

/// Last `YYYY-MM` / `YYYY_MM` match over an ordered sequence of path
/// segments; deeper segments win. Months outside 1..=12 are rejected.
pub fn year_month_from_segments<'a>(
    segments: impl Iterator<Item = &'a str>,
) -> Option<(i32, u32)> {
    let mut found = None;
    for segment in segments {
        for caps in YEAR_MONTH_RE.captures_iter(segment) {
            let year: i32 = caps[1].parse().ok()?;
            let month: u32 = caps[2].parse().ok()?;
            if (1..=12).contains(&month) {
                found = Some((year, month));
            }
        }
    }
    found
}

/// Parse a `--year-month` flag value (`YYYY-MM` or `YYYY_MM`)
pub fn parse_year_month(value: &str) -> Option<(i32, u32)> {
    let caps = YEAR_MONTH_FLAG_RE.captures(value.trim())?;
    let year: i32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    if (1..=12).contains(&month) {
        Some((year, month))
    } else {
        None
    }
}
