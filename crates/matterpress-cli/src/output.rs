//! Run output: JSONL records on stdout, human summary on stderr

use anyhow::Result;
use matterpress_core::{Outcome, Status};

/// Print one outcome as a single JSON line on stdout.
pub fn emit_record(outcome: &Outcome) -> Result<()> {
    println!("{}", serde_json::to_string(outcome)?);
    Ok(())
}

/// Print the run summary on stderr.
///
/// `records` holds per-file outcomes; pruned directories are counted
/// separately so "scanned" keeps meaning "files considered".
pub fn print_summary(records: &[Outcome], skipped_dirs: &[Outcome], verbose: bool, apply: bool) {
    let count = |status: Status| records.iter().filter(|r| r.status == status).count();
    let mut lines = vec![
        format!("mode: {}", if apply { "apply" } else { "dry-run" }),
        format!("scanned: {}", records.len()),
        format!("changed: {}", count(Status::Changed)),
        format!("unchanged: {}", count(Status::Unchanged)),
        format!("skipped: {}", skipped_dirs.len()),
        format!("errors: {}", count(Status::Error)),
    ];

    if verbose {
        for record in records.iter().chain(skipped_dirs) {
            let reason = record
                .reason
                .as_deref()
                .map(|r| format!(" ({r})"))
                .unwrap_or_default();
            lines.push(format!("{}: {}{}", status_label(record.status), record.path, reason));
        }
    }

    eprintln!("{}", lines.join("\n"));
}

fn status_label(status: Status) -> &'static str {
    match status {
        Status::Changed => "changed",
        Status::Unchanged => "unchanged",
        Status::Skipped => "skipped",
        Status::Error => "error",
    }
}
