use anyhow::{bail, Context, Result};
use clap::Parser;
use std::fs;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

use matterpress_cli::{cli::Cli, output, walker};
use matterpress_core::{
    path_context::year_month_from_segments, payload, payload_needs_file_date, parse_year_month,
    NoteRewriter, Outcome, Status,
};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level: LevelFilter = cli.log_level.into();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(default_level.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("mpress: error: {e:#}");
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let payload_text = fs::read_to_string(&cli.payload)
        .with_context(|| format!("failed to read payload: {}", cli.payload.display()))?;
    let payload_text = payload::normalize_payload_text(&payload_text)
        .map_err(|e| anyhow::anyhow!("invalid payload: {e}"))?;
    let payload_mapping = payload::parse_payload(payload_text)
        .map_err(|e| anyhow::anyhow!("invalid payload: {e}"))?;

    let year_month = match &cli.year_month {
        Some(value) => Some(
            parse_year_month(value)
                .with_context(|| format!("invalid --year-month '{value}'; expected YYYY-MM"))?,
        ),
        None => None,
    };

    if !cli.target.exists() {
        bail!("target must be a file or directory: {}", cli.target.display());
    }

    let candidates = walker::collect(&cli.target, &cli.glob, &cli.exclude_dirs())?;
    debug!(
        files = candidates.files.len(),
        skipped_dirs = candidates.skipped_dirs.len(),
        "collected candidates"
    );

    // When date tokens are in play but nothing can resolve them, fail the
    // whole run up front instead of producing one error per file.
    if payload_needs_file_date(&payload_mapping) && year_month.is_none() {
        let any_resolvable = candidates.files.iter().any(|path| {
            year_month_from_segments(path.iter().filter_map(|s| s.to_str())).is_some()
        });
        if !any_resolvable {
            bail!(
                "file_date token present but year-month not found in any path; \
                 provide --year-month YYYY-MM"
            );
        }
    }

    let skipped_dirs: Vec<Outcome> = candidates
        .skipped_dirs
        .iter()
        .map(|path| Outcome::skipped_dir(path))
        .collect();
    if !cli.no_json {
        for record in &skipped_dirs {
            output::emit_record(record)?;
        }
    }

    let rewriter = NoteRewriter::new(payload_mapping, year_month);
    let mut records = Vec::with_capacity(candidates.files.len());
    for path in &candidates.files {
        let outcome = rewriter.process_file(path, cli.apply);
        if !cli.no_json {
            output::emit_record(&outcome)?;
        }
        records.push(outcome);
    }

    if !cli.no_summary {
        output::print_summary(&records, &skipped_dirs, cli.verbose, cli.apply);
    }

    let had_errors = records.iter().any(|r| r.status == Status::Error);
    Ok(ExitCode::from(if had_errors { 2 } else { 0 }))
}
