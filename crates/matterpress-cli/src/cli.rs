use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::filter::LevelFilter;

/// Log level options for CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// No logging output
    Off,
    /// Error messages only
    Error,
    /// Warnings and errors
    Warn,
    /// Informational messages
    Info,
    /// Debug messages
    Debug,
    /// Trace-level messages (most verbose)
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::OFF,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

/// Directory names pruned by default when walking a vault
pub const DEFAULT_EXCLUDE_DIRS: &[&str] = &[".obsidian", ".trash", ".git", "node_modules"];

#[derive(Parser)]
#[command(name = "mpress")]
#[command(about = "mpress - replace Markdown frontmatter across a vault, preserving uuids")]
#[command(version)]
pub struct Cli {
    /// Target markdown file or directory
    #[arg(long)]
    pub target: PathBuf,

    /// YAML payload file path (bare pairs or a full frontmatter block)
    #[arg(long)]
    pub payload: PathBuf,

    /// Year-month override (YYYY-MM) for {file_date} tokens; wins over
    /// anything found in the path
    #[arg(long, value_name = "YYYY-MM")]
    pub year_month: Option<String>,

    /// Apply in-place changes (default: dry-run)
    #[arg(long)]
    pub apply: bool,

    /// Glob pattern when --target is a directory
    #[arg(long, default_value = "**/*.md")]
    pub glob: String,

    /// Directory name to exclude; repeatable. Adds to the default excludes
    /// unless --no-default-excludes is set
    #[arg(long = "exclude-dir", value_name = "NAME")]
    pub exclude_dir: Vec<String>,

    /// Do not apply default excluded directories (.obsidian, .trash, .git,
    /// node_modules)
    #[arg(long)]
    pub no_default_excludes: bool,

    /// Disable JSONL per-file output
    #[arg(long)]
    pub no_json: bool,

    /// Disable human summary output
    #[arg(long)]
    pub no_summary: bool,

    /// Include per-file details in the summary
    #[arg(long)]
    pub verbose: bool,

    /// Set log level (off, error, warn, info, debug, trace)
    #[arg(short = 'l', long, value_enum, default_value = "off")]
    pub log_level: LogLevel,
}

impl Cli {
    /// Exclude set for this invocation
    pub fn exclude_dirs(&self) -> Vec<String> {
        let mut excludes: Vec<String> = self.exclude_dir.clone();
        if !self.no_default_excludes {
            for name in DEFAULT_EXCLUDE_DIRS {
                if !excludes.iter().any(|e| e == name) {
                    excludes.push((*name).to_string());
                }
            }
        }
        excludes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn minimal_invocation() {
        let cli = parse(&["mpress", "--target", "vault", "--payload", "p.yaml"]);
        assert!(!cli.apply);
        assert_eq!(cli.glob, "**/*.md");
        assert!(cli.year_month.is_none());
    }

    #[test]
    fn default_excludes_extend_user_excludes() {
        let cli = parse(&[
            "mpress",
            "--target",
            "vault",
            "--payload",
            "p.yaml",
            "--exclude-dir",
            "drafts",
            "--exclude-dir",
            ".git",
        ]);
        let excludes = cli.exclude_dirs();
        assert!(excludes.contains(&"drafts".to_string()));
        assert!(excludes.contains(&".obsidian".to_string()));
        assert_eq!(excludes.iter().filter(|e| *e == ".git").count(), 1);
    }

    #[test]
    fn no_default_excludes_flag() {
        let cli = parse(&[
            "mpress",
            "--target",
            "vault",
            "--payload",
            "p.yaml",
            "--no-default-excludes",
        ]);
        assert!(cli.exclude_dirs().is_empty());
    }

    #[test]
    fn target_and_payload_required() {
        assert!(Cli::try_parse_from(["mpress", "--target", "vault"]).is_err());
        assert!(Cli::try_parse_from(["mpress", "--payload", "p.yaml"]).is_err());
    }
}
