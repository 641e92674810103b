//! Candidate collection: walk the target, prune excluded directories,
//! match files against the glob.
//!
//! Excluded directories are pruned during the walk (a `node_modules` tree
//! is never descended into) but still reported, so the output stream can
//! carry one `skipped` record per pruned directory.

use anyhow::{Context, Result};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Everything the walk produced, both sorted by path
#[derive(Debug, Default)]
pub struct Candidates {
    pub files: Vec<PathBuf>,
    pub skipped_dirs: Vec<PathBuf>,
}

fn build_matcher(pattern: &str) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    let normalized = pattern.replace('\\', "/");

    // `*` must not cross directory boundaries; `**` still does.
    builder.add(
        GlobBuilder::new(&normalized)
            .literal_separator(true)
            .build()
            .with_context(|| format!("invalid glob pattern: {pattern}"))?,
    );
    Ok(builder.build()?)
}

/// Collect candidate files under `target`.
///
/// A file target is returned as-is without glob filtering. For a directory
/// target, files are matched against `pattern` relative to the target;
/// directories whose name is in `exclude_dirs` are pruned and reported.
pub fn collect(target: &Path, pattern: &str, exclude_dirs: &[String]) -> Result<Candidates> {
    if target.is_file() {
        return Ok(Candidates {
            files: vec![target.to_path_buf()],
            skipped_dirs: Vec::new(),
        });
    }

    let matcher = build_matcher(pattern)?;
    let mut candidates = Candidates::default();

    let mut walker = WalkDir::new(target).into_iter();
    while let Some(entry) = walker.next() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(error = %e, "skipping unreadable walk entry");
                continue;
            }
        };

        if entry.file_type().is_dir() {
            let excluded = entry.depth() > 0
                && entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| exclude_dirs.iter().any(|d| d == name));
            if excluded {
                candidates.skipped_dirs.push(entry.into_path());
                walker.skip_current_dir();
            }
            continue;
        }
        if !entry.file_type().is_file() {
            continue;
        }

        let rel = entry
            .path()
            .strip_prefix(target)
            .expect("walked path is under target");
        if matcher.is_match(rel) {
            candidates.files.push(entry.into_path());
        }
    }

    candidates.files.sort();
    candidates.skipped_dirs.sort();
    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn make_vault(files: &[&str]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for rel in files {
            let path = dir.path().join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, "body\n").unwrap();
        }
        dir
    }

    fn rel_files(candidates: &Candidates, root: &Path) -> Vec<String> {
        candidates
            .files
            .iter()
            .map(|p| {
                p.strip_prefix(root)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect()
    }

    #[test]
    fn recursive_default_pattern() {
        let vault = make_vault(&["a.md", "sub/b.md", "sub/deep/c.md", "sub/d.txt"]);
        let candidates = collect(vault.path(), "**/*.md", &[]).unwrap();
        assert_eq!(
            rel_files(&candidates, vault.path()),
            vec!["a.md", "sub/b.md", "sub/deep/c.md"]
        );
    }

    #[test]
    fn basename_pattern_is_root_only() {
        let vault = make_vault(&["a.md", "sub/b.md"]);
        let candidates = collect(vault.path(), "*.md", &[]).unwrap();
        assert_eq!(rel_files(&candidates, vault.path()), vec!["a.md"]);
    }

    #[test]
    fn excluded_dirs_pruned_and_reported() {
        let vault = make_vault(&[
            "a.md",
            ".obsidian/config.md",
            "node_modules/pkg/readme.md",
            "keep/b.md",
        ]);
        let excludes = vec![".obsidian".to_string(), "node_modules".to_string()];
        let candidates = collect(vault.path(), "**/*.md", &excludes).unwrap();

        assert_eq!(rel_files(&candidates, vault.path()), vec!["a.md", "keep/b.md"]);
        let skipped: Vec<_> = candidates
            .skipped_dirs
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(skipped, vec![".obsidian", "node_modules"]);
    }

    #[test]
    fn file_target_bypasses_glob() {
        let vault = make_vault(&["note.txt"]);
        let file = vault.path().join("note.txt");
        let candidates = collect(&file, "**/*.md", &[]).unwrap();
        assert_eq!(candidates.files, vec![file]);
    }

    #[test]
    fn subdirectory_pattern() {
        let vault = make_vault(&["journal/2025-12/03_monday.md", "journal/scratch.md", "a.md"]);
        let candidates = collect(vault.path(), "journal/**/*.md", &[]).unwrap();
        assert_eq!(
            rel_files(&candidates, vault.path()),
            vec!["journal/2025-12/03_monday.md", "journal/scratch.md"]
        );
    }

    #[test]
    fn invalid_pattern_is_an_error() {
        let vault = make_vault(&["a.md"]);
        assert!(collect(vault.path(), "a{b", &[]).is_err());
    }
}
