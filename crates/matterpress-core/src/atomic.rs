//! Atomic file replacement
//!
//! Apply-time writes go through a temporary file in the target's own
//! directory followed by a rename, so the original is either fully
//! replaced or left untouched. The temp file lives in the same directory
//! to keep the rename on one filesystem.

use crate::error::{RewriteError, RewriteResult};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Replace `path` with `content`, atomically.
///
/// The temporary file is flushed and fsynced before the rename; on any
/// failure it is removed (dropped) and the original file is untouched.
pub fn replace_file(path: &Path, content: &str) -> RewriteResult<()> {
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
    let dir = dir.unwrap_or_else(|| Path::new("."));

    let mut tmp = NamedTempFile::new_in(dir)
        .map_err(|e| RewriteError::write_failed(format!("temp file creation: {e}")))?;
    tmp.write_all(content.as_bytes())
        .map_err(|e| RewriteError::write_failed(format!("temp file write: {e}")))?;
    tmp.flush()
        .map_err(|e| RewriteError::write_failed(format!("temp file flush: {e}")))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| RewriteError::write_failed(format!("temp file sync: {e}")))?;
    tmp.persist(path)
        .map_err(|e| RewriteError::write_failed(format!("rename over original: {e}")))?;

    tracing::debug!(path = %path.display(), "replaced file atomically");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("note.md");
        fs::write(&path, "old").unwrap();

        replace_file(&path, "new content").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "new content");

        // No stray temp files left behind.
        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn creates_file_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fresh.md");
        replace_file(&path, "content").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "content");
    }

    #[test]
    fn missing_directory_is_a_write_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope").join("note.md");
        let err = replace_file(&path, "content").unwrap_err();
        assert!(matches!(err, RewriteError::Write(_)));
    }
}
