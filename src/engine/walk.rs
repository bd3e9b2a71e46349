//! Deterministic source-tree enumeration.
//! Files only; per-directory lexicographic ordering so the full traversal
//! order is reproducible across runs on an unchanged tree.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::errors::EngineError;

/// One discovered file. Created by the walker, read-only thereafter.
/// Timestamps are intentionally absent: the metadata resolver reads them
/// lazily so files that end up skipped cost no extra stat calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub absolute_path: PathBuf,
    pub relative_path: PathBuf,
    pub size_bytes: u64,
}

/// Enumerate every file under `root` in lexicographic relative-path order.
///
/// Symlinks are never followed into directories; a symlink whose target is a
/// regular file becomes an entry at the link path. A failure to enumerate a
/// subtree records a warning and skips it; a failure on the root itself is
/// fatal and returns before any work begins.
pub fn walk(root: &Path) -> Result<(Vec<FileEntry>, Vec<String>), EngineError> {
    let root_meta = fs::metadata(root).map_err(|e| EngineError::Walk {
        root: root.to_path_buf(),
        source: e,
    })?;
    if !root_meta.is_dir() {
        return Err(EngineError::SourceNotADirectory(root.to_path_buf()));
    }
    // Readability probe so a permission failure on the root aborts the run
    // instead of degrading into a subtree warning.
    fs::read_dir(root).map_err(|e| EngineError::Walk {
        root: root.to_path_buf(),
        source: e,
    })?;

    let mut entries = Vec::new();
    let mut warnings = Vec::new();

    for item in WalkDir::new(root)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name()
    {
        let item = match item {
            Ok(item) => item,
            Err(e) => {
                let msg = format!("skipping unreadable subtree: {e}");
                warn!(error = %e, "skipping unreadable subtree");
                warnings.push(msg);
                continue;
            }
        };

        let ftype = item.file_type();
        let size = if ftype.is_file() {
            match item.metadata() {
                Ok(meta) => meta.len(),
                Err(e) => {
                    let msg = format!("skipping {}: {e}", item.path().display());
                    warn!(path = %item.path().display(), error = %e, "skipping entry");
                    warnings.push(msg);
                    continue;
                }
            }
        } else if ftype.is_symlink() {
            // A link to a regular file counts as a file at the link path;
            // links to directories (or broken links) are skipped.
            match fs::metadata(item.path()) {
                Ok(target) if target.is_file() => target.len(),
                _ => continue,
            }
        } else {
            continue;
        };

        let Ok(relative) = item.path().strip_prefix(root) else {
            continue;
        };
        entries.push(FileEntry {
            absolute_path: item.path().to_path_buf(),
            relative_path: relative.to_path_buf(),
            size_bytes: size,
        });
    }

    debug!(root = %root.display(), count = entries.len(), "walk complete");
    Ok((entries, warnings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    fn touch(path: &Path, contents: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        let mut f = File::create(path).unwrap();
        write!(f, "{contents}").unwrap();
    }

    #[test]
    fn traversal_is_lexicographic_over_relative_paths() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("c.txt"), "c");
        touch(&dir.path().join("b/inner.txt"), "i");
        touch(&dir.path().join("a.txt"), "a");

        let (entries, warnings) = walk(dir.path()).unwrap();
        assert!(warnings.is_empty());
        let rels: Vec<_> = entries
            .iter()
            .map(|e| e.relative_path.to_string_lossy().into_owned())
            .collect();
        assert_eq!(rels, ["a.txt", "b/inner.txt", "c.txt"]);
    }

    #[test]
    fn two_walks_of_unchanged_tree_are_identical() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("z/1.txt"), "1");
        touch(&dir.path().join("y.txt"), "y");
        touch(&dir.path().join("z/0.txt"), "0");

        let (first, _) = walk(dir.path()).unwrap();
        let (second, _) = walk(dir.path()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn directories_never_become_entries() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("empty/nested")).unwrap();
        touch(&dir.path().join("only.txt"), "x");

        let (entries, _) = walk(dir.path()).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].relative_path, PathBuf::from("only.txt"));
    }

    #[test]
    fn missing_root_is_fatal() {
        let dir = tempdir().unwrap();
        let gone = dir.path().join("nope");
        assert!(matches!(walk(&gone), Err(EngineError::Walk { .. })));
    }

    #[test]
    fn file_root_is_fatal() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("plain.txt");
        touch(&file, "x");
        assert!(matches!(
            walk(&file),
            Err(EngineError::SourceNotADirectory(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn symlink_to_file_is_an_entry_at_the_link_path() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("real.txt"), "data");
        std::os::unix::fs::symlink(dir.path().join("real.txt"), dir.path().join("link.txt"))
            .unwrap();

        let (entries, _) = walk(dir.path()).unwrap();
        let rels: Vec<_> = entries
            .iter()
            .map(|e| e.relative_path.to_string_lossy().into_owned())
            .collect();
        assert_eq!(rels, ["link.txt", "real.txt"]);
    }

    #[cfg(unix)]
    #[test]
    fn symlink_to_directory_is_not_followed() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("sub/inside.txt"), "x");
        std::os::unix::fs::symlink(dir.path().join("sub"), dir.path().join("alias")).unwrap();

        let (entries, _) = walk(dir.path()).unwrap();
        let rels: Vec<_> = entries
            .iter()
            .map(|e| e.relative_path.to_string_lossy().into_owned())
            .collect();
        assert_eq!(rels, ["sub/inside.txt"]);
    }
}
