//! Root validation.
//! Verifies the source tree is readable and the target root is writable
//! before a run starts, and that the two roots are disjoint.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tracing::{debug, info};

/// Validate the source/target pair for a run. Ensures the target directory
/// exists afterwards; returns an error before any other work otherwise.
pub fn validate_roots(source_root: &Path, target_root: &Path) -> Result<()> {
    // 1) Source root: must exist, be a directory, and be readable.
    if !source_root.exists() {
        bail!("source root does not exist: {}", source_root.display());
    }
    if !source_root.is_dir() {
        bail!("source root is not a directory: {}", source_root.display());
    }
    fs::read_dir(source_root).with_context(|| {
        format!(
            "cannot read source root '{}'; check permissions",
            source_root.display()
        )
    })?;
    debug!("source root readable: {}", source_root.display());

    // 2) Target root: must be a directory; create if missing; must be writable.
    if target_root.exists() && !target_root.is_dir() {
        bail!(
            "target root exists but isn't a directory: {}",
            target_root.display()
        );
    }
    if !target_root.exists() {
        fs::create_dir_all(target_root).with_context(|| {
            format!("failed to create target root '{}'", target_root.display())
        })?;
        info!("Created target root: {}", target_root.display());
    }
    writable_probe(target_root).with_context(|| {
        format!(
            "cannot write to target root '{}'; check permissions",
            target_root.display()
        )
    })?;
    debug!("target root writable: {}", target_root.display());

    // 3) Resolve symlinks and ensure the roots are disjoint (neither
    //    contains the other).
    let src_real = canonical_or_self(source_root);
    let tgt_real = canonical_or_self(target_root);
    if src_real == tgt_real {
        bail!(
            "source and target root resolve to the same path: '{}'",
            src_real.display()
        );
    }
    if src_real.starts_with(&tgt_real) {
        bail!(
            "source root '{}' must not be inside target root '{}'",
            src_real.display(),
            tgt_real.display()
        );
    }
    if tgt_real.starts_with(&src_real) {
        bail!(
            "target root '{}' must not be inside source root '{}'",
            tgt_real.display(),
            src_real.display()
        );
    }

    info!(
        "Roots validated: source='{}' target='{}'",
        source_root.display(),
        target_root.display()
    );
    Ok(())
}

/// dunce avoids verbatim `\\?\` paths on Windows, which would defeat the
/// prefix comparisons above.
fn canonical_or_self(path: &Path) -> PathBuf {
    dunce::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Non-destructive writability check: create and remove a probe file.
fn writable_probe(dir: &Path) -> std::io::Result<()> {
    let probe = dir.join(format!(".pattern_move_probe_{}.tmp", std::process::id()));
    fs::OpenOptions::new()
        .create_new(true)
        .write(true)
        .open(&probe)?;
    fs::remove_file(&probe)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn disjoint_roots_validate() {
        let src = tempdir().unwrap();
        let tgt = tempdir().unwrap();
        validate_roots(src.path(), tgt.path()).unwrap();
    }

    #[test]
    fn target_is_created_when_missing() {
        let src = tempdir().unwrap();
        let base = tempdir().unwrap();
        let tgt = base.path().join("brand/new");
        validate_roots(src.path(), &tgt).unwrap();
        assert!(tgt.is_dir());
    }

    #[test]
    fn identical_roots_are_rejected() {
        let dir = tempdir().unwrap();
        assert!(validate_roots(dir.path(), dir.path()).is_err());
    }

    #[test]
    fn nested_roots_are_rejected() {
        let dir = tempdir().unwrap();
        let inner = dir.path().join("inner");
        fs::create_dir_all(&inner).unwrap();
        assert!(validate_roots(dir.path(), &inner).is_err());
        assert!(validate_roots(&inner, dir.path()).is_err());
    }

    #[test]
    fn missing_source_is_rejected() {
        let dir = tempdir().unwrap();
        let tgt = tempdir().unwrap();
        assert!(validate_roots(&dir.path().join("gone"), tgt.path()).is_err());
    }
}
