//! Atomic rename.
//! On Windows an existing destination is removed first (rename there does
//! not overwrite); on Unix the destination directory is fsynced after the
//! rename so the new directory entry is durable.

use std::fs;
use std::io;
use std::path::Path;

pub fn try_atomic_move(src: &Path, dst: &Path) -> io::Result<()> {
    #[cfg(windows)]
    if dst.exists() {
        if let Err(e) = fs::remove_file(dst) {
            if e.kind() != io::ErrorKind::NotFound {
                return Err(e);
            }
        }
    }

    fs::rename(src, dst)?;

    #[cfg(unix)]
    if let Some(parent) = dst.parent() {
        // A failed directory fsync must not turn a completed rename into an
        // error.
        let _ = super::util::fsync_dir(parent);
    }

    Ok(())
}
