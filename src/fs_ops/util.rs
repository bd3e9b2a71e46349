use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

pub(super) fn unique_temp_path(dst_dir: &Path) -> PathBuf {
    let pid = std::process::id();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    dst_dir.join(format!(".pattern_move.{pid}.{nanos}.tmp"))
}

/// Detect EXDEV / ERROR_NOT_SAME_DEVICE; std has no stable ErrorKind for it.
pub(crate) fn is_cross_device(e: &io::Error) -> bool {
    if let Some(code) = e.raw_os_error() {
        #[cfg(unix)]
        {
            if code == libc::EXDEV {
                return true;
            }
        }
        #[cfg(windows)]
        {
            // ERROR_NOT_SAME_DEVICE
            if code == 17 {
                return true;
            }
        }
    }
    false
}

#[cfg(unix)]
pub(super) fn fsync_dir(dir: &Path) -> io::Result<()> {
    std::fs::File::open(dir)?.sync_all()
}

#[cfg(windows)]
#[allow(dead_code)]
pub(super) fn fsync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}
