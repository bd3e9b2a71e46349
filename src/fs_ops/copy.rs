//! Cross-device fallback: copy, then verify, then let the caller delete.
//! The copy streams into a unique temp file in the destination directory
//! (`create_new`, so nothing is ever clobbered), fsyncs it, carries the
//! source mtime over, renames it into place, and verifies the landed size
//! against the source. The source file is untouched throughout; the caller
//! removes it only after this returns Ok.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

use filetime::{set_file_mtime, FileTime};
use tracing::{debug, warn};

use crate::errors::MoveError;

use super::atomic::try_atomic_move;
use super::util::unique_temp_path;

const BUF_SIZE: usize = 1024 * 1024;

pub fn copy_verify_rename(src: &Path, dest: &Path) -> Result<(), MoveError> {
    let dest_dir = dest.parent().ok_or_else(|| MoveError::Io {
        op: "resolve parent of",
        path: dest.to_path_buf(),
        source: io::Error::new(io::ErrorKind::InvalidInput, "destination has no parent"),
    })?;

    let tmp = unique_temp_path(dest_dir);
    if let Err(e) = copy_streaming(src, &tmp) {
        let _ = fs::remove_file(&tmp);
        return Err(MoveError::Io {
            op: "copy to temporary file",
            path: tmp,
            source: e,
        });
    }

    // Carry the source mtime onto the copy so the move is invisible to
    // mtime-based tooling; timestamp verification then compares like with
    // like.
    match fs::metadata(src) {
        Ok(meta) => {
            let mtime = FileTime::from_last_modification_time(&meta);
            if let Err(e) = set_file_mtime(&tmp, mtime) {
                warn!(path = %tmp.display(), error = %e, "failed to carry mtime onto copy");
            }
        }
        Err(e) => warn!(path = %src.display(), error = %e, "failed to re-stat source for mtime"),
    }

    if let Err(e) = try_atomic_move(&tmp, dest) {
        let _ = fs::remove_file(&tmp);
        return Err(MoveError::Io {
            op: "rename temporary file into",
            path: dest.to_path_buf(),
            source: e,
        });
    }

    verify_landed(src, dest)
}

/// Size check between the landed destination and the still-present source.
/// On mismatch both files stay where they are; the error says so.
fn verify_landed(src: &Path, dest: &Path) -> Result<(), MoveError> {
    let want = fs::metadata(src)
        .map_err(|e| MoveError::Io {
            op: "stat source for verification of",
            path: src.to_path_buf(),
            source: e,
        })?
        .len();
    let got = fs::metadata(dest)
        .map_err(|e| MoveError::Io {
            op: "stat destination for verification of",
            path: dest.to_path_buf(),
            source: e,
        })?
        .len();
    if got != want {
        return Err(MoveError::Verify {
            dest: dest.to_path_buf(),
            got,
            want,
        });
    }
    debug!(src = %src.display(), dest = %dest.display(), bytes = got, "copy verified");
    Ok(())
}

/// Buffered streaming copy; the destination is created with `create_new`
/// and fsynced before returning.
fn copy_streaming(src: &Path, dst: &Path) -> io::Result<u64> {
    let src_f = File::open(src)?;
    let dst_f = OpenOptions::new().write(true).create_new(true).open(dst)?;

    let mut reader = BufReader::with_capacity(BUF_SIZE, src_f);
    let mut writer = BufWriter::with_capacity(BUF_SIZE, dst_f);
    let bytes = io::copy(&mut reader, &mut writer)?;
    writer.flush()?;
    writer.get_ref().sync_all()?;
    Ok(bytes)
}
