//! Embedded capture-time probes for media files.
//! A probe failure is never an error; callers fall back to filesystem
//! timestamps.

mod atom;
mod exif_date;

use std::io::{self, Read};
use std::path::Path;

use chrono::{DateTime, Local};
use tracing::trace;

/// Image formats that can carry an EXIF block with the original capture time.
const EXIF_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "heif", "heic", "avif", "webp", "png", "nef", "nrw", "cr2", "dng", "arw",
    "sr2", "srf", "rw2", "raf", "pef", "mos", "3fr", "erf", "mef", "dcr", "srw", "tif", "tiff",
];

/// QuickTime-family containers with an `mvhd` creation timestamp.
const ATOM_EXTENSIONS: &[&str] = &["mp4", "m4v", "mov", "qt"];

/// Try to read an embedded capture time for `path`, keyed off its extension.
/// Returns the timestamp and the name of the probe that produced it.
pub(super) fn capture_time(path: &Path) -> Option<(DateTime<Local>, &'static str)> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    if EXIF_EXTENSIONS.contains(&ext.as_str()) {
        match exif_date::taken_at(path) {
            Ok(taken_at) => return Some((taken_at, "exif")),
            Err(e) => trace!(path = %path.display(), error = %e, "exif probe failed"),
        }
    } else if ATOM_EXTENSIONS.contains(&ext.as_str()) {
        match atom::created_at(path) {
            Ok(created_at) => return Some((created_at, "mvhd")),
            Err(e) => trace!(path = %path.display(), error = %e, "atom probe failed"),
        }
    }
    None
}

fn read_u8(reader: &mut impl Read) -> io::Result<u8> {
    let mut buf = [0u8; 1];
    reader.read_exact(&mut buf)?;
    Ok(buf[0])
}

fn read_u16(reader: &mut impl Read) -> io::Result<u16> {
    let mut buf = [0u8; 2];
    reader.read_exact(&mut buf)?;
    Ok(u16::from_be_bytes(buf))
}

fn read_u32(reader: &mut impl Read) -> io::Result<u32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_be_bytes(buf))
}

fn read_u64(reader: &mut impl Read) -> io::Result<u64> {
    let mut buf = [0u8; 8];
    reader.read_exact(&mut buf)?;
    Ok(u64::from_be_bytes(buf))
}
