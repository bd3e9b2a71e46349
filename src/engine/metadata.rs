//! Lazy per-file attribute resolution.
//! Attributes are read only when a mapping is actually being computed, not
//! during the walk, so skipped files never pay for extra I/O.

use std::fs;

use chrono::{DateTime, Local};
use tracing::trace;

use crate::errors::MetadataError;

use super::probe;
use super::walk::FileEntry;

/// Timestamps backing placeholder rendering for one file.
#[derive(Debug, Clone)]
pub struct FileMetadata {
    pub created: DateTime<Local>,
    pub modified: DateTime<Local>,
    /// True when the filesystem could not report a creation time and the
    /// modification time stands in for it. Surfaced as a warning, never an
    /// error.
    pub created_is_fallback: bool,
    /// Name of the embedded-date probe that produced `created`, if any.
    pub capture_probe: Option<&'static str>,
}

/// Read the attributes needed to render placeholders for `entry`.
///
/// When `probe_capture_time` is set and the file looks like a photo or a
/// video, an embedded capture time (EXIF, QuickTime `mvhd`) takes precedence
/// over filesystem timestamps; probe failures silently fall back.
///
/// The only error here is the file disappearing between discovery and
/// resolution; callers fold that into a `Skipped` mapping.
pub fn resolve(entry: &FileEntry, probe_capture_time: bool) -> Result<FileMetadata, MetadataError> {
    let meta = fs::metadata(&entry.absolute_path).map_err(|e| MetadataError {
        path: entry.absolute_path.clone(),
        source: e,
    })?;

    let modified: DateTime<Local> = meta
        .modified()
        .map_err(|e| MetadataError {
            path: entry.absolute_path.clone(),
            source: e,
        })?
        .into();

    if probe_capture_time {
        if let Some((taken_at, probe_name)) = probe::capture_time(&entry.absolute_path) {
            trace!(
                path = %entry.absolute_path.display(),
                probe = probe_name,
                "using embedded capture time"
            );
            return Ok(FileMetadata {
                created: taken_at,
                modified,
                created_is_fallback: false,
                capture_probe: Some(probe_name),
            });
        }
    }

    match meta.created() {
        Ok(created) => Ok(FileMetadata {
            created: created.into(),
            modified,
            created_is_fallback: false,
            capture_probe: None,
        }),
        // Not every filesystem records a birth time; the modification time
        // is the documented stand-in.
        Err(_) => Ok(FileMetadata {
            created: modified,
            modified,
            created_is_fallback: true,
            capture_probe: None,
        }),
    }
}
