//! Typed error definitions for pattern_move.
//! Fatal kinds abort a run before any mutation; recoverable kinds are folded
//! into per-mapping statuses and never surface as top-level errors.

use std::path::PathBuf;
use thiserror::Error;

/// Template compilation failures. Always fatal, detected before any walk.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PatternError {
    #[error("template is empty")]
    Empty,

    #[error("unterminated placeholder starting at byte {0}")]
    Unterminated(usize),

    #[error("unrecognized placeholder {{{0}}}")]
    UnknownToken(String),

    #[error("literal '{0}' introduces a parent-directory component")]
    ParentTraversal(String),
}

/// Per-file attribute read failure, typically a file that vanished between
/// discovery and resolution. The owning mapping becomes `Skipped`.
#[derive(Debug, Error)]
#[error("cannot read metadata for {path}: {source}")]
pub struct MetadataError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Destination computation failure. Fatal, pre-run.
#[derive(Debug, Error)]
pub enum PathError {
    #[error("pattern renders to an empty path for {0}")]
    Empty(PathBuf),

    #[error("destination for {source_path} escapes the target root: '{rendered}'")]
    EscapesTarget {
        source_path: PathBuf,
        rendered: String,
    },

    #[error("destination equals the source path: {0}")]
    SamePath(PathBuf),
}

/// One destination claimed by more than one source.
#[derive(Debug, Clone)]
pub struct CollisionGroup {
    pub destination: PathBuf,
    pub sources: Vec<PathBuf>,
}

/// Per-file move failure; the owning mapping becomes `Failed`.
#[derive(Debug, Error)]
pub enum MoveError {
    #[error("{op} '{path}' failed: {source}")]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "verification failed for '{dest}': destination has {got} bytes, source has {want}; source left in place"
    )]
    Verify { dest: PathBuf, got: u64, want: u64 },
}

/// Top-level errors returned by `preview` / `commit`. All of these abort the
/// run before any filesystem mutation.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid pattern: {0}")]
    Pattern(#[from] PatternError),

    #[error("cannot enumerate source root '{root}': {source}")]
    Walk {
        root: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("source root is not a directory: {0}")]
    SourceNotADirectory(PathBuf),

    #[error("{0}")]
    Path(#[from] PathError),

    #[error("{}", format_collisions(.0))]
    Collision(Vec<CollisionGroup>),
}

fn format_collisions(groups: &[CollisionGroup]) -> String {
    let mut msg = format!(
        "{} destination{} claimed by multiple sources; no files were moved:",
        groups.len(),
        if groups.len() == 1 { "" } else { "s" }
    );
    for group in groups {
        msg.push_str(&format!("\n  {} <-", group.destination.display()));
        for src in &group.sources {
            msg.push_str(&format!("\n    {}", src.display()));
        }
    }
    msg
}
