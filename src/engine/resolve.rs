//! Destination-path derivation and batch collision detection.
//! Rendering happens per entry; the collision check runs over the whole
//! mapping set before any filesystem mutation.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::Datelike;

use crate::errors::{CollisionGroup, EngineError, PathError};

use super::metadata::FileMetadata;
use super::pattern::{CompiledPattern, Segment, Token};
use super::walk::FileEntry;
use super::Mapping;

/// Render `pattern` for one file and join the result under `target_root`.
///
/// Separators are normalized (`/` and `\` both split), empty and `.`
/// components drop out, and a `..` component that would climb above the
/// target root is a `PathError`. The rendered path must be non-empty and
/// must differ from the source path.
pub fn resolve(
    pattern: &CompiledPattern,
    entry: &FileEntry,
    meta: &FileMetadata,
    target_root: &Path,
) -> Result<PathBuf, PathError> {
    let mut rendered = String::new();
    for segment in pattern.segments() {
        match segment {
            Segment::Literal(text) => rendered.push_str(text),
            Segment::Placeholder(token) => rendered.push_str(&expand(*token, entry, meta)),
        }
    }

    let mut dest = target_root.to_path_buf();
    let mut depth = 0usize;
    let mut pushed_any = false;
    for part in rendered.split(['/', '\\']) {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            if depth == 0 {
                return Err(PathError::EscapesTarget {
                    source_path: entry.absolute_path.clone(),
                    rendered,
                });
            }
            dest.pop();
            depth -= 1;
            continue;
        }
        dest.push(part);
        depth += 1;
        pushed_any = true;
    }

    if !pushed_any {
        return Err(PathError::Empty(entry.absolute_path.clone()));
    }
    if dest == entry.absolute_path {
        return Err(PathError::SamePath(dest));
    }
    Ok(dest)
}

fn expand(token: Token, entry: &FileEntry, meta: &FileMetadata) -> String {
    let path = &entry.absolute_path;
    match token {
        Token::FileName => lossy(path.file_name()),
        Token::FileStem => lossy(path.file_stem()),
        Token::FileExt => lossy(path.extension()),
        Token::CreatedYear => format!("{:04}", meta.created.year()),
        Token::CreatedMonth => format!("{:02}", meta.created.month()),
        Token::CreatedDay => format!("{:02}", meta.created.day()),
        Token::ModifiedYear => format!("{:04}", meta.modified.year()),
        Token::ModifiedMonth => format!("{:02}", meta.modified.month()),
        Token::ModifiedDay => format!("{:02}", meta.modified.day()),
    }
}

fn lossy(part: Option<&std::ffi::OsStr>) -> String {
    part.map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Fail the whole run if any destination is claimed by more than one source.
/// Groups are reported sorted by destination so the error text is stable.
pub fn check_collisions(mappings: &[Mapping]) -> Result<(), EngineError> {
    let mut by_dest: HashMap<&Path, Vec<&Path>> = HashMap::new();
    for mapping in mappings {
        if let Some(dest) = &mapping.destination {
            by_dest
                .entry(dest.as_path())
                .or_default()
                .push(mapping.entry.absolute_path.as_path());
        }
    }

    let mut groups: Vec<CollisionGroup> = by_dest
        .into_iter()
        .filter(|(_, sources)| sources.len() > 1)
        .map(|(dest, sources)| CollisionGroup {
            destination: dest.to_path_buf(),
            sources: sources.into_iter().map(Path::to_path_buf).collect(),
        })
        .collect();
    if groups.is_empty() {
        return Ok(());
    }
    groups.sort_by(|a, b| a.destination.cmp(&b.destination));
    Err(EngineError::Collision(groups))
}
