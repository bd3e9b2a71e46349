//! Batch move execution.
//! Walks the validated mapping set in order, moving each file (or merely
//! counting it in dry-run mode), reporting progress per completed entry and
//! folding per-entry failures into statuses instead of aborting the batch.

use std::fs;
use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::errors::MoveError;
use crate::fs_ops::{self, helpers};

use super::progress::ProgressEvent;
use super::{Mapping, MoveStatus, RunContext, RunOptions};

const CANCELLED: &str = "cancelled before entry started";

/// Execute (or simulate) every mapping, mutating statuses in place.
/// Result order stays walker order regardless of worker interleaving.
pub(super) fn run(mappings: &mut [Mapping], opts: &RunOptions, ctx: &RunContext) {
    let total = mappings.len();
    let completed = AtomicUsize::new(0);
    let tick = || {
        let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
        ctx.progress.on_progress(ProgressEvent {
            completed: done,
            total,
        });
    };

    if opts.dry_run {
        // No mutation; statuses stay Pending so the result mirrors the plan.
        // Progress fires identically to the real path so callers can reuse
        // the same reporting UI.
        for mapping in mappings.iter_mut() {
            if ctx.cancel.is_requested() && matches!(mapping.status, MoveStatus::Pending) {
                mapping.status = MoveStatus::Skipped(CANCELLED.into());
            }
            tick();
        }
        return;
    }

    let workers = effective_workers(opts.workers, total);
    if workers <= 1 {
        for mapping in mappings.iter_mut() {
            execute_one(mapping, ctx);
            tick();
        }
        return;
    }

    // Destinations are pre-validated pairwise distinct, so workers never
    // contend on a target path; directory creation below is create-if-absent
    // and safe under concurrent callers.
    match rayon::ThreadPoolBuilder::new().num_threads(workers).build() {
        Ok(pool) => pool.install(|| {
            mappings.par_iter_mut().for_each(|mapping| {
                execute_one(mapping, ctx);
                tick();
            });
        }),
        Err(e) => {
            warn!(error = %e, "worker pool unavailable; moving sequentially");
            for mapping in mappings.iter_mut() {
                execute_one(mapping, ctx);
                tick();
            }
        }
    }
}

fn effective_workers(requested: usize, total: usize) -> usize {
    let workers = if requested == 0 {
        rayon::current_num_threads()
    } else {
        requested
    };
    workers.min(total.max(1))
}

fn execute_one(mapping: &mut Mapping, ctx: &RunContext) {
    if !matches!(mapping.status, MoveStatus::Pending) {
        // Already Skipped during planning (vanished file).
        return;
    }
    if ctx.cancel.is_requested() {
        mapping.status = MoveStatus::Skipped(CANCELLED.into());
        return;
    }
    let Some(dest) = mapping.destination.clone() else {
        mapping.status = MoveStatus::Skipped("no destination computed".into());
        return;
    };

    let src = mapping.entry.absolute_path.clone();
    match move_one(&src, &dest) {
        Ok(()) => {
            debug!(src = %src.display(), dest = %dest.display(), "moved");
            mapping.status = MoveStatus::Succeeded;
        }
        Err(e) => {
            let hint = match &e {
                MoveError::Io { source, .. } => helpers::io_hint(source),
                MoveError::Verify { .. } => None,
            };
            warn!(
                src = %src.display(),
                dest = %dest.display(),
                error = %e,
                hint,
                "move failed"
            );
            mapping.status = MoveStatus::Failed(e.to_string());
        }
    }
}

fn move_one(src: &Path, dest: &Path) -> Result<(), MoveError> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(|e| MoveError::Io {
            op: "create destination directory",
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    match fs_ops::try_atomic_move(src, dest) {
        Ok(()) => Ok(()),
        Err(e) if fs_ops::is_cross_device(&e) => {
            debug!(
                src = %src.display(),
                dest = %dest.display(),
                "cross-device rename; falling back to copy+verify"
            );
            fs_ops::copy_verify_rename(src, dest)?;
            fs::remove_file(src).map_err(|e| MoveError::Io {
                op: "remove source after verified copy of",
                path: src.to_path_buf(),
                source: e,
            })
        }
        Err(e) => Err(MoveError::Io {
            op: "rename",
            path: src.to_path_buf(),
            source: e,
        }),
    }
}

/// Remove directories left empty under `root`, bottom-up. The root itself
/// is never removed. Best-effort: unreadable or non-empty directories are
/// simply left in place.
pub(super) fn prune_empty_dirs(root: &Path) -> usize {
    let mut removed = 0;
    let children = match fs::read_dir(root) {
        Ok(iter) => iter,
        Err(e) => {
            warn!(path = %root.display(), error = %e, "cannot scan for empty directories");
            return 0;
        }
    };
    for entry in children.filter_map(Result::ok) {
        let path = entry.path();
        if path.is_dir() {
            prune_recursive(&path, &mut removed);
        }
    }
    if removed > 0 {
        info!(root = %root.display(), removed, "pruned empty source directories");
    }
    removed
}

fn prune_recursive(dir: &Path, removed: &mut usize) {
    if let Ok(children) = fs::read_dir(dir) {
        for entry in children.filter_map(Result::ok) {
            let path = entry.path();
            if path.is_dir() {
                prune_recursive(&path, removed);
            }
        }
    }
    match is_empty_dir(dir) {
        Ok(true) => {
            if fs::remove_dir(dir).is_ok() {
                *removed += 1;
            }
        }
        Ok(false) => {}
        Err(e) => warn!(path = %dir.display(), error = %e, "cannot check directory"),
    }
}

fn is_empty_dir(dir: &Path) -> io::Result<bool> {
    Ok(fs::read_dir(dir)?.next().is_none())
}
