//! The template-driven path-resolution and batch-move engine.
//!
//! A run is: compile the template, walk the source tree in deterministic
//! order, lazily resolve per-file metadata, derive a destination for every
//! file, check the whole mapping set for collisions, then either report the
//! plan (`preview`) or execute it (`commit`). Everything a run needs comes
//! in through explicit request/option/context values; everything it learns
//! goes out in the result. No state survives an invocation.

pub mod cancel;
mod executor;
pub mod metadata;
pub mod pattern;
mod probe;
pub mod progress;
pub mod resolve;
pub mod walk;

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, warn};

use crate::errors::EngineError;

use cancel::CancelToken;
use progress::{ProgressEvent, ProgressSink, SilentSink};
use walk::FileEntry;

/// What to organize: the externally owned configuration of one run.
#[derive(Debug, Clone)]
pub struct OrganizeRequest {
    pub pattern: String,
    pub source_root: PathBuf,
    pub target_root: PathBuf,
}

/// How to run it.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Report what would happen without touching the filesystem.
    pub dry_run: bool,
    /// Worker threads for the move phase: 0 = one per core, 1 = sequential.
    pub workers: usize,
    /// Prefer embedded capture times (EXIF, QuickTime) over filesystem
    /// timestamps for media files.
    pub probe_capture_time: bool,
    /// Remove source directories left empty after a real run.
    pub prune_empty_dirs: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            workers: 0,
            probe_capture_time: true,
            prune_empty_dirs: false,
        }
    }
}

/// Caller-provided channels for one run: cancellation in, progress out.
#[derive(Clone)]
pub struct RunContext {
    pub cancel: CancelToken,
    pub progress: Arc<dyn ProgressSink>,
}

impl Default for RunContext {
    fn default() -> Self {
        Self {
            cancel: CancelToken::new(),
            progress: Arc::new(SilentSink),
        }
    }
}

/// Terminal state of one mapping. Only the executor moves a mapping out of
/// `Pending`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveStatus {
    Pending,
    Succeeded,
    Skipped(String),
    Failed(String),
}

/// One file's resolved source → destination pair plus execution status.
#[derive(Debug, Clone)]
pub struct Mapping {
    pub entry: FileEntry,
    /// None only when metadata resolution failed; such mappings are already
    /// `Skipped` when the executor sees them.
    pub destination: Option<PathBuf>,
    pub status: MoveStatus,
}

/// Outcome of `preview`: the computed pairs, nothing executed.
#[derive(Debug, Clone)]
pub struct PreviewResult {
    pub entries: Vec<(PathBuf, PathBuf)>,
    pub warnings: Vec<String>,
}

/// Outcome of `commit`: every mapping with its terminal status plus counts.
#[derive(Debug, Clone)]
pub struct CommitResult {
    pub entries: Vec<Mapping>,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    pub warnings: Vec<String>,
}

/// Compute the full mapping set without mutating anything.
/// Progress fires once per computed entry, same as a commit would.
pub fn preview(
    req: &OrganizeRequest,
    opts: &RunOptions,
    ctx: &RunContext,
) -> Result<PreviewResult, EngineError> {
    let (mappings, warnings) = plan(req, opts)?;
    let total = mappings.len();

    let mut entries = Vec::with_capacity(total);
    for (index, mapping) in mappings.iter().enumerate() {
        if let Some(dest) = &mapping.destination {
            entries.push((mapping.entry.absolute_path.clone(), dest.clone()));
        }
        ctx.progress.on_progress(ProgressEvent {
            completed: index + 1,
            total,
        });
    }

    info!(total, mapped = entries.len(), "preview complete");
    Ok(PreviewResult { entries, warnings })
}

/// Execute the mapping set (or simulate it with `opts.dry_run`).
/// Per-entry failures never abort the batch; fatal errors abort before any
/// mutation.
pub fn commit(
    req: &OrganizeRequest,
    opts: &RunOptions,
    ctx: &RunContext,
) -> Result<CommitResult, EngineError> {
    let (mut mappings, mut warnings) = plan(req, opts)?;

    executor::run(&mut mappings, opts, ctx);

    let mut succeeded = 0;
    let mut failed = 0;
    let mut skipped = 0;
    for mapping in &mappings {
        match mapping.status {
            MoveStatus::Succeeded => succeeded += 1,
            MoveStatus::Failed(_) => failed += 1,
            MoveStatus::Skipped(_) => skipped += 1,
            MoveStatus::Pending => {}
        }
    }

    if !opts.dry_run && opts.prune_empty_dirs && !ctx.cancel.is_requested() {
        let removed = executor::prune_empty_dirs(&req.source_root);
        if removed > 0 {
            warnings.push(format!("removed {removed} emptied source directories"));
        }
    }

    info!(
        succeeded,
        failed,
        skipped,
        dry_run = opts.dry_run,
        "commit complete"
    );
    Ok(CommitResult {
        entries: mappings,
        succeeded,
        failed,
        skipped,
        warnings,
    })
}

/// Shared front half of both operations: compile, walk, resolve, collide.
/// Read-only; all fatal errors originate here, before any mutation.
fn plan(
    req: &OrganizeRequest,
    opts: &RunOptions,
) -> Result<(Vec<Mapping>, Vec<String>), EngineError> {
    let compiled = pattern::compile(&req.pattern)?;
    let (entries, mut warnings) = walk::walk(&req.source_root)?;

    let mut mappings = Vec::with_capacity(entries.len());
    for entry in entries {
        match metadata::resolve(&entry, opts.probe_capture_time) {
            Ok(meta) => {
                if meta.created_is_fallback {
                    warnings.push(format!(
                        "{}: filesystem reports no creation time; using modification time",
                        entry.relative_path.display()
                    ));
                }
                let dest = resolve::resolve(&compiled, &entry, &meta, &req.target_root)?;
                mappings.push(Mapping {
                    entry,
                    destination: Some(dest),
                    status: MoveStatus::Pending,
                });
            }
            Err(e) => {
                // Vanished between discovery and resolution; recoverable.
                warn!(error = %e, "skipping entry");
                let reason = e.to_string();
                warnings.push(reason.clone());
                mappings.push(Mapping {
                    entry,
                    destination: None,
                    status: MoveStatus::Skipped(reason),
                });
            }
        }
    }

    resolve::check_collisions(&mappings)?;
    Ok((mappings, warnings))
}
