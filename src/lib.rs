//! Core library for `pattern_move`.
//!
//! Template-driven file organization: compile a destination template, walk
//! a source tree in deterministic order, derive collision-checked
//! destination paths from per-file metadata, and execute (or preview) the
//! resulting batch of moves with progress reporting and per-entry failure
//! accounting.

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod fs_ops;
pub mod output;

pub use config::{Config, LogLevel, DEFAULT_PATTERN};
pub use engine::cancel::CancelToken;
pub use engine::progress::{CollectingSink, ProgressEvent, ProgressSink, SilentSink};
pub use engine::{
    commit, preview, CommitResult, Mapping, MoveStatus, OrganizeRequest, PreviewResult,
    RunContext, RunOptions,
};
pub use errors::{EngineError, PatternError};
