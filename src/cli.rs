//! CLI definition and parsing.
//! Two subcommands share one set of run flags; CLI values override whatever
//! the config file provided, field by field.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};

use crate::config::{Config, LogLevel};

#[derive(Parser, Debug, Clone)]
#[command(
    author,
    version,
    about = "Organize directory trees into template-derived destinations (Rust)"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Print where pattern_move will look for the config file (or PATTERN_MOVE_CONFIG if set), then exit.
    #[arg(
        long,
        help = "Print the config file location used by pattern_move and exit"
    )]
    pub print_config: bool,

    /// Enable debug logging (equivalent to `--log-level debug`).
    #[arg(
        short = 'd',
        long,
        help = "Enable debug logging (shorthand for --log-level debug)"
    )]
    pub debug: bool,

    /// Set log level. One of: quiet, normal, info, debug.
    #[arg(long, help = "Set log level: quiet, normal, info, debug")]
    pub log_level: Option<String>,

    /// Emit logs in structured JSON (includes timestamp, level, and structured fields).
    #[arg(long, help = "Emit logs in structured JSON")]
    pub json: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Compute and list the source -> destination mapping; moves nothing.
    Preview(RunArgs),
    /// Execute the moves (or simulate them with --dry-run).
    Commit(RunArgs),
}

#[derive(clap::Args, Debug, Clone)]
pub struct RunArgs {
    /// Source directory tree to organize.
    #[arg(long, short = 's', value_hint = ValueHint::DirPath, help = "Source directory tree to organize")]
    pub source: Option<PathBuf>,

    /// Root that resolved destinations are joined under.
    #[arg(long, short = 't', value_hint = ValueHint::DirPath, help = "Destination root")]
    pub target: Option<PathBuf>,

    /// Destination template, e.g. "{CREATED_YYYY}/{CREATED_MM}{CREATED_DD}/{FILE_NAME}".
    #[arg(long, short = 'p', help = "Destination template")]
    pub pattern: Option<String>,

    /// Worker threads for the move phase (0 = one per core, 1 = sequential).
    #[arg(long, help = "Move-phase worker threads (0 = one per core)")]
    pub workers: Option<usize>,

    /// Skip EXIF/QuickTime capture-time probing; use filesystem timestamps only.
    #[arg(long, help = "Use filesystem timestamps only; skip media probes")]
    pub no_probe: bool,

    /// Remove source directories left empty after the run.
    #[arg(long, help = "Remove source directories left empty after the run")]
    pub prune_empty: bool,

    /// Show what would be done, but do not modify files/directories.
    #[arg(
        long,
        help = "Show what would be done, but do not modify files/directories"
    )]
    pub dry_run: bool,

    /// Persist the effective source/target/pattern back to the config file.
    #[arg(long, help = "Persist the effective settings to the config file")]
    pub save_config: bool,
}

impl Args {
    /// Effective log level derived from flags.
    /// Precedence: --debug > --log-level value > None (use config default).
    pub fn effective_log_level(&self) -> Option<LogLevel> {
        if self.debug {
            return Some(LogLevel::Debug);
        }
        self.log_level.as_deref().and_then(LogLevel::parse)
    }
}

impl RunArgs {
    /// Apply CLI overrides to a loaded Config (in-place). No-ops for unset
    /// flags.
    pub fn apply_overrides(&self, cfg: &mut Config) {
        if let Some(source) = &self.source {
            cfg.source_root = Some(source.clone());
        }
        if let Some(target) = &self.target {
            cfg.target_root = Some(target.clone());
        }
        if let Some(pattern) = &self.pattern {
            cfg.pattern = pattern.clone();
        }
        if let Some(workers) = self.workers {
            cfg.workers = workers;
        }
        if self.no_probe {
            cfg.probe_capture_time = false;
        }
        if self.prune_empty {
            cfg.prune_empty_dirs = true;
        }
    }
}

pub fn parse() -> Args {
    Args::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_flags_override_config() {
        let args = Args::parse_from([
            "pattern_move",
            "commit",
            "--source",
            "/in",
            "--target",
            "/out",
            "--pattern",
            "{FILE_NAME}",
            "--workers",
            "2",
            "--no-probe",
            "--prune-empty",
        ]);
        let Some(Command::Commit(run)) = args.command else {
            panic!("expected commit subcommand");
        };

        let mut cfg = Config::default();
        run.apply_overrides(&mut cfg);
        assert_eq!(cfg.source_root, Some(PathBuf::from("/in")));
        assert_eq!(cfg.target_root, Some(PathBuf::from("/out")));
        assert_eq!(cfg.pattern, "{FILE_NAME}");
        assert_eq!(cfg.workers, 2);
        assert!(!cfg.probe_capture_time);
        assert!(cfg.prune_empty_dirs);
    }

    #[test]
    fn unset_flags_leave_config_alone() {
        let args = Args::parse_from(["pattern_move", "preview"]);
        let Some(Command::Preview(run)) = args.command else {
            panic!("expected preview subcommand");
        };

        let mut cfg = Config::default();
        cfg.source_root = Some(PathBuf::from("/keep"));
        run.apply_overrides(&mut cfg);
        assert_eq!(cfg.source_root, Some(PathBuf::from("/keep")));
        assert!(cfg.probe_capture_time);
    }

    #[test]
    fn effective_log_level_precedence() {
        let args = Args::parse_from(["pattern_move", "--debug", "--log-level", "quiet"]);
        assert_eq!(args.effective_log_level(), Some(LogLevel::Debug)); // --debug wins

        let args = Args::parse_from(["pattern_move", "--log-level", "info"]);
        assert_eq!(args.effective_log_level(), Some(LogLevel::Info));

        let args = Args::parse_from(["pattern_move"]);
        assert_eq!(args.effective_log_level(), None);
    }
}
