//! Core configuration types.
//! - Config holds runtime settings with sensible defaults.
//! - LogLevel represents verbosity with simple parsing helpers.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use super::paths;
use super::DEFAULT_PATTERN;

/// Program-defined verbosity levels exposed to users/config.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// Only errors
    Quiet,
    /// Informational output (default)
    #[default]
    Normal,
    /// More info (like verbose)
    Info,
    /// Debug/trace
    Debug,
}

impl LogLevel {
    /// Parse common string names into our LogLevel (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "quiet" | "error" | "none" => Some(LogLevel::Quiet),
            "normal" => Some(LogLevel::Normal),
            "info" | "verbose" | "detailed" => Some(LogLevel::Info),
            "debug" | "trace" => Some(LogLevel::Debug),
            _ => None,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Quiet => "quiet",
            LogLevel::Normal => "normal",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        };
        f.write_str(s)
    }
}

impl FromStr for LogLevel {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("invalid log level: '{s}'"))
    }
}

/// Runtime configuration used by the organizer. The roots have no sensible
/// machine-wide defaults, so they stay optional until the config file or the
/// CLI supplies them.
#[derive(Debug, Clone)]
pub struct Config {
    /// Tree to organize
    pub source_root: Option<PathBuf>,
    /// Root that resolved destinations are joined under
    pub target_root: Option<PathBuf>,
    /// Destination template
    pub pattern: String,
    /// Console verbosity
    pub log_level: LogLevel,
    /// Optional path to a log file
    pub log_file: Option<PathBuf>,
    /// Worker threads for the move phase (0 = one per core)
    pub workers: usize,
    /// Prefer embedded capture times for media files
    pub probe_capture_time: bool,
    /// Remove source directories left empty after a real run
    pub prune_empty_dirs: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_root: None,
            target_root: None,
            pattern: DEFAULT_PATTERN.to_string(),
            log_level: LogLevel::Normal,
            log_file: paths::default_log_path(),
            workers: 0,
            probe_capture_time: true,
            prune_empty_dirs: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_pattern_is_the_documented_one() {
        let cfg = Config::default();
        assert_eq!(cfg.pattern, "{CREATED_YYYY}/{CREATED_MM}{CREATED_DD}/{FILE_NAME}");
        assert!(cfg.probe_capture_time);
        assert!(!cfg.prune_empty_dirs);
    }

    #[test]
    fn log_level_parses_aliases() {
        assert_eq!(LogLevel::parse("ERROR"), Some(LogLevel::Quiet));
        assert_eq!(LogLevel::parse("verbose"), Some(LogLevel::Info));
        assert_eq!(LogLevel::parse("trace"), Some(LogLevel::Debug));
        assert_eq!(LogLevel::parse("nope"), None);
    }
}
