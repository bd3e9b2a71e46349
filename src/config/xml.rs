//! XML configuration store.
//! - Loads settings from config.xml (quick_xml), schema-versioned: absent or
//!   older fields substitute documented defaults, unknown fields from newer
//!   versions are ignored.
//! - Creates a commented template with conservative permissions if missing
//!   (unless PATTERN_MOVE_CONFIG points at an explicit file).
//! - Saves the effective settings back in the same shape.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use quick_xml::de::from_str as from_xml_str;
use quick_xml::se::to_string as to_xml_string;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::paths::{default_config_path, default_log_path, path_has_symlink_ancestor};
use super::types::{Config, LogLevel};
use super::{DEFAULT_PATTERN, PATTERN_VERSION};

/// Env var naming an explicit config file; bypasses template creation.
pub const CONFIG_ENV: &str = "PATTERN_MOVE_CONFIG";

/// Struct mirroring the XML config for (de)serialization. Every field is
/// optional so files written by older versions keep loading.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename = "config", default)]
struct XmlConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pattern_version: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    source_root: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    target_root: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    log_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    log_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    workers: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    probe_capture_time: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    prune_empty_dirs: Option<bool>,
}

/// Outcome of `load_or_init`.
pub enum LoadResult {
    /// Parsed an existing file (or PATTERN_MOVE_CONFIG override).
    Loaded(Config),
    /// No file existed; a template was written for the user to edit.
    CreatedTemplate(PathBuf),
    /// No file and nowhere sensible to create one; running on defaults.
    Defaults(Config),
}

/// Resolve the active config path: PATTERN_MOVE_CONFIG wins, else the
/// OS-appropriate default.
pub fn active_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os(CONFIG_ENV) {
        return Some(PathBuf::from(p));
    }
    default_config_path()
}

/// Load the config, creating a commented template when the default location
/// is empty. The template is for humans; the call reports it so the CLI can
/// point the user at it instead of silently running on defaults.
pub fn load_or_init() -> Result<LoadResult> {
    let env_set = env::var_os(CONFIG_ENV).is_some();
    let Some(cfg_path) = active_config_path() else {
        return Ok(LoadResult::Defaults(Config::default()));
    };

    if !cfg_path.exists() {
        if env_set {
            anyhow::bail!(
                "{} points at '{}' but no such file exists",
                CONFIG_ENV,
                cfg_path.display()
            );
        }
        create_template_config(&cfg_path)?;
        return Ok(LoadResult::CreatedTemplate(cfg_path));
    }

    let cfg = load_config_from_path(&cfg_path)?;
    Ok(LoadResult::Loaded(cfg))
}

/// Load a Config from a specific XML file path.
pub fn load_config_from_path(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("read config xml '{}'", path.display()))?;
    let parsed: XmlConfig = from_xml_str(&contents)
        .with_context(|| format!("parse config xml '{}'", path.display()))?;

    if let Some(version) = parsed.pattern_version {
        if version > PATTERN_VERSION {
            debug!(version, "config written by a newer version; unknown fields ignored");
        }
    }
    Ok(xml_to_config(parsed))
}

fn xml_to_config(parsed: XmlConfig) -> Config {
    let mut cfg = Config::default();

    cfg.source_root = parsed
        .source_root
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(PathBuf::from);
    cfg.target_root = parsed
        .target_root
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(PathBuf::from);
    if let Some(p) = parsed.pattern.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        cfg.pattern = p.to_string();
    }
    if let Some(level) = parsed
        .log_level
        .as_deref()
        .and_then(|s| LogLevel::parse(s.trim()))
    {
        cfg.log_level = level;
    }
    if let Some(s) = parsed.log_file.as_deref().map(str::trim) {
        if !s.is_empty() {
            cfg.log_file = Some(PathBuf::from(s));
        }
    }
    if let Some(workers) = parsed.workers {
        cfg.workers = workers;
    }
    if let Some(probe) = parsed.probe_capture_time {
        cfg.probe_capture_time = probe;
    }
    if let Some(prune) = parsed.prune_empty_dirs {
        cfg.prune_empty_dirs = prune;
    }
    cfg
}

/// Persist the effective settings to `path` in the versioned schema.
pub fn save_config(cfg: &Config, path: &Path) -> Result<()> {
    if path_has_symlink_ancestor(path)? {
        anyhow::bail!(
            "refusing to save config: ancestor of {} is a symlink",
            path.display()
        );
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create config directory '{}'", parent.display()))?;
    }

    let xml = XmlConfig {
        pattern_version: Some(PATTERN_VERSION),
        source_root: cfg.source_root.as_ref().map(|p| p.display().to_string()),
        target_root: cfg.target_root.as_ref().map(|p| p.display().to_string()),
        pattern: Some(cfg.pattern.clone()),
        log_level: Some(cfg.log_level.to_string()),
        log_file: cfg.log_file.as_ref().map(|p| p.display().to_string()),
        workers: Some(cfg.workers),
        probe_capture_time: Some(cfg.probe_capture_time),
        prune_empty_dirs: Some(cfg.prune_empty_dirs),
    };
    let body = to_xml_string(&xml).context("serialize config")?;
    fs::write(path, format!("{body}\n"))
        .with_context(|| format!("write config '{}'", path.display()))?;
    restrict_file_permissions(path);
    info!("Saved config to {}", path.display());
    Ok(())
}

/// Create the default template config file and parent directory.
/// Refuses symlinked ancestors; tightens permissions on Unix (0700 dir,
/// 0600 file, best-effort).
pub fn create_template_config(path: &Path) -> Result<()> {
    if path_has_symlink_ancestor(path)? {
        anyhow::bail!(
            "refusing to create config: ancestor of {} is a symlink",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create config directory '{}'", parent.display()))?;
        restrict_dir_permissions(parent);
    }

    let suggested_log = default_log_path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "/path/to/pattern_move.log".into());

    let content = format!(
        "<!--\n  pattern_move configuration (XML)\n\n  Fields:\n    source_root         -> tree to organize\n    target_root         -> root that destinations are joined under\n    pattern             -> destination template; placeholders:\n                           {{FILE_NAME}} {{FILE_STEM}} {{FILE_EXT}}\n                           {{CREATED_YYYY}} {{CREATED_MM}} {{CREATED_DD}}\n                           {{MODIFIED_YYYY}} {{MODIFIED_MM}} {{MODIFIED_DD}}\n    log_level           -> quiet | normal | info | debug\n    log_file            -> path to log file (optional; stdout always used)\n    workers             -> move-phase threads (0 = one per core, 1 = sequential)\n    probe_capture_time  -> read EXIF/QuickTime capture dates for media files\n    prune_empty_dirs    -> remove source directories emptied by a run\n\n  Notes:\n    - CLI flags override these values.\n    - pattern_version tracks the schema; absent fields load as defaults.\n-->\n<config>\n  <pattern_version>{}</pattern_version>\n  <pattern>{}</pattern>\n  <log_level>normal</log_level>\n  <log_file>{}</log_file>\n  <workers>0</workers>\n  <probe_capture_time>true</probe_capture_time>\n  <prune_empty_dirs>false</prune_empty_dirs>\n</config>\n",
        PATTERN_VERSION, DEFAULT_PATTERN, suggested_log
    );

    fs::write(path, content).with_context(|| format!("write template '{}'", path.display()))?;
    restrict_file_permissions(path);
    info!("Created template config at {}", path.display());
    Ok(())
}

fn restrict_dir_permissions(dir: &Path) {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let _ = fs::set_permissions(dir, fs::Permissions::from_mode(0o700));
    }
    #[cfg(not(unix))]
    let _ = dir;
}

fn restrict_file_permissions(file: &Path) {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let _ = fs::set_permissions(file, fs::Permissions::from_mode(0o600));
    }
    #[cfg(not(unix))]
    let _ = file;
}
