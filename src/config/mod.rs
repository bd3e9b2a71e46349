//! Configuration: types, default paths, XML load/save, validation.

pub mod paths;
pub mod types;
mod validate;
pub mod xml;

pub use paths::{default_config_path, default_log_path, path_has_symlink_ancestor};
pub use types::{Config, LogLevel};
pub use validate::validate_roots;
pub use xml::{create_template_config, load_or_init, save_config, LoadResult};

/// Current config schema version. Files with an older (or absent) version
/// load fine; missing fields fall back to the defaults below.
pub const PATTERN_VERSION: u32 = 1;

/// Destination template applied when none is configured.
pub const DEFAULT_PATTERN: &str = "{CREATED_YYYY}/{CREATED_MM}{CREATED_DD}/{FILE_NAME}";
