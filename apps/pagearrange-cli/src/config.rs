//! Loading `EditorConfig` from TOML

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use pagearrange_core::EditorConfig;

/// Read an `EditorConfig` from a TOML file.
///
/// ```toml
/// render_scale = 2.0
/// export_file_name = "booklet.pdf"
/// compress_output = false
/// ```
pub fn from_file<P: AsRef<Path>>(path: P) -> Result<EditorConfig> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    from_str(&content)
}

/// Parse and validate an `EditorConfig` from a TOML string
pub fn from_str(s: &str) -> Result<EditorConfig> {
    let config: EditorConfig = toml::from_str(s).context("Failed to parse TOML configuration")?;
    config.validate().context("Invalid configuration")?;
    Ok(config)
}
