use std::path::{Path, PathBuf};

use serde::Deserialize;

/// File name searched for when no configuration path is given explicitly.
pub const CONFIG_FILE_NAME: &str = "minipl.toml";

/// Switches for the checker behaviors that admit more than one reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CheckOptions {
    /// Record "Mismatched operator types" and poison the expression.
    /// When off, the expression is left unresolved without a diagnostic.
    pub report_operand_mismatch: bool,
    /// Resolve the initializer of a rejected re-declaration so errors inside
    /// it are still reported.
    pub check_rejected_initializers: bool,
    /// Also report "Reference to an undefined variable" for the target of an
    /// assignment to an undeclared identifier.
    pub report_undefined_target_reference: bool,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self {
            report_operand_mismatch: true,
            check_rejected_initializers: true,
            report_undefined_target_reference: false,
        }
    }
}

/// The parsed `minipl.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckerConfig {
    pub checker: CheckOptions,
    /// The file the configuration was read from, if any.
    pub source: Option<PathBuf>,
}

/// Raw TOML structure for deserialization.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    checker: CheckOptions,
}

/// Errors that can occur when loading a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read minipl.toml: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("invalid minipl.toml: {0}")]
    ParseError(String),
}

/// Walk up from `start_dir` looking for `minipl.toml`.
pub fn find_config(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();
    loop {
        let candidate = current.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            return Some(candidate);
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Load a configuration file from an explicit path.
pub fn load_config(path: &Path) -> Result<CheckerConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut config = parse_config(&content)?;
    config.source = Some(path.to_path_buf());
    Ok(config)
}

/// Parse a configuration from TOML text.
pub fn parse_config(content: &str) -> Result<CheckerConfig, ConfigError> {
    let raw: RawConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    Ok(CheckerConfig {
        checker: raw.checker,
        source: None,
    })
}

/// Find and load the configuration governing `input_file`.
///
/// A missing file is not an error: the defaults apply.
pub fn find_and_load_config(input_file: &Path) -> Result<CheckerConfig, ConfigError> {
    let start_dir = input_file.parent().unwrap_or_else(|| Path::new("."));
    match find_config(start_dir) {
        Some(path) => load_config(&path),
        None => Ok(CheckerConfig::default()),
    }
}
