//! Settings file loading

use super::schema::SettingsSchema;
use crate::error::{Error, ErrorCode, Result};
use std::path::{Path, PathBuf};

/// Loaded tool settings and the file they came from
#[derive(Debug, Clone)]
pub struct Settings {
    /// Parsed settings, defaults filled in
    pub schema: SettingsSchema,
    /// Settings file that was read, if any
    pub path: Option<PathBuf>,
}

impl Settings {
    /// Load settings from a file path or the standard locations, else use defaults
    ///
    /// An explicitly given path must exist; the standard locations are optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let settings_path = match path {
            Some(p) if !p.exists() => return Err(Error::config_not_found(p)),
            Some(p) => Some(p.to_path_buf()),
            None => find_settings_file(Path::new(".")),
        };

        let schema = if let Some(ref p) = settings_path {
            load_settings_file(p)?
        } else {
            SettingsSchema::default()
        };

        Ok(Self {
            schema,
            path: settings_path,
        })
    }

    /// Load with defaults only (no file)
    pub fn defaults() -> Self {
        Self {
            schema: SettingsSchema::default(),
            path: None,
        }
    }
}

/// Find a settings file in the standard locations under `root`
fn find_settings_file(root: &Path) -> Option<PathBuf> {
    let candidates = [".droidcfg.toml", "droidcfg.toml", ".config/droidcfg.toml"];

    candidates
        .iter()
        .map(|candidate| root.join(candidate))
        .find(|candidate| candidate.exists())
}

/// Load and parse a TOML settings file
fn load_settings_file(path: &Path) -> Result<SettingsSchema> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::from(e).with_context(format!("Failed to read settings file {}", path.display()))
    })?;

    toml::from_str(&content).map_err(|e| {
        Error::new(
            ErrorCode::ConfigParseError,
            format!("Failed to parse settings file {}: {}", path.display(), e),
        )
        .with_source(e)
    })
}
