//! Tool settings schema definitions

use serde::{Deserialize, Serialize};

/// Root settings schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct SettingsSchema {
    /// `[general]` section
    #[serde(default)]
    pub general: GeneralSettings,

    /// `[provider]` section
    #[serde(default)]
    pub provider: ProviderSettings,

    /// `[logging]` section
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// General settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeneralSettings {
    /// Build configuration document used when none is given on the command line
    #[serde(default = "default_config_file")]
    pub config_file: String,

    /// Treat validation warnings as errors
    #[serde(default)]
    pub strict: bool,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            config_file: default_config_file(),
            strict: false,
        }
    }
}

fn default_config_file() -> String {
    "android/app/droidcfg.toml".to_string()
}

/// Where externally supplied build variables come from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderSettings {
    /// Java properties file holding build variables (Flutter's local.properties)
    #[serde(default = "default_properties_file")]
    pub properties_file: String,

    /// Prefix for environment variable lookups
    #[serde(default)]
    pub env_prefix: String,

    /// Fall back to the framework plugin's built-in defaults
    #[serde(default = "default_true")]
    pub framework_defaults: bool,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            properties_file: default_properties_file(),
            env_prefix: String::new(),
            framework_defaults: true,
        }
    }
}

fn default_properties_file() -> String {
    "android/local.properties".to_string()
}

fn default_true() -> bool {
    true
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingSettings {
    /// Default filter directive when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}
