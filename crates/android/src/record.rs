//! Build configuration record: the document shape
//!
//! The sections mirror the Gradle script the record replaces (`plugins`,
//! `android { defaultConfig, compileOptions, buildTypes, ... }`,
//! `dependencies`, `flutter`).

use crate::dependency::DependencyRef;
use crate::error::ConfigError;
use crate::plugin::PluginRef;
use crate::setting::{JavaVersion, Setting};
use crate::signing::SigningIdentity;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// Serialization format of a record document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Toml,
    Json,
}

impl DocumentFormat {
    /// Pick the format from a file extension; anything but `.json` is TOML
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => DocumentFormat::Json,
            _ => DocumentFormat::Toml,
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentFormat::Toml => f.write_str("TOML"),
            DocumentFormat::Json => f.write_str("JSON"),
        }
    }
}

/// Root of a build configuration document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildConfigRecord {
    /// Plugins in apply order
    #[serde(default)]
    pub plugins: Vec<PluginRef>,

    pub android: AndroidSection,

    #[serde(default)]
    pub dependencies: Vec<DependencyRef>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub framework: Option<FrameworkSection>,
}

impl BuildConfigRecord {
    /// Parse a document without validating it
    pub fn parse(doc: &str, format: DocumentFormat) -> Result<Self, ConfigError> {
        let parsed = match format {
            DocumentFormat::Toml => toml::from_str(doc).map_err(|e| e.to_string()),
            DocumentFormat::Json => serde_json::from_str(doc).map_err(|e| e.to_string()),
        };
        parsed.map_err(|message| ConfigError::Parse { format, message })
    }

    /// The application id before any variant suffix
    pub fn base_application_id(&self) -> &str {
        self.android
            .default_config
            .application_id
            .as_deref()
            .unwrap_or(&self.android.namespace)
    }
}

/// The `android { }` block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AndroidSection {
    /// Package of the generated R and BuildConfig classes
    pub namespace: String,

    pub compile_sdk: Setting<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ndk_version: Option<Setting<String>>,

    #[serde(default)]
    pub compile_options: CompileOptions,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kotlin_options: Option<KotlinOptions>,

    pub default_config: DefaultConfig,

    /// Declared signing identities; `debug` exists even when not listed
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub signing_configs: BTreeMap<String, SigningIdentity>,

    /// Variant overrides; `debug` and `release` exist even when not listed
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub build_types: BTreeMap<String, BuildType>,
}

/// `compileOptions { }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompileOptions {
    #[serde(default = "default_java_version")]
    pub source_compatibility: JavaVersion,

    #[serde(default = "default_java_version")]
    pub target_compatibility: JavaVersion,

    /// Shim newer `java.*` APIs onto older runtimes
    #[serde(default)]
    pub core_library_desugaring: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            source_compatibility: default_java_version(),
            target_compatibility: default_java_version(),
            core_library_desugaring: false,
        }
    }
}

fn default_java_version() -> JavaVersion {
    JavaVersion::VERSION_1_8
}

/// `kotlinOptions { }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KotlinOptions {
    pub jvm_target: JavaVersion,
}

/// `defaultConfig { }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DefaultConfig {
    /// Defaults to the namespace when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_id: Option<String>,

    pub min_sdk: Setting<u32>,

    pub target_sdk: Setting<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_code: Option<Setting<u32>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_name: Option<Setting<String>>,

    #[serde(default)]
    pub multidex: bool,
}

/// One entry of `buildTypes { }`; unset fields inherit
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildType {
    /// Name of the signing identity sealing this variant
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signing_config: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minify: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shrink_resources: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debuggable: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_id_suffix: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_name_suffix: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multidex: Option<bool>,
}

/// The `flutter { }` block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FrameworkSection {
    /// Root of the shared cross-platform source tree, relative to the module
    pub source: String,
}
