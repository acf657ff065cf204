//! Configuration providers: where provider-sourced record fields get their values
//!
//! The host build tool exposes build variables (SDK levels, version
//! code/name) through a variable provider. Resolution queries an injected
//! [`ConfigProvider`] instead of reading globals, so the same record resolves
//! against `local.properties`, the environment, fixed values or a chain of
//! them.

use crate::error::ConfigError;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, trace};

/// A value handed out by a provider, tagged with where it came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProvidedValue {
    pub value: String,
    pub source: String,
}

/// Source of build variables
pub trait ConfigProvider {
    /// Short name used in logs and resolved output
    fn name(&self) -> &str;

    /// Raw value for a key
    fn get(&self, key: &str) -> Option<String>;

    /// Value plus the name of the provider that supplied it
    fn lookup(&self, key: &str) -> Option<ProvidedValue> {
        self.get(key).map(|value| ProvidedValue {
            value,
            source: self.name().to_string(),
        })
    }
}

/// Fixed in-memory values
#[derive(Debug, Clone, Default)]
pub struct StaticProvider {
    name: String,
    values: BTreeMap<String, String>,
}

impl StaticProvider {
    /// Create an empty provider
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: BTreeMap::new(),
        }
    }

    /// Add a value
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Parse `KEY=VALUE` assignments (command-line overrides)
    pub fn from_assignments<'a>(
        name: impl Into<String>,
        assignments: impl IntoIterator<Item = &'a str>,
    ) -> Result<Self, ConfigError> {
        let mut provider = Self::new(name);
        for assignment in assignments {
            let (key, value) = assignment.split_once('=').ok_or_else(|| {
                ConfigError::configuration(
                    "--set",
                    format!("expected KEY=VALUE, got '{}'", assignment),
                )
            })?;
            let key = key.trim();
            if key.is_empty() {
                return Err(ConfigError::configuration(
                    "--set",
                    format!("empty key in '{}'", assignment),
                ));
            }
            provider.values.insert(key.to_string(), value.to_string());
        }
        Ok(provider)
    }

    /// Number of values held
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no values are held
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl ConfigProvider for StaticProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

/// Built-in defaults of the Flutter Gradle plugin, used when nothing else supplies a value
#[derive(Debug, Clone)]
pub struct FrameworkDefaults(StaticProvider);

impl FrameworkDefaults {
    pub const COMPILE_SDK: u32 = 34;
    pub const TARGET_SDK: u32 = 34;
    pub const MIN_SDK: u32 = 21;
    pub const NDK_VERSION: &'static str = "23.1.7779620";

    /// The defaults table
    pub fn new() -> Self {
        Self(
            StaticProvider::new("framework-defaults")
                .with("flutter.compileSdkVersion", Self::COMPILE_SDK.to_string())
                .with("flutter.targetSdkVersion", Self::TARGET_SDK.to_string())
                .with("flutter.minSdkVersion", Self::MIN_SDK.to_string())
                .with("flutter.ndkVersion", Self::NDK_VERSION)
                .with("flutter.versionCode", "1")
                .with("flutter.versionName", "1.0"),
        )
    }
}

impl Default for FrameworkDefaults {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigProvider for FrameworkDefaults {
    fn name(&self) -> &str {
        self.0.name()
    }

    fn get(&self, key: &str) -> Option<String> {
        self.0.get(key)
    }
}

/// Values from a Java `.properties` file such as Flutter's `local.properties`
#[derive(Debug, Clone)]
pub struct PropertiesProvider {
    name: String,
    values: BTreeMap<String, String>,
}

impl PropertiesProvider {
    /// Read and parse a properties file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let provider = Self::parse(path.display().to_string(), &content);
        debug!(path = %path.display(), keys = provider.values.len(), "Loaded properties");
        Ok(provider)
    }

    /// Parse properties text
    pub fn parse(name: impl Into<String>, content: &str) -> Self {
        Self {
            name: name.into(),
            values: parse_properties(content),
        }
    }
}

impl ConfigProvider for PropertiesProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

fn is_comment(line: &str) -> bool {
    matches!(line.trim_start().chars().next(), Some('#' | '!'))
}

/// Logical lines, honouring trailing-backslash continuations; comment lines
/// never continue
fn logical_lines(content: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut pending = String::new();
    let mut continuing = false;

    for raw in content.lines() {
        if !continuing && is_comment(raw) {
            lines.push(raw.to_string());
            continue;
        }
        let line = if continuing { raw.trim_start() } else { raw };
        let trailing = line.chars().rev().take_while(|c| *c == '\\').count();
        if trailing % 2 == 1 {
            pending.push_str(&line[..line.len() - 1]);
            continuing = true;
        } else {
            pending.push_str(line);
            lines.push(std::mem::take(&mut pending));
            continuing = false;
        }
    }
    if continuing {
        lines.push(pending);
    }
    lines
}

fn parse_properties(content: &str) -> BTreeMap<String, String> {
    let mut values = BTreeMap::new();

    for line in logical_lines(content) {
        let line = line.trim_start();
        if line.is_empty() || is_comment(line) {
            continue;
        }

        let mut split_at = None;
        let mut escaped = false;
        for (index, c) in line.char_indices() {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '=' || c == ':' || c.is_whitespace() {
                split_at = Some((index, c));
                break;
            }
        }

        let (key, value) = match split_at {
            Some((index, sep)) => {
                let rest = line[index + sep.len_utf8()..].trim_start();
                let rest = if sep.is_whitespace() {
                    rest.strip_prefix(['=', ':']).unwrap_or(rest).trim_start()
                } else {
                    rest
                };
                (&line[..index], rest)
            }
            None => (line, ""),
        };
        values.insert(unescape(key), unescape(value));
    }

    values
}

fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}

/// Environment variables; `flutter.versionCode` is read from `FLUTTER_VERSIONCODE`
#[derive(Debug, Clone, Default)]
pub struct EnvProvider {
    prefix: String,
}

impl EnvProvider {
    /// Look keys up with the given variable name prefix
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Variable name for a key
    pub fn env_key(&self, key: &str) -> String {
        let body: String = key
            .chars()
            .map(|c| match c {
                '.' | '-' => '_',
                c => c.to_ascii_uppercase(),
            })
            .collect();
        format!("{}{}", self.prefix, body)
    }
}

impl ConfigProvider for EnvProvider {
    fn name(&self) -> &str {
        "env"
    }

    fn get(&self, key: &str) -> Option<String> {
        std::env::var(self.env_key(key)).ok()
    }
}

/// An ordered chain of providers; the first one holding a key wins
#[derive(Default)]
pub struct LayeredProvider {
    layers: Vec<Box<dyn ConfigProvider>>,
}

impl LayeredProvider {
    /// Create an empty chain
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a lower-precedence layer
    pub fn with(mut self, provider: impl ConfigProvider + 'static) -> Self {
        self.layers.push(Box::new(provider));
        self
    }

    /// Append a lower-precedence layer in place
    pub fn push(&mut self, provider: impl ConfigProvider + 'static) {
        self.layers.push(Box::new(provider));
    }

    /// Names of the layers, highest precedence first
    pub fn layer_names(&self) -> Vec<&str> {
        self.layers.iter().map(|layer| layer.name()).collect()
    }
}

impl ConfigProvider for LayeredProvider {
    fn name(&self) -> &str {
        "layered"
    }

    fn get(&self, key: &str) -> Option<String> {
        self.lookup(key).map(|provided| provided.value)
    }

    fn lookup(&self, key: &str) -> Option<ProvidedValue> {
        let found = self.layers.iter().find_map(|layer| layer.lookup(key));
        trace!(key, source = found.as_ref().map(|p| p.source.as_str()), "Provider lookup");
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_static_provider() {
        let provider = StaticProvider::new("test").with("flutter.versionCode", "7");
        assert_eq!(provider.get("flutter.versionCode").as_deref(), Some("7"));
        assert_eq!(provider.get("missing"), None);
        assert_eq!(provider.lookup("flutter.versionCode").unwrap().source, "test");
    }

    #[test]
    fn test_assignments() {
        let provider = StaticProvider::from_assignments(
            "cli",
            ["flutter.versionName=2.0.0", "SIGNING_KEY=a=b"],
        )
        .unwrap();

        assert_eq!(provider.len(), 2);
        assert_eq!(provider.get("SIGNING_KEY").as_deref(), Some("a=b"));
        assert!(StaticProvider::from_assignments("cli", ["novalue"]).is_err());
        assert!(StaticProvider::from_assignments("cli", ["=1"]).is_err());
    }

    #[test]
    fn test_framework_defaults() {
        let defaults = FrameworkDefaults::new();
        assert_eq!(defaults.get("flutter.minSdkVersion").as_deref(), Some("21"));
        assert_eq!(defaults.get("flutter.compileSdkVersion").as_deref(), Some("34"));
        assert_eq!(defaults.get("flutter.versionName").as_deref(), Some("1.0"));
    }

    #[test]
    fn test_parse_local_properties() {
        let content = "\
# generated by the framework tool
sdk.dir=C\\:\\\\Users\\\\dev\\\\Android\\\\sdk
flutter.sdk = /opt/flutter
flutter.buildMode=release
flutter.versionName: 1.4.2
flutter.versionCode 42
! bang comment
multi.line=first \\
    second
empty.value=
";
        let provider = PropertiesProvider::parse("local.properties", content);

        assert_eq!(
            provider.get("sdk.dir").as_deref(),
            Some("C:\\Users\\dev\\Android\\sdk")
        );
        assert_eq!(provider.get("flutter.sdk").as_deref(), Some("/opt/flutter"));
        assert_eq!(provider.get("flutter.versionName").as_deref(), Some("1.4.2"));
        assert_eq!(provider.get("flutter.versionCode").as_deref(), Some("42"));
        assert_eq!(provider.get("multi.line").as_deref(), Some("first second"));
        assert_eq!(provider.get("empty.value").as_deref(), Some(""));
        assert_eq!(provider.get("! bang comment"), None);
    }

    #[test]
    fn test_comment_lines_never_continue() {
        let content = "# sdk at C:\\\nflutter.versionCode=42\n  ! also C:\\\nflutter.versionName=1.0\n";
        let provider = PropertiesProvider::parse("local.properties", content);

        assert_eq!(provider.get("flutter.versionCode").as_deref(), Some("42"));
        assert_eq!(provider.get("flutter.versionName").as_deref(), Some("1.0"));
    }

    #[test]
    fn test_properties_from_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("local.properties");
        std::fs::write(&path, "flutter.versionCode=3\n").unwrap();

        let provider = PropertiesProvider::from_file(&path).unwrap();
        assert_eq!(provider.get("flutter.versionCode").as_deref(), Some("3"));

        let missing = PropertiesProvider::from_file(&temp.path().join("nope.properties"));
        assert!(matches!(missing, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_env_key() {
        assert_eq!(
            EnvProvider::default().env_key("flutter.versionCode"),
            "FLUTTER_VERSIONCODE"
        );
        assert_eq!(EnvProvider::new("CI_").env_key("upload-key"), "CI_UPLOAD_KEY");
    }

    #[test]
    fn test_env_provider_reads_environment() {
        // PATH is set in every test environment
        let provider = EnvProvider::default();
        assert_eq!(provider.get("path"), std::env::var("PATH").ok());
    }

    #[test]
    fn test_layered_precedence() {
        let provider = LayeredProvider::new()
            .with(StaticProvider::new("cli").with("flutter.versionName", "9.9.9"))
            .with(
                PropertiesProvider::parse(
                    "local.properties",
                    "flutter.versionName=1.4.2\nflutter.versionCode=42\n",
                ),
            )
            .with(FrameworkDefaults::new());

        let name = provider.lookup("flutter.versionName").unwrap();
        assert_eq!(name.value, "9.9.9");
        assert_eq!(name.source, "cli");

        let code = provider.lookup("flutter.versionCode").unwrap();
        assert_eq!(code.source, "local.properties");

        let min = provider.lookup("flutter.minSdkVersion").unwrap();
        assert_eq!(min.source, "framework-defaults");

        assert!(provider.lookup("flutter.unknown").is_none());
        assert_eq!(
            provider.layer_names(),
            vec!["cli", "local.properties", "framework-defaults"]
        );
    }
}
