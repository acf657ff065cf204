//! Field values that are either written literally or supplied by a provider

use serde::{Deserialize, Serialize};
use std::fmt;

/// A record field holding a literal value or a reference to an externally
/// provided build variable (`{ from = "flutter.minSdkVersion" }`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Setting<T> {
    /// Value written in the document
    Literal(T),
    /// Value looked up on the configuration provider at resolve time
    Provided {
        /// Provider key
        from: String,
    },
}

impl<T> Setting<T> {
    /// The literal value, if the field is not provider-sourced
    pub fn literal(&self) -> Option<&T> {
        match self {
            Setting::Literal(value) => Some(value),
            Setting::Provided { .. } => None,
        }
    }

    /// The provider key, if the field is provider-sourced
    pub fn provider_key(&self) -> Option<&str> {
        match self {
            Setting::Literal(_) => None,
            Setting::Provided { from } => Some(from),
        }
    }
}

impl<T: fmt::Display> fmt::Display for Setting<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Setting::Literal(value) => write!(f, "{}", value),
            Setting::Provided { from } => write!(f, "${{{}}}", from),
        }
    }
}

impl<T> From<T> for Setting<T> {
    fn from(value: T) -> Self {
        Setting::Literal(value)
    }
}

/// Java language level used for source/target compatibility and the Kotlin JVM target
///
/// Accepts `8`, `"1.8"`, `"VERSION_1_8"`, `"11"`, `"VERSION_11"` and so on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawJavaVersion", into = "String")]
pub struct JavaVersion(u8);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawJavaVersion {
    Number(u8),
    Text(String),
}

impl JavaVersion {
    /// Oldest level the Android toolchain still accepts
    pub const MIN: u8 = 6;
    /// Newest level accepted
    pub const MAX: u8 = 25;
    /// Java 8, the host build system's default compatibility level
    pub const VERSION_1_8: JavaVersion = JavaVersion(8);

    /// Construct from a feature release number
    pub fn new(release: u8) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&release).then_some(Self(release))
    }

    /// Parse any of the accepted spellings
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let text = text
            .strip_prefix("JavaVersion.")
            .unwrap_or(text);
        let text = text.strip_prefix("VERSION_").unwrap_or(text);
        let normalized = text.replace('_', ".");
        let number = normalized.strip_prefix("1.").unwrap_or(&normalized);
        number.parse::<u8>().ok().and_then(Self::new)
    }

    /// Feature release number (8, 11, 17, ...)
    pub fn release(self) -> u8 {
        self.0
    }

    /// Name of the Gradle `JavaVersion` enum constant
    pub fn gradle_constant(self) -> String {
        if self.0 <= 8 {
            format!("VERSION_1_{}", self.0)
        } else {
            format!("VERSION_{}", self.0)
        }
    }
}

impl fmt::Display for JavaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 <= 8 {
            write!(f, "1.{}", self.0)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl TryFrom<RawJavaVersion> for JavaVersion {
    type Error = String;

    fn try_from(raw: RawJavaVersion) -> Result<Self, Self::Error> {
        let parsed = match &raw {
            RawJavaVersion::Number(n) => JavaVersion::new(*n),
            RawJavaVersion::Text(text) => JavaVersion::parse(text),
        };
        parsed.ok_or_else(|| {
            let shown = match raw {
                RawJavaVersion::Number(n) => n.to_string(),
                RawJavaVersion::Text(text) => text,
            };
            format!(
                "unrecognized Java version '{}' (expected {} through {})",
                shown,
                JavaVersion::MIN,
                JavaVersion::MAX
            )
        })
    }
}

impl From<JavaVersion> for String {
    fn from(version: JavaVersion) -> Self {
        version.to_string()
    }
}
