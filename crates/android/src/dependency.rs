//! Dependency references pinned to exact versions

use droidcfg_core::validation::{ValidationIssue, ValidationResult};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Configuration the desugaring shim library is added to
pub const DESUGARING_CONFIGURATION: &str = "coreLibraryDesugaring";

const BASE_CONFIGURATIONS: &[&str] = &[
    "implementation",
    "api",
    "compileOnly",
    "runtimeOnly",
    "testImplementation",
    "androidTestImplementation",
    "annotationProcessor",
    "kapt",
    "ksp",
    "lintChecks",
    DESUGARING_CONFIGURATION,
];

const VARIANT_SUFFIXES: &[&str] = &["Implementation", "Api", "CompileOnly", "RuntimeOnly"];

static COORDINATE_PART: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.\-]+$").unwrap());

/// A dependency declaration: `configuration("group:artifact:version")`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DependencyRef {
    /// Gradle configuration (e.g. `implementation`, `coreLibraryDesugaring`)
    pub configuration: String,
    /// Maven coordinate
    pub notation: String,
}

impl DependencyRef {
    /// Create a dependency reference
    pub fn new(configuration: impl Into<String>, notation: impl Into<String>) -> Self {
        Self {
            configuration: configuration.into(),
            notation: notation.into(),
        }
    }

    /// Parse the notation into its coordinate parts
    pub fn coordinate(&self) -> Result<Coordinate, String> {
        Coordinate::parse(&self.notation)
    }

    /// The variant this configuration is restricted to, given the known variant names
    ///
    /// `debugImplementation` belongs to `debug`; `implementation` to every variant.
    pub fn variant_scope<'a>(&self, variants: impl IntoIterator<Item = &'a str>) -> Option<&'a str> {
        variants.into_iter().find(|variant| {
            self.configuration
                .strip_prefix(*variant)
                .is_some_and(|rest| VARIANT_SUFFIXES.contains(&rest))
        })
    }

    /// Whether the configuration is one the host build system defines for every module
    pub fn is_known_configuration<'a>(&self, variants: impl IntoIterator<Item = &'a str>) -> bool {
        BASE_CONFIGURATIONS.contains(&self.configuration.as_str())
            || self.variant_scope(variants).is_some()
    }
}

impl fmt::Display for DependencyRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(\"{}\")", self.configuration, self.notation)
    }
}

/// `group:artifact:version[:classifier][@extension]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coordinate {
    pub group: String,
    pub artifact: String,
    pub version: String,
    pub classifier: Option<String>,
    pub extension: Option<String>,
}

impl Coordinate {
    /// Parse a notation, requiring an exact version
    pub fn parse(notation: &str) -> Result<Self, String> {
        let (body, extension) = match notation.split_once('@') {
            Some((body, ext)) => (body, Some(ext.to_string())),
            None => (notation, None),
        };
        let parts: Vec<&str> = body.split(':').collect();
        let (group, artifact, version, classifier) = match parts.as_slice() {
            [g, a, v] => (*g, *a, *v, None),
            [g, a, v, c] => (*g, *a, *v, Some(c.to_string())),
            [_, _] => return Err("missing version (expected group:artifact:version)".to_string()),
            _ => return Err("expected group:artifact:version".to_string()),
        };

        for (name, part) in [("group", group), ("artifact", artifact)] {
            if !COORDINATE_PART.is_match(part) {
                return Err(format!("invalid {} '{}'", name, part));
            }
        }
        if let Some(reason) = inexact_version(version) {
            return Err(format!("version '{}' is not exact: {}", version, reason));
        }

        Ok(Self {
            group: group.to_string(),
            artifact: artifact.to_string(),
            version: version.to_string(),
            classifier,
            extension,
        })
    }

    /// `group:artifact`, the identity used for duplicate detection
    pub fn module(&self) -> String {
        format!("{}:{}", self.group, self.artifact)
    }
}

fn inexact_version(version: &str) -> Option<&'static str> {
    if version.is_empty() {
        Some("empty")
    } else if version.contains('+') {
        Some("dynamic '+' versions float")
    } else if version.starts_with("latest.") {
        Some("'latest.*' selectors float")
    } else if version.contains(['[', ']', '(', ')', ',']) {
        Some("version ranges float")
    } else if !COORDINATE_PART.is_match(version) {
        Some("unexpected characters")
    } else {
        None
    }
}

/// Validate notations, duplicates and configuration names
pub fn check_dependencies(dependencies: &[DependencyRef], variants: &[&str]) -> ValidationResult {
    let mut result = ValidationResult::new();
    let mut seen: Vec<(String, String, usize)> = Vec::new();

    for (index, dependency) in dependencies.iter().enumerate() {
        let field = format!("dependencies[{}]", index);

        if !dependency.is_known_configuration(variants.iter().copied()) {
            result.add_warning(ValidationIssue::new(
                format!("{}.configuration", field),
                "UNKNOWN_CONFIGURATION",
                format!("'{}' is not a standard configuration", dependency.configuration),
            ));
        }

        match dependency.coordinate() {
            Ok(coordinate) => {
                if coordinate.version.ends_with("-SNAPSHOT") {
                    result.add_warning(ValidationIssue::new(
                        format!("{}.notation", field),
                        "SNAPSHOT_VERSION",
                        format!("'{}' is a mutable snapshot", dependency.notation),
                    ));
                }
                let module = coordinate.module();
                if let Some((_, _, first)) = seen
                    .iter()
                    .find(|(config, m, _)| *config == dependency.configuration && *m == module)
                {
                    result.add_error(ValidationIssue::new(
                        format!("{}.notation", field),
                        "DUPLICATE_DEPENDENCY",
                        format!(
                            "'{}' is already declared at dependencies[{}]",
                            module, first
                        ),
                    ));
                } else {
                    seen.push((dependency.configuration.clone(), module, index));
                }
            }
            Err(reason) => result.add_error(
                ValidationIssue::new(format!("{}.notation", field), "NOTATION", reason)
                    .with_values("group:artifact:version", dependency.notation.as_str()),
            ),
        }
    }

    result
}
