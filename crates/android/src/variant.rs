//! Build variants: the built-in `debug`/`release` profiles merged with document overrides

use crate::record::BuildType;
use crate::signing::DEVELOPMENT_IDENTITY;
use serde::Serialize;

/// Variants the host build system always defines
pub const BUILTIN_VARIANTS: &[&str] = &["debug", "release"];

/// Names the host build system reserves for source sets
pub const RESERVED_NAMES: &[&str] = &["main", "test", "androidTest"];

/// A variant with every override applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Variant {
    pub name: String,
    /// Signing identity name; `None` leaves the output unsigned
    pub signing_config: Option<String>,
    pub minify: bool,
    pub shrink_resources: bool,
    pub debuggable: bool,
    pub application_id_suffix: Option<String>,
    pub version_name_suffix: Option<String>,
    /// `None` inherits `default_config.multidex`
    pub multidex: Option<bool>,
    /// Whether the document has a `build_types` entry for it
    pub declared: bool,
}

impl Variant {
    /// Defaults before any override: `debug` is debuggable and signed with the
    /// development identity; everything else starts out like `release`
    pub fn builtin(name: &str) -> Self {
        let debug = name == "debug";
        Self {
            name: name.to_string(),
            signing_config: debug.then(|| DEVELOPMENT_IDENTITY.to_string()),
            minify: false,
            shrink_resources: false,
            debuggable: debug,
            application_id_suffix: None,
            version_name_suffix: None,
            multidex: None,
            declared: false,
        }
    }

    /// Apply a document's overrides
    pub fn overlay(mut self, overrides: &BuildType) -> Self {
        if let Some(signing) = &overrides.signing_config {
            self.signing_config = Some(signing.clone());
        }
        if let Some(minify) = overrides.minify {
            self.minify = minify;
        }
        if let Some(shrink) = overrides.shrink_resources {
            self.shrink_resources = shrink;
        }
        if let Some(debuggable) = overrides.debuggable {
            self.debuggable = debuggable;
        }
        if overrides.application_id_suffix.is_some() {
            self.application_id_suffix = overrides.application_id_suffix.clone();
        }
        if overrides.version_name_suffix.is_some() {
            self.version_name_suffix = overrides.version_name_suffix.clone();
        }
        if overrides.multidex.is_some() {
            self.multidex = overrides.multidex;
        }
        self.declared = true;
        self
    }

    /// Whether this variant is sealed with the development identity
    pub fn uses_development_signing(&self) -> bool {
        self.signing_config.as_deref() == Some(DEVELOPMENT_IDENTITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_debug() {
        let debug = Variant::builtin("debug");
        assert!(debug.debuggable);
        assert!(debug.uses_development_signing());
        assert!(!debug.declared);
    }

    #[test]
    fn test_builtin_release_is_unsigned() {
        let release = Variant::builtin("release");
        assert!(!release.debuggable);
        assert_eq!(release.signing_config, None);
    }

    #[test]
    fn test_overlay_keeps_unset_fields() {
        let overrides = BuildType {
            signing_config: Some("debug".into()),
            minify: Some(true),
            ..BuildType::default()
        };
        let release = Variant::builtin("release").overlay(&overrides);

        assert!(release.uses_development_signing());
        assert!(release.minify);
        assert!(!release.shrink_resources);
        assert!(!release.debuggable);
        assert!(release.declared);
    }

    #[test]
    fn test_custom_variant_starts_like_release() {
        let staging = Variant::builtin("staging");
        assert_eq!(staging.signing_config, None);
        assert!(!staging.debuggable);
    }
}
