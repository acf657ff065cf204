//! Resolving a loaded configuration into the concrete settings of one variant
//!
//! Top-level defaults are overlaid with the variant's overrides, and every
//! provider-sourced field is looked up on the injected provider. Resolution
//! is pure: the same configuration, variant and provider values always yield
//! the same settings.

use crate::dependency::DependencyRef;
use crate::error::{ConfigError, Result};
use crate::loader::{BuildConfig, JAVA_PACKAGE};
use crate::plugin::PluginRef;
use crate::provider::{ConfigProvider, ProvidedValue};
use crate::setting::{JavaVersion, Setting};
use crate::signing::{Redacted, ResolvedSigning, DEVELOPMENT_IDENTITY};
use droidcfg_core::validation::Validator;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

/// Fully merged settings for one variant
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedSettings {
    pub variant: String,
    pub namespace: String,
    /// Application id with the variant suffix applied
    pub application_id: String,
    pub compile_sdk: u32,
    pub min_sdk: u32,
    pub target_sdk: u32,
    pub version_code: Option<u32>,
    /// Version name with the variant suffix applied
    pub version_name: Option<String>,
    pub ndk_version: Option<String>,
    pub source_compatibility: JavaVersion,
    pub target_compatibility: JavaVersion,
    pub jvm_target: Option<JavaVersion>,
    pub core_library_desugaring: bool,
    pub multidex: bool,
    pub minify: bool,
    pub shrink_resources: bool,
    pub debuggable: bool,
    /// `None` when the variant is unsigned
    pub signing: Option<ResolvedSigning>,
    pub plugins: Vec<PluginRef>,
    /// Dependencies visible to this variant
    pub dependencies: Vec<DependencyRef>,
    pub framework_source: Option<String>,
    /// Every provider-sourced value used, keyed by provider key; signing
    /// secrets are left out
    pub provided: BTreeMap<String, ProvidedValue>,
}

impl ResolvedSettings {
    /// Whether the variant is sealed with the development identity
    pub fn uses_development_signing(&self) -> bool {
        self.signing.as_ref().is_some_and(|s| s.development)
    }
}

/// Provider lookups for one resolution, remembering what was used
struct Lookup<'a> {
    provider: &'a dyn ConfigProvider,
    provided: BTreeMap<String, ProvidedValue>,
    secret_keys: BTreeSet<String>,
}

impl<'a> Lookup<'a> {
    fn new(provider: &'a dyn ConfigProvider) -> Self {
        Self {
            provider,
            provided: BTreeMap::new(),
            secret_keys: BTreeSet::new(),
        }
    }

    /// Values used, minus any key that also fed a secret
    fn into_provided(self) -> BTreeMap<String, ProvidedValue> {
        let secret_keys = self.secret_keys;
        self.provided
            .into_iter()
            .filter(|(key, _)| !secret_keys.contains(key))
            .collect()
    }

    fn secret(&mut self, field: &str, setting: &Setting<String>) -> Result<Redacted> {
        match setting {
            Setting::Literal(value) => Ok(Redacted::new(value.clone())),
            Setting::Provided { from } => {
                let found = self.provider.lookup(from).ok_or_else(|| ConfigError::MissingValue {
                    field: field.to_string(),
                    key: from.to_string(),
                })?;
                debug!(field, key = %from, source = %found.source, "Using provided secret");
                self.secret_keys.insert(from.clone());
                Ok(Redacted::new(found.value))
            }
        }
    }

    fn fetch(&mut self, field: &str, key: &str) -> Result<ProvidedValue> {
        if let Some(found) = self.provided.get(key) {
            return Ok(found.clone());
        }
        let found = self.provider.lookup(key).ok_or_else(|| ConfigError::MissingValue {
            field: field.to_string(),
            key: key.to_string(),
        })?;
        debug!(field, key, source = %found.source, "Using provided value");
        self.provided.insert(key.to_string(), found.clone());
        Ok(found)
    }

    fn text(&mut self, field: &str, setting: &Setting<String>) -> Result<String> {
        match setting {
            Setting::Literal(value) => Ok(value.clone()),
            Setting::Provided { from } => Ok(self.fetch(field, from)?.value),
        }
    }

    fn number(&mut self, field: &str, setting: &Setting<u32>) -> Result<u32> {
        match setting {
            Setting::Literal(value) => Ok(*value),
            Setting::Provided { from } => {
                let found = self.fetch(field, from)?;
                found.value.trim().parse::<u32>().map_err(|_| {
                    ConfigError::configuration(
                        field,
                        format!(
                            "'{}' supplied for {} by {} is not a non-negative integer",
                            found.value, from, found.source
                        ),
                    )
                })
            }
        }
    }
}

/// Merged settings for `variant_name`
///
/// Fails with [`ConfigError::UnknownVariant`] for an undeclared variant, with
/// [`ConfigError::MissingValue`] when no provider supplies a referenced key,
/// and with [`ConfigError::Configuration`] naming the field when a provided
/// value is malformed or the resolved values break a bound.
pub fn resolve(
    config: &BuildConfig,
    variant_name: &str,
    provider: &dyn ConfigProvider,
) -> Result<ResolvedSettings> {
    let variant = config
        .variant(variant_name)
        .ok_or_else(|| ConfigError::UnknownVariant {
            name: variant_name.to_string(),
            available: config.variant_names(),
        })?;
    let record = config.record();
    let android = &record.android;
    let defaults = &android.default_config;
    let mut lookup = Lookup::new(provider);

    let compile_sdk = lookup.number("android.compile_sdk", &android.compile_sdk)?;
    let min_sdk = lookup.number("android.default_config.min_sdk", &defaults.min_sdk)?;
    let target_sdk = lookup.number("android.default_config.target_sdk", &defaults.target_sdk)?;

    let version_code = defaults
        .version_code
        .as_ref()
        .map(|code| lookup.number("android.default_config.version_code", code))
        .transpose()?;
    let version_name = defaults
        .version_name
        .as_ref()
        .map(|name| lookup.text("android.default_config.version_name", name))
        .transpose()?;
    let ndk_version = android
        .ndk_version
        .as_ref()
        .map(|ndk| lookup.text("android.ndk_version", ndk))
        .transpose()?;

    let application_id = format!(
        "{}{}",
        record.base_application_id(),
        variant.application_id_suffix.as_deref().unwrap_or("")
    );

    let mut validator = Validator::new()
        .at_least("android.default_config.min_sdk", min_sdk, 1)
        .ordered(
            "android.default_config.min_sdk",
            min_sdk,
            "android.default_config.target_sdk",
            target_sdk,
        )
        .ordered(
            "android.default_config.target_sdk",
            target_sdk,
            "android.compile_sdk",
            compile_sdk,
        )
        .pattern(
            "android.default_config.application_id",
            &application_id,
            &JAVA_PACKAGE,
            "a dotted Java package name",
        );
    if let Some(code) = version_code {
        validator = validator.at_least("android.default_config.version_code", code, 1);
    }
    if let Some(name) = &version_name {
        validator = validator.required("android.default_config.version_name", name);
    }
    let checked = validator.validate();
    if let Some(issue) = checked.errors().first() {
        return Err(ConfigError::configuration(&issue.field, &issue.message));
    }

    let version_name = version_name.map(|name| {
        format!("{}{}", name, variant.version_name_suffix.as_deref().unwrap_or(""))
    });

    let signing = match &variant.signing_config {
        Some(name) => Some(resolve_signing(config, variant_name, name, &mut lookup)?),
        None => None,
    };
    if signing.as_ref().is_some_and(|s| s.development) && !variant.debuggable {
        warn!(
            variant = variant_name,
            "Variant is signed with the development identity; replace it before distributing"
        );
    }

    let variant_names = config.variant_names();
    let dependencies = record
        .dependencies
        .iter()
        .filter(|dep| match dep.variant_scope(variant_names.iter().map(String::as_str)) {
            Some(scope) => scope == variant_name,
            None => true,
        })
        .cloned()
        .collect();

    let compile_options = &android.compile_options;
    Ok(ResolvedSettings {
        variant: variant_name.to_string(),
        namespace: android.namespace.clone(),
        application_id,
        compile_sdk,
        min_sdk,
        target_sdk,
        version_code,
        version_name,
        ndk_version,
        source_compatibility: compile_options.source_compatibility,
        target_compatibility: compile_options.target_compatibility,
        jvm_target: android.kotlin_options.as_ref().map(|k| k.jvm_target),
        core_library_desugaring: compile_options.core_library_desugaring,
        multidex: variant.multidex.unwrap_or(defaults.multidex),
        minify: variant.minify,
        shrink_resources: variant.shrink_resources,
        debuggable: variant.debuggable,
        signing,
        plugins: record.plugins.clone(),
        dependencies,
        framework_source: record.framework.as_ref().map(|f| f.source.clone()),
        provided: lookup.into_provided(),
    })
}

fn resolve_signing(
    config: &BuildConfig,
    variant_name: &str,
    identity_name: &str,
    lookup: &mut Lookup<'_>,
) -> Result<ResolvedSigning> {
    let field = format!("android.signing_configs.{}", identity_name);
    // load() rejects undefined references, so this only trips on hand-built configs
    let identity = config.signing_identity(identity_name).ok_or_else(|| {
        ConfigError::configuration(
            format!("android.build_types.{}.signing_config", variant_name),
            format!("Signing identity '{}' is not defined", identity_name),
        )
    })?;

    let field_of = |name: &str| format!("{}.{}", field, name);
    let mut text = |name: &str, setting: &Option<Setting<String>>| {
        setting
            .as_ref()
            .map(|s| lookup.text(&field_of(name), s))
            .transpose()
    };
    let store_file = text("store_file", &identity.store_file)?;
    let key_alias = text("key_alias", &identity.key_alias)?;

    let mut secret = |name: &str, setting: &Option<Setting<String>>| {
        setting
            .as_ref()
            .map(|s| lookup.secret(&field_of(name), s))
            .transpose()
    };

    Ok(ResolvedSigning {
        name: identity_name.to_string(),
        store_file,
        key_alias,
        store_password: secret("store_password", &identity.store_password)?,
        key_password: secret("key_password", &identity.key_password)?,
        development: identity_name == DEVELOPMENT_IDENTITY,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load;
    use crate::provider::{FrameworkDefaults, LayeredProvider, StaticProvider};
    use crate::record::DocumentFormat;
    use crate::testutil::{literal_doc, FLUTTER_TEMPLATE};

    fn template() -> BuildConfig {
        load(FLUTTER_TEMPLATE, DocumentFormat::Toml).unwrap()
    }

    fn local_properties() -> StaticProvider {
        StaticProvider::new("local.properties")
            .with("flutter.versionCode", "42")
            .with("flutter.versionName", "1.4.2")
    }

    #[test]
    fn test_resolve_literal_levels() {
        let config = load(&literal_doc(21, 34, 34), DocumentFormat::Toml).unwrap();
        let settings = config.resolve("debug", &StaticProvider::new("empty")).unwrap();

        assert_eq!(
            (settings.min_sdk, settings.target_sdk, settings.compile_sdk),
            (21, 34, 34)
        );
        assert!(settings.provided.is_empty());
    }

    #[test]
    fn test_resolve_template_release() {
        let provider = LayeredProvider::new()
            .with(local_properties())
            .with(FrameworkDefaults::new());
        let settings = template().resolve("release", &provider).unwrap();

        assert_eq!(settings.application_id, "com.example.connect");
        assert_eq!(settings.compile_sdk, FrameworkDefaults::COMPILE_SDK);
        assert_eq!(settings.min_sdk, FrameworkDefaults::MIN_SDK);
        assert_eq!(settings.version_code, Some(42));
        assert_eq!(settings.version_name.as_deref(), Some("1.4.2"));
        assert_eq!(settings.ndk_version.as_deref(), Some("27.0.12077973"));
        assert!(settings.multidex);
        assert!(settings.core_library_desugaring);
        assert_eq!(settings.jvm_target, JavaVersion::new(11));
        assert_eq!(settings.framework_source.as_deref(), Some("../.."));
        assert_eq!(settings.dependencies.len(), 1);
        assert_eq!(settings.provided["flutter.versionCode"].source, "local.properties");
        assert_eq!(
            settings.provided["flutter.minSdkVersion"].source,
            "framework-defaults"
        );
    }

    #[test]
    fn test_release_falls_back_to_development_identity() {
        let settings = template()
            .resolve("release", &FrameworkDefaults::new())
            .unwrap();

        let signing = settings.signing.as_ref().unwrap();
        assert_eq!(signing.name, "debug");
        assert!(signing.development);
        assert_eq!(signing.key_alias.as_deref(), Some("androiddebugkey"));
        assert!(settings.uses_development_signing());
        assert!(!settings.debuggable);
    }

    #[test]
    fn test_unknown_variant() {
        let err = template()
            .resolve("staging", &FrameworkDefaults::new())
            .unwrap_err();

        match err {
            ConfigError::UnknownVariant { name, available } => {
                assert_eq!(name, "staging");
                assert_eq!(available, vec!["debug", "release"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_provided_value() {
        let err = template()
            .resolve("debug", &StaticProvider::new("empty"))
            .unwrap_err();

        assert!(matches!(
            &err,
            ConfigError::MissingValue { field, key }
                if field == "android.compile_sdk" && key == "flutter.compileSdkVersion"
        ));
    }

    #[test]
    fn test_malformed_provided_value() {
        let provider = LayeredProvider::new()
            .with(StaticProvider::new("cli").with("flutter.versionCode", "forty-two"))
            .with(FrameworkDefaults::new());
        let err = template().resolve("debug", &provider).unwrap_err();

        assert_eq!(err.fields(), vec!["android.default_config.version_code"]);
        assert!(err.to_string().contains("forty-two"));
    }

    #[test]
    fn test_provided_levels_out_of_order() {
        let provider = LayeredProvider::new()
            .with(StaticProvider::new("cli").with("flutter.minSdkVersion", "35"))
            .with(FrameworkDefaults::new());
        let err = template().resolve("release", &provider).unwrap_err();

        assert_eq!(err.fields(), vec!["android.default_config.min_sdk"]);
    }

    #[test]
    fn test_variant_overrides_apply() {
        let doc = FLUTTER_TEMPLATE.replace(
            "[framework]",
            r#"[[dependencies]]
configuration = "debugImplementation"
notation = "com.squareup.leakcanary:leakcanary-android:2.14"

[framework]"#,
        ) + r#"
[android.build_types.debug]
application_id_suffix = ".dev"
version_name_suffix = "-dev"
multidex = false
"#;
        let config = load(&doc, DocumentFormat::Toml).unwrap();
        let debug = config.resolve("debug", &FrameworkDefaults::new()).unwrap();
        let release = config.resolve("release", &FrameworkDefaults::new()).unwrap();

        assert_eq!(debug.application_id, "com.example.connect.dev");
        assert_eq!(debug.version_name.as_deref(), Some("1.0-dev"));
        assert!(!debug.multidex);
        assert!(debug.debuggable);
        assert_eq!(debug.dependencies.len(), 2);

        assert_eq!(release.application_id, "com.example.connect");
        assert!(release.multidex);
        assert_eq!(release.dependencies.len(), 1);
    }

    #[test]
    fn test_provided_signing_secrets() {
        let doc = FLUTTER_TEMPLATE.replace("signing_config = \"debug\"", "signing_config = \"upload\"")
            + r#"
[android.signing_configs.upload]
store_file = { from = "UPLOAD_STORE_FILE" }
store_password = { from = "UPLOAD_STORE_PASSWORD" }
key_alias = "upload"
key_password = { from = "UPLOAD_KEY_PASSWORD" }
"#;
        let config = load(&doc, DocumentFormat::Toml).unwrap();
        let provider = LayeredProvider::new()
            .with(
                StaticProvider::new("ci")
                    .with("UPLOAD_STORE_FILE", "/secrets/upload.jks")
                    .with("UPLOAD_STORE_PASSWORD", "s3cret")
                    .with("UPLOAD_KEY_PASSWORD", "k3y"),
            )
            .with(FrameworkDefaults::new());
        let settings = config.resolve("release", &provider).unwrap();

        let signing = settings.signing.as_ref().unwrap();
        assert_eq!(signing.store_file.as_deref(), Some("/secrets/upload.jks"));
        assert_eq!(signing.store_password.as_ref().unwrap().expose(), "s3cret");
        assert!(!signing.development);

        assert!(settings.provided.contains_key("UPLOAD_STORE_FILE"));
        assert!(!settings.provided.contains_key("UPLOAD_STORE_PASSWORD"));
        assert!(!settings.provided.contains_key("UPLOAD_KEY_PASSWORD"));

        let json = serde_json::to_string(&settings).unwrap();
        assert!(!json.contains("s3cret"));
        assert!(!json.contains("k3y"));
        let debug = format!("{:?}", settings);
        assert!(!debug.contains("s3cret"));
        assert!(!debug.contains("k3y"));
    }

    #[test]
    fn test_secret_key_shared_with_plain_field_is_not_listed() {
        let doc = FLUTTER_TEMPLATE.replace("signing_config = \"debug\"", "signing_config = \"upload\"")
            + r#"
[android.signing_configs.upload]
store_file = "upload.jks"
store_password = { from = "KEYSTORE_SECRET" }
key_alias = { from = "KEYSTORE_SECRET" }
key_password = { from = "KEYSTORE_SECRET" }
"#;
        let config = load(&doc, DocumentFormat::Toml).unwrap();
        let provider = LayeredProvider::new()
            .with(StaticProvider::new("ci").with("KEYSTORE_SECRET", "s3cret"))
            .with(FrameworkDefaults::new());
        let settings = config.resolve("release", &provider).unwrap();

        assert!(!settings.provided.contains_key("KEYSTORE_SECRET"));
        assert!(settings.provided.contains_key("flutter.versionCode"));
        assert_eq!(
            settings.signing.as_ref().unwrap().key_password.as_ref().unwrap().expose(),
            "s3cret"
        );
    }

    #[test]
    fn test_resolve_is_deterministic() {
        let config = template();
        let provider = LayeredProvider::new()
            .with(local_properties())
            .with(FrameworkDefaults::new());

        let first = config.resolve("release", &provider).unwrap();
        let second = config.resolve("release", &provider).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }
}
