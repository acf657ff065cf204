//! Loading and validating build configuration documents
//!
//! `load` parses a document and checks every cross-field rule the host build
//! would otherwise trip over at build time: signing references, plugin order,
//! literal SDK bounds, dependency pins and identifiers. All problems are
//! collected before failing so the error names every offending key.

use crate::dependency::{self, DESUGARING_CONFIGURATION};
use crate::error::{ConfigError, Result};
use crate::plugin::{self, PluginRole};
use crate::provider::ConfigProvider;
use crate::record::{BuildConfigRecord, DocumentFormat};
use crate::resolve::{self, ResolvedSettings};
use crate::setting::Setting;
use crate::signing::{SigningIdentity, DEVELOPMENT_IDENTITY};
use crate::variant::{Variant, BUILTIN_VARIANTS, RESERVED_NAMES};
use droidcfg_core::validation::{ValidationIssue, ValidationResult, Validator};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

pub(crate) static JAVA_PACKAGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9_]*(\.[A-Za-z][A-Za-z0-9_]*)+$").unwrap()
});

static ID_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\.[A-Za-z][A-Za-z0-9_]*)+$").unwrap());

static VARIANT_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z][A-Za-z0-9]*$").unwrap());

static NDK_VERSION: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+(\.\d+)+$").unwrap());

const PLACEHOLDER_PREFIX: &str = "com.example.";

/// Options controlling `load`
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadOptions {
    /// Treat warnings as errors
    pub strict: bool,
}

/// A validated, read-only build configuration
#[derive(Debug, Clone)]
pub struct BuildConfig {
    record: BuildConfigRecord,
    variants: BTreeMap<String, Variant>,
    signing_identities: BTreeMap<String, SigningIdentity>,
    report: ValidationResult,
}

impl BuildConfig {
    /// The parsed document
    pub fn record(&self) -> &BuildConfigRecord {
        &self.record
    }

    /// Look a variant up by name
    pub fn variant(&self, name: &str) -> Option<&Variant> {
        self.variants.get(name)
    }

    /// All variants, sorted by name
    pub fn variants(&self) -> impl Iterator<Item = &Variant> {
        self.variants.values()
    }

    /// Variant names, sorted
    pub fn variant_names(&self) -> Vec<String> {
        self.variants.keys().cloned().collect()
    }

    /// Look a signing identity up by name, including the implicit development identity
    pub fn signing_identity(&self, name: &str) -> Option<&SigningIdentity> {
        self.signing_identities.get(name)
    }

    /// Validation report; holds warnings only, since errors abort loading
    pub fn report(&self) -> &ValidationResult {
        &self.report
    }

    /// Warnings found while loading
    pub fn warnings(&self) -> &[ValidationIssue] {
        self.report.warnings()
    }

    /// Merged settings for one variant; see [`resolve::resolve`]
    pub fn resolve(&self, variant: &str, provider: &dyn ConfigProvider) -> Result<ResolvedSettings> {
        resolve::resolve(self, variant, provider)
    }
}

/// Parse and validate a document with default options
pub fn load(doc: &str, format: DocumentFormat) -> Result<BuildConfig> {
    load_with_options(doc, format, LoadOptions::default())
}

/// Parse and validate a document
pub fn load_with_options(doc: &str, format: DocumentFormat, options: LoadOptions) -> Result<BuildConfig> {
    let record = BuildConfigRecord::parse(doc, format)?;
    from_record(record, options)
}

/// Read, parse and validate a document; the format follows the file extension
pub fn load_file(path: &Path, options: LoadOptions) -> Result<BuildConfig> {
    let doc = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), "Loading build configuration");
    load_with_options(&doc, DocumentFormat::from_path(path), options)
}

/// Validate an already parsed record
pub fn from_record(record: BuildConfigRecord, options: LoadOptions) -> Result<BuildConfig> {
    let signing_identities = collect_signing_identities(&record);
    let variants = merge_variants(&record);

    let mut report = validate(&record, &variants, &signing_identities);
    if options.strict {
        report.promote_warnings();
    }
    for warning in report.warnings() {
        debug!(field = %warning.field, "{}", warning.message);
    }
    if !report.is_valid() {
        return Err(ConfigError::Validation(report));
    }

    info!(
        namespace = %record.android.namespace,
        variants = variants.len(),
        warnings = report.warnings().len(),
        "Build configuration loaded"
    );

    Ok(BuildConfig {
        record,
        variants,
        signing_identities,
        report,
    })
}

fn collect_signing_identities(record: &BuildConfigRecord) -> BTreeMap<String, SigningIdentity> {
    let mut identities = BTreeMap::new();
    identities.insert(DEVELOPMENT_IDENTITY.to_string(), SigningIdentity::development());
    for (name, identity) in &record.android.signing_configs {
        identities.insert(name.clone(), identity.clone());
    }
    identities
}

fn merge_variants(record: &BuildConfigRecord) -> BTreeMap<String, Variant> {
    let mut variants: BTreeMap<String, Variant> = BUILTIN_VARIANTS
        .iter()
        .map(|name| (name.to_string(), Variant::builtin(name)))
        .collect();
    for (name, overrides) in &record.android.build_types {
        let base = variants
            .remove(name)
            .unwrap_or_else(|| Variant::builtin(name));
        variants.insert(name.clone(), base.overlay(overrides));
    }
    variants
}

fn validate(
    record: &BuildConfigRecord,
    variants: &BTreeMap<String, Variant>,
    identities: &BTreeMap<String, SigningIdentity>,
) -> ValidationResult {
    let mut result = validate_identity(record);
    result.merge(validate_versions(record));
    result.merge(validate_compile_options(record));
    result.merge(plugin::check_plugins(&record.plugins));
    result.merge(validate_plugin_usage(record));
    result.merge(validate_signing_configs(record));
    result.merge(validate_variants(variants, identities));
    result.merge(validate_desugaring(record));

    let variant_names: Vec<&str> = variants.keys().map(String::as_str).collect();
    result.merge(dependency::check_dependencies(&record.dependencies, &variant_names));
    result
}

fn validate_identity(record: &BuildConfigRecord) -> ValidationResult {
    let mut validator = Validator::new()
        .required("android.namespace", &record.android.namespace)
        .pattern(
            "android.namespace",
            &record.android.namespace,
            &JAVA_PACKAGE,
            "a dotted Java package name",
        );

    if let Some(application_id) = &record.android.default_config.application_id {
        validator = validator.pattern(
            "android.default_config.application_id",
            application_id,
            &JAVA_PACKAGE,
            "a dotted Java package name",
        );
    }

    let application_id = record.base_application_id();
    validator
        .warn_if(
            "android.default_config.application_id",
            application_id.starts_with(PLACEHOLDER_PREFIX),
            "Application id uses the com.example placeholder; distribution channels reject it",
        )
        .validate()
}

fn check_provider_key<T>(validator: Validator, field: &str, setting: &Setting<T>) -> Validator {
    match setting.provider_key() {
        Some(key) => validator.required(field, key),
        None => validator,
    }
}

fn validate_versions(record: &BuildConfigRecord) -> ValidationResult {
    let android = &record.android;
    let defaults = &android.default_config;
    let sdk_fields = [
        ("android.compile_sdk", &android.compile_sdk),
        ("android.default_config.min_sdk", &defaults.min_sdk),
        ("android.default_config.target_sdk", &defaults.target_sdk),
    ];

    let mut validator = Validator::new();
    for (field, setting) in sdk_fields {
        validator = check_provider_key(validator, field, setting);
        if let Some(level) = setting.literal() {
            validator = validator.at_least(field, *level, 1);
        }
    }

    if let (Some(min), Some(target)) = (defaults.min_sdk.literal(), defaults.target_sdk.literal()) {
        validator = validator.ordered(
            "android.default_config.min_sdk",
            *min,
            "android.default_config.target_sdk",
            *target,
        );
    }
    if let (Some(target), Some(compile)) = (defaults.target_sdk.literal(), android.compile_sdk.literal()) {
        validator = validator.ordered(
            "android.default_config.target_sdk",
            *target,
            "android.compile_sdk",
            *compile,
        );
    }

    if let Some(code) = &defaults.version_code {
        validator = check_provider_key(validator, "android.default_config.version_code", code);
        if let Some(code) = code.literal() {
            validator = validator.at_least("android.default_config.version_code", *code, 1);
        }
    }
    if let Some(name) = &defaults.version_name {
        validator = check_provider_key(validator, "android.default_config.version_name", name);
        if let Some(name) = name.literal() {
            validator = validator.required("android.default_config.version_name", name);
        }
    }

    if let Some(ndk) = &android.ndk_version {
        validator = check_provider_key(validator, "android.ndk_version", ndk);
        if let Some(version) = ndk.literal() {
            validator = validator.pattern(
                "android.ndk_version",
                version,
                &NDK_VERSION,
                "a dotted numeric NDK version",
            );
        }
    }

    let native_multidex = defaults.min_sdk.literal().is_some_and(|min| *min >= 21);
    validator
        .warn_if(
            "android.default_config.multidex",
            defaults.multidex && native_multidex,
            "Multidex is built in from min_sdk 21; the flag has no effect",
        )
        .validate()
}

fn validate_compile_options(record: &BuildConfigRecord) -> ValidationResult {
    let options = &record.android.compile_options;
    let mut validator = Validator::new().ordered(
        "android.compile_options.source_compatibility",
        options.source_compatibility,
        "android.compile_options.target_compatibility",
        options.target_compatibility,
    );

    if let Some(kotlin) = &record.android.kotlin_options {
        let target = options.target_compatibility;
        validator = validator.custom("android.kotlin_options.jvm_target", || {
            (kotlin.jvm_target != target).then(|| {
                format!(
                    "JVM target {} is inconsistent with target_compatibility {}",
                    kotlin.jvm_target, target
                )
            })
        });
    }

    validator.validate()
}

fn validate_plugin_usage(record: &BuildConfigRecord) -> ValidationResult {
    let has_glue = plugin::has_role(&record.plugins, PluginRole::FrameworkGlue);
    let mut result = ValidationResult::new();

    if record.android.kotlin_options.is_some() && !plugin::has_role(&record.plugins, PluginRole::Language) {
        result.add_error(ValidationIssue::new(
            "android.kotlin_options",
            "UNDECLARED_PLUGIN",
            "kotlin_options requires a Kotlin plugin (kotlin-android)",
        ));
    }

    match &record.framework {
        Some(_) if !has_glue => result.add_error(ValidationIssue::new(
            "framework",
            "UNDECLARED_PLUGIN",
            format!("The framework section requires the {} plugin", plugin::FLUTTER_GRADLE_PLUGIN),
        )),
        Some(framework) if framework.source.trim().is_empty() => result.add_error(
            ValidationIssue::new("framework.source", "REQUIRED", "Field is required"),
        ),
        None if has_glue => result.add_error(ValidationIssue::new(
            "framework.source",
            "REQUIRED",
            "The framework plugin needs the shared source root",
        )),
        _ => {}
    }

    result
}

fn validate_signing_configs(record: &BuildConfigRecord) -> ValidationResult {
    let mut result = ValidationResult::new();

    for (name, identity) in &record.android.signing_configs {
        let prefix = format!("android.signing_configs.{}", name);
        if !VARIANT_NAME.is_match(name) {
            result.add_error(ValidationIssue::new(
                &prefix,
                "NAME",
                "Signing identity names must be lowerCamel identifiers",
            ));
        }
        if name == DEVELOPMENT_IDENTITY {
            continue;
        }

        let required = [
            ("store_file", identity.store_file.is_some()),
            ("store_password", identity.store_password.is_some()),
            ("key_alias", identity.key_alias.is_some()),
            ("key_password", identity.key_password.is_some()),
        ];
        for (field, present) in required {
            if !present {
                result.add_error(ValidationIssue::new(
                    format!("{}.{}", prefix, field),
                    "REQUIRED",
                    "Field is required",
                ));
            }
        }
        for field in identity.literal_passwords() {
            result.add_warning(ValidationIssue::new(
                format!("{}.{}", prefix, field),
                "LITERAL_SECRET",
                "Password is stored in the document; prefer { from = \"<key>\" }",
            ));
        }
    }

    result
}

fn validate_variants(
    variants: &BTreeMap<String, Variant>,
    identities: &BTreeMap<String, SigningIdentity>,
) -> ValidationResult {
    let mut result = ValidationResult::new();

    for (name, variant) in variants {
        let prefix = format!("android.build_types.{}", name);

        if !VARIANT_NAME.is_match(name) {
            result.add_error(
                ValidationIssue::new(&prefix, "NAME", "Variant names must be lowerCamel identifiers")
                    .with_values("lowerCamel identifier", name.as_str()),
            );
        }
        if RESERVED_NAMES.contains(&name.as_str()) {
            result.add_error(ValidationIssue::new(
                &prefix,
                "RESERVED_NAME",
                format!("'{}' is reserved for source sets", name),
            ));
        }

        if let Some(signing) = &variant.signing_config {
            if !identities.contains_key(signing) {
                let known: Vec<&str> = identities.keys().map(String::as_str).collect();
                result.add_error(
                    ValidationIssue::new(
                        format!("{}.signing_config", prefix),
                        "UNDEFINED_SIGNING_IDENTITY",
                        format!("Signing identity '{}' is not defined", signing),
                    )
                    .with_values(known.join(", "), signing.as_str()),
                );
            }
        }

        if let Some(suffix) = &variant.application_id_suffix {
            if !ID_SUFFIX.is_match(suffix) {
                result.add_error(
                    ValidationIssue::new(
                        format!("{}.application_id_suffix", prefix),
                        "PATTERN",
                        "Must be one or more .segment parts",
                    )
                    .with_values(".segment", suffix.as_str()),
                );
            }
        }
        if let Some(suffix) = &variant.version_name_suffix {
            if suffix.trim().is_empty() {
                result.add_error(ValidationIssue::new(
                    format!("{}.version_name_suffix", prefix),
                    "REQUIRED",
                    "Suffix must not be blank",
                ));
            }
        }

        if !variant.debuggable {
            match &variant.signing_config {
                Some(_) if variant.uses_development_signing() => result.add_warning(ValidationIssue::new(
                    format!("{}.signing_config", prefix),
                    "DEVELOPMENT_SIGNING",
                    "Signed with the development identity; replace it before distributing",
                )),
                None if name == "release" => result.add_warning(ValidationIssue::new(
                    format!("{}.signing_config", prefix),
                    "UNSIGNED",
                    "No signing identity; the output cannot be installed as is",
                )),
                _ => {}
            }
        }
    }

    result
}

fn validate_desugaring(record: &BuildConfigRecord) -> ValidationResult {
    let enabled = record.android.compile_options.core_library_desugaring;
    let shims: Vec<usize> = record
        .dependencies
        .iter()
        .enumerate()
        .filter(|(_, dep)| dep.configuration == DESUGARING_CONFIGURATION)
        .map(|(index, _)| index)
        .collect();

    let mut result = ValidationResult::new();
    if enabled && shims.is_empty() {
        result.add_error(ValidationIssue::new(
            "android.compile_options.core_library_desugaring",
            "MISSING_DEPENDENCY",
            format!(
                "Desugaring needs a {} dependency (e.g. com.android.tools:desugar_jdk_libs)",
                DESUGARING_CONFIGURATION
            ),
        ));
    }
    if !enabled {
        for index in shims {
            result.add_warning(ValidationIssue::new(
                format!("dependencies[{}].configuration", index),
                "UNUSED_DEPENDENCY",
                "Desugaring library declared but core_library_desugaring is off",
            ));
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{literal_doc, FLUTTER_TEMPLATE};
    use tempfile::TempDir;

    fn load_toml(doc: &str) -> Result<BuildConfig> {
        load(doc, DocumentFormat::Toml)
    }

    fn failing_fields(doc: &str) -> Vec<String> {
        match load_toml(doc) {
            Err(ConfigError::Validation(result)) => result
                .failing_fields()
                .into_iter()
                .map(String::from)
                .collect(),
            other => panic!("expected validation failure, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_flutter_template_loads() {
        let config = load_toml(FLUTTER_TEMPLATE).unwrap();

        assert_eq!(config.variant_names(), vec!["debug", "release"]);
        assert!(config.variant("release").unwrap().uses_development_signing());
        assert!(config.signing_identity("debug").is_some());

        let codes: Vec<&str> = config.warnings().iter().map(|w| w.code.as_str()).collect();
        assert!(codes.contains(&"DEVELOPMENT_SIGNING"));
        assert!(codes.contains(&"WARNING"), "placeholder application id warning");
    }

    #[test]
    fn test_strict_mode_rejects_template() {
        let err = load_with_options(
            FLUTTER_TEMPLATE,
            DocumentFormat::Toml,
            LoadOptions { strict: true },
        )
        .unwrap_err();
        assert!(err.fields().contains(&"android.build_types.release.signing_config"));
    }

    #[test]
    fn test_literal_sdk_levels_in_order() {
        assert!(load_toml(&literal_doc(21, 34, 34)).is_ok());
    }

    #[test]
    fn test_min_above_target_fails() {
        assert_eq!(
            failing_fields(&literal_doc(35, 34, 34)),
            vec!["android.default_config.min_sdk"]
        );
    }

    #[test]
    fn test_target_above_compile_fails() {
        assert_eq!(
            failing_fields(&literal_doc(21, 35, 34)),
            vec!["android.default_config.target_sdk"]
        );
    }

    #[test]
    fn test_zero_sdk_fails() {
        assert!(failing_fields(&literal_doc(0, 34, 34)).contains(&"android.default_config.min_sdk".to_string()));
    }

    #[test]
    fn test_undefined_signing_identity_fails() {
        let doc = FLUTTER_TEMPLATE.replace("signing_config = \"debug\"", "signing_config = \"upload\"");
        assert_eq!(
            failing_fields(&doc),
            vec!["android.build_types.release.signing_config"]
        );
    }

    #[test]
    fn test_declared_signing_identity_resolves_reference() {
        let doc = FLUTTER_TEMPLATE.replace("signing_config = \"debug\"", "signing_config = \"upload\"")
            + r#"
[android.signing_configs.upload]
store_file = "upload-keystore.jks"
store_password = { from = "UPLOAD_STORE_PASSWORD" }
key_alias = "upload"
key_password = { from = "UPLOAD_KEY_PASSWORD" }
"#;
        let config = load_toml(&doc).unwrap();
        assert_eq!(
            config.variant("release").unwrap().signing_config.as_deref(),
            Some("upload")
        );
        assert!(!config.warnings().iter().any(|w| w.code == "DEVELOPMENT_SIGNING"));
    }

    #[test]
    fn test_incomplete_signing_identity_fails() {
        let doc = FLUTTER_TEMPLATE.to_string()
            + "\n[android.signing_configs.upload]\nstore_file = \"upload.jks\"\nkey_alias = \"upload\"\n";
        assert_eq!(
            failing_fields(&doc),
            vec![
                "android.signing_configs.upload.store_password",
                "android.signing_configs.upload.key_password",
            ]
        );
    }

    #[test]
    fn test_framework_plugin_before_kotlin_fails() {
        let doc = FLUTTER_TEMPLATE.replace(
            r#"plugins = ["com.android.application", "kotlin-android", "dev.flutter.flutter-gradle-plugin"]"#,
            r#"plugins = ["com.android.application", "dev.flutter.flutter-gradle-plugin", "kotlin-android"]"#,
        );
        assert_eq!(failing_fields(&doc), vec!["plugins[1]"]);
    }

    #[test]
    fn test_framework_section_without_plugin_fails() {
        let doc = FLUTTER_TEMPLATE.replace(", \"dev.flutter.flutter-gradle-plugin\"", "");
        assert_eq!(failing_fields(&doc), vec!["framework"]);
    }

    #[test]
    fn test_kotlin_options_without_kotlin_plugin_fails() {
        let doc = FLUTTER_TEMPLATE.replace("\"kotlin-android\", ", "");
        assert_eq!(failing_fields(&doc), vec!["android.kotlin_options"]);
    }

    #[test]
    fn test_inconsistent_jvm_target_fails() {
        let doc = FLUTTER_TEMPLATE.replace("jvm_target = \"11\"", "jvm_target = \"17\"");
        assert_eq!(failing_fields(&doc), vec!["android.kotlin_options.jvm_target"]);
    }

    #[test]
    fn test_desugaring_without_shim_fails() {
        let doc = FLUTTER_TEMPLATE.replace(
            "[[dependencies]]\nconfiguration = \"coreLibraryDesugaring\"\nnotation = \"com.android.tools:desugar_jdk_libs:2.0.4\"\n",
            "",
        );
        assert_eq!(
            failing_fields(&doc),
            vec!["android.compile_options.core_library_desugaring"]
        );
    }

    #[test]
    fn test_shim_without_desugaring_warns() {
        let doc = FLUTTER_TEMPLATE.replace("core_library_desugaring = true", "core_library_desugaring = false");
        let config = load_toml(&doc).unwrap();
        assert!(config.warnings().iter().any(|w| w.field == "dependencies[0].configuration"));
    }

    #[test]
    fn test_floating_dependency_version_fails() {
        let doc = FLUTTER_TEMPLATE.replace("desugar_jdk_libs:2.0.4", "desugar_jdk_libs:2.+");
        assert_eq!(failing_fields(&doc), vec!["dependencies[0].notation"]);
    }

    #[test]
    fn test_invalid_namespace_fails() {
        let doc = FLUTTER_TEMPLATE.replace("namespace = \"com.example.connect\"", "namespace = \"connect\"");
        assert_eq!(failing_fields(&doc), vec!["android.namespace"]);
    }

    #[test]
    fn test_reserved_variant_name_fails() {
        let doc = FLUTTER_TEMPLATE.to_string() + "\n[android.build_types.test]\ndebuggable = true\n";
        assert_eq!(failing_fields(&doc), vec!["android.build_types.test"]);
    }

    #[test]
    fn test_bad_application_id_suffix_fails() {
        let doc = FLUTTER_TEMPLATE.to_string()
            + "\n[android.build_types.debug]\napplication_id_suffix = \"dev\"\n";
        assert_eq!(
            failing_fields(&doc),
            vec!["android.build_types.debug.application_id_suffix"]
        );
    }

    #[test]
    fn test_custom_variant_is_added() {
        let doc = FLUTTER_TEMPLATE.to_string()
            + "\n[android.build_types.profile]\nsigning_config = \"debug\"\nminify = true\n";
        let config = load_toml(&doc).unwrap();

        assert_eq!(config.variant_names(), vec!["debug", "profile", "release"]);
        let profile = config.variant("profile").unwrap();
        assert!(profile.minify);
        assert!(profile.declared);
    }

    #[test]
    fn test_multidex_with_native_min_sdk_warns() {
        let doc = literal_doc(21, 34, 34).replace("target_sdk = 34", "target_sdk = 34\nmultidex = true");
        let config = load_toml(&doc).unwrap();
        assert!(config
            .warnings()
            .iter()
            .any(|w| w.field == "android.default_config.multidex"));
    }

    #[test]
    fn test_load_file_json() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("app.json");
        let record = BuildConfigRecord::parse(&literal_doc(21, 34, 34), DocumentFormat::Toml).unwrap();
        std::fs::write(&path, serde_json::to_string_pretty(&record).unwrap()).unwrap();

        let config = load_file(&path, LoadOptions::default()).unwrap();
        assert_eq!(config.record(), &record);
    }

    #[test]
    fn test_load_file_missing() {
        let err = load_file(Path::new("/nonexistent/droidcfg.toml"), LoadOptions::default()).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    mod properties {
        use super::*;
        use crate::provider::StaticProvider;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn literal_sdk_levels_load_iff_ordered(
                min in 0u32..40,
                target in 0u32..40,
                compile in 0u32..40,
            ) {
                let ordered = min >= 1 && min <= target && target <= compile;
                prop_assert_eq!(load_toml(&literal_doc(min, target, compile)).is_ok(), ordered);
            }

            #[test]
            fn resolve_is_deterministic(
                min in 1u32..20,
                extra_target in 0u32..10,
                extra_compile in 0u32..10,
            ) {
                let target = min + extra_target;
                let compile = target + extra_compile;
                let config = load_toml(&literal_doc(min, target, compile)).unwrap();
                let provider = StaticProvider::new("empty");

                let first = config.resolve("release", &provider).unwrap();
                let second = config.resolve("release", &provider).unwrap();
                prop_assert_eq!(first.min_sdk, min);
                prop_assert_eq!(first.compile_sdk, compile);
                prop_assert_eq!(first, second);
            }
        }
    }
}
