//! droidcfg CLI
//!
//! Validate, resolve and render Android application build configurations.

use anyhow::Result;
use clap::{Parser, Subcommand};
use droidcfg_android::{
    load_file, render_gradle_kts, BuildConfig, ConfigError, EnvProvider, FrameworkDefaults,
    LayeredProvider, LoadOptions, PropertiesProvider, ResolvedSettings, StaticProvider,
};
use droidcfg_cli::output::{self, format_count, format_duration, Status};
use droidcfg_core::config::{ProviderSettings, Settings, SettingsSchema};
use droidcfg_core::error::{exit_codes, Error};
use droidcfg_telemetry::{TelemetryConfig, Timer};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Parser)]
#[command(name = "droidcfg")]
#[command(about = "Validate, resolve and render Android application build configurations")]
#[command(version)]
struct Cli {
    /// Tool settings file (default: .droidcfg.toml search)
    #[arg(short, long, global = true)]
    settings: Option<PathBuf>,

    /// Increase log verbosity
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a build configuration document
    Validate {
        /// Document path (default: general.config_file)
        file: Option<PathBuf>,
        /// Treat warnings as errors
        #[arg(long)]
        strict: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Resolve the merged settings of one variant
    Resolve {
        /// Document path (default: general.config_file)
        file: Option<PathBuf>,
        /// Variant name
        #[arg(long)]
        variant: String,
        /// Properties file consulted for provider references
        #[arg(long)]
        properties: Option<PathBuf>,
        /// Provider value override, highest precedence
        #[arg(long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List variants and their signing identities
    Variants {
        /// Document path (default: general.config_file)
        file: Option<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Render the document as build.gradle.kts
    Render {
        /// Document path (default: general.config_file)
        file: Option<PathBuf>,
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.no_color {
        output::set_color(false);
    }

    let settings = match Settings::load(cli.settings.as_deref()) {
        Ok(settings) => settings,
        Err(err) => {
            Status::error(&err.to_string());
            std::process::exit(err.code.exit_code());
        }
    };

    let mut telemetry =
        TelemetryConfig::from_verbosity(&settings.schema.logging.level, cli.verbose, cli.quiet);
    if cli.no_color {
        telemetry = telemetry.without_ansi();
    }
    droidcfg_telemetry::init_with_config(telemetry)?;
    if let Some(path) = &settings.path {
        debug!(path = %path.display(), "Using tool settings");
    }

    let schema = &settings.schema;
    let exit_code = match cli.command {
        Commands::Validate { file, strict, json } => {
            run_validate(&document_path(file, schema), strict || schema.general.strict, json)
        }
        Commands::Resolve {
            file,
            variant,
            properties,
            set,
            json,
        } => run_resolve(
            &document_path(file, schema),
            &variant,
            properties.as_deref(),
            &set,
            json,
            schema,
        ),
        Commands::Variants { file, json } => {
            run_variants(&document_path(file, schema), json, schema)
        }
        Commands::Render { file, output } => {
            run_render(&document_path(file, schema), output.as_deref(), schema)
        }
    };

    std::process::exit(exit_code);
}

fn document_path(file: Option<PathBuf>, schema: &SettingsSchema) -> PathBuf {
    file.unwrap_or_else(|| PathBuf::from(&schema.general.config_file))
}

/// Print an error and return its exit code
fn report(err: impl Into<Error>, json: bool) -> i32 {
    let err: Error = err.into();
    if json {
        print_json(&err.to_report());
    } else {
        Status::error(&err.to_string());
    }
    err.code.exit_code()
}

fn print_json(value: &impl serde::Serialize) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(e) => Status::error(&format!("Failed to serialize output: {}", e)),
    }
}

fn load(path: &Path, schema: &SettingsSchema) -> Result<BuildConfig, ConfigError> {
    load_file(path, LoadOptions { strict: schema.general.strict })
}

fn run_validate(path: &Path, strict: bool, json: bool) -> i32 {
    let timer = Timer::start("validate");

    match load_file(path, LoadOptions { strict }) {
        Ok(config) => {
            let elapsed = timer.stop();
            let warnings = config.warnings();
            if json {
                print_json(&serde_json::json!({
                    "file": path.display().to_string(),
                    "valid": true,
                    "errors": [],
                    "warnings": warnings,
                }));
            } else {
                for warning in warnings {
                    Status::issue_warning(warning);
                }
                Status::success(&format!(
                    "{} is valid ({}, {})",
                    path.display(),
                    format_count(warnings.len(), "warning", "warnings"),
                    format_duration(elapsed)
                ));
            }
            exit_codes::SUCCESS
        }
        Err(ConfigError::Validation(result)) => {
            if json {
                print_json(&serde_json::json!({
                    "file": path.display().to_string(),
                    "valid": false,
                    "errors": result.errors(),
                    "warnings": result.warnings(),
                }));
            } else {
                for error in result.errors() {
                    Status::issue_error(error);
                }
                for warning in result.warnings() {
                    Status::issue_warning(warning);
                }
                Status::error(&format!(
                    "{} failed validation ({})",
                    path.display(),
                    format_count(result.errors().len(), "error", "errors")
                ));
            }
            exit_codes::VALIDATION_ERROR
        }
        Err(err) => report(err, json),
    }
}

/// Provider chain, highest precedence first: `--set` values, the properties
/// file, the environment, then the framework defaults
fn build_provider(
    settings: &ProviderSettings,
    properties: Option<&Path>,
    assignments: &[String],
) -> Result<LayeredProvider, ConfigError> {
    let mut provider = LayeredProvider::new();

    if !assignments.is_empty() {
        provider.push(StaticProvider::from_assignments(
            "command line",
            assignments.iter().map(String::as_str),
        )?);
    }

    match properties {
        Some(path) => provider.push(PropertiesProvider::from_file(path)?),
        None => {
            let path = Path::new(&settings.properties_file);
            if path.is_file() {
                provider.push(PropertiesProvider::from_file(path)?);
            } else {
                debug!(path = %path.display(), "No properties file, skipping");
            }
        }
    }

    provider.push(EnvProvider::new(settings.env_prefix.clone()));

    if settings.framework_defaults {
        provider.push(FrameworkDefaults::new());
    }

    Ok(provider)
}

fn settings_rows(settings: &ResolvedSettings) -> Vec<(String, String)> {
    let or_none = |value: Option<String>| value.unwrap_or_else(|| "-".to_string());
    let signing = match &settings.signing {
        Some(signing) if signing.development => format!("{} (development)", signing.name),
        Some(signing) => signing.name.clone(),
        None => "unsigned".to_string(),
    };

    vec![
        ("namespace".into(), settings.namespace.clone()),
        ("application_id".into(), settings.application_id.clone()),
        ("compile_sdk".into(), settings.compile_sdk.to_string()),
        ("min_sdk".into(), settings.min_sdk.to_string()),
        ("target_sdk".into(), settings.target_sdk.to_string()),
        (
            "version_code".into(),
            or_none(settings.version_code.map(|c| c.to_string())),
        ),
        ("version_name".into(), or_none(settings.version_name.clone())),
        ("ndk_version".into(), or_none(settings.ndk_version.clone())),
        (
            "java".into(),
            format!(
                "source {} / target {}",
                settings.source_compatibility, settings.target_compatibility
            ),
        ),
        (
            "jvm_target".into(),
            or_none(settings.jvm_target.map(|v| v.to_string())),
        ),
        (
            "desugaring".into(),
            settings.core_library_desugaring.to_string(),
        ),
        ("multidex".into(), settings.multidex.to_string()),
        ("minify".into(), settings.minify.to_string()),
        ("debuggable".into(), settings.debuggable.to_string()),
        ("signing".into(), signing),
        (
            "dependencies".into(),
            format_count(settings.dependencies.len(), "dependency", "dependencies"),
        ),
    ]
}

/// Provider-sourced values with the layer that supplied each one.
/// Signing secrets never reach `provided`, so values are shown as they are.
fn provided_rows(settings: &ResolvedSettings) -> Vec<(String, String)> {
    settings
        .provided
        .iter()
        .map(|(key, provided)| {
            (
                key.clone(),
                format!("{}  [{}]", provided.value, provided.source),
            )
        })
        .collect()
}

fn run_resolve(
    path: &Path,
    variant: &str,
    properties: Option<&Path>,
    assignments: &[String],
    json: bool,
    schema: &SettingsSchema,
) -> i32 {
    droidcfg_telemetry::timed_span!("resolve", variant = variant);

    let config = match load(path, schema) {
        Ok(config) => config,
        Err(err) => return report(err, json),
    };
    let provider = match build_provider(&schema.provider, properties, assignments) {
        Ok(provider) => provider,
        Err(err) => return report(err, json),
    };
    debug!(layers = ?provider.layer_names(), "Provider chain");

    let resolved = match config.resolve(variant, &provider) {
        Ok(resolved) => resolved,
        Err(err) => return report(err, json),
    };

    if json {
        print_json(&resolved);
        return exit_codes::SUCCESS;
    }

    Status::header(&format!("{} ({})", resolved.application_id, resolved.variant));
    Status::table(&settings_rows(&resolved));
    if !resolved.provided.is_empty() {
        Status::header("Provided values");
        Status::table(&provided_rows(&resolved));
    }
    if resolved.uses_development_signing() && !resolved.debuggable {
        Status::warning(&format!(
            "{} is signed with the development identity; replace it before distributing",
            resolved.variant
        ));
    }
    exit_codes::SUCCESS
}

fn run_variants(path: &Path, json: bool, schema: &SettingsSchema) -> i32 {
    let config = match load(path, schema) {
        Ok(config) => config,
        Err(err) => return report(err, json),
    };

    if json {
        let variants: Vec<_> = config.variants().collect();
        print_json(&variants);
        return exit_codes::SUCCESS;
    }

    let rows: Vec<(String, String)> = config
        .variants()
        .map(|variant| {
            let signing = match &variant.signing_config {
                Some(name) if variant.uses_development_signing() => {
                    format!("signed by {} (development)", name)
                }
                Some(name) => format!("signed by {}", name),
                None => "unsigned".to_string(),
            };
            let mut traits = vec![signing];
            if variant.debuggable {
                traits.push("debuggable".to_string());
            }
            if variant.minify {
                traits.push("minified".to_string());
            }
            (variant.name.clone(), traits.join(", "))
        })
        .collect();

    Status::header(&format_count(rows.len(), "variant", "variants"));
    Status::table(&rows);
    exit_codes::SUCCESS
}

fn run_render(path: &Path, output: Option<&Path>, schema: &SettingsSchema) -> i32 {
    let script = match load(path, schema).and_then(|config| render_gradle_kts(&config)) {
        Ok(script) => script,
        Err(err) => return report(err, false),
    };

    match output {
        Some(target) => match std::fs::write(target, &script) {
            Ok(()) => {
                Status::success(&format!("Wrote {}", target.display()));
                exit_codes::SUCCESS
            }
            Err(e) => report(
                Error::from(e).with_context(format!("While writing {}", target.display())),
                false,
            ),
        },
        None => {
            print!("{}", script);
            exit_codes::SUCCESS
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use droidcfg_android::ConfigProvider;
    use tempfile::TempDir;

    fn provider_settings(properties_file: &Path, framework_defaults: bool) -> ProviderSettings {
        ProviderSettings {
            properties_file: properties_file.display().to_string(),
            env_prefix: "DROIDCFG_TEST_UNSET_".to_string(),
            framework_defaults,
        }
    }

    #[test]
    fn test_cli_parses_resolve() {
        let cli = Cli::try_parse_from([
            "droidcfg",
            "-vv",
            "resolve",
            "app.toml",
            "--variant",
            "release",
            "--set",
            "flutter.versionCode=7",
            "--set",
            "flutter.versionName=2.0",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Resolve { file, variant, set, .. } => {
                assert_eq!(file, Some(PathBuf::from("app.toml")));
                assert_eq!(variant, "release");
                assert_eq!(set.len(), 2);
            }
            _ => panic!("expected resolve"),
        }
    }

    #[test]
    fn test_resolve_requires_variant() {
        assert!(Cli::try_parse_from(["droidcfg", "resolve"]).is_err());
    }

    #[test]
    fn test_document_path_defaults_to_settings() {
        let schema = SettingsSchema::default();
        assert_eq!(
            document_path(None, &schema),
            PathBuf::from("android/app/droidcfg.toml")
        );
        assert_eq!(
            document_path(Some("other.toml".into()), &schema),
            PathBuf::from("other.toml")
        );
    }

    #[test]
    fn test_provider_precedence() {
        let dir = TempDir::new().unwrap();
        let properties = dir.path().join("local.properties");
        std::fs::write(
            &properties,
            "flutter.versionCode=5\nflutter.versionName=1.5\n",
        )
        .unwrap();

        let provider = build_provider(
            &provider_settings(&properties, true),
            None,
            &["flutter.versionCode=9".to_string()],
        )
        .unwrap();

        assert_eq!(
            provider.layer_names(),
            vec![
                "command line",
                properties.display().to_string().as_str(),
                "env",
                "framework-defaults"
            ]
        );
        let code = provider.lookup("flutter.versionCode").unwrap();
        assert_eq!((code.value.as_str(), code.source.as_str()), ("9", "command line"));
        assert_eq!(provider.get("flutter.versionName").as_deref(), Some("1.5"));
        assert_eq!(provider.get("flutter.minSdkVersion").as_deref(), Some("21"));
    }

    #[test]
    fn test_missing_default_properties_file_is_skipped() {
        let dir = TempDir::new().unwrap();
        let provider = build_provider(
            &provider_settings(&dir.path().join("absent.properties"), false),
            None,
            &[],
        )
        .unwrap();

        assert_eq!(provider.layer_names(), vec!["env"]);
        assert_eq!(provider.get("flutter.minSdkVersion"), None);
    }

    #[test]
    fn test_missing_explicit_properties_file_fails() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("absent.properties");
        let result = build_provider(
            &provider_settings(&missing, true),
            Some(&missing),
            &[],
        );
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_malformed_assignment_fails() {
        let dir = TempDir::new().unwrap();
        let result = build_provider(
            &provider_settings(&dir.path().join("absent.properties"), true),
            None,
            &["flutter.versionCode".to_string()],
        );
        assert!(matches!(result, Err(ConfigError::Configuration { .. })));
    }

    #[test]
    fn test_validate_exit_codes() {
        let dir = TempDir::new().unwrap();
        let valid = dir.path().join("valid.toml");
        std::fs::write(
            &valid,
            r#"
plugins = ["com.android.application"]

[android]
namespace = "org.sample.app"
compile_sdk = 34

[android.default_config]
min_sdk = 21
target_sdk = 34
"#,
        )
        .unwrap();
        let invalid = dir.path().join("invalid.toml");
        std::fs::write(
            &invalid,
            r#"
plugins = ["com.android.application"]

[android]
namespace = "org.sample.app"
compile_sdk = 34

[android.default_config]
min_sdk = 35
target_sdk = 34
"#,
        )
        .unwrap();

        assert_eq!(run_validate(&valid, false, true), exit_codes::SUCCESS);
        assert_eq!(run_validate(&invalid, false, true), exit_codes::VALIDATION_ERROR);
        assert_eq!(
            run_validate(&dir.path().join("missing.toml"), false, true),
            exit_codes::FAILURE
        );
    }

    #[test]
    fn test_resolve_output_omits_provided_secrets() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.toml");
        std::fs::write(
            &path,
            r#"
plugins = ["com.android.application"]

[android]
namespace = "org.sample.app"
compile_sdk = 34

[android.default_config]
min_sdk = 21
target_sdk = 34
version_code = { from = "flutter.versionCode" }

[android.signing_configs.upload]
store_file = "upload.jks"
store_password = { from = "KEYSTORE_SECRET" }
key_alias = "upload"
key_password = { from = "KEYSTORE_SECRET" }

[android.build_types.release]
signing_config = "upload"
"#,
        )
        .unwrap();
        let assignments = vec![
            "KEYSTORE_SECRET=hunter2".to_string(),
            "flutter.versionCode=12".to_string(),
        ];
        let schema = SettingsSchema::default();

        let config = load(&path, &schema).unwrap();
        let provider = build_provider(
            &provider_settings(&dir.path().join("absent.properties"), true),
            None,
            &assignments,
        )
        .unwrap();
        let resolved = config.resolve("release", &provider).unwrap();

        let json = serde_json::to_string(&resolved).unwrap();
        assert!(!json.contains("hunter2"), "{}", json);
        for (key, value) in settings_rows(&resolved).iter().chain(&provided_rows(&resolved)) {
            assert!(!key.contains("KEYSTORE_SECRET"), "{}", key);
            assert!(!value.contains("hunter2"), "{}: {}", key, value);
        }
        assert!(provided_rows(&resolved)
            .iter()
            .any(|(key, value)| key == "flutter.versionCode" && value.starts_with("12")));

        for json in [true, false] {
            assert_eq!(
                run_resolve(&path, "release", None, &assignments, json, &schema),
                exit_codes::SUCCESS
            );
        }
    }
}
