//! Rendering a build configuration as a Gradle Kotlin DSL script
//!
//! The output is the `build.gradle.kts` the record stands for. Provider
//! references become property reads: `flutter.*` keys go through the
//! framework plugin's extension, anything else through `project.property`.

use crate::error::{ConfigError, Result};
use crate::loader::BuildConfig;
use crate::setting::Setting;
use crate::signing::{SigningIdentity, DEVELOPMENT_IDENTITY};
use crate::variant::BUILTIN_VARIANTS;
use handlebars::Handlebars;
use serde::Serialize;

const BUILD_SCRIPT_TEMPLATE: &str = r#"plugins {
{{#each plugins}}
    id("{{this}}")
{{/each}}
}

android {
    namespace = {{namespace}}
    compileSdk = {{compile_sdk}}
{{#if ndk_version}}
    ndkVersion = {{ndk_version}}
{{/if}}

    compileOptions {
        sourceCompatibility = JavaVersion.{{source_compatibility}}
        targetCompatibility = JavaVersion.{{target_compatibility}}
{{#if core_library_desugaring}}
        isCoreLibraryDesugaringEnabled = true
{{/if}}
    }
{{#if jvm_target}}

    kotlinOptions {
        jvmTarget = JavaVersion.{{jvm_target}}.toString()
    }
{{/if}}

    defaultConfig {
        applicationId = {{application_id}}
        minSdk = {{min_sdk}}
        targetSdk = {{target_sdk}}
{{#if version_code}}
        versionCode = {{version_code}}
{{/if}}
{{#if version_name}}
        versionName = {{version_name}}
{{/if}}
{{#if multidex}}
        multiDexEnabled = true
{{/if}}
    }
{{#if signing_configs}}

    signingConfigs {
{{#each signing_configs}}
        {{opener}} {
{{#each properties}}
            {{this}}
{{/each}}
        }
{{/each}}
    }
{{/if}}
{{#if build_types}}

    buildTypes {
{{#each build_types}}
        {{opener}} {
{{#each properties}}
            {{this}}
{{/each}}
        }
{{/each}}
    }
{{/if}}
}
{{#if dependencies}}

dependencies {
{{#each dependencies}}
    {{this}}
{{/each}}
}
{{/if}}
{{#if framework_source}}

flutter {
    source = {{framework_source}}
}
{{/if}}
"#;

#[derive(Serialize)]
struct ScriptData {
    plugins: Vec<String>,
    namespace: String,
    compile_sdk: String,
    ndk_version: Option<String>,
    source_compatibility: String,
    target_compatibility: String,
    core_library_desugaring: bool,
    jvm_target: Option<String>,
    application_id: String,
    min_sdk: String,
    target_sdk: String,
    version_code: Option<String>,
    version_name: Option<String>,
    multidex: bool,
    signing_configs: Vec<Block>,
    build_types: Vec<Block>,
    dependencies: Vec<String>,
    framework_source: Option<String>,
}

/// A named `create("x") { }` / `getByName("x") { }` block with its assignments
#[derive(Serialize)]
struct Block {
    opener: String,
    properties: Vec<String>,
}

/// Quote a string as a Kotlin literal
pub fn kotlin_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '$' => out.push_str("\\$"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn property_read(key: &str) -> String {
    if let Some(name) = key.strip_prefix("flutter.") {
        if name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') && !name.is_empty() {
            return format!("flutter.{}", name);
        }
    }
    format!("project.property({}).toString()", kotlin_string(key))
}

fn number_expr(setting: &Setting<u32>) -> String {
    match setting {
        Setting::Literal(value) => value.to_string(),
        Setting::Provided { from } => {
            let read = property_read(from);
            if read.starts_with("project.property") {
                format!("{}.toInt()", read)
            } else {
                read
            }
        }
    }
}

fn text_expr(setting: &Setting<String>) -> String {
    match setting {
        Setting::Literal(value) => kotlin_string(value),
        Setting::Provided { from } => property_read(from),
    }
}

fn signing_block(name: &str, identity: &SigningIdentity) -> Block {
    let opener = if name == DEVELOPMENT_IDENTITY {
        format!("getByName({})", kotlin_string(name))
    } else {
        format!("create({})", kotlin_string(name))
    };

    let mut properties = Vec::new();
    if let Some(store_file) = &identity.store_file {
        properties.push(format!("storeFile = file({})", text_expr(store_file)));
    }
    if let Some(password) = &identity.store_password {
        properties.push(format!("storePassword = {}", text_expr(password)));
    }
    if let Some(alias) = &identity.key_alias {
        properties.push(format!("keyAlias = {}", text_expr(alias)));
    }
    if let Some(password) = &identity.key_password {
        properties.push(format!("keyPassword = {}", text_expr(password)));
    }
    Block { opener, properties }
}

fn build_type_block(config: &BuildConfig, name: &str) -> Option<Block> {
    let overrides = config.record().android.build_types.get(name)?;
    let opener = if BUILTIN_VARIANTS.contains(&name) {
        format!("getByName({})", kotlin_string(name))
    } else {
        format!("create({})", kotlin_string(name))
    };

    let mut properties = Vec::new();
    if let Some(signing) = &overrides.signing_config {
        properties.push(format!(
            "signingConfig = signingConfigs.getByName({})",
            kotlin_string(signing)
        ));
    }
    if let Some(minify) = overrides.minify {
        properties.push(format!("isMinifyEnabled = {}", minify));
    }
    if let Some(shrink) = overrides.shrink_resources {
        properties.push(format!("isShrinkResources = {}", shrink));
    }
    if let Some(debuggable) = overrides.debuggable {
        properties.push(format!("isDebuggable = {}", debuggable));
    }
    if let Some(suffix) = &overrides.application_id_suffix {
        properties.push(format!("applicationIdSuffix = {}", kotlin_string(suffix)));
    }
    if let Some(suffix) = &overrides.version_name_suffix {
        properties.push(format!("versionNameSuffix = {}", kotlin_string(suffix)));
    }
    if let Some(multidex) = overrides.multidex {
        properties.push(format!("multiDexEnabled = {}", multidex));
    }
    Some(Block { opener, properties })
}

fn script_data(config: &BuildConfig) -> ScriptData {
    let record = config.record();
    let android = &record.android;
    let defaults = &android.default_config;

    ScriptData {
        plugins: record.plugins.iter().map(|p| p.id().to_string()).collect(),
        namespace: kotlin_string(&android.namespace),
        compile_sdk: number_expr(&android.compile_sdk),
        ndk_version: android.ndk_version.as_ref().map(text_expr),
        source_compatibility: android.compile_options.source_compatibility.gradle_constant(),
        target_compatibility: android.compile_options.target_compatibility.gradle_constant(),
        core_library_desugaring: android.compile_options.core_library_desugaring,
        jvm_target: android
            .kotlin_options
            .as_ref()
            .map(|k| k.jvm_target.gradle_constant()),
        application_id: kotlin_string(record.base_application_id()),
        min_sdk: number_expr(&defaults.min_sdk),
        target_sdk: number_expr(&defaults.target_sdk),
        version_code: defaults.version_code.as_ref().map(number_expr),
        version_name: defaults.version_name.as_ref().map(text_expr),
        multidex: defaults.multidex,
        signing_configs: android
            .signing_configs
            .iter()
            .map(|(name, identity)| signing_block(name, identity))
            .collect(),
        build_types: config
            .variants()
            .filter_map(|variant| build_type_block(config, &variant.name))
            .collect(),
        dependencies: record
            .dependencies
            .iter()
            .map(|dep| format!("{}({})", dep.configuration, kotlin_string(&dep.notation)))
            .collect(),
        framework_source: record.framework.as_ref().map(|f| kotlin_string(&f.source)),
    }
}

/// Render the configuration as `build.gradle.kts`
pub fn render_gradle_kts(config: &BuildConfig) -> Result<String> {
    let mut handlebars = Handlebars::new();
    handlebars.register_escape_fn(handlebars::no_escape);
    handlebars
        .register_template_string("build.gradle.kts", BUILD_SCRIPT_TEMPLATE)
        .map_err(|e| ConfigError::Render(e.to_string()))?;

    handlebars
        .render("build.gradle.kts", &script_data(config))
        .map_err(|e| ConfigError::Render(e.to_string()))
}
