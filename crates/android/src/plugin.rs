//! Plugin references and their apply-order rules
//!
//! Plugins are applied in the order they are declared. The framework glue
//! plugin configures the Android and Kotlin extensions, so it has to come
//! after every packaging and language plugin.

use droidcfg_core::validation::{ValidationIssue, ValidationResult};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Android application packaging plugin
pub const ANDROID_APPLICATION: &str = "com.android.application";
/// Android library packaging plugin
pub const ANDROID_LIBRARY: &str = "com.android.library";
/// Flutter framework glue plugin
pub const FLUTTER_GRADLE_PLUGIN: &str = "dev.flutter.flutter-gradle-plugin";

const KOTLIN_PLUGINS: &[&str] = &["kotlin-android", "org.jetbrains.kotlin.android"];

static PLUGIN_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_\-]*(\.[A-Za-z0-9_\-]+)*$").unwrap());

/// What a plugin contributes to the build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PluginRole {
    /// Produces the application or library artifact
    Packaging,
    /// Adds a JVM language
    Language,
    /// Wires the cross-platform framework into the Android build
    FrameworkGlue,
    /// Anything else (google-services, kapt, ...); unconstrained
    Other,
}

/// A plugin id, as written in the `plugins` list
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PluginRef(String);

impl PluginRef {
    /// Wrap a plugin id
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The plugin id
    pub fn id(&self) -> &str {
        &self.0
    }

    /// Classify the plugin
    pub fn role(&self) -> PluginRole {
        match self.0.as_str() {
            ANDROID_APPLICATION | ANDROID_LIBRARY => PluginRole::Packaging,
            FLUTTER_GRADLE_PLUGIN => PluginRole::FrameworkGlue,
            id if KOTLIN_PLUGINS.contains(&id) => PluginRole::Language,
            _ => PluginRole::Other,
        }
    }
}

impl fmt::Display for PluginRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PluginRef {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// True when any declared plugin has the given role
pub fn has_role(plugins: &[PluginRef], role: PluginRole) -> bool {
    plugins.iter().any(|p| p.role() == role)
}

/// Check ids, duplicates, the packaging plugin and the apply order
pub fn check_plugins(plugins: &[PluginRef]) -> ValidationResult {
    let mut result = ValidationResult::new();

    for (index, plugin) in plugins.iter().enumerate() {
        let field = format!("plugins[{}]", index);
        if !PLUGIN_ID.is_match(plugin.id()) {
            result.add_error(
                ValidationIssue::new(&field, "PLUGIN_ID", "Not a valid plugin id")
                    .with_values("dotted plugin id", plugin.id()),
            );
        }
        if let Some(first) = plugins[..index].iter().position(|p| p == plugin) {
            result.add_error(ValidationIssue::new(
                &field,
                "DUPLICATE_PLUGIN",
                format!("'{}' is already applied at plugins[{}]", plugin, first),
            ));
        }
    }

    let packaging: Vec<&PluginRef> = plugins
        .iter()
        .filter(|p| p.role() == PluginRole::Packaging)
        .collect();
    match packaging.as_slice() {
        [] => result.add_error(ValidationIssue::new(
            "plugins",
            "MISSING_PLUGIN",
            format!("An Android packaging plugin ({}) is required", ANDROID_APPLICATION),
        )),
        [_] => {}
        [first, second, ..] if first != second => result.add_error(ValidationIssue::new(
            "plugins",
            "CONFLICTING_PLUGINS",
            format!("'{}' and '{}' cannot be applied together", first, second),
        )),
        _ => {}
    }

    result.merge(check_plugin_order(plugins));
    result
}

/// Reject any framework glue plugin that precedes a packaging or language plugin
pub fn check_plugin_order(plugins: &[PluginRef]) -> ValidationResult {
    let mut result = ValidationResult::new();

    for (glue_index, glue) in plugins.iter().enumerate() {
        if glue.role() != PluginRole::FrameworkGlue {
            continue;
        }
        let later = plugins
            .iter()
            .enumerate()
            .skip(glue_index + 1)
            .filter(|(_, p)| matches!(p.role(), PluginRole::Packaging | PluginRole::Language));
        for (index, plugin) in later {
            result.add_error(
                ValidationIssue::new(
                    format!("plugins[{}]", glue_index),
                    "PLUGIN_ORDER",
                    format!(
                        "'{}' must be applied after '{}' (plugins[{}])",
                        glue, plugin, index
                    ),
                )
                .with_values(format!("index > {}", index), glue_index.to_string()),
            );
        }
    }

    result
}
