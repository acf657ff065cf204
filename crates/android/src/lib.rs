//! Android application build configuration for droidcfg
//!
//! A build configuration record describes what an Android application
//! module's Gradle script declares: plugins in apply order, SDK and Java
//! levels, application identity, multidex and desugaring toggles, signing
//! identities per build variant, and pinned dependencies. This crate:
//! - Parses and validates records ([`load`])
//! - Resolves the merged settings of one variant against a
//!   [`ConfigProvider`] ([`resolve`])
//! - Renders records back into `build.gradle.kts` ([`render_gradle_kts`])
//!
//! # Example
//!
//! ```rust
//! use droidcfg_android::{load, DocumentFormat, FrameworkDefaults};
//!
//! let doc = r#"
//! plugins = ["com.android.application"]
//!
//! [android]
//! namespace = "org.sample.app"
//! compile_sdk = 34
//!
//! [android.default_config]
//! min_sdk = { from = "flutter.minSdkVersion" }
//! target_sdk = 34
//! "#;
//!
//! let config = load(doc, DocumentFormat::Toml).unwrap();
//! let settings = config.resolve("debug", &FrameworkDefaults::new()).unwrap();
//! assert_eq!(settings.min_sdk, 21);
//! ```

#![warn(missing_docs)]

pub mod dependency;
pub mod error;
pub mod loader;
pub mod plugin;
pub mod provider;
pub mod record;
pub mod render;
pub mod resolve;
pub mod setting;
pub mod signing;
pub mod variant;

#[cfg(test)]
mod testutil;

pub use error::{ConfigError, Result};
pub use loader::{load, load_file, load_with_options, BuildConfig, LoadOptions};
pub use provider::{
    ConfigProvider, EnvProvider, FrameworkDefaults, LayeredProvider, PropertiesProvider,
    StaticProvider,
};
pub use record::{BuildConfigRecord, DocumentFormat};
pub use render::render_gradle_kts;
pub use resolve::{resolve, ResolvedSettings};
