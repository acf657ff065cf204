//! Loader and resolver errors

use crate::record::DocumentFormat;
use droidcfg_core::error::{Error, ErrorCode};
use droidcfg_core::validation::ValidationResult;
use std::path::PathBuf;
use thiserror::Error as ThisError;

/// Result type alias
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors raised while loading, resolving or rendering a build configuration
#[derive(ThisError, Debug)]
pub enum ConfigError {
    /// A single field holds an unusable value
    #[error("{field}: {message}")]
    Configuration { field: String, message: String },

    /// A provider-sourced field has no value in any provider
    #[error("{field}: no provider supplies '{key}'")]
    MissingValue { field: String, key: String },

    /// The requested variant does not exist
    #[error("unknown build variant '{name}' (available: {})", .available.join(", "))]
    UnknownVariant { name: String, available: Vec<String> },

    /// The document failed validation; every offending field is listed
    #[error("{}", summarize(.0))]
    Validation(ValidationResult),

    #[error("failed to parse {format} document: {message}")]
    Parse {
        format: DocumentFormat,
        message: String,
    },

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to render build script: {0}")]
    Render(String),
}

fn summarize(result: &ValidationResult) -> String {
    let messages: Vec<String> = result.errors().iter().map(ToString::to_string).collect();
    format!("invalid build configuration: {}", messages.join("; "))
}

impl ConfigError {
    /// Shorthand for [`ConfigError::Configuration`]
    pub fn configuration(field: impl Into<String>, message: impl Into<String>) -> Self {
        ConfigError::Configuration {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Fields the error is about, in report order
    pub fn fields(&self) -> Vec<&str> {
        match self {
            ConfigError::Configuration { field, .. } | ConfigError::MissingValue { field, .. } => {
                vec![field.as_str()]
            }
            ConfigError::Validation(result) => result.failing_fields(),
            _ => Vec::new(),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Configuration { field, message } => Error::invalid_value(&field, message),
            ConfigError::MissingValue { field, key } => Error::missing_provided_value(&field, &key),
            ConfigError::UnknownVariant { name, available } => {
                Error::unknown_variant(&name, &available)
            }
            ConfigError::Io { path, source } => {
                Error::from(source).with_context(format!("While reading {}", path.display()))
            }
            ConfigError::Render(message) => Error::render(message),
            other @ ConfigError::Validation(_) => {
                Error::new(ErrorCode::ConfigValidationError, other.to_string())
            }
            other @ ConfigError::Parse { .. } => {
                Error::new(ErrorCode::ConfigParseError, other.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use droidcfg_core::validation::Validator;

    #[test]
    fn test_unknown_variant_message() {
        let err = ConfigError::UnknownVariant {
            name: "staging".into(),
            available: vec!["debug".into(), "release".into()],
        };
        assert_eq!(
            err.to_string(),
            "unknown build variant 'staging' (available: debug, release)"
        );
        assert_eq!(Error::from(err).code, ErrorCode::UnknownVariant);
    }

    #[test]
    fn test_validation_lists_fields() {
        let result = Validator::new()
            .required("android.namespace", "")
            .ordered("android.default_config.min_sdk", 35, "target_sdk", 34)
            .validate();
        let err = ConfigError::Validation(result);

        assert_eq!(
            err.fields(),
            vec!["android.namespace", "android.default_config.min_sdk"]
        );
        assert!(err.to_string().contains("android.default_config.min_sdk"));
        assert_eq!(Error::from(err).code, ErrorCode::ConfigValidationError);
    }

    #[test]
    fn test_missing_value_conversion() {
        let err = ConfigError::MissingValue {
            field: "android.compile_sdk".into(),
            key: "flutter.compileSdkVersion".into(),
        };
        let core = Error::from(err);
        assert_eq!(core.code, ErrorCode::MissingProvidedValue);
        assert!(core.suggestion.unwrap().contains("flutter.compileSdkVersion"));
    }

    #[test]
    fn test_io_conversion_keeps_path() {
        let err = ConfigError::Io {
            path: PathBuf::from("android/local.properties"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        let core = Error::from(err);
        assert_eq!(core.code, ErrorCode::FileNotFound);
        assert!(core.context.unwrap().contains("android/local.properties"));
    }
}
