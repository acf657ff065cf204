//! Coded errors for droidcfg
//!
//! An [`Error`] names the configuration key or file at fault, may carry a
//! context line and a suggested fix, and converts into an [`ErrorReport`]
//! for `--json` output. [`ErrorCode::exit_code`] picks the process status.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Stable error codes, grouped by thousands into categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Any other I/O failure
    IoError = 2000,
    /// A file droidcfg was told to read does not exist
    FileNotFound = 2001,
    /// A file exists but cannot be read or written
    PermissionDenied = 2002,

    /// An explicitly named settings file does not exist
    ConfigNotFound = 3001,
    /// A document or settings file is not valid TOML/JSON
    ConfigParseError = 3002,
    /// The build configuration failed one or more validation rules
    ConfigValidationError = 3003,
    /// A single key holds an unusable value
    InvalidConfigValue = 3004,
    /// The requested variant is neither built in nor declared
    UnknownVariant = 3005,
    /// A `{ from = "key" }` reference no provider could supply
    MissingProvidedValue = 3006,

    /// The Kotlin DSL template failed to render
    RenderError = 8000,
}

impl ErrorCode {
    /// Numeric form, as shown in `E3005`
    pub fn code(&self) -> u32 {
        *self as u32
    }

    /// Category name derived from the thousands digit
    pub fn category(&self) -> &'static str {
        match self.code() / 1000 {
            2 => "IO",
            3 => "Configuration",
            8 => "Output",
            _ => "Unknown",
        }
    }

    /// Process exit status for a command that failed with this code
    pub fn exit_code(&self) -> i32 {
        match self {
            ErrorCode::ConfigValidationError => exit_codes::VALIDATION_ERROR,
            code if code.code() / 1000 == 3 => exit_codes::CONFIG_ERROR,
            _ => exit_codes::FAILURE,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}

/// A coded error with optional context, suggestion and cause
#[derive(Error, Debug)]
pub struct Error {
    /// What went wrong, as a stable code
    pub code: ErrorCode,
    /// Message naming the offending key or file
    pub message: String,
    /// Where it happened (`While reading app.toml`)
    pub context: Option<String>,
    /// How to fix it
    pub suggestion: Option<String>,
    /// Underlying cause
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(context) = &self.context {
            write!(f, "\n  Context: {}", context)?;
        }
        if let Some(suggestion) = &self.suggestion {
            write!(f, "\n  Suggestion: {}", suggestion)?;
        }
        Ok(())
    }
}

impl Error {
    /// Error with a code and message only
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: None,
            suggestion: None,
            source: None,
        }
    }

    /// Attach a context line
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Attach a suggested fix
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Attach the underlying cause
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Serializable form for JSON output
    pub fn to_report(&self) -> ErrorReport {
        ErrorReport {
            code: self.code,
            code_str: self.code.to_string(),
            category: self.code.category().to_string(),
            message: self.message.clone(),
            context: self.context.clone(),
            suggestion: self.suggestion.clone(),
            source: self.source.as_ref().map(|e| e.to_string()),
        }
    }

    /// An explicitly named settings file is missing
    pub fn config_not_found(path: impl AsRef<Path>) -> Self {
        Self::new(
            ErrorCode::ConfigNotFound,
            format!("Configuration file not found: {}", path.as_ref().display()),
        )
        .with_suggestion("Pass the build configuration path explicitly or set general.config_file in .droidcfg.toml")
    }

    /// A configuration key holds an unusable value
    pub fn invalid_value(field: &str, message: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::InvalidConfigValue,
            format!("{}: {}", field, message.into()),
        )
    }

    /// The requested variant does not exist
    pub fn unknown_variant(name: &str, available: &[String]) -> Self {
        Self::new(
            ErrorCode::UnknownVariant,
            format!("Unknown build variant: {}", name),
        )
        .with_suggestion(format!("Available variants: {}", available.join(", ")))
    }

    /// `field` refers to a provider key nothing supplies
    pub fn missing_provided_value(field: &str, key: &str) -> Self {
        Self::new(
            ErrorCode::MissingProvidedValue,
            format!("{}: no provider supplies '{}'", field, key),
        )
        .with_suggestion(format!(
            "Define {} in local.properties, pass --set {}=<value>, or use a literal value",
            key, key
        ))
    }

    /// Template rendering failed
    pub fn render(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::RenderError, message)
    }
}

/// JSON shape of an [`Error`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorReport {
    /// Error code
    pub code: ErrorCode,
    /// Display form of the code (`E3004`)
    pub code_str: String,
    /// Category name
    pub category: String,
    /// Error message
    pub message: String,
    /// Context line, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    /// Suggested fix, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// Underlying cause, rendered
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Result alias over [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Process exit statuses of the `droidcfg` binary
pub mod exit_codes {
    /// Command succeeded
    pub const SUCCESS: i32 = 0;
    /// I/O, rendering or any uncategorized failure
    pub const FAILURE: i32 = 1;
    /// The build configuration failed validation
    pub const VALIDATION_ERROR: i32 = 2;
    /// Any other configuration error (parse, unknown variant, missing value)
    pub const CONFIG_ERROR: i32 = 3;
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        let code = match err.kind() {
            std::io::ErrorKind::NotFound => ErrorCode::FileNotFound,
            std::io::ErrorKind::PermissionDenied => ErrorCode::PermissionDenied,
            _ => ErrorCode::IoError,
        };
        Error::new(code, err.to_string()).with_source(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::new(ErrorCode::ConfigParseError, format!("JSON parse error: {}", err))
            .with_source(err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::new(ErrorCode::ConfigParseError, format!("TOML parse error: {}", err))
            .with_source(err)
    }
}
