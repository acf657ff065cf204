//! Configuration validation
//!
//! Collects every problem in a document in one pass instead of stopping at the
//! first one, so a user fixing a build configuration sees all offending keys:
//! - Errors block loading
//! - Warnings are reported, and become errors in strict mode
//!
//! # Example
//!
//! ```rust
//! use droidcfg_core::validation::Validator;
//!
//! let result = Validator::new()
//!     .required("namespace", "com.example.app")
//!     .ordered("min_sdk", 21, "target_sdk", 34)
//!     .validate();
//!
//! assert!(result.is_valid());
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// A single validation finding, tied to the configuration key it concerns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Field that failed validation
    pub field: String,
    /// Error message
    pub message: String,
    /// Machine-readable code
    pub code: String,
    /// Expected value (if applicable)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    /// Actual value (if applicable)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual: Option<String>,
}

impl ValidationIssue {
    /// Create an issue without expected/actual details
    pub fn new(field: impl Into<String>, code: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            code: code.to_string(),
            expected: None,
            actual: None,
        }
    }

    /// Attach the expected and actual values
    pub fn with_values(mut self, expected: impl Into<String>, actual: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self.actual = Some(actual.into());
        self
    }
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validation result
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    errors: Vec<ValidationIssue>,
    warnings: Vec<ValidationIssue>,
}

impl ValidationResult {
    /// Create a new empty result
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if validation passed
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Get all errors
    pub fn errors(&self) -> &[ValidationIssue] {
        &self.errors
    }

    /// Get all warnings
    pub fn warnings(&self) -> &[ValidationIssue] {
        &self.warnings
    }

    /// Add an error
    pub fn add_error(&mut self, error: ValidationIssue) {
        self.errors.push(error);
    }

    /// Add a warning
    pub fn add_warning(&mut self, warning: ValidationIssue) {
        self.warnings.push(warning);
    }

    /// Merge another result into this one
    pub fn merge(&mut self, other: ValidationResult) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    /// Turn every warning into an error (strict mode)
    pub fn promote_warnings(&mut self) {
        self.errors.append(&mut self.warnings);
    }

    /// Names of the fields with errors, in the order they were found
    pub fn failing_fields(&self) -> Vec<&str> {
        let mut fields: Vec<&str> = Vec::new();
        for issue in &self.errors {
            if !fields.contains(&issue.field.as_str()) {
                fields.push(&issue.field);
            }
        }
        fields
    }

}

/// Fluent validator builder
pub struct Validator {
    result: ValidationResult,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator {
    /// Create a new validator
    pub fn new() -> Self {
        Self {
            result: ValidationResult::new(),
        }
    }

    /// Validate that a field is not empty
    pub fn required(mut self, field: &str, value: &str) -> Self {
        if value.trim().is_empty() {
            self.result.add_error(
                ValidationIssue::new(field, "REQUIRED", "Field is required")
                    .with_values("non-empty value", "empty"),
            );
        }
        self
    }

    /// Validate against a compiled pattern
    pub fn pattern(mut self, field: &str, value: &str, re: &Regex, description: &str) -> Self {
        if !re.is_match(value) {
            self.result.add_error(
                ValidationIssue::new(field, "PATTERN", format!("Must match {}", description))
                    .with_values(description, value),
            );
        }
        self
    }

    /// Validate a lower bound
    pub fn at_least<T: PartialOrd + Display>(mut self, field: &str, value: T, min: T) -> Self {
        if value < min {
            self.result.add_error(
                ValidationIssue::new(field, "MIN", format!("Must be at least {}", min))
                    .with_values(format!(">= {}", min), value.to_string()),
            );
        }
        self
    }

    /// Validate that `lower` does not exceed `upper`; the error names the lower field
    pub fn ordered<T: PartialOrd + Display>(
        mut self,
        lower_field: &str,
        lower: T,
        upper_field: &str,
        upper: T,
    ) -> Self {
        if lower > upper {
            self.result.add_error(
                ValidationIssue::new(
                    lower_field,
                    "ORDER",
                    format!("Must not exceed {} ({} > {})", upper_field, lower, upper),
                )
                .with_values(format!("<= {}", upper), lower.to_string()),
            );
        }
        self
    }

    /// Add a warning (non-blocking)
    pub fn warn_if(mut self, field: &str, condition: bool, message: &str) -> Self {
        if condition {
            self.result
                .add_warning(ValidationIssue::new(field, "WARNING", message));
        }
        self
    }

    /// Complete validation and return result
    pub fn validate(self) -> ValidationResult {
        self.result
    }
}
