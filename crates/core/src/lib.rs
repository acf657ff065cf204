//! Core utilities for droidcfg
//!
//! Shared functionality used by the record loader and the command-line tool:
//!
//! - **Error handling**: errors with codes, context, recovery suggestions and exit codes
//! - **Validation**: collect every offending configuration key in one pass
//! - **Settings**: TOML-based tool settings (`.droidcfg.toml`) with defaults
//!
//! # Example
//!
//! ```rust,no_run
//! use droidcfg_core::config::Settings;
//!
//! let settings = Settings::load(None).expect("unreadable settings");
//! println!("build configuration: {}", settings.schema.general.config_file);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod validation;

pub use error::{Error, ErrorCode, Result};
