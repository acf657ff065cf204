//! Terminal output helpers for droidcfg
//!
//! Provides shared CLI functionality:
//! - Status messages with optional color
//! - Validation issue and key/value formatting

#![warn(missing_docs)]

pub mod output;
