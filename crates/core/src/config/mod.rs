//! Tool settings loading and schema definitions
//!
//! Settings for the `droidcfg` tool itself (where the build configuration
//! lives, which providers to consult, strictness and log level). The build
//! configuration record is handled by `droidcfg-android`.

mod loader;
mod schema;

pub use loader::Settings;
pub use schema::*;
