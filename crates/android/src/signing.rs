//! Signing identities
//!
//! The host build system always defines a `debug` identity backed by the
//! per-user development keystore; documents may declare more.

use crate::setting::Setting;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of the implicit development identity
pub const DEVELOPMENT_IDENTITY: &str = "debug";

/// A named credential set used to sign a variant's output
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SigningIdentity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_file: Option<Setting<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_password: Option<Setting<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_alias: Option<Setting<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_password: Option<Setting<String>>,
}

impl SigningIdentity {
    /// The identity the host build system creates for debug builds
    pub fn development() -> Self {
        Self {
            store_file: Some(Setting::Literal("~/.android/debug.keystore".to_string())),
            store_password: Some(Setting::Literal("android".to_string())),
            key_alias: Some(Setting::Literal("androiddebugkey".to_string())),
            key_password: Some(Setting::Literal("android".to_string())),
        }
    }

    /// Fields holding a literal password
    pub fn literal_passwords(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if matches!(self.store_password, Some(Setting::Literal(_))) {
            fields.push("store_password");
        }
        if matches!(self.key_password, Some(Setting::Literal(_))) {
            fields.push("key_password");
        }
        fields
    }
}

/// A secret that never appears in debug output or serialized settings
#[derive(Clone, PartialEq, Eq)]
pub struct Redacted(String);

impl Redacted {
    /// Wrap a secret
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// The secret itself
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Redacted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Redacted(********)")
    }
}

impl fmt::Display for Redacted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("********")
    }
}

impl Serialize for Redacted {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str("********")
    }
}

/// The identity selected for one variant, with provider references resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedSigning {
    /// Identity name
    pub name: String,
    /// Keystore path
    pub store_file: Option<String>,
    /// Key alias inside the keystore
    pub key_alias: Option<String>,
    pub store_password: Option<Redacted>,
    pub key_password: Option<Redacted>,
    /// Whether this is the development identity
    pub development: bool,
}
