//! Connection defaults shared by every request from one manager.
//!
//! # Design
//! `Config` holds an optional base URL and an optional header map and does no
//! validation on construction. The typed setter cannot receive a bad value;
//! `try_set_base_url` exists for untyped input (configuration documents,
//! values coming over an API) and enforces "string or null" at runtime.
//!
//! The dispatcher only needs to read a configuration, so it is written
//! against the [`ConfigReader`] trait rather than the concrete type.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ApiError, Result};
use crate::headers::Headers;

/// Read access to a base URL and header map.
pub trait ConfigReader {
    fn base_url(&self) -> Option<String>;
    fn headers(&self) -> Option<Headers>;
}

/// Base URL and default headers for one API target.
///
/// Cloning copies the base URL but shares the header map: an `insert`
/// through either clone's headers is seen by both. Give the clone
/// `Headers::detached()` for an independent map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    base_url: Option<String>,
    headers: Option<Headers>,
}

/// Point-in-time view returned by [`Config::instance`].
///
/// `headers` is the same map the configuration holds, not a copy.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigSnapshot {
    pub base_url: Option<String>,
    pub headers: Option<Headers>,
}

/// On-disk / over-the-wire shape of a configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct ConfigDocument {
    #[serde(default)]
    base_url: Value,
    #[serde(default)]
    headers: Option<Headers>,
}

impl Config {
    pub fn new(base_url: Option<String>, headers: Option<Headers>) -> Self {
        Self { base_url, headers }
    }

    /// Parse a JSON document of the form `{"baseUrl": ..., "headers": {...}}`.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(raw).map_err(ApiError::Decode)?;
        Self::from_value(value)
    }

    /// Build a configuration from an already-parsed JSON document.
    pub fn from_value(value: Value) -> Result<Self> {
        let doc: ConfigDocument = serde_json::from_value(value).map_err(ApiError::Decode)?;
        let mut config = Config::new(None, doc.headers);
        config.try_set_base_url(&doc.base_url)?;
        Ok(config)
    }

    pub fn set_base_url(&mut self, url: Option<String>) {
        self.base_url = url;
    }

    /// Set the base URL from an untyped value: a string or null.
    ///
    /// Numbers, booleans, arrays and objects fail with `ApiError::ConfigType`
    /// and leave the current value in place.
    pub fn try_set_base_url(&mut self, url: &Value) -> Result<()> {
        match url {
            Value::String(url) => self.base_url = Some(url.clone()),
            Value::Null => self.base_url = None,
            _ => return Err(ApiError::ConfigType),
        }
        Ok(())
    }

    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    /// Store the handle as given. No copy is taken.
    pub fn set_headers(&mut self, headers: Option<Headers>) {
        self.headers = headers;
    }

    pub fn headers(&self) -> Option<&Headers> {
        self.headers.as_ref()
    }

    pub fn instance(&self) -> ConfigSnapshot {
        ConfigSnapshot {
            base_url: self.base_url.clone(),
            headers: self.headers.clone(),
        }
    }
}

impl ConfigReader for Config {
    fn base_url(&self) -> Option<String> {
        self.base_url.clone()
    }

    fn headers(&self) -> Option<Headers> {
        self.headers.clone()
    }
}

impl ConfigReader for ConfigSnapshot {
    fn base_url(&self) -> Option<String> {
        self.base_url.clone()
    }

    fn headers(&self) -> Option<Headers> {
        self.headers.clone()
    }
}
