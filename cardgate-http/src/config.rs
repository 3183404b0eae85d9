//! Gateway endpoint and credential configuration.
//!
//! Loads configuration from a TOML file with support for environment variable
//! expansion in string values. Variables use `$VAR` or `${VAR}` syntax.
//!
//! # Example Configuration
//!
//! ```toml
//! url = "https://gateway.example/api/transactions"
//! timeout_secs = 20
//!
//! [headers]
//! x-api-version = "2"
//!
//! [credentials]
//! username = "api-user"
//! password = "$GATEWAY_PASSWORD"
//! merchant = "100200300"
//! ```
//!
//! # Environment Variables
//!
//! - `CARDGATE_CONFIG` - Path to configuration file (default: `cardgate.toml`)
//! - `CARDGATE_URL` - Override the endpoint URL
//! - `CARDGATE_USERNAME`, `CARDGATE_PASSWORD`, `CARDGATE_MERCHANT`,
//!   `CARDGATE_TERMINAL` - Override the default credentials
//! - Any variable referenced by `$VAR` in the config file
//!
//! A `.env` file in the working directory is read before any of these.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use cardgate::{ClientConfig, Gateway};
use http::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};

use crate::constants::{
    CONFIG_PATH_ENV, DEFAULT_CONFIG_PATH, DEFAULT_TIMEOUT, MERCHANT_ENV, PASSWORD_ENV,
    TERMINAL_ENV, URL_ENV, USERNAME_ENV,
};
use crate::error::ConfigError;
use crate::transport::HttpTransport;

/// Top-level gateway configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Transaction endpoint URL.
    #[serde(default)]
    pub url: String,

    /// Per-request timeout in seconds (default: `30`).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Extra headers sent with every request.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// Default credentials sent with every transaction.
    #[serde(default)]
    pub credentials: ClientConfig,
}

const fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            timeout_secs: default_timeout_secs(),
            headers: BTreeMap::new(),
            credentials: ClientConfig::default(),
        }
    }
}

impl GatewayConfig {
    /// Loads configuration from the path given by `CARDGATE_CONFIG`, falling
    /// back to `cardgate.toml` in the current directory.
    ///
    /// A `.env` file is loaded first if present. String values with `$VAR` /
    /// `${VAR}` references are expanded from the process environment, then
    /// the `CARDGATE_*` variables override the file values.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let path =
            std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_owned());
        Self::load_from(&path)
    }

    /// Loads configuration from a specific file path.
    ///
    /// A missing file is treated as empty, leaving every value to its default
    /// or to the environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from(path: &str) -> Result<Self, ConfigError> {
        let content = if Path::new(path).exists() {
            std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.to_owned(),
                source,
            })?
        } else {
            String::new()
        };
        let env = |name: &str| std::env::var(name).ok();
        let mut config = Self::parse_with(&content, env)?;
        config.apply_overrides(env);
        Ok(config)
    }

    /// Parses TOML after expanding `$VAR` references through `lookup`.
    fn parse_with(content: &str, lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let expanded = expand_vars(content, lookup);
        Ok(toml::from_str(&expanded)?)
    }

    /// Applies the `CARDGATE_*` overrides resolved through `lookup`.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(URL_ENV) {
            self.url = url;
        }
        let mut credentials = std::mem::take(&mut self.credentials);
        if let Some(username) = lookup(USERNAME_ENV) {
            credentials = credentials.with_username(username);
        }
        if let Some(password) = lookup(PASSWORD_ENV) {
            credentials = credentials.with_password(password);
        }
        if let Some(merchant) = lookup(MERCHANT_ENV) {
            credentials = credentials.with_merchant(merchant);
        }
        if let Some(terminal) = lookup(TERMINAL_ENV) {
            credentials = credentials.with_terminal(terminal);
        }
        self.credentials = credentials;
    }

    /// Returns the configured per-request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Parses the configured headers into a [`HeaderMap`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Header`] if a name or value is not a valid header.
    pub fn header_map(&self) -> Result<HeaderMap, ConfigError> {
        let mut map = HeaderMap::with_capacity(self.headers.len());
        for (name, value) in &self.headers {
            let invalid = || ConfigError::Header { name: name.clone() };
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| invalid())?;
            let header_value = HeaderValue::from_str(value).map_err(|_| invalid())?;
            map.insert(header_name, header_value);
        }
        Ok(map)
    }

    /// Builds an [`HttpTransport`] for the configured endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL or a header is invalid.
    pub fn transport(&self) -> Result<HttpTransport, ConfigError> {
        let transport = HttpTransport::try_from(self.url.as_str())?
            .with_headers(self.header_map()?)
            .with_timeout(self.timeout());
        Ok(transport)
    }

    /// Builds a [`Gateway`] backed by an [`HttpTransport`].
    ///
    /// # Errors
    ///
    /// Returns an error if the URL or a header is invalid.
    pub fn into_gateway(self) -> Result<Gateway, ConfigError> {
        let transport = self.transport()?;
        Ok(Gateway::new(self.credentials, transport))
    }
}

/// Expands `$VAR` and `${VAR}` patterns in a string using `lookup`.
///
/// Unresolved variables are left as-is.
fn expand_vars(input: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '$' {
            result.push(ch);
            continue;
        }
        let braced = chars.peek() == Some(&'{');
        if braced {
            chars.next();
        }

        let mut name = String::new();
        let mut closed = false;
        while let Some(&c) = chars.peek() {
            if braced && c == '}' {
                chars.next();
                closed = true;
                break;
            }
            if !braced && !c.is_ascii_alphanumeric() && c != '_' {
                break;
            }
            name.push(c);
            chars.next();
        }

        match lookup(&name).filter(|_| !name.is_empty()) {
            Some(value) => result.push_str(&value),
            None => {
                result.push('$');
                if braced {
                    result.push('{');
                }
                result.push_str(&name);
                if closed {
                    result.push('}');
                }
            }
        }
    }

    result
}
