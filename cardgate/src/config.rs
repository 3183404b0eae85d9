//! Client construction options.
//!
//! Provides the immutable defaults a [`Gateway`](crate::client::Gateway) sends
//! with every transaction unless a call overrides them.

use serde::{Deserialize, Serialize};

use crate::credentials::Credentials;

/// Default credentials configured once at client construction.
///
/// All fields are optional. Fields left unset are never sent as defaults and
/// must be supplied per call when an operation needs them.
///
/// # Example
///
/// ```rust
/// use cardgate::config::ClientConfig;
///
/// let config = ClientConfig::new()
///     .with_username("api-user")
///     .with_password("secret")
///     .with_merchant("100200300");
/// assert_eq!(config.credentials().merchant.as_deref(), Some("100200300"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(flatten)]
    credentials: Credentials,
}

impl ClientConfig {
    /// Creates a configuration with no defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a configuration from an existing credential set.
    #[must_use]
    pub const fn from_credentials(credentials: Credentials) -> Self {
        Self { credentials }
    }

    /// Sets the default user name.
    #[must_use]
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.credentials = self.credentials.with_username(username);
        self
    }

    /// Sets the default password.
    #[must_use]
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.credentials = self.credentials.with_password(password);
        self
    }

    /// Sets the default merchant identifier.
    #[must_use]
    pub fn with_merchant(mut self, merchant: impl Into<String>) -> Self {
        self.credentials = self.credentials.with_merchant(merchant);
        self
    }

    /// Sets the default terminal identifier.
    #[must_use]
    pub fn with_terminal(mut self, terminal: impl Into<String>) -> Self {
        self.credentials = self.credentials.with_terminal(terminal);
        self
    }

    /// Returns the default credentials.
    #[must_use]
    pub const fn credentials(&self) -> &Credentials {
        &self.credentials
    }
}

impl From<Credentials> for ClientConfig {
    fn from(credentials: Credentials) -> Self {
        Self::from_credentials(credentials)
    }
}
