//! Gateway credentials and the precedence rule for combining them.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ValidationError;
use crate::schema::{FieldKind, Params};

/// Credential fields sent with every transaction.
///
/// Absent fields are omitted from the serialized request entirely.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Gateway user name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Gateway password.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Merchant identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant: Option<String>,
    /// Terminal identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terminal: Option<String>,
}

impl Credentials {
    /// Names of the credential fields, as they appear on the wire and in
    /// per-call options.
    pub const FIELDS: [&'static str; 4] = ["username", "password", "merchant", "terminal"];

    /// Creates an empty credential set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the user name.
    #[must_use]
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Sets the password.
    #[must_use]
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Sets the merchant identifier.
    #[must_use]
    pub fn with_merchant(mut self, merchant: impl Into<String>) -> Self {
        self.merchant = Some(merchant.into());
        self
    }

    /// Sets the terminal identifier.
    #[must_use]
    pub fn with_terminal(mut self, terminal: impl Into<String>) -> Self {
        self.terminal = Some(terminal.into());
        self
    }

    /// Returns `true` if no field is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.password.is_none()
            && self.merchant.is_none()
            && self.terminal.is_none()
    }

    /// Returns the value of the named credential field.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        match field {
            "username" => self.username.as_deref(),
            "password" => self.password.as_deref(),
            "merchant" => self.merchant.as_deref(),
            "terminal" => self.terminal.as_deref(),
            _ => None,
        }
    }

    /// Extracts credential fields from a per-call options or params object.
    ///
    /// String values are taken as-is and numbers are rendered as text (merchant
    /// and terminal identifiers are often numeric). `null` counts as absent.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationRule::WrongKind`](crate::error::ValidationRule::WrongKind)
    /// for a credential field holding any other kind of value.
    pub fn from_options(options: &Params) -> Result<Self, ValidationError> {
        let text = |name: &str| match options.get(name) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(Value::Number(n)) => Ok(Some(n.to_string())),
            Some(_) => Err(ValidationError::wrong_kind(name, FieldKind::String)),
        };
        Ok(Self {
            username: text("username")?,
            password: text("password")?,
            merchant: text("merchant")?,
            terminal: text("terminal")?,
        })
    }

    /// Combines `self` (the defaults) with `overrides`.
    ///
    /// Each field is resolved independently: a value present in `overrides`
    /// wins, otherwise the default is kept.
    #[must_use]
    pub fn merge(&self, overrides: &Self) -> Self {
        let pick = |over: &Option<String>, default: &Option<String>| {
            over.as_ref().or(default.as_ref()).cloned()
        };
        Self {
            username: pick(&overrides.username, &self.username),
            password: pick(&overrides.password, &self.password),
            merchant: pick(&overrides.merchant, &self.merchant),
            terminal: pick(&overrides.terminal, &self.terminal),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("merchant", &self.merchant)
            .field("terminal", &self.terminal)
            .finish()
    }
}

/// Combines client defaults with per-call overrides. See [`Credentials::merge`].
#[must_use]
pub fn merge(defaults: &Credentials, overrides: &Credentials) -> Credentials {
    defaults.merge(overrides)
}
