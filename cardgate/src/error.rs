//! Error types for gateway transactions.
//!
//! Every error here is `Clone`: a single outcome is handed to the completion
//! callback, the awaitable handle and every event subscriber.

use std::fmt;

use serde_json::Value;

use crate::schema::FieldKind;

/// Base error type for a failed or rejected transaction.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GatewayError {
    /// Caller-supplied parameters did not satisfy the operation schema.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// The request could not be delivered or the reply could not be read.
    #[error("{0}")]
    Transport(#[from] TransportError),

    /// The gateway explicitly rejected the transaction.
    #[error("{0}")]
    Declined(#[from] DeclineError),

    /// The gateway replied with a status this client cannot classify.
    #[error("{0}")]
    UnexpectedResponse(#[from] UnexpectedResponseError),
}

impl GatewayError {
    /// Returns `true` for validation failures.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns `true` for transport failures.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Returns `true` when the gateway declined the transaction.
    #[must_use]
    pub const fn is_declined(&self) -> bool {
        matches!(self, Self::Declined(_))
    }
}

/// The rule a parameter violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationRule {
    /// The parameters were not a JSON object.
    NotAnObject,
    /// A required field was absent or `null`.
    Missing,
    /// The value was not of the declared kind.
    WrongKind {
        /// Kind declared by the schema.
        expected: FieldKind,
    },
    /// A string value exceeded the declared maximum length.
    TooLong {
        /// Declared maximum, in characters.
        max: usize,
        /// Actual length, in characters.
        actual: usize,
    },
}

/// Parameter validation failure, raised before any network activity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Name of the offending field.
    pub field: String,
    /// The rule that was violated.
    pub rule: ValidationRule,
}

impl ValidationError {
    /// Field name reported when the parameters themselves are malformed.
    pub const PARAMS: &'static str = "params";

    /// Creates a validation error for `field`.
    #[must_use]
    pub fn new(field: impl Into<String>, rule: ValidationRule) -> Self {
        Self {
            field: field.into(),
            rule,
        }
    }

    /// The parameters were not an object.
    #[must_use]
    pub fn not_an_object() -> Self {
        Self::new(Self::PARAMS, ValidationRule::NotAnObject)
    }

    /// A required field is missing.
    #[must_use]
    pub fn missing(field: impl Into<String>) -> Self {
        Self::new(field, ValidationRule::Missing)
    }

    /// A field holds a value of the wrong kind.
    #[must_use]
    pub fn wrong_kind(field: impl Into<String>, expected: FieldKind) -> Self {
        Self::new(field, ValidationRule::WrongKind { expected })
    }

    /// A field exceeds its maximum length.
    #[must_use]
    pub fn too_long(field: impl Into<String>, max: usize, actual: usize) -> Self {
        Self::new(field, ValidationRule::TooLong { max, actual })
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.rule {
            ValidationRule::NotAnObject => write!(f, "transaction parameters must be an object"),
            ValidationRule::Missing => write!(f, "missing required field '{}'", self.field),
            ValidationRule::WrongKind { expected } => {
                write!(f, "field '{}' must be a {expected}", self.field)
            }
            ValidationRule::TooLong { max, actual } => write!(
                f,
                "field '{}' exceeds maximum length of {max} (got {actual})",
                self.field
            ),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Broad classification of a transport failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportErrorKind {
    /// The request did not complete within the configured timeout.
    Timeout,
    /// The gateway could not be reached.
    Connect,
    /// The gateway answered with a non-success HTTP status.
    Status,
    /// The reply body could not be decoded.
    Decode,
    /// Any other transport fault.
    Other,
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Timeout => "timeout",
            Self::Connect => "connect",
            Self::Status => "status",
            Self::Decode => "decode",
            Self::Other => "other",
        })
    }
}

/// Network or protocol fault while talking to the gateway. Never retried here.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("transport error ({kind}): {message}")]
pub struct TransportError {
    /// Failure classification.
    pub kind: TransportErrorKind,
    /// Human-readable description.
    pub message: String,
    /// HTTP status code, when the gateway answered at all.
    pub status: Option<u16>,
}

impl TransportError {
    /// Creates a transport error of the given kind.
    #[must_use]
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
        }
    }

    /// The request timed out.
    #[must_use]
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Timeout, message)
    }

    /// The gateway could not be reached.
    #[must_use]
    pub fn connect(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Connect, message)
    }

    /// The gateway answered with a non-success HTTP status.
    #[must_use]
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self {
            kind: TransportErrorKind::Status,
            message: body.into(),
            status: Some(status),
        }
    }

    /// The reply body could not be decoded.
    #[must_use]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Decode, message)
    }

    /// Returns `true` if the request timed out.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        self.kind == TransportErrorKind::Timeout
    }
}

/// The gateway declined the transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct DeclineError {
    /// Gateway reason code, if one was supplied.
    pub code: Option<String>,
    /// Human-readable decline reason, if one was supplied.
    pub message: Option<String>,
    /// The full gateway response.
    pub response: Value,
}

impl DeclineError {
    /// Response fields consulted for the decline code, in order.
    pub const CODE_FIELDS: [&'static str; 2] = ["reason_code", "response_code"];
    /// Response fields consulted for the decline message, in order.
    pub const MESSAGE_FIELDS: [&'static str; 2] = ["message", "reason"];

    /// Extracts the decline details from a gateway response.
    #[must_use]
    pub fn from_response(response: Value) -> Self {
        let code = first_text(&response, &Self::CODE_FIELDS);
        let message = first_text(&response, &Self::MESSAGE_FIELDS);
        Self {
            code,
            message,
            response,
        }
    }
}

impl fmt::Display for DeclineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("transaction declined")?;
        if let Some(code) = &self.code {
            write!(f, " [{code}]")?;
        }
        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }
        Ok(())
    }
}

impl std::error::Error for DeclineError {}

/// The gateway replied with a status that is neither approved nor declined.
#[derive(Debug, Clone, PartialEq)]
pub struct UnexpectedResponseError {
    /// The status value found, if any.
    pub status: Option<String>,
    /// The full gateway response.
    pub response: Value,
}

impl UnexpectedResponseError {
    /// Creates an error for an unclassifiable response.
    #[must_use]
    pub const fn new(status: Option<String>, response: Value) -> Self {
        Self { status, response }
    }
}

impl fmt::Display for UnexpectedResponseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.status {
            Some(status) => write!(f, "unexpected gateway response status '{status}'"),
            None => write!(f, "gateway response carries no status"),
        }
    }
}

impl std::error::Error for UnexpectedResponseError {}

/// Returns the first of `fields` present in `value` as text.
fn first_text(value: &Value, fields: &[&str]) -> Option<String> {
    fields.iter().find_map(|name| match value.get(name)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}
