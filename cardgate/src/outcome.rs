//! Terminal results of a transaction and how gateway responses map onto them.

use std::fmt;

use serde_json::Value;

use crate::error::{DeclineError, GatewayError, UnexpectedResponseError};

/// Response field carrying the gateway's verdict.
pub const STATUS_FIELD: &str = "status";
/// Status value of an approved transaction (compared case-insensitively).
pub const STATUS_APPROVED: &str = "approved";
/// Status value of a declined transaction (compared case-insensitively).
pub const STATUS_DECLINED: &str = "declined";

/// The single terminal result of one transaction call.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// The gateway approved the transaction; carries the full response.
    Success(Value),
    /// The gateway declined the transaction.
    Decline(DeclineError),
    /// Validation, transport or response-classification failure.
    Failure(GatewayError),
}

impl Outcome {
    /// Classifies a gateway response body by its status field.
    #[must_use]
    pub fn from_response(response: Value) -> Self {
        let status = response
            .get(STATUS_FIELD)
            .and_then(Value::as_str)
            .map(str::to_owned);
        match status {
            Some(s) if s.eq_ignore_ascii_case(STATUS_APPROVED) => Self::Success(response),
            Some(s) if s.eq_ignore_ascii_case(STATUS_DECLINED) => {
                Self::Decline(DeclineError::from_response(response))
            }
            other => Self::Failure(UnexpectedResponseError::new(other, response).into()),
        }
    }

    /// Returns the event this outcome is emitted as.
    #[must_use]
    pub const fn event(&self) -> EventKind {
        match self {
            Self::Success(_) => EventKind::Success,
            Self::Decline(_) => EventKind::Decline,
            Self::Failure(_) => EventKind::Error,
        }
    }

    /// Returns `true` for an approved transaction.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Converts into the awaitable form: approval resolves, everything else rejects.
    ///
    /// # Errors
    ///
    /// Declines become [`GatewayError::Declined`]; failures are returned as-is.
    pub fn into_result(self) -> Result<Value, GatewayError> {
        match self {
            Self::Success(response) => Ok(response),
            Self::Decline(decline) => Err(GatewayError::Declined(decline)),
            Self::Failure(err) => Err(err),
        }
    }
}

impl From<GatewayError> for Outcome {
    fn from(err: GatewayError) -> Self {
        Self::Failure(err)
    }
}

/// Name of the terminal event emitted for an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// `"success"`
    Success,
    /// `"decline"`
    Decline,
    /// `"error"`
    Error,
}

impl EventKind {
    /// Returns the event name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Decline => "decline",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
