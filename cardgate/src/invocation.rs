//! Normalizes the calling conventions a transaction method accepts.
//!
//! A transaction method takes up to two trailing arguments, each either a
//! JSON value or a completion callback:
//!
//! - `(options, callback)`: per-call options plus a callback
//! - `(callback)`: a callback and no options
//! - `(options)` or nothing: no callback
//!
//! [`Invocation::resolve`] turns those into per-call options and an
//! [`InvocationStyle`]. Whatever the style, the dispatch core also returns a
//! [`TransactionHandle`](crate::handle::TransactionHandle) that can be awaited
//! or subscribed to, so the style only decides whether a callback is invoked.

use std::fmt;

use serde_json::Value;

use crate::error::GatewayError;
use crate::schema::Params;

/// Error-first completion callback: `Ok` carries the approved response,
/// `Err` a decline or failure.
pub type Callback = Box<dyn FnOnce(Result<Value, GatewayError>) + Send + 'static>;

/// One raw trailing argument of a transaction method.
pub enum Arg {
    /// A plain value; used as per-call options when it is an object.
    Value(Value),
    /// A completion callback.
    Callback(Callback),
}

impl Arg {
    /// Wraps a closure as a callback argument.
    pub fn callback<F>(f: F) -> Self
    where
        F: FnOnce(Result<Value, GatewayError>) + Send + 'static,
    {
        Self::Callback(Box::new(f))
    }

    fn into_options(self) -> Params {
        match self {
            Self::Value(Value::Object(options)) => options,
            Self::Value(_) | Self::Callback(_) => Params::new(),
        }
    }
}

impl From<Value> for Arg {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl fmt::Debug for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Callback(_) => f.write_str("Callback(..)"),
        }
    }
}

/// How the caller consumes the outcome of one call.
pub enum InvocationStyle {
    /// A completion callback was supplied; it receives the outcome once.
    Callback(Callback),
    /// No callback; the caller awaits the returned handle.
    PromiseOnly,
    /// No callback; the caller declared it will subscribe to the handle's events.
    EventSubscription,
}

impl InvocationStyle {
    /// Short name used in logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Callback(_) => "callback",
            Self::PromiseOnly => "promise",
            Self::EventSubscription => "events",
        }
    }
}

impl fmt::Debug for InvocationStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Callback(_) => f.write_str("Callback(..)"),
            Self::PromiseOnly => f.write_str("PromiseOnly"),
            Self::EventSubscription => f.write_str("EventSubscription"),
        }
    }
}

/// Per-call options and invocation style, resolved once per call.
#[derive(Debug)]
pub struct Invocation {
    options: Params,
    style: InvocationStyle,
}

impl Default for Invocation {
    fn default() -> Self {
        Self::none()
    }
}

impl Invocation {
    /// Resolves raw trailing arguments.
    ///
    /// A callback in second position wins and the first argument supplies the
    /// options. A callback in first position means there are no options. With
    /// no callback, options come from the first argument if it is an object.
    #[must_use]
    pub fn resolve(first: Option<Arg>, second: Option<Arg>) -> Self {
        match (first, second) {
            (first, Some(Arg::Callback(callback))) => Self {
                options: first.map(Arg::into_options).unwrap_or_default(),
                style: InvocationStyle::Callback(callback),
            },
            (Some(Arg::Callback(callback)), _) => Self {
                options: Params::new(),
                style: InvocationStyle::Callback(callback),
            },
            (first, _) => Self {
                options: first.map(Arg::into_options).unwrap_or_default(),
                style: InvocationStyle::PromiseOnly,
            },
        }
    }

    /// No options, no callback.
    #[must_use]
    pub fn none() -> Self {
        Self {
            options: Params::new(),
            style: InvocationStyle::PromiseOnly,
        }
    }

    /// Per-call options only. Non-object values are ignored.
    #[must_use]
    pub fn with_options(options: Value) -> Self {
        Self::resolve(Some(Arg::Value(options)), None)
    }

    /// A completion callback with no options.
    #[must_use]
    pub fn with_callback<F>(callback: F) -> Self
    where
        F: FnOnce(Result<Value, GatewayError>) + Send + 'static,
    {
        Self::resolve(Some(Arg::callback(callback)), None)
    }

    /// Declares event-subscription style, with optional per-call options.
    #[must_use]
    pub fn events(options: Option<Value>) -> Self {
        Self {
            options: options.map(|o| Arg::Value(o).into_options()).unwrap_or_default(),
            style: InvocationStyle::EventSubscription,
        }
    }

    /// Adds a completion callback, keeping any options already resolved.
    #[must_use]
    pub fn callback<F>(mut self, callback: F) -> Self
    where
        F: FnOnce(Result<Value, GatewayError>) + Send + 'static,
    {
        self.style = InvocationStyle::Callback(Box::new(callback));
        self
    }

    /// Returns the per-call options.
    #[must_use]
    pub const fn options(&self) -> &Params {
        &self.options
    }

    /// Returns the resolved style.
    #[must_use]
    pub const fn style(&self) -> &InvocationStyle {
        &self.style
    }

    pub(crate) fn into_parts(self) -> (Params, InvocationStyle) {
        (self.options, self.style)
    }
}

impl From<Value> for Invocation {
    fn from(options: Value) -> Self {
        Self::with_options(options)
    }
}
