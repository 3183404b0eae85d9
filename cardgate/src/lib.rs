#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Client SDK for a card-payment gateway's transaction API.
//!
//! The [`Gateway`] exposes one method per transaction type (authorize,
//! capture, refund, void, reversal, settlement, verification, suspend and
//! resume). Each method validates its parameters against a declarative schema,
//! merges credentials, sends the request through a [`Transport`], and
//! classifies the gateway's answer as an approval, a decline or a failure.
//!
//! # Consuming results
//!
//! Every call returns a [`TransactionHandle`] and may additionally take a
//! completion callback through [`Invocation`]. The outcome of a call is
//! delivered once to each channel in use:
//!
//! - the callback, with `Ok(response)` or `Err(GatewayError)`
//! - the handle, which can be `.await`ed
//! - [`TransactionEvents`] subscriptions, which yield one `"success"`,
//!   `"decline"` or `"error"` event
//!
//! # Modules
//!
//! - [`client`] - The gateway client and dispatch core
//! - [`config`] - Client construction defaults
//! - [`credentials`] - Credential fields and merge precedence
//! - [`error`] - Validation, transport, decline and response errors
//! - [`handle`] - The awaitable, subscribable call handle
//! - [`invocation`] - Callback and options resolution
//! - [`operation`] - Gateway operation codes
//! - [`outcome`] - Terminal outcomes and response classification
//! - [`request`] - The transaction request body
//! - [`schema`] - Schema declarations and the validator
//! - [`schemas`] - Built-in per-operation schemas
//! - [`transport`] - The transport seam
//!
//! # Feature Flags
//!
//! - `telemetry` - Enables tracing instrumentation for debugging and monitoring

pub mod client;
pub mod config;
pub mod credentials;
pub mod error;
pub mod handle;
pub mod invocation;
pub mod operation;
pub mod outcome;
pub mod request;
pub mod schema;
pub mod schemas;
pub mod transport;

pub use client::Gateway;
pub use config::ClientConfig;
pub use credentials::Credentials;
pub use error::{
    DeclineError, GatewayError, TransportError, TransportErrorKind, UnexpectedResponseError,
    ValidationError, ValidationRule,
};
pub use handle::{CallState, TransactionEvents, TransactionHandle};
pub use invocation::{Arg, Callback, Invocation, InvocationStyle};
pub use operation::Operation;
pub use outcome::{EventKind, Outcome};
pub use request::TransactionRequest;
pub use schema::{FieldKind, Params, SchemaField, validate};
pub use transport::{ResponsePayload, Transport};
