//! HTTP transport and file-based configuration for the cardgate client.
//!
//! Provides a reqwest-backed [`cardgate::Transport`] that posts transactions
//! as JSON, and a TOML configuration loader that builds a ready
//! [`cardgate::Gateway`] from a file and the environment.
//!
//! # Modules
//!
//! - [`config`] - TOML configuration with `$VAR` expansion and env overrides
//! - [`constants`] - Default paths, timeouts and environment variable names
//! - [`error`] - Configuration error types
//! - [`transport`] - The HTTP transport
//!
//! # Feature Flags
//!
//! - `telemetry` - Spans each request and records its result

pub mod config;
pub mod constants;
pub mod error;
pub mod transport;

pub use config::GatewayConfig;
pub use error::ConfigError;
pub use transport::HttpTransport;
