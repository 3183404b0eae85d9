//! Error types for the HTTP crate.

/// Errors raised while building a transport or loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file '{path}': {source}")]
    Io {
        /// Path that was read.
        path: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for [`GatewayConfig`](crate::config::GatewayConfig).
    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// The endpoint URL could not be parsed.
    #[error("invalid endpoint URL: {context}: {source}")]
    UrlParse {
        /// Human-readable context.
        context: &'static str,
        /// The underlying parse error.
        #[source]
        source: url::ParseError,
    },

    /// A configured header name or value is invalid.
    #[error("invalid header '{name}'")]
    Header {
        /// The offending header name.
        name: String,
    },
}
