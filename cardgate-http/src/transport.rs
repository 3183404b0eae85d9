//! A [`cardgate::Transport`] that posts transactions to the gateway over HTTP.
//!
//! Each [`TransactionRequest`] is serialized as a flat JSON object and sent as
//! a `POST` to the configured endpoint. A `2xx` reply is decoded as JSON and
//! handed back for classification; anything else becomes a [`TransportError`].
//!
//! ## Error Mapping
//!
//! - request timeouts map to [`TransportErrorKind::Timeout`](cardgate::TransportErrorKind::Timeout)
//! - connection failures map to `Connect`
//! - non-success HTTP statuses map to `Status`, carrying the code and body
//! - undecodable bodies map to `Decode`

use std::fmt::Display;
use std::time::Duration;

use async_trait::async_trait;
use cardgate::{ResponsePayload, TransactionRequest, Transport, TransportError};
use http::HeaderMap;
use reqwest::Client;
use url::Url;

use crate::error::ConfigError;

#[cfg(feature = "telemetry")]
use tracing::{Instrument, Span};

/// HTTP transport for the gateway transaction endpoint.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    /// Full URL transactions are posted to
    endpoint: Url,
    /// Shared Reqwest HTTP client
    client: Client,
    /// Extra headers sent with each request
    headers: HeaderMap,
    /// Optional per-request timeout
    timeout: Option<Duration>,
}

impl HttpTransport {
    /// Creates a transport posting to `endpoint`.
    #[must_use]
    pub fn new(endpoint: Url) -> Self {
        Self {
            endpoint,
            client: Client::new(),
            headers: HeaderMap::new(),
            timeout: None,
        }
    }

    /// Returns the endpoint URL.
    #[must_use]
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Returns the extra headers sent with each request.
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the configured timeout, if any.
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Uses a pre-configured reqwest client.
    #[must_use]
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// Attaches extra headers to all future requests.
    #[must_use]
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Sets a timeout for all future requests.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Posts `request` and decodes the reply.
    async fn post(&self, request: &TransactionRequest) -> Result<ResponsePayload, TransportError> {
        let result = self.post_inner(request).await;
        record_result_on_span(&result);
        result
    }

    async fn post_inner(
        &self,
        request: &TransactionRequest,
    ) -> Result<ResponsePayload, TransportError> {
        let mut req = self
            .client
            .post(self.endpoint.clone())
            .headers(self.headers.clone())
            .json(request);
        if let Some(timeout) = self.timeout {
            req = req.timeout(timeout);
        }
        let http_response = req.send().await.map_err(classify)?;

        let status = http_response.status();
        if status.is_success() {
            http_response
                .json::<ResponsePayload>()
                .await
                .map_err(classify)
        } else {
            let body = http_response.text().await.map_err(classify)?;
            Err(TransportError::status(status.as_u16(), body))
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    /// Sends a transaction to the gateway.
    #[cfg(feature = "telemetry")]
    async fn send(&self, request: &TransactionRequest) -> Result<ResponsePayload, TransportError> {
        let span = tracing::info_span!(
            "cardgate.transport.send",
            operation = %request.operation,
            timeout = ?self.timeout,
            otel.status_code = tracing::field::Empty,
            error.message = tracing::field::Empty,
        );
        self.post(request).instrument(span).await
    }

    /// Sends a transaction to the gateway.
    #[cfg(not(feature = "telemetry"))]
    async fn send(&self, request: &TransactionRequest) -> Result<ResponsePayload, TransportError> {
        self.post(request).await
    }
}

/// Parses the endpoint URL and calls [`HttpTransport::new`].
impl TryFrom<&str> for HttpTransport {
    type Error = ConfigError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let url = Url::parse(value.trim()).map_err(|e| ConfigError::UrlParse {
            context: "Failed to parse endpoint url",
            source: e,
        })?;
        Ok(Self::new(url))
    }
}

/// Converts a String URL into an `HttpTransport`.
impl TryFrom<String> for HttpTransport {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_from(value.as_str())
    }
}

/// Maps a reqwest failure onto the transport error taxonomy.
fn classify(err: reqwest::Error) -> TransportError {
    let message = err.to_string();
    let mut mapped = if err.is_timeout() {
        TransportError::timeout(message)
    } else if err.is_connect() {
        TransportError::connect(message)
    } else if err.is_decode() {
        TransportError::decode(message)
    } else {
        TransportError::new(cardgate::TransportErrorKind::Other, message)
    };
    mapped.status = err.status().map(|s| s.as_u16());
    mapped
}

/// Records the outcome of a request on a tracing span, including status and errors.
#[cfg(feature = "telemetry")]
fn record_result_on_span<R, E: Display>(result: &Result<R, E>) {
    let span = Span::current();
    match result {
        Ok(_) => {
            span.record("otel.status_code", "OK");
        }
        Err(err) => {
            span.record("otel.status_code", "ERROR");
            span.record("error.message", tracing::field::display(err));
            tracing::event!(tracing::Level::ERROR, error = %err, "Request to gateway failed");
        }
    }
}

/// Records the outcome of a request on a tracing span, including status and errors.
/// Noop if telemetry feature is off.
#[cfg(not(feature = "telemetry"))]
const fn record_result_on_span<R, E: Display>(_result: &Result<R, E>) {}
