//! The transport seam between the dispatch core and the network.
//!
//! The core never selects endpoints, handles TLS or signs requests. It hands a
//! [`TransactionRequest`] to a [`Transport`] and interprets the JSON body that
//! comes back. `cardgate-http` provides the reqwest-based implementation;
//! tests plug in stubs.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::TransportError;
use crate::request::TransactionRequest;

/// Decoded gateway response body.
pub type ResponsePayload = Value;

/// Sends a transaction to the gateway and returns its response body.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Delivers `request` and returns the decoded response body.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] if the gateway cannot be reached, times
    /// out, answers with a non-success status, or returns an unreadable body.
    async fn send(&self, request: &TransactionRequest) -> Result<ResponsePayload, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, request: &TransactionRequest) -> Result<ResponsePayload, TransportError> {
        (**self).send(request).await
    }
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Box<T> {
    async fn send(&self, request: &TransactionRequest) -> Result<ResponsePayload, TransportError> {
        (**self).send(request).await
    }
}
