//! The gateway client and its request dispatch core.
//!
//! Every transaction method is a thin wrapper that names an [`Operation`] and
//! its schema, then delegates to [`Gateway::request`], which runs the whole
//! pipeline:
//!
//! 1. resolve per-call options and the invocation style
//! 2. validate the parameters; on failure, complete immediately without
//!    touching the transport
//! 3. merge default and per-call credentials
//! 4. build the [`TransactionRequest`]
//! 5. send it on a spawned task and classify the response
//! 6. publish the single [`Outcome`] through every active channel

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::config::ClientConfig;
use crate::credentials::Credentials;
use crate::error::{TransportError, TransportErrorKind, ValidationError};
use crate::handle::{CallState, Completion, TransactionHandle};
use crate::invocation::{Invocation, InvocationStyle};
use crate::operation::Operation;
use crate::outcome::Outcome;
use crate::request::TransactionRequest;
use crate::schema::{self, Params, SchemaField};
use crate::transport::Transport;

/// Client for the gateway transaction API.
///
/// Cheap to clone; clones share the read-only configuration and the transport.
/// Calls on one client may run concurrently and share no mutable state.
///
/// # Example
///
/// ```no_run
/// # use cardgate::{ClientConfig, Gateway, Invocation, Transport};
/// # async fn run(transport: impl Transport + 'static) -> Result<(), cardgate::GatewayError> {
/// let gateway = Gateway::new(ClientConfig::new().with_merchant("100200"), transport);
/// let response = gateway
///     .refund(
///         &serde_json::json!({ "amount": 5.00, "reference": "abc123" }),
///         Invocation::none(),
///     )
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Gateway {
    config: Arc<ClientConfig>,
    transport: Arc<dyn Transport>,
}

impl fmt::Debug for Gateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gateway")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Gateway {
    /// Creates a client from its defaults and a transport.
    pub fn new(config: ClientConfig, transport: impl Transport + 'static) -> Self {
        Self::with_shared_transport(config, Arc::new(transport))
    }

    /// Creates a client around an already shared transport.
    #[must_use]
    pub fn with_shared_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            config: Arc::new(config),
            transport,
        }
    }

    /// Returns the client defaults.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Dispatches one transaction.
    ///
    /// Non-credential keys in the per-call options are treated as transaction
    /// fields, with `params` taking precedence, and validated with them.
    /// Credential keys in `params` or in the options override the client
    /// defaults, the options winning when both carry one. They are sent once,
    /// as credentials, and must hold text or numbers.
    ///
    /// Validation failures complete the call before this method returns; the
    /// transport is never contacted. Otherwise the request is sent on a
    /// spawned task and the returned handle completes when it finishes. Called
    /// outside a Tokio runtime, a valid call completes immediately with a
    /// transport failure.
    pub fn request(
        &self,
        operation: Operation,
        schema: &[SchemaField],
        params: &Value,
        invocation: Invocation,
    ) -> TransactionHandle {
        let (options, style) = invocation.into_parts();
        #[cfg(feature = "telemetry")]
        tracing::debug!(operation = %operation, style = style.name(), "dispatching transaction");

        let callback = match style {
            InvocationStyle::Callback(callback) => Some(callback),
            InvocationStyle::PromiseOnly | InvocationStyle::EventSubscription => None,
        };
        let (completion, handle) = Completion::new(operation, callback);

        completion.advance(CallState::Validating);
        let checked = schema::validate(schema, &with_option_fields(params, &options))
            .and_then(|fields| Ok((fields, per_call_credentials(params, &options)?)));
        let (fields, overrides) = match checked {
            Ok(checked) => checked,
            Err(err) => {
                #[cfg(feature = "telemetry")]
                tracing::debug!(operation = %operation, error = %err, "transaction rejected by validation");
                completion.complete(Outcome::Failure(err.into()));
                return handle;
            }
        };

        completion.advance(CallState::Merging);
        let credentials = self.config.credentials().merge(&overrides);
        let request = TransactionRequest::new(operation, fields, credentials);

        completion.advance(CallState::Sending);
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            #[cfg(feature = "telemetry")]
            tracing::warn!(operation = %operation, "no Tokio runtime to send the transaction on");
            completion.complete(Outcome::Failure(
                TransportError::new(TransportErrorKind::Other, "no Tokio runtime available").into(),
            ));
            return handle;
        };
        let transport = Arc::clone(&self.transport);
        runtime.spawn(async move {
            let outcome = match transport.send(&request).await {
                Ok(response) => Outcome::from_response(response),
                Err(err) => Outcome::Failure(err.into()),
            };
            record_outcome(operation, &outcome);
            completion.complete(outcome);
        });
        handle
    }

    /// Dispatches `operation` with its built-in schema.
    pub fn execute(
        &self,
        operation: Operation,
        params: &Value,
        invocation: Invocation,
    ) -> TransactionHandle {
        self.request(operation, operation.schema(), params, invocation)
    }

    /// Authorizes and captures a card payment (`AUTH`).
    pub fn authorize(&self, params: &Value, invocation: Invocation) -> TransactionHandle {
        self.execute(Operation::Auth, params, invocation)
    }

    /// Records an authorization approved out of band (`FORCED_AUTH`).
    pub fn forced_authorize(&self, params: &Value, invocation: Invocation) -> TransactionHandle {
        self.execute(Operation::ForcedAuth, params, invocation)
    }

    /// Authorizes without capturing (`PREAUTH`).
    pub fn preauthorize(&self, params: &Value, invocation: Invocation) -> TransactionHandle {
        self.execute(Operation::Preauth, params, invocation)
    }

    /// Captures a pre-authorization (`POSTAUTH`).
    pub fn capture(&self, params: &Value, invocation: Invocation) -> TransactionHandle {
        self.execute(Operation::Postauth, params, invocation)
    }

    /// Re-authorizes a previous transaction (`REAUTH`).
    pub fn reauthorize(&self, params: &Value, invocation: Invocation) -> TransactionHandle {
        self.execute(Operation::Reauth, params, invocation)
    }

    /// Refunds a settled transaction (`REFUND`).
    pub fn refund(&self, params: &Value, invocation: Invocation) -> TransactionHandle {
        self.execute(Operation::Refund, params, invocation)
    }

    /// Voids an unsettled transaction (`VOID`).
    pub fn void(&self, params: &Value, invocation: Invocation) -> TransactionHandle {
        self.execute(Operation::Void, params, invocation)
    }

    /// Alias of [`void`](Self::void).
    pub fn cancel(&self, params: &Value, invocation: Invocation) -> TransactionHandle {
        self.void(params, invocation)
    }

    /// Reverses an authorization hold (`REVERSAL`).
    pub fn reverse(&self, params: &Value, invocation: Invocation) -> TransactionHandle {
        self.execute(Operation::Reversal, params, invocation)
    }

    /// Settles the merchant's open batch (`MCHNT_SETTLEMENT`).
    pub fn settle_merchant(&self, params: &Value, invocation: Invocation) -> TransactionHandle {
        self.execute(Operation::MchntSettlement, params, invocation)
    }

    /// Settles a merchant group's open batches (`GROUP_SETTLEMENT`).
    pub fn settle_group(&self, params: &Value, invocation: Invocation) -> TransactionHandle {
        self.execute(Operation::GroupSettlement, params, invocation)
    }

    /// Verifies a card without moving funds (`VERIFY`).
    pub fn verify(&self, params: &Value, invocation: Invocation) -> TransactionHandle {
        self.execute(Operation::Verify, params, invocation)
    }

    /// Suspends a transaction (`LOCK`).
    pub fn suspend(&self, params: &Value, invocation: Invocation) -> TransactionHandle {
        self.execute(Operation::Lock, params, invocation)
    }

    /// Resumes a suspended transaction (`UNLOCK`).
    pub fn resume(&self, params: &Value, invocation: Invocation) -> TransactionHandle {
        self.execute(Operation::Unlock, params, invocation)
    }
}

/// Logs how a sent transaction ended.
#[cfg(feature = "telemetry")]
fn record_outcome(operation: Operation, outcome: &Outcome) {
    match outcome {
        Outcome::Success(_) => tracing::debug!(operation = %operation, "transaction approved"),
        Outcome::Decline(decline) => {
            tracing::debug!(operation = %operation, decline = %decline, "transaction declined");
        }
        Outcome::Failure(err) => {
            tracing::warn!(operation = %operation, error = %err, "transaction failed");
        }
    }
}

/// Logs how a sent transaction ended.
/// Noop if telemetry feature is off.
#[cfg(not(feature = "telemetry"))]
const fn record_outcome(_operation: Operation, _outcome: &Outcome) {}

/// Collects credential overrides from `params` and the per-call options.
fn per_call_credentials(params: &Value, options: &Params) -> Result<Credentials, ValidationError> {
    let from_params = match params {
        Value::Object(fields) => Credentials::from_options(fields)?,
        _ => Credentials::default(),
    };
    Ok(from_params.merge(&Credentials::from_options(options)?))
}

/// Layers `params` over the non-credential keys of the per-call options.
///
/// Non-object params are returned unchanged so validation can reject them.
fn with_option_fields(params: &Value, options: &Params) -> Value {
    let Value::Object(fields) = params else {
        return params.clone();
    };
    let mut combined: Params = options
        .iter()
        .filter(|(key, _)| !Credentials::FIELDS.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    combined.extend(fields.iter().map(|(key, value)| (key.clone(), value.clone())));
    Value::Object(combined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{GatewayError, ValidationRule};
    use crate::outcome::EventKind;
    use crate::transport::ResponsePayload;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::oneshot;

    /// Transport stub that records requests and replies with a fixed result.
    struct StubTransport {
        reply: Result<ResponsePayload, TransportError>,
        calls: AtomicUsize,
        requests: Mutex<Vec<Value>>,
    }

    impl StubTransport {
        fn replying(reply: Result<ResponsePayload, TransportError>) -> Arc<Self> {
            Arc::new(Self {
                reply,
                calls: AtomicUsize::new(0),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn approved() -> Arc<Self> {
            Self::replying(Ok(json!({ "status": "approved", "auth_code": "OK1234" })))
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn last_request(&self) -> Value {
            self.requests.lock().unwrap().last().cloned().unwrap()
        }
    }

    #[async_trait]
    impl Transport for StubTransport {
        async fn send(
            &self,
            request: &TransactionRequest,
        ) -> Result<ResponsePayload, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.requests
                .lock()
                .unwrap()
                .push(serde_json::to_value(request).unwrap());
            self.reply.clone()
        }
    }

    /// Transport that never answers.
    struct HangingTransport;

    #[async_trait]
    impl Transport for HangingTransport {
        async fn send(&self, _request: &TransactionRequest) -> Result<ResponsePayload, TransportError> {
            std::future::pending().await
        }
    }

    fn gateway(transport: &Arc<StubTransport>) -> Gateway {
        let config = ClientConfig::new()
            .with_username("api-user")
            .with_password("secret")
            .with_merchant("M-100");
        Gateway::with_shared_transport(config, Arc::clone(transport) as Arc<dyn Transport>)
    }

    fn card_params() -> Value {
        json!({
            "amount": 10.00,
            "entry_mode": "SWIPE",
            "card_number": "4111111111111111",
            "card_exp": "1225",
            "security_code": "123",
        })
    }

    #[tokio::test]
    async fn authorize_approved_emits_success() {
        let transport = StubTransport::approved();
        let handle = gateway(&transport).authorize(&card_params(), Invocation::none());
        let mut events = handle.subscribe();

        let event = events.recv().await.unwrap();
        assert_eq!(event.event(), EventKind::Success);
        let response = handle.await.unwrap();
        assert_eq!(response["auth_code"], "OK1234");
        assert_eq!(transport.calls(), 1);

        let sent = transport.last_request();
        assert_eq!(sent["operation"], "AUTH");
        assert_eq!(sent["card_exp"], "1225");
        assert_eq!(sent["merchant"], "M-100");
        assert!(sent.get("terminal").is_none());
    }

    #[tokio::test]
    async fn missing_card_exp_never_reaches_transport() {
        let transport = StubTransport::approved();
        let mut params = card_params();
        params.as_object_mut().unwrap().remove("card_exp");

        let handle = gateway(&transport).authorize(&params, Invocation::none());
        assert_eq!(handle.state(), CallState::Failed);
        let mut events = handle.subscribe();
        assert_eq!(events.recv().await.unwrap().event(), EventKind::Error);

        match handle.await.unwrap_err() {
            GatewayError::Validation(err) => {
                assert_eq!(err.field, "card_exp");
                assert_eq!(err.rule, ValidationRule::Missing);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn validation_failure_invokes_callback_synchronously() {
        let transport = StubTransport::approved();
        let seen = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&seen);
        let invocation = Invocation::with_callback(move |result| {
            *sink.lock().unwrap() = Some(result);
        });

        let handle = gateway(&transport).refund(&json!({ "amount": 5.0 }), invocation);
        let delivered = seen.lock().unwrap().take().unwrap();
        assert!(delivered.unwrap_err().is_validation());
        assert!(handle.await.unwrap_err().is_validation());
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn refund_declined_rejects_handle() {
        let transport = StubTransport::replying(Ok(json!({
            "status": "declined",
            "reason_code": "05",
            "message": "Do not honor",
        })));
        let handle =
            gateway(&transport).refund(&json!({ "amount": 5.00, "reference": "abc123" }), Invocation::none());
        let mut events = handle.subscribe();

        let event = events.recv().await.unwrap();
        assert_eq!(event.event(), EventKind::Decline);
        match handle.await.unwrap_err() {
            GatewayError::Declined(decline) => {
                assert_eq!(decline.code.as_deref(), Some("05"));
                assert_eq!(decline.message.as_deref(), Some("Do not honor"));
            }
            other => panic!("expected decline, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn cancel_timeout_is_transport_failure() {
        let transport = StubTransport::replying(Err(TransportError::timeout("request timed out")));
        let handle = gateway(&transport).cancel(&json!({ "reference": "abc123" }), Invocation::none());
        assert_eq!(handle.operation(), Operation::Void);

        match handle.outcome().await {
            Outcome::Failure(GatewayError::Transport(err)) => assert!(err.is_timeout()),
            other => panic!("expected transport failure, got {other:?}"),
        }
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn callback_and_await_share_one_request() {
        let transport = StubTransport::approved();
        let (tx, rx) = oneshot::channel();
        let invocation = Invocation::resolve(
            Some(json!({ "terminal": "T-7" }).into()),
            Some(crate::invocation::Arg::callback(move |result| {
                let _ = tx.send(result);
            })),
        );

        let handle = gateway(&transport).authorize(&card_params(), invocation);
        let mut first = handle.subscribe();
        let mut second = handle.subscribe();

        assert!(handle.await.is_ok());
        assert!(rx.await.unwrap().is_ok());
        assert_eq!(first.recv().await.unwrap().event(), EventKind::Success);
        assert_eq!(second.recv().await.unwrap().event(), EventKind::Success);
        assert!(first.recv().await.is_none());
        assert_eq!(transport.calls(), 1);
        assert_eq!(transport.last_request()["terminal"], "T-7");
    }

    #[tokio::test]
    async fn per_call_credentials_override_defaults() {
        let transport = StubTransport::approved();
        let invocation = Invocation::with_options(json!({
            "merchant": "M-200",
            "username": "override-user",
        }));
        gateway(&transport)
            .void(&json!({ "reference": "r1" }), invocation)
            .await
            .unwrap();

        let sent = transport.last_request();
        assert_eq!(sent["merchant"], "M-200");
        assert_eq!(sent["username"], "override-user");
        assert_eq!(sent["password"], "secret");
    }

    #[tokio::test]
    async fn option_fields_are_validated_with_params() {
        let transport = StubTransport::approved();
        let gateway = gateway(&transport);

        gateway
            .capture(
                &json!({ "amount": 3 }),
                Invocation::with_options(json!({ "reference": "from-options" })),
            )
            .await
            .unwrap();
        assert_eq!(transport.last_request()["reference"], "from-options");

        let err = gateway
            .capture(
                &json!({ "amount": 3, "reference": "r" }),
                Invocation::with_options(json!({ "tip_amount": "lots" })),
            )
            .await
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn unknown_status_is_unexpected_response() {
        let transport = StubTransport::replying(Ok(json!({ "status": "queued" })));
        let err = gateway(&transport)
            .verify(
                &json!({ "entry_mode": "KEYED", "card_number": "4111", "card_exp": "0130" }),
                Invocation::events(None),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::UnexpectedResponse(_)));
    }

    #[tokio::test]
    async fn concurrent_calls_keep_their_own_outcomes() {
        let approved = StubTransport::approved();
        let declined = StubTransport::replying(Ok(json!({ "status": "declined" })));
        let a = gateway(&approved).suspend(&json!({ "reference": "a" }), Invocation::none());
        let b = gateway(&declined).resume(&json!({ "reference": "b" }), Invocation::none());

        let (a, b) = tokio::join!(a.outcome(), b.outcome());
        assert_eq!(a.event(), EventKind::Success);
        assert_eq!(b.event(), EventKind::Decline);
    }

    #[tokio::test]
    async fn hung_transport_leaves_handle_pending() {
        let gateway = Gateway::new(ClientConfig::new(), HangingTransport);
        let handle = gateway.suspend(&json!({ "reference": "r" }), Invocation::none());
        assert_eq!(handle.state(), CallState::Sending);

        let waited = tokio::time::timeout(Duration::from_millis(20), handle.outcome()).await;
        assert!(waited.is_err());
    }

    #[test]
    fn options_never_shadow_params() {
        let options = json!({ "reference": "opt", "password": "pw" });
        let combined = with_option_fields(
            &json!({ "reference": "param" }),
            options.as_object().unwrap(),
        );
        assert_eq!(combined, json!({ "reference": "param" }));
    }

    /// Transport whose send panics.
    struct PanickingTransport;

    #[async_trait]
    impl Transport for PanickingTransport {
        async fn send(&self, _request: &TransactionRequest) -> Result<ResponsePayload, TransportError> {
            panic!("transport bug")
        }
    }

    #[test]
    fn outside_runtime_fails_instead_of_panicking() {
        let transport = StubTransport::approved();
        let seen = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&seen);
        let invocation = Invocation::with_callback(move |result| {
            *sink.lock().unwrap() = Some(result);
        });

        let handle = gateway(&transport).void(&json!({ "reference": "r" }), invocation);
        let delivered = seen.lock().unwrap().take().unwrap();
        assert!(delivered.unwrap_err().is_transport());
        match handle.try_outcome() {
            Some(Outcome::Failure(GatewayError::Transport(err))) => {
                assert_eq!(err.kind, TransportErrorKind::Other);
            }
            other => panic!("expected transport failure, got {other:?}"),
        }
        assert_eq!(handle.state(), CallState::Failed);
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn panicking_transport_still_reaches_every_channel() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let (tx, rx) = oneshot::channel();
        let invocation = Invocation::with_callback(move |result| {
            counter.fetch_add(1, Ordering::SeqCst);
            let _ = tx.send(result);
        });

        let gateway = Gateway::new(ClientConfig::new(), PanickingTransport);
        let handle = gateway.void(&json!({ "reference": "r" }), invocation);
        let mut events = handle.subscribe();

        assert!(rx.await.unwrap().unwrap_err().is_transport());
        assert_eq!(events.recv().await.unwrap().event(), EventKind::Error);
        assert!(handle.await.unwrap_err().is_transport());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn credentials_in_params_override_defaults() {
        let transport = StubTransport::approved();
        gateway(&transport)
            .void(
                &json!({ "reference": "r1", "merchant": "M-300", "terminal": 77 }),
                Invocation::with_options(json!({ "terminal": "T-opt" })),
            )
            .await
            .unwrap();

        let sent = transport.last_request();
        assert_eq!(sent["merchant"], "M-300");
        assert_eq!(sent["terminal"], "T-opt");
        assert_eq!(sent["username"], "api-user");
    }

    #[tokio::test]
    async fn non_text_credential_option_is_rejected() {
        let transport = StubTransport::approved();
        let err = gateway(&transport)
            .void(
                &json!({ "reference": "r1" }),
                Invocation::with_options(json!({ "terminal": true })),
            )
            .await
            .unwrap_err();

        match err {
            GatewayError::Validation(err) => {
                assert_eq!(err.field, "terminal");
                assert_eq!(
                    err.rule,
                    ValidationRule::WrongKind {
                        expected: crate::schema::FieldKind::String
                    }
                );
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        assert_eq!(transport.calls(), 0);
    }
}
