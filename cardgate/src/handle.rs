//! The dual-purpose result of a transaction call.
//!
//! Each call owns one [`Completion`], the single point through which its
//! [`Outcome`] is published. Completing consumes the `Completion`, so the
//! outcome is published at most once. A `Completion` dropped without
//! completing publishes an abandonment failure, so it is published exactly
//! once. From there it fans out to:
//!
//! - the caller's callback, if one was supplied (invoked once, `FnOnce`)
//! - the [`TransactionHandle`], which resolves when awaited
//! - every [`TransactionEvents`] subscriber, each of which yields one event
//!
//! The outcome is stored in a [`watch`] channel, so late awaiters and late
//! subscribers still observe it.

use std::fmt;
use std::future::{Future, IntoFuture};
use std::pin::Pin;

use serde_json::Value;
use tokio::sync::watch;

use crate::error::{GatewayError, TransportError, TransportErrorKind};
use crate::invocation::Callback;
use crate::operation::Operation;
use crate::outcome::Outcome;

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Lifecycle state of one call. Terminal states are absorbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallState {
    /// Created, nothing checked yet.
    Pending,
    /// Checking parameters against the schema.
    Validating,
    /// Combining default and per-call credentials.
    Merging,
    /// Waiting on the transport.
    Sending,
    /// The gateway approved the transaction.
    Succeeded,
    /// The gateway declined the transaction.
    Declined,
    /// Validation, transport or classification failed.
    Failed,
}

impl CallState {
    /// Returns `true` for `Succeeded`, `Declined` and `Failed`.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Declined | Self::Failed)
    }

    const fn for_outcome(outcome: &Outcome) -> Self {
        match outcome {
            Outcome::Success(_) => Self::Succeeded,
            Outcome::Decline(_) => Self::Declined,
            Outcome::Failure(_) => Self::Failed,
        }
    }
}

#[derive(Debug, Clone)]
struct Snapshot {
    state: CallState,
    outcome: Option<Outcome>,
}

/// Publishes the outcome of one call. Consumed on completion.
///
/// Dropping it unpublished (the sending task panicked or was cancelled)
/// publishes an abandonment failure instead, so every channel still gets one
/// outcome.
pub(crate) struct Completion {
    callback: Option<Callback>,
    tx: watch::Sender<Snapshot>,
    published: bool,
}

impl fmt::Debug for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completion")
            .field("has_callback", &self.callback.is_some())
            .field("state", &self.tx.borrow().state)
            .finish()
    }
}

impl Completion {
    /// Creates the completion point for a call and the handle observing it.
    pub(crate) fn new(operation: Operation, callback: Option<Callback>) -> (Self, TransactionHandle) {
        let (tx, rx) = watch::channel(Snapshot {
            state: CallState::Pending,
            outcome: None,
        });
        let completion = Self {
            callback,
            tx,
            published: false,
        };
        (completion, TransactionHandle { operation, rx })
    }

    /// Records a non-terminal state transition.
    pub(crate) fn advance(&self, state: CallState) {
        #[cfg(feature = "telemetry")]
        tracing::debug!(state = ?state, "transaction state changed");
        self.tx.send_modify(|snapshot| snapshot.state = state);
    }

    /// Publishes the outcome to every channel.
    pub(crate) fn complete(mut self, outcome: Outcome) {
        self.publish(outcome);
    }

    fn publish(&mut self, outcome: Outcome) {
        self.published = true;
        let state = CallState::for_outcome(&outcome);
        let callback = self.callback.take();
        let for_callback = callback.as_ref().map(|_| outcome.clone());
        self.tx.send_replace(Snapshot {
            state,
            outcome: Some(outcome),
        });
        if let (Some(callback), Some(outcome)) = (callback, for_callback) {
            callback(outcome.into_result());
        }
    }
}

impl Drop for Completion {
    fn drop(&mut self) {
        if !self.published {
            #[cfg(feature = "telemetry")]
            tracing::warn!("transaction task ended without an outcome");
            self.publish(abandoned());
        }
    }
}

/// Failure reported when a call's task ends without publishing an outcome.
fn abandoned() -> Outcome {
    Outcome::Failure(GatewayError::Transport(TransportError::new(
        TransportErrorKind::Other,
        "transaction task ended without an outcome",
    )))
}

async fn wait_for_outcome(rx: &mut watch::Receiver<Snapshot>) -> Outcome {
    match rx.wait_for(|snapshot| snapshot.outcome.is_some()).await {
        Ok(snapshot) => snapshot.outcome.clone().unwrap_or_else(abandoned),
        Err(_) => abandoned(),
    }
}

/// The value returned by every transaction method.
///
/// Await it (it implements [`IntoFuture`]) to get the approved response or a
/// [`GatewayError`] for declines and failures, or call
/// [`subscribe`](Self::subscribe) to receive the terminal event. The request
/// runs once regardless of how many of these channels are used, and dropping
/// the handle does not cancel it.
pub struct TransactionHandle {
    operation: Operation,
    rx: watch::Receiver<Snapshot>,
}

impl fmt::Debug for TransactionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransactionHandle")
            .field("operation", &self.operation)
            .field("state", &self.state())
            .finish()
    }
}

impl TransactionHandle {
    /// Returns the operation this call performs.
    #[must_use]
    pub const fn operation(&self) -> Operation {
        self.operation
    }

    /// Returns the call's current lifecycle state.
    #[must_use]
    pub fn state(&self) -> CallState {
        self.rx.borrow().state
    }

    /// Returns the outcome if the call has already finished.
    #[must_use]
    pub fn try_outcome(&self) -> Option<Outcome> {
        self.rx.borrow().outcome.clone()
    }

    /// Creates an independent event subscription for this call.
    ///
    /// Subscriptions created after completion still receive the event.
    #[must_use]
    pub fn subscribe(&self) -> TransactionEvents {
        TransactionEvents {
            rx: Some(self.rx.clone()),
        }
    }

    /// Waits for the call to finish and returns its outcome.
    pub async fn outcome(mut self) -> Outcome {
        wait_for_outcome(&mut self.rx).await
    }
}

impl IntoFuture for TransactionHandle {
    type Output = Result<Value, GatewayError>;
    type IntoFuture = BoxFuture<'static, Self::Output>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(async move { self.outcome().await.into_result() })
    }
}

/// A subscription to the terminal event of one call.
///
/// Yields exactly one [`Outcome`], whose [`event`](Outcome::event) is
/// `"success"`, `"decline"` or `"error"`, then `None` forever.
pub struct TransactionEvents {
    rx: Option<watch::Receiver<Snapshot>>,
}

impl fmt::Debug for TransactionEvents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransactionEvents")
            .field("delivered", &self.rx.is_none())
            .finish()
    }
}

impl TransactionEvents {
    /// Waits for the terminal event.
    ///
    /// Returns `None` once the event has been delivered. Cancel safe: if the
    /// future is dropped before completing, the event is still pending.
    pub async fn recv(&mut self) -> Option<Outcome> {
        let rx = self.rx.as_mut()?;
        let outcome = wait_for_outcome(rx).await;
        self.rx = None;
        Some(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DeclineError;
    use crate::outcome::EventKind;
    use serde_json::json;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn completes_every_channel_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let callback: Callback = Box::new(move |result| {
            assert!(result.is_ok());
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let (completion, handle) = Completion::new(Operation::Auth, Some(callback));
        let mut early = handle.subscribe();

        completion.complete(Outcome::Success(json!({ "status": "approved" })));

        let mut late = handle.subscribe();
        assert_eq!(early.recv().await.unwrap().event(), EventKind::Success);
        assert!(early.recv().await.is_none());
        assert_eq!(late.recv().await.unwrap().event(), EventKind::Success);
        assert!(late.recv().await.is_none());
        assert_eq!(handle.state(), CallState::Succeeded);
        assert!(handle.await.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn decline_rejects_the_handle() {
        let (completion, handle) = Completion::new(Operation::Refund, None);
        completion.complete(Outcome::Decline(DeclineError::from_response(
            json!({ "status": "declined" }),
        )));
        assert_eq!(handle.state(), CallState::Declined);
        let err = handle.await.unwrap_err();
        assert!(err.is_declined());
    }

    #[tokio::test]
    async fn tracks_intermediate_states() {
        let (completion, handle) = Completion::new(Operation::Void, None);
        assert_eq!(handle.state(), CallState::Pending);
        completion.advance(CallState::Sending);
        assert_eq!(handle.state(), CallState::Sending);
        assert!(handle.try_outcome().is_none());
        assert!(!handle.state().is_terminal());
    }

    #[tokio::test]
    async fn waiting_handle_resolves_after_completion() {
        let (completion, handle) = Completion::new(Operation::Verify, None);
        let waiter = tokio::spawn(handle.into_future());
        tokio::task::yield_now().await;
        completion.complete(Outcome::Success(json!({ "status": "approved" })));
        assert!(waiter.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn dropped_completion_fails_every_channel() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let callback: Callback = Box::new(move |result| {
            assert!(result.unwrap_err().is_transport());
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let (completion, handle) = Completion::new(Operation::Lock, Some(callback));
        let mut events = handle.subscribe();
        drop(completion);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(handle.state(), CallState::Failed);
        assert_eq!(events.recv().await.unwrap().event(), EventKind::Error);
        let err = handle.await.unwrap_err();
        assert!(err.is_transport());
    }

    #[test]
    fn completed_call_is_not_abandoned_on_drop() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let callback: Callback = Box::new(move |result| {
            assert!(result.is_ok());
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let (completion, handle) = Completion::new(Operation::Unlock, Some(callback));
        completion.complete(Outcome::Success(json!({ "status": "approved" })));

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(handle.try_outcome().unwrap().is_success());
    }
}
