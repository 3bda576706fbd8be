//! Short-lived loopback listener that receives the OAuth redirect.
//!
//! The listener serves exactly one route and hands the first callback's
//! outcome to the waiting coordinator over a oneshot channel. It is stopped
//! explicitly by [`CallbackListener::wait`] / [`CallbackListener::shutdown`]
//! and, on any other exit path, by `Drop`.

use std::io;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use subtle::ConstantTimeEq;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::error::AuthorizationError;

const SUCCESS_BODY: &str = "Authorization code received! You can close this tab.";
const FAILURE_BODY: &str = "Authorization failed. You can close this tab and retry.";
const DUPLICATE_BODY: &str = "Authorization already handled. You can close this tab.";

/// How long a graceful shutdown may take before the server task is aborted.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

type CallbackOutcome = Result<String, AuthorizationError>;

/// Query parameters of the provider redirect.
#[derive(Debug, Default, Clone, Deserialize)]
pub(crate) struct CallbackParams {
    pub(crate) code: Option<String>,
    pub(crate) state: Option<String>,
    pub(crate) error: Option<String>,
}

#[derive(Clone)]
struct CallbackState {
    expected_state: Arc<str>,
    result_tx: Arc<Mutex<Option<oneshot::Sender<CallbackOutcome>>>>,
}

/// Decides what a single callback means, checking `state` before anything else.
pub(crate) fn evaluate_callback(params: &CallbackParams, expected_state: &str) -> CallbackOutcome {
    let state_matches = params
        .state
        .as_deref()
        .is_some_and(|state| bool::from(state.as_bytes().ct_eq(expected_state.as_bytes())));
    if !state_matches {
        return Err(AuthorizationError::StateMismatch);
    }
    if let Some(error) = &params.error {
        return Err(AuthorizationError::Denied(error.clone()));
    }
    match params.code.as_deref().map(str::trim) {
        Some(code) if !code.is_empty() => Ok(code.to_string()),
        _ => Err(AuthorizationError::MissingCode),
    }
}

async fn handle_callback(
    State(state): State<CallbackState>,
    Query(params): Query<CallbackParams>,
) -> (StatusCode, &'static str) {
    let sender = state
        .result_tx
        .lock()
        .ok()
        .and_then(|mut slot| slot.take());
    let Some(sender) = sender else {
        tracing::warn!("ignoring repeated authorization callback");
        return (StatusCode::CONFLICT, DUPLICATE_BODY);
    };

    let outcome = evaluate_callback(&params, &state.expected_state);
    let response = match &outcome {
        Ok(_) => (StatusCode::OK, SUCCESS_BODY),
        Err(e) => {
            tracing::warn!(error = %e, "authorization callback rejected");
            (StatusCode::BAD_REQUEST, FAILURE_BODY)
        }
    };
    if sender.send(outcome).is_err() {
        tracing::debug!("authorization callback arrived after the coordinator stopped waiting");
    }
    response
}

fn callback_router(path: &str, state: CallbackState) -> Router {
    Router::new()
        .route(path, get(handle_callback))
        .with_state(state)
}

/// A running callback listener bound to the redirect URI's address.
pub struct CallbackListener {
    local_addr: SocketAddr,
    result_rx: Option<oneshot::Receiver<CallbackOutcome>>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl CallbackListener {
    /// Binds `addr` and starts serving `GET path`. The listener is accepting
    /// connections by the time this returns.
    ///
    /// # Errors
    ///
    /// Returns [`AuthorizationError::Listener`] if the address cannot be bound.
    pub async fn bind(
        addr: SocketAddr,
        path: &str,
        expected_state: &str,
    ) -> Result<Self, AuthorizationError> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;

        let (result_tx, result_rx) = oneshot::channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let app = callback_router(
            path,
            CallbackState {
                expected_state: Arc::from(expected_state),
                result_tx: Arc::new(Mutex::new(Some(result_tx))),
            },
        );

        let task = tokio::spawn(async move {
            let shutdown = async move {
                // A dropped sender means the same as an explicit signal.
                let _ = shutdown_rx.await;
            };
            if let Err(e) = axum::serve(listener, app)
                .with_graceful_shutdown(shutdown)
                .await
            {
                tracing::error!(error = %e, "callback listener failed");
            }
        });

        tracing::info!(addr = %local_addr, path, "callback listener ready");
        Ok(Self {
            local_addr,
            result_rx: Some(result_rx),
            shutdown_tx: Some(shutdown_tx),
            task: Some(task),
        })
    }

    #[must_use]
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Waits for the callback (or `timeout`), then stops the listener and
    /// releases its port before returning.
    ///
    /// # Errors
    ///
    /// - [`AuthorizationError::Timeout`] if no callback arrived in time.
    /// - [`AuthorizationError::StateMismatch`], [`AuthorizationError::Denied`]
    ///   or [`AuthorizationError::MissingCode`] for a rejected callback.
    /// - [`AuthorizationError::Listener`] if the server stopped unexpectedly.
    pub async fn wait(mut self, timeout: Duration) -> Result<String, AuthorizationError> {
        let outcome = match self.result_rx.take() {
            Some(rx) => match tokio::time::timeout(timeout, rx).await {
                Ok(Ok(outcome)) => outcome,
                Ok(Err(_)) => Err(AuthorizationError::Listener(io::Error::other(
                    "callback listener stopped before a callback arrived",
                ))),
                Err(_) => {
                    tracing::warn!(
                        timeout_secs = timeout.as_secs(),
                        "no authorization callback before timeout"
                    );
                    Err(AuthorizationError::Timeout(timeout))
                }
            },
            None => Err(AuthorizationError::Listener(io::Error::other(
                "callback result already consumed",
            ))),
        };
        self.stop().await;
        outcome
    }

    /// Stops the listener without waiting for a callback.
    pub async fn shutdown(mut self) {
        self.stop().await;
    }

    async fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        let Some(task) = self.task.take() else {
            return;
        };
        let abort = task.abort_handle();
        match tokio::time::timeout(SHUTDOWN_GRACE, task).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::warn!(error = %e, "callback listener task ended abnormally"),
            Err(_) => {
                tracing::warn!("callback listener did not stop in time, aborting");
                abort.abort();
            }
        }
        tracing::debug!(addr = %self.local_addr, "callback listener stopped");
    }
}

impl Drop for CallbackListener {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    use super::*;

    fn params(code: Option<&str>, state: Option<&str>, error: Option<&str>) -> CallbackParams {
        CallbackParams {
            code: code.map(str::to_string),
            state: state.map(str::to_string),
            error: error.map(str::to_string),
        }
    }

    fn test_router(expected: &str) -> (Router, oneshot::Receiver<CallbackOutcome>) {
        let (tx, rx) = oneshot::channel();
        let router = callback_router(
            "/authorize_callback",
            CallbackState {
                expected_state: Arc::from(expected),
                result_tx: Arc::new(Mutex::new(Some(tx))),
            },
        );
        (router, rx)
    }

    #[test]
    fn matching_state_yields_code() {
        let outcome = evaluate_callback(&params(Some("abc"), Some("nonce"), None), "nonce");
        assert_eq!(outcome.unwrap(), "abc");
    }

    #[test]
    fn mismatched_or_missing_state_is_rejected() {
        assert!(matches!(
            evaluate_callback(&params(Some("abc"), Some("other"), None), "nonce"),
            Err(AuthorizationError::StateMismatch)
        ));
        assert!(matches!(
            evaluate_callback(&params(Some("abc"), None, None), "nonce"),
            Err(AuthorizationError::StateMismatch)
        ));
        assert!(matches!(
            evaluate_callback(&params(Some("abc"), Some("nonc"), None), "nonce"),
            Err(AuthorizationError::StateMismatch)
        ));
    }

    #[test]
    fn state_is_checked_before_provider_error() {
        assert!(matches!(
            evaluate_callback(&params(None, Some("forged"), Some("access_denied")), "nonce"),
            Err(AuthorizationError::StateMismatch)
        ));
        assert!(matches!(
            evaluate_callback(&params(None, Some("nonce"), Some("access_denied")), "nonce"),
            Err(AuthorizationError::Denied(ref e)) if e == "access_denied"
        ));
    }

    #[test]
    fn blank_code_is_missing() {
        assert!(matches!(
            evaluate_callback(&params(Some("  "), Some("nonce"), None), "nonce"),
            Err(AuthorizationError::MissingCode)
        ));
    }

    #[tokio::test]
    async fn router_confirms_valid_callback() {
        let (router, rx) = test_router("nonce");
        let response = router
            .oneshot(
                Request::builder()
                    .uri("/authorize_callback?state=nonce&code=xyz")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        assert_eq!(&body[..], SUCCESS_BODY.as_bytes());
        assert_eq!(rx.await.expect("outcome").unwrap(), "xyz");
    }

    #[tokio::test]
    async fn router_rejects_state_mismatch_with_400() {
        let (router, rx) = test_router("nonce");
        let response = router
            .oneshot(
                Request::builder()
                    .uri("/authorize_callback?state=forged&code=xyz")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(matches!(
            rx.await.expect("outcome"),
            Err(AuthorizationError::StateMismatch)
        ));
    }

    #[tokio::test]
    async fn router_answers_repeat_callbacks_with_409() {
        let (router, _rx) = test_router("nonce");
        let request = || {
            Request::builder()
                .uri("/authorize_callback?state=nonce&code=xyz")
                .body(Body::empty())
                .expect("request")
        };

        let first = router.clone().oneshot(request()).await.expect("response");
        assert_eq!(first.status(), StatusCode::OK);
        let second = router.oneshot(request()).await.expect("response");
        assert_eq!(second.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn router_serves_only_the_callback_path() {
        let (router, _rx) = test_router("nonce");
        let response = router
            .oneshot(
                Request::builder()
                    .uri("/other?state=nonce&code=xyz")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
