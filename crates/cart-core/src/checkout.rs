//! # Checkout Initiator
//!
//! Drives one checkout attempt from the cart page:
//!
//! ```text
//! Idle ─▶ AwaitingProviderInit ─▶ RequestingSession ─▶ SessionReceived ─▶ Redirecting
//!                 │                       │                    │
//!                 └───────────────────────┴────────────────────┴──────▶ Failed
//! ```
//!
//! Every error is caught at the attempt boundary, logged, and returned in
//! the [`CheckoutAttempt`] so the page can show a notice. Only transport
//! failures of the session request are retried, and every retry carries
//! the attempt's idempotency key.

use crate::error::{CartError, CartResult};
use crate::provider::{CheckoutRedirect, PaymentClientLoader, RedirectToCheckout};
use crate::session::{CheckoutSession, CheckoutSessionRequest, SessionEndpoint};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

/// States of a checkout attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutState {
    Idle,
    AwaitingProviderInit,
    RequestingSession,
    SessionReceived,
    /// Terminal: the shopper leaves the page
    Redirecting,
    /// Terminal: the shopper stays on the cart page
    Failed,
}

impl CheckoutState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, CheckoutState::Redirecting | CheckoutState::Failed)
    }
}

/// How an attempt ended
#[derive(Debug)]
pub enum CheckoutOutcome {
    Redirecting(CheckoutRedirect),
    Failed(CartError),
}

/// Record of one checkout attempt
#[derive(Debug)]
pub struct CheckoutAttempt {
    idempotency_key: String,
    states: Vec<CheckoutState>,
    outcome: CheckoutOutcome,
}

impl CheckoutAttempt {
    /// Key sent with every session request of this attempt
    pub fn idempotency_key(&self) -> &str {
        &self.idempotency_key
    }

    /// Final state
    pub fn state(&self) -> CheckoutState {
        match self.outcome {
            CheckoutOutcome::Redirecting(_) => CheckoutState::Redirecting,
            CheckoutOutcome::Failed(_) => CheckoutState::Failed,
        }
    }

    /// Every state the attempt passed through, in order
    pub fn states(&self) -> &[CheckoutState] {
        &self.states
    }

    pub fn outcome(&self) -> &CheckoutOutcome {
        &self.outcome
    }

    pub fn into_outcome(self) -> CheckoutOutcome {
        self.outcome
    }

    pub fn redirect(&self) -> Option<&CheckoutRedirect> {
        match &self.outcome {
            CheckoutOutcome::Redirecting(r) => Some(r),
            CheckoutOutcome::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&CartError> {
        match &self.outcome {
            CheckoutOutcome::Redirecting(_) => None,
            CheckoutOutcome::Failed(e) => Some(e),
        }
    }
}

/// Bounded retry for transport failures of the session request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_transport_retries: u32,
    pub backoff: Duration,
}

impl RetryPolicy {
    /// No retries at all
    pub fn none() -> Self {
        Self {
            max_transport_retries: 0,
            backoff: Duration::ZERO,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_transport_retries: 2,
            backoff: Duration::from_millis(250),
        }
    }
}

/// Runs checkout attempts against injected collaborators
#[derive(Clone)]
pub struct CheckoutInitiator {
    loader: Arc<dyn PaymentClientLoader>,
    endpoint: Arc<dyn SessionEndpoint>,
    retry: RetryPolicy,
}

impl CheckoutInitiator {
    pub fn new(loader: Arc<dyn PaymentClientLoader>, endpoint: Arc<dyn SessionEndpoint>) -> Self {
        Self {
            loader,
            endpoint,
            retry: RetryPolicy::default(),
        }
    }

    /// Builder: set the transport retry policy
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Run one checkout attempt. Never returns an error: failures are
    /// logged and reported through the attempt's outcome.
    #[instrument(skip_all, fields(items = request.items.len(), currency = %request.currency, locale = %request.locale))]
    pub async fn checkout(&self, request: &CheckoutSessionRequest) -> CheckoutAttempt {
        let idempotency_key = uuid::Uuid::new_v4().to_string();
        let mut states = vec![CheckoutState::Idle];

        match self.run(request, &idempotency_key, &mut states).await {
            Ok(redirect) => {
                info!(session_id = %redirect.session_id, "Redirecting to hosted checkout");
                CheckoutAttempt {
                    idempotency_key,
                    states,
                    outcome: CheckoutOutcome::Redirecting(redirect),
                }
            }
            Err(err) => {
                advance(&mut states, CheckoutState::Failed);
                match &err {
                    CartError::SessionRequestFailed { http_status, body } => {
                        error!(http_status, %body, "Checkout session request failed");
                    }
                    other => error!(error = %other, "Checkout failed"),
                }
                CheckoutAttempt {
                    idempotency_key,
                    states,
                    outcome: CheckoutOutcome::Failed(err),
                }
            }
        }
    }

    async fn run(
        &self,
        request: &CheckoutSessionRequest,
        idempotency_key: &str,
        states: &mut Vec<CheckoutState>,
    ) -> CartResult<CheckoutRedirect> {
        advance(states, CheckoutState::AwaitingProviderInit);
        let client = self.loader.load().await?;

        advance(states, CheckoutState::RequestingSession);
        let session = self.request_session(request, idempotency_key).await?;

        advance(states, CheckoutState::SessionReceived);
        let redirect = client
            .redirect_to_checkout(RedirectToCheckout {
                session_id: session.id,
                url: session.url,
            })
            .await?;

        advance(states, CheckoutState::Redirecting);
        Ok(redirect)
    }

    async fn request_session(
        &self,
        request: &CheckoutSessionRequest,
        idempotency_key: &str,
    ) -> CartResult<CheckoutSession> {
        debug!(idempotency_key, "Requesting checkout session");
        let mut retries = 0;
        loop {
            match self
                .endpoint
                .create_checkout_session(request, idempotency_key)
                .await
            {
                Err(err) if err.is_retryable() && retries < self.retry.max_transport_retries => {
                    retries += 1;
                    warn!(
                        attempt = retries,
                        max = self.retry.max_transport_retries,
                        error = %err,
                        "Retrying checkout session request"
                    );
                    tokio::time::sleep(self.retry.backoff).await;
                }
                result => return result,
            }
        }
    }
}

fn advance(states: &mut Vec<CheckoutState>, next: CheckoutState) {
    debug!(from = ?states.last(), to = ?next, "checkout state");
    states.push(next);
}
