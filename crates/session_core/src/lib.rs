//! Client-side SIP session control.
//!
//! [`SessionController`] is the single owner of registration and call state:
//! it validates user actions (login, place call, hangup), forwards accepted
//! requests to an injected [`SipProvider`], and folds the provider's
//! asynchronous events back into state through the [`EventDispatcher`].
//! Every state transition publishes exactly one [`SessionStatus`] on a
//! broadcast channel for the presentation layer.

use std::sync::Arc;

use shared::{
    domain::{CallId, CallState, CallTarget, Credentials, RegistrationState},
    protocol::ProviderEvent,
    status::SessionStatus,
};
use thiserror::Error;
use tokio::sync::{broadcast, Mutex};
use tracing::{info, warn};

mod dispatcher;
mod provider;

pub use dispatcher::EventDispatcher;
pub use provider::{MissingSipProvider, ProviderError, SipProvider};

const STATUS_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Error)]
pub enum SessionError {
    /// A required input field is empty; nothing was sent to the provider.
    #[error("required field '{field}' is empty")]
    Validation { field: &'static str },
    #[error("callee address must not be empty")]
    InvalidTarget,
    #[error("not registered")]
    NotRegistered,
    #[error("another call is already in progress")]
    CallInProgress,
    #[error("sip provider is unavailable")]
    ProviderUnavailable,
    /// The provider refused to accept a request.
    #[error("provider rejected request: {0}")]
    Provider(String),
}

impl From<ProviderError> for SessionError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Unavailable => SessionError::ProviderUnavailable,
            ProviderError::Rejected(message) => SessionError::Provider(message),
        }
    }
}

struct SessionState {
    registration: RegistrationState,
    call: CallState,
    status: SessionStatus,
    active_call: Option<CallId>,
}

/// Authoritative owner of one SIP session's state.
///
/// User actions and dispatched provider events both serialize on the inner
/// mutex, so no transition can interleave with another.
pub struct SessionController {
    provider: Arc<dyn SipProvider>,
    inner: Mutex<SessionState>,
    dispatcher: Mutex<Option<EventDispatcher>>,
    status_tx: broadcast::Sender<SessionStatus>,
}

impl SessionController {
    pub fn new(provider: Arc<dyn SipProvider>) -> Arc<Self> {
        let (status_tx, _) = broadcast::channel(STATUS_CHANNEL_CAPACITY);
        Arc::new(Self {
            provider,
            inner: Mutex::new(SessionState {
                registration: RegistrationState::Unregistered,
                call: CallState::Idle,
                status: SessionStatus::info("not connected"),
                active_call: None,
            }),
            dispatcher: Mutex::new(None),
            status_tx,
        })
    }

    /// Controller with the signaling capability tagged absent; every action
    /// surfaces [`SessionError::ProviderUnavailable`].
    pub fn without_provider() -> Arc<Self> {
        Self::new(Arc::new(MissingSipProvider::new()))
    }

    /// Bring the session up: initialize the provider, start listening for
    /// incoming calls, and install the event dispatcher.
    ///
    /// Re-activation replaces (and aborts) the previous dispatcher, so a
    /// provider event is never handled more than once. On setup failure
    /// nothing is installed and an error status is published.
    pub async fn activate(self: &Arc<Self>) -> Result<(), SessionError> {
        if let Err(err) = self.provider.initialize().await {
            let mut state = self.inner.lock().await;
            self.publish(&mut state, SessionStatus::error("initialization failed"));
            return Err(err.into());
        }
        if let Err(err) = self.provider.listen_for_incoming_calls().await {
            let mut state = self.inner.lock().await;
            self.publish(&mut state, SessionStatus::error("initialization failed"));
            return Err(err.into());
        }

        let dispatcher =
            EventDispatcher::spawn(Arc::clone(self), self.provider.subscribe_events());
        let previous = self.dispatcher.lock().await.replace(dispatcher);
        if let Some(previous) = previous {
            previous.abort();
        }
        Ok(())
    }

    /// Tear down the event subscription. Safe to call when not activated.
    pub async fn deactivate(&self) {
        if let Some(dispatcher) = self.dispatcher.lock().await.take() {
            dispatcher.abort();
        }
    }

    /// Request registration with the SIP server.
    ///
    /// Resolves once the provider accepts the request; the registration
    /// outcome arrives later as a provider event. Logging in while already
    /// registered is a no-op that does not re-invoke the provider.
    pub async fn login(&self, credentials: Credentials) -> Result<(), SessionError> {
        if let Some(field) = credentials.missing_field() {
            let mut state = self.inner.lock().await;
            self.publish(&mut state, SessionStatus::info("fill all sip login fields"));
            return Err(SessionError::Validation { field });
        }

        let previous = {
            let mut state = self.inner.lock().await;
            if state.registration == RegistrationState::Registered {
                info!(username = %credentials.username, "login ignored; already registered");
                self.publish(&mut state, SessionStatus::info("already registered"));
                return Ok(());
            }
            let previous = state.registration;
            state.registration = RegistrationState::Registering;
            self.publish(
                &mut state,
                SessionStatus::info(format!(
                    "registering {}@{}",
                    credentials.username, credentials.domain
                )),
            );
            previous
        };

        if let Err(err) = self.provider.register(&credentials).await {
            let mut state = self.inner.lock().await;
            state.registration = previous;
            let err = SessionError::from(err);
            self.publish(
                &mut state,
                SessionStatus::error(format!("registration error: {err}")),
            );
            return Err(err);
        }

        info!(
            username = %credentials.username,
            domain = %credentials.domain,
            "registration requested"
        );
        Ok(())
    }

    /// Place an outbound call. Requires an idle, registered session.
    ///
    /// Resolves with the new call's id once the provider accepts the
    /// request; connection or failure arrives later as a provider event.
    pub async fn place_call(&self, target: CallTarget) -> Result<CallId, SessionError> {
        if target.is_empty() {
            let mut state = self.inner.lock().await;
            self.publish(&mut state, SessionStatus::info("enter a sip number to call"));
            return Err(SessionError::InvalidTarget);
        }

        let call_id = {
            let mut state = self.inner.lock().await;
            if state.registration != RegistrationState::Registered {
                self.publish(
                    &mut state,
                    SessionStatus::info("register before placing a call"),
                );
                return Err(SessionError::NotRegistered);
            }
            if !state.call.is_idle() {
                self.publish(
                    &mut state,
                    SessionStatus::error("another call is already in progress"),
                );
                return Err(SessionError::CallInProgress);
            }
            let call_id = CallId::new();
            state.call = CallState::Dialing;
            state.active_call = Some(call_id);
            self.publish(
                &mut state,
                SessionStatus::info(format!("calling {}", target.callee)),
            );
            call_id
        };

        if let Err(err) = self.provider.call(&target).await {
            let mut state = self.inner.lock().await;
            state.call = CallState::Idle;
            state.active_call = None;
            let err = SessionError::from(err);
            self.publish(&mut state, SessionStatus::error(format!("call failed: {err}")));
            return Err(err);
        }

        info!(call = %call_id, callee = %target.callee, "outbound call requested");
        Ok(call_id)
    }

    /// Request teardown of the current call.
    ///
    /// No call-state precondition: the request is forwarded even when no
    /// call is active and the provider decides whether there is anything to
    /// tear down. The call reaches `Idle` when the provider reports
    /// `CallEnded`.
    pub async fn hangup(&self) -> Result<(), SessionError> {
        if let Err(err) = self.provider.hangup().await {
            let mut state = self.inner.lock().await;
            let err = SessionError::from(err);
            self.publish(
                &mut state,
                SessionStatus::error(format!("hangup failed: {err}")),
            );
            return Err(err);
        }

        let mut state = self.inner.lock().await;
        if state.call.is_idle() {
            self.publish(&mut state, SessionStatus::info("no active call"));
        } else {
            state.call = CallState::Ending;
            self.publish(&mut state, SessionStatus::info("ending call"));
        }
        Ok(())
    }

    pub async fn status(&self) -> SessionStatus {
        self.inner.lock().await.status.clone()
    }

    pub async fn registration_state(&self) -> RegistrationState {
        self.inner.lock().await.registration
    }

    pub async fn call_state(&self) -> CallState {
        self.inner.lock().await.call.clone()
    }

    pub async fn active_call(&self) -> Option<CallId> {
        self.inner.lock().await.active_call
    }

    /// One message per state transition, in transition order.
    pub fn subscribe_status(&self) -> broadcast::Receiver<SessionStatus> {
        self.status_tx.subscribe()
    }

    /// Fold one provider event into session state. Called only from the
    /// dispatcher task, in arrival order.
    pub(crate) async fn apply_event(&self, event: ProviderEvent) {
        let mut state = self.inner.lock().await;
        match event {
            ProviderEvent::RegistrationSuccess => {
                state.registration = RegistrationState::Registered;
                self.publish(&mut state, SessionStatus::success("registered successfully"));
            }
            ProviderEvent::RegistrationFailed { message } => {
                let reason = message.unwrap_or_else(|| "unknown error".to_string());
                warn!(%reason, "registration failed");
                state.registration = RegistrationState::RegistrationFailed;
                state.call = CallState::Idle;
                state.active_call = None;
                self.publish(
                    &mut state,
                    SessionStatus::error(format!("registration failed: {reason}")),
                );
            }
            ProviderEvent::IncomingCall { from } => {
                if !state.call.is_idle() {
                    warn!(%from, call = ?state.call, "incoming call ignored; session busy");
                    return;
                }
                self.publish(
                    &mut state,
                    SessionStatus::info(format!("incoming call from {from}")),
                );
                state.call = CallState::Ringing { from };
            }
            ProviderEvent::CallEstablished => {
                state.call = CallState::Connected;
                self.publish(&mut state, SessionStatus::success("call connected"));
            }
            ProviderEvent::CallEnded => {
                state.call = CallState::Idle;
                state.active_call = None;
                self.publish(&mut state, SessionStatus::info("call ended"));
            }
            ProviderEvent::CallError { message } => {
                let reason = message.unwrap_or_else(|| "unknown error".to_string());
                warn!(%reason, "call error");
                state.call = CallState::Idle;
                state.active_call = None;
                self.publish(
                    &mut state,
                    SessionStatus::error(format!("call error: {reason}")),
                );
            }
        }
    }

    fn publish(&self, state: &mut SessionState, status: SessionStatus) {
        state.status = status.clone();
        let _ = self.status_tx.send(status);
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
