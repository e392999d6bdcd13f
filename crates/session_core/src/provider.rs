use async_trait::async_trait;
use shared::{
    domain::{CallTarget, Credentials},
    protocol::ProviderEvent,
};
use thiserror::Error;
use tokio::sync::broadcast;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// The signaling capability is not present in this build or platform.
    #[error("sip provider is unavailable")]
    Unavailable,
    /// The provider refused to accept the request.
    #[error("{0}")]
    Rejected(String),
}

/// External SIP signaling capability.
///
/// Every operation is two-phase: the awaited call resolves once the request
/// has been accepted by the provider, while the logical outcome (registered,
/// connected, failed) arrives later as a [`ProviderEvent`] on the channel
/// returned by [`subscribe_events`](SipProvider::subscribe_events). Callers
/// must not treat an `Ok` acceptance as operation success.
#[async_trait]
pub trait SipProvider: Send + Sync {
    async fn initialize(&self) -> Result<(), ProviderError>;
    async fn listen_for_incoming_calls(&self) -> Result<(), ProviderError>;
    async fn register(&self, credentials: &Credentials) -> Result<(), ProviderError>;
    async fn call(&self, target: &CallTarget) -> Result<(), ProviderError>;
    async fn hangup(&self) -> Result<(), ProviderError>;
    fn subscribe_events(&self) -> broadcast::Receiver<ProviderEvent>;
}

/// Stand-in for an absent signaling capability: every operation fails with
/// [`ProviderError::Unavailable`] and the event channel never yields.
pub struct MissingSipProvider {
    events: broadcast::Sender<ProviderEvent>,
}

impl MissingSipProvider {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(1);
        Self { events }
    }
}

impl Default for MissingSipProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SipProvider for MissingSipProvider {
    async fn initialize(&self) -> Result<(), ProviderError> {
        Err(ProviderError::Unavailable)
    }

    async fn listen_for_incoming_calls(&self) -> Result<(), ProviderError> {
        Err(ProviderError::Unavailable)
    }

    async fn register(&self, _credentials: &Credentials) -> Result<(), ProviderError> {
        Err(ProviderError::Unavailable)
    }

    async fn call(&self, _target: &CallTarget) -> Result<(), ProviderError> {
        Err(ProviderError::Unavailable)
    }

    async fn hangup(&self) -> Result<(), ProviderError> {
        Err(ProviderError::Unavailable)
    }

    fn subscribe_events(&self) -> broadcast::Receiver<ProviderEvent> {
        self.events.subscribe()
    }
}
