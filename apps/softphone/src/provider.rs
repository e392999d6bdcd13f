//! Loopback signaling backend for running the softphone without a real
//! SIP stack.

use std::time::Duration;

use async_trait::async_trait;
use session_core::{ProviderError, SipProvider};
use shared::{
    domain::{CallTarget, Credentials},
    protocol::ProviderEvent,
};
use tokio::sync::broadcast;
use tracing::debug;

const SIGNALING_DELAY: Duration = Duration::from_millis(200);

/// Accepts every request and emits the matching outcome event after a short
/// delay, approximating a cooperative SIP server.
pub struct SimulatedSipProvider {
    events: broadcast::Sender<ProviderEvent>,
}

impl SimulatedSipProvider {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(64);
        Self { events }
    }

    fn emit_later(&self, event: ProviderEvent) {
        let events = self.events.clone();
        tokio::spawn(async move {
            tokio::time::sleep(SIGNALING_DELAY).await;
            let _ = events.send(event);
        });
    }
}

impl Default for SimulatedSipProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SipProvider for SimulatedSipProvider {
    async fn initialize(&self) -> Result<(), ProviderError> {
        debug!("simulated sip stack initialized");
        Ok(())
    }

    async fn listen_for_incoming_calls(&self) -> Result<(), ProviderError> {
        Ok(())
    }

    async fn register(&self, credentials: &Credentials) -> Result<(), ProviderError> {
        debug!(username = %credentials.username, domain = %credentials.domain, "simulated register");
        self.emit_later(ProviderEvent::RegistrationSuccess);
        Ok(())
    }

    async fn call(&self, target: &CallTarget) -> Result<(), ProviderError> {
        debug!(callee = %target.callee, "simulated invite");
        self.emit_later(ProviderEvent::CallEstablished);
        Ok(())
    }

    async fn hangup(&self) -> Result<(), ProviderError> {
        self.emit_later(ProviderEvent::CallEnded);
        Ok(())
    }

    fn subscribe_events(&self) -> broadcast::Receiver<ProviderEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn register_is_acknowledged_and_confirmed_by_event() {
        let provider = SimulatedSipProvider::new();
        let mut events = provider.subscribe_events();

        provider
            .register(&Credentials::new("alice", "sip.example.com", "pw"))
            .await
            .expect("request accepted");

        let event = tokio::time::timeout(Duration::from_secs(1), events.recv())
            .await
            .expect("event timeout")
            .expect("event");
        assert_eq!(event, ProviderEvent::RegistrationSuccess);
    }

    #[tokio::test]
    async fn hangup_emits_call_ended() {
        let provider = SimulatedSipProvider::new();
        let mut events = provider.subscribe_events();

        provider.hangup().await.expect("request accepted");

        let event = tokio::time::timeout(Duration::from_secs(1), events.recv())
            .await
            .expect("event timeout")
            .expect("event");
        assert_eq!(event, ProviderEvent::CallEnded);
    }
}
