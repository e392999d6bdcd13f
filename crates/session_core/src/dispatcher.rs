use std::sync::Arc;

use shared::protocol::ProviderEvent;
use tokio::{sync::broadcast, task::JoinHandle};
use tracing::{debug, warn};

use crate::SessionController;

/// Owns the provider event subscription for one session activation.
///
/// A single task applies events strictly in arrival order, so controller
/// mutation is serialized without extra locking. Dropping the dispatcher
/// (or replacing it on re-activation) aborts the task, which guarantees no
/// handler outlives its session and no event is ever handled twice.
pub struct EventDispatcher {
    task: JoinHandle<()>,
}

impl EventDispatcher {
    pub(crate) fn spawn(
        controller: Arc<SessionController>,
        mut events: broadcast::Receiver<ProviderEvent>,
    ) -> Self {
        let task = tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => controller.apply_event(event).await,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "provider event stream lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        debug!("provider event stream closed");
                        break;
                    }
                }
            }
        });
        Self { task }
    }

    pub fn abort(&self) {
        self.task.abort();
    }
}

impl Drop for EventDispatcher {
    fn drop(&mut self) {
        self.task.abort();
    }
}
