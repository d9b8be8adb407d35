use super::actor::{BttActor, BttActorHandle, BttCommand};
use crate::components::{DisplaySink, ErrorCallback};
use crate::error::AppResult;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Handle for interacting with the BetterTouchTool actor
#[derive(Clone)]
pub struct BttHandle {
    actor_handle: BttActorHandle,
    _actor_task: Arc<JoinHandle<()>>,
}

impl BttHandle {
    /// Create a new BttHandle and spawn the actor
    pub fn new(server: impl Into<String>, secret: impl Into<String>) -> AppResult<Self> {
        // Create the actor and get its handle
        let (mut actor, handle) = BttActor::new(server, secret)?;

        // Spawn a task to run the actor
        let actor_task = tokio::spawn(async move {
            actor.run().await;
        });

        Ok(Self {
            actor_handle: handle,
            _actor_task: Arc::new(actor_task),
        })
    }

    /// Wait until everything queued so far has been sent
    pub async fn flush(&self) -> AppResult<()> {
        self.actor_handle.flush().await
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> AppResult<()> {
        self.actor_handle.shutdown().await
    }
}

impl DisplaySink for BttHandle {
    fn update_widget(&self, uuid: &str, text: &str, icon_data: Option<&str>) {
        self.actor_handle.enqueue(BttCommand::UpdateWidget {
            uuid: uuid.to_string(),
            text: text.to_string(),
            icon_data: icon_data.map(str::to_string),
        });
    }

    fn refresh_widget(&self, uuid: &str) {
        self.actor_handle.enqueue(BttCommand::RefreshWidget {
            uuid: uuid.to_string(),
        });
    }

    fn set_persistent_variable(&self, name: &str, value: &str, on_error: Option<ErrorCallback>) {
        self.actor_handle.enqueue(BttCommand::SetPersistentVariable {
            name: name.to_string(),
            value: value.to_string(),
            on_error,
        });
    }
}
