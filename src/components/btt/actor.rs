use super::encoding::encode_query_value;
use crate::components::ErrorCallback;
use crate::error::{display_error, AppResult};
use reqwest::Client;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, info, warn};
use url::Url;

/// How many requests may wait for the web server before new ones are dropped
const MAILBOX_CAPACITY: usize = 64;
/// BetterTouchTool answers locally, so anything slower than this is treated as a failure
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// The BetterTouchTool actor that turns commands into web server requests
pub struct BttActor {
    server: String,
    secret: String,
    client: Client,
    command_rx: mpsc::Receiver<BttCommand>,
}

/// Commands that can be sent to the BetterTouchTool actor
pub enum BttCommand {
    UpdateWidget {
        uuid: String,
        text: String,
        icon_data: Option<String>,
    },
    RefreshWidget {
        uuid: String,
    },
    SetPersistentVariable {
        name: String,
        value: String,
        on_error: Option<ErrorCallback>,
    },
    Flush(mpsc::Sender<()>),
    Shutdown,
}

/// Handle for communicating with the BetterTouchTool actor
#[derive(Clone)]
pub struct BttActorHandle {
    command_tx: mpsc::Sender<BttCommand>,
}

impl BttActorHandle {
    /// Queue a command without waiting. Returns false when it had to be dropped.
    pub fn enqueue(&self, command: BttCommand) -> bool {
        match self.command_tx.try_send(command) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                warn!("BetterTouchTool queue is full, dropping update");
                false
            }
            Err(TrySendError::Closed(_)) => {
                warn!("BetterTouchTool actor has stopped, dropping update");
                false
            }
        }
    }

    /// Wait until every command queued before this call has been sent
    pub async fn flush(&self) -> AppResult<()> {
        let (response_tx, mut response_rx) = mpsc::channel(1);
        self.command_tx
            .send(BttCommand::Flush(response_tx))
            .await
            .map_err(|e| display_error(&format!("Actor mailbox error: {}", e)))?;

        response_rx
            .recv()
            .await
            .ok_or_else(|| display_error("Response channel closed"))
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> AppResult<()> {
        let _ = self.command_tx.send(BttCommand::Shutdown).await;
        Ok(())
    }
}

impl BttActor {
    /// Create a new actor and return its handle
    pub fn new(
        server: impl Into<String>,
        secret: impl Into<String>,
    ) -> AppResult<(Self, BttActorHandle)> {
        let (command_tx, command_rx) = mpsc::channel(MAILBOX_CAPACITY);
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        let actor = Self {
            server: server.into().trim_end_matches('/').to_string(),
            secret: secret.into(),
            client,
            command_rx,
        };

        let handle = BttActorHandle { command_tx };

        Ok((actor, handle))
    }

    /// Start the actor's processing loop
    pub async fn run(&mut self) {
        info!("BetterTouchTool actor started for {}", self.server);

        // Process commands one at a time so updates reach the widgets in order
        while let Some(cmd) = self.command_rx.recv().await {
            match cmd {
                BttCommand::UpdateWidget {
                    uuid,
                    text,
                    icon_data,
                } => {
                    let mut params = vec![("uuid", uuid.as_str()), ("text", text.as_str())];
                    if let Some(icon) = &icon_data {
                        params.push(("icon_data", icon.as_str()));
                    }
                    if let Err(e) = self.get("update_touch_bar_widget", &params).await {
                        warn!("Failed to update widget {}: {}", uuid, e);
                    }
                }
                BttCommand::RefreshWidget { uuid } => {
                    if let Err(e) = self.get("refresh_widget", &[("uuid", uuid.as_str())]).await {
                        warn!("Failed to refresh widget {}: {}", uuid, e);
                    }
                }
                BttCommand::SetPersistentVariable {
                    name,
                    value,
                    on_error,
                } => {
                    let params = [("variableName", name.as_str()), ("to", value.as_str())];
                    if let Err(e) = self.get("set_persistent_string_variable", &params).await {
                        match on_error {
                            Some(callback) => callback(&e),
                            None => warn!("Failed to set variable {}: {}", name, e),
                        }
                    }
                }
                BttCommand::Flush(response_tx) => {
                    let _ = response_tx.send(()).await;
                }
                BttCommand::Shutdown => {
                    info!("BetterTouchTool actor shutting down");
                    break;
                }
            }
        }

        info!("BetterTouchTool actor shut down");
    }

    /// Build the request URL for an endpoint. Every value is percent-encoded.
    pub fn endpoint_url(&self, endpoint: &str, params: &[(&str, &str)]) -> AppResult<Url> {
        let mut url = format!(
            "{}/{}/?shared_secret={}",
            self.server,
            endpoint,
            encode_query_value(&self.secret)
        );
        for (key, value) in params {
            url.push('&');
            url.push_str(key);
            url.push('=');
            url.push_str(&encode_query_value(value));
        }

        Url::parse(&url).map_err(|e| display_error(&format!("Failed to parse URL: {}", e)))
    }

    async fn get(&self, endpoint: &str, params: &[(&str, &str)]) -> AppResult<()> {
        let url = self.endpoint_url(endpoint, params)?;
        debug!("GET /{}/", endpoint);

        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(display_error(&format!(
                "{} returned HTTP {}",
                endpoint,
                response.status()
            )));
        }

        Ok(())
    }
}
