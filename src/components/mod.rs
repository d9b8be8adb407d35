use crate::error::{AppResult, Error};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use tracing::info;

// Export components
pub mod audio;
pub mod bluetooth;
pub mod btt;
pub mod calendar;

// Re-export the BetterTouchTool handle
pub use btt::BttHandle;

/// Called with the transport error when a persistent variable could not be written
pub type ErrorCallback = Box<dyn FnOnce(&Error) + Send + 'static>;

/// Something that renders text and icons on touch bar widgets.
///
/// Every call is fire-and-forget: it returns immediately and failures are only reported
/// through `on_error` (or logged when there is none).
pub trait DisplaySink: Send + Sync {
    /// Show `text`, and optionally a base64 PNG icon, on widget `uuid`
    fn update_widget(&self, uuid: &str, text: &str, icon_data: Option<&str>);

    /// Ask widget `uuid` to re-run its own script
    fn refresh_widget(&self, uuid: &str);

    /// Store a string variable the widgets' scripts can read
    fn set_persistent_variable(&self, name: &str, value: &str, on_error: Option<ErrorCallback>);
}

/// Component trait that all components must implement
#[async_trait]
pub trait Component: Send + Sync {
    /// Get the name of the component
    fn name(&self) -> &'static str;

    /// Initialize the component and start its background tasks
    async fn init(&self, sink: Arc<dyn DisplaySink>) -> AppResult<()>;

    /// Shutdown the component
    async fn shutdown(&self) -> AppResult<()>;
}

/// Manager for all components
pub struct ComponentManager {
    components: Vec<Box<dyn Component>>,
    sink: Arc<dyn DisplaySink>,
}

impl fmt::Debug for ComponentManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentManager")
            .field("component_count", &self.components.len())
            .finish()
    }
}

impl ComponentManager {
    /// Create a new component manager publishing to `sink`
    pub fn new(sink: Arc<dyn DisplaySink>) -> Self {
        Self {
            components: Vec::new(),
            sink,
        }
    }

    /// Register a component
    pub fn register<T: Component + 'static>(&mut self, component: T) {
        info!("Registering component: {}", component.name());
        self.components.push(Box::new(component));
    }

    /// Number of registered components
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Whether no component has been registered
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Initialize all registered components
    pub async fn init_all(&self) -> AppResult<()> {
        for component in &self.components {
            info!("Initializing component: {}", component.name());

            if let Err(e) = component.init(Arc::clone(&self.sink)).await {
                // Log error but continue with other components
                tracing::error!("Error initializing component {}: {:?}", component.name(), e);
            }
        }

        Ok(())
    }

    /// Shutdown all components
    pub async fn shutdown_all(&self) -> AppResult<()> {
        info!("Shutting down all components");

        for component in &self.components {
            info!("Shutting down component: {}", component.name());

            if let Err(e) = component.shutdown().await {
                // Log error but continue with other components
                tracing::error!(
                    "Error shutting down component {}: {:?}",
                    component.name(),
                    e
                );
            }
        }

        Ok(())
    }
}
