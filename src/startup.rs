use crate::shutdown;
use eventual::components::audio::{AppleScriptVolume, AudioComponent};
use eventual::components::bluetooth::{BluetoothComponent, SystemProfilerSource};
use eventual::components::calendar::{
    self, CalendarAppSource, CalendarComponent, CalendarService,
};
use eventual::components::{BttHandle, ComponentManager, DisplaySink};
use eventual::config::{Config, ServiceKind};
use eventual::error::{display_error, AppResult, Error};
use eventual::utils::process::count_running_copies;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Process name used for the single-instance check
const PROCESS_NAME: &str = "eventual";
/// Persistent variable through which BetterTouchTool learns our process id
const PID_VARIABLE: &str = "eventualpid";

/// Initialize logging with environment-based configuration
pub fn init_logging() -> miette::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,reqwest=warn,hyper=warn")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::Other(format!("Failed to set up logging: {}", e)))?;

    Ok(())
}

/// Whether another copy of Eventual is already running
pub async fn already_running() -> bool {
    match count_running_copies(PROCESS_NAME).await {
        Ok(count) if count > 1 => {
            info!("Eventual is already running, exiting");
            true
        }
        Ok(_) => false,
        Err(e) => {
            warn!("Could not check for other running copies: {}", e);
            false
        }
    }
}

/// Load and validate the configuration file
pub fn load_config(path: &Path) -> miette::Result<Config> {
    match Config::load(path) {
        Ok(config) => Ok(config),
        Err(e) => {
            error!("Failed to load configuration: {:?}", e);
            Err(e.into())
        }
    }
}

/// Build one component per service kind present in the configuration
fn build_components(config: &Config, sink: Arc<dyn DisplaySink>) -> AppResult<ComponentManager> {
    let mut component_manager = ComponentManager::new(sink);
    let timezone = config.display_timezone()?;

    let calendar_settings = config
        .services_of(ServiceKind::Calendar)
        .map(|service| service.calendar_settings())
        .collect::<AppResult<Vec<_>>>()?;
    if !calendar_settings.is_empty() {
        let store_path = calendar_settings
            .iter()
            .find_map(|settings| settings.store_path.clone());
        let services = calendar_settings
            .into_iter()
            .map(|settings| CalendarService::new(settings, timezone))
            .collect();
        let source = Arc::new(CalendarAppSource::new(store_path));
        let component = CalendarComponent::new(services, source);
        tokio::spawn(calendar::report_state(component.watch_state()));
        component_manager.register(component);
    }

    for service in config.services_of(ServiceKind::Audio) {
        let settings = service.audio_settings()?;
        component_manager.register(AudioComponent::new(settings, Arc::new(AppleScriptVolume)));
    }

    let bluetooth_settings = config
        .services_of(ServiceKind::Bluetooth)
        .map(|service| service.bluetooth_settings())
        .collect::<AppResult<Vec<_>>>()?;
    if !bluetooth_settings.is_empty() {
        component_manager.register(BluetoothComponent::new(
            &bluetooth_settings,
            Arc::new(SystemProfilerSource),
        ));
    }

    Ok(component_manager)
}

/// Tell BetterTouchTool which process drives its widgets. Failing to reach it is fatal.
async fn announce_pid(btt: &BttHandle) -> AppResult<()> {
    let (error_send, mut error_recv) = oneshot::channel::<String>();

    btt.set_persistent_variable(
        PID_VARIABLE,
        &std::process::id().to_string(),
        Some(Box::new(move |e: &Error| {
            let _ = error_send.send(e.to_string());
        })),
    );
    btt.flush().await?;

    // The callback has run or been dropped once the queue is flushed
    match error_recv.try_recv() {
        Ok(message) => Err(display_error(&format!(
            "Error communicating with BetterTouchTool, is its webserver enabled? {}",
            message
        ))),
        Err(_) => Ok(()),
    }
}

/// Start every configured component and run until a shutdown signal arrives
pub async fn start(config: Config) -> miette::Result<()> {
    let btt = BttHandle::new(config.btt_server_name.clone(), config.btt_secret.clone())?;

    let component_manager = build_components(&config, Arc::new(btt.clone()))?;
    let component_manager = Arc::new(component_manager);

    // Initialize components
    component_manager.init_all().await?;
    info!("Started {} components", component_manager.len());

    if let Err(e) = announce_pid(&btt).await {
        error!("{}", e);
        let _ = component_manager.shutdown_all().await;
        let _ = btt.shutdown().await;
        return Err(e.into());
    }

    // Create shutdown channel
    let (shutdown_send, shutdown_recv) = oneshot::channel();

    // Spawn signal handler task
    let shutdown_components = Arc::clone(&component_manager);
    let shutdown_btt = btt.clone();
    tokio::spawn(async move {
        shutdown::handle_signals(shutdown_send, shutdown_components, shutdown_btt).await;
    });

    let _ = shutdown_recv.await;
    info!("Eventual stopped");
    Ok(())
}
