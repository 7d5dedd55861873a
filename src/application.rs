//! Application entry point and builder pattern implementation.

use anyhow::{Context, Result};
use log::info;

use crate::{
    app_context::ControlContext, config::ConfigManager, coordinator::SystemCoordinator, hwmon,
    signals::ShutdownListener,
};

/// Main application structure that ties discovery, the coordinator and the
/// shutdown signals together.
///
/// # Example
///
/// ```no_run
/// use hwmon_fand::application::Application;
/// use hwmon_fand::config::ConfigManager;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config_manager = ConfigManager::load(None)?;
/// Application::builder()
///     .with_config_manager(config_manager)
///     .build()?
///     .run()
///     .await
/// # }
/// ```
pub struct Application {
    pub coordinator: SystemCoordinator,
    config_manager: ConfigManager,
}

impl Application {
    pub fn builder() -> ApplicationBuilder {
        ApplicationBuilder::new()
    }

    /// Runs the daemon lifecycle: discover, apply the initial duty, loop
    /// until a shutdown signal, restore the neutral duty.
    ///
    /// Returns an error only when startup fails.
    pub async fn run(&mut self) -> Result<()> {
        let config = self.config_manager.config();

        let topology = hwmon::discover_topology(config).with_context(|| {
            format!("Device discovery in {} failed", config.hwmon_root.display())
        })?;
        let context = ControlContext::from_topology(topology, config);

        let mut signals = ShutdownListener::install()?;

        self.coordinator.initialize(context).await?;
        self.coordinator.start()?;

        info!("hwmon-fand running");
        self.coordinator.run_main_loop(signals.recv()).await
    }
}

/// Builder pattern for creating Application instances.
pub struct ApplicationBuilder {
    config_manager: Option<ConfigManager>,
}

impl ApplicationBuilder {
    fn new() -> Self {
        Self {
            config_manager: None,
        }
    }

    pub fn with_config_manager(mut self, config_manager: ConfigManager) -> Self {
        self.config_manager = Some(config_manager);
        self
    }

    pub fn build(self) -> Result<Application> {
        let config_manager = self
            .config_manager
            .ok_or_else(|| anyhow::anyhow!("Configuration manager is required"))?;

        Ok(Application {
            coordinator: SystemCoordinator::new(),
            config_manager,
        })
    }
}
