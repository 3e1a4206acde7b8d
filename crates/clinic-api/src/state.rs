use crate::config::Config;
use clinic_engine::{MockBackend, StreamDriver};
use std::sync::Arc;

/// Shared application state passed to all handlers
///
/// The driver keeps no per-stream state, so one instance serves every request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub driver: Arc<StreamDriver>,
}

impl AppState {
    pub fn new(config: Config, driver: StreamDriver) -> Self {
        Self {
            config: Arc::new(config),
            driver: Arc::new(driver),
        }
    }

    /// State backed by the fixed-content backend, configured from `[chat]`
    /// and `[stream]`.
    pub fn with_mock_backend(config: Config) -> anyhow::Result<Self> {
        let backend = MockBackend::new()
            .with_triggers(config.chat.tool_triggers.iter().cloned())
            .with_tool(config.chat.default_tool);

        let driver = StreamDriver::builder()
            .backend(Arc::new(backend))
            .config(config.stream_config())
            .build()?;

        Ok(Self::new(config, driver))
    }
}
