use std::sync::Arc;
use anyhow::{Result, anyhow};

use clinic_types::StreamConfig;

use crate::backend::ReasoningBackend;
use crate::driver::StreamDriver;

/// Builder for constructing a StreamDriver
pub struct DriverBuilder {
    backend: Option<Arc<dyn ReasoningBackend>>,
    config: StreamConfig,
}

impl DriverBuilder {
    pub fn new() -> Self {
        Self {
            backend: None,
            config: StreamConfig::default(),
        }
    }
    
    /// Set the reasoning backend
    pub fn backend(mut self, backend: Arc<dyn ReasoningBackend>) -> Self {
        self.backend = Some(backend);
        self
    }
    
    /// Set pacing and buffering
    pub fn config(mut self, config: StreamConfig) -> Self {
        self.config = config;
        self
    }
    
    /// Build the StreamDriver
    pub fn build(self) -> Result<StreamDriver> {
        let backend = self.backend
            .ok_or_else(|| anyhow!("Reasoning backend is required"))?;
        
        Ok(StreamDriver::new(backend, self.config))
    }
}

impl Default for DriverBuilder {
    fn default() -> Self {
        Self::new()
    }
}
