//! Optional IRC commands module

use async_trait::async_trait;
use ferrircd_core::{CommandHandler, Module, Result};
use std::sync::Arc;

mod userip;
mod wallchops;

pub use userip::Userip;
pub use wallchops::Wallchops;

/// Optional IRC commands module
pub struct OptionalModule {
    name: String,
    version: String,
    description: String,
}

impl OptionalModule {
    pub fn new() -> Self {
        Self {
            name: "optional".to_string(),
            version: "1.0.0".to_string(),
            description: "Optional IRC commands (WALLCHOPS, USERIP)".to_string(),
        }
    }
}

impl Default for OptionalModule {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Module for OptionalModule {
    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> &str {
        &self.version
    }

    fn description(&self) -> &str {
        &self.description
    }

    async fn init(&mut self) -> Result<()> {
        tracing::info!("Initializing optional commands module");
        Ok(())
    }

    async fn cleanup(&mut self) -> Result<()> {
        tracing::info!("Cleaning up optional commands module");
        Ok(())
    }

    fn commands(&self) -> Vec<Arc<dyn CommandHandler>> {
        vec![Arc::new(Wallchops), Arc::new(Userip)]
    }
}
