//! Standard IRC commands module
//!
//! Channel membership, messaging and operator commands every client expects.

use async_trait::async_trait;
use ferrircd_core::{CommandHandler, Module, Result};
use std::sync::Arc;

mod join;
mod kick;
mod kill;
mod notice;
mod oper;
mod part;
mod privmsg;
mod stats;

pub use join::Join;
pub use kick::Kick;
pub use kill::Kill;
pub use notice::Notice;
pub use oper::Oper;
pub use part::Part;
pub use privmsg::Privmsg;
pub use stats::Stats;

/// Standard IRC commands module
pub struct StandardModule {
    name: String,
    version: String,
    description: String,
}

impl StandardModule {
    pub fn new() -> Self {
        Self {
            name: "standard".to_string(),
            version: "1.0.0".to_string(),
            description: "Standard IRC commands (JOIN, PART, PRIVMSG, NOTICE, KICK, KILL, OPER, STATS)".to_string(),
        }
    }
}

impl Default for StandardModule {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Module for StandardModule {
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
        tracing::info!("Initializing standard commands module");
        Ok(())
    }

    async fn cleanup(&mut self) -> Result<()> {
        tracing::info!("Cleaning up standard commands module");
        Ok(())
    }

    fn commands(&self) -> Vec<Arc<dyn CommandHandler>> {
        vec![
            Arc::new(Join),
            Arc::new(Part),
            Arc::new(Privmsg),
            Arc::new(Notice),
            Arc::new(Kick),
            Arc::new(Kill),
            Arc::new(Oper),
            Arc::new(Stats),
        ]
    }
}
