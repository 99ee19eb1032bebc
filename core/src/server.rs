//! Main server implementation

use crate::connection;
use crate::module::{CommandTable, Module, ModuleContext, ModuleManager};
use crate::{Config, Result};
use std::sync::Arc;
use tokio::net::TcpListener;

/// Main IRC server
pub struct Server {
    context: Arc<ModuleContext>,
    commands: Arc<CommandTable>,
    modules: ModuleManager,
}

impl Server {
    /// Create a new server instance
    pub fn new(config: Config) -> Self {
        Self {
            context: Arc::new(ModuleContext::new(config)),
            commands: Arc::new(CommandTable::new()),
            modules: ModuleManager::new(),
        }
    }

    /// Shared state handed to command handlers
    pub fn context(&self) -> &Arc<ModuleContext> {
        &self.context
    }

    /// The dispatch table
    pub fn commands(&self) -> &Arc<CommandTable> {
        &self.commands
    }

    pub fn modules(&self) -> &ModuleManager {
        &self.modules
    }

    /// Load a module and register its commands
    pub async fn load_module(&mut self, module: Box<dyn Module>) -> Result<()> {
        self.modules.load_module(module, &self.commands).await
    }

    /// Unload a module and unregister its commands
    pub async fn unload_module(&mut self, name: &str) -> Result<()> {
        self.modules.unload_module(name, &self.commands).await
    }

    /// Bind every configured port and accept clients until ctrl-c
    pub async fn start(&self) -> Result<()> {
        let config = &self.context.config;
        tracing::info!("Starting IRC server {} with {} configured ports",
                      config.server.name, config.connection.ports.len());

        for port in &config.connection.ports {
            self.start_port_listener(*port).await?;
        }

        tokio::signal::ctrl_c().await?;
        tracing::info!("Shutting down");
        Ok(())
    }

    /// Start a listener for a specific port
    async fn start_port_listener(&self, port: u16) -> Result<()> {
        let listener = TcpListener::bind(
            format!("{}:{}", self.context.config.connection.bind_address, port)
        ).await?;
        tracing::info!("Listening on port {}", port);

        let context = self.context.clone();
        let commands = self.commands.clone();
        tokio::spawn(async move {
            loop {
                match listener.accept().await {
                    Ok((stream, addr)) => {
                        tracing::debug!("Accepted connection from {}", addr);
                        tokio::spawn(connection::serve(context.clone(), commands.clone(), stream, addr));
                    }
                    Err(e) => {
                        tracing::error!("Error accepting connection on port {}: {}", port, e);
                    }
                }
            }
        });

        Ok(())
    }
}
