//! Module system and command dispatch
//!
//! Every client command beyond connection registration is served by a
//! [`CommandHandler`] registered in the [`CommandTable`] under its command
//! name. Modules bundle handlers so they can be loaded and unloaded as a
//! group at runtime.

use crate::audit::AuditLogger;
use crate::config::{Config, LimitsConfig};
use crate::message::{CommandLine, Message, MessageType, Prefix};
use crate::registry::Registry;
use crate::statistics::StatisticsManager;
use crate::user::User;
use crate::{Error, Result};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Shared state handed to every command handler
#[derive(Debug, Clone)]
pub struct ModuleContext {
    pub config: Arc<Config>,
    pub registry: Arc<Registry>,
    pub statistics: Arc<StatisticsManager>,
    pub audit: AuditLogger,
}

impl ModuleContext {
    /// Create a context with an empty registry
    pub fn new(config: Config) -> Self {
        let audit = AuditLogger::new(config.logging.audit);
        Self {
            config: Arc::new(config),
            registry: Arc::new(Registry::new()),
            statistics: Arc::new(StatisticsManager::new()),
            audit,
        }
    }

    pub fn server_name(&self) -> &str {
        &self.config.server.name
    }

    pub fn limits(&self) -> &LimitsConfig {
        &self.config.limits
    }

    /// `:server NOTICE nick :text`
    pub fn server_notice(&self, nick: &str, text: &str) -> Message {
        Message::with_prefix(
            Prefix::Server(self.server_name().to_string()),
            MessageType::Notice,
            vec![nick.to_string()],
        )
        .trailing(text)
    }

    /// Terminate a user's connection.
    ///
    /// The user leaves every channel and the registry immediately; with
    /// `quit_broadcast` their channel peers also see a QUIT carrying `reason`.
    pub fn close(&self, user: &User, reason: &str, quit_broadcast: bool) {
        self.registry
            .disconnect(user, quit_broadcast.then_some(reason));
        user.close(reason);
    }
}

/// Handler for one client command
#[async_trait]
pub trait CommandHandler: Send + Sync {
    /// Command name, uppercase
    fn name(&self) -> &str;

    /// Handle the command. `args` is everything after the command word.
    async fn handle(&self, ctx: &ModuleContext, user: &Arc<User>, args: &str) -> Result<()>;
}

/// Result of command dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleResult {
    /// A handler ran
    Handled,
    /// No handler is registered for the command
    NotHandled,
}

/// Process-wide mapping from command name to handler
#[derive(Default)]
pub struct CommandTable {
    handlers: RwLock<HashMap<String, Arc<dyn CommandHandler>>>,
}

impl CommandTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler under its name, returning any handler it replaces
    pub fn register(&self, handler: Arc<dyn CommandHandler>) -> Option<Arc<dyn CommandHandler>> {
        let name = handler.name().to_ascii_uppercase();
        tracing::debug!("Registering command {}", name);
        self.handlers.write().insert(name, handler)
    }

    /// Remove the handler for `name`
    pub fn unregister(&self, name: &str) -> Option<Arc<dyn CommandHandler>> {
        tracing::debug!("Unregistering command {}", name);
        self.handlers.write().remove(&name.to_ascii_uppercase())
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn CommandHandler>> {
        self.handlers.read().get(&name.to_ascii_uppercase()).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.read().contains_key(&name.to_ascii_uppercase())
    }

    /// Registered command names, sorted
    pub fn commands(&self) -> Vec<String> {
        let mut names: Vec<String> = self.handlers.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Run the handler registered for `line.command`
    pub async fn dispatch(&self, ctx: &ModuleContext, user: &Arc<User>, line: &CommandLine) -> Result<ModuleResult> {
        // Clone out of the guard; handlers may register or unregister commands
        let Some(handler) = self.get(&line.command) else {
            return Ok(ModuleResult::NotHandled);
        };

        handler.handle(ctx, user, &line.args).await?;
        Ok(ModuleResult::Handled)
    }
}

/// Module trait that all modules must implement
#[async_trait]
pub trait Module: Send + Sync {
    /// Module name
    fn name(&self) -> &str;

    /// Module version
    fn version(&self) -> &str;

    /// Module description
    fn description(&self) -> &str;

    /// Initialize the module
    async fn init(&mut self) -> Result<()> {
        Ok(())
    }

    /// Cleanup the module
    async fn cleanup(&mut self) -> Result<()> {
        Ok(())
    }

    /// Command handlers provided by the module
    fn commands(&self) -> Vec<Arc<dyn CommandHandler>>;
}

/// Module manager for loading and managing modules
pub struct ModuleManager {
    modules: HashMap<String, Box<dyn Module>>,
    /// Command name to owning module
    owners: HashMap<String, String>,
}

impl ModuleManager {
    /// Create a new module manager
    pub fn new() -> Self {
        Self {
            modules: HashMap::new(),
            owners: HashMap::new(),
        }
    }

    /// Load a module and register its commands
    pub async fn load_module(&mut self, mut module: Box<dyn Module>, table: &CommandTable) -> Result<()> {
        let name = module.name().to_string();
        if self.modules.contains_key(&name) {
            return Err(Error::Module(format!("Module {} is already loaded", name)));
        }

        let handlers = module.commands();
        for handler in &handlers {
            let command = handler.name().to_ascii_uppercase();
            if let Some(owner) = self.owners.get(&command) {
                return Err(Error::Module(format!(
                    "Command {} of module {} is already provided by {}",
                    command, name, owner
                )));
            }
        }

        module.init().await?;

        for handler in handlers {
            self.owners.insert(handler.name().to_ascii_uppercase(), name.clone());
            table.register(handler);
        }

        tracing::info!("Loaded module {} v{}", name, module.version());
        self.modules.insert(name, module);
        Ok(())
    }

    /// Unload a module and unregister its commands
    pub async fn unload_module(&mut self, name: &str, table: &CommandTable) -> Result<()> {
        let Some(mut module) = self.modules.remove(name) else {
            return Err(Error::Module(format!("Module {} is not loaded", name)));
        };

        self.owners.retain(|command, owner| {
            if owner == name {
                table.unregister(command);
                false
            } else {
                true
            }
        });

        module.cleanup().await?;
        tracing::info!("Unloaded module {}", name);
        Ok(())
    }

    /// Get a module by name
    pub fn get_module(&self, name: &str) -> Option<&dyn Module> {
        self.modules.get(name).map(|m| m.as_ref())
    }

    /// Names of all loaded modules, sorted
    pub fn loaded_modules(&self) -> Vec<String> {
        let mut names: Vec<String> = self.modules.keys().cloned().collect();
        names.sort();
        names
    }
}

impl Default for ModuleManager {
    fn default() -> Self {
        Self::new()
    }
}
