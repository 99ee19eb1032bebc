//! ferrircd core
//!
//! Shared model and plumbing for the IRC daemon: the membership registry,
//! channels with per-aspect guards, the privilege model, the routing
//! engine used by message commands, and the command dispatch table that
//! protocol modules register into.

pub mod audit;
pub mod channel;
pub mod config;
pub mod connection;
pub mod error;
pub mod message;
pub mod module;
pub mod numeric;
pub mod privilege;
pub mod registry;
pub mod routing;
pub mod server;
pub mod statistics;
pub mod user;
pub mod utils;

#[cfg(test)]
mod tests;

pub use audit::{AuditEvent, AuditEventType, AuditLogger};
pub use channel::{valid_channel_name, Ban, Channel, Topic};
pub use config::{Config, IoMode, LimitsConfig, OperatorConfig, PasswordHasher};
pub use connection::{Connection, LineOutcome};
pub use error::{Error, Result};
pub use message::{CommandLine, Message, MessageType, Prefix};
pub use module::{CommandHandler, CommandTable, Module, ModuleContext, ModuleManager, ModuleResult};
pub use numeric::NumericReply;
pub use privilege::ChannelRank;
pub use registry::{JoinOutcome, Registry};
pub use routing::{CannotSend, RouteSummary, Router};
pub use server::Server;
pub use statistics::{CommandStats, StatisticsManager};
pub use user::{Outbound, ServerFlags, User};

/// Re-exports for convenience
pub use async_trait::async_trait;
pub use serde::{Deserialize, Serialize};
pub use tracing::{debug, error, info, warn};
