//! IRC message parsing and formatting
//!
//! Inbound lines are only split into prefix, command and the raw argument
//! remainder; each command handler tokenizes its own arguments. Outbound
//! lines are built as [`Message`] values and rendered with `Display`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// IRC message prefix (server or user)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Prefix {
    /// Server name
    Server(String),
    /// User prefix (nick!ident@host)
    User {
        nick: String,
        ident: String,
        host: String,
    },
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prefix::Server(name) => write!(f, "{}", name),
            Prefix::User { nick, ident, host } => write!(f, "{}!{}@{}", nick, ident, host),
        }
    }
}

/// IRC message types
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageType {
    // Connection registration
    Nick,
    User,
    Oper,
    Quit,

    // Channel operations
    Join,
    Part,
    Kick,

    // Messaging
    PrivMsg,
    Notice,
    Wallchops,

    // Queries
    Stats,
    Userip,

    // Miscellaneous
    Kill,
    Ping,
    Pong,
    Error,

    /// Three digit numeric reply
    Numeric(u16),

    // Custom/unknown
    Custom(String),
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MessageType::Nick => "NICK",
            MessageType::User => "USER",
            MessageType::Oper => "OPER",
            MessageType::Quit => "QUIT",
            MessageType::Join => "JOIN",
            MessageType::Part => "PART",
            MessageType::Kick => "KICK",
            MessageType::PrivMsg => "PRIVMSG",
            MessageType::Notice => "NOTICE",
            MessageType::Wallchops => "WALLCHOPS",
            MessageType::Stats => "STATS",
            MessageType::Userip => "USERIP",
            MessageType::Kill => "KILL",
            MessageType::Ping => "PING",
            MessageType::Pong => "PONG",
            MessageType::Error => "ERROR",
            MessageType::Numeric(code) => return write!(f, "{:03}", code),
            MessageType::Custom(cmd) => cmd,
        };
        write!(f, "{}", s)
    }
}

impl From<&str> for MessageType {
    fn from(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "NICK" => MessageType::Nick,
            "USER" => MessageType::User,
            "OPER" => MessageType::Oper,
            "QUIT" => MessageType::Quit,
            "JOIN" => MessageType::Join,
            "PART" => MessageType::Part,
            "KICK" => MessageType::Kick,
            "PRIVMSG" => MessageType::PrivMsg,
            "NOTICE" => MessageType::Notice,
            "WALLCHOPS" => MessageType::Wallchops,
            "STATS" => MessageType::Stats,
            "USERIP" => MessageType::Userip,
            "KILL" => MessageType::Kill,
            "PING" => MessageType::Ping,
            "PONG" => MessageType::Pong,
            "ERROR" => MessageType::Error,
            other => MessageType::Custom(other.to_string()),
        }
    }
}

/// Outbound IRC message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Optional prefix (server or user)
    pub prefix: Option<Prefix>,
    /// Message command/type
    pub command: MessageType,
    /// Middle parameters
    pub params: Vec<String>,
    /// Trailing parameter, always written after a ':'
    pub trailing: Option<String>,
}

impl Message {
    /// Create a new message
    pub fn new(command: MessageType, params: Vec<String>) -> Self {
        Self {
            prefix: None,
            command,
            params,
            trailing: None,
        }
    }

    /// Create a new message with prefix
    pub fn with_prefix(prefix: Prefix, command: MessageType, params: Vec<String>) -> Self {
        Self {
            prefix: Some(prefix),
            command,
            params,
            trailing: None,
        }
    }

    /// Attach a trailing parameter
    pub fn trailing(mut self, text: impl Into<String>) -> Self {
        self.trailing = Some(text.into());
        self
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref prefix) = self.prefix {
            write!(f, ":{} ", prefix)?;
        }
        write!(f, "{}", self.command)?;
        for param in &self.params {
            write!(f, " {}", param)?;
        }
        if let Some(ref trailing) = self.trailing {
            write!(f, " :{}", trailing)?;
        }
        Ok(())
    }
}

/// A tokenized inbound line: `[:prefix] COMMAND [args...]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    /// Client supplied prefix, ignored by the server
    pub prefix: Option<String>,
    /// Command word, uppercased
    pub command: String,
    /// Everything after the command word, leading spaces removed
    pub args: String,
}

impl CommandLine {
    /// Parse an inbound line
    pub fn parse(input: &str) -> crate::Result<Self> {
        let mut rest = input.trim_matches(|c| c == '\r' || c == '\n').trim_start();

        let prefix = match rest.strip_prefix(':') {
            Some(stripped) => {
                let end = stripped.find(' ').unwrap_or(stripped.len());
                let prefix = stripped[..end].to_string();
                rest = stripped[end..].trim_start();
                Some(prefix)
            }
            None => None,
        };

        let end = rest.find(' ').unwrap_or(rest.len());
        let command = &rest[..end];
        if command.is_empty() {
            return Err(crate::Error::MessageParse("No command found".to_string()));
        }

        Ok(CommandLine {
            prefix,
            command: command.to_ascii_uppercase(),
            args: rest[end..].trim_start().to_string(),
        })
    }

    /// Command as a message type
    pub fn message_type(&self) -> MessageType {
        MessageType::from(self.command.as_str())
    }
}
