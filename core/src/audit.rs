//! Audit logging for privileged actions
//!
//! Events are serialized to JSON and written through `tracing` under the
//! `audit` target, so they can be routed separately by the subscriber.

use serde::{Deserialize, Serialize};

/// Audit event types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventType {
    /// A user was killed
    Kill,
    /// A KILL against a protected user was refused
    KillDenied,
    /// A user was kicked from a channel
    Kick,
    /// A KICK against a protected user was refused
    KickDenied,
    /// OPER succeeded
    OperAuth,
    /// OPER failed
    OperAuthFailure,
}

impl std::fmt::Display for AuditEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Kill => write!(f, "kill"),
            Self::KillDenied => write!(f, "kill_denied"),
            Self::Kick => write!(f, "kick"),
            Self::KickDenied => write!(f, "kick_denied"),
            Self::OperAuth => write!(f, "oper_auth"),
            Self::OperAuthFailure => write!(f, "oper_auth_failure"),
        }
    }
}

/// Audit event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Event type
    pub event_type: AuditEventType,

    /// Event timestamp
    pub timestamp: chrono::DateTime<chrono::Utc>,

    /// Acting user (`nick!ident@host`)
    pub actor: String,

    /// Target of the action
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,

    /// Channel the action happened on
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,

    /// Reason or additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl AuditEvent {
    /// Create a new audit event
    pub fn new(event_type: AuditEventType, actor: impl Into<String>) -> Self {
        Self {
            event_type,
            timestamp: chrono::Utc::now(),
            actor: actor.into(),
            target: None,
            channel: None,
            reason: None,
        }
    }

    /// Set target
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Set channel
    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = Some(channel.into());
        self
    }

    /// Set reason
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Refusals are logged as warnings
    pub fn is_denial(&self) -> bool {
        matches!(
            self.event_type,
            AuditEventType::KillDenied | AuditEventType::KickDenied | AuditEventType::OperAuthFailure
        )
    }

    /// JSON form of the event
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Fire-and-forget audit sink
#[derive(Debug, Clone)]
pub struct AuditLogger {
    enabled: bool,
}

impl AuditLogger {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Write an event; serialization failures are logged and dropped
    pub fn write(&self, event: &AuditEvent) {
        if !self.enabled {
            return;
        }

        let json = match event.to_json() {
            Ok(json) => json,
            Err(e) => {
                tracing::error!("Failed to serialize audit event {}: {}", event.event_type, e);
                return;
            }
        };

        if event.is_denial() {
            tracing::warn!(target: "audit", event = %event.event_type, "{}", json);
        } else {
            tracing::info!(target: "audit", event = %event.event_type, "{}", json);
        }
    }
}

impl Default for AuditLogger {
    fn default() -> Self {
        Self::new(true)
    }
}
