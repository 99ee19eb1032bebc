//! Connected users
//!
//! A [`User`] is created by the connection layer once registration
//! completes and shared as `Arc<User>` with the registry and every channel
//! the user joins. Mutable state sits behind small per-field locks so a
//! handler on one connection can inspect or update another user directly.

use crate::message::{Message, Prefix};
use crate::privilege::ChannelRank;
use crate::utils::string::irc_key;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;
use uuid::Uuid;

/// Items queued for a connection's writer task
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    /// A protocol line without its CRLF terminator
    Line(String),
    /// Flush what is queued and close the socket
    Close(String),
}

/// Server-wide privilege flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServerFlags {
    /// Server administrator
    pub admin: bool,
    /// IRC operator
    pub operator: bool,
    /// Network service
    pub service: bool,
}

/// A user's standing in one channel
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelMembership {
    /// Channel name with its original casing
    pub name: String,
    /// Ranks held in the channel
    pub ranks: BTreeSet<ChannelRank>,
}

/// User information and state
pub struct User {
    /// Unique user ID
    pub id: Uuid,
    nick: String,
    ident: String,
    hostname: String,
    ip_address: String,
    realname: String,
    signon: DateTime<Utc>,
    last_activity: RwLock<DateTime<Utc>>,
    flags: RwLock<ServerFlags>,
    modes: RwLock<BTreeSet<char>>,
    /// Keyed by normalized channel name
    channels: RwLock<HashMap<String, ChannelMembership>>,
    sender: mpsc::UnboundedSender<Outbound>,
    lines_sent: AtomicU64,
    bytes_sent: AtomicU64,
}

impl User {
    /// Create a new user whose outbound lines go to `sender`
    pub fn new(
        nick: impl Into<String>,
        ident: impl Into<String>,
        hostname: impl Into<String>,
        ip_address: impl Into<String>,
        realname: impl Into<String>,
        sender: mpsc::UnboundedSender<Outbound>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            nick: nick.into(),
            ident: ident.into(),
            hostname: hostname.into(),
            ip_address: ip_address.into(),
            realname: realname.into(),
            signon: now,
            last_activity: RwLock::new(now),
            flags: RwLock::new(ServerFlags::default()),
            modes: RwLock::new(BTreeSet::new()),
            channels: RwLock::new(HashMap::new()),
            sender,
            lines_sent: AtomicU64::new(0),
            bytes_sent: AtomicU64::new(0),
        }
    }

    pub fn nick(&self) -> &str {
        &self.nick
    }

    pub fn ident(&self) -> &str {
        &self.ident
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn ip_address(&self) -> &str {
        &self.ip_address
    }

    pub fn realname(&self) -> &str {
        &self.realname
    }

    /// `nick!ident@host`
    pub fn mask(&self) -> String {
        format!("{}!{}@{}", self.nick, self.ident, self.hostname)
    }

    /// Get user prefix for messages
    pub fn prefix(&self) -> Prefix {
        Prefix::User {
            nick: self.nick.clone(),
            ident: self.ident.clone(),
            host: self.hostname.clone(),
        }
    }

    /// Case-insensitive nickname comparison
    pub fn nick_matches(&self, nick: &str) -> bool {
        self.nick.eq_ignore_ascii_case(nick)
    }

    pub fn signon(&self) -> DateTime<Utc> {
        self.signon
    }

    /// Record activity from the client
    pub fn touch(&self) {
        *self.last_activity.write() = Utc::now();
    }

    pub fn last_activity(&self) -> DateTime<Utc> {
        *self.last_activity.read()
    }

    /// Seconds since the last client activity
    pub fn idle_seconds(&self) -> i64 {
        (Utc::now() - self.last_activity()).num_seconds().max(0)
    }

    pub fn flags(&self) -> ServerFlags {
        *self.flags.read()
    }

    pub fn is_admin(&self) -> bool {
        self.flags.read().admin
    }

    pub fn is_operator(&self) -> bool {
        self.flags.read().operator
    }

    pub fn is_service(&self) -> bool {
        self.flags.read().service
    }

    pub fn set_admin(&self, value: bool) {
        self.flags.write().admin = value;
    }

    pub fn set_operator(&self, value: bool) {
        self.flags.write().operator = value;
    }

    pub fn set_service(&self, value: bool) {
        self.flags.write().service = value;
    }

    /// Check if user has a specific user mode
    pub fn has_umode(&self, mode: char) -> bool {
        self.modes.read().contains(&mode)
    }

    pub fn add_umode(&self, mode: char) -> bool {
        self.modes.write().insert(mode)
    }

    /// User modes as a `+abc` string, empty when none are set
    pub fn umodes_string(&self) -> String {
        let modes = self.modes.read();
        if modes.is_empty() {
            String::new()
        } else {
            std::iter::once('+').chain(modes.iter().copied()).collect()
        }
    }

    /// Whether the user's own channel list contains `channel`
    pub fn on_channel(&self, channel: &str) -> bool {
        self.channels.read().contains_key(&irc_key(channel))
    }

    /// Record membership of `channel`; existing ranks are kept
    pub fn add_channel(&self, channel: &str) {
        self.channels
            .write()
            .entry(irc_key(channel))
            .or_insert_with(|| ChannelMembership {
                name: channel.to_string(),
                ranks: BTreeSet::new(),
            });
    }

    /// Forget `channel` and every rank held in it
    pub fn remove_channel(&self, channel: &str) -> bool {
        self.channels.write().remove(&irc_key(channel)).is_some()
    }

    /// Display names of every channel the user is on
    pub fn channel_names(&self) -> Vec<String> {
        self.channels.read().values().map(|m| m.name.clone()).collect()
    }

    /// Grant a rank; ignored when the user is not on the channel
    pub fn add_channel_rank(&self, channel: &str, rank: ChannelRank) -> bool {
        match self.channels.write().get_mut(&irc_key(channel)) {
            Some(membership) => membership.ranks.insert(rank),
            None => false,
        }
    }

    /// Ranks held on `channel`, `None` when not a member
    pub fn channel_ranks(&self, channel: &str) -> Option<BTreeSet<ChannelRank>> {
        self.channels
            .read()
            .get(&irc_key(channel))
            .map(|membership| membership.ranks.clone())
    }

    /// Queue a message for delivery. Never blocks; a closed connection drops it.
    pub fn send(&self, message: &Message) {
        self.send_line(message.to_string());
    }

    /// Queue a preformatted protocol line
    pub fn send_line(&self, line: String) {
        let len = line.len() as u64 + 2;
        if self.sender.send(Outbound::Line(line)).is_ok() {
            self.lines_sent.fetch_add(1, Ordering::Relaxed);
            self.bytes_sent.fetch_add(len, Ordering::Relaxed);
        } else {
            tracing::debug!("Dropping line for disconnected user {}", self.nick);
        }
    }

    /// Ask the writer task to close the connection
    pub fn close(&self, reason: &str) {
        let _ = self.sender.send(Outbound::Close(reason.to_string()));
    }

    /// Lines queued to this user so far
    pub fn lines_sent(&self) -> u64 {
        self.lines_sent.load(Ordering::Relaxed)
    }

    /// Bytes queued to this user so far, CRLF included
    pub fn bytes_sent(&self) -> u64 {
        self.bytes_sent.load(Ordering::Relaxed)
    }
}

impl PartialEq for User {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for User {}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("nick", &self.nick)
            .field("ident", &self.ident)
            .field("hostname", &self.hostname)
            .field("flags", &self.flags())
            .finish()
    }
}
