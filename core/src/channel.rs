//! Channels and their per-aspect state
//!
//! Each aspect of a channel (bans, modes, topic, membership) sits behind
//! its own guard, so a PRIVMSG reading the mode set never waits on a JOIN
//! updating the member list. There is no lock spanning several aspects;
//! callers that need a cross-aspect decision (see
//! [`Registry::destroy_if_empty`](crate::registry::Registry::destroy_if_empty))
//! take the guards in the order membership, then modes.

use crate::user::User;
use crate::utils::string::{irc_key, matches_mask};
use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use parking_lot::{Mutex, MutexGuard};
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Every mode letter a channel may carry
pub const CHANNEL_MODES: &str = "abfhiklmnoprstvz";

/// Modes set on a freshly created channel
pub const DEFAULT_MODES: &[char] = &['n', 't'];

lazy_static! {
    static ref CHANNEL_NAME: Regex = Regex::new(r"^#[A-Za-z0-9_-]*$").expect("valid channel name pattern");
}

/// Check if a string is a valid channel name
pub fn valid_channel_name(name: &str) -> bool {
    CHANNEL_NAME.is_match(name)
}

/// A ban entry. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ban {
    /// `nick!ident@host` of whoever set the ban
    pub creator: String,
    /// Mask pattern
    pub mask: String,
    /// Free-text reason
    pub reason: String,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct ModeState {
    modes: BTreeSet<char>,
    key: Option<String>,
    limit: Option<usize>,
    registered: bool,
}

#[derive(Debug, Default)]
struct TopicState {
    text: String,
    author: String,
    set_at: Option<DateTime<Utc>>,
}

/// Snapshot of a channel topic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topic {
    pub text: String,
    /// `nick!ident@host` of the setter
    pub author: String,
    pub set_at: Option<DateTime<Utc>>,
}

/// Member lists of a channel; the two lists never share a user
#[derive(Debug, Default)]
pub struct Membership {
    users: Vec<Arc<User>>,
    invisible: Vec<Arc<User>>,
}

impl Membership {
    /// No visible and no invisible members
    pub fn is_empty(&self) -> bool {
        self.users.is_empty() && self.invisible.is_empty()
    }

    /// Visible member count
    pub fn visible_count(&self) -> usize {
        self.users.len()
    }

    /// Add a visible member, moving them out of the invisible list if present
    pub fn add_visible(&mut self, user: Arc<User>) {
        self.remove_everywhere(&user);
        self.users.push(user);
    }

    fn remove_everywhere(&mut self, user: &User) {
        self.users.retain(|u| u.id != user.id);
        self.invisible.retain(|u| u.id != user.id);
    }
}

/// IRC channel
#[derive(Debug)]
pub struct Channel {
    name: String,
    key: String,
    founder: Option<String>,
    created_at: DateTime<Utc>,
    bans: Mutex<Vec<Ban>>,
    modes: Mutex<ModeState>,
    topic: Mutex<TopicState>,
    members: Mutex<Membership>,
}

impl Channel {
    /// Create a new channel with the default modes
    pub fn new(name: impl Into<String>, founder: Option<&User>) -> Self {
        let name = name.into();
        let modes = ModeState {
            modes: DEFAULT_MODES.iter().copied().collect(),
            ..ModeState::default()
        };
        Self {
            key: irc_key(&name),
            name,
            founder: founder.map(|user| user.nick().to_string()),
            created_at: Utc::now(),
            bans: Mutex::new(Vec::new()),
            modes: Mutex::new(modes),
            topic: Mutex::new(TopicState::default()),
            members: Mutex::new(Membership::default()),
        }
    }

    /// Channel name with its original casing
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Normalized lookup key
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Nickname of the user that created the channel
    pub fn founder(&self) -> Option<&str> {
        self.founder.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    // Bans

    /// Append a ban; duplicates are allowed
    pub fn add_ban(&self, creator: &str, mask: &str, reason: &str) {
        self.bans.lock().push(Ban {
            creator: creator.to_string(),
            mask: mask.to_string(),
            reason: reason.to_string(),
            created_at: Utc::now(),
        });
    }

    /// Remove every ban whose mask is exactly `mask`
    pub fn remove_ban(&self, mask: &str) {
        self.bans.lock().retain(|ban| ban.mask != mask);
    }

    pub fn bans(&self) -> Vec<Ban> {
        self.bans.lock().clone()
    }

    /// Whether any ban mask matches the user's `nick!ident@host`
    pub fn is_banned(&self, user: &User) -> bool {
        let mask = user.mask();
        self.bans.lock().iter().any(|ban| matches_mask(&ban.mask, &mask))
    }

    // Modes

    /// Set a mode flag. Returns true if it was not already set.
    ///
    /// `k` and `l` carry a parameter and are only set through
    /// [`set_key`](Self::set_key) and [`set_limit`](Self::set_limit).
    pub fn add_mode(&self, mode: char) -> bool {
        if !CHANNEL_MODES.contains(mode) || mode == 'k' || mode == 'l' {
            return false;
        }
        self.modes.lock().modes.insert(mode)
    }

    /// Clear a mode flag, dropping the key or limit along with `k` or `l`
    pub fn remove_mode(&self, mode: char) -> bool {
        let mut state = self.modes.lock();
        match mode {
            'k' => state.key = None,
            'l' => state.limit = None,
            _ => {}
        }
        state.modes.remove(&mode)
    }

    pub fn clear_modes(&self) {
        let mut state = self.modes.lock();
        state.modes.clear();
        state.key = None;
        state.limit = None;
    }

    pub fn has_mode(&self, mode: char) -> bool {
        self.modes.lock().modes.contains(&mode)
    }

    /// Mode letters as `+nt`
    pub fn modes_string(&self) -> String {
        let state = self.modes.lock();
        std::iter::once('+').chain(state.modes.iter().copied()).collect()
    }

    /// Set or clear the channel key together with mode `k`
    pub fn set_key(&self, key: Option<&str>) {
        let mut state = self.modes.lock();
        match key {
            Some(key) => {
                state.key = Some(key.to_string());
                state.modes.insert('k');
            }
            None => {
                state.key = None;
                state.modes.remove(&'k');
            }
        }
    }

    pub fn channel_key(&self) -> Option<String> {
        self.modes.lock().key.clone()
    }

    /// Set or clear the member limit together with mode `l`
    pub fn set_limit(&self, limit: Option<usize>) {
        let mut state = self.modes.lock();
        match limit {
            Some(limit) => {
                state.limit = Some(limit);
                state.modes.insert('l');
            }
            None => {
                state.limit = None;
                state.modes.remove(&'l');
            }
        }
    }

    pub fn limit(&self) -> Option<usize> {
        self.modes.lock().limit
    }

    /// Registered channels survive having no members
    pub fn set_registered(&self, registered: bool) {
        let mut state = self.modes.lock();
        state.registered = registered;
        if registered {
            state.modes.insert('r');
        } else {
            state.modes.remove(&'r');
        }
    }

    pub fn is_registered(&self) -> bool {
        self.modes.lock().registered
    }

    // Topic

    /// Set the topic, recording `nick!ident@host` of the setter and the time
    pub fn set_topic(&self, user: &User, text: &str) {
        let mut topic = self.topic.lock();
        topic.text = text.to_string();
        topic.author = user.mask();
        topic.set_at = Some(Utc::now());
    }

    pub fn clear_topic(&self) {
        let mut topic = self.topic.lock();
        topic.text.clear();
        topic.author.clear();
        topic.set_at = None;
    }

    pub fn topic(&self) -> Topic {
        let topic = self.topic.lock();
        Topic {
            text: topic.text.clone(),
            author: topic.author.clone(),
            set_at: topic.set_at,
        }
    }

    // Membership

    /// Case-insensitive test over the visible member list
    pub fn nick_in_channel(&self, nick: &str) -> bool {
        self.members.lock().users.iter().any(|u| u.nick_matches(nick))
    }

    /// Case-insensitive test over the invisible member list
    pub fn invisible_nick_in_channel(&self, nick: &str) -> bool {
        self.members.lock().invisible.iter().any(|u| u.nick_matches(nick))
    }

    /// Add a visible member, moving them out of the invisible list if present
    pub fn add_user(&self, user: Arc<User>) {
        self.members.lock().add_visible(user);
    }

    pub fn remove_user(&self, user: &User) {
        self.members.lock().users.retain(|u| u.id != user.id);
    }

    /// Add an invisible member, moving them out of the visible list if present
    pub fn add_invisible_user(&self, user: Arc<User>) {
        let mut members = self.members.lock();
        members.remove_everywhere(&user);
        members.invisible.push(user);
    }

    pub fn remove_invisible_user(&self, user: &User) {
        self.members.lock().invisible.retain(|u| u.id != user.id);
    }

    /// Remove `user` from both member lists
    pub fn remove_member(&self, user: &User) {
        self.members.lock().remove_everywhere(user);
    }

    /// Point-in-time snapshot of the visible members
    pub fn members(&self) -> Vec<Arc<User>> {
        self.members.lock().users.clone()
    }

    /// Point-in-time snapshot of the invisible members
    pub fn invisible_members(&self) -> Vec<Arc<User>> {
        self.members.lock().invisible.clone()
    }

    /// Visible member count
    pub fn member_count(&self) -> usize {
        self.members.lock().users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.lock().is_empty()
    }

    /// Hold the membership guard across a multi-step decision
    pub fn lock_membership(&self) -> MutexGuard<'_, Membership> {
        self.members.lock()
    }
}
