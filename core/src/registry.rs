//! Membership registry
//!
//! Owns every connected user and every channel, keyed by normalized name.
//! The registry guards are only held while the maps themselves change;
//! per-channel guards cover everything else. Lock order is registry,
//! then channel membership, then channel modes or bans.

use crate::channel::Channel;
use crate::message::{Message, MessageType};
use crate::privilege::ChannelRank;
use crate::user::User;
use crate::utils::string::irc_key;
use crate::{Error, Result};
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::convert::Infallible;
use std::sync::Arc;

/// Outcome of [`Registry::join_channel`]
#[derive(Debug, Clone)]
pub struct JoinOutcome {
    pub channel: Arc<Channel>,
    /// The channel did not exist before this join
    pub created: bool,
}

/// Connected users and live channels
#[derive(Debug, Default)]
pub struct Registry {
    users: RwLock<HashMap<String, Arc<User>>>,
    channels: RwLock<HashMap<String, Arc<Channel>>>,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a user, refusing a nickname already in use
    pub fn add_user(&self, user: Arc<User>) -> Result<()> {
        let key = irc_key(user.nick());
        let mut users = self.users.write();
        if users.contains_key(&key) {
            return Err(Error::NickInUse(user.nick().to_string()));
        }
        tracing::debug!("Registered user {}", user.nick());
        users.insert(key, user);
        Ok(())
    }

    /// Drop the registry entry for `user` if it is still the same connection
    pub fn remove_user(&self, user: &User) -> bool {
        let key = irc_key(user.nick());
        let mut users = self.users.write();
        let is_current = users.get(&key).map_or(false, |existing| existing.id == user.id);
        if is_current {
            users.remove(&key);
        }
        is_current
    }

    /// Find a user by nickname
    pub fn find_user(&self, nick: &str) -> Option<Arc<User>> {
        self.users.read().get(&irc_key(nick)).cloned()
    }

    /// Point-in-time snapshot of every connected user
    pub fn users(&self) -> Vec<Arc<User>> {
        self.users.read().values().cloned().collect()
    }

    pub fn user_count(&self) -> usize {
        self.users.read().len()
    }

    /// Look up a channel by name
    pub fn channel(&self, name: &str) -> Option<Arc<Channel>> {
        self.channels.read().get(&irc_key(name)).cloned()
    }

    /// Point-in-time snapshot of every channel
    pub fn channels(&self) -> Vec<Arc<Channel>> {
        self.channels.read().values().cloned().collect()
    }

    pub fn channel_count(&self) -> usize {
        self.channels.read().len()
    }

    /// Insert an existing channel, e.g. a registered one restored at startup
    pub fn add_channel(&self, channel: Arc<Channel>) -> Result<()> {
        let mut channels = self.channels.write();
        if channels.contains_key(channel.key()) {
            return Err(Error::Channel(format!("{} already exists", channel.name())));
        }
        channels.insert(channel.key().to_string(), channel);
        Ok(())
    }

    /// Join `user` to `name`, creating the channel if needed.
    ///
    /// Creation and the first join happen under the registry guard, so a
    /// concurrent destroy cannot remove the channel between the two. The
    /// creator becomes channel operator.
    pub fn join_channel(&self, name: &str, user: &Arc<User>) -> JoinOutcome {
        match self.join_channel_checked(name, user, |_, _| Ok::<(), Infallible>(())) {
            Ok(outcome) => outcome,
            Err(never) => match never {},
        }
    }

    /// Like [`join_channel`](Self::join_channel), but an existing channel is
    /// only joined once `admit` accepts it.
    ///
    /// `admit` receives the channel and its visible member count and runs
    /// under the registry and membership guards, so a limit it enforces
    /// holds against concurrent joins. It must not take the membership
    /// guard itself. Newly created channels skip it.
    pub fn join_channel_checked<E, F>(&self, name: &str, user: &Arc<User>, admit: F) -> std::result::Result<JoinOutcome, E>
    where
        F: FnOnce(&Channel, usize) -> std::result::Result<(), E>,
    {
        let mut channels = self.channels.write();
        let (channel, created) = match channels.get(&irc_key(name)) {
            Some(channel) => (channel.clone(), false),
            None => {
                let channel = Arc::new(Channel::new(name, Some(user)));
                channels.insert(channel.key().to_string(), channel.clone());
                tracing::info!("Channel {} created by {}", name, user.nick());
                (channel, true)
            }
        };

        {
            let mut membership = channel.lock_membership();
            if !created {
                admit(&channel, membership.visible_count())?;
            }
            membership.add_visible(user.clone());
        }
        user.add_channel(channel.name());
        if created {
            user.add_channel_rank(channel.name(), ChannelRank::Operator);
        }

        Ok(JoinOutcome { channel, created })
    }

    /// Remove `user` from `channel` on both sides and destroy it if left empty
    pub fn part_channel(&self, channel: &Arc<Channel>, user: &User) -> bool {
        channel.remove_member(user);
        user.remove_channel(channel.name());
        self.destroy_if_empty(channel)
    }

    /// Destroy `channel` if it has no members and is not registered.
    ///
    /// Emptiness is re-checked while the membership guard is held, and the
    /// guard is kept until the channel is out of the map, so a join that
    /// lands concurrently either happens before the check or finds no
    /// channel and creates a fresh one.
    pub fn destroy_if_empty(&self, channel: &Arc<Channel>) -> bool {
        let mut channels = self.channels.write();
        let membership = channel.lock_membership();
        if !membership.is_empty() || channel.is_registered() {
            return false;
        }

        let is_current = channels
            .get(channel.key())
            .map_or(false, |current| Arc::ptr_eq(current, channel));
        if is_current {
            channels.remove(channel.key());
            drop(membership);
            tracing::debug!("Destroyed empty channel {}", channel.name());
        }
        is_current
    }

    /// Remove `user` from every channel and from the registry.
    ///
    /// When `quit_reason` is given every distinct peer receives one QUIT
    /// line. Calling this for a user that is already gone does nothing.
    pub fn disconnect(&self, user: &User, quit_reason: Option<&str>) {
        let mut notified = HashSet::new();
        notified.insert(user.id);
        let quit = quit_reason.map(|reason| {
            Message::with_prefix(user.prefix(), MessageType::Quit, Vec::new()).trailing(reason)
        });

        for name in user.channel_names() {
            let Some(channel) = self.channel(&name) else {
                user.remove_channel(&name);
                continue;
            };

            channel.remove_member(user);
            user.remove_channel(&name);

            if let Some(ref quit) = quit {
                for peer in channel.members().into_iter().chain(channel.invisible_members()) {
                    if notified.insert(peer.id) {
                        peer.send(quit);
                    }
                }
            }

            self.destroy_if_empty(&channel);
        }

        if self.remove_user(user) {
            tracing::info!("User {} disconnected", user.nick());
        }
    }
}
