//! Privilege model
//!
//! Channel ranks form a total order. The two highest tiers are the
//! in-channel status of server staff (`a` for administrators, `z` for IRC
//! operators), granted when they join. Delivery filtering by status prefix
//! only looks at channel ranks; moderation commands additionally honour
//! the server-wide flags on [`User`].

use crate::user::User;
use serde::{Deserialize, Serialize};

/// Status prefixes that may lead a channel target, highest rank first
pub const STATUS_PREFIXES: &str = "&!~@%+";

/// Rank a user holds within a single channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ChannelRank {
    Voice,
    HalfOperator,
    Operator,
    Founder,
    IrcOperator,
    Administrator,
}

impl ChannelRank {
    /// Channel mode letter granting this rank
    pub fn mode_char(self) -> char {
        match self {
            ChannelRank::Voice => 'v',
            ChannelRank::HalfOperator => 'h',
            ChannelRank::Operator => 'o',
            ChannelRank::Founder => 'f',
            ChannelRank::IrcOperator => 'z',
            ChannelRank::Administrator => 'a',
        }
    }

    /// Status character shown in NAMES and accepted on targets
    pub fn prefix_char(self) -> char {
        match self {
            ChannelRank::Voice => '+',
            ChannelRank::HalfOperator => '%',
            ChannelRank::Operator => '@',
            ChannelRank::Founder => '~',
            ChannelRank::IrcOperator => '!',
            ChannelRank::Administrator => '&',
        }
    }

    pub fn from_prefix(c: char) -> Option<Self> {
        match c {
            '+' => Some(ChannelRank::Voice),
            '%' => Some(ChannelRank::HalfOperator),
            '@' => Some(ChannelRank::Operator),
            '~' => Some(ChannelRank::Founder),
            '!' => Some(ChannelRank::IrcOperator),
            '&' => Some(ChannelRank::Administrator),
            _ => None,
        }
    }

    pub fn from_mode(c: char) -> Option<Self> {
        match c {
            'v' => Some(ChannelRank::Voice),
            'h' => Some(ChannelRank::HalfOperator),
            'o' => Some(ChannelRank::Operator),
            'f' => Some(ChannelRank::Founder),
            'z' => Some(ChannelRank::IrcOperator),
            'a' => Some(ChannelRank::Administrator),
            _ => None,
        }
    }
}

/// Highest rank `user` holds on `channel`
pub fn highest_rank(user: &User, channel: &str) -> Option<ChannelRank> {
    user.channel_ranks(channel)
        .and_then(|ranks| ranks.iter().next_back().copied())
}

/// Whether the user's channel rank is at least the rank named by `prefix`.
///
/// Unknown prefix characters never qualify.
pub fn qualifying_prefix(user: &User, prefix: char, channel: &str) -> bool {
    match (ChannelRank::from_prefix(prefix), highest_rank(user, channel)) {
        (Some(required), Some(held)) => held >= required,
        _ => false,
    }
}

/// Channel operator or above
pub fn is_chanop(user: &User, channel: &str) -> bool {
    qualifying_prefix(user, '@', channel)
}

/// May kick members of `channel`
pub fn can_moderate(user: &User, channel: &str) -> bool {
    is_chanop(user, channel) || user.is_admin() || user.is_service()
}

/// Operator, admin or service
pub fn is_server_staff(user: &User) -> bool {
    let flags = user.flags();
    flags.operator || flags.admin || flags.service
}

/// Whether `target` is shielded from KICK and KILL issued by `actor`
pub fn is_protected_from(target: &User, actor: &User) -> bool {
    (target.is_admin() && !actor.is_admin()) || target.is_service()
}

/// Highest status prefix for NAMES output, empty when no rank is held
pub fn status_prefix(user: &User, channel: &str) -> String {
    highest_rank(user, channel)
        .map(|rank| rank.prefix_char().to_string())
        .unwrap_or_default()
}
