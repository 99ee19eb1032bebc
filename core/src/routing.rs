//! Message routing and fan-out
//!
//! Resolves comma-separated target lists for PRIVMSG and NOTICE, applies
//! channel policy and status-prefix filtering, and queues the formatted
//! line for every recipient. Member and user lists are iterated as
//! point-in-time snapshots.

use crate::channel::{valid_channel_name, Channel};
use crate::message::{Message, MessageType};
use crate::module::ModuleContext;
use crate::numeric::NumericReply;
use crate::privilege::{qualifying_prefix, STATUS_PREFIXES};
use crate::user::User;
use std::sync::Arc;

/// Why a channel refused a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CannotSend {
    /// `+n` and the sender is not a member
    NoExternalMessages,
    /// `+m` and the sender has no voice
    Moderated,
}

impl CannotSend {
    /// Reason text used in ERR_CANNOTSENDTOCHAN
    pub fn as_str(&self) -> &'static str {
        match self {
            CannotSend::NoExternalMessages => "no external messages",
            CannotSend::Moderated => "+m",
        }
    }
}

/// Summary of one routing call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteSummary {
    /// Targets that resolved to a channel or user
    pub resolved: usize,
    /// Lines queued to recipients
    pub delivered: usize,
    /// Error replies sent to the sender
    pub errors: usize,
}

/// Split a leading status prefix off a target
pub fn split_status_prefix(target: &str) -> (Option<char>, &str) {
    match target.chars().next() {
        Some(c) if STATUS_PREFIXES.contains(c) => (Some(c), &target[c.len_utf8()..]),
        _ => (None, target),
    }
}

/// Membership and moderation checks for speaking in `channel`.
///
/// Members may always speak unless the channel is moderated; outsiders
/// only when `n` is not set.
pub fn check_can_send(sender: &User, channel: &Channel) -> Result<(), CannotSend> {
    check_external(sender, channel)?;
    if channel.has_mode('m') && !qualifying_prefix(sender, '+', channel.name()) {
        return Err(CannotSend::Moderated);
    }
    Ok(())
}

/// Only the no-external-messages rule
pub fn check_external(sender: &User, channel: &Channel) -> Result<(), CannotSend> {
    if sender.on_channel(channel.name()) || !channel.has_mode('n') {
        Ok(())
    } else {
        Err(CannotSend::NoExternalMessages)
    }
}

/// Queue `message` to every visible member except `exclude`.
///
/// Returns the number of recipients.
pub fn broadcast_to_channel(channel: &Channel, message: &Message, exclude: Option<&User>) -> usize {
    let line = message.to_string();
    let mut delivered = 0;
    for member in channel.members() {
        if exclude.map_or(false, |excluded| excluded.id == member.id) {
            continue;
        }
        member.send_line(line.clone());
        delivered += 1;
    }
    delivered
}

/// Queue `message` to members for whom `filter` holds, never to `sender`
pub fn deliver_to_members<F>(channel: &Channel, message: &Message, sender: &User, filter: F) -> usize
where
    F: Fn(&User) -> bool,
{
    let line = message.to_string();
    let mut delivered = 0;
    for member in channel.members() {
        if member.id == sender.id || !filter(member.as_ref()) {
            continue;
        }
        member.send_line(line.clone());
        delivered += 1;
    }
    delivered
}

/// Connected users whose nickname matches case-insensitively
pub fn find_users_by_nick(ctx: &ModuleContext, nick: &str) -> Vec<Arc<User>> {
    ctx.registry
        .users()
        .into_iter()
        .filter(|user| user.nick_matches(nick))
        .collect()
}

/// Routes PRIVMSG/NOTICE text to a comma-separated target list
pub struct Router<'a> {
    ctx: &'a ModuleContext,
    command: MessageType,
    reply_errors: bool,
}

impl<'a> Router<'a> {
    /// Router for PRIVMSG, replying with errors
    pub fn privmsg(ctx: &'a ModuleContext) -> Self {
        Self {
            ctx,
            command: MessageType::PrivMsg,
            reply_errors: true,
        }
    }

    /// Router for NOTICE, which never generates error replies
    pub fn notice(ctx: &'a ModuleContext) -> Self {
        Self {
            ctx,
            command: MessageType::Notice,
            reply_errors: false,
        }
    }

    /// Deliver `text` from `sender` to every target in `targets`
    pub fn route(&self, sender: &User, targets: &str, text: &str) -> RouteSummary {
        let max_targets = self.ctx.limits().max_targets;
        let mut summary = RouteSummary::default();

        for target in targets.split(',').filter(|t| !t.is_empty()) {
            let (prefix, bare) = split_status_prefix(target);

            if summary.resolved >= max_targets {
                self.error(sender, &mut summary, |server, nick| {
                    NumericReply::too_many_targets(server, nick, target)
                });
                continue;
            }

            if bare.contains('#') && valid_channel_name(bare) {
                self.route_to_channel(sender, target, prefix, bare, text, &mut summary);
            } else if bare.contains('#') {
                self.error(sender, &mut summary, |server, nick| {
                    NumericReply::no_such_channel(server, nick, target)
                });
            } else {
                self.route_to_nick(sender, target, text, &mut summary);
            }
        }

        summary
    }

    fn route_to_channel(
        &self,
        sender: &User,
        target: &str,
        prefix: Option<char>,
        name: &str,
        text: &str,
        summary: &mut RouteSummary,
    ) {
        let Some(channel) = self.ctx.registry.channel(name) else {
            self.error(sender, summary, |server, nick| {
                NumericReply::no_such_channel(server, nick, target)
            });
            return;
        };
        summary.resolved += 1;

        if let Err(reason) = check_can_send(sender, &channel) {
            self.error(sender, summary, |server, nick| {
                NumericReply::cannot_send_to_chan(server, nick, channel.name(), reason.as_str())
            });
            return;
        }

        match prefix {
            Some(prefix) => {
                let message = self.line(sender, &format!("{}{}", prefix, name), text);
                summary.delivered += deliver_to_members(&channel, &message, sender, |member| {
                    qualifying_prefix(member, prefix, name)
                });
            }
            None => {
                let message = self.line(sender, name, text);
                summary.delivered += deliver_to_members(&channel, &message, sender, |_| true);
            }
        }
    }

    fn route_to_nick(&self, sender: &User, target: &str, text: &str, summary: &mut RouteSummary) {
        let recipients = find_users_by_nick(self.ctx, target);
        if recipients.is_empty() {
            self.error(sender, summary, |server, nick| {
                NumericReply::no_such_nick(server, nick, target)
            });
            return;
        }

        for recipient in recipients {
            recipient.send(&self.line(sender, recipient.nick(), text));
            summary.resolved += 1;
            summary.delivered += 1;
        }
    }

    fn line(&self, sender: &User, target: &str, text: &str) -> Message {
        Message::with_prefix(sender.prefix(), self.command.clone(), vec![target.to_string()]).trailing(text)
    }

    fn error<F>(&self, sender: &User, summary: &mut RouteSummary, build: F)
    where
        F: FnOnce(&str, &str) -> Message,
    {
        if self.reply_errors {
            sender.send(&build(self.ctx.server_name(), sender.nick()));
            summary.errors += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_status_prefix() {
        assert_eq!(split_status_prefix("@#test"), (Some('@'), "#test"));
        assert_eq!(split_status_prefix("+#test"), (Some('+'), "#test"));
        assert_eq!(split_status_prefix("#test"), (None, "#test"));
        assert_eq!(split_status_prefix("alice"), (None, "alice"));
        assert_eq!(split_status_prefix("~"), (Some('~'), ""));
        assert_eq!(split_status_prefix(""), (None, ""));
    }

    #[test]
    fn test_cannot_send_reasons() {
        assert_eq!(CannotSend::NoExternalMessages.as_str(), "no external messages");
        assert_eq!(CannotSend::Moderated.as_str(), "+m");
    }
}
