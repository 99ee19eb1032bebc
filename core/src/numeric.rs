//! IRC numeric replies as defined in RFC 1459
//!
//! Every reply is rendered as `:server NNN nick params... :text`.

use crate::message::{Message, MessageType, Prefix};

/// IRC numeric reply codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum NumericReply {
    // Connection registration
    RplWelcome = 1,
    RplYourHost = 2,
    RplCreated = 3,
    RplMyInfo = 4,

    // Statistics
    RplStatsLinkInfo = 211,
    RplStatsCommands = 212,
    RplEndOfStats = 219,
    RplStatsUptime = 242,
    RplStatsOLine = 243,
    RplStatsDebug = 249,

    // Queries and channel state
    RplUserhost = 302,
    RplTopic = 332,
    RplTopicWhoTime = 333,
    RplNameReply = 353,
    RplEndOfNames = 366,
    RplYoureOper = 381,

    // Errors
    ErrNoSuchNick = 401,
    ErrNoSuchChannel = 403,
    ErrCannotSendToChan = 404,
    ErrTooManyTargets = 407,
    ErrNoRecipient = 411,
    ErrNoTextToSend = 412,
    ErrUnknownCommand = 421,
    ErrNoNicknameGiven = 431,
    ErrErroneousNickname = 432,
    ErrNicknameInUse = 433,
    ErrUserNotInChannel = 441,
    ErrNotOnChannel = 442,
    ErrNotRegistered = 451,
    ErrNeedMoreParams = 461,
    ErrAlreadyRegistered = 462,
    ErrPasswdMismatch = 464,
    ErrChannelIsFull = 471,
    ErrInviteOnlyChan = 473,
    ErrBannedFromChan = 474,
    ErrBadChannelKey = 475,
    ErrNoPrivileges = 481,
    ErrChanOpPrivsNeeded = 482,
    ErrAttackDeny = 484,
    ErrNoOperHost = 491,
}

impl NumericReply {
    /// Get the numeric code as a u16
    pub fn numeric_code(&self) -> u16 {
        *self as u16
    }

    /// Build a reply from `server` to `nick` with middle params and a trailing text
    pub fn reply(&self, server: &str, nick: &str, params: &[&str], text: Option<&str>) -> Message {
        let mut all_params = Vec::with_capacity(params.len() + 1);
        all_params.push(nick.to_string());
        all_params.extend(params.iter().map(|p| p.to_string()));

        let message = Message::with_prefix(
            Prefix::Server(server.to_string()),
            MessageType::Numeric(self.numeric_code()),
            all_params,
        );
        match text {
            Some(text) => message.trailing(text),
            None => message,
        }
    }

    /// RPL_WELCOME
    pub fn welcome(server: &str, nick: &str, network: &str, mask: &str) -> Message {
        Self::RplWelcome.reply(server, nick, &[], Some(&format!("Welcome to the {} IRC Network {}", network, mask)))
    }

    /// RPL_YOURHOST
    pub fn your_host(server: &str, nick: &str, version: &str) -> Message {
        Self::RplYourHost.reply(server, nick, &[], Some(&format!("Your host is {}, running version {}", server, version)))
    }

    /// RPL_CREATED
    pub fn created(server: &str, nick: &str, date: &str) -> Message {
        Self::RplCreated.reply(server, nick, &[], Some(&format!("This server was created {}", date)))
    }

    /// RPL_MYINFO
    pub fn my_info(server: &str, nick: &str, version: &str, user_modes: &str, channel_modes: &str) -> Message {
        Self::RplMyInfo.reply(server, nick, &[server, version, user_modes, channel_modes], None)
    }

    /// RPL_STATSLINKINFO
    pub fn stats_link_info(server: &str, nick: &str, fields: &[&str]) -> Message {
        Self::RplStatsLinkInfo.reply(server, nick, fields, None)
    }

    /// RPL_STATSCOMMANDS
    pub fn stats_commands(server: &str, nick: &str, command: &str, count: u64, bytes: u64) -> Message {
        Self::RplStatsCommands.reply(server, nick, &[command, &count.to_string(), &bytes.to_string()], None)
    }

    /// RPL_ENDOFSTATS
    pub fn end_of_stats(server: &str, nick: &str, letter: char) -> Message {
        Self::RplEndOfStats.reply(server, nick, &[&letter.to_string()], Some("End of /STATS report"))
    }

    /// RPL_STATSUPTIME
    pub fn stats_uptime(server: &str, nick: &str, days: u64, hours: u64, minutes: u64, seconds: u64) -> Message {
        let text = format!("Server Up {} days {}:{:02}:{:02}", days, hours, minutes, seconds);
        Self::RplStatsUptime.reply(server, nick, &[], Some(&text))
    }

    /// RPL_STATSOLINE
    pub fn stats_oline(server: &str, nick: &str, hostmask: &str, name: &str, class: &str) -> Message {
        Self::RplStatsOLine.reply(server, nick, &["O", hostmask, "*", name], Some(class))
    }

    /// RPL_STATSDEBUG
    pub fn stats_debug(server: &str, nick: &str, text: &str) -> Message {
        Self::RplStatsDebug.reply(server, nick, &[], Some(text))
    }

    /// RPL_USERHOST
    pub fn userhost(server: &str, nick: &str, entries: &str) -> Message {
        Self::RplUserhost.reply(server, nick, &[], Some(entries))
    }

    /// RPL_TOPIC
    pub fn topic(server: &str, nick: &str, channel: &str, topic: &str) -> Message {
        Self::RplTopic.reply(server, nick, &[channel], Some(topic))
    }

    /// RPL_TOPICWHOTIME
    pub fn topic_who_time(server: &str, nick: &str, channel: &str, author: &str, timestamp: i64) -> Message {
        Self::RplTopicWhoTime.reply(server, nick, &[channel, author, &timestamp.to_string()], None)
    }

    /// RPL_NAMREPLY
    pub fn name_reply(server: &str, nick: &str, channel: &str, names: &str) -> Message {
        Self::RplNameReply.reply(server, nick, &["=", channel], Some(names))
    }

    /// RPL_ENDOFNAMES
    pub fn end_of_names(server: &str, nick: &str, channel: &str) -> Message {
        Self::RplEndOfNames.reply(server, nick, &[channel], Some("End of /NAMES list."))
    }

    /// RPL_YOUREOPER
    pub fn youre_oper(server: &str, nick: &str) -> Message {
        Self::RplYoureOper.reply(server, nick, &[], Some("You are now an IRC operator"))
    }

    /// ERR_NOSUCHNICK
    pub fn no_such_nick(server: &str, nick: &str, target: &str) -> Message {
        Self::ErrNoSuchNick.reply(server, nick, &[target], Some("No such nick/channel"))
    }

    /// ERR_NOSUCHCHANNEL
    pub fn no_such_channel(server: &str, nick: &str, channel: &str) -> Message {
        Self::ErrNoSuchChannel.reply(server, nick, &[channel], Some("No such channel"))
    }

    /// ERR_CANNOTSENDTOCHAN
    pub fn cannot_send_to_chan(server: &str, nick: &str, channel: &str, reason: &str) -> Message {
        let text = format!("Cannot send to channel ({})", reason);
        Self::ErrCannotSendToChan.reply(server, nick, &[channel], Some(&text))
    }

    /// ERR_TOOMANYTARGETS
    pub fn too_many_targets(server: &str, nick: &str, target: &str) -> Message {
        Self::ErrTooManyTargets.reply(server, nick, &[target], Some("Too many targets"))
    }

    /// ERR_NORECIPIENT
    pub fn no_recipient(server: &str, nick: &str, command: &str) -> Message {
        Self::ErrNoRecipient.reply(server, nick, &[], Some(&format!("No recipient given ({})", command)))
    }

    /// ERR_NOTEXTTOSEND
    pub fn no_text_to_send(server: &str, nick: &str) -> Message {
        Self::ErrNoTextToSend.reply(server, nick, &[], Some("No text to send"))
    }

    /// ERR_UNKNOWNCOMMAND
    pub fn unknown_command(server: &str, nick: &str, command: &str) -> Message {
        Self::ErrUnknownCommand.reply(server, nick, &[command], Some("Unknown command"))
    }

    /// ERR_NONICKNAMEGIVEN
    pub fn no_nickname_given(server: &str, nick: &str) -> Message {
        Self::ErrNoNicknameGiven.reply(server, nick, &[], Some("No nickname given"))
    }

    /// ERR_ERRONEUSNICKNAME
    pub fn erroneous_nickname(server: &str, nick: &str, attempted: &str) -> Message {
        Self::ErrErroneousNickname.reply(server, nick, &[attempted], Some("Erroneous nickname"))
    }

    /// ERR_NICKNAMEINUSE
    pub fn nickname_in_use(server: &str, nick: &str, attempted: &str) -> Message {
        Self::ErrNicknameInUse.reply(server, nick, &[attempted], Some("Nickname is already in use"))
    }

    /// ERR_USERNOTINCHANNEL
    pub fn user_not_in_channel(server: &str, nick: &str, target: &str, channel: &str) -> Message {
        Self::ErrUserNotInChannel.reply(server, nick, &[target, channel], Some("They aren't on that channel"))
    }

    /// ERR_NOTONCHANNEL
    pub fn not_on_channel(server: &str, nick: &str, channel: &str) -> Message {
        Self::ErrNotOnChannel.reply(server, nick, &[channel], Some("You're not on that channel"))
    }

    /// ERR_NOTREGISTERED
    pub fn not_registered(server: &str, nick: &str) -> Message {
        Self::ErrNotRegistered.reply(server, nick, &[], Some("You have not registered"))
    }

    /// ERR_NEEDMOREPARAMS
    pub fn need_more_params(server: &str, nick: &str, command: &str) -> Message {
        Self::ErrNeedMoreParams.reply(server, nick, &[command], Some("Not enough parameters"))
    }

    /// ERR_ALREADYREGISTRED
    pub fn already_registered(server: &str, nick: &str) -> Message {
        Self::ErrAlreadyRegistered.reply(server, nick, &[], Some("You may not reregister"))
    }

    /// ERR_PASSWDMISMATCH
    pub fn password_mismatch(server: &str, nick: &str) -> Message {
        Self::ErrPasswdMismatch.reply(server, nick, &[], Some("Password incorrect"))
    }

    /// ERR_CHANNELISFULL
    pub fn channel_is_full(server: &str, nick: &str, channel: &str) -> Message {
        Self::ErrChannelIsFull.reply(server, nick, &[channel], Some("Cannot join channel (+l)"))
    }

    /// ERR_INVITEONLYCHAN
    pub fn invite_only_chan(server: &str, nick: &str, channel: &str) -> Message {
        Self::ErrInviteOnlyChan.reply(server, nick, &[channel], Some("Cannot join channel (+i)"))
    }

    /// ERR_BANNEDFROMCHAN
    pub fn banned_from_chan(server: &str, nick: &str, channel: &str) -> Message {
        Self::ErrBannedFromChan.reply(server, nick, &[channel], Some("Cannot join channel (+b)"))
    }

    /// ERR_BADCHANNELKEY
    pub fn bad_channel_key(server: &str, nick: &str, channel: &str) -> Message {
        Self::ErrBadChannelKey.reply(server, nick, &[channel], Some("Cannot join channel (+k)"))
    }

    /// ERR_NOPRIVILEGES
    pub fn no_privileges(server: &str, nick: &str) -> Message {
        Self::ErrNoPrivileges.reply(server, nick, &[], Some("Permission Denied- You're not an IRC operator"))
    }

    /// ERR_CHANOPRIVSNEEDED
    pub fn chanop_privs_needed(server: &str, nick: &str, channel: &str) -> Message {
        Self::ErrChanOpPrivsNeeded.reply(server, nick, &[channel], Some("You're not channel operator"))
    }

    /// ERR_ATTACKDENY
    pub fn attack_deny(server: &str, nick: &str, target: &str) -> Message {
        Self::ErrAttackDeny.reply(server, nick, &[target], Some("Cannot kick or kill a protected user"))
    }

    /// ERR_NOOPERHOST
    pub fn no_oper_host(server: &str, nick: &str) -> Message {
        Self::ErrNoOperHost.reply(server, nick, &[], Some("No O-lines for your host"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_reply_format() {
        let msg = NumericReply::no_such_nick("irc.test", "alice", "bob");
        assert_eq!(msg.to_string(), ":irc.test 401 alice bob :No such nick/channel");

        let msg = NumericReply::cannot_send_to_chan("irc.test", "alice", "#test", "+m");
        assert_eq!(msg.to_string(), ":irc.test 404 alice #test :Cannot send to channel (+m)");
    }

    #[test]
    fn test_reply_without_trailing() {
        let msg = NumericReply::stats_commands("irc.test", "oper", "PRIVMSG", 3, 42);
        assert_eq!(msg.to_string(), ":irc.test 212 oper PRIVMSG 3 42");
        assert_eq!(NumericReply::RplWelcome.numeric_code(), 1);
    }
}
