//! JOIN command

use async_trait::async_trait;
use ferrircd_core::privilege::{is_server_staff, status_prefix};
use ferrircd_core::routing::broadcast_to_channel;
use ferrircd_core::utils::string::split_args;
use ferrircd_core::{
    valid_channel_name, Channel, ChannelRank, CommandHandler, Message, MessageType, ModuleContext, NumericReply,
    Result, User,
};
use std::sync::Arc;

/// `JOIN <#channel>[,<#channel>] [key[,key]]`
pub struct Join;

impl Join {
    /// Reply refusing entry to an existing channel with `members` visible members, if any
    fn admission_error(
        ctx: &ModuleContext,
        user: &User,
        channel: &Channel,
        key: Option<&str>,
        members: usize,
    ) -> Option<Message> {
        let server = ctx.server_name();
        let name = channel.name();

        if channel.is_banned(user) {
            return Some(NumericReply::banned_from_chan(server, user.nick(), name));
        }
        if channel.has_mode('i') && !is_server_staff(user) {
            return Some(NumericReply::invite_only_chan(server, user.nick(), name));
        }
        if let Some(expected) = channel.channel_key() {
            if key != Some(expected.as_str()) {
                return Some(NumericReply::bad_channel_key(server, user.nick(), name));
            }
        }
        if let Some(limit) = channel.limit() {
            if members >= limit {
                return Some(NumericReply::channel_is_full(server, user.nick(), name));
            }
        }
        None
    }

    /// Topic and names for a user that just joined
    fn send_channel_state(ctx: &ModuleContext, user: &User, channel: &Channel) {
        let server = ctx.server_name();
        let topic = channel.topic();
        if !topic.text.is_empty() {
            user.send(&NumericReply::topic(server, user.nick(), channel.name(), &topic.text));
            if let Some(set_at) = topic.set_at {
                user.send(&NumericReply::topic_who_time(
                    server,
                    user.nick(),
                    channel.name(),
                    &topic.author,
                    set_at.timestamp(),
                ));
            }
        }

        let names: Vec<String> = channel
            .members()
            .iter()
            .map(|member| format!("{}{}", status_prefix(member, channel.name()), member.nick()))
            .collect();
        user.send(&NumericReply::name_reply(server, user.nick(), channel.name(), &names.join(" ")));
        user.send(&NumericReply::end_of_names(server, user.nick(), channel.name()));
    }
}

#[async_trait]
impl CommandHandler for Join {
    fn name(&self) -> &str {
        "JOIN"
    }

    async fn handle(&self, ctx: &ModuleContext, user: &Arc<User>, args: &str) -> Result<()> {
        let server = ctx.server_name();
        let args = split_args(args, 2);
        let Some(channels) = args.first() else {
            user.send(&NumericReply::need_more_params(server, user.nick(), "JOIN"));
            return Ok(());
        };
        let keys: Vec<&str> = args.get(1).map(|keys| keys.split(',').collect()).unwrap_or_default();

        for (i, name) in channels.split(',').enumerate() {
            if name.is_empty() {
                continue;
            }
            if !valid_channel_name(name) {
                user.send(&NumericReply::no_such_channel(server, user.nick(), name));
                continue;
            }
            if user.on_channel(name) {
                continue;
            }

            let key = keys.get(i).copied();
            let admitted = ctx.registry.join_channel_checked(name, user, |channel, members| {
                Self::admission_error(ctx, user, channel, key, members).map_or(Ok(()), Err)
            });
            let outcome = match admitted {
                Ok(outcome) => outcome,
                Err(reply) => {
                    user.send(&reply);
                    continue;
                }
            };
            let channel = outcome.channel;
            if user.is_admin() {
                user.add_channel_rank(channel.name(), ChannelRank::Administrator);
            } else if user.is_operator() {
                user.add_channel_rank(channel.name(), ChannelRank::IrcOperator);
            }

            let join = Message::with_prefix(user.prefix(), MessageType::Join, vec![channel.name().to_string()]);
            broadcast_to_channel(&channel, &join, None);
            Self::send_channel_state(ctx, user, &channel);

            tracing::debug!(
                "{} joined {}{}",
                user.nick(),
                channel.name(),
                if outcome.created { " (created)" } else { "" }
            );
        }

        Ok(())
    }
}
