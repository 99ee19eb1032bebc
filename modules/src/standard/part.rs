//! PART command

use async_trait::async_trait;
use ferrircd_core::routing::broadcast_to_channel;
use ferrircd_core::utils::string::{split_args, strip_colon};
use ferrircd_core::{CommandHandler, Message, MessageType, ModuleContext, NumericReply, Result, User};
use std::sync::Arc;

/// `PART <#channel>[,<#channel>] [:reason]`
pub struct Part;

#[async_trait]
impl CommandHandler for Part {
    fn name(&self) -> &str {
        "PART"
    }

    async fn handle(&self, ctx: &ModuleContext, user: &Arc<User>, args: &str) -> Result<()> {
        let server = ctx.server_name();
        let args = split_args(args, 2);
        let Some(channels) = args.first() else {
            user.send(&NumericReply::need_more_params(server, user.nick(), "PART"));
            return Ok(());
        };
        let reason = args.get(1).map(|reason| strip_colon(reason)).filter(|reason| !reason.is_empty());

        for name in channels.split(',').filter(|name| !name.is_empty()) {
            let Some(channel) = ctx.registry.channel(name) else {
                user.send(&NumericReply::no_such_channel(server, user.nick(), name));
                continue;
            };
            if !user.on_channel(channel.name()) {
                user.send(&NumericReply::not_on_channel(server, user.nick(), name));
                continue;
            }

            let mut part = Message::with_prefix(user.prefix(), MessageType::Part, vec![channel.name().to_string()]);
            if let Some(reason) = reason {
                part = part.trailing(reason);
            }
            broadcast_to_channel(&channel, &part, None);

            if ctx.registry.part_channel(&channel, user) {
                tracing::debug!("{} left {}; channel destroyed", user.nick(), channel.name());
            }
        }

        Ok(())
    }
}
