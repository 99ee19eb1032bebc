//! WALLCHOPS command
//!
//! Sends a notice to the channel operators of a channel, addressed to the
//! synthetic target `@#channel`.

use async_trait::async_trait;
use ferrircd_core::privilege::is_chanop;
use ferrircd_core::routing::{check_external, deliver_to_members};
use ferrircd_core::utils::string::{split_args, strip_colon};
use ferrircd_core::{
    valid_channel_name, CommandHandler, Message, MessageType, ModuleContext, NumericReply, Result, User,
};
use std::sync::Arc;

/// `WALLCHOPS <#channel> :<text>`
pub struct Wallchops;

#[async_trait]
impl CommandHandler for Wallchops {
    fn name(&self) -> &str {
        "WALLCHOPS"
    }

    async fn handle(&self, ctx: &ModuleContext, user: &Arc<User>, args: &str) -> Result<()> {
        let server = ctx.server_name();
        let args = split_args(args, 2);
        let Some(target) = args.first().copied() else {
            user.send(&NumericReply::no_recipient(server, user.nick(), "WALLCHOPS"));
            return Ok(());
        };
        let text = args.get(1).map(|text| strip_colon(text)).unwrap_or_default();
        if text.is_empty() {
            user.send(&NumericReply::no_text_to_send(server, user.nick()));
            return Ok(());
        }

        let channel = match ctx.registry.channel(target) {
            Some(channel) if valid_channel_name(target) => channel,
            _ => {
                user.send(&NumericReply::no_such_channel(server, user.nick(), target));
                return Ok(());
            }
        };

        if let Err(reason) = check_external(user, &channel) {
            user.send(&NumericReply::cannot_send_to_chan(server, user.nick(), target, reason.as_str()));
            return Ok(());
        }

        let notice = Message::with_prefix(user.prefix(), MessageType::Notice, vec![format!("@{}", target)])
            .trailing(text);
        let delivered = deliver_to_members(&channel, &notice, user, |member| is_chanop(member, channel.name()));
        tracing::debug!("WALLCHOPS from {} to {} reached {} operators", user.nick(), channel.name(), delivered);
        Ok(())
    }
}
