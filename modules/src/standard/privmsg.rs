//! PRIVMSG command

use async_trait::async_trait;
use ferrircd_core::utils::string::{split_args, strip_colon};
use ferrircd_core::{CommandHandler, ModuleContext, NumericReply, Result, Router, User};
use std::sync::Arc;

/// `PRIVMSG <target>[,<target>] :<text>`
pub struct Privmsg;

#[async_trait]
impl CommandHandler for Privmsg {
    fn name(&self) -> &str {
        "PRIVMSG"
    }

    async fn handle(&self, ctx: &ModuleContext, user: &Arc<User>, args: &str) -> Result<()> {
        let server = ctx.server_name();
        let args = split_args(args, 2);
        let Some(targets) = args.first() else {
            user.send(&NumericReply::no_recipient(server, user.nick(), "PRIVMSG"));
            return Ok(());
        };

        let text = args.get(1).map(|text| strip_colon(text)).unwrap_or_default();
        if text.is_empty() {
            user.send(&NumericReply::no_text_to_send(server, user.nick()));
            return Ok(());
        }

        let summary = Router::privmsg(ctx).route(user, targets, text);
        tracing::trace!(
            "PRIVMSG from {} to {}: {} delivered, {} errors",
            user.nick(),
            targets,
            summary.delivered,
            summary.errors
        );
        Ok(())
    }
}
