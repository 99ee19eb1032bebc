//! USERIP command
//!
//! Unlike USERHOST this exposes the real address of a user, so it is
//! limited to server staff.

use async_trait::async_trait;
use ferrircd_core::privilege::is_server_staff;
use ferrircd_core::routing::find_users_by_nick;
use ferrircd_core::{CommandHandler, ModuleContext, NumericReply, Result, User};
use std::sync::Arc;

/// `USERIP <nick> [nick ...]`
pub struct Userip;

impl Userip {
    fn entry(user: &User) -> String {
        let marker = if user.is_admin() || user.is_operator() { "*" } else { "" };
        format!("{}{}=+{}@{}", user.nick(), marker, user.ident(), user.ip_address())
    }
}

#[async_trait]
impl CommandHandler for Userip {
    fn name(&self) -> &str {
        "USERIP"
    }

    async fn handle(&self, ctx: &ModuleContext, user: &Arc<User>, args: &str) -> Result<()> {
        let server = ctx.server_name();
        if !is_server_staff(user) {
            user.send(&NumericReply::no_privileges(server, user.nick()));
            return Ok(());
        }
        if args.trim().is_empty() {
            user.send(&NumericReply::need_more_params(server, user.nick(), "USERIP"));
            return Ok(());
        }

        let max_targets = ctx.limits().max_targets;
        let mut entries = Vec::new();
        for nick in args.split_whitespace() {
            if entries.len() >= max_targets {
                break;
            }
            entries.extend(find_users_by_nick(ctx, nick).iter().map(|found| Self::entry(found)));
        }

        user.send(&NumericReply::userhost(server, user.nick(), &entries.join(" ")));
        Ok(())
    }
}
