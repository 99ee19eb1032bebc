//! KILL command
//!
//! Restricted to server operators, administrators and services. Every user
//! with the `s` user mode hears about the attempt, including ones that are
//! refused because the target is protected.

use async_trait::async_trait;
use ferrircd_core::privilege::{is_protected_from, is_server_staff};
use ferrircd_core::routing::find_users_by_nick;
use ferrircd_core::utils::string::{split_args, strip_colon};
use ferrircd_core::{AuditEvent, AuditEventType, CommandHandler, Message, MessageType, ModuleContext, NumericReply, Result, User};
use std::sync::Arc;

const DEFAULT_REASON: &str = "No reason given";

/// `KILL <nick> [:reason]`
pub struct Kill;

impl Kill {
    fn broadcast_notice(&self, ctx: &ModuleContext, user: &User, target: &User, reason: &str) {
        let text = format!(
            "*** BROADCAST: {} has issued a KILL for {}: {}",
            user.nick(),
            target.nick(),
            reason
        );
        for recipient in ctx.registry.users() {
            if recipient.has_umode('s') {
                recipient.send(&ctx.server_notice(recipient.nick(), &text));
            }
        }
    }
}

#[async_trait]
impl CommandHandler for Kill {
    fn name(&self) -> &str {
        "KILL"
    }

    async fn handle(&self, ctx: &ModuleContext, user: &Arc<User>, args: &str) -> Result<()> {
        let server = ctx.server_name();
        if !is_server_staff(user) {
            user.send(&NumericReply::no_privileges(server, user.nick()));
            return Ok(());
        }

        let args = split_args(args, 2);
        let Some(nick) = args.first() else {
            user.send(&NumericReply::need_more_params(server, user.nick(), "KILL"));
            return Ok(());
        };
        let reason = args
            .get(1)
            .map(|reason| strip_colon(reason))
            .filter(|reason| !reason.is_empty())
            .unwrap_or(DEFAULT_REASON);

        let Some(target) = find_users_by_nick(ctx, nick).pop() else {
            user.send(&NumericReply::no_such_nick(server, user.nick(), nick));
            return Ok(());
        };

        self.broadcast_notice(ctx, user, &target, reason);

        if is_protected_from(&target, user) {
            user.send(&NumericReply::attack_deny(server, user.nick(), target.nick()));
            if target.is_admin() {
                target.send(&ctx.server_notice(target.nick(), &format!("{} attempted to kill you!", user.nick())));
            }
            tracing::warn!("{} attempted to kill protected user {}", user.mask(), target.nick());
            ctx.audit.write(
                &AuditEvent::new(AuditEventType::KillDenied, user.mask())
                    .with_target(target.nick())
                    .with_reason(reason),
            );
            return Ok(());
        }

        target.send(
            &Message::with_prefix(user.prefix(), MessageType::Kill, vec![target.nick().to_string()])
                .trailing(format!("{}!{}!{} ({})", server, user.hostname(), user.nick(), reason)),
        );
        target.send(&Message::new(MessageType::Error, Vec::new()).trailing(format!(
            "Closing link: {} [Killed ({} ({}))]",
            target.hostname(),
            user.nick(),
            reason
        )));

        tracing::info!("{} was killed by {}: {}", target.mask(), user.mask(), reason);
        ctx.audit.write(
            &AuditEvent::new(AuditEventType::Kill, user.mask())
                .with_target(target.mask())
                .with_reason(reason),
        );

        ctx.close(&target, &format!("Killed ({} ({}))", user.nick(), reason), true);
        Ok(())
    }
}
