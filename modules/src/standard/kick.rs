//! KICK command

use async_trait::async_trait;
use ferrircd_core::privilege::{can_moderate, is_protected_from};
use ferrircd_core::routing::broadcast_to_channel;
use ferrircd_core::utils::string::{split_args, strip_colon, truncate_chars};
use ferrircd_core::{
    AuditEvent, AuditEventType, Channel, CommandHandler, Message, MessageType, ModuleContext, NumericReply, Result,
    User,
};
use std::sync::Arc;

/// `KICK <#channel> <nick>[,<nick>] [:reason]`
pub struct Kick;

impl Kick {
    /// Remove one target from `channel`, telling every member first
    fn kick(&self, ctx: &ModuleContext, user: &User, channel: &Arc<Channel>, target: &User, reason: Option<&str>) {
        let mut message = Message::with_prefix(
            user.prefix(),
            MessageType::Kick,
            vec![channel.name().to_string(), target.nick().to_string()],
        );
        if let Some(reason) = reason {
            message = message.trailing(reason);
        }
        broadcast_to_channel(channel, &message, None);
        // Invisible members are not on the broadcast list but still see their own kick
        if channel.invisible_members().iter().any(|member| member.id == target.id) {
            target.send(&message);
        }

        channel.remove_member(target);
        target.remove_channel(channel.name());

        tracing::info!("{} kicked {} from {}", user.nick(), target.nick(), channel.name());
        let mut event = AuditEvent::new(AuditEventType::Kick, user.mask())
            .with_target(target.nick())
            .with_channel(channel.name());
        if let Some(reason) = reason {
            event = event.with_reason(reason);
        }
        ctx.audit.write(&event);

        ctx.registry.destroy_if_empty(channel);
    }

    fn deny(&self, ctx: &ModuleContext, user: &User, channel: &Channel, target: &User) {
        user.send(&NumericReply::attack_deny(ctx.server_name(), user.nick(), target.nick()));
        if target.is_admin() {
            target.send(&ctx.server_notice(
                target.nick(),
                &format!("{} attempted to kick you from {}", user.nick(), channel.name()),
            ));
        }
        ctx.audit.write(
            &AuditEvent::new(AuditEventType::KickDenied, user.mask())
                .with_target(target.nick())
                .with_channel(channel.name()),
        );
    }
}

#[async_trait]
impl CommandHandler for Kick {
    fn name(&self) -> &str {
        "KICK"
    }

    async fn handle(&self, ctx: &ModuleContext, user: &Arc<User>, args: &str) -> Result<()> {
        let server = ctx.server_name();
        let args = split_args(args, 3);
        if args.len() < 2 {
            user.send(&NumericReply::need_more_params(server, user.nick(), "KICK"));
            return Ok(());
        }

        let Some(channel) = ctx.registry.channel(args[0]) else {
            user.send(&NumericReply::no_such_channel(server, user.nick(), args[0]));
            return Ok(());
        };
        if !user.on_channel(channel.name()) {
            user.send(&NumericReply::not_on_channel(server, user.nick(), args[0]));
            return Ok(());
        }
        if !can_moderate(user, channel.name()) {
            user.send(&NumericReply::chanop_privs_needed(server, user.nick(), channel.name()));
            return Ok(());
        }

        let reason = args
            .get(2)
            .map(|reason| truncate_chars(strip_colon(reason), ctx.limits().kick_length));

        // Every nick is resolved before anyone is kicked
        let mut targets = Vec::new();
        for nick in args[1].split(',').filter(|nick| !nick.is_empty()) {
            match ctx.registry.find_user(nick) {
                Some(target) => targets.push(target),
                None => user.send(&NumericReply::no_such_nick(server, user.nick(), nick)),
            }
        }

        let max_kicks = ctx.limits().max_kicks;
        let mut kicked = 0;
        for target in targets {
            if !target.on_channel(channel.name()) {
                user.send(&NumericReply::user_not_in_channel(server, user.nick(), target.nick(), channel.name()));
            } else if is_protected_from(&target, user) {
                self.deny(ctx, user, &channel, &target);
            } else if kicked >= max_kicks {
                user.send(&NumericReply::too_many_targets(server, user.nick(), target.nick()));
                break;
            } else {
                self.kick(ctx, user, &channel, &target, reason);
                kicked += 1;
            }
        }

        Ok(())
    }
}
