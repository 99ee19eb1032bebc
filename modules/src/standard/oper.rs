//! OPER command

use async_trait::async_trait;
use ferrircd_core::utils::string::split_args;
use ferrircd_core::{AuditEvent, AuditEventType, CommandHandler, ModuleContext, NumericReply, Result, User};
use std::sync::Arc;

/// `OPER <name> <password>`
pub struct Oper;

#[async_trait]
impl CommandHandler for Oper {
    fn name(&self) -> &str {
        "OPER"
    }

    async fn handle(&self, ctx: &ModuleContext, user: &Arc<User>, args: &str) -> Result<()> {
        let server = ctx.server_name();
        let args = split_args(args, 2);
        if args.len() < 2 {
            user.send(&NumericReply::need_more_params(server, user.nick(), "OPER"));
            return Ok(());
        }
        let (name, password) = (args[0], args[1]);

        let Some(operator) = ctx
            .config
            .find_operator(name)
            .filter(|operator| operator.matches_hostmask(user.ident(), user.hostname()))
        else {
            tracing::warn!("OPER {} from {} matched no operator block", name, user.mask());
            user.send(&NumericReply::no_oper_host(server, user.nick()));
            return Ok(());
        };

        if !operator.verify_password(password) {
            tracing::warn!("Failed operator authentication for {} from {}", name, user.mask());
            user.send(&NumericReply::password_mismatch(server, user.nick()));
            ctx.audit
                .write(&AuditEvent::new(AuditEventType::OperAuthFailure, user.mask()).with_target(name));
            return Ok(());
        }

        user.set_operator(true);
        user.add_umode('o');
        if operator.admin {
            user.set_admin(true);
            user.add_umode('a');
        }
        user.add_umode('s');

        tracing::info!("{} authenticated as operator {}", user.mask(), name);
        user.send(&NumericReply::youre_oper(server, user.nick()));
        ctx.audit
            .write(&AuditEvent::new(AuditEventType::OperAuth, user.mask()).with_target(name));
        Ok(())
    }
}
