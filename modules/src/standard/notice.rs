//! NOTICE command

use async_trait::async_trait;
use ferrircd_core::utils::string::{split_args, strip_colon};
use ferrircd_core::{CommandHandler, ModuleContext, Result, Router, User};
use std::sync::Arc;

/// `NOTICE <target>[,<target>] :<text>`; never answered with an error
pub struct Notice;

#[async_trait]
impl CommandHandler for Notice {
    fn name(&self) -> &str {
        "NOTICE"
    }

    async fn handle(&self, ctx: &ModuleContext, user: &Arc<User>, args: &str) -> Result<()> {
        let args = split_args(args, 2);
        let (Some(targets), Some(text)) = (args.first(), args.get(1).map(|text| strip_colon(text))) else {
            return Ok(());
        };
        if !text.is_empty() {
            Router::notice(ctx).route(user, targets, text);
        }
        Ok(())
    }
}
