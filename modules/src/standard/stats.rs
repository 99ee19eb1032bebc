//! STATS command

use async_trait::async_trait;
use chrono::Utc;
use ferrircd_core::privilege::is_server_staff;
use ferrircd_core::utils::string::split_args;
use ferrircd_core::utils::time::duration_parts;
use ferrircd_core::{CommandHandler, ModuleContext, NumericReply, Result, User};
use std::sync::Arc;

/// `STATS <letter>`, for server staff only
pub struct Stats;

impl Stats {
    /// Query letter: the first character, or the second after a leading ':'
    fn letter(arg: &str) -> Option<char> {
        let mut chars = arg.chars();
        match chars.next() {
            Some(':') if arg.len() > 1 => chars.next(),
            first => first,
        }
    }

    fn report(&self, ctx: &ModuleContext, user: &User, letter: char) {
        let server = ctx.server_name();
        let nick = user.nick();

        match letter {
            'c' => {
                for (command, stats) in ctx.statistics.command_stats() {
                    user.send(&NumericReply::stats_commands(server, nick, &command, stats.count, stats.bytes));
                }
            }
            'd' => {
                let received = format!("{} bytes received", ctx.statistics.bytes_received());
                let sent = format!("{} bytes sent", ctx.statistics.bytes_sent());
                user.send(&NumericReply::stats_debug(server, nick, &received));
                user.send(&NumericReply::stats_debug(server, nick, &sent));
            }
            'i' => {
                let mut opers = 0;
                for staff in ctx.registry.users().into_iter().filter(|u| is_server_staff(u)) {
                    let line = format!(
                        "{} ({}) Idle: {} seconds",
                        staff.nick(),
                        staff.hostname(),
                        staff.idle_seconds()
                    );
                    user.send(&NumericReply::stats_debug(server, nick, &line));
                    opers += 1;
                }
                user.send(&NumericReply::stats_debug(server, nick, &format!("{} opers online", opers)));
            }
            'l' => {
                let now = Utc::now();
                for link in ctx.registry.users() {
                    let name = format!("{}[{}@{}]", link.nick(), link.ident(), link.hostname());
                    let lines = link.lines_sent().to_string();
                    let bytes = link.bytes_sent().to_string();
                    let open = (now - link.signon()).num_seconds().to_string();
                    user.send(&NumericReply::stats_link_info(
                        server,
                        nick,
                        &[name.as_str(), "0", lines.as_str(), bytes.as_str(), "0", "0", open.as_str()],
                    ));
                }
            }
            'o' => {
                for operator in &ctx.config.operators {
                    let class = if operator.admin { "Administrator" } else { "Operator" };
                    user.send(&NumericReply::stats_oline(server, nick, &operator.hostmask, &operator.name, class));
                }
            }
            'p' => {
                let connection = &ctx.config.connection;
                for port in &connection.ports {
                    let line = format!("{}:{} (plain)", connection.bind_address, port);
                    user.send(&NumericReply::stats_debug(server, nick, &line));
                }
            }
            'u' => {
                let (days, hours, minutes, seconds) = duration_parts(ctx.statistics.uptime_seconds());
                user.send(&NumericReply::stats_uptime(server, nick, days, hours, minutes, seconds));
            }
            // g k m q s z and unknown letters have nothing to report
            _ => {}
        }
    }
}

#[async_trait]
impl CommandHandler for Stats {
    fn name(&self) -> &str {
        "STATS"
    }

    async fn handle(&self, ctx: &ModuleContext, user: &Arc<User>, args: &str) -> Result<()> {
        let server = ctx.server_name();
        if !is_server_staff(user) {
            user.send(&NumericReply::no_privileges(server, user.nick()));
            return Ok(());
        }

        let Some(letter) = split_args(args, 2).first().and_then(|arg| Self::letter(arg)) else {
            user.send(&NumericReply::need_more_params(server, user.nick(), "STATS"));
            return Ok(());
        };

        tracing::debug!("{} requested STATS {}", user.nick(), letter);
        self.report(ctx, user, letter);
        user.send(&NumericReply::end_of_stats(server, user.nick(), letter));
        Ok(())
    }
}
