//! Tests for connection registration and command dispatch

#[cfg(test)]
mod tests {
    use crate::{
        async_trait, CommandHandler, CommandTable, Config, Connection, LineOutcome, ModuleContext, Outbound, Result,
        User,
    };
    use std::net::SocketAddr;
    use std::sync::Arc;
    use tokio::sync::mpsc;

    fn connection(ctx: &Arc<ModuleContext>, commands: &Arc<CommandTable>) -> (Connection, mpsc::UnboundedReceiver<Outbound>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let addr: SocketAddr = "192.0.2.10:40000".parse().unwrap();
        (Connection::new(ctx.clone(), commands.clone(), addr, tx), rx)
    }

    fn lines(rx: &mut mpsc::UnboundedReceiver<Outbound>) -> Vec<String> {
        let mut lines = Vec::new();
        while let Ok(item) = rx.try_recv() {
            if let Outbound::Line(line) = item {
                lines.push(line);
            }
        }
        lines
    }

    fn context() -> Arc<ModuleContext> {
        let mut config = Config::default();
        config.server.name = "irc.test".to_string();
        Arc::new(ModuleContext::new(config))
    }

    struct Echo;

    #[async_trait]
    impl CommandHandler for Echo {
        fn name(&self) -> &str {
            "ECHO"
        }

        async fn handle(&self, _ctx: &ModuleContext, user: &Arc<User>, args: &str) -> Result<()> {
            user.send_line(format!("ECHO {}", args));
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_registration_sends_welcome() {
        let ctx = context();
        let commands = Arc::new(CommandTable::new());
        let (mut conn, mut rx) = connection(&ctx, &commands);

        conn.handle_line("NICK alice").await.unwrap();
        assert!(conn.user().is_none());
        conn.handle_line("USER al 0 * :Alice Liddell").await.unwrap();

        let user = conn.user().expect("registered");
        assert_eq!(user.mask(), "alice!al@192.0.2.10");
        assert_eq!(user.realname(), "Alice Liddell");
        assert!(ctx.registry.find_user("ALICE").is_some());

        let sent = lines(&mut rx);
        assert_eq!(sent.len(), 4);
        assert!(sent[0].starts_with(":irc.test 001 alice :Welcome"));
        assert!(sent[3].starts_with(":irc.test 004 alice irc.test"));
    }

    #[tokio::test]
    async fn test_commands_before_registration() {
        let ctx = context();
        let commands = Arc::new(CommandTable::new());
        commands.register(Arc::new(Echo));
        let (mut conn, mut rx) = connection(&ctx, &commands);

        conn.handle_line("ECHO hi").await.unwrap();
        conn.handle_line("PING :token").await.unwrap();

        let sent = lines(&mut rx);
        assert_eq!(sent[0], ":irc.test 451 * :You have not registered");
        assert_eq!(sent[1], ":irc.test PONG irc.test :token");
    }

    #[tokio::test]
    async fn test_nickname_errors() {
        let ctx = context();
        let commands = Arc::new(CommandTable::new());

        let (mut first, _rx1) = connection(&ctx, &commands);
        first.handle_line("NICK taken").await.unwrap();
        first.handle_line("USER t 0 * :T").await.unwrap();

        let (mut second, mut rx) = connection(&ctx, &commands);
        second.handle_line("NICK TAKEN").await.unwrap();
        second.handle_line("NICK 9lives").await.unwrap();
        second.handle_line("NICK").await.unwrap();

        let sent = lines(&mut rx);
        assert_eq!(sent[0], ":irc.test 433 * TAKEN :Nickname is already in use");
        assert_eq!(sent[1], ":irc.test 432 * 9lives :Erroneous nickname");
        assert_eq!(sent[2], ":irc.test 431 * :No nickname given");
    }

    #[tokio::test]
    async fn test_dispatch_and_unknown_commands() {
        let ctx = context();
        let commands = Arc::new(CommandTable::new());
        commands.register(Arc::new(Echo));
        let (mut conn, mut rx) = connection(&ctx, &commands);
        conn.handle_line("NICK bob").await.unwrap();
        conn.handle_line("USER bob 0 * :Bob").await.unwrap();
        lines(&mut rx);

        conn.handle_line("echo hello there").await.unwrap();
        conn.handle_line("FROB").await.unwrap();
        conn.handle_line("NICK other").await.unwrap();

        let sent = lines(&mut rx);
        assert_eq!(sent[0], "ECHO hello there");
        assert_eq!(sent[1], ":irc.test 421 bob FROB :Unknown command");
        assert_eq!(sent[2], ":irc.test 462 bob :You may not reregister");

        let stats = ctx.statistics.command_stats();
        assert!(stats.iter().any(|(name, s)| name == "ECHO" && s.count == 1));
    }

    #[tokio::test]
    async fn test_quit_leaves_registry() {
        let ctx = context();
        let commands = Arc::new(CommandTable::new());
        let (mut conn, mut rx) = connection(&ctx, &commands);
        conn.handle_line("NICK carol").await.unwrap();
        conn.handle_line("USER carol 0 * :Carol").await.unwrap();
        lines(&mut rx);

        let outcome = conn.handle_line("QUIT :gone fishing").await.unwrap();
        assert_eq!(outcome, LineOutcome::Quit("Quit: gone fishing".to_string()));
        conn.finish("Quit: gone fishing");

        assert!(ctx.registry.find_user("carol").is_none());
        let sent = lines(&mut rx);
        assert_eq!(sent, vec!["ERROR :Closing link: 192.0.2.10 (Quit: gone fishing)".to_string()]);
    }

    #[tokio::test]
    async fn test_unregister_removes_handler() {
        let ctx = context();
        let commands = Arc::new(CommandTable::new());
        commands.register(Arc::new(Echo));
        assert_eq!(commands.commands(), vec!["ECHO".to_string()]);
        assert!(commands.unregister("echo").is_some());
        assert!(!commands.contains("ECHO"));

        let (mut conn, mut rx) = connection(&ctx, &commands);
        conn.handle_line("NICK dave").await.unwrap();
        conn.handle_line("USER dave 0 * :Dave").await.unwrap();
        lines(&mut rx);
        conn.handle_line("ECHO x").await.unwrap();
        assert_eq!(lines(&mut rx), vec![":irc.test 421 dave ECHO :Unknown command".to_string()]);
    }
}
