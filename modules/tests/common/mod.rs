//! Shared helpers for command module tests

#![allow(dead_code)]

use ferrircd_core::{
    ChannelRank, CommandLine, CommandTable, Config, ModuleContext, ModuleManager, ModuleResult, OperatorConfig,
    Outbound, User,
};
use ferrircd_modules::{OptionalModule, StandardModule};
use std::sync::Arc;
use tokio::sync::mpsc;

pub const SERVER: &str = "irc.test";

/// A registered user and the receiving end of their outbound queue
pub struct Client {
    pub user: Arc<User>,
    rx: mpsc::UnboundedReceiver<Outbound>,
}

impl Client {
    /// Everything queued since the last drain
    pub fn outbound(&mut self) -> Vec<Outbound> {
        let mut items = Vec::new();
        while let Ok(item) = self.rx.try_recv() {
            items.push(item);
        }
        items
    }

    /// Protocol lines queued since the last drain
    pub fn lines(&mut self) -> Vec<String> {
        self.outbound()
            .into_iter()
            .filter_map(|item| match item {
                Outbound::Line(line) => Some(line),
                Outbound::Close(_) => None,
            })
            .collect()
    }
}

/// Server state with both command modules loaded
pub struct Harness {
    pub ctx: ModuleContext,
    pub commands: CommandTable,
    modules: ModuleManager,
}

impl Harness {
    pub async fn new() -> Self {
        let mut config = Config::default();
        config.server.name = SERVER.to_string();
        config.operators = vec![
            OperatorConfig::new("oper", "operpass", "*@*", false),
            OperatorConfig::new("admin", "adminpass", "*@trusted.example", true),
        ];
        Self::with_config(config).await
    }

    pub async fn with_config(config: Config) -> Self {
        let ctx = ModuleContext::new(config);
        let commands = CommandTable::new();
        let mut modules = ModuleManager::new();
        modules
            .load_module(Box::new(StandardModule::new()), &commands)
            .await
            .unwrap();
        modules
            .load_module(Box::new(OptionalModule::new()), &commands)
            .await
            .unwrap();
        Self { ctx, commands, modules }
    }

    pub async fn unload(&mut self, module: &str) -> ferrircd_core::Result<()> {
        self.modules.unload_module(module, &self.commands).await
    }

    /// Register a user connecting from `host.example`
    pub fn connect(&self, nick: &str) -> Client {
        self.connect_from(nick, "host.example")
    }

    pub fn connect_from(&self, nick: &str, host: &str) -> Client {
        let (tx, rx) = mpsc::unbounded_channel();
        let user = Arc::new(User::new(nick, nick, host, "198.51.100.7", nick, tx));
        self.ctx.registry.add_user(user.clone()).unwrap();
        Client { user, rx }
    }

    /// Join `client` to `channel` and grant `rank` if given
    pub fn join(&self, client: &Client, channel: &str, rank: Option<ChannelRank>) {
        self.ctx.registry.join_channel(channel, &client.user);
        if let Some(rank) = rank {
            client.user.add_channel_rank(channel, rank);
        }
    }

    /// Dispatch one command line from `client`
    pub async fn run(&self, client: &Client, line: &str) -> ModuleResult {
        let line = CommandLine::parse(line).unwrap();
        self.commands
            .dispatch(&self.ctx, &client.user, &line)
            .await
            .unwrap()
    }
}
