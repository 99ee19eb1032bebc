//! Client connection handling
//!
//! Each accepted socket gets a reader loop (this module's [`serve`]) and a
//! writer task draining the connection's outbound queue. The reader
//! handles registration, PING and QUIT itself and hands every other
//! command to the [`CommandTable`].

use crate::message::{CommandLine, Message, MessageType, Prefix};
use crate::module::{CommandTable, ModuleContext, ModuleResult};
use crate::numeric::NumericReply;
use crate::statistics::StatisticsManager;
use crate::user::{Outbound, User};
use crate::utils::string::{is_valid_ident, is_valid_nickname, split_args, strip_colon};
use crate::channel::CHANNEL_MODES;
use crate::Result;
use futures_util::StreamExt;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_util::codec::{FramedRead, LinesCodec, LinesCodecError};

/// User modes advertised in RPL_MYINFO
const USER_MODES: &str = "aos";

/// What the reader loop should do after a line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    Continue,
    /// The client sent QUIT
    Quit(String),
}

#[derive(Debug, Default)]
struct Registration {
    nick: Option<String>,
    ident: Option<String>,
    realname: Option<String>,
}

/// Per-connection protocol state
pub struct Connection {
    ctx: Arc<ModuleContext>,
    commands: Arc<CommandTable>,
    addr: SocketAddr,
    sender: mpsc::UnboundedSender<Outbound>,
    registration: Registration,
    user: Option<Arc<User>>,
}

impl Connection {
    pub fn new(
        ctx: Arc<ModuleContext>,
        commands: Arc<CommandTable>,
        addr: SocketAddr,
        sender: mpsc::UnboundedSender<Outbound>,
    ) -> Self {
        Self {
            ctx,
            commands,
            addr,
            sender,
            registration: Registration::default(),
            user: None,
        }
    }

    /// The registered user, once NICK and USER have completed
    pub fn user(&self) -> Option<&Arc<User>> {
        self.user.as_ref()
    }

    /// Process one inbound line
    pub async fn handle_line(&mut self, raw: &str) -> Result<LineOutcome> {
        self.ctx.statistics.record_received(raw.len() + 2);
        if raw.trim().is_empty() {
            return Ok(LineOutcome::Continue);
        }

        let line = CommandLine::parse(raw)?;
        self.ctx.statistics.record_command(&line.command, raw.len() + 2);
        if let Some(ref user) = self.user {
            user.touch();
        }

        match line.message_type() {
            MessageType::Nick => self.handle_nick(&line.args),
            MessageType::User => self.handle_user(&line.args),
            MessageType::Ping => self.handle_ping(&line.args),
            MessageType::Pong => {}
            MessageType::Quit => return Ok(LineOutcome::Quit(self.handle_quit(&line.args))),
            _ => self.dispatch(&line).await?,
        }

        Ok(LineOutcome::Continue)
    }

    async fn dispatch(&self, line: &CommandLine) -> Result<()> {
        let Some(ref user) = self.user else {
            self.reply(NumericReply::not_registered(self.ctx.server_name(), "*"));
            return Ok(());
        };

        tracing::debug!("{} issued {}", user.nick(), line.command);
        match self.commands.dispatch(&self.ctx, user, line).await {
            Ok(ModuleResult::Handled) => Ok(()),
            Ok(ModuleResult::NotHandled) => {
                user.send(&NumericReply::unknown_command(self.ctx.server_name(), user.nick(), &line.command));
                Ok(())
            }
            Err(e) => {
                tracing::error!("Error handling {} from {}: {}", line.command, user.nick(), e);
                Err(e)
            }
        }
    }

    fn current_nick(&self) -> &str {
        match (&self.user, &self.registration.nick) {
            (Some(user), _) => user.nick(),
            (None, Some(nick)) => nick,
            (None, None) => "*",
        }
    }

    fn reply(&self, message: Message) {
        let _ = self.sender.send(Outbound::Line(message.to_string()));
    }

    fn handle_nick(&mut self, args: &str) {
        let server = self.ctx.server_name();
        if self.user.is_some() {
            self.reply(NumericReply::already_registered(server, self.current_nick()));
            return;
        }

        let Some(nick) = split_args(args, 2)
            .into_iter()
            .next()
            .map(strip_colon)
            .filter(|nick| !nick.is_empty())
        else {
            self.reply(NumericReply::no_nickname_given(server, self.current_nick()));
            return;
        };
        if !is_valid_nickname(nick, self.ctx.limits().nick_length) {
            self.reply(NumericReply::erroneous_nickname(server, self.current_nick(), nick));
            return;
        }
        if self.ctx.registry.find_user(nick).is_some() {
            self.reply(NumericReply::nickname_in_use(server, self.current_nick(), nick));
            return;
        }

        self.registration.nick = Some(nick.to_string());
        self.try_register();
    }

    fn handle_user(&mut self, args: &str) {
        let server = self.ctx.server_name();
        if self.user.is_some() {
            self.reply(NumericReply::already_registered(server, self.current_nick()));
            return;
        }

        let parts = split_args(args, 4);
        if parts.len() < 4 || !is_valid_ident(parts[0]) {
            self.reply(NumericReply::need_more_params(server, self.current_nick(), "USER"));
            return;
        }

        self.registration.ident = Some(parts[0].to_string());
        self.registration.realname = Some(strip_colon(parts[3]).to_string());
        self.try_register();
    }

    fn try_register(&mut self) {
        let (Some(nick), Some(ident), Some(realname)) = (
            self.registration.nick.clone(),
            self.registration.ident.clone(),
            self.registration.realname.clone(),
        ) else {
            return;
        };

        let ip = self.addr.ip().to_string();
        let user = Arc::new(User::new(nick.as_str(), ident, ip.as_str(), ip.as_str(), realname, self.sender.clone()));
        if let Err(e) = self.ctx.registry.add_user(user.clone()) {
            tracing::debug!("Registration from {} failed: {}", self.addr, e);
            self.reply(NumericReply::nickname_in_use(self.ctx.server_name(), "*", &nick));
            self.registration.nick = None;
            return;
        }

        tracing::info!("Client {} registered from {}", user.mask(), self.addr);
        self.send_welcome(&user);
        self.user = Some(user);
    }

    fn send_welcome(&self, user: &User) {
        let config = &self.ctx.config.server;
        let server = config.name.as_str();
        let created = self.ctx.statistics.start_time().format("%Y-%m-%d %H:%M:%S UTC").to_string();

        user.send(&NumericReply::welcome(server, user.nick(), &config.network, &user.mask()));
        user.send(&NumericReply::your_host(server, user.nick(), &config.version));
        user.send(&NumericReply::created(server, user.nick(), &created));
        user.send(&NumericReply::my_info(server, user.nick(), &config.version, USER_MODES, CHANNEL_MODES));
    }

    fn handle_ping(&self, args: &str) {
        let server = self.ctx.server_name();
        let token = strip_colon(args.trim());
        if token.is_empty() {
            self.reply(NumericReply::need_more_params(server, self.current_nick(), "PING"));
            return;
        }
        let pong = Message::with_prefix(
            Prefix::Server(server.to_string()),
            MessageType::Pong,
            vec![server.to_string()],
        )
        .trailing(token);
        self.reply(pong);
    }

    /// Answer QUIT and return the quit reason
    fn handle_quit(&mut self, args: &str) -> String {
        let text = strip_colon(args.trim());
        let reason = if text.is_empty() {
            "Client Quit".to_string()
        } else {
            format!("Quit: {}", text)
        };

        let host = self
            .user
            .as_ref()
            .map(|u| u.hostname().to_string())
            .unwrap_or_else(|| self.addr.ip().to_string());
        self.reply(
            Message::new(MessageType::Error, Vec::new()).trailing(format!("Closing link: {} ({})", host, reason)),
        );
        reason
    }

    /// Leave every channel, broadcasting `reason`, and drop out of the registry
    pub fn finish(&mut self, reason: &str) {
        if let Some(user) = self.user.take() {
            self.ctx.registry.disconnect(&user, Some(reason));
        }
        let _ = self.sender.send(Outbound::Close(reason.to_string()));
    }
}

/// Drain the outbound queue onto the socket until a close marker arrives
async fn write_loop(
    mut writer: OwnedWriteHalf,
    mut receiver: mpsc::UnboundedReceiver<Outbound>,
    statistics: Arc<StatisticsManager>,
) {
    while let Some(item) = receiver.recv().await {
        match item {
            Outbound::Line(line) => {
                let data = format!("{}\r\n", line);
                if let Err(e) = writer.write_all(data.as_bytes()).await {
                    tracing::debug!("Write failed: {}", e);
                    break;
                }
                statistics.record_sent(data.len());
            }
            Outbound::Close(reason) => {
                tracing::debug!("Closing connection: {}", reason);
                break;
            }
        }
    }
    let _ = writer.shutdown().await;
}

/// Serve one client until it quits, disconnects or is closed by the server
pub async fn serve(ctx: Arc<ModuleContext>, commands: Arc<CommandTable>, stream: TcpStream, addr: SocketAddr) {
    ctx.statistics.record_connection();
    let (reader, writer) = stream.into_split();
    let (sender, receiver) = mpsc::unbounded_channel();
    let mut writer_task = tokio::spawn(write_loop(writer, receiver, ctx.statistics.clone()));
    let mut writer_done = false;

    let mut lines = FramedRead::new(reader, LinesCodec::new_with_max_length(ctx.config.connection.max_line_length));
    let mut connection = Connection::new(ctx, commands, addr, sender);

    let reason = loop {
        tokio::select! {
            frame = lines.next() => match frame {
                Some(Ok(line)) => match connection.handle_line(&line).await {
                    Ok(LineOutcome::Continue) => {}
                    Ok(LineOutcome::Quit(reason)) => break reason,
                    Err(e) => tracing::debug!("Ignoring line from {}: {}", addr, e),
                },
                Some(Err(LinesCodecError::MaxLineLengthExceeded)) => {
                    tracing::debug!("Discarding overlong line from {}", addr);
                }
                Some(Err(LinesCodecError::Io(e))) => break format!("Read error: {}", e),
                None => break "Connection closed".to_string(),
            },
            _ = &mut writer_task => {
                writer_done = true;
                break "Connection closed".to_string();
            }
        }
    };

    connection.finish(&reason);
    drop(connection);
    if !writer_done {
        let _ = writer_task.await;
    }
    tracing::debug!("Connection from {} finished: {}", addr, reason);
}
