//! Tests for PRIVMSG/NOTICE target resolution and channel fan-out

use ferrircd_core::*;
use std::sync::Arc;
use tokio::sync::mpsc;

struct Client {
    user: Arc<User>,
    rx: mpsc::UnboundedReceiver<Outbound>,
}

impl Client {
    fn lines(&mut self) -> Vec<String> {
        let mut lines = Vec::new();
        while let Ok(item) = self.rx.try_recv() {
            if let Outbound::Line(line) = item {
                lines.push(line);
            }
        }
        lines
    }
}

fn context() -> ModuleContext {
    let mut config = Config::default();
    config.server.name = "irc.test".to_string();
    ModuleContext::new(config)
}

fn connect(ctx: &ModuleContext, nick: &str) -> Client {
    let (tx, rx) = mpsc::unbounded_channel();
    let user = Arc::new(User::new(nick, nick, "host.example", "198.51.100.7", nick, tx));
    ctx.registry.add_user(user.clone()).unwrap();
    Client { user, rx }
}

#[test]
fn test_channel_message_reaches_other_members() {
    let ctx = context();
    let mut alice = connect(&ctx, "alice");
    let mut bob = connect(&ctx, "bob");
    let mut carol = connect(&ctx, "carol");
    ctx.registry.join_channel("#rust", &alice.user);
    ctx.registry.join_channel("#rust", &bob.user);
    ctx.registry.join_channel("#rust", &carol.user);

    let summary = Router::privmsg(&ctx).route(&alice.user, "#rust", "hello");

    assert_eq!(summary, RouteSummary { resolved: 1, delivered: 2, errors: 0 });
    assert_eq!(bob.lines(), vec![":alice!alice@host.example PRIVMSG #rust :hello".to_string()]);
    assert_eq!(carol.lines().len(), 1);
    assert!(alice.lines().is_empty());
}

#[test]
fn test_external_message_refused() {
    let ctx = context();
    let mut alice = connect(&ctx, "alice");
    let mut bob = connect(&ctx, "bob");
    ctx.registry.join_channel("#closed", &bob.user);

    let summary = Router::privmsg(&ctx).route(&alice.user, "#closed", "let me in");

    assert_eq!(summary.errors, 1);
    assert_eq!(
        alice.lines(),
        vec![":irc.test 404 alice #closed :Cannot send to channel (no external messages)".to_string()]
    );
    assert!(bob.lines().is_empty());

    // Without +n outsiders may speak
    ctx.registry.channel("#closed").unwrap().remove_mode('n');
    Router::privmsg(&ctx).route(&alice.user, "#closed", "hi");
    assert_eq!(bob.lines(), vec![":alice!alice@host.example PRIVMSG #closed :hi".to_string()]);
}

#[test]
fn test_moderated_channel_requires_voice() {
    let ctx = context();
    let mut op = connect(&ctx, "op");
    let mut talker = connect(&ctx, "talker");
    let channel = ctx.registry.join_channel("#quiet", &op.user).channel;
    ctx.registry.join_channel("#quiet", &talker.user);
    channel.add_mode('m');

    Router::privmsg(&ctx).route(&talker.user, "#quiet", "can I talk?");
    assert_eq!(
        talker.lines(),
        vec![":irc.test 404 talker #quiet :Cannot send to channel (+m)".to_string()]
    );
    assert!(op.lines().is_empty());

    talker.user.add_channel_rank("#quiet", ChannelRank::Voice);
    Router::privmsg(&ctx).route(&talker.user, "#quiet", "now I can");
    assert_eq!(op.lines().len(), 1);

    // Operators outrank voice
    Router::privmsg(&ctx).route(&op.user, "#quiet", "indeed");
    assert_eq!(talker.lines().len(), 1);
}

#[test]
fn test_status_prefix_targets_ranked_members() {
    let ctx = context();
    let mut alice = connect(&ctx, "alice");
    let mut op = connect(&ctx, "op");
    let mut halfop = connect(&ctx, "halfop");
    let mut plain = connect(&ctx, "plain");

    ctx.registry.join_channel("#staff", &op.user);
    ctx.registry.join_channel("#staff", &halfop.user);
    ctx.registry.join_channel("#staff", &plain.user);
    ctx.registry.join_channel("#staff", &alice.user);
    halfop.user.add_channel_rank("#staff", ChannelRank::HalfOperator);

    let summary = Router::privmsg(&ctx).route(&alice.user, "@#staff", "ops only");
    assert_eq!(summary.delivered, 1);
    assert_eq!(op.lines(), vec![":alice!alice@host.example PRIVMSG @#staff :ops only".to_string()]);
    assert!(halfop.lines().is_empty());

    Router::privmsg(&ctx).route(&alice.user, "%#staff", "halfops and up");
    assert_eq!(op.lines().len(), 1);
    assert_eq!(halfop.lines().len(), 1);
    assert!(plain.lines().is_empty());
    assert!(alice.lines().is_empty());
}

#[test]
fn test_target_errors() {
    let ctx = context();
    let mut alice = connect(&ctx, "alice");

    let summary = Router::privmsg(&ctx).route(&alice.user, "nobody,#missing,#bad!name", "hi");

    assert_eq!(summary, RouteSummary { resolved: 0, delivered: 0, errors: 3 });
    assert_eq!(
        alice.lines(),
        vec![
            ":irc.test 401 alice nobody :No such nick/channel".to_string(),
            ":irc.test 403 alice #missing :No such channel".to_string(),
            ":irc.test 403 alice #bad!name :No such channel".to_string(),
        ]
    );
}

#[test]
fn test_target_limit() {
    let ctx = context();
    let mut alice = connect(&ctx, "alice");
    let mut others: Vec<Client> = ["b1", "b2", "b3", "b4", "b5"].iter().map(|n| connect(&ctx, n)).collect();

    let summary = Router::privmsg(&ctx).route(&alice.user, "b1,,b2,b3,b4,b5", "spam");

    assert_eq!(summary.resolved, 4);
    assert_eq!(summary.delivered, 4);
    assert_eq!(alice.lines(), vec![":irc.test 407 alice b5 :Too many targets".to_string()]);
    assert!(others[4].lines().is_empty());
    assert_eq!(others[0].lines(), vec![":alice!alice@host.example PRIVMSG b1 :spam".to_string()]);
}

#[test]
fn test_private_message_uses_recipient_nick() {
    let ctx = context();
    let alice = connect(&ctx, "alice");
    let mut bob = connect(&ctx, "Bob");

    Router::privmsg(&ctx).route(&alice.user, "BOB", "hey");
    assert_eq!(bob.lines(), vec![":alice!alice@host.example PRIVMSG Bob :hey".to_string()]);
}

#[test]
fn test_notice_never_replies_with_errors() {
    let ctx = context();
    let mut alice = connect(&ctx, "alice");
    let mut bob = connect(&ctx, "bob");

    let summary = Router::notice(&ctx).route(&alice.user, "nobody,#missing,bob", "ping");

    assert_eq!(summary.errors, 0);
    assert!(alice.lines().is_empty());
    assert_eq!(bob.lines(), vec![":alice!alice@host.example NOTICE bob :ping".to_string()]);
}
