//! Tests for PRIVMSG and NOTICE handling

mod common;

use common::Harness;
use ferrircd_core::{ChannelRank, ModuleResult};

#[tokio::test]
async fn test_privmsg_parameter_errors() {
    let h = Harness::new().await;
    let mut alice = h.connect("alice");

    h.run(&alice, "PRIVMSG").await;
    h.run(&alice, "PRIVMSG bob").await;
    h.run(&alice, "PRIVMSG bob :").await;

    assert_eq!(
        alice.lines(),
        vec![
            ":irc.test 411 alice :No recipient given (PRIVMSG)".to_string(),
            ":irc.test 412 alice :No text to send".to_string(),
            ":irc.test 412 alice :No text to send".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_privmsg_keeps_spaces_in_text() {
    let h = Harness::new().await;
    let alice = h.connect("alice");
    let mut bob = h.connect("bob");

    let result = h.run(&alice, "PRIVMSG bob :hello  there :)").await;

    assert_eq!(result, ModuleResult::Handled);
    assert_eq!(bob.lines(), vec![":alice!alice@host.example PRIVMSG bob :hello  there :)".to_string()]);
}

#[tokio::test]
async fn test_moderated_channel_without_voice() {
    let h = Harness::new().await;
    let mut op = h.connect("op");
    let mut bob = h.connect("bob");
    let mut carol = h.connect("carol");
    h.join(&op, "#test", None);
    h.join(&bob, "#test", None);
    h.join(&carol, "#test", None);
    h.ctx.registry.channel("#test").unwrap().add_mode('m');

    h.run(&bob, "PRIVMSG #test :anyone?").await;

    assert_eq!(
        bob.lines(),
        vec![":irc.test 404 bob #test :Cannot send to channel (+m)".to_string()]
    );
    assert!(op.lines().is_empty());
    assert!(carol.lines().is_empty());
}

#[tokio::test]
async fn test_prefix_targeted_message() {
    let h = Harness::new().await;
    let mut op = h.connect("op");
    let mut other_op = h.connect("otherop");
    let mut voiced = h.connect("voiced");
    let mut plain = h.connect("plain");
    h.join(&op, "#test", None);
    h.join(&other_op, "#test", Some(ChannelRank::Operator));
    h.join(&voiced, "#test", Some(ChannelRank::Voice));
    h.join(&plain, "#test", None);

    h.run(&op, "PRIVMSG @#test :hello").await;

    assert_eq!(
        other_op.lines(),
        vec![":op!op@host.example PRIVMSG @#test :hello".to_string()]
    );
    assert!(voiced.lines().is_empty());
    assert!(plain.lines().is_empty());
    assert!(op.lines().is_empty());
}

#[tokio::test]
async fn test_founder_prefix_requires_founder_rank() {
    let h = Harness::new().await;
    let op = h.connect("op");
    let mut founder = h.connect("founder");
    let mut admin = h.connect("admin");
    h.join(&op, "#test", None);
    h.join(&founder, "#test", Some(ChannelRank::Founder));
    h.join(&admin, "#test", Some(ChannelRank::Administrator));

    h.run(&op, "PRIVMSG ~#test :founders").await;

    assert_eq!(founder.lines().len(), 1);
    assert_eq!(admin.lines().len(), 1);
}

#[tokio::test]
async fn test_notice_to_channel_and_silent_errors() {
    let h = Harness::new().await;
    let mut alice = h.connect("alice");
    let mut bob = h.connect("bob");
    h.join(&alice, "#test", None);
    h.join(&bob, "#test", None);

    h.run(&alice, "NOTICE #test,ghost :heads up").await;
    h.run(&alice, "NOTICE ghost").await;

    assert_eq!(bob.lines(), vec![":alice!alice@host.example NOTICE #test :heads up".to_string()]);
    assert!(alice.lines().is_empty());
}
