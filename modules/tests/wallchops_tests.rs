//! Tests for the WALLCHOPS command

mod common;

use common::Harness;
use ferrircd_core::ChannelRank;

#[tokio::test]
async fn test_wallchops_reaches_other_operators_only() {
    let h = Harness::new().await;
    let mut x = h.connect("x");
    let mut second = h.connect("second");
    let mut y = h.connect("y");
    let mut z = h.connect("z");
    h.join(&x, "#test", None);
    h.join(&y, "#test", None);
    h.join(&z, "#test", Some(ChannelRank::Voice));

    // X is the sole operator and is excluded
    h.run(&x, "WALLCHOPS #test :ops meeting").await;
    assert!(x.lines().is_empty());
    assert!(y.lines().is_empty());
    assert!(z.lines().is_empty());

    h.join(&second, "#test", Some(ChannelRank::Operator));
    h.run(&x, "WALLCHOPS #test :ops meeting").await;

    assert_eq!(
        second.lines(),
        vec![":x!x@host.example NOTICE @#test :ops meeting".to_string()]
    );
    assert!(y.lines().is_empty());
    assert!(z.lines().is_empty());
    assert!(x.lines().is_empty());
}

#[tokio::test]
async fn test_wallchops_from_outside() {
    let h = Harness::new().await;
    let mut op = h.connect("op");
    let mut outsider = h.connect("outsider");
    h.join(&op, "#test", None);

    h.run(&outsider, "WALLCHOPS #test :let me in").await;
    assert_eq!(
        outsider.lines(),
        vec![":irc.test 404 outsider #test :Cannot send to channel (no external messages)".to_string()]
    );
    assert!(op.lines().is_empty());

    h.ctx.registry.channel("#test").unwrap().remove_mode('n');
    h.run(&outsider, "WALLCHOPS #test :knock knock").await;
    assert_eq!(
        op.lines(),
        vec![":outsider!outsider@host.example NOTICE @#test :knock knock".to_string()]
    );
}

#[tokio::test]
async fn test_wallchops_errors() {
    let h = Harness::new().await;
    let mut alice = h.connect("alice");

    h.run(&alice, "WALLCHOPS").await;
    h.run(&alice, "WALLCHOPS #test").await;
    h.run(&alice, "WALLCHOPS bad :text").await;
    h.run(&alice, "WALLCHOPS #missing :text").await;

    assert_eq!(
        alice.lines(),
        vec![
            ":irc.test 411 alice :No recipient given (WALLCHOPS)".to_string(),
            ":irc.test 412 alice :No text to send".to_string(),
            ":irc.test 403 alice bad :No such channel".to_string(),
            ":irc.test 403 alice #missing :No such channel".to_string(),
        ]
    );
}
