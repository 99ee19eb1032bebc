//! Tests for channel state: modes, bans, topic and membership

use ferrircd_core::*;
use std::sync::Arc;
use tokio::sync::mpsc;

fn user(nick: &str) -> Arc<User> {
    let (tx, _rx) = mpsc::unbounded_channel();
    Arc::new(User::new(nick, nick.to_lowercase(), "host.example", "198.51.100.7", nick, tx))
}

#[test]
fn test_new_channel_defaults() {
    let founder = user("alice");
    let channel = Channel::new("#Rust", Some(&founder));

    assert_eq!(channel.name(), "#Rust");
    assert_eq!(channel.key(), "#RUST");
    assert_eq!(channel.founder(), Some("alice"));
    assert_eq!(channel.modes_string(), "+nt");
    assert!(channel.is_empty());
    assert!(channel.topic().text.is_empty());
}

#[test]
fn test_mode_set_semantics() {
    let channel = Channel::new("#modes", None);

    assert!(channel.add_mode('m'));
    assert!(!channel.add_mode('m'));
    assert!(!channel.add_mode('Q'));
    assert!(!channel.add_mode('k'));
    assert!(channel.has_mode('m'));

    assert!(channel.remove_mode('m'));
    assert!(!channel.remove_mode('m'));

    channel.clear_modes();
    assert_eq!(channel.modes_string(), "+");
}

#[test]
fn test_key_and_limit_follow_modes() {
    let channel = Channel::new("#locked", None);

    channel.set_key(Some("sesame"));
    channel.set_limit(Some(2));
    assert!(channel.has_mode('k'));
    assert!(channel.has_mode('l'));
    assert_eq!(channel.channel_key().as_deref(), Some("sesame"));
    assert_eq!(channel.limit(), Some(2));

    channel.remove_mode('k');
    assert_eq!(channel.channel_key(), None);
    channel.set_limit(None);
    assert!(!channel.has_mode('l'));
    assert_eq!(channel.limit(), None);
}

#[test]
fn test_registered_flag() {
    let channel = Channel::new("#reg", None);
    channel.set_registered(true);
    assert!(channel.is_registered());
    assert!(channel.has_mode('r'));
    channel.set_registered(false);
    assert!(!channel.is_registered());
}

#[test]
fn test_bans_match_masks() {
    let channel = Channel::new("#bans", None);
    let bob = user("bob");

    channel.add_ban("alice", "bob!*@*", "spam");
    channel.add_ban("alice", "bob!*@*", "again");
    channel.add_ban("alice", "*!*@other.example", "");
    assert_eq!(channel.bans().len(), 3);
    assert!(channel.is_banned(&bob));

    channel.remove_ban("bob!*@*");
    assert_eq!(channel.bans().len(), 1);
    assert!(!channel.is_banned(&bob));
}

#[test]
fn test_topic_records_author() {
    let alice = user("alice");
    let channel = Channel::new("#topic", None);

    channel.set_topic(&alice, "Welcome aboard");
    let topic = channel.topic();
    assert_eq!(topic.text, "Welcome aboard");
    assert_eq!(topic.author, "alice!alice@host.example");
    assert!(topic.set_at.is_some());

    channel.clear_topic();
    assert!(channel.topic().text.is_empty());
    assert!(channel.topic().set_at.is_none());
}

#[test]
fn test_visible_and_invisible_members_are_disjoint() {
    let channel = Channel::new("#members", None);
    let alice = user("alice");
    let ghost = user("ghost");

    channel.add_user(alice.clone());
    channel.add_invisible_user(ghost.clone());
    assert!(channel.nick_in_channel("ALICE"));
    assert!(channel.invisible_nick_in_channel("ghost"));
    assert!(!channel.nick_in_channel("ghost"));

    // Moving a member between lists leaves exactly one entry
    channel.add_user(ghost.clone());
    assert!(channel.nick_in_channel("ghost"));
    assert!(!channel.invisible_nick_in_channel("ghost"));
    assert_eq!(channel.member_count(), 2);

    channel.add_user(alice.clone());
    assert_eq!(channel.members().len(), 2);

    channel.remove_member(&alice);
    channel.remove_member(&ghost);
    assert!(channel.is_empty());
}

#[test]
fn test_channel_names() {
    assert!(valid_channel_name("#rust"));
    assert!(valid_channel_name("#a-b_c9"));
    assert!(valid_channel_name("#"));
    assert!(!valid_channel_name("rust"));
    assert!(!valid_channel_name("#bad name"));
    assert!(!valid_channel_name("#bad!"));
    assert!(!valid_channel_name("&local"));
}
