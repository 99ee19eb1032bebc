//! Performance benchmarks for ferrircd core

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ferrircd_core::routing::broadcast_to_channel;
use ferrircd_core::*;
use std::sync::Arc;
use tokio::sync::mpsc;

fn benchmark_command_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("command_parsing");

    let lines = vec![
        "NICK alice",
        "USER alice 0 * :Alice Wonderland",
        ":alice PRIVMSG #channel,@#ops,bob :Hello world",
        "KICK #channel bob,carol :Flooding",
        "STATS c",
    ];

    for line in lines {
        group.bench_with_input(BenchmarkId::from_parameter(line), line, |b, line| {
            b.iter(|| CommandLine::parse(black_box(line)))
        });
    }

    group.finish();
}

fn benchmark_message_formatting(c: &mut Criterion) {
    let mut group = c.benchmark_group("message_formatting");

    let privmsg = Message::with_prefix(
        Prefix::User {
            nick: "alice".to_string(),
            ident: "alice".to_string(),
            host: "host.example".to_string(),
        },
        MessageType::PrivMsg,
        vec!["#channel".to_string()],
    )
    .trailing("Hello world");
    let numeric = NumericReply::no_such_nick("irc.example.org", "alice", "bob");

    group.bench_function("privmsg", |b| b.iter(|| black_box(&privmsg).to_string()));
    group.bench_function("numeric", |b| b.iter(|| black_box(&numeric).to_string()));

    group.finish();
}

fn benchmark_channel_fanout(c: &mut Criterion) {
    let mut group = c.benchmark_group("channel_fanout");

    for size in [10usize, 100, 1000] {
        let registry = Registry::new();
        let mut receivers = Vec::with_capacity(size);
        let mut channel = None;
        for i in 0..size {
            let (tx, rx) = mpsc::unbounded_channel();
            let user = Arc::new(User::new(format!("user{}", i), "ident", "host", "127.0.0.1", "bench", tx));
            channel = Some(registry.join_channel("#bench", &user).channel);
            receivers.push(rx);
        }
        let Some(channel) = channel else { continue };
        let message = Message::new(MessageType::Notice, vec!["#bench".to_string()]).trailing("fan-out");

        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                let delivered = broadcast_to_channel(&channel, black_box(&message), None);
                for rx in receivers.iter_mut() {
                    while rx.try_recv().is_ok() {}
                }
                delivered
            })
        });
    }

    group.finish();
}

fn benchmark_mask_matching(c: &mut Criterion) {
    use ferrircd_core::utils::string::matches_mask;

    c.bench_function("matches_mask", |b| {
        b.iter(|| {
            matches_mask(
                black_box("*!*@*.example.org"),
                black_box("someone!ident@very.long.hostname.example.org"),
            )
        })
    });
}

criterion_group!(
    benches,
    benchmark_command_parsing,
    benchmark_message_formatting,
    benchmark_channel_fanout,
    benchmark_mask_matching
);
criterion_main!(benches);
