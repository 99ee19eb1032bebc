//! Statistics tracking system for IRC server

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Usage of a single command
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommandStats {
    /// Times the command was received
    pub count: u64,
    /// Bytes received in lines carrying the command
    pub bytes: u64,
}

/// Server-wide counters, safe to update from any connection task
#[derive(Debug)]
pub struct StatisticsManager {
    /// Server start time
    start_time: DateTime<Utc>,
    total_connections: AtomicU64,
    bytes_received: AtomicU64,
    bytes_sent: AtomicU64,
    /// Command usage statistics
    commands: DashMap<String, CommandStats>,
}

impl StatisticsManager {
    /// Create a new statistics manager
    pub fn new() -> Self {
        Self {
            start_time: Utc::now(),
            total_connections: AtomicU64::new(0),
            bytes_received: AtomicU64::new(0),
            bytes_sent: AtomicU64::new(0),
            commands: DashMap::new(),
        }
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        (Utc::now() - self.start_time).num_seconds().max(0) as u64
    }

    /// Record a new connection
    pub fn record_connection(&self) {
        self.total_connections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn total_connections(&self) -> u64 {
        self.total_connections.load(Ordering::Relaxed)
    }

    /// Record an inbound line of `bytes` bytes
    pub fn record_received(&self, bytes: usize) {
        self.bytes_received.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    /// Record a command received in a line of `bytes` bytes
    pub fn record_command(&self, command: &str, bytes: usize) {
        let mut entry = self.commands.entry(command.to_ascii_uppercase()).or_default();
        entry.count += 1;
        entry.bytes += bytes as u64;
    }

    /// Record an outbound line of `bytes` bytes
    pub fn record_sent(&self, bytes: usize) {
        self.bytes_sent.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    pub fn bytes_received(&self) -> u64 {
        self.bytes_received.load(Ordering::Relaxed)
    }

    pub fn bytes_sent(&self) -> u64 {
        self.bytes_sent.load(Ordering::Relaxed)
    }

    /// Usage of every command seen so far, sorted by name
    pub fn command_stats(&self) -> Vec<(String, CommandStats)> {
        let mut commands: Vec<_> = self
            .commands
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect();
        commands.sort_by(|a, b| a.0.cmp(&b.0));
        commands
    }
}

impl Default for StatisticsManager {
    fn default() -> Self {
        Self::new()
    }
}
