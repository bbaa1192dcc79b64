//! Minimal process-wide counters, reported in the server's disconnect
//! log lines.
use std::sync::atomic::{AtomicU64, Ordering};

static CONNECTIONS_OPENED: AtomicU64 = AtomicU64::new(0);
static CONNECTIONS_CLOSED: AtomicU64 = AtomicU64::new(0);
static COMMANDS_EXECUTED: AtomicU64 = AtomicU64::new(0);
static RESPONSES_DELIVERED: AtomicU64 = AtomicU64::new(0);

pub fn inc_connections_opened() {
    CONNECTIONS_OPENED.fetch_add(1, Ordering::Relaxed);
}

pub fn inc_connections_closed() {
    CONNECTIONS_CLOSED.fetch_add(1, Ordering::Relaxed);
}

pub fn inc_commands_executed() {
    COMMANDS_EXECUTED.fetch_add(1, Ordering::Relaxed);
}

pub fn inc_responses_delivered() {
    RESPONSES_DELIVERED.fetch_add(1, Ordering::Relaxed);
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub connections_opened: u64,
    pub connections_closed: u64,
    pub commands_executed: u64,
    pub responses_delivered: u64,
}

pub fn snapshot() -> MetricsSnapshot {
    MetricsSnapshot {
        connections_opened: CONNECTIONS_OPENED.load(Ordering::Relaxed),
        connections_closed: CONNECTIONS_CLOSED.load(Ordering::Relaxed),
        commands_executed: COMMANDS_EXECUTED.load(Ordering::Relaxed),
        responses_delivered: RESPONSES_DELIVERED.load(Ordering::Relaxed),
    }
}
