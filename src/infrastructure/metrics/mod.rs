//! Prometheus Metrics Module
//!
//! Provides gateway-wide metrics collection using Prometheus.
//!
//! # Metrics Collected
//! - Live WebSocket connections and online users
//! - Envelopes enqueued and dropped per channel
//! - Transport write failures

use once_cell::sync::Lazy;
use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

/// Global metrics registry
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

/// Live WebSocket connections across all users
pub static WEBSOCKET_CONNECTIONS_ACTIVE: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::with_opts(
        Opts::new(
            "websocket_connections_active",
            "Number of live WebSocket connections",
        )
        .namespace("social_fanout"),
    )
    .expect("Failed to create WEBSOCKET_CONNECTIONS_ACTIVE metric")
});

/// Users with at least one live connection
pub static WEBSOCKET_USERS_ONLINE: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::with_opts(
        Opts::new(
            "websocket_users_online",
            "Number of users with at least one live connection",
        )
        .namespace("social_fanout"),
    )
    .expect("Failed to create WEBSOCKET_USERS_ONLINE metric")
});

/// Envelopes accepted onto a connection queue
pub static ENVELOPES_ENQUEUED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "envelopes_enqueued_total",
            "Envelopes accepted onto a connection send queue",
        )
        .namespace("social_fanout"),
        &["channel"],
    )
    .expect("Failed to create ENVELOPES_ENQUEUED_TOTAL metric")
});

/// Envelopes evicted from a full queue
pub static ENVELOPES_DROPPED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "envelopes_dropped_total",
            "Envelopes evicted from a full connection send queue",
        )
        .namespace("social_fanout"),
        &["channel"],
    )
    .expect("Failed to create ENVELOPES_DROPPED_TOTAL metric")
});

/// Failed frame writes (each one tears its connection down)
pub static WEBSOCKET_WRITE_FAILURES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::with_opts(
        Opts::new(
            "websocket_write_failures_total",
            "WebSocket frame writes that failed and closed their connection",
        )
        .namespace("social_fanout"),
    )
    .expect("Failed to create WEBSOCKET_WRITE_FAILURES_TOTAL metric")
});

/// Register all metrics with the registry
fn register_metrics(registry: &Registry) {
    registry
        .register(Box::new(WEBSOCKET_CONNECTIONS_ACTIVE.clone()))
        .expect("Failed to register WEBSOCKET_CONNECTIONS_ACTIVE");
    registry
        .register(Box::new(WEBSOCKET_USERS_ONLINE.clone()))
        .expect("Failed to register WEBSOCKET_USERS_ONLINE");
    registry
        .register(Box::new(ENVELOPES_ENQUEUED_TOTAL.clone()))
        .expect("Failed to register ENVELOPES_ENQUEUED_TOTAL");
    registry
        .register(Box::new(ENVELOPES_DROPPED_TOTAL.clone()))
        .expect("Failed to register ENVELOPES_DROPPED_TOTAL");
    registry
        .register(Box::new(WEBSOCKET_WRITE_FAILURES_TOTAL.clone()))
        .expect("Failed to register WEBSOCKET_WRITE_FAILURES_TOTAL");
}

/// Collect and encode all metrics as Prometheus text format
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

/// Helper to publish registry occupancy
pub fn set_live_counts(connections: usize, users: usize) {
    WEBSOCKET_CONNECTIONS_ACTIVE.set(connections as i64);
    WEBSOCKET_USERS_ONLINE.set(users as i64);
}

/// Helper to record a queued envelope
pub fn record_enqueued(channel: &str) {
    ENVELOPES_ENQUEUED_TOTAL.with_label_values(&[channel]).inc();
}

/// Helper to record an envelope evicted by the overflow policy
pub fn record_dropped(channel: &str) {
    ENVELOPES_DROPPED_TOTAL.with_label_values(&[channel]).inc();
}

/// Helper to record a failed transport write
pub fn record_write_failure() {
    WEBSOCKET_WRITE_FAILURES_TOTAL.inc();
}
