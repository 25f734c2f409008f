use lazy_static::lazy_static;
use prometheus::{
    Counter, CounterVec, Gauge, Histogram, register_counter, register_counter_vec,
    register_gauge, register_histogram,
};

lazy_static! {
    pub static ref REQUEST_TOTAL: Counter =
        register_counter!("relay_requests_total", "Total number of relay requests")
            .expect("register relay_requests_total");
    pub static ref SENT_TOTAL: Counter =
        register_counter!("relay_sent_total", "Messages accepted by Telegram")
            .expect("register relay_sent_total");
    pub static ref REJECTIONS: CounterVec = register_counter_vec!(
        "relay_rejections_total",
        "Relay requests that did not succeed, by reason",
        &["reason"]
    )
    .expect("register relay_rejections_total");
    pub static ref UPSTREAM_LATENCY: Histogram = register_histogram!(
        "relay_upstream_latency_seconds",
        "Telegram sendMessage latency in seconds"
    )
    .expect("register relay_upstream_latency_seconds");
    pub static ref RATE_LIMITER_ENTRIES: Gauge = register_gauge!(
        "relay_rate_limiter_entries",
        "Client identifiers currently tracked by the rate limiter"
    )
    .expect("register relay_rate_limiter_entries");
}
