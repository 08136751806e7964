use lazy_static::lazy_static;
use prometheus::{Counter, Gauge, Histogram, register_counter, register_gauge, register_histogram};


lazy_static! {
    pub static ref REQUEST_TOTAL: Counter =
        register_counter!("cacao_requests_total", "Total number of requests").unwrap();
    pub static ref CACHE_HITS: Counter =
        register_counter!("cacao_cache_hits_total", "Total cache hits").unwrap();
    pub static ref CACHE_MISSES: Counter =
        register_counter!("cacao_cache_misses_total", "Total cache misses").unwrap();
    pub static ref DEDUP_JOINS: Counter = register_counter!(
        "cacao_dedup_joins_total",
        "Requests that joined an in-flight generation"
    )
    .unwrap();
    pub static ref PROVIDER_CALLS: Counter =
        register_counter!("cacao_provider_calls_total", "Total provider calls").unwrap();
    pub static ref PROVIDER_FAILURES: Counter =
        register_counter!("cacao_provider_failures_total", "Failed provider calls").unwrap();
    pub static ref REQUEST_LATENCY: Histogram = register_histogram!(
        "cacao_request_latency_seconds",
        "Request latency in seconds"
    )
    .unwrap();
    pub static ref CACHE_SIZE: Gauge =
        register_gauge!("cacao_cache_size", "Current number of items in cache").unwrap();
}

// Prometheus text exposition of everything registered above
pub fn render() -> Result<String, prometheus::Error> {
    use prometheus::{Encoder, TextEncoder};

    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}
