//! Operational metrics with Prometheus
//!
//! Exposes request rates/latencies plus the pipeline's degradation counters
//! so the "always 200" design stays observable: a healthy-looking surface
//! with a climbing degraded counter means the engine is down.
//!
//! NOTE: We intentionally avoid user_id in metric labels to prevent
//! high-cardinality explosion.

use lazy_static::lazy_static;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry};

lazy_static! {
    /// Global metrics registry
    pub static ref METRICS_REGISTRY: Registry = Registry::new();

    /// HTTP request duration in seconds
    pub static ref HTTP_REQUEST_DURATION: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "reverie_http_request_duration_seconds",
            "HTTP request duration in seconds"
        )
        .buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 15.0]),
        &["method", "endpoint", "status"]
    ).unwrap();

    /// Total HTTP requests
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("reverie_http_requests_total", "Total HTTP requests"),
        &["method", "endpoint", "status"]
    ).unwrap();

    /// Analysis calls that returned the degraded default
    pub static ref ANALYSIS_DEGRADED_TOTAL: IntCounter = IntCounter::new(
        "reverie_analysis_degraded_total",
        "Analysis calls degraded because the engine failed"
    ).unwrap();

    /// Prompt generations that fell back to the fixed prompt
    pub static ref PROMPT_FALLBACK_TOTAL: IntCounter = IntCounter::new(
        "reverie_prompt_fallback_total",
        "Prompt generations that used the fixed fallback"
    ).unwrap();

    /// Rate-limit denials by endpoint class
    pub static ref RATE_LIMITED_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("reverie_rate_limited_total", "Admissions denied by the rate limiter"),
        &["class"]
    ).unwrap();

    /// Candidates surfaced after confidence filtering, by kind
    pub static ref CANDIDATES_SURFACED_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("reverie_candidates_surfaced_total", "Extraction candidates surfaced to users"),
        &["kind"]
    ).unwrap();
}

/// Register all metrics with the global registry
///
/// Call once at startup. Idempotent registration errors (tests create the
/// process twice) are reported, not fatal.
pub fn register_metrics() -> Result<(), prometheus::Error> {
    METRICS_REGISTRY.register(Box::new(HTTP_REQUEST_DURATION.clone()))?;
    METRICS_REGISTRY.register(Box::new(HTTP_REQUESTS_TOTAL.clone()))?;
    METRICS_REGISTRY.register(Box::new(ANALYSIS_DEGRADED_TOTAL.clone()))?;
    METRICS_REGISTRY.register(Box::new(PROMPT_FALLBACK_TOTAL.clone()))?;
    METRICS_REGISTRY.register(Box::new(RATE_LIMITED_TOTAL.clone()))?;
    METRICS_REGISTRY.register(Box::new(CANDIDATES_SURFACED_TOTAL.clone()))?;
    Ok(())
}

/// Render the registry in Prometheus text exposition format
pub fn gather() -> String {
    use prometheus::Encoder;

    let encoder = prometheus::TextEncoder::new();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&METRICS_REGISTRY.gather(), &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}
