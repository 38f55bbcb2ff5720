use prometheus::{
    CounterVec, Encoder, HistogramVec, IntCounterVec, Registry, TextEncoder, histogram_opts, opts,
};
use std::fmt;
use std::time::Duration;

/// Prometheus registry and collectors for traffic to the authoritative servers
pub struct SyncMetrics {
    registry: Registry,

    upstream_requests: CounterVec,
    upstream_responses: CounterVec,
    upstream_response_time: HistogramVec,
    payload_rejections: IntCounterVec,
}

impl SyncMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let upstream_requests = CounterVec::new(
            opts!(
                "zonesync_upstream_requests_total",
                "Total requests sent to the authoritative servers"
            ),
            &["role", "method"],
        )?;

        let upstream_responses = CounterVec::new(
            opts!(
                "zonesync_upstream_responses_total",
                "Total classified outcomes of upstream requests"
            ),
            &["role", "outcome"],
        )?;

        let upstream_response_time = HistogramVec::new(
            histogram_opts!(
                "zonesync_upstream_response_time_seconds",
                "Response time of the authoritative servers' HTTP API"
            ),
            &["role"],
        )?;

        let payload_rejections = IntCounterVec::new(
            opts!(
                "zonesync_payload_rejections_total",
                "Request bodies refused locally for exceeding the size limit"
            ),
            &["role"],
        )?;

        registry.register(Box::new(upstream_requests.clone()))?;
        registry.register(Box::new(upstream_responses.clone()))?;
        registry.register(Box::new(upstream_response_time.clone()))?;
        registry.register(Box::new(payload_rejections.clone()))?;

        Ok(Self {
            registry,
            upstream_requests,
            upstream_responses,
            upstream_response_time,
            payload_rejections,
        })
    }

    /// Record a request leaving for `role`
    pub fn record_upstream_request(&self, role: &str, method: &str) {
        self.upstream_requests
            .with_label_values(&[role, method])
            .inc();
    }

    /// Record how a request to `role` ended
    pub fn record_upstream_response(&self, role: &str, outcome: &str, duration: Duration) {
        self.upstream_responses
            .with_label_values(&[role, outcome])
            .inc();
        self.upstream_response_time
            .with_label_values(&[role])
            .observe(duration.as_secs_f64());
    }

    pub fn record_payload_rejection(&self, role: &str) {
        self.payload_rejections.with_label_values(&[role]).inc();
    }

    /// Number of `method` requests sent to `role` so far
    pub fn upstream_request_count(&self, role: &str, method: &str) -> u64 {
        self.upstream_requests
            .with_label_values(&[role, method])
            .get() as u64
    }

    /// Number of requests to `role` that ended with `outcome`
    pub fn upstream_response_count(&self, role: &str, outcome: &str) -> u64 {
        self.upstream_responses
            .with_label_values(&[role, outcome])
            .get() as u64
    }

    /// Export metrics in Prometheus format
    pub fn export(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).to_string())
    }
}

impl fmt::Debug for SyncMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncMetrics").finish_non_exhaustive()
    }
}
