use lazy_static::lazy_static;
use prometheus::{
    register_histogram, register_histogram_vec, register_int_counter_vec, Encoder, Histogram,
    HistogramVec, IntCounterVec, TextEncoder,
};

lazy_static! {
    // HTTP Metrics
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "http_requests_total",
        "Total number of HTTP requests",
        &["method", "path", "status"]
    )
    .unwrap();

    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "http_request_duration_seconds",
        "HTTP request duration in seconds",
        &["method", "path"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .unwrap();

    // Hint Metrics
    pub static ref HINTS_REQUESTED_TOTAL: IntCounterVec = register_int_counter_vec!(
        "hints_requested_total",
        "Total number of hint generations by outcome",
        &["outcome"]
    )
    .unwrap();

    pub static ref HINT_GENERATION_DURATION_SECONDS: Histogram = register_histogram!(
        "hint_generation_duration_seconds",
        "Time spent waiting for the text-generation backend",
        vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 20.0, 30.0]
    )
    .unwrap();

    pub static ref HINT_PHRASING_CONCERNS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "hint_phrasing_concerns_total",
        "Generated hints flagged by the advisory phrasing review",
        &["concern"]
    )
    .unwrap();
}

/// Renders all metrics in Prometheus text format
pub fn render_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer)
        .map_err(|e| prometheus::Error::Msg(format!("Failed to convert metrics to UTF-8: {}", e)))
}

/// Helper: time a backend call and record its duration
pub async fn track_generation<F, T>(future: F) -> T
where
    F: std::future::Future<Output = T>,
{
    // Observed on drop too, so calls abandoned by a timeout or cancel are still timed
    let timer = HINT_GENERATION_DURATION_SECONDS.start_timer();
    let result = future.await;
    timer.observe_duration();
    result
}

pub fn record_hint_outcome(outcome: &str) {
    HINTS_REQUESTED_TOTAL.with_label_values(&[outcome]).inc();
}

pub fn record_phrasing_concern(concern: &str) {
    HINT_PHRASING_CONCERNS_TOTAL
        .with_label_values(&[concern])
        .inc();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_registration() {
        record_hint_outcome("success");
        record_phrasing_concern("mentions_player");
        HTTP_REQUESTS_TOTAL
            .with_label_values(&["POST", "/api/v1/hints", "200"])
            .inc();

        let rendered = render_metrics().unwrap();
        assert!(rendered.contains("hints_requested_total"));
        assert!(rendered.contains("hint_phrasing_concerns_total"));
        assert!(rendered.contains("http_requests_total"));
    }

    #[tokio::test]
    async fn track_generation_passes_result_through() {
        let before = HINT_GENERATION_DURATION_SECONDS.get_sample_count();
        let value = track_generation(async { 42 }).await;

        assert_eq!(value, 42);
        assert!(HINT_GENERATION_DURATION_SECONDS.get_sample_count() > before);
    }

    #[tokio::test]
    async fn abandoned_generation_still_records_duration() {
        let before = HINT_GENERATION_DURATION_SECONDS.get_sample_count();

        tokio::select! {
            _ = track_generation(std::future::pending::<()>()) => unreachable!(),
            _ = tokio::time::sleep(std::time::Duration::from_millis(10)) => {}
        }

        assert!(HINT_GENERATION_DURATION_SECONDS.get_sample_count() > before);
    }
}
