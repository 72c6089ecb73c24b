use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

/// Metrics はデータ転送サーバーの Prometheus メトリクスを保持する。
pub struct Metrics {
    pub http_requests_total: IntCounterVec,
    pub jobs_submitted_total: IntCounterVec,
    pub jobs_removed_total: IntCounter,
    pub mapping_writes_total: IntCounterVec,
    registry: Registry,
}

impl Metrics {
    /// service_name はメトリクスの service ラベルに使用される。
    pub fn new(service_name: &str) -> Self {
        let registry = Registry::new();

        let http_requests_total = IntCounterVec::new(
            Opts::new("http_requests_total", "Total number of HTTP requests")
                .const_label("service", service_name),
            &["method", "path", "status"],
        )
        .expect("failed to create http_requests_total counter");

        let jobs_submitted_total = IntCounterVec::new(
            Opts::new(
                "data_transfer_jobs_submitted_total",
                "Total number of submitted job items",
            )
            .const_label("service", service_name),
            &["job_type"],
        )
        .expect("failed to create data_transfer_jobs_submitted_total counter");

        let jobs_removed_total = IntCounter::with_opts(
            Opts::new(
                "data_transfer_jobs_removed_total",
                "Total number of removed job items",
            )
            .const_label("service", service_name),
        )
        .expect("failed to create data_transfer_jobs_removed_total counter");

        let mapping_writes_total = IntCounterVec::new(
            Opts::new(
                "data_transfer_mapping_writes_total",
                "Total number of mapping template writes",
            )
            .const_label("service", service_name),
            &["action"],
        )
        .expect("failed to create data_transfer_mapping_writes_total counter");

        registry
            .register(Box::new(http_requests_total.clone()))
            .expect("failed to register http_requests_total");
        registry
            .register(Box::new(jobs_submitted_total.clone()))
            .expect("failed to register data_transfer_jobs_submitted_total");
        registry
            .register(Box::new(jobs_removed_total.clone()))
            .expect("failed to register data_transfer_jobs_removed_total");
        registry
            .register(Box::new(mapping_writes_total.clone()))
            .expect("failed to register data_transfer_mapping_writes_total");

        Self {
            http_requests_total,
            jobs_submitted_total,
            jobs_removed_total,
            mapping_writes_total,
            registry,
        }
    }

    /// Prometheus テキスト形式でメトリクスを出力する。
    pub fn gather_metrics(&self) -> String {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        if let Err(e) = encoder.encode(&self.registry.gather(), &mut buffer) {
            tracing::error!(error = %e, "failed to encode metrics");
            return String::new();
        }
        String::from_utf8(buffer).unwrap_or_default()
    }
}
