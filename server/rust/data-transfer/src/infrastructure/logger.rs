use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// 環境名からデフォルトのログレベルを決める。
/// dev は debug、staging は info、それ以外は warn。
pub fn default_level(environment: &str) -> &'static str {
    match environment {
        "dev" => "debug",
        "staging" => "info",
        _ => "warn",
    }
}

/// init_logger は tracing-subscriber を初期化する。
/// RUST_LOG が設定されている場合はそちらを優先する。format が "text" 以外なら JSON 出力。
pub fn init_logger(environment: &str, format: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level(environment)));
    let registry = tracing_subscriber::registry().with(filter);

    if format == "text" {
        registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_span_events(fmt::format::FmtSpan::CLOSE),
            )
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_span_events(fmt::format::FmtSpan::CLOSE),
            )
            .init();
    }
}
