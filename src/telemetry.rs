use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub fn init_telemetry(service_name: &str) {
    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    // Suppress DB debug logs (sqlx, sea_orm) by setting them to warn.
    let env_filter = tracing_subscriber::EnvFilter::new(std::env::var("RUST_LOG").unwrap_or_else(
        |_| format!("info,{}=info,sqlx=warn,sea_orm=warn", service_name.replace('-', "_")),
    ));

    let registry = tracing_subscriber::registry().with(env_filter);

    if log_format == "json" {
        // flatten_event(true) moves fields to top level.
        let fmt_layer = tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .without_time();
        registry.with(fmt_layer).init();
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer();
        registry.with(fmt_layer).init();
    };
}
