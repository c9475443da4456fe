use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Targets whose level follows `LOG_LEVEL`; noisy dependencies stay at warn.
pub(crate) fn default_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        EnvFilter::new(format!(
            "lectern={level},lectern_session={level},lectern_auth={level},lectern_db={level},\
             lectern_cli={level},tower_http=warn,hyper=warn,tonic=warn,h2=warn,sqlx=warn"
        ))
    })
}

/// Console-only logging, used when observability is disabled at compile
/// time or through `OBSERVABILITY_ENABLED=false`.
///
/// The level comes from `RUST_LOG` when set, otherwise from `LOG_LEVEL`
/// (default `info`).
pub fn init_basic_console_logging() {
    let console_layer = fmt::layer()
        .compact()
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(true)
        .with_line_number(true)
        .with_filter(default_filter());

    tracing_subscriber::registry().with(console_layer).init();

    eprintln!("Observability disabled - console logging only");
}
