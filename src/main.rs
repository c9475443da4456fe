use std::net::SocketAddr;

use dotenvy::dotenv;
use tracing::info;

use lectern::router::init_router;
use lectern::state::init_app_state;
use lectern_config::{JwtConfig, SessionConfig};
use lectern_db::init_db_pool;
use lectern_observability::{init_metrics, init_tracing, metrics_app, shutdown_tracer};
use lectern_session::TokenSweeper;

#[tokio::main]
async fn main() {
    dotenv().ok();
    init_tracing();

    let jwt_config = JwtConfig::from_env();
    if let Err(e) = jwt_config.validate() {
        panic!("Invalid JWT configuration: {e}");
    }
    let session_config = SessionConfig::from_env();

    let db = init_db_pool().await;
    sqlx::migrate!("./migrations")
        .run(&db)
        .await
        .expect("Failed to run database migrations");

    let state = init_app_state(db, &jwt_config);
    if let Err(e) = state.rate_limit_config.validate() {
        panic!("Invalid rate limit configuration: {e}");
    }

    let sweeper = session_config.sweep_interval().map(|period| {
        info!(period_secs = period.as_secs(), "Starting refresh token sweeper");
        TokenSweeper::new(state.session_manager.refresh_tokens()).spawn(
            period,
            lectern_observability::track_tokens_swept,
        )
    });

    let mut app = init_router(state);
    if let Some(handle) = init_metrics() {
        app = app.merge(metrics_app(handle));
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], session_config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listen address");

    info!(%addr, "Server running");
    info!("Swagger UI available at http://localhost:{}/swagger-ui", session_config.port);
    info!("Scalar UI available at http://localhost:{}/scalar", session_config.port);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .expect("Server error");

    if let Some(sweeper) = sweeper {
        sweeper.abort();
    }
    shutdown_tracer().await;
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
