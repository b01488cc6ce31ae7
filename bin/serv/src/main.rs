use std::net::SocketAddr;

use anyhow::Context;
use axum::{Router, middleware, routing::get};
use rdl_api::{
    ApiConfig, ApiState,
    middleware::{cors::create_cors_layer, rate_limit::apply_rate_limit},
};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration from environment variables
    dotenvy::dotenv().ok();
    let config = ApiConfig::from_env()?;

    rdl_api::tracing::init_tracing(&config.env);

    let metrics_handle = rdl_api::metrics::init_metrics()?;

    let database_url = config
        .database_url
        .clone()
        .context("DATABASE_URL must be set")?;
    let pool = rdl_db::create_pool(
        &database_url,
        config.db_max_connections,
        config.db_acquire_timeout(),
    )
    .await?;
    rdl_db::ensure_db_and_migrate(&database_url, &pool).await?;

    let state = ApiState::new(&config, pool);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    let metrics_app = Router::new()
        .route("/metrics", get(rdl_api::metrics::metrics_handler))
        .with_state(metrics_handle);

    let app = rdl_api::router::routes()
        .with_state(state)
        .merge(metrics_app)
        .layer(trace_layer)
        .layer(middleware::from_fn(rdl_api::metrics::track_metrics))
        .layer(middleware::from_fn(
            rdl_api::middleware::request_id::request_id_middleware,
        ));
    let app = apply_rate_limit(app, config.rate_limit_per_second, config.rate_limit_burst)?
        .layer(create_cors_layer());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, environment = %config.env, streak_policy = %config.streak_policy, "server listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
