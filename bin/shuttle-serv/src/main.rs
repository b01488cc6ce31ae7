use axum::{Router, middleware, routing::get};
use rdl_api::{
    ApiConfig, ApiState,
    middleware::{cors::create_cors_layer, rate_limit::apply_rate_limit},
};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

#[shuttle_runtime::main]
async fn main(
    #[shuttle_shared_db::Postgres] pool: sqlx::PgPool,
    #[shuttle_runtime::Secrets] secrets: shuttle_runtime::SecretStore,
) -> shuttle_axum::ShuttleAxum {
    let config = ApiConfig::from_shuttle_secrets(&secrets)
        .map_err(|e| anyhow::anyhow!("Config error: {e}"))?;

    // Shuttle installs its own tracing subscriber

    let metrics_handle = rdl_api::metrics::init_metrics()?;

    sqlx::migrate!("../../crates/rdl-db/migrations")
        .run(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Migration error: {e}"))?;

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

    tracing::info!(
        environment = %config.env,
        streak_policy = %config.streak_policy,
        selection_scope = %config.selection_scope,
        "riddle service ready"
    );

    // Shuttle serves the router with ConnectInfo
    Ok(app.into())
}
