use anyhow::Context;
use axum::Router;
use tower_governor::{
    GovernorLayer, governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor,
};

/// Limit requests per client IP.
///
/// The client IP comes from `X-Forwarded-For`/`X-Real-IP`/`Forwarded` or the
/// peer address, so the app must be served with
/// `into_make_service_with_connect_info::<SocketAddr>()`. Requests over the
/// limit get `429 Too Many Requests`.
pub fn apply_rate_limit<S>(
    router: Router<S>,
    per_second: u64,
    burst_size: u32,
) -> anyhow::Result<Router<S>>
where
    S: Clone + Send + Sync + 'static,
{
    let governor_conf = GovernorConfigBuilder::default()
        .per_second(per_second)
        .burst_size(burst_size)
        .key_extractor(SmartIpKeyExtractor)
        .use_headers()
        .finish()
        .context("invalid rate limit configuration")?;

    Ok(router.layer(GovernorLayer::new(governor_conf)))
}
