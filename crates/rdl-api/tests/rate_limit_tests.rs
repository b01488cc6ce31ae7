use crate::common::{TestApp, TestClient};
use axum::{
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use rdl_api::middleware::{cors::create_cors_layer, rate_limit::apply_rate_limit};

/// Routes behind the limiter with CORS outermost, stacked like the binaries
fn limited_client(app: &TestApp, per_second: u64, burst: u32) -> TestClient {
    let routes = rdl_api::router::routes().with_state(app.state.clone());
    let limited =
        apply_rate_limit(routes, per_second, burst).expect("Failed to build rate limiter");
    TestClient::new(limited.layer(create_cors_layer()))
}

fn from_browser(method: Method, uri: &str) -> Request<Body> {
    let builder = Request::builder()
        .method(method.clone())
        .uri(uri)
        .header("x-forwarded-for", "127.0.0.1")
        .header(header::ORIGIN, "https://riddles.example.com");

    let builder = if method == Method::OPTIONS {
        builder
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
            .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "authorization")
    } else {
        builder
    };

    builder.body(Body::empty()).expect("Failed to build request")
}

#[tokio::test]
async fn test_rate_limit_after_burst() {
    let app = TestApp::new();
    let user_id = app.seed_profile("Jaya", 0, 0);
    let client = limited_client(&app, 1, 3);

    let mut statuses = Vec::new();
    for _ in 0..6 {
        let response = client.get(&format!("/profiles/{user_id}")).await;
        statuses.push(response.status);
    }

    let limited = statuses
        .iter()
        .filter(|&&status| status == StatusCode::TOO_MANY_REQUESTS)
        .count();
    let succeeded = statuses
        .iter()
        .filter(|&&status| status == StatusCode::OK)
        .count();

    assert!(limited > 0, "Some requests should be rate limited: {statuses:?}");
    assert!(succeeded >= 3, "The burst should pass: {statuses:?}");
}

#[tokio::test]
async fn test_limited_responses_carry_cors_headers() {
    let app = TestApp::new();
    let client = limited_client(&app, 1, 1);

    let mut last = None;
    for _ in 0..3 {
        last = Some(client.request(from_browser(Method::GET, "/leaderboard")).await);
    }
    let limited = last.expect("At least one request was sent");

    limited.assert_status(StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(
        limited
            .headers
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "*"
    );
}

#[tokio::test]
async fn test_preflights_do_not_use_the_budget() {
    let app = TestApp::new();
    let client = limited_client(&app, 1, 2);

    for _ in 0..5 {
        client
            .request(from_browser(Method::OPTIONS, "/leaderboard"))
            .await
            .assert_status(StatusCode::OK);
    }

    client
        .request(from_browser(Method::GET, "/leaderboard"))
        .await
        .assert_status(StatusCode::OK);
}
