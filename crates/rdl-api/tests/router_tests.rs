use crate::common::TestApp;
use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};

#[tokio::test]
async fn test_health_and_readiness() {
    let app = TestApp::new();

    app.client
        .get("/health")
        .await
        .assert_status(StatusCode::OK);
    app.client
        .get("/health/ready")
        .await
        .assert_status(StatusCode::OK);

    app.store.set_unavailable(true);
    app.client
        .get("/health")
        .await
        .assert_status(StatusCode::OK);
    app.client
        .get("/health/ready")
        .await
        .assert_status(StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let app = TestApp::new();

    let response = app.client.get("/riddles/archive").await;

    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(response.error(), "The requested resource was not found");
}

#[tokio::test]
async fn test_preflight_on_submit_answer() {
    let app = TestApp::new();

    let request = Request::builder()
        .method("OPTIONS")
        .uri("/submit-answer")
        .header(header::ORIGIN, "http://localhost:8081")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "authorization, apikey, content-type")
        .body(Body::empty())
        .unwrap();
    let response = app.client.request(request).await;

    response.assert_status(StatusCode::OK);
    assert!(response.body.is_empty());
    assert_eq!(
        response.headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "*"
    );
}

#[tokio::test]
async fn test_cors_header_on_errors() {
    let app = TestApp::new();

    let request = Request::builder()
        .method("POST")
        .uri("/get-riddle")
        .header(header::ORIGIN, "http://localhost:8081")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{}"))
        .unwrap();
    let response = app.client.request(request).await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "*"
    );
}
