#![allow(dead_code)]

use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    sync::Arc,
};

use axum::{
    Router,
    body::Body,
    extract::ConnectInfo,
    http::{HeaderMap, Request, StatusCode},
};
use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc};
use http_body_util::BodyExt;
use jsonwebtoken::{EncodingKey, Header};
use rdl_api::{ApiConfig, ApiState, router};
use rdl_db::{
    MemoryStore, RiddleStore,
    models::{Achievement, Fact, Language, Profile, Riddle},
};
use serde::{Deserialize, Serialize};
use tower::ServiceExt;
use uuid::Uuid;

pub const JWT_SECRET: &str = "test_jwt_secret_minimum_32_characters_long";

/// Test state builder over an in-memory store
pub struct TestStateBuilder {
    vars: Vec<(String, String)>,
    store: Arc<MemoryStore>,
}

impl TestStateBuilder {
    pub fn new() -> Self {
        Self {
            vars: Vec::new(),
            store: Arc::new(MemoryStore::new()),
        }
    }

    /// Require bearer tokens signed with [`JWT_SECRET`]
    pub fn with_auth(self) -> Self {
        self.var("JWT_SECRET", JWT_SECRET)
    }

    pub fn var(mut self, name: &str, value: &str) -> Self {
        self.vars.push((name.to_string(), value.to_string()));
        self
    }

    pub fn build(self) -> TestApp {
        let config = ApiConfig::from_vars(self.vars).expect("Invalid test configuration");
        let store: Arc<dyn RiddleStore> = self.store.clone();
        let state = ApiState::with_store(&config, store);

        TestApp {
            client: TestClient::new(router::router().with_state(state.clone())),
            state,
            store: self.store,
        }
    }
}

impl Default for TestStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Router plus a handle on its store for seeding and assertions
pub struct TestApp {
    pub client: TestClient,
    pub state: ApiState,
    pub store: Arc<MemoryStore>,
}

impl TestApp {
    pub fn new() -> Self {
        TestStateBuilder::new().build()
    }

    pub fn seed_profile(&self, name: &str, current_streak: i32, total_correct: i32) -> Uuid {
        let profile = profile(name, current_streak, total_correct);
        let id = profile.id;
        self.store.insert_profile(profile);
        id
    }

    pub fn seed_riddle(&self, answer: &str) -> Uuid {
        let riddle = riddle(answer, Utc::now() - Duration::days(30));
        let id = riddle.id;
        self.store.insert_riddle(riddle);
        id
    }

    pub fn seed_fact(&self, text: &str) -> Uuid {
        let fact = Fact {
            id: Uuid::new_v4(),
            category: "nature".to_string(),
            fact_text: text.to_string(),
            source: Some("Encyclopaedia".to_string()),
            active: true,
        };
        let id = fact.id;
        self.store.insert_fact(fact, Utc::now() - Duration::days(30));
        id
    }

    pub fn seed_achievement(&self, user_id: Uuid, badge_name: &str, earned_date: DateTime<Utc>) {
        self.store.insert_achievement(Achievement {
            id: Uuid::new_v4(),
            user_id,
            badge_name: badge_name.to_string(),
            badge_icon: "🔥".to_string(),
            earned_date,
        });
    }

    pub async fn profile(&self, user_id: Uuid) -> Profile {
        self.store
            .find_profile(user_id)
            .await
            .expect("Store failed")
            .expect("Profile should exist")
    }
}

pub fn profile(name: &str, current_streak: i32, total_correct: i32) -> Profile {
    let created = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    Profile {
        id: Uuid::new_v4(),
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        language: Language::En,
        preferred_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        push_enabled: true,
        current_streak,
        longest_streak: current_streak,
        total_correct,
        last_answered_date: None,
        last_riddle_id: None,
        created_at: created,
        updated_at: created,
    }
}

pub fn riddle(answer: &str, created_at: DateTime<Utc>) -> Riddle {
    Riddle {
        id: Uuid::new_v4(),
        text_en: "The more of this there is, the less you see. What is it?".to_string(),
        text_ta: "இது அதிகமாக இருந்தால், நீங்கள் குறைவாகப் பார்ப்பீர்கள். இது என்ன?".to_string(),
        text_ta_en: "Ithu athigamaaga irunthaal, neengal kuraivaaga paarppeergal. Ithu enna?"
            .to_string(),
        answer: answer.to_string(),
        category: "logic".to_string(),
        active: true,
        created_at,
    }
}

#[derive(Serialize)]
struct TestClaims {
    sub: String,
    aud: String,
    exp: usize,
}

/// Access token as issued by the auth backend
pub fn bearer_token(user_id: Uuid) -> String {
    let claims = TestClaims {
        sub: user_id.to_string(),
        aud: "authenticated".to_string(),
        exp: (Utc::now() + Duration::hours(1)).timestamp() as usize,
    };

    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("Failed to encode token")
}

/// Helper to make requests to the test app
pub struct TestClient {
    router: Router,
}

impl TestClient {
    pub fn new(router: Router) -> Self {
        Self { router }
    }

    /// Send a request and get the response
    pub async fn request(&self, mut request: Request<Body>) -> TestResponse {
        // Peer address for the IP based rate limiter
        let test_addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)), 8080);
        request.extensions_mut().insert(ConnectInfo(test_addr));

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to execute request");

        let status = response.status();
        let headers = response.headers().clone();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read response body")
            .to_bytes();

        TestResponse {
            status,
            body: body_bytes.to_vec(),
            headers,
        }
    }

    fn builder(method: &str, uri: &str, token: Option<&str>) -> axum::http::request::Builder {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("x-forwarded-for", "127.0.0.1");

        match token {
            Some(token) => builder.header("authorization", format!("Bearer {token}")),
            None => builder,
        }
    }

    /// Send a GET request
    pub async fn get(&self, uri: &str) -> TestResponse {
        self.get_with_token(uri, None).await
    }

    pub async fn get_with_token(&self, uri: &str, token: Option<&str>) -> TestResponse {
        let request = Self::builder("GET", uri, token)
            .body(Body::empty())
            .expect("Failed to build request");

        self.request(request).await
    }

    /// Send a POST request with JSON body
    pub async fn post_json<T: Serialize>(&self, uri: &str, body: &T) -> TestResponse {
        self.send_json("POST", uri, body, None).await
    }

    /// Send a POST request with a raw body
    pub async fn post_raw(&self, uri: &str, body: &str) -> TestResponse {
        let request = Self::builder("POST", uri, None)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("Failed to build request");

        self.request(request).await
    }

    /// Send a JSON request with an optional bearer token
    pub async fn send_json<T: Serialize>(
        &self,
        method: &str,
        uri: &str,
        body: &T,
        token: Option<&str>,
    ) -> TestResponse {
        let json_body = serde_json::to_string(body).expect("Failed to serialize body");

        let request = Self::builder(method, uri, token)
            .header("content-type", "application/json")
            .body(Body::from(json_body))
            .expect("Failed to build request");

        self.request(request).await
    }
}

/// Test response wrapper
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
    pub headers: HeaderMap,
}

impl TestResponse {
    /// Get response body as string
    pub fn text(&self) -> String {
        String::from_utf8(self.body.clone()).expect("Response body is not valid UTF-8")
    }

    /// Parse response body as JSON
    pub fn json<T: for<'de> Deserialize<'de>>(&self) -> T {
        serde_json::from_slice(&self.body).expect("Failed to parse JSON response")
    }

    /// Assert status code
    pub fn assert_status(&self, expected: StatusCode) {
        assert_eq!(
            self.status,
            expected,
            "Expected status {}, got {}. Body: {}",
            expected,
            self.status,
            self.text()
        );
    }

    /// The `error` field of an error body
    pub fn error(&self) -> String {
        let body: serde_json::Value = self.json();
        body["error"]
            .as_str()
            .expect("Error body should have an error field")
            .to_string()
    }
}
