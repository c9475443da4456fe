#![allow(dead_code)]

use std::sync::{Arc, OnceLock};

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use lectern::router::init_router;
use lectern::state::AppState;
use lectern_auth::TokenCodec;
use lectern_config::{CookieConfig, CorsConfig, JwtConfig, RateLimitConfig};
use lectern_core::hash_password;
use lectern_models::{OrganizationId, Role, UserId, UserIdentity};
use lectern_session::{
    MemoryRefreshTokenStore, MemorySessionStore, MemoryUserDirectory, SessionManager,
};

pub const PASSWORD: &str = "correct horse battery staple";

/// bcrypt is slow in debug builds; every seeded user shares one hash.
pub fn password_hash() -> String {
    static HASH: OnceLock<String> = OnceLock::new();
    HASH.get_or_init(|| hash_password(PASSWORD).unwrap()).clone()
}

pub fn jwt_config() -> JwtConfig {
    JwtConfig {
        access_secret: "test-access-secret-at-least-32-characters".to_string(),
        refresh_secret: "test-refresh-secret-at-least-32-characters".to_string(),
        access_token_expiry: 900,
        refresh_token_expiry: 7 * 24 * 60 * 60,
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub refresh_tokens: MemoryRefreshTokenStore,
    pub sessions: MemorySessionStore,
    pub users: MemoryUserDirectory,
}

pub fn setup_test_app() -> TestApp {
    setup_test_app_with(jwt_config(), RateLimitConfig::disabled())
}

pub fn setup_test_app_with(jwt_config: JwtConfig, rate_limit_config: RateLimitConfig) -> TestApp {
    let refresh_tokens = MemoryRefreshTokenStore::new();
    let sessions = MemorySessionStore::new();
    let users = MemoryUserDirectory::new();

    let state = AppState {
        session_manager: SessionManager::new(
            TokenCodec::new(&jwt_config),
            Arc::new(refresh_tokens.clone()),
            Arc::new(sessions.clone()),
            Arc::new(users.clone()),
        ),
        users: Arc::new(users.clone()),
        cookie_config: CookieConfig::default(),
        cors_config: CorsConfig {
            allowed_origins: vec!["http://localhost:5173".to_string()],
        },
        rate_limit_config,
    };

    TestApp {
        router: init_router(state.clone()),
        state,
        refresh_tokens,
        sessions,
        users,
    }
}

pub fn generate_unique_email() -> String {
    format!("user-{}@school.example", UserId::new())
}

impl TestApp {
    pub async fn create_user(&self, role: Role, organization_id: Option<OrganizationId>) -> UserIdentity {
        let identity = UserIdentity {
            id: UserId::new(),
            email: generate_unique_email(),
            role,
            organization_id,
        };
        self.users.insert(identity.clone(), password_hash()).await;
        identity
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn login(&self, user: &UserIdentity) -> TestResponse {
        let response = self
            .send(json_request(
                "POST",
                "/api/auth/login",
                &serde_json::json!({ "email": user.email, "password": PASSWORD }),
            ))
            .await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.body);
        response
    }

    pub async fn refresh_with_body(&self, refresh_token: &str) -> TestResponse {
        self.send(json_request(
            "POST",
            "/api/auth/refresh",
            &serde_json::json!({ "refresh_token": refresh_token }),
        ))
        .await
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    pub fn access_token(&self) -> String {
        self.body["access_token"].as_str().unwrap().to_string()
    }

    pub fn refresh_token(&self) -> String {
        self.body["refresh_token"].as_str().unwrap().to_string()
    }

    pub fn set_cookies(&self) -> Vec<String> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect()
    }

    /// The `name=value` pair of a Set-Cookie directive, ready for a Cookie
    /// header.
    pub fn cookie_pair(&self, name: &str) -> Option<String> {
        self.set_cookies()
            .into_iter()
            .find(|c| c.starts_with(&format!("{name}=")))
            .and_then(|c| c.split(';').next().map(str::to_string))
    }

    pub fn clears_session_cookies(&self) -> bool {
        let cookies = self.set_cookies();
        ["access_token=", "refresh_token="].iter().all(|name| {
            cookies
                .iter()
                .any(|c| c.starts_with(name) && c.contains("Max-Age=0"))
        })
    }
}

pub fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-forwarded-for", "203.0.113.10")
        .body(Body::from(serde_json::to_string(body).unwrap()))
        .unwrap()
}

pub fn authed_request(method: &str, uri: &str, access_token: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {access_token}"))
        .body(Body::empty())
        .unwrap()
}

pub fn cookie_request(method: &str, uri: &str, cookies: &[String]) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::COOKIE, cookies.join("; "))
        .body(Body::empty())
        .unwrap()
}
