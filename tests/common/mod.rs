//! Shared utilities for integration tests.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{HeaderMap, Request, StatusCode},
    routing::{get, post},
    Router,
};
use http_body_util::BodyExt;
use serde::Deserialize;
use serde_json::{json, Value};
use tower::ServiceExt;

use origin_gate::config::{Environment, ServerConfig};
use origin_gate::http::{AppError, AppJson};
use origin_gate::HttpServer;

/// Stand-in for the authentication routes mounted under `/auth`.
pub fn auth_routes() -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/fail", get(fail))
        .route("/panic", get(explode))
        .route("/slow", get(linger))
}

#[derive(Deserialize)]
struct Credentials {
    email: String,
    password: String,
}

async fn login(AppJson(credentials): AppJson<Credentials>) -> AppJson<Value> {
    AppJson(json!({ "user": credentials.email }))
}

async fn fail() -> Result<&'static str, AppError> {
    Err(AppError::internal("relation \"users\" does not exist").with_query("SELECT * FROM users"))
}

async fn explode() -> &'static str {
    panic!("handler blew up")
}

async fn linger() -> &'static str {
    tokio::time::sleep(std::time::Duration::from_secs(5)).await;
    "finally"
}

pub fn config(environment: Environment) -> ServerConfig {
    let mut config = ServerConfig::default();
    config.environment = environment;
    config
}

/// Full application with the test auth routes mounted.
pub fn app_with(config: ServerConfig) -> Router {
    HttpServer::new(config).with_auth_routes(auth_routes()).router()
}

pub fn app() -> Router {
    app_with(config(Environment::Other))
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Drive one request through the router and decode the JSON body (Null when
/// the body is empty or not JSON).
pub async fn send(app: Router, request: Request<Body>) -> TestResponse {
    let response = app.oneshot(request).await.unwrap();
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

pub fn get_with_origin(uri: &str, origin: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(origin) = origin {
        builder = builder.header("origin", origin);
    }
    builder.body(Body::empty()).unwrap()
}
