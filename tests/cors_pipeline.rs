//! Origin gate behaviour through the full router.

use std::time::Duration;

use axum::{
    body::Body,
    http::{HeaderValue, Request, StatusCode},
};
use chrono::DateTime;
use origin_gate::config::Environment;
use origin_gate::cors::policy::DEFAULT_ALLOWED_ORIGINS;

mod common;
use common::{app, app_with, config, get_with_origin, send};

#[tokio::test]
async fn test_localhost_origin_allowed() {
    let res = send(app(), get_with_origin("/", Some("http://localhost:5173"))).await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.header("access-control-allow-origin"), Some("http://localhost:5173"));
    assert_eq!(res.header("access-control-allow-credentials"), Some("true"));
    assert_eq!(res.header("vary"), Some("origin"));
    assert_eq!(res.body["message"], "Server is running!");
    assert_eq!(res.body["status"], "OK");
}

#[tokio::test]
async fn test_every_default_origin_allowed() {
    for origin in DEFAULT_ALLOWED_ORIGINS {
        let res = send(app(), get_with_origin("/", Some(origin))).await;
        assert_eq!(res.status, StatusCode::OK, "{origin}");
        assert_eq!(res.header("access-control-allow-origin"), Some(origin));
    }
}

#[tokio::test]
async fn test_vercel_origin_allowed() {
    let res = send(app(), get_with_origin("/", Some("https://myapp.vercel.app"))).await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(
        res.header("access-control-allow-origin"),
        Some("https://myapp.vercel.app")
    );
    assert_eq!(res.header("access-control-allow-credentials"), Some("true"));
}

#[tokio::test]
async fn test_foreign_origin_rejected() {
    let res = send(app(), get_with_origin("/", Some("https://evil.com"))).await;

    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(res.header("access-control-allow-origin").is_none());
    assert!(res.header("access-control-allow-credentials").is_none());
    assert_eq!(
        res.body,
        serde_json::json!({
            "message": "Something went wrong!",
            "error": "Not allowed by CORS",
        })
    );
}

#[tokio::test]
async fn test_lookalike_vercel_origin_rejected() {
    for origin in ["https://notvercel.app", "https://fakevercel.app"] {
        let res = send(app(), get_with_origin("/", Some(origin))).await;
        assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR, "{origin}");
        assert_eq!(res.body["error"], "Not allowed by CORS");
    }
}

#[tokio::test]
async fn test_no_origin_allowed() {
    let res = send(app(), get_with_origin("/", None)).await;

    assert_eq!(res.status, StatusCode::OK);
    assert!(res.header("access-control-allow-origin").is_none());
    assert_eq!(res.body["message"], "Server is running!");
}

#[tokio::test]
async fn test_frontend_url_allowed() {
    let mut cfg = config(Environment::Production);
    cfg.cors.frontend_url = Some("https://app.example.com".into());

    let res = send(app_with(cfg), get_with_origin("/", Some("https://app.example.com"))).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(
        res.header("access-control-allow-origin"),
        Some("https://app.example.com")
    );

    // Not allowed unless configured.
    let res = send(app(), get_with_origin("/", Some("https://app.example.com"))).await;
    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_preflight_allowed() {
    let request = Request::builder()
        .method("OPTIONS")
        .uri("/auth/login")
        .header("origin", "http://localhost:5174")
        .header("access-control-request-method", "POST")
        .header("access-control-request-headers", "content-type,authorization")
        .body(Body::empty())
        .unwrap();

    let res = send(app(), request).await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body, serde_json::Value::Null);
    assert_eq!(res.header("access-control-allow-origin"), Some("http://localhost:5174"));
    assert_eq!(res.header("access-control-allow-credentials"), Some("true"));
    assert_eq!(
        res.header("access-control-allow-methods"),
        Some("GET,POST,PUT,DELETE,OPTIONS")
    );
    assert_eq!(
        res.header("access-control-allow-headers"),
        Some("content-type,authorization")
    );
}

#[tokio::test]
async fn test_preflight_rejected() {
    let request = Request::builder()
        .method("OPTIONS")
        .uri("/auth/login")
        .header("origin", "https://evil.com")
        .header("access-control-request-method", "POST")
        .body(Body::empty())
        .unwrap();

    let res = send(app(), request).await;

    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(res.header("access-control-allow-origin").is_none());
    assert!(res.header("access-control-allow-methods").is_none());
}

#[tokio::test]
async fn test_non_ascii_origin_rejected() {
    let request = Request::builder()
        .uri("/")
        .header("origin", HeaderValue::from_bytes(b"https://\xe9vil.vercel.app").unwrap())
        .body(Body::empty())
        .unwrap();

    let res = send(app(), request).await;

    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.body["error"], "Not allowed by CORS");
    assert!(res.header("access-control-allow-origin").is_none());
}

#[tokio::test]
async fn test_origin_checked_before_body_parsing() {
    let request = Request::builder()
        .method("POST")
        .uri("/auth/login")
        .header("origin", "https://evil.com")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let res = send(app(), request).await;

    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.body["error"], "Not allowed by CORS");
}

#[tokio::test]
async fn test_auth_routes_reached_with_allowed_origin() {
    let request = Request::builder()
        .method("POST")
        .uri("/auth/login")
        .header("origin", "https://preview-123.vercel.app")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"email":"a@example.com","password":"secret"}"#))
        .unwrap();

    let res = send(app(), request).await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["user"], "a@example.com");
    assert_eq!(
        res.header("access-control-allow-origin"),
        Some("https://preview-123.vercel.app")
    );
}

#[tokio::test]
async fn test_unknown_route_still_gated() {
    let res = send(app(), get_with_origin("/missing", Some("http://localhost:5173"))).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.header("access-control-allow-origin"), Some("http://localhost:5173"));

    let res = send(app(), get_with_origin("/missing", Some("https://evil.com"))).await;
    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.body["error"], "Not allowed by CORS");
}

#[tokio::test]
async fn test_timestamp_changes_between_calls() {
    let first = send(app(), get_with_origin("/", None)).await;
    tokio::time::sleep(Duration::from_millis(10)).await;
    let second = send(app(), get_with_origin("/", None)).await;

    let first_ts = first.body["timestamp"].as_str().unwrap();
    let second_ts = second.body["timestamp"].as_str().unwrap();

    let first_time = DateTime::parse_from_rfc3339(first_ts).unwrap();
    let second_time = DateTime::parse_from_rfc3339(second_ts).unwrap();
    assert!(second_time > first_time, "{first_ts} -> {second_ts}");
}

#[tokio::test]
async fn test_request_id_assigned_and_propagated() {
    let res = send(app(), get_with_origin("/", None)).await;
    let id = res.header("x-request-id").unwrap();
    assert!(uuid::Uuid::parse_str(id).is_ok());

    let request = Request::builder()
        .uri("/")
        .header("x-request-id", "client-chosen")
        .body(Body::empty())
        .unwrap();
    let res = send(app(), request).await;
    assert_eq!(res.header("x-request-id"), Some("client-chosen"));
}
