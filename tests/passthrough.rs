//! The API prefix rewrite and the server's ambient routes.

use std::time::Duration;

use serde_json::{json, Value};

mod common;

use common::{client, config_for, dead_address, start_gateway, start_mock_backend, Reply};

#[tokio::test]
async fn rewrites_prefix_onto_backend_root() {
    let backend = start_mock_backend(Reply::json(200, r#"{"id":1,"username":"asha"}"#)).await;
    let gateway = start_gateway(config_for(&backend.base_url())).await;

    let res = client()
        .get(gateway.url("/api/user/me?expand=prefs"))
        .header("Authorization", "Bearer abc")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), r#"{"id":1,"username":"asha"}"#);

    let seen = backend.last();
    assert_eq!(seen.method, "GET");
    assert_eq!(seen.uri, "/user/me?expand=prefs");
    assert_eq!(seen.headers["authorization"], "Bearer abc");
    assert_eq!(seen.headers["x-forwarded-for"], "127.0.0.1");
    assert!(seen.headers.get("x-request-id").is_some());
}

#[tokio::test]
async fn relays_backend_errors_as_is() {
    let backend = start_mock_backend(Reply::json(404, r#"{"message":"Recipe not found"}"#)).await;
    let gateway = start_gateway(config_for(&backend.base_url())).await;

    let res = client()
        .delete(gateway.url("/api/review/9"))
        .header("Authorization", "Bearer abc")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 404);
    assert_eq!(res.text().await.unwrap(), r#"{"message":"Recipe not found"}"#);
    assert_eq!(backend.last().method, "DELETE");
}

#[tokio::test]
async fn forwards_request_bodies() {
    let backend = start_mock_backend(Reply::json(201, r#"{"access_token":"t0k"}"#)).await;
    let gateway = start_gateway(config_for(&backend.base_url())).await;

    let res = client()
        .post(gateway.url("/api/auth/login"))
        .json(&json!({ "username": "asha", "password": "pw" }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 201);
    let seen = backend.last();
    assert_eq!(seen.uri, "/auth/login");
    let sent: Value = serde_json::from_slice(&seen.body).unwrap();
    assert_eq!(sent, json!({ "username": "asha", "password": "pw" }));
}

#[tokio::test]
async fn dead_backend_is_bad_gateway() {
    let dead = dead_address().await;
    let gateway = start_gateway(config_for(&format!("http://{dead}"))).await;

    let res = client().get(gateway.url("/api/recipe")).send().await.unwrap();

    assert_eq!(res.status(), 502);
    assert_eq!(
        res.json::<Value>().await.unwrap(),
        json!({ "error": "Upstream request failed" })
    );
}

#[tokio::test]
async fn slow_backend_is_gateway_timeout() {
    let backend =
        start_mock_backend(Reply::json(200, "[]").delayed(Duration::from_secs(5))).await;
    let mut config = config_for(&backend.base_url());
    config.passthrough.timeout_secs = 1;
    let gateway = start_gateway(config).await;

    let res = client().get(gateway.url("/api/recipe")).send().await.unwrap();

    assert_eq!(res.status(), 504);
    assert_eq!(
        res.json::<Value>().await.unwrap(),
        json!({ "error": "Upstream request timed out" })
    );
}

#[tokio::test]
async fn disabled_passthrough_is_not_routed() {
    let backend = start_mock_backend(Reply::json(200, "[]")).await;
    let mut config = config_for(&backend.base_url());
    config.passthrough.enabled = false;
    let gateway = start_gateway(config).await;

    let res = client().get(gateway.url("/api/recipe")).send().await.unwrap();

    assert_eq!(res.status(), 404);
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn oversized_generation_bodies_are_rejected_as_json() {
    let backend = start_mock_backend(Reply::json(200, "{}")).await;
    let mut config = config_for(&backend.base_url());
    config.security.max_body_size = 64;
    let gateway = start_gateway(config).await;

    let res = client()
        .post(gateway.url("/api/recipe/generate"))
        .header("Authorization", "Bearer abc")
        .body(format!(r#"{{"padding":"{}"}}"#, "x".repeat(256)))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 413);
    assert_eq!(
        res.headers()["content-type"].to_str().unwrap(),
        "application/json"
    );
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Recipe generation request could not be read");
    assert!(body["details"].is_string());
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn oversized_passthrough_bodies_never_reach_backend() {
    let backend = start_mock_backend(Reply::json(200, "{}")).await;
    let mut config = config_for(&backend.base_url());
    config.security.max_body_size = 64;
    let gateway = start_gateway(config).await;

    let res = client()
        .post(gateway.url("/api/requirement"))
        .body("x".repeat(256))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 413);
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn health_reports_version() {
    let gateway = start_gateway(config_for("http://127.0.0.1:9")).await;

    let res = client().get(gateway.url("/healthz")).send().await.unwrap();

    assert_eq!(res.status(), 200);
    assert!(res.headers().get("x-request-id").is_some());
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn reload_points_at_new_backend() {
    let old = start_mock_backend(Reply::json(200, r#""old""#)).await;
    let new = start_mock_backend(Reply::json(200, r#""new""#)).await;
    let gateway = start_gateway(config_for(&old.base_url())).await;

    gateway
        .config_updates
        .send(config_for(&new.base_url()))
        .unwrap();

    let mut body = String::new();
    for _ in 0..50 {
        body = client()
            .get(gateway.url("/api/recipe"))
            .send()
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        if body == r#""new""# {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    assert_eq!(body, r#""new""#);
    assert!(new.calls() >= 1);
}
