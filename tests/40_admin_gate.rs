mod common;

use anyhow::Result;
use common::TestServer;
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};
use storefront_api::auth::{Role, TokenKeys};
use storefront_api::database::models::User;

const SOME_ID: &str = "7f0d6c1e-9b1c-4c3a-8a52-0f1f4a8e2b11";

/// Every admin write, with a body the handler would accept.
fn writes(existing: &str) -> Vec<(Method, String, Option<Value>)> {
    vec![
        (
            Method::POST,
            "/api/products".to_string(),
            Some(json!({ "name": "Intruder", "price": 1 })),
        ),
        (
            Method::PUT,
            format!("/api/products/{}", existing),
            Some(json!({ "price": 0 })),
        ),
        (Method::DELETE, format!("/api/products/{}", existing), None),
    ]
}

async fn send(
    server: &TestServer,
    method: Method,
    path: &str,
    body: Option<&Value>,
    auth: Option<&str>,
) -> Result<reqwest::Response> {
    let mut req = server.client.request(method, server.url(path));
    if let Some(auth) = auth {
        req = req.header("authorization", auth);
    }
    if let Some(body) = body {
        req = req.json(body);
    }
    Ok(req.send().await?)
}

async fn snapshot(server: &TestServer) -> Result<Value> {
    Ok(server
        .client
        .get(server.url("/api/products"))
        .send()
        .await?
        .json()
        .await?)
}

#[tokio::test]
async fn writes_without_valid_token_leave_store_unchanged() -> Result<()> {
    let server = TestServer::start().await?;
    let existing = server.create_product(json!({ "name": "Keeper", "price": 5 })).await?;
    let id = existing["id"].as_str().unwrap().to_string();
    let before = snapshot(&server).await?;

    let foreign = TokenKeys::new("some-other-secret", "storefront-api", 1);
    let forged = foreign.issue(&User::create(
        "Mallory".into(),
        "mallory@shop.test".into(),
        String::new(),
        Role::Admin,
    ))?;

    let rejected_headers = [
        None,
        Some("Token abc".to_string()),
        Some("Bearer ".to_string()),
        Some("Bearer not.a.jwt".to_string()),
        Some(format!("Bearer {}", forged)),
    ];

    for (method, path, body) in writes(&id) {
        for auth in &rejected_headers {
            let res = send(&server, method.clone(), &path, body.as_ref(), auth.as_deref()).await?;
            assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "{} {} with {:?}", method, path, auth);
            assert_eq!(res.json::<Value>().await?["error"], "UNAUTHORIZED");
        }
    }

    assert_eq!(snapshot(&server).await?, before);
    Ok(())
}

#[tokio::test]
async fn user_role_is_forbidden_from_writes() -> Result<()> {
    let server = TestServer::start().await?;
    let existing = server.create_product(json!({ "name": "Keeper", "price": 5 })).await?;
    let id = existing["id"].as_str().unwrap().to_string();
    let before = snapshot(&server).await?;

    let bearer = format!("Bearer {}", server.token_for(Role::User));
    for (method, path, body) in writes(&id) {
        let res = send(&server, method.clone(), &path, body.as_ref(), Some(&bearer)).await?;
        assert_eq!(res.status(), StatusCode::FORBIDDEN, "{} {}", method, path);
        let err: Value = res.json().await?;
        assert_eq!(err["error"], "FORBIDDEN");
        assert_eq!(err["msg"], "Admin access required");
    }

    assert_eq!(snapshot(&server).await?, before);
    Ok(())
}

#[tokio::test]
async fn gate_rejects_before_looking_at_the_target() -> Result<()> {
    let server = TestServer::start().await?;

    // An absent id still reports the auth failure, not 404
    let res = send(&server, Method::DELETE, &format!("/api/products/{}", SOME_ID), None, None).await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn seeded_admin_can_log_in_and_write() -> Result<()> {
    let server = TestServer::start().await?;
    server.seed_user("root@shop.test", "admin-password", Role::Admin).await?;

    let session: Value = server
        .client
        .post(server.url("/api/users/login"))
        .json(&json!({ "email": "root@shop.test", "password": "admin-password" }))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(session["user"]["role"], "admin");
    let token = session["token"].as_str().expect("token");

    let res = server
        .client
        .post(server.url("/api/products"))
        .bearer_auth(token)
        .json(&json!({ "name": "Official", "price": 2.5 }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(server.product_count().await?, 1);
    Ok(())
}
