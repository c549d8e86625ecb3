#![allow(dead_code)]

use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::{extract::Request, ServiceExt};
use serde_json::Value;
use storefront_api::auth::password::hash_password;
use storefront_api::auth::Role;
use storefront_api::config::AppConfig;
use storefront_api::database::models::User;
use storefront_api::state::AppState;

pub const JWT_SECRET: &str = "integration-test-secret";

/// One server per test, bound on a free port. In-memory unless built with
/// [`TestServer::start_with`].
///
/// The listener is bound before `start` returns, so requests can be sent
/// immediately. The server task dies with the test's runtime.
pub struct TestServer {
    pub base_url: String,
    pub state: AppState,
    pub client: reqwest::Client,
}

impl TestServer {
    pub async fn start() -> Result<Self> {
        Self::start_with(AppState::in_memory(AppConfig::for_tests(JWT_SECRET))).await
    }

    /// Serve prebuilt state, e.g. one backed by Postgres.
    pub async fn start_with(state: AppState) -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let addr = SocketAddr::from(([127, 0, 0, 1], port));
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind {}", addr))?;

        let service = storefront_api::service(state.clone());
        tokio::spawn(async move {
            let _ = axum::serve(listener, ServiceExt::<Request>::into_make_service(service)).await;
        });

        Ok(Self {
            base_url: format!("http://{}", addr),
            state,
            client: reqwest::Client::new(),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Token for a user that exists only in the claims, never in the store.
    pub fn token_for(&self, role: Role) -> String {
        let user = User::create(
            "Token Holder".into(),
            format!("{}@shop.test", role),
            String::new(),
            role,
        );
        self.state.tokens.issue(&user).expect("issue token")
    }

    pub fn admin_token(&self) -> String {
        self.token_for(Role::Admin)
    }

    /// Insert an account straight into the store, for roles HTTP cannot create.
    pub async fn seed_user(&self, email: &str, password: &str, role: Role) -> Result<User> {
        let hash = hash_password(password)?;
        let user = self
            .state
            .users
            .insert(User::create("Seeded".into(), email.into(), hash, role))
            .await?;
        Ok(user)
    }

    /// POST a product as admin and return the created document.
    pub async fn create_product(&self, body: Value) -> Result<Value> {
        let res = self
            .client
            .post(self.url("/api/products"))
            .bearer_auth(self.admin_token())
            .json(&body)
            .send()
            .await?;
        anyhow::ensure!(res.status().is_success(), "create failed: {}", res.status());
        Ok(res.json().await?)
    }

    pub async fn product_count(&self) -> Result<usize> {
        Ok(self.state.products.list().await?.len())
    }
}
