pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod state;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    normalize_path::NormalizePath,
    trace::TraceLayer,
};

use crate::middleware::gate::{enforce, Gate};
use crate::state::AppState;

/// Build the full HTTP application around injected state.
pub fn app(state: AppState) -> Router {
    let body_limit = state.config.api.max_request_size_bytes;
    let cors = cors_layer(&state);

    Router::new()
        // Public
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .nest("/api/products", product_routes(&state))
        .nest("/api/users", user_routes(&state))
        // Global middleware
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// The application as served. Trailing slashes are trimmed before routing,
/// so `/api/products/` reaches the same handlers as `/api/products`.
pub fn service(state: AppState) -> NormalizePath<Router> {
    NormalizePath::trim_trailing_slash(app(state))
}

fn product_routes(state: &AppState) -> Router<AppState> {
    use handlers::products;

    let admin = Router::new()
        .route("/", post(products::create))
        .route("/:id", put(products::update).delete(products::delete))
        .route_layer(from_fn_with_state((state.clone(), Gate::admin()), enforce));

    Router::new()
        .route("/", get(products::list))
        .route("/:id", get(products::show))
        .merge(admin)
}

fn user_routes(state: &AppState) -> Router<AppState> {
    use handlers::users;

    let authenticated = Router::new()
        .route("/me", get(users::me))
        .route_layer(from_fn_with_state((state.clone(), Gate::authenticated()), enforce));

    Router::new()
        .route("/register", post(users::register))
        .route("/login", post(users::login))
        .merge(authenticated)
}

fn cors_layer(state: &AppState) -> CorsLayer {
    if state.config.is_development() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = state
        .config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use crate::config::AppConfig;
    use crate::database::models::User;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn test_state() -> AppState {
        AppState::in_memory(AppConfig::for_tests("test-secret"))
    }

    fn token(state: &AppState, role: Role) -> String {
        let user = User::create("T".into(), "t@example.com".into(), String::new(), role);
        state.tokens.issue(&user).unwrap()
    }

    async fn send(state: &AppState, req: Request<Body>) -> (StatusCode, Value) {
        let res = app(state.clone()).oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn post_product(token: Option<&str>, body: &str) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/api/products")
            .header("content-type", "application/json");
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    #[tokio::test]
    async fn root_banner() {
        let res = app(test_state())
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"E-commerce API is running...");
    }

    #[tokio::test]
    async fn gate_runs_before_body_parsing() {
        let state = test_state();
        let (status, body) = send(&state, post_product(None, "{broken")).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn non_admin_cannot_create() {
        let state = test_state();
        let user_token = token(&state, Role::User);
        let (status, body) = send(
            &state,
            post_product(Some(&user_token), r#"{"name":"Widget","price":1}"#),
        )
        .await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["msg"], "Admin access required");
        assert!(state.products.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn admin_creates_and_anyone_reads() {
        let state = test_state();
        let admin = token(&state, Role::Admin);
        let (status, created) = send(
            &state,
            post_product(Some(&admin), r#"{"name":"Widget","price":9.99}"#),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let uri = format!("/api/products/{}", created["id"].as_str().unwrap());
        let (status, fetched) = send(&state, Request::get(uri).body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["name"], "Widget");
        assert_eq!(fetched["price"], json!(9.99));
    }

    #[tokio::test]
    async fn invalid_product_is_rejected_with_field_errors() {
        let state = test_state();
        let admin = token(&state, Role::Admin);
        let (status, body) = send(
            &state,
            post_product(Some(&admin), r#"{"name":"","price":-2}"#),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "VALIDATION_ERROR");
        assert!(body["field_errors"]["price"].is_string());
    }

    #[tokio::test]
    async fn oversized_body_is_payload_too_large() {
        let mut config = AppConfig::for_tests("test-secret");
        config.api.max_request_size_bytes = 64;
        let state = AppState::in_memory(config);
        let admin = token(&state, Role::Admin);

        let body = format!(r#"{{"name":"{}","price":1}}"#, "x".repeat(200));
        let (status, err) = send(&state, post_product(Some(&admin), &body)).await;

        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(err["error"], "PAYLOAD_TOO_LARGE");
        assert!(state.products.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn malformed_id_reads_as_not_found() {
        let state = test_state();
        let (status, body) = send(
            &state,
            Request::get("/api/products/not-a-uuid").body(Body::empty()).unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "error": "NOT_FOUND", "msg": "Product not found" }));
    }

    #[tokio::test]
    async fn me_requires_token() {
        let state = test_state();
        let (status, _) = send(
            &state,
            Request::get("/api/users/me").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
