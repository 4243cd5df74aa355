//! HTTP API
//!
//! - [`health`] - liveness
//! - [`scopes`] - scope claims
//! - [`items`] - listing, create, rename, delete and reorder within a scope

pub mod health;
pub mod items;
pub mod scopes;

use axum::{Router, middleware};
use http::HeaderName;
use shared::{AppResult, ScopeKey};
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::auth::require_auth;
use crate::core::ServerState;

const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// All routes, without state
pub fn build_router() -> Router<ServerState> {
    Router::<ServerState>::new()
        .merge(health::router())
        .merge(scopes::router())
        .merge(items::router())
}

/// Routes plus auth, tracing, request ids, timeout and CORS, bound to `state`
pub fn build_app(state: ServerState) -> Router {
    let timeout = state.config.request_timeout();

    build_router()
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state)
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::new(REQUEST_ID_HEADER))
        .layer(SetRequestIdLayer::new(REQUEST_ID_HEADER, MakeRequestUuid))
        .layer(CorsLayer::permissive())
}

/// Scope from the `{kind}/{parent}` path segments
pub(crate) fn scope_from_path(kind: &str, parent: String) -> AppResult<ScopeKey> {
    ScopeKey::new(kind.parse()?, parent)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use http::{Request, StatusCode};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::auth::{JwtConfig, JwtService};
    use crate::core::Config;
    use crate::storage::ItemStorage;

    fn test_state() -> ServerState {
        let mut config = Config::with_overrides("/tmp/studyhall-api-test", 0);
        config.jwt = JwtConfig {
            secret: "api-test-secret-api-test-secret-0".to_string(),
            expiration_minutes: 5,
            issuer: "studyhall-server".to_string(),
            audience: "studyhall-clients".to_string(),
        };
        let jwt = Arc::new(JwtService::with_config(config.jwt.clone()));
        ServerState::new(config, ItemStorage::open_in_memory().unwrap(), jwt)
    }

    fn token(state: &ServerState, user: &str) -> String {
        state.jwt_service.generate_token(user, user).unwrap()
    }

    async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value, http::HeaderMap) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json");
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        let body = body.map_or_else(Body::empty, |b| Body::from(b.to_string()));
        let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json, headers)
    }

    #[tokio::test]
    async fn test_health_is_public_and_tagged() {
        let app = build_app(test_state());
        let (status, body, headers) = send(&app, "GET", "/health", None, None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert!(headers.contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_api_requires_token() {
        let app = build_app(test_state());
        let (status, body, _) =
            send(&app, "GET", "/api/scopes/folder/user-1/items", None, None).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], 1001);
    }

    #[tokio::test]
    async fn test_claim_create_list_and_reorder() {
        let state = test_state();
        let app = build_app(state.clone());
        let t = token(&state, "user-1");

        let (status, _, _) = send(
            &app,
            "POST",
            "/api/scopes",
            Some(&t),
            Some(json!({"kind": "folder", "parent": "user-1"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let mut ids = Vec::new();
        for title in ["A", "B", "C"] {
            let (status, body, _) = send(
                &app,
                "POST",
                "/api/scopes/folder/user-1/items",
                Some(&t),
                Some(json!({ "title": title })),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
            ids.push(body["data"]["id"].as_i64().unwrap());
        }

        // move C onto A
        let plan = json!({
            "moved_id": ids[2],
            "moved_order": 1,
            "shifted": [{"id": ids[0], "order": 2}, {"id": ids[1], "order": 3}],
            "direction": "UP"
        });
        let (status, body, _) = send(
            &app,
            "PUT",
            "/api/scopes/folder/user-1/sort-order",
            Some(&t),
            Some(plan.clone()),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let titles: Vec<&str> = body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|i| i["title"].as_str().unwrap())
            .collect();
        assert_eq!(titles, ["C", "A", "B"]);

        // same plan again no longer matches the stored orders
        let (status, body, _) = send(
            &app,
            "PUT",
            "/api/scopes/folder/user-1/sort-order",
            Some(&t),
            Some(plan),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], 4003);
    }

    #[tokio::test]
    async fn test_other_users_scope_is_forbidden() {
        let state = test_state();
        let app = build_app(state.clone());
        let owner = token(&state, "user-1");
        let intruder = token(&state, "user-2");

        send(
            &app,
            "POST",
            "/api/scopes",
            Some(&owner),
            Some(json!({"kind": "folder", "parent": "user-1"})),
        )
        .await;

        let (status, body, _) = send(
            &app,
            "GET",
            "/api/scopes/folder/user-1/items",
            Some(&intruder),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["code"], 2002);
    }

    #[tokio::test]
    async fn test_unknown_kind_is_bad_request() {
        let state = test_state();
        let app = build_app(state.clone());
        let t = token(&state, "user-1");

        let (status, _, _) =
            send(&app, "GET", "/api/scopes/chapter/user-1/items", Some(&t), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_rename_and_delete() {
        let state = test_state();
        let app = build_app(state.clone());
        let t = token(&state, "user-1");

        send(
            &app,
            "POST",
            "/api/scopes",
            Some(&t),
            Some(json!({"kind": "note", "parent": "folder-1"})),
        )
        .await;
        let (_, created, _) = send(
            &app,
            "POST",
            "/api/scopes/note/folder-1/items",
            Some(&t),
            Some(json!({"title": "Draft"})),
        )
        .await;
        let id = created["data"]["id"].as_i64().unwrap();
        let uri = format!("/api/scopes/note/folder-1/items/{}", id);

        let (status, body, _) =
            send(&app, "PUT", &uri, Some(&t), Some(json!({"title": "Final"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["title"], "Final");
        assert_eq!(body["data"]["order"], 1);

        let (status, _, _) = send(&app, "DELETE", &uri, Some(&t), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body, _) = send(&app, "DELETE", &uri, Some(&t), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], 4002);
    }

    #[tokio::test]
    async fn test_blank_title_is_rejected() {
        let state = test_state();
        let app = build_app(state.clone());
        let t = token(&state, "user-1");

        send(
            &app,
            "POST",
            "/api/scopes",
            Some(&t),
            Some(json!({"kind": "folder", "parent": "user-1"})),
        )
        .await;
        let (status, _, _) = send(
            &app,
            "POST",
            "/api/scopes/folder/user-1/items",
            Some(&t),
            Some(json!({"title": "   "})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
