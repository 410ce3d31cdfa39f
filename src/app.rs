use std::net::SocketAddr;

use anyhow::Context;
use axum::{routing::get, Json, Router};
use serde_json::json;
use time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tower_sessions::{
    cookie::Key, service::SignedCookie, Expiry, SessionManagerLayer, SessionStore,
};

use crate::state::AppState;
use crate::{auth, posts, users};

/// Signed-cookie session layer over the given store.
///
/// The cookie carries only the session id; the record itself lives in the
/// store. The signing key comes from `SESSION_SECRET`, which must be at
/// least 64 bytes.
pub fn session_layer<Store>(
    store: Store,
    secret: &str,
) -> anyhow::Result<SessionManagerLayer<Store, SignedCookie>>
where
    Store: SessionStore + Clone,
{
    let key = Key::try_from(secret.as_bytes())
        .context("SESSION_SECRET must be at least 64 bytes")?;
    Ok(SessionManagerLayer::new(store)
        .with_secure(false)
        .with_expiry(Expiry::OnInactivity(Duration::days(7)))
        .with_signed(key))
}

pub fn build_app<Store>(
    state: AppState,
    sessions: SessionManagerLayer<Store, SignedCookie>,
) -> Router
where
    Store: SessionStore + Clone,
{
    Router::new()
        .merge(auth::router())
        .merge(posts::router())
        .merge(users::router())
        .route("/health", get(health))
        .layer(sessions)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri)
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     _latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        if status.is_server_error() {
                            tracing::error!(%status, "response");
                        } else {
                            tracing::info!(%status, "response");
                        }
                    },
                ),
        )
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn serve(app: Router) -> anyhow::Result<()> {
    let addr: SocketAddr = format!(
        "{}:{}",
        std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
        std::env::var("APP_PORT").unwrap_or_else(|_| "8080".into())
    )
    .parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;
    use tower_sessions::MemoryStore;

    // Routes exercised here never reach the database; the faked state's
    // lazy pool would only connect on first query.
    fn test_app() -> Router {
        let state = AppState::fake();
        let sessions = session_layer(MemoryStore::default(), &state.config.session_secret)
            .expect("session layer should build");
        build_app(state, sessions)
    }

    async fn body_json(body: Body) -> serde_json::Value {
        let bytes = body.collect().await.expect("collect body").to_bytes();
        serde_json::from_slice(&bytes).expect("body should be json")
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let res = test_app()
            .oneshot(Request::get("/health").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_json(res.into_body()).await, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn login_redirects_to_provider() {
        let res = test_app()
            .oneshot(Request::get("/login").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(res.status(), StatusCode::FOUND);
        let location = res
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .expect("location header");
        assert!(location.starts_with("https://fake.auth.local/authorize"));
    }

    #[tokio::test]
    async fn logout_redirects_to_provider_logout() {
        let res = test_app()
            .oneshot(Request::get("/logout").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
        let location = res
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .expect("location header");
        assert!(location.starts_with("https://fake.auth.local/v2/logout"));
    }

    #[tokio::test]
    async fn create_post_without_session_is_unauthorized() {
        let res = test_app()
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/posts")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"content": "hello"}"#))
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            body_json(res.into_body()).await,
            json!({ "detail": "Not authenticated" })
        );
    }

    #[tokio::test]
    async fn update_post_without_session_is_unauthorized() {
        let res = test_app()
            .oneshot(
                Request::builder()
                    .method(Method::PATCH)
                    .uri("/posts/1")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"content": "hello"}"#))
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn non_integer_post_id_is_unprocessable() {
        let res = test_app()
            .oneshot(Request::get("/posts/abc").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(res.into_body()).await;
        assert!(body["detail"]
            .as_str()
            .expect("detail string")
            .contains("invalid id"));
    }

    #[tokio::test]
    async fn callback_without_code_is_rejected() {
        let res = test_app()
            .oneshot(Request::get("/callback").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
