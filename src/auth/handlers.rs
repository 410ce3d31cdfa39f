use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Redirect},
    routing::get,
    Router,
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{info, instrument};

use crate::auth::services::establish_identity;
use crate::auth::session::SESSION_USER_KEY;
use crate::error::ApiError;
use crate::state::AppState;

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(login))
        .route("/callback", get(callback))
        .route("/logout", get(logout))
}

/// 302 Found; axum's `Redirect` only offers 303/307/308.
fn found(location: String) -> impl IntoResponse {
    (StatusCode::FOUND, [(header::LOCATION, location)])
}

#[instrument(skip(state))]
pub async fn login(State(state): State<AppState>) -> impl IntoResponse {
    found(state.identity.authorize_url())
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: String,
}

#[instrument(skip(state, session, query))]
pub async fn callback(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<CallbackQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let claims = state
        .identity
        .exchange_code(&query.code)
        .await
        .map_err(ApiError::Internal)?;

    let user = establish_identity(&state, &claims).await?;
    session.insert(SESSION_USER_KEY, user.clone()).await?;

    info!(user_id = user.id, "login complete");
    Ok(found(state.config.oauth.post_login_redirect.clone()))
}

#[instrument(skip(state, session))]
pub async fn logout(
    State(state): State<AppState>,
    session: Session,
) -> Result<impl IntoResponse, ApiError> {
    session.flush().await?;
    Ok(Redirect::temporary(&state.identity.logout_url()))
}
