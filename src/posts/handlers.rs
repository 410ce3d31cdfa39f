use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};

use crate::auth::session::{CurrentUser, SessionUser};
use crate::error::ApiError;
use crate::state::AppState;
use crate::users::repo::User;

use super::dto::{CreatePostRequest, MessageResponse, PostInfo, PostOwner, UpdatePostRequest};
use super::repo::{Post, PostWithAuthor};

pub fn post_routes() -> Router<AppState> {
    Router::new()
        .route("/posts", get(list_posts).post(create_post))
        .route("/posts/:id", get(get_post).patch(update_post).delete(delete_post))
        .route("/posts/:id/info", get(get_post_info))
}

/// Mutation rule: the owner or any admin, nobody else.
pub(crate) fn can_modify(user: &SessionUser, owner_id: i64) -> bool {
    user.is_admin || user.id == owner_id
}

/// Path ids arrive as strings so a non-integer maps to a 422 validation
/// detail instead of the router's default rejection.
pub(crate) fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>()
        .map_err(|_| ApiError::Validation(format!("invalid id: {raw}")))
}

#[instrument(skip(state))]
pub async fn list_posts(
    State(state): State<AppState>,
) -> Result<Json<Vec<PostWithAuthor>>, ApiError> {
    let posts = Post::list_with_authors(&state.db).await?;
    Ok(Json(posts))
}

#[instrument(skip(state, payload))]
pub async fn create_post(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<Post>), ApiError> {
    // Re-resolve the claim's email: the row may have vanished out-of-band
    // since login.
    let owner = User::find_by_email(&state.db, &user.email)
        .await?
        .ok_or(ApiError::UserNotFound)?;

    let created = Post::create(&state.db, owner.id, &payload.content).await?;
    info!(post_id = created.id, user_id = owner.id, "post created");
    Ok((StatusCode::CREATED, Json(created)))
}

#[instrument(skip(state))]
pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Post>, ApiError> {
    let id = parse_id(&id)?;
    let found = Post::find(&state.db, id).await?.ok_or(ApiError::PostNotFound)?;
    Ok(Json(found))
}

#[instrument(skip(state))]
pub async fn get_post_info(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PostInfo>, ApiError> {
    let id = parse_id(&id)?;
    let row = Post::find_with_author(&state.db, id)
        .await?
        .ok_or(ApiError::PostNotFound)?;
    Ok(Json(PostInfo {
        id: row.id,
        content: row.content,
        user_id: row.user_id,
        user: row.user_email.map(|email| PostOwner { email }),
    }))
}

#[instrument(skip(state, payload))]
pub async fn update_post(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdatePostRequest>,
) -> Result<Json<Post>, ApiError> {
    let id = parse_id(&id)?;
    let existing = Post::find(&state.db, id).await?.ok_or(ApiError::PostNotFound)?;
    if !can_modify(&user, existing.user_id) {
        return Err(ApiError::Forbidden);
    }

    let updated = Post::update_content(&state.db, id, &payload.content).await?;
    info!(post_id = id, user_id = user.id, "post updated");
    Ok(Json(updated))
}

#[instrument(skip(state))]
pub async fn delete_post(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = parse_id(&id)?;
    let existing = Post::find(&state.db, id).await?.ok_or(ApiError::PostNotFound)?;
    if !can_modify(&user, existing.user_id) {
        return Err(ApiError::Forbidden);
    }

    Post::delete(&state.db, id).await?;
    info!(post_id = id, user_id = user.id, "post deleted");
    Ok(Json(MessageResponse {
        message: "Post deleted".into(),
    }))
}
