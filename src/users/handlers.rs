use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use tracing::instrument;

use crate::error::ApiError;
use crate::posts::handlers::parse_id;
use crate::posts::repo::Post;
use crate::state::AppState;

use super::dto::{UserPostItem, UserPostsResponse};
use super::repo::User;

pub fn user_routes() -> Router<AppState> {
    Router::new().route("/user/:id/posts", get(get_user_posts))
}

#[instrument(skip(state))]
pub async fn get_user_posts(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UserPostsResponse>, ApiError> {
    let id = parse_id(&id)?;
    let user = User::find_by_id(&state.db, id)
        .await?
        .ok_or(ApiError::UserNotFound)?;

    let posts = Post::list_by_user(&state.db, user.id).await?;
    Ok(Json(UserPostsResponse {
        email: user.email,
        posts: posts
            .into_iter()
            .map(|p| UserPostItem {
                id: p.id,
                content: p.content,
            })
            .collect(),
    }))
}
