use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePostRequest {
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct PostOwner {
    pub email: String,
}

/// Detail view with the owner nested; `user` is null when the owning row
/// no longer exists.
#[derive(Debug, Serialize)]
pub struct PostInfo {
    pub id: i64,
    pub content: String,
    pub user_id: i64,
    pub user: Option<PostOwner>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}
