use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct UserPostItem {
    pub id: i64,
    pub content: String,
}

/// A user's posts keyed by their email. `posts` is empty, not an error,
/// for a user who has written nothing.
#[derive(Debug, Serialize)]
pub struct UserPostsResponse {
    pub email: String,
    pub posts: Vec<UserPostItem>,
}
