use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::warn;

use crate::error::ApiError;

/// Key under which the identity claim lives in the session record.
pub const SESSION_USER_KEY: &str = "user";

/// Identity claim trusted for the duration of a session.
///
/// Snapshot taken at login: an admin promotion after login is not visible
/// until the user logs in again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: i64,
    pub email: String,
    pub is_admin: bool,
}

/// Extracts the session claim, rejecting unauthenticated requests.
///
/// A session whose claim no longer deserializes is flushed rather than
/// trusted; resource-level ownership checks stay in the handlers.
pub struct CurrentUser(pub SessionUser);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::Unauthorized)?;

        match session.get::<SessionUser>(SESSION_USER_KEY).await {
            Ok(Some(user)) => Ok(CurrentUser(user)),
            Ok(None) => Err(ApiError::Unauthorized),
            Err(e) => {
                warn!(error = %e, "malformed session claim, clearing session");
                let _ = session.flush().await;
                Err(ApiError::Unauthorized)
            }
        }
    }
}
