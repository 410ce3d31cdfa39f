use lazy_static::lazy_static;
use regex::Regex;
use tracing::info;

use crate::auth::provider::IdentityClaims;
use crate::auth::session::SessionUser;
use crate::error::ApiError;
use crate::state::AppState;
use crate::users::repo::User;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Pull a usable email out of the provider claims.
///
/// A missing, blank, or shape-invalid email is the same failure: the
/// provider did not give us an identity we can map to a local account.
pub(crate) fn claim_email(claims: &IdentityClaims) -> Result<String, ApiError> {
    let email = claims
        .email
        .as_deref()
        .map(|e| e.trim().to_lowercase())
        .unwrap_or_default();
    if !is_valid_email(&email) {
        return Err(ApiError::InvalidIdentity);
    }
    Ok(email)
}

/// Map provider claims to a local account and build the session claim.
///
/// Creates the User row on first login and persists an allow-list admin
/// promotion; at most one row is created or updated per call.
pub async fn establish_identity(
    state: &AppState,
    claims: &IdentityClaims,
) -> Result<SessionUser, ApiError> {
    let email = claim_email(claims)?;
    let grant_admin = state.config.is_admin_email(&email);

    let user = User::find_or_create_for_login(&state.db, &email, grant_admin).await?;
    info!(user_id = user.id, email = %user.email, is_admin = user.is_admin, "identity established");

    Ok(SessionUser {
        id: user.id,
        email: user.email,
        is_admin: user.is_admin,
    })
}
