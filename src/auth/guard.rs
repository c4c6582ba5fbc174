//! Access control guard: per-request authentication and role checks.
//!
//! State machine per request: no token -> token present -> valid | invalid.
//! A valid token alone is not enough: the referenced account must still
//! exist (and be active), and must not have changed its password after the
//! token was issued.

use axum::{extract::FromRequestParts, http::request::Parts};
use chrono::{DateTime, Utc};
use tracing::{debug, instrument, trace};

use crate::{
    api::models::users::{CurrentUser, Role},
    auth::session,
    db::{errors::DbError, handlers::repository::Repository, handlers::Users},
    errors::{Error, Result},
    AppState,
};

/// Pull the session token out of a request: `Authorization: Bearer <token>`
/// first, session cookie second.
fn extract_token(parts: &Parts, cookie_name: &str) -> Option<String> {
    if let Some(auth_header) = parts.headers.get(axum::http::header::AUTHORIZATION) {
        if let Ok(auth_str) = auth_header.to_str() {
            if let Some(token) = auth_str.strip_prefix("Bearer ") {
                if !token.is_empty() {
                    return Some(token.to_string());
                }
            }
        }
    }

    let cookie_header = parts.headers.get(axum::http::header::COOKIE)?;
    let cookie_str = cookie_header.to_str().ok()?;

    for cookie in cookie_str.split(';') {
        let cookie = cookie.trim();
        if let Some((name, value)) = cookie.split_once('=') {
            if name == cookie_name && !value.is_empty() {
                return Some(value.to_string());
            }
        }
    }
    None
}

/// Whether the account's credential changed after the token was issued.
///
/// Strictly after: a password change and a token issued in the same second
/// do not invalidate each other (the change timestamp is backdated a second
/// at write time, see `Users::set_password`).
pub fn changed_after_issuance(password_changed_at: Option<DateTime<Utc>>, token_issued_at: i64) -> bool {
    match password_changed_at {
        Some(changed_at) => changed_at.timestamp() > token_issued_at,
        None => false,
    }
}

/// Authenticate a request: extract the token, verify it, load the account,
/// and apply the credential-change check.
#[instrument(skip(parts, state))]
pub async fn authenticate(parts: &Parts, state: &AppState) -> Result<CurrentUser> {
    let token = extract_token(parts, &state.config.auth.session.cookie_name).ok_or(Error::Unauthenticated {
        message: Some("You are not logged in".to_string()),
    })?;

    let claims = session::verify_session_token(&token, &state.config)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(DbError::from(e)))?;
    let mut users = Users::new(&mut conn);

    // Soft-deleted accounts fail the lookup: the repository's default
    // active-only filter is what revokes their sessions.
    let account = users.get_by_id(claims.sub).await?.ok_or(Error::Unauthenticated {
        message: Some("The account belonging to this session no longer exists".to_string()),
    })?;

    if changed_after_issuance(account.password_changed_at, claims.iat) {
        return Err(Error::Unauthenticated {
            message: Some("Password was changed recently. Please log in again".to_string()),
        });
    }

    trace!("Authenticated account: {}", account.id);
    Ok(CurrentUser::from(account))
}

/// Role check: fails `Forbidden` when the account's role is not in the
/// allowed set. The allowed roles are an explicit parameter at each call
/// site, never implicit route state.
pub fn authorize(user: &CurrentUser, allowed_roles: &[Role]) -> Result<()> {
    if allowed_roles.contains(&user.role) {
        Ok(())
    } else {
        Err(Error::Forbidden {
            action: "perform this action".to_string(),
        })
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    #[instrument(skip(parts, state))]
    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let user = authenticate(parts, state).await?;
        debug!("Found authenticated account: {}", user.id);
        Ok(user)
    }
}

/// Optional identity for endpoints that personalise output for logged-in
/// users but never require login.
///
/// Unlike [`CurrentUser`], extraction cannot fail: any token problem
/// (missing, malformed, expired, revoked by password change) degrades to
/// anonymous. This swallowing is deliberate and limited to this extractor.
pub struct MaybeUser(pub Option<CurrentUser>);

impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = std::convert::Infallible;

    #[instrument(skip(parts, state))]
    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> std::result::Result<Self, Self::Rejection> {
        match authenticate(parts, state).await {
            Ok(user) => Ok(MaybeUser(Some(user))),
            Err(e) => {
                trace!("Optional identification failed, continuing as anonymous: {:?}", e);
                Ok(MaybeUser(None))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn parts_with_header(name: &str, value: &str) -> Parts {
        let request = axum::http::Request::builder()
            .uri("http://localhost/test")
            .header(name, value)
            .body(())
            .unwrap();
        let (parts, _body) = request.into_parts();
        parts
    }

    #[test]
    fn test_extract_token_bearer_header() {
        let parts = parts_with_header("authorization", "Bearer my-token");
        assert_eq!(extract_token(&parts, "session"), Some("my-token".to_string()));
    }

    #[test]
    fn test_extract_token_cookie() {
        let parts = parts_with_header("cookie", "other=1; session=cookie-token; theme=dark");
        assert_eq!(extract_token(&parts, "session"), Some("cookie-token".to_string()));
    }

    #[test]
    fn test_extract_token_header_wins_over_cookie() {
        let request = axum::http::Request::builder()
            .uri("http://localhost/test")
            .header("authorization", "Bearer header-token")
            .header("cookie", "session=cookie-token")
            .body(())
            .unwrap();
        let (parts, _body) = request.into_parts();
        assert_eq!(extract_token(&parts, "session"), Some("header-token".to_string()));
    }

    #[test]
    fn test_extract_token_absent() {
        let request = axum::http::Request::builder().uri("http://localhost/test").body(()).unwrap();
        let (parts, _body) = request.into_parts();
        assert_eq!(extract_token(&parts, "session"), None);

        // Non-Bearer authorization schemes are ignored
        let parts = parts_with_header("authorization", "Basic dXNlcjpwYXNz");
        assert_eq!(extract_token(&parts, "session"), None);

        // Empty cookie value counts as absent
        let parts = parts_with_header("cookie", "session=");
        assert_eq!(extract_token(&parts, "session"), None);
    }

    #[test]
    fn test_changed_after_issuance() {
        let iat = Utc::now().timestamp();

        // Never-changed password: always fine
        assert!(!changed_after_issuance(None, iat));

        // Changed before issuance: fine
        let before = Utc::now() - chrono::Duration::hours(1);
        assert!(!changed_after_issuance(Some(before), iat));

        // Changed after issuance: token revoked
        let after = Utc::now() + chrono::Duration::hours(1);
        assert!(changed_after_issuance(Some(after), iat));

        // Same second: not revoked (strictly-after comparison)
        let same = DateTime::<Utc>::from_timestamp(iat, 0).unwrap();
        assert!(!changed_after_issuance(Some(same), iat));
    }

    #[test]
    fn test_authorize_roles() {
        let user = CurrentUser {
            id: Uuid::new_v4(),
            name: "Someone".to_string(),
            email: "someone@example.com".to_string(),
            role: Role::User,
        };

        // Standard user against an admin-only set
        let result = authorize(&user, &[Role::Admin, Role::LeadGuide]);
        assert!(matches!(result, Err(Error::Forbidden { .. })));
        assert_eq!(result.unwrap_err().status_code(), axum::http::StatusCode::FORBIDDEN);

        // Admin against an admin set
        let admin = CurrentUser { role: Role::Admin, ..user.clone() };
        assert!(authorize(&admin, &[Role::Admin]).is_ok());

        // User allowed where users are in the set
        assert!(authorize(&user, &[Role::User]).is_ok());
    }
}
