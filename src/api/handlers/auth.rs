//! Authentication handlers: signup, login, logout, and the password
//! lifecycle (forgot / reset / update).
//!
//! These orchestrate the hasher, the token service, account-store writes,
//! and email dispatch. Side effects are transactional at single-account
//! granularity: a password change commits hash + changed-timestamp in one
//! statement or not at all.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    api::models::{
        auth::{
            AuthResponse, AuthSuccessResponse, ForgotPasswordRequest, LoginRequest, LogoutResponse, ResetPasswordRequest,
            SessionResponse, SignupRequest, UpdatePasswordRequest,
        },
        users::{CurrentUser, Role, UserResponse},
    },
    auth::{password, reset, session},
    config::Config,
    db::{handlers::{Repository, Users}, models::users::UserCreateDBRequest},
    email::EmailService,
    errors::Error,
    AppState,
};

/// Hash a password on a blocking thread to avoid stalling the async runtime.
async fn hash_password_blocking(plaintext: String, params: password::Argon2Params) -> Result<String, Error> {
    tokio::task::spawn_blocking(move || password::hash_string_with_params(&plaintext, Some(params)))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("spawn password hashing task: {e}"),
        })?
}

/// Verify a password on a blocking thread to avoid stalling the async runtime.
async fn verify_password_blocking(plaintext: String, hash: String) -> Result<bool, Error> {
    tokio::task::spawn_blocking(move || password::verify_string(&plaintext, &hash))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("spawn password verification task: {e}"),
        })?
}

/// Minimal email shape check: something@domain.tld
pub(crate) fn validate_email(email: &str) -> Result<(), Error> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(Error::Validation {
            message: "Please provide a valid email address".to_string(),
        })
    }
}

/// Shared validation for every flow that accepts a new password.
fn validate_new_password(config: &Config, password: &str, password_confirm: &str) -> Result<(), Error> {
    let password_config = &config.auth.password;
    if password.len() < password_config.min_length {
        return Err(Error::Validation {
            message: format!("Password must be at least {} characters", password_config.min_length),
        });
    }
    if password.len() > password_config.max_length {
        return Err(Error::Validation {
            message: format!("Password must be no more than {} characters", password_config.max_length),
        });
    }
    if password != password_confirm {
        return Err(Error::Validation {
            message: "Passwords do not match".to_string(),
        });
    }
    Ok(())
}

/// Build the session cookie for a freshly issued token.
///
/// Max-Age comes from the same `auth.session.timeout` that drives the JWT
/// expiry; there is no separate cookie-lifetime arithmetic.
fn create_session_cookie(token: &str, config: &Config) -> String {
    let session_config = &config.auth.session;
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite={}; Max-Age={}",
        session_config.cookie_name,
        token,
        session_config.cookie_same_site,
        session_config.timeout.as_secs()
    );
    if session_config.cookie_secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// An already-expired cookie: instructs the client to discard its session.
fn clear_session_cookie(config: &Config) -> String {
    let session_config = &config.auth.session;
    let mut cookie = format!(
        "{}=; Path=/; HttpOnly; SameSite={}; Max-Age=0",
        session_config.cookie_name, session_config.cookie_same_site
    );
    if session_config.cookie_secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Issue a session token for the account and wrap it with the user body and
/// cookie.
fn establish_session(user: UserResponse, message: &str, status: StatusCode, config: &Config) -> Result<SessionResponse, Error> {
    let token = session::issue_session_token(user.id, config)?;
    let cookie = create_session_cookie(&token, config);

    Ok(SessionResponse {
        status,
        auth_response: AuthResponse {
            user,
            token,
            message: message.to_string(),
        },
        cookie,
    })
}

/// Register a new account
#[utoipa::path(
    post,
    path = "/authentication/signup",
    request_body = SignupRequest,
    tag = "authentication",
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Account already exists"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn signup(State(state): State<AppState>, Json(request): Json<SignupRequest>) -> Result<SessionResponse, Error> {
    if !state.config.auth.allow_signup {
        return Err(Error::Validation {
            message: "Signup is disabled".to_string(),
        });
    }

    if request.name.trim().is_empty() {
        return Err(Error::Validation {
            message: "Please provide your name".to_string(),
        });
    }
    validate_email(&request.email)?;
    validate_new_password(&state.config, &request.password, &request.password_confirm)?;

    // Hash before any store write; the confirmation is dropped here and
    // never persisted
    let params = password::Argon2Params::from(&state.config.auth.password);
    let password_hash = hash_password_blocking(request.password, params).await?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut user_repo = Users::new(&mut conn);

    // The role is fixed at signup: elevated roles are only ever granted by
    // an admin afterwards
    let created_user = user_repo
        .create(&UserCreateDBRequest {
            name: request.name.trim().to_string(),
            email: request.email,
            role: Role::User,
            password_hash,
        })
        .await?;
    drop(conn);

    // Welcome email is best-effort: dispatch failure never fails the signup
    match EmailService::new(&state.config) {
        Ok(email_service) => {
            if let Err(e) = email_service.send_welcome_email(&created_user.email, &created_user.name).await {
                tracing::warn!("Failed to send welcome email to {}: {:#}", created_user.email, e);
            }
        }
        Err(e) => {
            tracing::warn!("Email service unavailable, skipping welcome email: {:#}", e);
        }
    }

    establish_session(
        UserResponse::from(created_user),
        "Signup successful",
        StatusCode::CREATED,
        &state.config,
    )
}

/// Login with email and password
#[utoipa::path(
    post,
    path = "/authentication/login",
    request_body = LoginRequest,
    tag = "authentication",
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn login(State(state): State<AppState>, Json(request): Json<LoginRequest>) -> Result<SessionResponse, Error> {
    // One message for both unknown-email and wrong-password, so the response
    // never reveals whether the account exists
    let invalid_credentials = || Error::Unauthenticated {
        message: Some("Incorrect email or password".to_string()),
    };

    if request.email.is_empty() || request.password.is_empty() {
        return Err(Error::Validation {
            message: "Please provide email and password".to_string(),
        });
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut user_repo = Users::new(&mut conn);

    let user = user_repo.get_by_email(&request.email).await?.ok_or_else(invalid_credentials)?;
    drop(conn);

    let is_valid = verify_password_blocking(request.password, user.password_hash.clone()).await?;
    if !is_valid {
        return Err(invalid_credentials());
    }

    establish_session(UserResponse::from(user), "Login successful", StatusCode::OK, &state.config)
}

/// Logout (clear session)
#[utoipa::path(
    post,
    path = "/authentication/logout",
    tag = "authentication",
    responses(
        (status = 200, description = "Logout successful", body = AuthSuccessResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn logout(State(state): State<AppState>) -> Result<LogoutResponse, Error> {
    Ok(LogoutResponse {
        auth_response: AuthSuccessResponse {
            message: "Logout successful".to_string(),
        },
        cookie: clear_session_cookie(&state.config),
    })
}

/// Request a password reset token by email
#[utoipa::path(
    post,
    path = "/authentication/forgot-password",
    request_body = ForgotPasswordRequest,
    tag = "authentication",
    responses(
        (status = 200, description = "Reset token sent", body = AuthSuccessResponse),
        (status = 404, description = "No account with this email"),
        (status = 500, description = "Email could not be delivered"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(request): Json<ForgotPasswordRequest>,
) -> Result<Json<AuthSuccessResponse>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut user_repo = Users::new(&mut conn);

    let user = user_repo.get_by_email(&request.email).await?.ok_or_else(|| Error::NotFound {
        resource: "Account".to_string(),
        id: request.email.clone(),
    })?;

    // Persist only the digest and expiry; the plaintext goes to the email
    // and nowhere else
    let token = reset::issue_reset_token(state.config.auth.password_reset_token_duration);
    user_repo.set_reset_token(user.id, &token.digest, token.expires_at).await?;
    drop(conn);

    let send_result = match EmailService::new(&state.config) {
        Ok(email_service) => {
            email_service
                .send_password_reset_email(&user.email, Some(&user.name), &token.plaintext)
                .await
        }
        Err(e) => Err(e),
    };

    if let Err(send_err) = send_result {
        // Compensating write: a reset token the user was never told about
        // must not stay usable
        let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
        let mut user_repo = Users::new(&mut conn);
        if let Err(rollback_err) = user_repo.clear_reset_token(user.id).await {
            tracing::error!("Failed to roll back reset token for {}: {:#}", user.id, rollback_err);
        }
        return Err(match send_err {
            e @ Error::EmailDispatch { .. } => e,
            other => Error::EmailDispatch {
                operation: format!("prepare reset email: {other}"),
            },
        });
    }

    Ok(Json(AuthSuccessResponse {
        message: "Reset token sent to your email".to_string(),
    }))
}

/// Reset the password using a token from the reset email
#[utoipa::path(
    patch,
    path = "/authentication/reset-password/{token}",
    request_body = ResetPasswordRequest,
    tag = "authentication",
    params(
        ("token" = String, Path, description = "Plaintext reset token from the email"),
    ),
    responses(
        (status = 200, description = "Password reset, fresh session issued", body = AuthResponse),
        (status = 400, description = "Invalid or expired reset token"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn reset_password(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(request): Json<ResetPasswordRequest>,
) -> Result<SessionResponse, Error> {
    validate_new_password(&state.config, &request.password, &request.password_confirm)?;

    let params = password::Argon2Params::from(&state.config.auth.password);
    let password_hash = hash_password_blocking(request.password, params).await?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut user_repo = Users::new(&mut conn);

    // The digest is the lookup key; expiry is enforced in the query. A
    // consumed token no longer matches anything, so a replay lands here too.
    let user = user_repo
        .find_by_reset_digest(&reset::digest(&token))
        .await?
        .ok_or(Error::InvalidResetToken)?;

    // One atomic statement: new hash, changed-timestamp, reset fields cleared
    let updated = user_repo.set_password(user.id, &password_hash).await?;

    // Fresh token after the change; all earlier tokens are now rejected by
    // the guard's changed-after-issuance check
    establish_session(UserResponse::from(updated), "Password has been reset", StatusCode::OK, &state.config)
}

/// Change the password of the authenticated account
#[utoipa::path(
    patch,
    path = "/authentication/update-password",
    request_body = UpdatePasswordRequest,
    tag = "authentication",
    responses(
        (status = 200, description = "Password changed, fresh session issued", body = AuthResponse),
        (status = 401, description = "Current password is incorrect"),
    ),
    security(
        ("session_token" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn update_password(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(request): Json<UpdatePasswordRequest>,
) -> Result<SessionResponse, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut user_repo = Users::new(&mut conn);

    let user = user_repo.get_by_id(current_user.id).await?.ok_or(Error::Unauthenticated {
        message: Some("The account belonging to this session no longer exists".to_string()),
    })?;
    drop(conn);

    // Re-authentication: the session token alone is not enough to rotate
    // the credential
    let is_valid = verify_password_blocking(request.current_password, user.password_hash.clone()).await?;
    if !is_valid {
        return Err(Error::Unauthenticated {
            message: Some("Current password is incorrect".to_string()),
        });
    }

    validate_new_password(&state.config, &request.password, &request.password_confirm)?;

    let params = password::Argon2Params::from(&state.config.auth.password);
    let password_hash = hash_password_blocking(request.password, params).await?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut user_repo = Users::new(&mut conn);
    let updated = user_repo.set_password(user.id, &password_hash).await?;

    establish_session(UserResponse::from(updated), "Password changed", StatusCode::OK, &state.config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_test_app, create_test_app_with_config, create_test_config, signup_user};
    use axum::http::StatusCode;
    use serde_json::json;
    use sqlx::PgPool;

    #[test]
    fn test_validate_email() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("first.last@sub.example.co.uk").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("user@nodot").is_err());
        assert!(validate_email("user@.com").is_err());
    }

    #[test]
    fn test_validate_new_password() {
        let config = create_test_config();
        assert!(validate_new_password(&config, "longenough", "longenough").is_ok());
        assert!(validate_new_password(&config, "short", "short").is_err());
        assert!(validate_new_password(&config, "longenough", "different!").is_err());
        let too_long = "x".repeat(200);
        assert!(validate_new_password(&config, &too_long, &too_long).is_err());
    }

    #[test]
    fn test_session_cookie_shape() {
        let mut config = create_test_config();
        config.auth.session.timeout = std::time::Duration::from_secs(3600);
        config.auth.session.cookie_secure = true;

        let cookie = create_session_cookie("tok123", &config);
        assert!(cookie.starts_with("trailbook_session=tok123; "));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Max-Age=3600"));
        assert!(cookie.ends_with("; Secure"));

        let cleared = clear_session_cookie(&config);
        assert!(cleared.starts_with("trailbook_session=; "));
        assert!(cleared.contains("Max-Age=0"));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_signup_success_and_password_not_stored_plaintext(pool: PgPool) {
        let server = create_test_app(pool.clone()).await;

        let response = server
            .post("/authentication/signup")
            .json(&json!({
                "name": "Sam Walker",
                "email": "sam@example.com",
                "password": "password123",
                "password_confirm": "password123",
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        assert!(response.headers().get("set-cookie").is_some());

        let body: AuthResponse = response.json();
        assert_eq!(body.user.email, "sam@example.com");
        assert!(!body.token.is_empty());

        // Stored credential is a hash, never the plaintext
        let mut conn = pool.acquire().await.unwrap();
        let mut users = Users::new(&mut conn);
        let stored = users.get_by_email("sam@example.com").await.unwrap().unwrap();
        assert_ne!(stored.password_hash, "password123");
        assert!(crate::auth::password::verify_string("password123", &stored.password_hash).unwrap());
        assert!(!crate::auth::password::verify_string("wrongpassword", &stored.password_hash).unwrap());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_signup_validation_failures(pool: PgPool) {
        let server = create_test_app(pool).await;

        // Mismatched confirmation
        let response = server
            .post("/authentication/signup")
            .json(&json!({
                "name": "Sam",
                "email": "sam@example.com",
                "password": "password123",
                "password_confirm": "password456",
            }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        // Too-short password
        let response = server
            .post("/authentication/signup")
            .json(&json!({
                "name": "Sam",
                "email": "sam@example.com",
                "password": "short",
                "password_confirm": "short",
            }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        // Bad email shape
        let response = server
            .post("/authentication/signup")
            .json(&json!({
                "name": "Sam",
                "email": "not-an-email",
                "password": "password123",
                "password_confirm": "password123",
            }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_signup_duplicate_email_conflicts(pool: PgPool) {
        let server = create_test_app(pool).await;
        signup_user(&server, "dup@example.com", "password123").await;

        let response = server
            .post("/authentication/signup")
            .json(&json!({
                "name": "Sam Again",
                "email": "dup@example.com",
                "password": "password123",
                "password_confirm": "password123",
            }))
            .await;
        response.assert_status(StatusCode::CONFLICT);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_login_identical_error_for_unknown_email_and_wrong_password(pool: PgPool) {
        let server = create_test_app(pool).await;
        signup_user(&server, "real@example.com", "password123").await;

        let unknown = server
            .post("/authentication/login")
            .json(&json!({"email": "unknown@example.com", "password": "anything123"}))
            .await;
        let wrong = server
            .post("/authentication/login")
            .json(&json!({"email": "real@example.com", "password": "wrongpassword"}))
            .await;

        unknown.assert_status(StatusCode::UNAUTHORIZED);
        wrong.assert_status(StatusCode::UNAUTHORIZED);
        assert_eq!(unknown.text(), wrong.text());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_login_success_issues_usable_token(pool: PgPool) {
        let server = create_test_app(pool).await;
        signup_user(&server, "login@example.com", "password123").await;

        let response = server
            .post("/authentication/login")
            .json(&json!({"email": "login@example.com", "password": "password123"}))
            .await;
        response.assert_status_ok();
        let body: AuthResponse = response.json();

        // Token works against a protected endpoint
        let me = server
            .get("/api/v1/users/me")
            .add_header("authorization", format!("Bearer {}", body.token))
            .await;
        me.assert_status_ok();
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_logout_clears_cookie(pool: PgPool) {
        let server = create_test_app(pool).await;
        let response = server.post("/authentication/logout").await;
        response.assert_status_ok();

        let cookie = response.headers().get("set-cookie").unwrap().to_str().unwrap().to_string();
        assert!(cookie.contains("Max-Age=0"));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_forgot_password_unknown_email_not_found(pool: PgPool) {
        let server = create_test_app(pool).await;
        let response = server
            .post("/authentication/forgot-password")
            .json(&json!({"email": "nobody@example.com"}))
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_forgot_password_persists_only_digest(pool: PgPool) {
        let server = create_test_app(pool.clone()).await;
        signup_user(&server, "forgot@example.com", "password123").await;

        let response = server
            .post("/authentication/forgot-password")
            .json(&json!({"email": "forgot@example.com"}))
            .await;
        response.assert_status_ok();

        let mut conn = pool.acquire().await.unwrap();
        let mut users = Users::new(&mut conn);
        let stored = users.get_by_email("forgot@example.com").await.unwrap().unwrap();
        let digest = stored.password_reset_hash.expect("reset digest should be stored");
        // Hex SHA-256, not the raw token
        assert_eq!(digest.len(), 64);
        assert!(stored.password_reset_expires_at.unwrap() > chrono::Utc::now());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_forgot_password_rolls_back_token_when_email_fails(pool: PgPool) {
        let mut config = create_test_config();
        // An email directory that cannot be created makes every dispatch fail
        config.email.transport = crate::config::EmailTransportConfig::File {
            path: "/dev/null/unwritable".to_string(),
        };
        let server = create_test_app_with_config(pool.clone(), config).await;
        signup_user(&server, "undeliverable@example.com", "password123").await;

        let response = server
            .post("/authentication/forgot-password")
            .json(&json!({"email": "undeliverable@example.com"}))
            .await;
        response.assert_status(axum::http::StatusCode::INTERNAL_SERVER_ERROR);

        // The compensating write cleared the token: nothing usable dangles
        let mut conn = pool.acquire().await.unwrap();
        let mut users = Users::new(&mut conn);
        let stored = users.get_by_email("undeliverable@example.com").await.unwrap().unwrap();
        assert!(stored.password_reset_hash.is_none());
        assert!(stored.password_reset_expires_at.is_none());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_update_password_revokes_old_sessions_and_reset_flow(pool: PgPool) {
        let server = create_test_app(pool.clone()).await;
        let old_token = signup_user(&server, "rotate@example.com", "password123").await;

        // The revocation comparison is second-granular and the change
        // timestamp is backdated one second; put the old token clearly in
        // the past before rotating
        tokio::time::sleep(std::time::Duration::from_secs(2)).await;

        // Wrong current password is rejected
        let response = server
            .patch("/authentication/update-password")
            .add_header("authorization", format!("Bearer {old_token}"))
            .json(&json!({
                "current_password": "nottherightone",
                "password": "newpassword456",
                "password_confirm": "newpassword456",
            }))
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);

        let response = server
            .patch("/authentication/update-password")
            .add_header("authorization", format!("Bearer {old_token}"))
            .json(&json!({
                "current_password": "password123",
                "password": "newpassword456",
                "password_confirm": "newpassword456",
            }))
            .await;
        response.assert_status_ok();
        let body: AuthResponse = response.json();
        let new_token = body.token;

        // The pre-change token is now rejected even though its signature and
        // expiry are still valid
        let me = server
            .get("/api/v1/users/me")
            .add_header("authorization", format!("Bearer {old_token}"))
            .await;
        me.assert_status(StatusCode::UNAUTHORIZED);

        // The fresh token works
        let me = server
            .get("/api/v1/users/me")
            .add_header("authorization", format!("Bearer {new_token}"))
            .await;
        me.assert_status_ok();

        // And the new password logs in
        let login = server
            .post("/authentication/login")
            .json(&json!({"email": "rotate@example.com", "password": "newpassword456"}))
            .await;
        login.assert_status_ok();
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_reset_password_consumes_token_once(pool: PgPool) {
        let server = create_test_app(pool.clone()).await;
        signup_user(&server, "resetme@example.com", "password123").await;

        // Plant a reset token directly so the test knows the plaintext
        let token = crate::auth::reset::issue_reset_token(std::time::Duration::from_secs(600));
        {
            let mut conn = pool.acquire().await.unwrap();
            let mut users = Users::new(&mut conn);
            let user = users.get_by_email("resetme@example.com").await.unwrap().unwrap();
            users.set_reset_token(user.id, &token.digest, token.expires_at).await.unwrap();
        }

        let response = server
            .patch(&format!("/authentication/reset-password/{}", token.plaintext))
            .json(&json!({"password": "brandnewpass1", "password_confirm": "brandnewpass1"}))
            .await;
        response.assert_status_ok();

        // Replay with the same plaintext fails: the token was consumed
        let replay = server
            .patch(&format!("/authentication/reset-password/{}", token.plaintext))
            .json(&json!({"password": "anotherpass22", "password_confirm": "anotherpass22"}))
            .await;
        replay.assert_status(StatusCode::BAD_REQUEST);

        // The password change from the replay did not go through
        let login = server
            .post("/authentication/login")
            .json(&json!({"email": "resetme@example.com", "password": "brandnewpass1"}))
            .await;
        login.assert_status_ok();
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_reset_password_bogus_token_rejected(pool: PgPool) {
        let server = create_test_app(pool).await;
        let response = server
            .patch("/authentication/reset-password/not-a-real-token")
            .json(&json!({"password": "whateverpass1", "password_confirm": "whateverpass1"}))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }
}
