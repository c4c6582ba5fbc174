//! Account profile and admin user-management handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};

use crate::{
    api::models::users::{CurrentUser, ListUsersQuery, Role, UserResponse, UserUpdate},
    auth::guard::authorize,
    db::{
        handlers::{users::UserFilter, Repository, Users},
        models::users::UserUpdateDBRequest,
    },
    errors::Error,
    types::UserId,
    AppState,
};

/// Get the authenticated account's profile
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    tag = "users",
    responses(
        (status = 200, description = "Current account", body = UserResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn get_me(State(state): State<AppState>, current_user: CurrentUser) -> Result<Json<UserResponse>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut users = Users::new(&mut conn);

    let user = users.get_by_id(current_user.id).await?.ok_or(Error::Unauthenticated {
        message: Some("The account belonging to this session no longer exists".to_string()),
    })?;

    Ok(Json(UserResponse::from(user)))
}

/// Update the authenticated account's profile (name/email only)
#[utoipa::path(
    patch,
    path = "/api/v1/users/me",
    request_body = UserUpdate,
    tag = "users",
    responses(
        (status = 200, description = "Updated account", body = UserResponse),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn update_me(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(request): Json<UserUpdate>,
) -> Result<Json<UserResponse>, Error> {
    if let Some(name) = &request.name {
        if name.trim().is_empty() {
            return Err(Error::Validation {
                message: "Name must not be empty".to_string(),
            });
        }
    }
    if let Some(email) = &request.email {
        crate::api::handlers::auth::validate_email(email)?;
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut users = Users::new(&mut conn);

    let updated = users
        .update(
            current_user.id,
            &UserUpdateDBRequest {
                name: request.name,
                email: request.email,
                // Role changes only happen through the admin route
                role: None,
            },
        )
        .await?;

    Ok(Json(UserResponse::from(updated)))
}

/// Soft-delete the authenticated account
#[utoipa::path(
    delete,
    path = "/api/v1/users/me",
    tag = "users",
    responses(
        (status = 204, description = "Account deactivated"),
        (status = 401, description = "Unauthorized"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn delete_me(State(state): State<AppState>, current_user: CurrentUser) -> Result<StatusCode, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut users = Users::new(&mut conn);

    // Flips the active flag; the record stays and existing sessions die at
    // the guard because the default lookup no longer finds the account
    users.deactivate(current_user.id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// List accounts (admin only)
#[utoipa::path(
    get,
    path = "/api/v1/users",
    tag = "users",
    params(
        ("skip" = Option<i64>, Query, description = "Number of users to skip"),
        ("limit" = Option<i64>, Query, description = "Maximum number of users to return"),
    ),
    responses(
        (status = 200, description = "List of accounts", body = [UserResponse]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_users(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<Vec<UserResponse>>, Error> {
    authorize(&current_user, &[Role::Admin])?;

    let skip = query.skip.unwrap_or(0);
    let limit = query.limit.unwrap_or(100).min(1000);

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut users = Users::new(&mut conn);
    let listed = users.list(&UserFilter::new(skip, limit)).await?;

    Ok(Json(listed.into_iter().map(UserResponse::from).collect()))
}

/// Get a specific account (admin only)
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    tag = "users",
    params(
        ("id" = String, Path, description = "Account ID"),
    ),
    responses(
        (status = 200, description = "Account", body = UserResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Account not found"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn get_user(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<UserId>,
) -> Result<Json<UserResponse>, Error> {
    authorize(&current_user, &[Role::Admin])?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut users = Users::new(&mut conn);

    // Admins may inspect deactivated accounts, hence the explicit override
    // of the active-only default filter
    let user = users.get_by_id_any_status(id).await?.ok_or_else(|| Error::NotFound {
        resource: "Account".to_string(),
        id: id.to_string(),
    })?;

    Ok(Json(UserResponse::from(user)))
}

/// Permanently delete an account (admin only)
#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    tag = "users",
    params(
        ("id" = String, Path, description = "Account ID"),
    ),
    responses(
        (status = 204, description = "Account deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Account not found"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn delete_user(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<UserId>,
) -> Result<StatusCode, Error> {
    authorize(&current_user, &[Role::Admin])?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut users = Users::new(&mut conn);

    if !users.delete(id).await? {
        return Err(Error::NotFound {
            resource: "Account".to_string(),
            id: id.to_string(),
        });
    }

    Ok(StatusCode::NO_CONTENT)
}
