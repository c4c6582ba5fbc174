//! Database repository for user accounts.
//!
//! Every read on this repository filters to `active = TRUE` by default:
//! soft-deleted accounts are invisible unless a method explicitly says
//! otherwise (`get_by_id_any_status`).

use crate::types::{abbrev_uuid, UserId};
use crate::{
    db::{
        errors::{DbError, Result},
        handlers::repository::Repository,
        models::users::{UserCreateDBRequest, UserDBResponse, UserUpdateDBRequest},
    },
};
use chrono::{DateTime, Utc};
use sqlx::PgConnection;
use std::collections::HashMap;
use tracing::instrument;
use uuid::Uuid;

const USER_COLUMNS: &str = "id, name, email, role, password_hash, password_changed_at, \
     password_reset_hash, password_reset_expires_at, active, created_at, updated_at";

/// Filter for listing users
#[derive(Debug, Clone)]
pub struct UserFilter {
    pub skip: i64,
    pub limit: i64,
}

impl UserFilter {
    pub fn new(skip: i64, limit: i64) -> Self {
        Self { skip, limit }
    }
}

pub struct Users<'c> {
    db: &'c mut PgConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for Users<'c> {
    type CreateRequest = UserCreateDBRequest;
    type UpdateRequest = UserUpdateDBRequest;
    type Response = UserDBResponse;
    type Id = UserId;
    type Filter = UserFilter;

    #[instrument(skip(self, request), fields(email = %request.email), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        // Always generate a new ID; emails are stored lowercased
        let user_id = Uuid::new_v4();

        let user = sqlx::query_as::<_, UserDBResponse>(&format!(
            "INSERT INTO users (id, name, email, role, password_hash)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(user_id)
        .bind(&request.name)
        .bind(request.email.to_lowercase())
        .bind(request.role)
        .bind(&request.password_hash)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(user)
    }

    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let user = sqlx::query_as::<_, UserDBResponse>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1 AND active"))
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(user)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<Self::Id>) -> Result<HashMap<Self::Id, Self::Response>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let users = sqlx::query_as::<_, UserDBResponse>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ANY($1) AND active"))
            .bind(&ids)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(users.into_iter().map(|u| (u.id, u)).collect())
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let users = sqlx::query_as::<_, UserDBResponse>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE active ORDER BY created_at DESC LIMIT $1 OFFSET $2"
        ))
        .bind(filter.limit)
        .bind(filter.skip)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(users)
    }

    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(user_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let user = sqlx::query_as::<_, UserDBResponse>(&format!(
            "UPDATE users SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                role = COALESCE($4, role),
                updated_at = NOW()
             WHERE id = $1 AND active
             RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(&request.name)
        .bind(request.email.as_ref().map(|e| e.to_lowercase()))
        .bind(request.role)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(user)
    }
}

impl<'c> Users<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, email), err)]
    pub async fn get_by_email(&mut self, email: &str) -> Result<Option<UserDBResponse>> {
        let user = sqlx::query_as::<_, UserDBResponse>(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1 AND active"))
            .bind(email.to_lowercase())
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(user)
    }

    /// Fetch an account regardless of its active flag.
    ///
    /// The one sanctioned bypass of the default soft-delete filter; used by
    /// admin tooling that needs to see deactivated accounts.
    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&id)), err)]
    pub async fn get_by_id_any_status(&mut self, id: UserId) -> Result<Option<UserDBResponse>> {
        let user = sqlx::query_as::<_, UserDBResponse>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(user)
    }

    /// Soft-delete an account by flipping its active flag.
    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&id)), err)]
    pub async fn deactivate(&mut self, id: UserId) -> Result<bool> {
        let result = sqlx::query("UPDATE users SET active = FALSE, updated_at = NOW() WHERE id = $1 AND active")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Commit a new password hash for an account.
    ///
    /// A single atomic statement: sets the hash, stamps the credential-change
    /// time, and clears any outstanding reset token so it cannot be replayed.
    /// The change time is backdated one second so the session token issued in
    /// the same request is not rejected by the changed-after-issuance check.
    #[instrument(skip(self, password_hash), fields(user_id = %abbrev_uuid(&id)), err)]
    pub async fn set_password(&mut self, id: UserId, password_hash: &str) -> Result<UserDBResponse> {
        let user = sqlx::query_as::<_, UserDBResponse>(&format!(
            "UPDATE users SET
                password_hash = $2,
                password_changed_at = NOW() - INTERVAL '1 second',
                password_reset_hash = NULL,
                password_reset_expires_at = NULL,
                updated_at = NOW()
             WHERE id = $1 AND active
             RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(password_hash)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(user)
    }

    /// Store a reset-token digest and its expiry on an account.
    #[instrument(skip(self, digest), fields(user_id = %abbrev_uuid(&id)), err)]
    pub async fn set_reset_token(&mut self, id: UserId, digest: &str, expires_at: DateTime<Utc>) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE users SET password_reset_hash = $2, password_reset_expires_at = $3, updated_at = NOW()
             WHERE id = $1 AND active",
        )
        .bind(id)
        .bind(digest)
        .bind(expires_at)
        .execute(&mut *self.db)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Clear any outstanding reset token.
    ///
    /// Compensating write for the forgot-password flow: if the reset email
    /// cannot be delivered, the token must not stay usable.
    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&id)), err)]
    pub async fn clear_reset_token(&mut self, id: UserId) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE users SET password_reset_hash = NULL, password_reset_expires_at = NULL, updated_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .execute(&mut *self.db)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Find the account holding a non-expired reset token with this digest.
    #[instrument(skip(self, digest), err)]
    pub async fn find_by_reset_digest(&mut self, digest: &str) -> Result<Option<UserDBResponse>> {
        let user = sqlx::query_as::<_, UserDBResponse>(&format!(
            "SELECT {USER_COLUMNS} FROM users
             WHERE password_reset_hash = $1 AND password_reset_expires_at > NOW() AND active"
        ))
        .bind(digest)
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::users::Role;
    use crate::auth::reset;
    use sqlx::PgPool;

    fn user_create(email: &str) -> UserCreateDBRequest {
        UserCreateDBRequest {
            name: "Test User".to_string(),
            email: email.to_string(),
            role: Role::User,
            password_hash: "$argon2id$fake$hash".to_string(),
        }
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_user_lowercases_email(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Users::new(&mut conn);

        let user = repo.create(&user_create("Mixed.Case@Example.COM")).await.unwrap();
        assert_eq!(user.email, "mixed.case@example.com");
        assert_eq!(user.role, Role::User);
        assert!(user.active);
        assert!(user.password_changed_at.is_none());

        // Lookup works with any casing
        let found = repo.get_by_email("MIXED.CASE@example.com").await.unwrap();
        assert_eq!(found.unwrap().id, user.id);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_duplicate_email_conflicts(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Users::new(&mut conn);

        repo.create(&user_create("dup@example.com")).await.unwrap();
        let err = repo.create(&user_create("DUP@example.com")).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_deactivated_user_hidden_from_default_reads(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Users::new(&mut conn);

        let user = repo.create(&user_create("gone@example.com")).await.unwrap();
        assert!(repo.deactivate(user.id).await.unwrap());

        assert!(repo.get_by_id(user.id).await.unwrap().is_none());
        assert!(repo.get_by_email("gone@example.com").await.unwrap().is_none());
        assert!(repo.list(&UserFilter::new(0, 100)).await.unwrap().is_empty());

        // The explicit override still sees the account
        let hidden = repo.get_by_id_any_status(user.id).await.unwrap().unwrap();
        assert!(!hidden.active);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_set_password_clears_reset_fields_and_stamps_change(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Users::new(&mut conn);

        let user = repo.create(&user_create("reset@example.com")).await.unwrap();
        let token = reset::issue_reset_token(std::time::Duration::from_secs(600));
        assert!(repo.set_reset_token(user.id, &token.digest, token.expires_at).await.unwrap());

        let pending = repo.find_by_reset_digest(&token.digest).await.unwrap().unwrap();
        assert_eq!(pending.id, user.id);

        let updated = repo.set_password(user.id, "$argon2id$new$hash").await.unwrap();
        assert_eq!(updated.password_hash, "$argon2id$new$hash");
        assert!(updated.password_changed_at.is_some());
        assert!(updated.password_reset_hash.is_none());
        assert!(updated.password_reset_expires_at.is_none());

        // The digest no longer resolves: the token was consumed
        assert!(repo.find_by_reset_digest(&token.digest).await.unwrap().is_none());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_expired_reset_digest_not_found(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Users::new(&mut conn);

        let user = repo.create(&user_create("late@example.com")).await.unwrap();
        let expired = Utc::now() - chrono::Duration::minutes(1);
        assert!(repo.set_reset_token(user.id, "deadbeef", expired).await.unwrap());

        assert!(repo.find_by_reset_digest("deadbeef").await.unwrap().is_none());
    }
}
