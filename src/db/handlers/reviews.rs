//! Database repository for reviews.
//!
//! The (tour, author) uniqueness constraint lives in the database; a second
//! review for the same pair surfaces as `DbError::UniqueViolation` and the
//! first review is left untouched.

use crate::types::{abbrev_uuid, ReviewId, TourId};
use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::reviews::{ReviewCreateDBRequest, ReviewDBResponse, ReviewUpdateDBRequest},
};
use sqlx::PgConnection;
use std::collections::HashMap;
use tracing::instrument;
use uuid::Uuid;

const REVIEW_COLUMNS: &str = "id, tour_id, author_id, rating, body, created_at, updated_at";

/// Filter for listing reviews of a tour
#[derive(Debug, Clone)]
pub struct ReviewFilter {
    pub tour_id: Option<TourId>,
    pub skip: i64,
    pub limit: i64,
}

pub struct Reviews<'c> {
    db: &'c mut PgConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for Reviews<'c> {
    type CreateRequest = ReviewCreateDBRequest;
    type UpdateRequest = ReviewUpdateDBRequest;
    type Response = ReviewDBResponse;
    type Id = ReviewId;
    type Filter = ReviewFilter;

    #[instrument(skip(self, request), fields(tour_id = %abbrev_uuid(&request.tour_id)), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let review_id = Uuid::new_v4();

        let review = sqlx::query_as::<_, ReviewDBResponse>(&format!(
            "INSERT INTO reviews (id, tour_id, author_id, rating, body)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {REVIEW_COLUMNS}"
        ))
        .bind(review_id)
        .bind(request.tour_id)
        .bind(request.author_id)
        .bind(request.rating)
        .bind(&request.body)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(review)
    }

    #[instrument(skip(self), fields(review_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let review = sqlx::query_as::<_, ReviewDBResponse>(&format!("SELECT {REVIEW_COLUMNS} FROM reviews WHERE id = $1"))
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(review)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<Self::Id>) -> Result<HashMap<Self::Id, Self::Response>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let reviews = sqlx::query_as::<_, ReviewDBResponse>(&format!("SELECT {REVIEW_COLUMNS} FROM reviews WHERE id = ANY($1)"))
            .bind(&ids)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(reviews.into_iter().map(|r| (r.id, r)).collect())
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let mut query = format!("SELECT {REVIEW_COLUMNS} FROM reviews");
        if filter.tour_id.is_some() {
            query.push_str(" WHERE tour_id = $3");
        }
        query.push_str(" ORDER BY created_at DESC LIMIT $1 OFFSET $2");

        let mut sql_query = sqlx::query_as::<_, ReviewDBResponse>(&query).bind(filter.limit).bind(filter.skip);
        if let Some(tour_id) = filter.tour_id {
            sql_query = sql_query.bind(tour_id);
        }

        let reviews = sql_query.fetch_all(&mut *self.db).await?;
        Ok(reviews)
    }

    #[instrument(skip(self), fields(review_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(review_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let review = sqlx::query_as::<_, ReviewDBResponse>(&format!(
            "UPDATE reviews SET
                rating = COALESCE($2, rating),
                body = COALESCE($3, body),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {REVIEW_COLUMNS}"
        ))
        .bind(id)
        .bind(request.rating)
        .bind(&request.body)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(review)
    }
}

impl<'c> Reviews<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Count and mean rating over all reviews of a tour, in one query.
    ///
    /// The mean is `None` when the tour has no reviews.
    #[instrument(skip(self), fields(tour_id = %abbrev_uuid(&tour_id)), err)]
    pub async fn rating_stats(&mut self, tour_id: TourId) -> Result<(i64, Option<f64>)> {
        let stats = sqlx::query_as::<_, (i64, Option<f64>)>(
            "SELECT COUNT(*), AVG(rating)::float8 FROM reviews WHERE tour_id = $1",
        )
        .bind(tour_id)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(stats)
    }
}
