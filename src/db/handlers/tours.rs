//! Database repository for tours.

use crate::types::{abbrev_uuid, TourId};
use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::tours::{TourCreateDBRequest, TourDBResponse, TourUpdateDBRequest},
};
use sqlx::PgConnection;
use std::collections::HashMap;
use tracing::instrument;
use uuid::Uuid;

const TOUR_COLUMNS: &str = "id, name, slug, duration_days, max_group_size, difficulty, price, \
     summary, description, ratings_quantity, ratings_average, created_at, updated_at";

/// Derive a URL slug from a tour name: lowercase, runs of anything
/// non-alphanumeric collapse into single dashes.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_dash = true;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// Filter for listing tours
#[derive(Debug, Clone)]
pub struct TourFilter {
    pub skip: i64,
    pub limit: i64,
}

impl TourFilter {
    pub fn new(skip: i64, limit: i64) -> Self {
        Self { skip, limit }
    }
}

pub struct Tours<'c> {
    db: &'c mut PgConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for Tours<'c> {
    type CreateRequest = TourCreateDBRequest;
    type UpdateRequest = TourUpdateDBRequest;
    type Response = TourDBResponse;
    type Id = TourId;
    type Filter = TourFilter;

    #[instrument(skip(self, request), fields(name = %request.name), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let tour_id = Uuid::new_v4();

        let tour = sqlx::query_as::<_, TourDBResponse>(&format!(
            "INSERT INTO tours (id, name, slug, duration_days, max_group_size, difficulty, price, summary, description)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {TOUR_COLUMNS}"
        ))
        .bind(tour_id)
        .bind(&request.name)
        .bind(slugify(&request.name))
        .bind(request.duration_days)
        .bind(request.max_group_size)
        .bind(request.difficulty)
        .bind(request.price)
        .bind(&request.summary)
        .bind(&request.description)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(tour)
    }

    #[instrument(skip(self), fields(tour_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let tour = sqlx::query_as::<_, TourDBResponse>(&format!("SELECT {TOUR_COLUMNS} FROM tours WHERE id = $1"))
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(tour)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<Self::Id>) -> Result<HashMap<Self::Id, Self::Response>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let tours = sqlx::query_as::<_, TourDBResponse>(&format!("SELECT {TOUR_COLUMNS} FROM tours WHERE id = ANY($1)"))
            .bind(&ids)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(tours.into_iter().map(|t| (t.id, t)).collect())
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let tours = sqlx::query_as::<_, TourDBResponse>(&format!(
            "SELECT {TOUR_COLUMNS} FROM tours ORDER BY created_at DESC LIMIT $1 OFFSET $2"
        ))
        .bind(filter.limit)
        .bind(filter.skip)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(tours)
    }

    #[instrument(skip(self), fields(tour_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM tours WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(tour_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        // Slug follows the name whenever the name changes
        let slug = request.name.as_deref().map(slugify);

        let tour = sqlx::query_as::<_, TourDBResponse>(&format!(
            "UPDATE tours SET
                name = COALESCE($2, name),
                slug = COALESCE($3, slug),
                duration_days = COALESCE($4, duration_days),
                max_group_size = COALESCE($5, max_group_size),
                difficulty = COALESCE($6, difficulty),
                price = COALESCE($7, price),
                summary = COALESCE($8, summary),
                description = COALESCE($9, description),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {TOUR_COLUMNS}"
        ))
        .bind(id)
        .bind(&request.name)
        .bind(slug)
        .bind(request.duration_days)
        .bind(request.max_group_size)
        .bind(request.difficulty)
        .bind(request.price)
        .bind(&request.summary)
        .bind(&request.description)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(tour)
    }
}

impl<'c> Tours<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Write the derived rating fields in one atomic statement.
    ///
    /// Only the rating aggregator calls this; the tours update path never
    /// touches these columns.
    #[instrument(skip(self), fields(tour_id = %abbrev_uuid(&id)), err)]
    pub async fn set_rating_stats(&mut self, id: TourId, quantity: i32, average: f64) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE tours SET ratings_quantity = $2, ratings_average = $3, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(quantity)
        .bind(average)
        .execute(&mut *self.db)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Best-rated tours, cheapest first among equals.
    #[instrument(skip(self), err)]
    pub async fn list_top_rated(&mut self, limit: i64) -> Result<Vec<TourDBResponse>> {
        let tours = sqlx::query_as::<_, TourDBResponse>(&format!(
            "SELECT {TOUR_COLUMNS} FROM tours ORDER BY ratings_average DESC, price ASC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(tours)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::tours::Difficulty;
    use rust_decimal::Decimal;
    use sqlx::PgPool;

    pub(crate) fn tour_create(name: &str) -> TourCreateDBRequest {
        TourCreateDBRequest {
            name: name.to_string(),
            duration_days: 5,
            max_group_size: 12,
            difficulty: Difficulty::Medium,
            price: Decimal::new(49900, 2),
            summary: "Five days in the high country".to_string(),
            description: None,
        }
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("The Forest Hiker"), "the-forest-hiker");
        assert_eq!(slugify("Sea & Sky -- 2024!"), "sea-sky-2024");
        assert_eq!(slugify("  padded  "), "padded");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_tour_defaults(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Tours::new(&mut conn);

        let tour = repo.create(&tour_create("The Forest Hiker")).await.unwrap();
        assert_eq!(tour.slug, "the-forest-hiker");
        // Fresh tours carry the default aggregate
        assert_eq!(tour.ratings_quantity, 0);
        assert_eq!(tour.ratings_average, 4.5);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_duplicate_name_conflicts(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Tours::new(&mut conn);

        repo.create(&tour_create("Twice Told")).await.unwrap();
        let err = repo.create(&tour_create("Twice Told")).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_update_renames_slug(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Tours::new(&mut conn);

        let tour = repo.create(&tour_create("Old Name")).await.unwrap();
        let updated = repo
            .update(
                tour.id,
                &TourUpdateDBRequest {
                    name: Some("New Name".to_string()),
                    duration_days: None,
                    max_group_size: None,
                    difficulty: None,
                    price: None,
                    summary: None,
                    description: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "New Name");
        assert_eq!(updated.slug, "new-name");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_set_rating_stats(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Tours::new(&mut conn);

        let tour = repo.create(&tour_create("Rated")).await.unwrap();
        assert!(repo.set_rating_stats(tour.id, 3, 4.7).await.unwrap());

        let fetched = repo.get_by_id(tour.id).await.unwrap().unwrap();
        assert_eq!(fetched.ratings_quantity, 3);
        assert_eq!(fetched.ratings_average, 4.7);
    }
}
