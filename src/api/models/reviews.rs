//! API request/response models for reviews.

use crate::db::models::reviews::ReviewDBResponse;
use crate::types::{ReviewId, TourId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReviewCreate {
    /// Rating between 1 and 5
    pub rating: i32,
    /// Review text, must be non-empty
    pub body: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReviewUpdate {
    pub rating: Option<i32>,
    pub body: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReviewResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: ReviewId,
    #[schema(value_type = String, format = "uuid")]
    pub tour_id: TourId,
    #[schema(value_type = String, format = "uuid")]
    pub author_id: UserId,
    pub rating: i32,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ReviewDBResponse> for ReviewResponse {
    fn from(db: ReviewDBResponse) -> Self {
        Self {
            id: db.id,
            tour_id: db.tour_id,
            author_id: db.author_id,
            rating: db.rating,
            body: db.body,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

/// Query parameters for listing reviews
#[derive(Debug, Deserialize, ToSchema)]
pub struct ListReviewsQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}
