//! Database models for reviews.

use crate::types::{ReviewId, TourId, UserId};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database request for creating a review
#[derive(Debug, Clone)]
pub struct ReviewCreateDBRequest {
    pub tour_id: TourId,
    pub author_id: UserId,
    pub rating: i32,
    pub body: String,
}

/// Database request for updating a review
#[derive(Debug, Clone)]
pub struct ReviewUpdateDBRequest {
    pub rating: Option<i32>,
    pub body: Option<String>,
}

/// Database row for a review
#[derive(Debug, Clone, FromRow)]
pub struct ReviewDBResponse {
    pub id: ReviewId,
    pub tour_id: TourId,
    pub author_id: UserId,
    pub rating: i32,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
