//! Database models for tours.

use crate::api::models::tours::{Difficulty, TourCreate, TourUpdate};
use crate::types::TourId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;

/// Database request for creating a tour
#[derive(Debug, Clone)]
pub struct TourCreateDBRequest {
    pub name: String,
    pub duration_days: i32,
    pub max_group_size: i32,
    pub difficulty: Difficulty,
    pub price: Decimal,
    pub summary: String,
    pub description: Option<String>,
}

impl From<TourCreate> for TourCreateDBRequest {
    fn from(api: TourCreate) -> Self {
        Self {
            name: api.name,
            duration_days: api.duration_days,
            max_group_size: api.max_group_size,
            difficulty: api.difficulty,
            price: api.price,
            summary: api.summary,
            description: api.description,
        }
    }
}

/// Database request for updating a tour
#[derive(Debug, Clone)]
pub struct TourUpdateDBRequest {
    pub name: Option<String>,
    pub duration_days: Option<i32>,
    pub max_group_size: Option<i32>,
    pub difficulty: Option<Difficulty>,
    pub price: Option<Decimal>,
    pub summary: Option<String>,
    pub description: Option<String>,
}

impl From<TourUpdate> for TourUpdateDBRequest {
    fn from(api: TourUpdate) -> Self {
        Self {
            name: api.name,
            duration_days: api.duration_days,
            max_group_size: api.max_group_size,
            difficulty: api.difficulty,
            price: api.price,
            summary: api.summary,
            description: api.description,
        }
    }
}

/// Database row for a tour
#[derive(Debug, Clone, FromRow)]
pub struct TourDBResponse {
    pub id: TourId,
    pub name: String,
    pub slug: String,
    pub duration_days: i32,
    pub max_group_size: i32,
    pub difficulty: Difficulty,
    pub price: Decimal,
    pub summary: String,
    pub description: Option<String>,
    pub ratings_quantity: i32,
    pub ratings_average: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
