//! API request/response models for tours.

use crate::db::models::tours::TourDBResponse;
use crate::types::TourId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Tour difficulty grade. Stored in Postgres as the `tour_difficulty` enum.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "tour_difficulty", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Difficult,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TourCreate {
    pub name: String,
    pub duration_days: i32,
    pub max_group_size: i32,
    pub difficulty: Difficulty,
    pub price: Decimal,
    pub summary: String,
    pub description: Option<String>,
}

/// Updatable tour fields.
///
/// The rating fields are absent on purpose: `ratings_quantity` and
/// `ratings_average` are derived state owned by the rating aggregator and
/// cannot be written through the tours API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TourUpdate {
    pub name: Option<String>,
    pub duration_days: Option<i32>,
    pub max_group_size: Option<i32>,
    pub difficulty: Option<Difficulty>,
    pub price: Option<Decimal>,
    pub summary: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TourResponse {
    #[schema(value_type = String, format = "uuid")]
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

impl From<TourDBResponse> for TourResponse {
    fn from(db: TourDBResponse) -> Self {
        Self {
            id: db.id,
            name: db.name,
            slug: db.slug,
            duration_days: db.duration_days,
            max_group_size: db.max_group_size,
            difficulty: db.difficulty,
            price: db.price,
            summary: db.summary,
            description: db.description,
            ratings_quantity: db.ratings_quantity,
            ratings_average: db.ratings_average,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

/// Query parameters for listing tours
#[derive(Debug, Deserialize, ToSchema)]
pub struct ListToursQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}
