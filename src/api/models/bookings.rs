//! API request/response models for bookings.

use crate::db::models::bookings::BookingDBResponse;
use crate::types::{BookingId, TourId, UserId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookingResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: BookingId,
    #[schema(value_type = String, format = "uuid")]
    pub tour_id: TourId,
    #[schema(value_type = String, format = "uuid")]
    pub user_id: UserId,
    pub price: Decimal,
    pub paid: bool,
    pub created_at: DateTime<Utc>,
}

impl From<BookingDBResponse> for BookingResponse {
    fn from(db: BookingDBResponse) -> Self {
        Self {
            id: db.id,
            tour_id: db.tour_id,
            user_id: db.user_id,
            price: db.price,
            paid: db.paid,
            created_at: db.created_at,
        }
    }
}

/// Opaque checkout-session reference returned to the client, which redirects
/// the user to `url` to complete payment.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CheckoutSessionResponse {
    pub session_id: String,
    pub url: String,
    pub booking: BookingResponse,
}
