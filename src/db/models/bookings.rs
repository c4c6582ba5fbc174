//! Database models for bookings.

use crate::types::{BookingId, TourId, UserId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;

/// Database request for creating a booking
#[derive(Debug, Clone)]
pub struct BookingCreateDBRequest {
    pub tour_id: TourId,
    pub user_id: UserId,
    pub price: Decimal,
    pub checkout_session_id: String,
    pub paid: bool,
}

/// Database row for a booking
#[derive(Debug, Clone, FromRow)]
pub struct BookingDBResponse {
    pub id: BookingId,
    pub tour_id: TourId,
    pub user_id: UserId,
    pub price: Decimal,
    pub checkout_session_id: String,
    pub paid: bool,
    pub created_at: DateTime<Utc>,
}
