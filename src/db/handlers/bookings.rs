//! Database repository for bookings.

use crate::types::{abbrev_uuid, BookingId, UserId};
use crate::db::{
    errors::Result,
    models::bookings::{BookingCreateDBRequest, BookingDBResponse},
};
use sqlx::PgConnection;
use tracing::instrument;
use uuid::Uuid;

const BOOKING_COLUMNS: &str = "id, tour_id, user_id, price, checkout_session_id, paid, created_at";

pub struct Bookings<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Bookings<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, request), fields(tour_id = %abbrev_uuid(&request.tour_id)), err)]
    pub async fn create(&mut self, request: &BookingCreateDBRequest) -> Result<BookingDBResponse> {
        let booking_id = Uuid::new_v4();

        let booking = sqlx::query_as::<_, BookingDBResponse>(&format!(
            "INSERT INTO bookings (id, tour_id, user_id, price, checkout_session_id, paid)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {BOOKING_COLUMNS}"
        ))
        .bind(booking_id)
        .bind(request.tour_id)
        .bind(request.user_id)
        .bind(request.price)
        .bind(&request.checkout_session_id)
        .bind(request.paid)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(booking)
    }

    #[instrument(skip(self), fields(booking_id = %abbrev_uuid(&id)), err)]
    pub async fn get_by_id(&mut self, id: BookingId) -> Result<Option<BookingDBResponse>> {
        let booking = sqlx::query_as::<_, BookingDBResponse>(&format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1"))
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(booking)
    }

    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&user_id)), err)]
    pub async fn list_for_user(&mut self, user_id: UserId) -> Result<Vec<BookingDBResponse>> {
        let bookings = sqlx::query_as::<_, BookingDBResponse>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(bookings)
    }
}
