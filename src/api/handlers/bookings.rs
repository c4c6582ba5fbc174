//! Booking handlers: checkout-session creation and booking history.
//!
//! The core's only involvement with payments is passing identity and tour
//! details through the [`crate::payment_providers::PaymentProvider`] seam;
//! fulfilment (webhooks, refunds) lives outside this service.

use axum::{
    extract::{Path, State},
    response::Json,
};

use crate::{
    api::models::{
        bookings::{BookingResponse, CheckoutSessionResponse},
        users::CurrentUser,
    },
    db::{
        handlers::{Bookings, Repository, Tours},
        models::bookings::BookingCreateDBRequest,
    },
    errors::Error,
    types::TourId,
    AppState,
};

/// Create a checkout session for a tour
#[utoipa::path(
    post,
    path = "/api/v1/bookings/checkout-session/{tour_id}",
    tag = "bookings",
    params(
        ("tour_id" = String, Path, description = "Tour ID"),
    ),
    responses(
        (status = 200, description = "Checkout session created", body = CheckoutSessionResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Tour not found"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn create_checkout_session(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(tour_id): Path<TourId>,
) -> Result<Json<CheckoutSessionResponse>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let tour = Tours::new(&mut conn).get_by_id(tour_id).await?.ok_or_else(|| Error::NotFound {
        resource: "Tour".to_string(),
        id: tour_id.to_string(),
    })?;
    drop(conn);

    let success_url = format!("{}/my-bookings", state.config.public_url);
    let cancel_url = format!("{}/tours/{}", state.config.public_url, tour.slug);

    let session = state
        .payments
        .create_checkout_session(&current_user, &tour, &success_url, &cancel_url)
        .await?;

    // Record the pending booking; payment confirmation is an external concern
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let booking = Bookings::new(&mut conn)
        .create(&BookingCreateDBRequest {
            tour_id,
            user_id: current_user.id,
            price: tour.price,
            checkout_session_id: session.id.clone(),
            paid: false,
        })
        .await?;

    Ok(Json(CheckoutSessionResponse {
        session_id: session.id,
        url: session.url,
        booking: BookingResponse::from(booking),
    }))
}

/// List the authenticated account's bookings
#[utoipa::path(
    get,
    path = "/api/v1/bookings/me",
    tag = "bookings",
    responses(
        (status = 200, description = "The caller's bookings", body = [BookingResponse]),
        (status = 401, description = "Unauthorized"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn my_bookings(State(state): State<AppState>, current_user: CurrentUser) -> Result<Json<Vec<BookingResponse>>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let bookings = Bookings::new(&mut conn).list_for_user(current_user.id).await?;

    Ok(Json(bookings.into_iter().map(BookingResponse::from).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{admin_token, create_test_app, create_test_config, signup_user};
    use serde_json::json;
    use sqlx::PgPool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_checkout_session_flow(pool: PgPool) {
        let server = create_test_app(pool.clone()).await;
        let config = create_test_config();
        let token = admin_token(&pool, &config).await;
        let created = server
            .post("/api/v1/tours")
            .add_header("authorization", format!("Bearer {token}"))
            .json(&json!({
                "name": "Bookable",
                "duration_days": 2,
                "max_group_size": 4,
                "difficulty": "easy",
                "price": "99.00",
                "summary": "Short and sweet",
            }))
            .await;
        let tour: crate::api::models::tours::TourResponse = created.json();

        // Anonymous checkout is rejected
        let response = server.post(&format!("/api/v1/bookings/checkout-session/{}", tour.id)).await;
        response.assert_status(axum::http::StatusCode::UNAUTHORIZED);

        let user_token = signup_user(&server, "traveller@example.com", "password123").await;
        let response = server
            .post(&format!("/api/v1/bookings/checkout-session/{}", tour.id))
            .add_header("authorization", format!("Bearer {user_token}"))
            .await;
        response.assert_status_ok();
        let session: CheckoutSessionResponse = response.json();
        assert!(session.session_id.starts_with("dummy_session_"));
        assert!(!session.booking.paid);

        // The booking shows up in the caller's history
        let response = server
            .get("/api/v1/bookings/me")
            .add_header("authorization", format!("Bearer {user_token}"))
            .await;
        response.assert_status_ok();
        let bookings: Vec<BookingResponse> = response.json();
        assert_eq!(bookings.len(), 1);
        assert_eq!(bookings[0].tour_id, tour.id);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_checkout_unknown_tour_not_found(pool: PgPool) {
        let server = create_test_app(pool).await;
        let user_token = signup_user(&server, "lost@example.com", "password123").await;
        let response = server
            .post(&format!("/api/v1/bookings/checkout-session/{}", uuid::Uuid::new_v4()))
            .add_header("authorization", format!("Bearer {user_token}"))
            .await;
        response.assert_status(axum::http::StatusCode::NOT_FOUND);
    }
}
