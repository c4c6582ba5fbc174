//! Review handlers.
//!
//! Every mutation here explicitly invokes the rating aggregator after the
//! write commits. The parent tour id is captured before update/delete runs,
//! since a deleted review can no longer be asked for its tour.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};

use crate::{
    api::models::{
        reviews::{ListReviewsQuery, ReviewCreate, ReviewResponse, ReviewUpdate},
        users::{CurrentUser, Role},
    },
    auth::guard::authorize,
    db::{
        handlers::{reviews::ReviewFilter, Repository, Reviews, Tours},
        models::reviews::{ReviewCreateDBRequest, ReviewUpdateDBRequest},
    },
    errors::Error,
    ratings,
    types::{ReviewId, TourId},
    AppState,
};

fn validate_rating(rating: i32) -> Result<(), Error> {
    if !(1..=5).contains(&rating) {
        return Err(Error::Validation {
            message: "Rating must be between 1 and 5".to_string(),
        });
    }
    Ok(())
}

fn validate_body(body: &str) -> Result<(), Error> {
    if body.trim().is_empty() {
        return Err(Error::Validation {
            message: "Review cannot be empty".to_string(),
        });
    }
    Ok(())
}

/// Author-or-admin rule for review mutations.
fn authorize_review_mutation(user: &CurrentUser, author_id: crate::types::UserId) -> Result<(), Error> {
    if user.id == author_id {
        return Ok(());
    }
    authorize(user, &[Role::Admin])
}

/// List reviews for a tour
#[utoipa::path(
    get,
    path = "/api/v1/tours/{tour_id}/reviews",
    tag = "reviews",
    params(
        ("tour_id" = String, Path, description = "Tour ID"),
        ("skip" = Option<i64>, Query, description = "Number of reviews to skip"),
        ("limit" = Option<i64>, Query, description = "Maximum number of reviews to return"),
    ),
    responses(
        (status = 200, description = "Reviews for the tour", body = [ReviewResponse]),
        (status = 404, description = "Tour not found"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_tour_reviews(
    State(state): State<AppState>,
    Path(tour_id): Path<TourId>,
    Query(query): Query<ListReviewsQuery>,
) -> Result<Json<Vec<ReviewResponse>>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    Tours::new(&mut conn).get_by_id(tour_id).await?.ok_or_else(|| Error::NotFound {
        resource: "Tour".to_string(),
        id: tour_id.to_string(),
    })?;

    let reviews = Reviews::new(&mut conn)
        .list(&ReviewFilter {
            tour_id: Some(tour_id),
            skip: query.skip.unwrap_or(0),
            limit: query.limit.unwrap_or(100).min(1000),
        })
        .await?;

    Ok(Json(reviews.into_iter().map(ReviewResponse::from).collect()))
}

/// Create a review for a tour
#[utoipa::path(
    post,
    path = "/api/v1/tours/{tour_id}/reviews",
    request_body = ReviewCreate,
    tag = "reviews",
    params(
        ("tour_id" = String, Path, description = "Tour ID"),
    ),
    responses(
        (status = 201, description = "Review created", body = ReviewResponse),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Tour not found"),
        (status = 409, description = "Already reviewed this tour"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn create_review(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(tour_id): Path<TourId>,
    Json(request): Json<ReviewCreate>,
) -> Result<(StatusCode, Json<ReviewResponse>), Error> {
    // Only standard users review tours; guides and admins are on the other
    // side of the product
    authorize(&current_user, &[Role::User])?;

    validate_rating(request.rating)?;
    validate_body(&request.body)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    Tours::new(&mut conn).get_by_id(tour_id).await?.ok_or_else(|| Error::NotFound {
        resource: "Tour".to_string(),
        id: tour_id.to_string(),
    })?;

    // Uniqueness of (tour, author) is enforced by the store; a duplicate
    // surfaces as a conflict and leaves the first review untouched
    let created = Reviews::new(&mut conn)
        .create(&ReviewCreateDBRequest {
            tour_id,
            author_id: current_user.id,
            rating: request.rating,
            body: request.body,
        })
        .await?;
    drop(conn);

    // Post-commit hook: recompute the parent tour's aggregate
    ratings::recompute(&state.db, tour_id).await?;

    Ok((StatusCode::CREATED, Json(ReviewResponse::from(created))))
}

/// Update a review (author or admin)
#[utoipa::path(
    patch,
    path = "/api/v1/reviews/{id}",
    request_body = ReviewUpdate,
    tag = "reviews",
    params(
        ("id" = String, Path, description = "Review ID"),
    ),
    responses(
        (status = 200, description = "Updated review", body = ReviewResponse),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Review not found"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn update_review(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<ReviewId>,
    Json(request): Json<ReviewUpdate>,
) -> Result<Json<ReviewResponse>, Error> {
    if let Some(rating) = request.rating {
        validate_rating(rating)?;
    }
    if let Some(body) = &request.body {
        validate_body(body)?;
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut reviews = Reviews::new(&mut conn);

    let existing = reviews.get_by_id(id).await?.ok_or_else(|| Error::NotFound {
        resource: "Review".to_string(),
        id: id.to_string(),
    })?;
    authorize_review_mutation(&current_user, existing.author_id)?;

    // Capture the parent before mutating
    let tour_id = existing.tour_id;

    let updated = reviews
        .update(
            id,
            &ReviewUpdateDBRequest {
                rating: request.rating,
                body: request.body,
            },
        )
        .await?;
    drop(conn);

    ratings::recompute(&state.db, tour_id).await?;

    Ok(Json(ReviewResponse::from(updated)))
}

/// Delete a review (author or admin)
#[utoipa::path(
    delete,
    path = "/api/v1/reviews/{id}",
    tag = "reviews",
    params(
        ("id" = String, Path, description = "Review ID"),
    ),
    responses(
        (status = 204, description = "Review deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Review not found"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn delete_review(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<ReviewId>,
) -> Result<StatusCode, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut reviews = Reviews::new(&mut conn);

    let existing = reviews.get_by_id(id).await?.ok_or_else(|| Error::NotFound {
        resource: "Review".to_string(),
        id: id.to_string(),
    })?;
    authorize_review_mutation(&current_user, existing.author_id)?;

    // Capture the parent before the delete: afterwards the review (and its
    // tour reference) is gone
    let tour_id = existing.tour_id;

    reviews.delete(id).await?;
    drop(conn);

    ratings::recompute(&state.db, tour_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
