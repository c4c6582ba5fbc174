//! Tour catalogue handlers: public reads, role-guarded writes.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    api::models::{
        reviews::ReviewResponse,
        tours::{ListToursQuery, TourCreate, TourResponse, TourUpdate},
        users::{CurrentUser, Role},
    },
    auth::guard::{authorize, MaybeUser},
    db::{
        handlers::{tours::TourFilter, Repository, Reviews, Tours},
        models::tours::{TourCreateDBRequest, TourUpdateDBRequest},
    },
    errors::Error,
    types::TourId,
    AppState,
};

/// Tour detail, personalised with the caller's own review when a valid
/// session is present.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TourDetailResponse {
    pub tour: TourResponse,
    /// The requesting account's review of this tour, if logged in and present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub your_review: Option<ReviewResponse>,
}

fn validate_tour_numbers(duration_days: Option<i32>, max_group_size: Option<i32>) -> Result<(), Error> {
    if let Some(days) = duration_days {
        if days <= 0 {
            return Err(Error::Validation {
                message: "Tour duration must be at least one day".to_string(),
            });
        }
    }
    if let Some(size) = max_group_size {
        if size <= 0 {
            return Err(Error::Validation {
                message: "Group size must be at least one".to_string(),
            });
        }
    }
    Ok(())
}

/// List tours
#[utoipa::path(
    get,
    path = "/api/v1/tours",
    tag = "tours",
    params(
        ("skip" = Option<i64>, Query, description = "Number of tours to skip"),
        ("limit" = Option<i64>, Query, description = "Maximum number of tours to return"),
    ),
    responses(
        (status = 200, description = "List of tours", body = [TourResponse]),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_tours(State(state): State<AppState>, Query(query): Query<ListToursQuery>) -> Result<Json<Vec<TourResponse>>, Error> {
    let skip = query.skip.unwrap_or(0);
    let limit = query.limit.unwrap_or(100).min(1000);

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut tours = Tours::new(&mut conn);
    let listed = tours.list(&TourFilter::new(skip, limit)).await?;

    Ok(Json(listed.into_iter().map(TourResponse::from).collect()))
}

/// The five best-rated tours, cheapest first among equals
#[utoipa::path(
    get,
    path = "/api/v1/tours/top-5-cheap",
    tag = "tours",
    responses(
        (status = 200, description = "Top tours", body = [TourResponse]),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn top_tours(State(state): State<AppState>) -> Result<Json<Vec<TourResponse>>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut tours = Tours::new(&mut conn);
    let listed = tours.list_top_rated(5).await?;

    Ok(Json(listed.into_iter().map(TourResponse::from).collect()))
}

/// Get a single tour
#[utoipa::path(
    get,
    path = "/api/v1/tours/{id}",
    tag = "tours",
    params(
        ("id" = String, Path, description = "Tour ID"),
    ),
    responses(
        (status = 200, description = "Tour detail", body = TourDetailResponse),
        (status = 404, description = "Tour not found"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_tour(
    State(state): State<AppState>,
    Path(id): Path<TourId>,
    MaybeUser(maybe_user): MaybeUser,
) -> Result<Json<TourDetailResponse>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let tour = Tours::new(&mut conn).get_by_id(id).await?.ok_or_else(|| Error::NotFound {
        resource: "Tour".to_string(),
        id: id.to_string(),
    })?;

    // Anonymous callers (including ones with broken or expired tokens) just
    // get the tour without personalisation
    let your_review = match &maybe_user {
        Some(user) => {
            let reviews = Reviews::new(&mut conn)
                .list(&crate::db::handlers::reviews::ReviewFilter {
                    tour_id: Some(id),
                    skip: 0,
                    limit: 1000,
                })
                .await?;
            reviews
                .into_iter()
                .find(|r| r.author_id == user.id)
                .map(ReviewResponse::from)
        }
        None => None,
    };

    Ok(Json(TourDetailResponse {
        tour: TourResponse::from(tour),
        your_review,
    }))
}

/// Create a tour (admin / lead-guide)
#[utoipa::path(
    post,
    path = "/api/v1/tours",
    request_body = TourCreate,
    tag = "tours",
    responses(
        (status = 201, description = "Tour created", body = TourResponse),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Tour name already in use"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn create_tour(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(request): Json<TourCreate>,
) -> Result<(StatusCode, Json<TourResponse>), Error> {
    authorize(&current_user, &[Role::Admin, Role::LeadGuide])?;

    if request.name.trim().is_empty() || request.summary.trim().is_empty() {
        return Err(Error::Validation {
            message: "Tour name and summary are required".to_string(),
        });
    }
    validate_tour_numbers(Some(request.duration_days), Some(request.max_group_size))?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut tours = Tours::new(&mut conn);
    let created = tours.create(&TourCreateDBRequest::from(request)).await?;

    Ok((StatusCode::CREATED, Json(TourResponse::from(created))))
}

/// Update a tour (admin / lead-guide)
#[utoipa::path(
    patch,
    path = "/api/v1/tours/{id}",
    request_body = TourUpdate,
    tag = "tours",
    params(
        ("id" = String, Path, description = "Tour ID"),
    ),
    responses(
        (status = 200, description = "Updated tour", body = TourResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Tour not found"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn update_tour(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<TourId>,
    Json(request): Json<TourUpdate>,
) -> Result<Json<TourResponse>, Error> {
    authorize(&current_user, &[Role::Admin, Role::LeadGuide])?;

    validate_tour_numbers(request.duration_days, request.max_group_size)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut tours = Tours::new(&mut conn);
    let updated = tours.update(id, &TourUpdateDBRequest::from(request)).await.map_err(|e| match e {
        crate::db::errors::DbError::NotFound => Error::NotFound {
            resource: "Tour".to_string(),
            id: id.to_string(),
        },
        other => Error::Database(other),
    })?;

    Ok(Json(TourResponse::from(updated)))
}

/// Delete a tour (admin / lead-guide)
#[utoipa::path(
    delete,
    path = "/api/v1/tours/{id}",
    tag = "tours",
    params(
        ("id" = String, Path, description = "Tour ID"),
    ),
    responses(
        (status = 204, description = "Tour deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Tour not found"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn delete_tour(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<TourId>,
) -> Result<StatusCode, Error> {
    authorize(&current_user, &[Role::Admin, Role::LeadGuide])?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut tours = Tours::new(&mut conn);

    if !tours.delete(id).await? {
        return Err(Error::NotFound {
            resource: "Tour".to_string(),
            id: id.to_string(),
        });
    }

    Ok(StatusCode::NO_CONTENT)
}
