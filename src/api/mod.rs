//! API layer for HTTP request handling and data models.
//!
//! This module contains the REST API implementation, organized into:
//!
//! - **[`handlers`]**: Axum route handlers for all API endpoints
//! - **[`models`]**: Request/response data structures for API communication
//!
//! # API Structure
//!
//! - **Authentication** (`/authentication/*`): signup, login, logout, and
//!   the password lifecycle (forgot / reset / update)
//! - **Users** (`/api/v1/users/*`): profile self-service and admin management
//! - **Tours** (`/api/v1/tours/*`): tour catalogue, public reads, guarded writes
//! - **Reviews** (`/api/v1/tours/{id}/reviews`, `/api/v1/reviews/*`): review
//!   CRUD; every mutation triggers the rating aggregator
//! - **Bookings** (`/api/v1/bookings/*`): checkout-session creation and
//!   the caller's booking history
//!
//! All endpoints are documented with OpenAPI annotations using `utoipa`;
//! rendered docs are served at `/docs` when the server is running.

pub mod handlers;
pub mod models;
