//! # trailbook: Tour Booking Backend
//!
//! `trailbook` is the backend for a tour-booking platform: accounts with
//! role-based access control, a tour catalogue, per-tour reviews with
//! denormalised rating aggregates, and checkout-session creation for
//! bookings.
//!
//! ## Architecture
//!
//! The application is built on [Axum](https://github.com/tokio-rs/axum) for
//! the HTTP layer and uses PostgreSQL (via SQLx) for all persistence.
//!
//! ### Request Flow
//!
//! A request carrying a session credential (Bearer header or cookie) passes
//! through the guard in [`auth::guard`]: the JWT is verified, the account is
//! loaded fresh from the database, and the token is rejected if the account
//! is gone or changed its password after the token was issued. Handlers then
//! apply role checks explicitly per route. Review mutations invoke the
//! rating aggregator ([`ratings`]) after their write commits, keeping each
//! tour's `ratings_quantity`/`ratings_average` consistent with its reviews.
//!
//! ### Core Components
//!
//! - **API layer** ([`api`]): REST handlers and request/response models,
//!   documented with OpenAPI annotations (served at `/docs`).
//! - **Authentication** ([`auth`]): Argon2 password hashing, JWT session
//!   tokens, single-use password reset tokens, and the per-request guard.
//! - **Database layer** ([`db`]): repository-pattern data access over SQLx,
//!   with migrations under `migrations/`.
//! - **Rating aggregator** ([`ratings`]): recomputes a tour's derived
//!   rating fields; the only writer of those columns.
//! - **Email** ([`email`]): lettre-backed welcome and password-reset mail.
//! - **Payments** ([`payment_providers`]): the checkout-session seam.
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use trailbook::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = trailbook::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     trailbook::telemetry::init_telemetry()?;
//!
//!     let app = Application::new(config).await?;
//!     app.serve(async {
//!         tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!     })
//!     .await?;
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
mod email;
pub mod errors;
mod openapi;
pub mod payment_providers;
pub mod ratings;
pub mod telemetry;
mod types;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

use crate::{
    api::models::users::Role,
    auth::password,
    db::handlers::{Repository, Users},
    db::models::users::UserCreateDBRequest,
    openapi::ApiDoc,
    payment_providers::PaymentProvider,
};
use axum::{
    routing::{get, patch, post},
    Router,
};
use bon::Builder;
pub use config::Config;
use sqlx::PgPool;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{info, instrument, warn, Level};
use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;

pub use types::{BookingId, ReviewId, TourId, UserId};

/// Application state shared across all request handlers.
///
/// - `db`: PostgreSQL connection pool
/// - `config`: application configuration
/// - `payments`: the configured payment provider for checkout sessions
#[derive(Clone, Builder)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
    pub payments: Arc<dyn PaymentProvider>,
}

/// Get the trailbook database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Create the initial admin account if it doesn't exist.
///
/// Idempotent: an existing account with the configured email is left
/// untouched (its password is not rotated, so restarts never revoke the
/// admin's sessions). With no `admin_password` configured, bootstrap is
/// skipped.
#[instrument(skip_all)]
pub async fn create_initial_admin_user(email: &str, password: Option<&str>, db: &PgPool) -> Result<Option<UserId>, anyhow::Error> {
    let Some(password) = password else {
        warn!("No admin_password configured; skipping initial admin bootstrap");
        return Ok(None);
    };

    let mut conn = db.acquire().await?;
    let mut user_repo = Users::new(&mut conn);

    if let Some(existing) = user_repo.get_by_email(email).await? {
        return Ok(Some(existing.id));
    }

    let password_hash = password::hash_string(password).map_err(|e| anyhow::anyhow!("hash admin password: {e}"))?;
    let created = user_repo
        .create(&UserCreateDBRequest {
            name: "Administrator".to_string(),
            email: email.to_string(),
            role: Role::Admin,
            password_hash,
        })
        .await?;

    info!("Created initial admin account {}", created.id);
    Ok(Some(created.id))
}

/// Create CORS layer from configuration
fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    if config.cors.allowed_origins.is_empty() {
        return Ok(CorsLayer::new());
    }

    let mut cors = if config.cors.allowed_origins.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(tower_http::cors::Any)
    } else {
        let mut origins = Vec::new();
        for origin in &config.cors.allowed_origins {
            origins.push(origin.parse::<axum::http::HeaderValue>()?);
        }
        CorsLayer::new().allow_origin(origins).allow_credentials(config.cors.allow_credentials)
    };

    if let Some(max_age) = config.cors.max_age {
        cors = cors.max_age(std::time::Duration::from_secs(max_age));
    }

    Ok(cors)
}

/// Build the application router with all endpoints and middleware.
#[instrument(skip_all)]
pub fn build_router(state: AppState) -> anyhow::Result<Router> {
    let cors = create_cors_layer(&state.config)?;

    // Authentication routes at root level
    let auth_routes = Router::new()
        .route("/authentication/signup", post(api::handlers::auth::signup))
        .route("/authentication/login", post(api::handlers::auth::login))
        .route("/authentication/logout", post(api::handlers::auth::logout))
        .route("/authentication/forgot-password", post(api::handlers::auth::forgot_password))
        .route("/authentication/reset-password/{token}", patch(api::handlers::auth::reset_password))
        .route("/authentication/update-password", patch(api::handlers::auth::update_password));

    // API routes
    let api_routes = Router::new()
        // Profile self-service
        .route(
            "/users/me",
            get(api::handlers::users::get_me)
                .patch(api::handlers::users::update_me)
                .delete(api::handlers::users::delete_me),
        )
        // User management (admin only)
        .route("/users", get(api::handlers::users::list_users))
        .route(
            "/users/{id}",
            get(api::handlers::users::get_user).delete(api::handlers::users::delete_user),
        )
        // Tour catalogue
        .route("/tours", get(api::handlers::tours::list_tours).post(api::handlers::tours::create_tour))
        .route("/tours/top-5-cheap", get(api::handlers::tours::top_tours))
        .route(
            "/tours/{id}",
            get(api::handlers::tours::get_tour)
                .patch(api::handlers::tours::update_tour)
                .delete(api::handlers::tours::delete_tour),
        )
        // Reviews, nested under their tour for listing/creation
        .route(
            "/tours/{tour_id}/reviews",
            get(api::handlers::reviews::list_tour_reviews).post(api::handlers::reviews::create_review),
        )
        .route(
            "/reviews/{id}",
            patch(api::handlers::reviews::update_review).delete(api::handlers::reviews::delete_review),
        )
        // Bookings
        .route(
            "/bookings/checkout-session/{tour_id}",
            post(api::handlers::bookings::create_checkout_session),
        )
        .route("/bookings/me", get(api::handlers::bookings::my_bookings));

    let router = Router::new()
        .merge(auth_routes)
        .nest("/api/v1", api_routes)
        .merge(RapiDoc::with_openapi("/docs/openapi.json", ApiDoc::openapi()).path("/docs"))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
        )
        .layer(cors)
        .with_state(state);

    Ok(router)
}

/// The assembled application: connected pool, migrated schema, and router.
pub struct Application {
    state: AppState,
}

impl Application {
    /// Connect to the configured database, run migrations, bootstrap the
    /// admin account, and assemble the application.
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(config.database.max_connections)
            .connect(&config.database.url)
            .await?;

        Self::new_with_pool(config, pool).await
    }

    /// Assemble the application over an existing pool (used by tests).
    pub async fn new_with_pool(config: Config, pool: PgPool) -> anyhow::Result<Self> {
        migrator().run(&pool).await?;

        create_initial_admin_user(&config.admin_email, config.admin_password.as_deref(), &pool).await?;

        let payments = payment_providers::create_provider(config.payment.as_ref());
        let state = AppState::builder().db(pool).config(config).payments(payments).build();

        Ok(Self { state })
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn router(&self) -> anyhow::Result<Router> {
        build_router(self.state.clone())
    }

    /// Serve until the shutdown future resolves.
    pub async fn serve(self, shutdown: impl std::future::Future<Output = ()> + Send + 'static) -> anyhow::Result<()> {
        let addr = format!("{}:{}", self.state.config.host, self.state.config.port);
        let listener = TcpListener::bind(&addr).await?;
        info!("Listening on {}", listener.local_addr()?);

        let router = self.router()?;
        axum::serve(listener, router).with_graceful_shutdown(shutdown).await?;

        Ok(())
    }
}
