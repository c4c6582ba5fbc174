//! OpenAPI documentation configuration.
//!
//! Aggregates every annotated handler and schema into [`ApiDoc`]; rendered
//! docs are served at `/docs` by the router.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::api::handlers::auth::signup,
        crate::api::handlers::auth::login,
        crate::api::handlers::auth::logout,
        crate::api::handlers::auth::forgot_password,
        crate::api::handlers::auth::reset_password,
        crate::api::handlers::auth::update_password,
        crate::api::handlers::users::get_me,
        crate::api::handlers::users::update_me,
        crate::api::handlers::users::delete_me,
        crate::api::handlers::users::list_users,
        crate::api::handlers::users::get_user,
        crate::api::handlers::users::delete_user,
        crate::api::handlers::tours::list_tours,
        crate::api::handlers::tours::top_tours,
        crate::api::handlers::tours::get_tour,
        crate::api::handlers::tours::create_tour,
        crate::api::handlers::tours::update_tour,
        crate::api::handlers::tours::delete_tour,
        crate::api::handlers::reviews::list_tour_reviews,
        crate::api::handlers::reviews::create_review,
        crate::api::handlers::reviews::update_review,
        crate::api::handlers::reviews::delete_review,
        crate::api::handlers::bookings::create_checkout_session,
        crate::api::handlers::bookings::my_bookings,
    ),
    components(schemas(
        crate::api::models::auth::SignupRequest,
        crate::api::models::auth::LoginRequest,
        crate::api::models::auth::ForgotPasswordRequest,
        crate::api::models::auth::ResetPasswordRequest,
        crate::api::models::auth::UpdatePasswordRequest,
        crate::api::models::auth::AuthResponse,
        crate::api::models::auth::AuthSuccessResponse,
        crate::api::models::users::Role,
        crate::api::models::users::UserResponse,
        crate::api::models::users::UserUpdate,
        crate::api::models::tours::Difficulty,
        crate::api::models::tours::TourCreate,
        crate::api::models::tours::TourUpdate,
        crate::api::models::tours::TourResponse,
        crate::api::handlers::tours::TourDetailResponse,
        crate::api::models::reviews::ReviewCreate,
        crate::api::models::reviews::ReviewUpdate,
        crate::api::models::reviews::ReviewResponse,
        crate::api::models::bookings::BookingResponse,
        crate::api::models::bookings::CheckoutSessionResponse,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "authentication", description = "Signup, login, and the password lifecycle"),
        (name = "users", description = "Account profiles and admin user management"),
        (name = "tours", description = "Tour catalogue"),
        (name = "reviews", description = "Tour reviews and rating aggregation"),
        (name = "bookings", description = "Checkout sessions and booking history"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session_token",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).bearer_format("JWT").build()),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_document_builds() {
        let doc = ApiDoc::openapi();
        let json = doc.to_json().expect("OpenAPI document should serialize");
        assert!(json.contains("/authentication/signup"));
        assert!(json.contains("/api/v1/tours/{tour_id}/reviews"));
        assert!(json.contains("session_token"));
    }
}
