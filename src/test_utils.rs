//! Test utilities for integration testing (available with `test-utils` feature).

use axum_test::TestServer;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    api::models::users::Role,
    auth::{password, session},
    config::{Config, EmailTransportConfig},
    db::{handlers::{Repository, Users}, models::users::UserCreateDBRequest},
    payment_providers, AppState,
};

/// Config for tests: known secret, low-cost hashing, file email transport,
/// insecure cookie (no HTTPS under test).
pub fn create_test_config() -> Config {
    let temp_dir = std::env::temp_dir().join(format!("trailbook-test-emails-{}", std::process::id()));

    let mut config = Config {
        secret_key: Some("test-secret-key-for-testing-only".to_string()),
        admin_email: "admin@test.com".to_string(),
        admin_password: None,
        ..Default::default()
    };
    config.auth.session.timeout = std::time::Duration::from_secs(3600);
    config.auth.session.cookie_secure = false;
    // Cheap hashing keeps the auth tests fast
    config.auth.password.argon2_memory_kib = 1024;
    config.auth.password.argon2_iterations = 1;
    config.auth.password.argon2_parallelism = 1;
    config.email.transport = EmailTransportConfig::File {
        path: temp_dir.to_string_lossy().to_string(),
    };
    config
}

/// Build an AppState over the given pool with the test config.
pub fn create_test_app_state(pool: PgPool, config: Config) -> AppState {
    let payments = payment_providers::create_provider(config.payment.as_ref());
    AppState::builder().db(pool).config(config).payments(payments).build()
}

/// Spin up a TestServer over the full router with the test config.
pub async fn create_test_app(pool: PgPool) -> TestServer {
    create_test_app_with_config(pool, create_test_config()).await
}

/// Spin up a TestServer with a caller-tweaked config.
pub async fn create_test_app_with_config(pool: PgPool, config: Config) -> TestServer {
    let state = create_test_app_state(pool, config);
    let router = crate::build_router(state).expect("Failed to build router");
    TestServer::new(router).expect("Failed to create test server")
}

/// Sign up a user through the API; returns their session token.
pub async fn signup_user(server: &TestServer, email: &str, password: &str) -> String {
    let response = server
        .post("/authentication/signup")
        .json(&serde_json::json!({
            "name": "Test User",
            "email": email,
            "password": password,
            "password_confirm": password,
        }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    let body: crate::api::models::auth::AuthResponse = response.json();
    body.token
}

/// Create a user with the given role directly in the store; returns the
/// account and a valid session token for it.
pub async fn create_test_user(pool: &PgPool, role: Role, config: &Config) -> (crate::db::models::users::UserDBResponse, String) {
    let params = password::Argon2Params::from(&config.auth.password);
    let password_hash = password::hash_string_with_params("test-password-123", Some(params)).unwrap();

    let mut conn = pool.acquire().await.unwrap();
    let mut users = Users::new(&mut conn);
    let user = users
        .create(&UserCreateDBRequest {
            name: "Test Account".to_string(),
            email: format!("{}@test.example.com", Uuid::new_v4()),
            role,
            password_hash,
        })
        .await
        .unwrap();

    let token = session::issue_session_token(user.id, config).unwrap();
    (user, token)
}

/// Shorthand for a fresh admin account's session token.
pub async fn admin_token(pool: &PgPool, config: &Config) -> String {
    let (_user, token) = create_test_user(pool, Role::Admin, config).await;
    token
}
