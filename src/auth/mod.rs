//! Authentication and authorization system.
//!
//! # Components
//!
//! - [`password`]: password hashing and verification using Argon2
//! - [`session`]: stateless JWT session tokens (issue + verify)
//! - [`reset`]: single-use password reset tokens (random plaintext, stored
//!   as a SHA-256 digest, 10-minute expiry by default)
//! - [`guard`]: the per-request access control guard: extractors for the
//!   authenticated account, optional identification, and role checks
//!
//! # Session model
//!
//! A session token carries only the account id and issue/expiry timestamps.
//! Every authenticated request re-loads the account from the database, so
//! tokens die with the account (soft-delete) and are revoked by any
//! password change made after their issue time.
//!
//! # Usage in Handlers
//!
//! ```ignore
//! use trailbook::api::models::users::{CurrentUser, Role};
//! use trailbook::auth::guard::authorize;
//!
//! async fn protected_handler(current_user: CurrentUser) -> Result<String, Error> {
//!     authorize(&current_user, &[Role::Admin, Role::LeadGuide])?;
//!     Ok(format!("Hello, {}!", current_user.name))
//! }
//! ```

pub mod guard;
pub mod password;
pub mod reset;
pub mod session;
