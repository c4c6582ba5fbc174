//! Repository implementations for database access.
//!
//! Each repository wraps a SQLx connection, provides strongly-typed CRUD
//! operations, and returns domain models from [`crate::db::models`]. All of
//! them follow the [`Repository`] trait where the full CRUD surface exists.

pub mod bookings;
pub mod repository;
pub mod reviews;
pub mod tours;
pub mod users;

pub use bookings::Bookings;
pub use repository::Repository;
pub use reviews::Reviews;
pub use tours::Tours;
pub use users::Users;
