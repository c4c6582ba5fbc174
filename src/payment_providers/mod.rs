//! Payment provider abstraction layer
//!
//! This module defines the `PaymentProvider` trait which abstracts
//! checkout-session creation across payment providers. The core only passes
//! identity and tour details through this seam; payment logic itself lives
//! behind it.

use async_trait::async_trait;
use std::sync::Arc;

use crate::{api::models::users::CurrentUser, config::PaymentConfig, db::models::tours::TourDBResponse};

pub mod dummy;

/// Create a payment provider from configuration
///
/// This is the single point where we convert config into provider instances.
/// Adding a new provider requires adding a match arm here. With no payment
/// config, checkout sessions come from the dummy provider.
pub fn create_provider(config: Option<&PaymentConfig>) -> Arc<dyn PaymentProvider> {
    match config {
        Some(PaymentConfig::Dummy(_)) | None => Arc::new(dummy::DummyProvider::new()),
    }
}

/// Result type for payment provider operations
pub type Result<T> = std::result::Result<T, PaymentError>;

/// Errors that can occur during checkout-session creation
#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    #[error("Payment provider API error: {0}")]
    ProviderApi(String),

    #[error("Invalid payment data: {0}")]
    InvalidData(String),
}

impl From<PaymentError> for crate::errors::Error {
    fn from(err: PaymentError) -> Self {
        crate::errors::Error::Internal {
            operation: format!("create checkout session: {err}"),
        }
    }
}

/// An opaque checkout session handed back to the client.
#[derive(Debug, Clone)]
pub struct CheckoutSession {
    /// Provider-scoped session reference
    pub id: String,
    /// Where the client should redirect the user to pay
    pub url: String,
}

/// Abstract payment provider interface
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Create a checkout session for `user` booking `tour`.
    ///
    /// `success_url` and `cancel_url` are the redirect targets after payment.
    async fn create_checkout_session(
        &self,
        user: &CurrentUser,
        tour: &TourDBResponse,
        success_url: &str,
        cancel_url: &str,
    ) -> Result<CheckoutSession>;
}
