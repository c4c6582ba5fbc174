//! Dummy payment provider implementation
//!
//! Issues checkout sessions locally without talking to any external payment
//! service. Useful for testing and development.

use async_trait::async_trait;

use crate::{
    api::models::users::CurrentUser,
    db::models::tours::TourDBResponse,
    payment_providers::{CheckoutSession, PaymentProvider, Result},
};

/// Dummy payment provider: sessions are minted locally and the success URL
/// is returned directly as the "payment page".
#[derive(Debug, Default)]
pub struct DummyProvider;

impl DummyProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PaymentProvider for DummyProvider {
    async fn create_checkout_session(
        &self,
        user: &CurrentUser,
        tour: &TourDBResponse,
        success_url: &str,
        _cancel_url: &str,
    ) -> Result<CheckoutSession> {
        // Session ID embeds the user ID so sessions are traceable in logs
        let session_id = format!("dummy_session_{}_{}", user.id, uuid::Uuid::new_v4());

        tracing::info!(
            "Dummy provider created checkout session {} for user {} on tour {}",
            session_id,
            user.id,
            tour.id
        );

        Ok(CheckoutSession {
            id: session_id,
            url: success_url.to_string(),
        })
    }
}
