// ABOUTME: Payment processor abstraction and the Stripe-backed implementation
// ABOUTME: Charges collect from bidders; transfers pay out to developers

use async_trait::async_trait;
use bountyboard_core::{Cents, Currency};
use tracing::debug;

use crate::error::ProcessorError;

/// Moves real money. Implementations return the processor's transaction id
/// on success; failures are isolated per call by the settlement phases.
#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    /// Charge a bidder's connected account.
    async fn charge(
        &self,
        account: &str,
        amount: Cents,
        currency: Currency,
        description: &str,
    ) -> Result<String, ProcessorError>;

    /// Transfer a payout to a developer's connected account.
    async fn transfer(
        &self,
        destination: &str,
        amount: Cents,
        currency: Currency,
        description: &str,
    ) -> Result<String, ProcessorError>;
}

pub struct StripeProcessor {
    client: reqwest::Client,
    secret_key: String,
    base_url: String,
}

impl StripeProcessor {
    pub fn new(secret_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            secret_key,
            base_url: "https://api.stripe.com/v1".to_string(),
        }
    }

    /// Point at a different API host, used against stripe-mock in development.
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    async fn post_form(
        &self,
        path: &str,
        form: &[(&str, String)],
    ) -> Result<String, ProcessorError> {
        let response = self
            .client
            .post(format!("{}/{}", self.base_url, path))
            .bearer_auth(&self.secret_key)
            .form(form)
            .send()
            .await?;

        let status = response.status();
        let body: serde_json::Value = response.json().await?;

        if !status.is_success() {
            let message = body
                .pointer("/error/message")
                .and_then(|m| m.as_str())
                .unwrap_or("unknown processor error");
            return Err(ProcessorError::Declined(message.to_string()));
        }

        body.get("id")
            .and_then(|id| id.as_str())
            .map(String::from)
            .ok_or_else(|| ProcessorError::Malformed("response missing id".to_string()))
    }
}

#[async_trait]
impl PaymentProcessor for StripeProcessor {
    async fn charge(
        &self,
        account: &str,
        amount: Cents,
        currency: Currency,
        description: &str,
    ) -> Result<String, ProcessorError> {
        debug!("Charging {} {} from {}", amount, currency, account);
        self.post_form(
            "payment_intents",
            &[
                ("amount", amount.value().to_string()),
                ("currency", currency.processor_code().to_string()),
                ("customer", account.to_string()),
                ("description", description.to_string()),
                ("confirm", "true".to_string()),
            ],
        )
        .await
    }

    async fn transfer(
        &self,
        destination: &str,
        amount: Cents,
        currency: Currency,
        description: &str,
    ) -> Result<String, ProcessorError> {
        debug!("Transferring {} {} to {}", amount, currency, destination);
        self.post_form(
            "transfers",
            &[
                ("amount", amount.value().to_string()),
                ("currency", currency.processor_code().to_string()),
                ("destination", destination.to_string()),
                ("description", description.to_string()),
            ],
        )
        .await
    }
}
