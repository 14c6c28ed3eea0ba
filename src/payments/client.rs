use std::time::Duration;

use async_trait::async_trait;
use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Timeout for calls to the payment processor.
const PAYMENT_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: String,
    pub amount_cents: i64,
    pub currency: String,
    pub status: String,
}

#[async_trait]
pub trait PaymentClient: Send + Sync {
    async fn create_intent(&self, lot_id: Uuid, amount_cents: i64)
        -> anyhow::Result<PaymentIntent>;
}

pub struct HttpPaymentClient {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
}

impl HttpPaymentClient {
    pub fn new(api_base: &str, api_key: &str) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(PAYMENT_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }
}

#[derive(Debug, Serialize)]
struct CreateIntentBody {
    amount: i64,
    currency: &'static str,
    metadata: IntentMetadata,
}

#[derive(Debug, Serialize)]
struct IntentMetadata {
    lot_id: Uuid,
}

#[async_trait]
impl PaymentClient for HttpPaymentClient {
    async fn create_intent(
        &self,
        lot_id: Uuid,
        amount_cents: i64,
    ) -> anyhow::Result<PaymentIntent> {
        let url = format!("{}/v1/payment_intents", self.api_base);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&CreateIntentBody {
                amount: amount_cents,
                currency: "eur",
                metadata: IntentMetadata { lot_id },
            })
            .send()
            .await?
            .error_for_status()?;
        let intent = response.json::<PaymentIntent>().await?;
        Ok(intent)
    }
}

/// Stand-in used when no processor API key is configured: fabricates intents
/// locally so the checkout flow stays exercisable in development.
pub struct SimulatedPaymentClient;

#[async_trait]
impl PaymentClient for SimulatedPaymentClient {
    async fn create_intent(
        &self,
        _lot_id: Uuid,
        amount_cents: i64,
    ) -> anyhow::Result<PaymentIntent> {
        let suffix: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(14)
            .map(char::from)
            .collect();
        Ok(PaymentIntent {
            id: format!("sim_{suffix}"),
            client_secret: format!("sim_{suffix}_secret"),
            amount_cents,
            currency: "eur".into(),
            status: "requires_confirmation".into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn simulated_client_fabricates_intents() {
        let client = SimulatedPaymentClient;
        let intent = client
            .create_intent(Uuid::new_v4(), 450)
            .await
            .expect("simulated intent");
        assert!(intent.id.starts_with("sim_"));
        assert_eq!(intent.amount_cents, 450);
        assert_eq!(intent.status, "requires_confirmation");
    }

    #[tokio::test]
    async fn simulated_intents_get_distinct_ids() {
        let client = SimulatedPaymentClient;
        let a = client.create_intent(Uuid::new_v4(), 100).await.unwrap();
        let b = client.create_intent(Uuid::new_v4(), 100).await.unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn http_client_strips_trailing_slash() {
        let client = HttpPaymentClient::new("https://api.pagos.test/", "sk_test").unwrap();
        assert_eq!(client.api_base, "https://api.pagos.test");
    }
}
