use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, Url};
use serde_json::json;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::core::identity::Identity;
use crate::core::ledger::LedgerBackend;
use crate::core::transaction::{NewTransaction, Transaction};

const API_KEY_HEADER: &str = "x-apikey";

/// Transaction ledger kept in a RestDB-style REST collection.
pub struct RestDbLedger {
    url: String,
    api_key: String,
    client: Client,
}

impl RestDbLedger {
    pub fn new(url: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent("coinfolio/0.1")
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(RestDbLedger {
            url: url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client,
        })
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.header(API_KEY_HEADER, &self.api_key)
    }
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    debug!(%status, body = %body, "Ledger rejected request");
    Err(anyhow!("HTTP error: {}", status))
}

#[async_trait]
impl LedgerBackend for RestDbLedger {
    #[instrument(name = "LedgerFetch", skip(self), fields(identity = %owner))]
    async fn fetch(&self, owner: &Identity) -> Result<Vec<Transaction>> {
        let filter = json!({ "user_id": owner }).to_string();
        let url = Url::parse_with_params(&self.url, &[("q", filter.as_str())])
            .with_context(|| format!("Invalid ledger URL: {}", self.url))?;
        debug!("Requesting transactions from {}", url);

        let response = self
            .authorized(self.client.get(url))
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for identity: {}", e, owner))?;
        let text = check_status(response).await?.text().await?;

        serde_json::from_str(&text)
            .map_err(|e| anyhow!("Failed to parse ledger response for {}: {}", owner, e))
    }

    #[instrument(name = "LedgerCreate", skip(self, record), fields(identity = %record.user_id))]
    async fn create(&self, record: &NewTransaction) -> Result<Transaction> {
        debug!("Posting transaction to {}", self.url);

        let response = self
            .authorized(self.client.post(&self.url))
            .json(record)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {}", e))?;
        let text = check_status(response).await?.text().await?;

        serde_json::from_str(&text).map_err(|e| anyhow!("Failed to parse saved transaction: {}", e))
    }
}
