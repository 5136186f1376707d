use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::{Client, Url};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;
use tracing::{debug, error, instrument};

use crate::core::quote::{Asset, QuoteProvider, QuoteSet};

/// Coins requested on every call. `ripple` is fetched but not surfaced.
const REQUESTED_IDS: &str = "bitcoin,ethereum,litecoin,ripple";
const QUOTE_CURRENCY: &str = "usd";

// CoinGeckoProvider implementation for QuoteProvider
pub struct CoinGeckoProvider {
    base_url: String,
    client: Client,
}

impl CoinGeckoProvider {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent("coinfolio/0.1")
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(CoinGeckoProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    async fn try_fetch(&self) -> Result<QuoteSet> {
        let url = Url::parse_with_params(
            &format!("{}/simple/price", self.base_url),
            &[("ids", REQUESTED_IDS), ("vs_currencies", QUOTE_CURRENCY)],
        )?;
        debug!("Requesting quotes from {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {}", e))?;

        if !response.status().is_success() {
            return Err(anyhow!("HTTP error: {}", response.status()));
        }

        let text = response.text().await?;
        let data: HashMap<String, CoinPrice> = serde_json::from_str(&text)
            .map_err(|e| anyhow!("Failed to parse quote response: {}", e))?;
        debug!(?data, "Received quote response");

        let mut prices = BTreeMap::new();
        for asset in Asset::ALL {
            let quote = data
                .get(asset.coin_id())
                .ok_or_else(|| anyhow!("No quote found for {}", asset.coin_id()))?;
            prices.insert(asset, quote.usd);
        }

        QuoteSet::complete(prices).ok_or_else(|| anyhow!("Incomplete quote set"))
    }
}

#[derive(Debug, Deserialize)]
struct CoinPrice {
    #[serde(with = "rust_decimal::serde::float")]
    usd: Decimal,
}

#[async_trait]
impl QuoteProvider for CoinGeckoProvider {
    #[instrument(name = "CoinGeckoQuoteFetch", skip(self))]
    async fn fetch_quotes(&self) -> QuoteSet {
        match self.try_fetch().await {
            Ok(quotes) => quotes,
            Err(e) => {
                error!("Error fetching crypto prices: {e:#}");
                QuoteSet::empty()
            }
        }
    }
}
