//! Spot price abstractions and core types

use anyhow::anyhow;
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Display;
use std::str::FromStr;

/// Assets whose prices are surfaced to consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Asset {
    #[serde(rename = "btc")]
    Bitcoin,
    #[serde(rename = "eth")]
    Ethereum,
    #[serde(rename = "ltc")]
    Litecoin,
}

impl Asset {
    pub const ALL: [Asset; 3] = [Asset::Bitcoin, Asset::Ethereum, Asset::Litecoin];

    /// Identifier used by the quote service.
    pub fn coin_id(&self) -> &'static str {
        match self {
            Asset::Bitcoin => "bitcoin",
            Asset::Ethereum => "ethereum",
            Asset::Litecoin => "litecoin",
        }
    }

    /// Upper-case ticker, as stored on transactions.
    pub fn ticker(&self) -> &'static str {
        match self {
            Asset::Bitcoin => "BTC",
            Asset::Ethereum => "ETH",
            Asset::Litecoin => "LTC",
        }
    }
}

impl Display for Asset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.ticker())
    }
}

impl FromStr for Asset {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "btc" | "bitcoin" => Ok(Asset::Bitcoin),
            "eth" | "ethereum" => Ok(Asset::Ethereum),
            "ltc" | "litecoin" => Ok(Asset::Litecoin),
            _ => Err(anyhow!("Unsupported asset: {}", s)),
        }
    }
}

/// Prices in USD for a complete set of assets, or nothing at all.
///
/// An empty set means quotes are unavailable. It never stands for zero-valued
/// assets, and a non-empty set always covers every [`Asset`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct QuoteSet {
    prices: BTreeMap<Asset, Decimal>,
}

impl QuoteSet {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a set from raw prices. Returns `None` unless every asset is priced.
    pub fn complete(prices: BTreeMap<Asset, Decimal>) -> Option<Self> {
        if Asset::ALL.iter().all(|asset| prices.contains_key(asset)) {
            Some(QuoteSet { prices })
        } else {
            None
        }
    }

    pub fn get(&self, asset: Asset) -> Option<Decimal> {
        self.prices.get(&asset).copied()
    }

    /// Looks up a price by transaction ticker (`BTC`, `eth`, ...).
    pub fn price_of(&self, ticker: &str) -> Option<Decimal> {
        ticker.parse::<Asset>().ok().and_then(|asset| self.get(asset))
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Asset, Decimal)> + '_ {
        self.prices.iter().map(|(asset, price)| (*asset, *price))
    }
}

#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Fetches a fresh quote set. Failures yield [`QuoteSet::empty`].
    async fn fetch_quotes(&self) -> QuoteSet;
}
