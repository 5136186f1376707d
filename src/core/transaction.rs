//! Trade records as exchanged with the remote ledger.

use crate::core::identity::Identity;
use anyhow::anyhow;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    #[serde(alias = "purchase")]
    Buy,
    #[serde(alias = "sale")]
    Sell,
}

impl Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Side::Buy => "buy",
                Side::Sell => "sell",
            }
        )
    }
}

impl FromStr for Side {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "buy" | "purchase" => Ok(Side::Buy),
            "sell" | "sale" => Ok(Side::Sell),
            _ => Err(anyhow!("Invalid side: {}", s)),
        }
    }
}

/// A trade the user wants to record, before the ledger has accepted it.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionDraft {
    pub asset: String,
    pub side: Side,
    pub quantity: Decimal,
    pub price: Decimal,
    pub timestamp: DateTime<Utc>,
}

impl TransactionDraft {
    /// Builds a draft stamped with the current time. The asset ticker is upper-cased.
    pub fn new(asset: &str, side: Side, quantity: Decimal, price: Decimal) -> Self {
        TransactionDraft {
            asset: asset.trim().to_uppercase(),
            side,
            quantity,
            price,
            timestamp: Utc::now(),
        }
    }

    pub(crate) fn owned_by(self, owner: &Identity) -> NewTransaction {
        NewTransaction {
            user_id: owner.clone(),
            asset: self.asset,
            side: self.side,
            quantity: self.quantity,
            price: self.price,
            timestamp: self.timestamp,
        }
    }
}

/// Request body for a ledger write.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewTransaction {
    pub user_id: Identity,
    pub asset: String,
    pub side: Side,
    #[serde(with = "rust_decimal::serde::float")]
    pub quantity: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub timestamp: DateTime<Utc>,
}

/// A trade persisted by the remote ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: Identity,
    pub asset: String,
    pub side: Side,
    #[serde(with = "rust_decimal::serde::float")]
    pub quantity: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub timestamp: DateTime<Utc>,
}

impl Transaction {
    /// Total cash amount of the trade, `None` when it exceeds the range of `Decimal`.
    pub fn amount(&self) -> Option<Decimal> {
        self.quantity.checked_mul(self.price)
    }
}
