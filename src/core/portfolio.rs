//! Holdings and valuation derived from the ledger and current quotes.
use crate::core::quote::QuoteSet;
use crate::core::transaction::{Side, Transaction};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Net position in one asset.
///
/// Amounts are `None` when they fall outside the range of `Decimal`.
#[derive(Debug, Clone, PartialEq)]
pub struct Holding {
    pub asset: String,
    pub quantity: Option<Decimal>,
    /// Buy cost minus sell proceeds.
    pub invested: Option<Decimal>,
    pub price: Option<Decimal>,
    pub market_value: Option<Decimal>,
}

impl Holding {
    /// Market value minus net invested, when a quote is available.
    pub fn profit(&self) -> Option<Decimal> {
        self.market_value?.checked_sub(self.invested?)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioSummary {
    pub holdings: Vec<Holding>,
    pub total_invested: Option<Decimal>,
    /// Absent unless every holding could be valued.
    pub total_value: Option<Decimal>,
}

impl PortfolioSummary {
    pub fn total_profit(&self) -> Option<Decimal> {
        self.total_value?.checked_sub(self.total_invested?)
    }
}

/// Running quantity and invested amount for one asset.
#[derive(Clone, Copy)]
struct Position {
    quantity: Option<Decimal>,
    invested: Option<Decimal>,
}

impl Position {
    const ZERO: Position = Position {
        quantity: Some(Decimal::ZERO),
        invested: Some(Decimal::ZERO),
    };

    fn apply(&mut self, tx: &Transaction) {
        let amount = tx.amount();
        match tx.side {
            Side::Buy => {
                self.quantity = self.quantity.and_then(|q| q.checked_add(tx.quantity));
                self.invested = self.invested.zip(amount).and_then(|(i, a)| i.checked_add(a));
            }
            Side::Sell => {
                self.quantity = self.quantity.and_then(|q| q.checked_sub(tx.quantity));
                self.invested = self.invested.zip(amount).and_then(|(i, a)| i.checked_sub(a));
            }
        }
    }
}

fn checked_total(values: impl Iterator<Item = Option<Decimal>>) -> Option<Decimal> {
    values.fold(Some(Decimal::ZERO), |acc, value| acc?.checked_add(value?))
}

pub fn summarize(transactions: &[Transaction], quotes: &QuoteSet) -> PortfolioSummary {
    let mut positions: BTreeMap<String, Position> = BTreeMap::new();
    for tx in transactions {
        positions
            .entry(tx.asset.to_uppercase())
            .or_insert(Position::ZERO)
            .apply(tx);
    }

    let holdings: Vec<Holding> = positions
        .into_iter()
        .map(|(asset, position)| {
            let price = quotes.price_of(&asset);
            Holding {
                market_value: price
                    .zip(position.quantity)
                    .and_then(|(p, q)| p.checked_mul(q)),
                asset,
                quantity: position.quantity,
                invested: position.invested,
                price,
            }
        })
        .collect();

    let total_invested = checked_total(holdings.iter().map(|h| h.invested));
    let total_value = checked_total(holdings.iter().map(|h| h.market_value));

    PortfolioSummary {
        holdings,
        total_invested,
        total_value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identity::Identity;
    use crate::core::quote::Asset;
    use chrono::Utc;

    fn tx(asset: &str, side: Side, quantity: i64, price: i64) -> Transaction {
        Transaction {
            id: format!("{asset}-{quantity}"),
            user_id: Identity::new("user42").unwrap(),
            asset: asset.to_string(),
            side,
            quantity: Decimal::from(quantity),
            price: Decimal::from(price),
            timestamp: Utc::now(),
        }
    }

    fn quotes() -> QuoteSet {
        let prices = [
            (Asset::Bitcoin, Decimal::from(60000)),
            (Asset::Ethereum, Decimal::from(3000)),
            (Asset::Litecoin, Decimal::from(100)),
        ];
        QuoteSet::complete(prices.into_iter().collect()).unwrap()
    }

    #[test]
    fn test_summarize_nets_buys_and_sells() {
        let ledger = vec![
            tx("BTC", Side::Buy, 2, 50000),
            tx("ETH", Side::Buy, 10, 2000),
            tx("BTC", Side::Sell, 1, 55000),
        ];

        let summary = summarize(&ledger, &quotes());

        assert_eq!(summary.holdings.len(), 2);
        let btc = &summary.holdings[0];
        assert_eq!(btc.asset, "BTC");
        assert_eq!(btc.quantity, Some(Decimal::from(1)));
        assert_eq!(btc.invested, Some(Decimal::from(45000)));
        assert_eq!(btc.market_value, Some(Decimal::from(60000)));
        assert_eq!(btc.profit(), Some(Decimal::from(15000)));

        let eth = &summary.holdings[1];
        assert_eq!(eth.market_value, Some(Decimal::from(30000)));

        assert_eq!(summary.total_invested, Some(Decimal::from(65000)));
        assert_eq!(summary.total_value, Some(Decimal::from(90000)));
        assert_eq!(summary.total_profit(), Some(Decimal::from(25000)));
    }

    #[test]
    fn test_summarize_without_quotes() {
        let ledger = vec![tx("LTC", Side::Buy, 3, 80)];

        let summary = summarize(&ledger, &QuoteSet::empty());

        assert_eq!(summary.holdings[0].price, None);
        assert_eq!(summary.holdings[0].market_value, None);
        assert_eq!(summary.total_invested, Some(Decimal::from(240)));
        assert_eq!(summary.total_value, None);
    }

    #[test]
    fn test_unknown_asset_blocks_total_value() {
        let ledger = vec![tx("BTC", Side::Buy, 1, 50000), tx("DOGE", Side::Buy, 100, 1)];

        let summary = summarize(&ledger, &quotes());

        assert_eq!(summary.holdings.len(), 2);
        assert!(summary.holdings[1].market_value.is_none());
        assert!(summary.total_value.is_none());
    }

    #[test]
    fn test_summarize_empty_ledger() {
        let summary = summarize(&[], &quotes());
        assert!(summary.holdings.is_empty());
        assert_eq!(summary.total_invested, Some(Decimal::ZERO));
        assert_eq!(summary.total_value, Some(Decimal::ZERO));
    }

    #[test]
    fn test_out_of_range_amounts_are_not_valued() {
        let mut huge = tx("BTC", Side::Buy, 1, 1);
        huge.quantity = Decimal::from_scientific("1e20").unwrap();
        huge.price = Decimal::from_scientific("1e10").unwrap();
        let ledger = vec![huge, tx("ETH", Side::Buy, 2, 1500)];

        let summary = summarize(&ledger, &quotes());

        let btc = &summary.holdings[0];
        assert_eq!(btc.invested, None);
        assert_eq!(btc.market_value, None);
        assert_eq!(btc.profit(), None);
        assert_eq!(summary.holdings[1].invested, Some(Decimal::from(3000)));
        assert_eq!(summary.total_invested, None);
        assert_eq!(summary.total_profit(), None);
    }
}
