use super::ui;
use crate::core::{Transaction, View, Wallet};
use anyhow::Result;
use comfy_table::Cell;

pub fn display_as_table(transactions: &[Transaction]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Date"),
        ui::header_cell("Side"),
        ui::header_cell("Asset"),
        ui::header_cell("Quantity"),
        ui::header_cell("Price (USD)"),
        ui::header_cell("Total (USD)"),
        ui::header_cell("Id"),
    ]);

    for tx in transactions {
        table.add_row(vec![
            Cell::new(tx.timestamp.format("%Y-%m-%d %H:%M")),
            Cell::new(tx.side),
            Cell::new(&tx.asset),
            ui::number_cell(tx.quantity.normalize().to_string()),
            ui::number_cell(ui::money(tx.price)),
            ui::optional_money_cell(tx.amount()),
            Cell::new(&tx.id),
        ]);
    }
    table.to_string()
}

pub async fn run(wallet: &Wallet) -> Result<()> {
    super::enter(wallet, View::History).await?;

    let transactions = wallet.ledger().transactions();
    if transactions.is_empty() {
        println!("No transactions recorded yet.");
        return Ok(());
    }

    let owner = wallet
        .identity()
        .map(|id| id.to_string())
        .unwrap_or_default();
    println!(
        "\nHistory: {}",
        ui::style_text(&owner, ui::StyleType::Title)
    );
    println!("{}", display_as_table(&transactions));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Identity, Side};
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    #[test]
    fn test_display_as_table_keeps_ledger_order() {
        let tx = |id: &str, asset: &str| Transaction {
            id: id.to_string(),
            user_id: Identity::new("user42").unwrap(),
            asset: asset.to_string(),
            side: Side::Sell,
            quantity: Decimal::new(150, 2),
            price: Decimal::from(2000),
            timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap(),
        };

        let table = display_as_table(&[tx("zz9", "ETH"), tx("aa1", "LTC")]);

        assert!(table.contains("2024-03-01 12:30"));
        assert!(table.contains("1.5"));
        assert!(table.contains("3000.00"));
        assert!(table.find("zz9").unwrap() < table.find("aa1").unwrap());
    }

    #[test]
    fn test_display_as_table_out_of_range_total() {
        let tx = Transaction {
            id: "big1".to_string(),
            user_id: Identity::new("user42").unwrap(),
            asset: "BTC".to_string(),
            side: Side::Buy,
            quantity: Decimal::from_scientific("1e20").unwrap(),
            price: Decimal::from_scientific("1e10").unwrap(),
            timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap(),
        };

        let table = display_as_table(&[tx]);

        assert!(table.contains("big1"));
        assert!(table.contains("N/A"));
    }
}
