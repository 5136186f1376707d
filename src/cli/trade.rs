use super::ui;
use crate::core::{Asset, Side, TransactionDraft, View, Wallet};
use anyhow::{Result, anyhow, bail};
use rust_decimal::Decimal;

/// Resolves the execution price: an explicit price wins, otherwise the live quote.
async fn execution_price(wallet: &Wallet, asset: Asset, price: Option<Decimal>) -> Result<Decimal> {
    if let Some(price) = price {
        return Ok(price);
    }
    let spinner = ui::new_spinner("Fetching prices...");
    let quotes = wallet.quotes().await;
    spinner.finish_and_clear();
    quotes
        .get(asset)
        .ok_or_else(|| anyhow!("Prices are currently unavailable; pass --price to record the trade"))
}

pub async fn run(
    wallet: &Wallet,
    side: Side,
    asset: &str,
    quantity: Decimal,
    price: Option<Decimal>,
) -> Result<()> {
    if quantity <= Decimal::ZERO {
        bail!("Quantity must be positive, got {quantity}");
    }
    if let Some(p) = price {
        if p <= Decimal::ZERO {
            bail!("Price must be positive, got {p}");
        }
    }
    let asset: Asset = asset.parse()?;

    super::enter(wallet, View::Trade).await?;

    let price = execution_price(wallet, asset, price).await?;
    let draft = TransactionDraft::new(asset.ticker(), side, quantity, price);

    let spinner = ui::new_spinner("Saving transaction...");
    let saved = wallet.ledger().add_transaction(draft).await;
    spinner.finish_and_clear();

    match saved {
        Ok(tx) => {
            println!(
                "Recorded {} {} {} at {} USD (total {} USD) [{}]",
                tx.side,
                tx.quantity,
                tx.asset,
                ui::money(tx.price),
                tx.amount().map(ui::money).unwrap_or_else(|| "N/A".to_string()),
                ui::style_text(&tx.id, ui::StyleType::Subtle)
            );
            Ok(())
        }
        Err(e) => {
            let message = wallet
                .ledger()
                .error_message()
                .unwrap_or_else(|| e.to_string());
            println!("{}", ui::style_text(&message, ui::StyleType::Error));
            Err(e)
        }
    }
}
