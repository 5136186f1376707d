use super::ui;
use crate::core::{QuoteSet, Wallet};
use anyhow::Result;

impl QuoteSet {
    pub fn display_as_table(&self) -> String {
        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Asset"),
            ui::header_cell("Coin"),
            ui::header_cell("Price (USD)"),
        ]);
        for (asset, price) in self.iter() {
            table.add_row(vec![
                comfy_table::Cell::new(asset.ticker()),
                comfy_table::Cell::new(asset.coin_id()),
                ui::number_cell(ui::money(price)),
            ]);
        }
        table.to_string()
    }
}

pub async fn run(wallet: &Wallet) -> Result<()> {
    let spinner = ui::new_spinner("Fetching prices...");
    let quotes = wallet.quotes().await;
    spinner.finish_and_clear();

    if quotes.is_empty() {
        println!(
            "{}",
            ui::style_text("Prices are currently unavailable", ui::StyleType::Error)
        );
        return Ok(());
    }
    println!("{}", quotes.display_as_table());
    Ok(())
}
