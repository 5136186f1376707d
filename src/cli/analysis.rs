use super::ui;
use crate::core::portfolio::{self, PortfolioSummary};
use crate::core::{View, Wallet};
use anyhow::Result;
use comfy_table::{Attribute, Cell};

impl PortfolioSummary {
    pub fn display_as_table(&self) -> String {
        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Asset"),
            ui::header_cell("Quantity"),
            ui::header_cell("Invested (USD)"),
            ui::header_cell("Price (USD)"),
            ui::header_cell("Value (USD)"),
            ui::header_cell("Profit (USD)"),
        ]);

        for holding in &self.holdings {
            table.add_row(vec![
                Cell::new(&holding.asset),
                ui::optional_number_cell(holding.quantity.map(|q| q.normalize().to_string())),
                ui::optional_money_cell(holding.invested),
                ui::optional_money_cell(holding.price),
                ui::optional_money_cell(holding.market_value),
                ui::profit_cell(holding.profit()),
            ]);
        }

        table.add_row(vec![
            Cell::new("Total").add_attribute(Attribute::Bold),
            Cell::new(""),
            ui::optional_money_cell(self.total_invested).add_attribute(Attribute::Bold),
            Cell::new(""),
            ui::optional_money_cell(self.total_value).add_attribute(Attribute::Bold),
            ui::profit_cell(self.total_profit()).add_attribute(Attribute::Bold),
        ]);

        table.to_string()
    }
}

pub async fn run(wallet: &Wallet) -> Result<()> {
    let attempt = wallet.guard().navigate(View::Analysis);
    if !attempt.decision.is_allowed() {
        return super::settle(View::Analysis, attempt).await.map(|_| ());
    }
    let (entered, quotes) = futures::join!(super::settle(View::Analysis, attempt), wallet.quotes());
    entered?;

    let transactions = wallet.ledger().transactions();
    if transactions.is_empty() {
        println!("No transactions recorded yet.");
        return Ok(());
    }
    if quotes.is_empty() {
        println!(
            "{}",
            ui::style_text(
                "Prices are currently unavailable; market values are omitted",
                ui::StyleType::Error
            )
        );
    }

    let summary = portfolio::summarize(&transactions, &quotes);
    println!(
        "\n{}",
        ui::style_text("Portfolio analysis", ui::StyleType::Title)
    );
    println!("{}", summary.display_as_table());
    Ok(())
}
