use super::ui;
use crate::core::{Identity, LoadOutcome, LoadStatus, Wallet};
use anyhow::Result;

pub async fn login(wallet: &Wallet, identity: Identity) -> Result<()> {
    let spinner = ui::new_spinner("Loading transactions...");
    let outcome = wallet.login(identity.clone()).await;
    spinner.finish_and_clear();

    println!("Logged in as {}", ui::style_text(identity.as_str(), ui::StyleType::Title));
    println!("{}", describe_outcome(&outcome));
    Ok(())
}

pub fn logout(wallet: &Wallet) -> Result<()> {
    let previous = wallet.identity();
    wallet.logout();
    match previous {
        Some(id) => println!("Logged out {id}"),
        None => println!("{}", ui::style_text("No active session", ui::StyleType::Subtle)),
    }
    Ok(())
}

pub async fn status(wallet: &Wallet) -> Result<()> {
    let Some(id) = wallet.identity() else {
        println!("{}", ui::style_text("Not logged in", ui::StyleType::Subtle));
        return Ok(());
    };

    wallet.guard().refresh().await?;
    println!("Logged in as {}", ui::style_text(id.as_str(), ui::StyleType::Title));
    match wallet.ledger().load_status() {
        LoadStatus::Failed(reason) => println!(
            "{}",
            ui::style_text(&format!("Ledger unavailable: {reason}"), ui::StyleType::Error)
        ),
        _ => println!("{} transaction(s) on record", wallet.ledger().len()),
    }
    Ok(())
}

pub(crate) fn describe_outcome(outcome: &LoadOutcome) -> String {
    match outcome {
        LoadOutcome::Loaded(records) => format!("Loaded {} transaction(s)", records.len()),
        LoadOutcome::Empty => "No transactions recorded yet".to_string(),
        LoadOutcome::Failed(reason) => {
            ui::style_text(&format!("Could not load transactions: {reason}"), ui::StyleType::Error)
        }
        LoadOutcome::Superseded => "Session changed while loading".to_string(),
    }
}
