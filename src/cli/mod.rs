pub mod analysis;
pub mod history;
pub mod quotes;
pub mod session;
pub mod setup;
pub mod trade;
pub mod ui;

use crate::core::navigation::NavigationAttempt;
use crate::core::{LoadOutcome, View, Wallet};
use anyhow::{Context, Result, bail};

/// Enters `view` through the navigation guard and waits for the ledger refresh
/// the attempt dispatched.
pub(crate) async fn enter(wallet: &Wallet, view: View) -> Result<LoadOutcome> {
    settle(view, wallet.guard().navigate(view)).await
}

/// Waits for the refresh of `attempt`; fails if the guard redirected away from `view`.
pub(crate) async fn settle(view: View, attempt: NavigationAttempt) -> Result<LoadOutcome> {
    let spinner = ui::new_spinner("Loading transactions...");
    let outcome = attempt.refresh.await.context("Ledger refresh task failed");
    spinner.finish_and_clear();

    if !attempt.decision.is_allowed() {
        bail!("{} requires a session. Run `coinfolio login <ID>` first.", view);
    }
    let outcome = outcome?;
    if let LoadOutcome::Failed(reason) = &outcome {
        eprintln!(
            "{}",
            ui::style_text(
                &format!("Could not load transactions: {reason}"),
                ui::StyleType::Error
            )
        );
    }
    Ok(outcome)
}
