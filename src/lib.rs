pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::core::config::AppConfig;
use crate::core::{Identity, Side, Wallet};
use anyhow::Result;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    Login(Identity),
    Logout,
    Status,
    Quotes,
    Trade {
        side: Side,
        asset: String,
        quantity: Decimal,
        price: Option<Decimal>,
    },
    History,
    Analysis,
}

/// Wires the wallet to the services named in `config`.
pub fn build_wallet(config: &AppConfig) -> Result<Wallet> {
    let timeout = config.request_timeout();
    let restdb = config.restdb()?;

    let storage = store::open_session_store(config);
    let ledger = providers::restdb::RestDbLedger::new(&restdb.url, &restdb.api_key, timeout)?;
    let quotes =
        providers::coingecko::CoinGeckoProvider::new(&config.providers.coingecko.base_url, timeout)?;

    Ok(Wallet::new(storage, Arc::new(ledger), Arc::new(quotes)))
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("coinfolio starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let wallet = build_wallet(&config)?;
    execute(&wallet, command).await
}

/// Runs one command against an already constructed wallet.
pub async fn execute(wallet: &Wallet, command: AppCommand) -> Result<()> {
    match command {
        AppCommand::Login(identity) => cli::session::login(wallet, identity).await,
        AppCommand::Logout => cli::session::logout(wallet),
        AppCommand::Status => cli::session::status(wallet).await,
        AppCommand::Quotes => cli::quotes::run(wallet).await,
        AppCommand::Trade {
            side,
            asset,
            quantity,
            price,
        } => cli::trade::run(wallet, side, &asset, quantity, price).await,
        AppCommand::History => cli::history::run(wallet).await,
        AppCommand::Analysis => cli::analysis::run(wallet).await,
    }
}
