use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use coinfolio::core::log::init_logging;
use coinfolio::core::{Identity, Side};
use rust_decimal::Decimal;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Start a session and load its transactions
    Login {
        /// User identifier
        id: Identity,
    },
    /// End the current session
    Logout,
    /// Show the current session
    Status,
    /// Display current crypto prices
    Quotes,
    /// Record a purchase
    Buy(TradeArgs),
    /// Record a sale
    Sell(TradeArgs),
    /// Display recorded transactions
    History,
    /// Display holdings valued at current prices
    Analysis,
}

#[derive(clap::Args)]
struct TradeArgs {
    /// Asset ticker (btc, eth, ltc)
    asset: String,
    /// Amount of the asset
    quantity: Decimal,
    /// Execution price in USD; defaults to the live quote
    #[arg(short, long)]
    price: Option<Decimal>,
}

impl TradeArgs {
    fn into_command(self, side: Side) -> coinfolio::AppCommand {
        coinfolio::AppCommand::Trade {
            side,
            asset: self.asset,
            quantity: self.quantity,
            price: self.price,
        }
    }
}

impl Commands {
    /// Library command for everything that needs a wallet.
    fn into_app_command(self) -> Option<coinfolio::AppCommand> {
        use coinfolio::AppCommand;
        match self {
            Commands::Setup => None,
            Commands::Login { id } => Some(AppCommand::Login(id)),
            Commands::Logout => Some(AppCommand::Logout),
            Commands::Status => Some(AppCommand::Status),
            Commands::Quotes => Some(AppCommand::Quotes),
            Commands::Buy(args) => Some(args.into_command(Side::Buy)),
            Commands::Sell(args) => Some(args.into_command(Side::Sell)),
            Commands::History => Some(AppCommand::History),
            Commands::Analysis => Some(AppCommand::Analysis),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => coinfolio::cli::setup::setup(),
        Some(cmd) => match cmd.into_app_command() {
            Some(command) => coinfolio::run_command(command, cli.config_path.as_deref()).await,
            None => Ok(()),
        },
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
