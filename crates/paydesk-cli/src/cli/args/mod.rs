use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

pub mod card;
pub mod records;
pub use card::*;
pub use records::*;

#[derive(Parser)]
#[command(
    name = "paydesk",
    version,
    about = "Merchant and bank-admin console for the paydesk payment platform"
)]
pub struct Cli {
    /// YAML configuration file (environment variables still take precedence)
    #[arg(long, global = true, env = "PAYDESK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Credential file, overriding the configured location
    #[arg(long, global = true)]
    pub credentials: Option<PathBuf>,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Offline card checks (Luhn, brand, expiry, CVV)
    Card(CardArgs),
    /// Log in and store the credential
    Login(LoginArgs),
    /// Forget the stored credential
    Logout,
    /// Show the current session
    Whoami(WhoamiArgs),
    /// Guard decision for a console route, e.g. /admin/cards
    Route(RouteArgs),
    /// Submit a payment (merchant)
    Pay(PayArgs),
    /// Transaction history
    Transactions(TransactionsArgs),
    /// Payment records
    Payments(PaymentsArgs),
    /// Card administration (bank admin)
    Cards(CardsArgs),
    /// Mobile payment tokens (merchant)
    MobileToken(MobileTokenArgs),
    /// Admin overview of transactions, payments and cards
    Dashboard(DashboardArgs),
    Version,
}

#[derive(Args, Debug)]
pub struct LoginArgs {
    #[arg(long, short)]
    pub username: String,

    /// Prompted for when omitted
    #[arg(long, env = "PAYDESK_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

#[derive(Args, Debug)]
pub struct WhoamiArgs {
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct RouteArgs {
    /// Route path, e.g. /merchant/dashboard
    pub path: String,

    #[arg(long)]
    pub json: bool,
}
