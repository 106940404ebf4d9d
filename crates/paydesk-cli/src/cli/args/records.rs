use clap::{Args, Subcommand};

#[derive(Args, Debug)]
pub struct PayArgs {
    /// Amount in MAD, VAT included
    #[arg(long, allow_negative_numbers = true)]
    pub amount: String,

    #[arg(long)]
    pub card: String,

    /// Expiration, YYYY-MM
    #[arg(long)]
    pub expiry: String,

    #[arg(long)]
    pub cvv: String,

    /// Submit without the confirmation prompt
    #[arg(long, short)]
    pub yes: bool,
}

#[derive(Args, Debug)]
pub struct TransactionsArgs {
    #[command(subcommand)]
    pub cmd: TransactionsSub,
}

#[derive(Subcommand, Debug)]
pub enum TransactionsSub {
    List {
        #[arg(long)]
        json: bool,
    },
    /// Details of one transaction
    Show {
        id: String,

        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug)]
pub struct PaymentsArgs {
    #[command(subcommand)]
    pub cmd: PaymentsSub,
}

#[derive(Subcommand, Debug)]
pub enum PaymentsSub {
    List {
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug)]
pub struct MobileTokenArgs {
    #[command(subcommand)]
    pub cmd: MobileTokenSub,
}

#[derive(Subcommand, Debug)]
pub enum MobileTokenSub {
    /// Issue a new token
    Generate {
        /// Validity in days (server default when omitted)
        #[arg(long)]
        ttl_days: Option<u32>,
    },
    /// Revoke a token by id
    Revoke { id: i64 },
}

#[derive(Args, Debug)]
pub struct DashboardArgs {
    #[arg(long)]
    pub json: bool,
}
