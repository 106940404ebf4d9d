use clap::{Args, Subcommand};

#[derive(Args, Debug)]
pub struct CardArgs {
    #[command(subcommand)]
    pub cmd: CardSub,
}

#[derive(Subcommand, Debug)]
pub enum CardSub {
    /// Validate a card number and, optionally, expiry, CVV and amount
    Check(CardCheckArgs),
}

#[derive(Args, Debug)]
pub struct CardCheckArgs {
    /// Card number; spaces and dashes are ignored
    pub number: String,

    /// Expiration, YYYY-MM
    #[arg(long)]
    pub expiry: Option<String>,

    #[arg(long)]
    pub cvv: Option<String>,

    #[arg(long, allow_negative_numbers = true)]
    pub amount: Option<String>,

    /// Month expiry is compared against (default: current month)
    #[arg(long, value_name = "YYYY-MM")]
    pub reference: Option<String>,

    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct CardsArgs {
    #[command(subcommand)]
    pub cmd: CardsSub,
}

#[derive(Subcommand, Debug)]
pub enum CardsSub {
    /// List every card held by the bank
    List {
        #[arg(long)]
        json: bool,
    },
    /// Create a card
    Create(CardDraftArgs),
    /// Update a card's expiry, CVV, balance and status
    Update(CardDraftArgs),
    /// Delete a card
    Delete {
        number: String,

        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
}

#[derive(Args, Debug)]
pub struct CardDraftArgs {
    /// Card number; spaces and dashes are ignored
    pub number: String,

    /// Expiration, YYYY-MM
    #[arg(long)]
    pub expiry: String,

    #[arg(long)]
    pub cvv: String,

    #[arg(long)]
    pub balance: String,

    /// Mark the card inactive
    #[arg(long)]
    pub inactive: bool,
}
