//! `paydesk transactions|payments|mobile-token`.

use paydesk_core::dashboard::status_title;
use paydesk_core::validator::mask_card_number;
use paydesk_core::{PaymentEntity, Role, TransactionEntity, CURRENCY};

use super::console::{Console, GlobalOpts};
use super::{finish, print_json};
use crate::cli::args::{MobileTokenSub, PaymentsSub, TransactionsSub};
use crate::exit_codes::SUCCESS;

pub async fn cmd_transactions(opts: &GlobalOpts, cmd: TransactionsSub) -> i32 {
    finish(run_transactions(opts, cmd).await)
}

async fn run_transactions(opts: &GlobalOpts, cmd: TransactionsSub) -> anyhow::Result<i32> {
    let mut console = Console::open(opts)?;
    let client = console.client(None)?;

    match cmd {
        TransactionsSub::List { json } => {
            let transactions = console.settle(client.list_transactions().await)?;
            if json {
                print_json(&transactions)?;
            } else if transactions.is_empty() {
                println!("no transactions");
            } else {
                println!(
                    "{:<10} {:>14} {:<10} {:<22} DATE",
                    "ID", "AMOUNT", "STATUS", "CARD"
                );
                for tx in &transactions {
                    println!("{}", transaction_row(tx));
                }
            }
        }
        TransactionsSub::Show { id, json } => {
            let tx = console.settle(client.get_transaction(&id).await)?;
            if json {
                print_json(&tx)?;
            } else {
                print_transaction(&tx);
            }
        }
    }
    Ok(SUCCESS)
}

fn amount(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.2} {}", v, CURRENCY))
}

fn transaction_row(tx: &TransactionEntity) -> String {
    format!(
        "{:<10} {:>14} {:<10} {:<22} {}",
        tx.id.as_deref().unwrap_or("-"),
        amount(tx.montant),
        tx.outcome(),
        tx.card_number.as_deref().map(mask_card_number).unwrap_or_default(),
        tx.timestamp(),
    )
}

fn print_transaction(tx: &TransactionEntity) {
    println!("id:       {}", tx.id.as_deref().unwrap_or("-"));
    println!("amount:   {}", amount(tx.montant));
    println!("status:   {}", tx.outcome());
    if let Some(card) = &tx.card_number {
        println!("card:     {}", mask_card_number(card));
    }
    if let Some(expiration) = &tx.expiration {
        println!("expires:  {}", expiration);
    }
    if let Some(code) = &tx.bank_code {
        println!("bank:     {} {}", code, tx.bank_message.as_deref().unwrap_or(""));
    }
    println!("date:     {}", tx.timestamp());
}

pub async fn cmd_payments(opts: &GlobalOpts, cmd: PaymentsSub) -> i32 {
    finish(run_payments(opts, cmd).await)
}

async fn run_payments(opts: &GlobalOpts, cmd: PaymentsSub) -> anyhow::Result<i32> {
    let mut console = Console::open(opts)?;
    let client = console.client(None)?;

    match cmd {
        PaymentsSub::List { json } => {
            let payments = console.settle(client.list_payments().await)?;
            if json {
                print_json(&payments)?;
            } else if payments.is_empty() {
                println!("no payments");
            } else {
                for payment in &payments {
                    println!("{}", payment_row(payment));
                }
            }
        }
    }
    Ok(SUCCESS)
}

pub(crate) fn payment_row(payment: &PaymentEntity) -> String {
    let card = match (&payment.card_brand, &payment.card_last4) {
        (Some(brand), Some(last4)) => format!("{} •••• {}", brand, last4),
        (None, Some(last4)) => format!("•••• {}", last4),
        _ => String::new(),
    };
    format!(
        "{:<10} {:>14} {:<10} {:<22} {}",
        payment.id.as_deref().unwrap_or("-"),
        amount(payment.montant),
        status_title(payment.status.as_deref()),
        card,
        payment.timestamp(),
    )
}

pub async fn cmd_mobile_token(opts: &GlobalOpts, cmd: MobileTokenSub) -> i32 {
    finish(run_mobile_token(opts, cmd).await)
}

async fn run_mobile_token(opts: &GlobalOpts, cmd: MobileTokenSub) -> anyhow::Result<i32> {
    let mut console = Console::open(opts)?;
    let client = console.client(Some(Role::Merchant))?;

    match cmd {
        MobileTokenSub::Generate { ttl_days } => {
            let token = console.settle(client.generate_mobile_token(ttl_days).await)?;
            println!("{}", token.token);
        }
        MobileTokenSub::Revoke { id } => {
            console.settle(client.revoke_mobile_token(id).await)?;
            println!("revoked token {}", id);
        }
    }
    Ok(SUCCESS)
}
