//! `paydesk dashboard` - admin overview.

use paydesk_core::dashboard::{fetch_dashboard, status_title};
use paydesk_core::validator::mask_card_number;
use paydesk_core::{PaydeskError, Role};
use tracing::warn;

use super::console::{Console, GlobalOpts};
use super::records::payment_row;
use super::{finish, print_json};
use crate::cli::args::DashboardArgs;
use crate::exit_codes::SUCCESS;

pub async fn cmd_dashboard(opts: &GlobalOpts, args: DashboardArgs) -> i32 {
    finish(run(opts, args).await)
}

async fn run(opts: &GlobalOpts, args: DashboardArgs) -> anyhow::Result<i32> {
    let mut console = Console::open(opts)?;
    let client = console.client(Some(Role::BankAdmin))?;

    let data = fetch_dashboard(&client).await;
    if data.credential_rejected {
        console.settle::<()>(Err(PaydeskError::Unauthorized {
            message: "credential rejected by every dashboard source".into(),
        }))?;
    }
    for source in &data.failed_sources {
        warn!(source = %source, "showing empty list");
    }
    let summary = data.summary();

    if args.json {
        print_json(&serde_json::json!({
            "summary": summary,
            "failed_sources": data.failed_sources,
        }))?;
        return Ok(SUCCESS);
    }

    println!("transactions: {}", summary.transaction_count);
    println!("payments:     {}", summary.payment_count);
    println!("cards:        {}", summary.card_count);
    if let Some(rate) = summary.peak_rate_percent {
        println!("peak day:     {}% of transactions", rate);
    }

    if !summary.daily_volume.is_empty() {
        println!("\nvolume by day");
        for day in &summary.daily_volume {
            println!("  {}  {}", day.day, day.count);
        }
    }

    if !summary.recent_transactions.is_empty() {
        println!("\nrecent transactions");
        for tx in &summary.recent_transactions {
            println!(
                "  {:<10} {:<10} {}",
                tx.id.as_deref().unwrap_or("-"),
                status_title(tx.status.as_deref()),
                tx.timestamp()
            );
        }
    }

    if !summary.recent_payments.is_empty() {
        println!("\nrecent payments");
        for payment in &summary.recent_payments {
            println!("  {}", payment_row(payment));
        }
    }

    if !summary.recent_cards.is_empty() {
        println!("\nrecent cards");
        for card in &summary.recent_cards {
            println!("  {}  {}", mask_card_number(&card.card_number), card.expiration);
        }
    }

    Ok(SUCCESS)
}
