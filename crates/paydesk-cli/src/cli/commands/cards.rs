//! `paydesk cards` - card administration for bank admins.

use dialoguer::{theme::ColorfulTheme, Confirm};
use paydesk_core::validator::{mask_card_number, CardDraft};
use paydesk_core::{BankCard, PaydeskError, Role, CURRENCY};

use super::console::{Console, GlobalOpts};
use super::{finish, print_json};
use crate::cli::args::{CardDraftArgs, CardsSub};
use crate::exit_codes::SUCCESS;

pub async fn cmd_cards(opts: &GlobalOpts, cmd: CardsSub) -> i32 {
    finish(run(opts, cmd).await)
}

async fn run(opts: &GlobalOpts, cmd: CardsSub) -> anyhow::Result<i32> {
    let mut console = Console::open(opts)?;
    let client = console.client(Some(Role::BankAdmin))?;

    match cmd {
        CardsSub::List { json } => {
            let cards = console.settle(client.list_cards().await)?;
            if json {
                print_json(&cards)?;
            } else if cards.is_empty() {
                println!("no cards");
            } else {
                for card in &cards {
                    println!("{}", card_row(card));
                }
            }
        }
        CardsSub::Create(args) => {
            let draft = draft_from(args)?;
            console.settle(client.create_card(&draft).await)?;
            println!("created card {}", mask_card_number(&draft.card_number));
        }
        CardsSub::Update(args) => {
            let draft = draft_from(args)?;
            console.settle(client.update_card(&draft).await)?;
            println!("updated card {}", mask_card_number(&draft.card_number));
        }
        CardsSub::Delete { number, yes } => {
            if !yes {
                let confirmed = Confirm::with_theme(&ColorfulTheme::default())
                    .with_prompt(format!("Delete card {}?", mask_card_number(&number)))
                    .default(false)
                    .interact()
                    .unwrap_or(false);
                if !confirmed {
                    println!("cancelled");
                    return Ok(SUCCESS);
                }
            }
            console.settle(client.delete_card(&number).await)?;
            println!("deleted card {}", mask_card_number(&number));
        }
    }
    Ok(SUCCESS)
}

/// Build a draft, refusing it locally when it cannot be saved.
fn draft_from(args: CardDraftArgs) -> Result<CardDraft, PaydeskError> {
    let draft = CardDraft {
        card_number: args.number,
        expiration: args.expiry,
        cvv: args.cvv,
        balance: args.balance,
        active: !args.inactive,
    };
    let fields = draft.invalid_fields();
    if fields.is_empty() {
        Ok(draft)
    } else {
        Err(PaydeskError::Validation { fields })
    }
}

fn card_row(card: &BankCard) -> String {
    let balance = format!("{:.2} {}", card.balance, CURRENCY);
    format!(
        "{:<24} {:<8} {:>14} {}",
        mask_card_number(&card.card_number),
        card.expiration,
        balance,
        if card.active { "active" } else { "inactive" },
    )
}
