//! `paydesk pay` - validated payment submission.

use anyhow::Context;
use dialoguer::{theme::ColorfulTheme, Confirm};
use paydesk_core::validator::current_year_month;
use paydesk_core::{PaydeskError, PaymentForm, PaymentOutcome, Role, CURRENCY};

use super::console::{Console, GlobalOpts};
use super::finish;
use crate::cli::args::PayArgs;
use crate::exit_codes::{PAYMENT_DECLINED, SUCCESS};

pub async fn cmd_pay(opts: &GlobalOpts, args: PayArgs) -> i32 {
    finish(run(opts, args).await)
}

async fn run(opts: &GlobalOpts, args: PayArgs) -> anyhow::Result<i32> {
    let mut console = Console::open(opts)?;
    let client = console.client(Some(Role::Merchant))?;

    let form = PaymentForm::new(args.amount, args.card, args.expiry, args.cvv);
    let reference = current_year_month();
    let check = form.check(&reference);
    if !check.can_submit() {
        return Err(PaydeskError::Validation {
            fields: check.invalid_fields(),
        })
        .context("payment not submitted");
    }

    let summary = form.summary();
    println!("card:    {} ({})", form.display_card_number(), check.brand);
    println!("expires: {}", form.display_expiration());
    println!("net:     {:.2} {}", summary.net, CURRENCY);
    println!("VAT:     {:.2} {}", summary.vat, CURRENCY);
    println!("total:   {:.2} {}", summary.total, CURRENCY);

    if !args.yes {
        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt("Submit this payment?")
            .default(false)
            .interact()
            .unwrap_or(false);
        if !confirmed {
            println!("cancelled");
            return Ok(SUCCESS);
        }
    }

    let outcome = console.settle(client.submit_payment(&form, &reference).await)?;
    match outcome {
        PaymentOutcome::Approved { reference } => {
            println!("payment approved, reference {}", reference);
            Ok(SUCCESS)
        }
        PaymentOutcome::Declined { message, code } => {
            println!("payment declined ({}): {}", code, message);
            Ok(PAYMENT_DECLINED)
        }
    }
}
