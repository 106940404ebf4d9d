//! `paydesk card check` - offline card validation.

use paydesk_core::validator::{current_year_month, format_card_number, CardBrand};
use paydesk_core::PaymentForm;
use serde::Serialize;

use super::{finish, print_json, verdict};
use crate::cli::args::{CardArgs, CardCheckArgs, CardSub};
use crate::exit_codes::{SUCCESS, VALIDATION_FAILED};

#[derive(Debug, Serialize)]
struct CardReport {
    number: String,
    brand: CardBrand,
    luhn_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    expiry_valid: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cvv_valid: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    amount_valid: Option<bool>,
    /// Set only when every payment field was given.
    #[serde(skip_serializing_if = "Option::is_none")]
    can_submit: Option<bool>,
}

impl CardReport {
    fn all_valid(&self) -> bool {
        self.luhn_valid
            && [self.expiry_valid, self.cvv_valid, self.amount_valid]
                .into_iter()
                .all(|field| field.unwrap_or(true))
    }
}

pub fn cmd_card(args: CardArgs) -> i32 {
    match args.cmd {
        CardSub::Check(args) => finish(run_check(args)),
    }
}

fn run_check(args: CardCheckArgs) -> anyhow::Result<i32> {
    let reference = args.reference.clone().unwrap_or_else(current_year_month);
    let report = check(&args, &reference);

    if args.json {
        print_json(&report)?;
    } else {
        println!("card:    {}", report.number);
        println!("brand:   {}", report.brand);
        println!("luhn:    {}", verdict(report.luhn_valid));
        if let Some(ok) = report.expiry_valid {
            println!("expiry:  {} (reference {})", verdict(ok), reference);
        }
        if let Some(ok) = report.cvv_valid {
            println!("cvv:     {}", verdict(ok));
        }
        if let Some(ok) = report.amount_valid {
            println!("amount:  {}", verdict(ok));
        }
        if let Some(ok) = report.can_submit {
            println!("payment: {}", if ok { "ready" } else { "blocked" });
        }
    }

    Ok(if report.all_valid() {
        SUCCESS
    } else {
        VALIDATION_FAILED
    })
}

fn check(args: &CardCheckArgs, reference: &str) -> CardReport {
    let form = PaymentForm::new(
        args.amount.clone().unwrap_or_default(),
        args.number.clone(),
        args.expiry.clone().unwrap_or_default(),
        args.cvv.clone().unwrap_or_default(),
    );
    let result = form.check(reference);
    let complete = args.amount.is_some() && args.expiry.is_some() && args.cvv.is_some();

    CardReport {
        number: format_card_number(&args.number),
        brand: result.brand,
        luhn_valid: result.card_valid,
        expiry_valid: args.expiry.as_ref().map(|_| result.expiry_valid),
        cvv_valid: args.cvv.as_ref().map(|_| result.cvv_valid),
        amount_valid: args.amount.as_ref().map(|_| result.amount_valid),
        can_submit: complete.then(|| result.can_submit()),
    }
}
