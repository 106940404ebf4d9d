use super::args::*;

pub mod card;
pub mod cards;
pub(crate) mod console;
pub mod dashboard;
pub mod pay;
pub mod records;
pub mod session;

use paydesk_core::PaydeskError;
use serde::Serialize;
use tracing::debug;

use crate::exit_codes::{GENERAL_ERROR, SUCCESS};
use console::GlobalOpts;

pub async fn dispatch(cli: Cli) -> i32 {
    let opts = GlobalOpts {
        config: cli.config,
        credentials: cli.credentials,
    };

    match cli.cmd {
        Command::Card(args) => card::cmd_card(args),
        Command::Login(args) => session::cmd_login(&opts, args).await,
        Command::Logout => session::cmd_logout(&opts),
        Command::Whoami(args) => session::cmd_whoami(&opts, args),
        Command::Route(args) => session::cmd_route(&opts, args),
        Command::Pay(args) => pay::cmd_pay(&opts, args).await,
        Command::Transactions(args) => records::cmd_transactions(&opts, args.cmd).await,
        Command::Payments(args) => records::cmd_payments(&opts, args.cmd).await,
        Command::Cards(args) => cards::cmd_cards(&opts, args.cmd).await,
        Command::MobileToken(args) => records::cmd_mobile_token(&opts, args.cmd).await,
        Command::Dashboard(args) => dashboard::cmd_dashboard(&opts, args).await,
        Command::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            SUCCESS
        }
    }
}

/// Report a command result and turn it into an exit code.
pub(crate) fn finish(result: anyhow::Result<i32>) -> i32 {
    match result {
        Ok(code) => code,
        Err(e) => {
            let core = e.chain().find_map(|c| c.downcast_ref::<PaydeskError>());
            match core {
                Some(err) if matches!(err, PaydeskError::Network { .. }) => {
                    debug!("{e:#}");
                    eprintln!("error: {}", err.user_message());
                }
                _ => eprintln!("error: {e:#}"),
            }
            core.map_or(GENERAL_ERROR, PaydeskError::exit_code)
        }
    }
}

pub(crate) fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub(crate) fn verdict(ok: bool) -> &'static str {
    if ok {
        "valid"
    } else {
        "invalid"
    }
}
