//! `paydesk login|logout|whoami|route` - session management.

use anyhow::Context;
use dialoguer::Password;
use paydesk_core::guard::LOGIN_PATH;
use paydesk_core::{guard_route, GuardDecision, RedirectReason, Route};
use serde_json::json;

use super::console::{Console, GlobalOpts};
use super::{finish, print_json};
use crate::cli::args::{LoginArgs, RouteArgs, WhoamiArgs};
use crate::exit_codes::{AUTH_ERROR, GENERAL_ERROR, SUCCESS};

pub async fn cmd_login(opts: &GlobalOpts, args: LoginArgs) -> i32 {
    finish(run_login(opts, args).await)
}

async fn run_login(opts: &GlobalOpts, args: LoginArgs) -> anyhow::Result<i32> {
    let mut console = Console::open(opts)?;

    let password = match args.password {
        Some(password) => password,
        None => Password::new()
            .with_prompt("Password")
            .interact()
            .context("failed to read password")?,
    };

    let client = console.anonymous_client()?;
    let response = client
        .login(&args.username, &password)
        .await
        .context("login failed")?;
    let claim = console
        .session
        .login_with(&response)
        .context("login rejected")?;

    println!("logged in as {} ({})", args.username, claim.role);
    println!("home: {}", Route::home(claim.role));
    Ok(SUCCESS)
}

pub fn cmd_logout(opts: &GlobalOpts) -> i32 {
    finish(run_logout(opts))
}

fn run_logout(opts: &GlobalOpts) -> anyhow::Result<i32> {
    let mut console = Console::open(opts)?;
    console.session.logout().context("failed to clear credential")?;
    println!("logged out");
    Ok(SUCCESS)
}

pub fn cmd_whoami(opts: &GlobalOpts, args: WhoamiArgs) -> i32 {
    finish(run_whoami(opts, args))
}

fn run_whoami(opts: &GlobalOpts, args: WhoamiArgs) -> anyhow::Result<i32> {
    let console = Console::open(opts)?;
    let Some(claim) = console.session.claim() else {
        if args.json {
            print_json(&json!({ "authenticated": false }))?;
        } else {
            println!("not logged in");
        }
        return Ok(AUTH_ERROR);
    };

    if args.json {
        print_json(&json!({ "authenticated": true, "claim": claim }))?;
        return Ok(SUCCESS);
    }

    println!("role:    {}", claim.role);
    if let Some(subject) = &claim.subject {
        println!("subject: {}", subject);
    }
    if let Some(user_id) = claim.user_id {
        println!("user id: {}", user_id);
    }
    if let Some(expires_at) = claim.expires_at {
        println!("expires: {}", expires_at.to_rfc3339());
    }
    println!("home:    {}", Route::home(claim.role));
    Ok(SUCCESS)
}

pub fn cmd_route(opts: &GlobalOpts, args: RouteArgs) -> i32 {
    finish(run_route(opts, args))
}

fn run_route(opts: &GlobalOpts, args: RouteArgs) -> anyhow::Result<i32> {
    let route =
        Route::parse(&args.path).with_context(|| format!("unknown route: {}", args.path))?;
    let console = Console::open(opts)?;
    let decision = guard_route(console.session.state(), &route);

    if args.json {
        print_json(&json!({ "route": route.path(), "result": decision }))?;
    } else {
        match &decision {
            GuardDecision::Allow => println!("allow {}", route),
            GuardDecision::Pending => println!("pending {}", route),
            GuardDecision::RedirectToLogin { reason, .. } => {
                println!("redirect {} ({})", LOGIN_PATH, describe(reason));
            }
        }
    }

    Ok(match decision {
        GuardDecision::Allow => SUCCESS,
        GuardDecision::RedirectToLogin { .. } => AUTH_ERROR,
        GuardDecision::Pending => GENERAL_ERROR,
    })
}

fn describe(reason: &RedirectReason) -> String {
    match reason {
        RedirectReason::NotAuthenticated => "not logged in".to_string(),
        RedirectReason::RoleMismatch { required, actual } => {
            format!("requires {required}, logged in as {actual}")
        }
    }
}

