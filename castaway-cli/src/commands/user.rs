use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use castaway_db::{Entity, OperationError};

use crate::CliError;

use super::{Context, print_json};

pub(crate) fn run_user_add(ctx: &Context, account: i64, label: &str) -> Result<(), CliError> {
    let conn = ctx.open()?;
    let changed = castaway_db::add_user(&conn, account, label)?;
    if changed {
        log::info!(
            "{} Saved user {} as '{}'",
            "\u{2714}".if_supports_color(Stdout, |t| t.green()),
            account,
            label,
        );
    } else {
        log::info!("User {} is already up to date", account);
    }
    Ok(())
}

pub(crate) fn run_user_show(ctx: &Context, account: i64) -> Result<(), CliError> {
    let conn = ctx.open()?;
    let user = castaway_db::find_user(&conn, account)?
        .ok_or_else(|| OperationError::not_found(Entity::User, format!("account {account}")))?;

    if ctx.json {
        return print_json(&user);
    }
    log::info!(
        "{} {}",
        "Account:".if_supports_color(Stdout, |t| t.cyan()),
        user.account_id,
    );
    log::info!(
        "{} {}",
        "Label:".if_supports_color(Stdout, |t| t.cyan()),
        user.label.as_deref().unwrap_or("-"),
    );
    Ok(())
}
