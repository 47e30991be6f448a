use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use castaway_db::{NewTribe, PlayerFilter, PlayerKey, Scope, TribeEdit, TribeFilter, find_tribe};

use crate::CliError;
use crate::cli_types::{SeasonArgs, TribeSelector};

use super::{Context, check_color, check_iteration, parse_tribe, print_json, server_id};

pub(crate) fn run_tribe_add(
    ctx: &Context,
    tribe: &str,
    season: SeasonArgs,
    color: &str,
    precedence: i64,
) -> Result<(), CliError> {
    let name = parse_tribe(tribe)?;
    let color = check_color(color)?;

    let conn = ctx.open()?;
    let server = server_id(&conn, season)?;
    let new = NewTribe::new(name.name, server)
        .iteration(name.iteration)
        .color(color)
        .precedence(precedence);
    let created = castaway_db::add_tribe(&conn, &new)?;

    if ctx.json {
        return print_json(&created);
    }
    log::info!(
        "{} Created tribe {}",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        created.display_name().if_supports_color(Stdout, |t| t.bold()),
    );
    Ok(())
}

pub(crate) fn run_tribe_list(
    ctx: &Context,
    season: SeasonArgs,
    select: &TribeSelector,
    player: Option<String>,
    order: Option<i64>,
) -> Result<(), CliError> {
    let filter = select.filter(player.map(PlayerKey::DisplayName), order)?;

    let conn = ctx.open()?;
    let scope = Scope::Server(server_id(&conn, season)?);
    let tribes = find_tribe(&conn, scope, &filter)?;

    if ctx.json {
        return print_json(&tribes);
    }
    if tribes.is_empty() {
        log::info!("No tribes found.");
        return Ok(());
    }

    log::info!(
        "{}",
        format!("{:>6}  {:<24} {:>10} {:>8} {:>8}", "ID", "Tribe", "Precedence", "Colour", "Players")
            .if_supports_color(Stdout, |t| t.bold()),
    );
    for tribe in &tribes {
        let members = castaway_db::find_player(&conn, scope, &PlayerFilter::Tribe(tribe.id))?;
        log::info!(
            "{:>6}  {:<24} {:>10} {:>8} {:>8}",
            tribe.id,
            tribe.display_name(),
            tribe.precedence,
            format!("#{}", tribe.color),
            members.len(),
        );
    }
    Ok(())
}

pub(crate) fn run_tribe_edit(
    ctx: &Context,
    select: &TribeSelector,
    season: SeasonArgs,
    rename: Option<String>,
    iteration: Option<i64>,
    color: Option<String>,
    precedence: Option<i64>,
) -> Result<(), CliError> {
    let key = select.require_key()?;
    let edit = TribeEdit {
        name: rename,
        iteration: iteration.map(check_iteration).transpose()?,
        color: color.as_deref().map(check_color).transpose()?,
        precedence,
    };

    let conn = ctx.open()?;
    let scope = Scope::Server(server_id(&conn, season)?);
    let report = castaway_db::edit_tribe(&conn, scope, key.clone().into(), &edit)?;

    if report.rename_rejected {
        log::warn!(
            "{} That name and iteration are taken or would not read back as this tribe; the name was kept",
            "\u{26A0}".if_supports_color(Stdout, |t| t.yellow()),
        );
    }
    if report.changed {
        log::info!(
            "{} Updated {}",
            "\u{2714}".if_supports_color(Stdout, |t| t.green()),
            key,
        );
    } else {
        log::info!("Nothing to change for {}", key);
    }
    Ok(())
}

pub(crate) fn run_tribe_delete(
    ctx: &Context,
    select: &TribeSelector,
    season: SeasonArgs,
) -> Result<(), CliError> {
    let key = select.require_key()?;

    let conn = ctx.open()?;
    let scope = Scope::Server(server_id(&conn, season)?);
    let members = match find_tribe(&conn, scope, &TribeFilter::Key(key.clone()))?.first() {
        Some(tribe) => castaway_db::find_player(&conn, scope, &PlayerFilter::Tribe(tribe.id))?.len(),
        None => 0,
    };

    castaway_db::delete_tribe(&conn, scope, key.clone().into())?;
    log::info!(
        "{} Deleted {} ({} players left without a tribe)",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        key,
        members,
    );
    Ok(())
}
