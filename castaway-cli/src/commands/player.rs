use std::collections::HashMap;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use castaway_catalog::{Player, Tribe, is_forward_swap};
use castaway_db::{
    Connection, NewPlayer, PlayerEdit, PlayerFilter, PlayerRef, Scope, TribeAssignment,
    TribeFilter, TribeKey, TribeRef, find_player, find_tribe,
};

use crate::CliError;
use crate::cli_types::{PlayerSelector, SeasonArgs};

use super::{Context, parse_tribe, print_json, server_id};

pub(crate) fn run_player_add(
    ctx: &Context,
    display_name: &str,
    account: i64,
    season: SeasonArgs,
    tribe: Option<&str>,
) -> Result<(), CliError> {
    let tribe = tribe.map(parse_tribe).transpose()?;

    let conn = ctx.open()?;
    let server = server_id(&conn, season)?;
    let mut new = NewPlayer::new(display_name, account, server);
    if let Some(tribe) = tribe {
        new = new.tribe(tribe.name, tribe.iteration);
    }
    let player = castaway_db::add_player(&conn, &new)?;

    if ctx.json {
        return print_json(&player);
    }
    let tribe = tribe_of(&conn, Scope::Season(player.season_id), &player)?;
    log::info!(
        "{} Added {} ({})",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        player.display_name.if_supports_color(Stdout, |t| t.bold()),
        tribe.map_or_else(|| "no tribe".to_string(), |t| t.display_name()),
    );
    Ok(())
}

pub(crate) fn run_player_list(
    ctx: &Context,
    season: SeasonArgs,
    select: &PlayerSelector,
    tribe: Option<i64>,
) -> Result<(), CliError> {
    let conn = ctx.open()?;
    let scope = Scope::Server(server_id(&conn, season)?);
    let players = find_player(&conn, scope, &select.filter(tribe))?;

    if ctx.json {
        return print_json(&players);
    }
    if players.is_empty() {
        log::info!("No players found.");
        return Ok(());
    }

    let tribes: HashMap<i64, Tribe> = find_tribe(&conn, scope, &TribeFilter::All)?
        .into_iter()
        .map(|t| (t.id, t))
        .collect();

    log::info!(
        "{}",
        format!("{:>6}  {:<24} {}", "ID", "Player", "Tribe").if_supports_color(Stdout, |t| t.bold()),
    );
    for player in &players {
        let tribe = match player.tribe_id.and_then(|id| tribes.get(&id)) {
            Some(t) => t.display_name(),
            None => "-".to_string(),
        };
        log::info!("{:>6}  {:<24} {}", player.id, player.display_name, tribe);
    }
    Ok(())
}

pub(crate) fn run_player_edit(
    ctx: &Context,
    select: &PlayerSelector,
    season: SeasonArgs,
    rename: Option<String>,
    tribe: Option<&str>,
    no_tribe: bool,
) -> Result<(), CliError> {
    let key = select.require_key()?;
    let tribe_key = tribe.map(parse_tribe).transpose()?.map(TribeKey::Name);

    let conn = ctx.open()?;
    let scope = Scope::Server(server_id(&conn, season)?);
    let player = find_player(&conn, scope, &PlayerFilter::Key(key.clone()))?
        .into_iter()
        .next();

    // Resolve the destination up front so the swap direction can be checked.
    let destination = match (&player, &tribe_key) {
        (Some(_), Some(tk)) => find_tribe(&conn, scope, &TribeFilter::Key(tk.clone()))?
            .into_iter()
            .next(),
        _ => None,
    };

    let tribe = if no_tribe {
        TribeAssignment::Clear
    } else if let Some(dest) = &destination {
        TribeAssignment::Set(TribeRef::from(dest))
    } else if let Some(tk) = tribe_key {
        TribeAssignment::Set(tk.into())
    } else {
        TribeAssignment::Keep
    };
    let edit = PlayerEdit {
        display_name: rename,
        tribe,
    };

    let target = match &player {
        Some(p) => PlayerRef::from(p),
        None => key.into(),
    };
    let changed = castaway_db::edit_player(&conn, scope, target, &edit)?;

    if let (Some(player), Some(dest)) = (&player, &destination) {
        let previous = tribe_of(&conn, scope, player)?;
        if changed && !is_forward_swap(previous.as_ref(), dest) {
            log::warn!(
                "{} {} moved from {} to {}, which does not come after it",
                "\u{26A0}".if_supports_color(Stdout, |t| t.yellow()),
                player.display_name,
                previous.map_or_else(|| "-".to_string(), |t| t.display_name()),
                dest.display_name(),
            );
        }
    }

    if changed {
        log::info!(
            "{} Updated player",
            "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        );
    } else {
        log::info!("Nothing to change");
    }
    Ok(())
}

pub(crate) fn run_player_delete(
    ctx: &Context,
    select: &PlayerSelector,
    season: SeasonArgs,
) -> Result<(), CliError> {
    let key = select.require_key()?;

    let conn = ctx.open()?;
    let scope = Scope::Server(server_id(&conn, season)?);
    castaway_db::delete_player(&conn, scope, key.clone().into())?;
    log::info!(
        "{} Deleted player with {}",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        key,
    );
    Ok(())
}

/// The tribe a player record points at, if any.
fn tribe_of(conn: &Connection, scope: Scope, player: &Player) -> Result<Option<Tribe>, CliError> {
    let Some(id) = player.tribe_id else {
        return Ok(None);
    };
    Ok(find_tribe(conn, scope, &TribeFilter::Key(TribeKey::Id(id)))?
        .into_iter()
        .next())
}
