use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use castaway_catalog::Season;
use castaway_db::{Entity, OperationError, PlayerFilter, Scope, SeasonOutcome, TribeFilter};

use crate::CliError;
use crate::cli_types::SeasonArgs;

use super::{Context, log_blank, print_json, server_id};

pub(crate) fn run_season_register(ctx: &Context, server: i64, name: &str) -> Result<(), CliError> {
    let conn = ctx.open()?;
    let outcome = castaway_db::add_season(&conn, server, name)?;
    let check = "\u{2714}".if_supports_color(Stdout, |t| t.green());
    match outcome {
        SeasonOutcome::Created => log::info!("{check} Registered season '{name}' for server {server}"),
        SeasonOutcome::Renamed => log::info!("{check} Renamed server {server}'s season to '{name}'"),
        SeasonOutcome::Unchanged => log::info!("Server {server} already has season '{name}'"),
    }
    Ok(())
}

pub(crate) fn run_season_show(ctx: &Context, season: SeasonArgs) -> Result<(), CliError> {
    let conn = ctx.open()?;
    let server = server_id(&conn, season)?;
    let season = castaway_db::find_season(&conn, server)?
        .ok_or_else(|| OperationError::not_found(Entity::Season, Scope::Server(server)))?;

    if ctx.json {
        return print_json(&season);
    }

    let scope = Scope::Season(season.id);
    let tribes = castaway_db::find_tribe(&conn, scope, &TribeFilter::All)?;
    let players = castaway_db::find_player(&conn, scope, &PlayerFilter::All)?;

    log::info!("{}", season.name.if_supports_color(Stdout, |t| t.bold()));
    log::info!("  Server:   {}", season.server_id);
    log::info!("  Status:   {}", status_label(&season));
    log::info!("  Episode:  {}", season.episode);
    log::info!("  Tribes:   {}", tribes.len());
    log::info!(
        "  Players:  {} ({} without a tribe)",
        players.len(),
        players.iter().filter(|p| p.tribe_id.is_none()).count(),
    );
    Ok(())
}

pub(crate) fn run_season_list(ctx: &Context) -> Result<(), CliError> {
    let conn = ctx.open()?;
    let seasons = castaway_db::list_seasons(&conn)?;

    if ctx.json {
        return print_json(&seasons);
    }
    if seasons.is_empty() {
        log::info!("No seasons registered.");
        return Ok(());
    }

    log::info!(
        "{}",
        format!("{:<24} {:>20} {:>8}  {}", "Name", "Server", "Episode", "Status")
            .if_supports_color(Stdout, |t| t.bold()),
    );
    for season in &seasons {
        log::info!(
            "{:<24} {:>20} {:>8}  {}",
            season.name,
            season.server_id,
            season.episode,
            status_label(season),
        );
    }
    Ok(())
}

pub(crate) fn run_season_activate(ctx: &Context, server: i64) -> Result<(), CliError> {
    let conn = ctx.open()?;
    let season = castaway_db::activate_season(&conn, server)?;
    log::info!(
        "{} '{}' is now the active season",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        season.name,
    );
    Ok(())
}

pub(crate) fn run_season_deactivate(ctx: &Context, server: i64) -> Result<(), CliError> {
    let conn = ctx.open()?;
    if castaway_db::deactivate_season(&conn, server)? {
        log::info!("Server {server}'s season is no longer active");
    } else {
        log::info!("Server {server}'s season was not active");
    }
    Ok(())
}

pub(crate) fn run_season_episode(ctx: &Context, season: SeasonArgs) -> Result<(), CliError> {
    let conn = ctx.open()?;
    let server = server_id(&conn, season)?;
    let episode = castaway_db::advance_episode(&conn, server)?;
    log::info!("Server {server} is now on episode {episode}");
    Ok(())
}

/// Delete a season and everything in it.
pub(crate) fn run_season_delete(ctx: &Context, server: i64, confirm: bool) -> Result<(), CliError> {
    let conn = ctx.open()?;
    let season = castaway_db::find_season(&conn, server)?
        .ok_or_else(|| OperationError::not_found(Entity::Season, Scope::Server(server)))?;

    if !confirm {
        let scope = Scope::Season(season.id);
        let tribes = castaway_db::find_tribe(&conn, scope, &TribeFilter::All)?.len();
        let players = castaway_db::find_player(&conn, scope, &PlayerFilter::All)?.len();
        log::warn!(
            "This will permanently delete season '{}' with {} tribes and {} players.",
            season.name,
            tribes,
            players,
        );
        log::info!("Re-run with --confirm to proceed:");
        log::info!("  castaway season delete {server} --confirm");
        return Ok(());
    }

    castaway_db::delete_season(&conn, server)?;
    log::info!(
        "{}",
        format!("Season '{}' deleted.", season.name).if_supports_color(Stdout, |t| t.bold()),
    );
    log_blank();
    log::info!("Users are kept; register a new season with 'castaway season register'.");
    Ok(())
}

fn status_label(season: &Season) -> String {
    if season.is_active() {
        format!("{}", season.status.if_supports_color(Stdout, |t| t.green()))
    } else {
        format!("{}", season.status.if_supports_color(Stdout, |t| t.dimmed()))
    }
}
