//! castaway CLI
//!
//! Command-line front end for the castaway season/tribe/player store.

mod cli_types;
mod commands;
mod error;
mod messages;
mod settings;

use std::io::Write;

use clap::Parser;
use log::LevelFilter;
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use cli_types::{Cli, Commands, ConfigAction, PlayerAction, SeasonAction, TribeAction, UserAction};
use commands::Context;
use commands::config::{run_config_path, run_config_set_db, run_config_show};
use commands::player::{run_player_add, run_player_delete, run_player_edit, run_player_list};
use commands::season::{
    run_season_activate, run_season_deactivate, run_season_delete, run_season_episode,
    run_season_list, run_season_register, run_season_show,
};
use commands::tribe::{run_tribe_add, run_tribe_delete, run_tribe_edit, run_tribe_list};
use commands::user::{run_user_add, run_user_show};
pub(crate) use error::CliError;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.quiet, cli.verbose);

    if let Err(e) = run(cli) {
        log::error!("{} {}", "\u{2718}".if_supports_color(Stdout, |t| t.red()), e);
        std::process::exit(1);
    }
}

/// Route user-facing output through `log`.
///
/// Normal runs print bare messages at info level; `--verbose` adds
/// timestamps, levels, and the library crates' own records.
fn init_logging(quiet: bool, verbose: bool) {
    let level = if quiet {
        LevelFilter::Warn
    } else if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let mut builder = env_logger::Builder::new();
    builder.filter_level(level).target(env_logger::Target::Stdout);
    if verbose {
        builder.format_timestamp_millis();
    } else {
        builder
            .filter_module("castaway_db", LevelFilter::Off)
            .format(|buf, record| writeln!(buf, "{}", record.args()));
    }
    builder.parse_env("CASTAWAY_LOG");
    builder.init();
}

fn run(cli: Cli) -> Result<(), CliError> {
    if let Commands::Config { action } = &cli.command {
        match action {
            ConfigAction::Show => run_config_show(cli.db.clone()),
            ConfigAction::Path => run_config_path(),
            ConfigAction::SetDb { path } => run_config_set_db(path)?,
        }
        return Ok(());
    }

    let (db_path, source) = settings::resolve_db_path(cli.db);
    log::debug!("Using database {} ({})", db_path.display(), source);
    let ctx = Context {
        db_path,
        json: cli.json,
    };

    match cli.command {
        Commands::User { action } => match action {
            UserAction::Add { account, label } => run_user_add(&ctx, account, &label),
            UserAction::Show { account } => run_user_show(&ctx, account),
        },
        Commands::Season { action } => match action {
            SeasonAction::Register { server, name } => run_season_register(&ctx, server, &name),
            SeasonAction::Show { season } => run_season_show(&ctx, season),
            SeasonAction::List => run_season_list(&ctx),
            SeasonAction::Activate { server } => run_season_activate(&ctx, server),
            SeasonAction::Deactivate { server } => run_season_deactivate(&ctx, server),
            SeasonAction::Episode { season } => run_season_episode(&ctx, season),
            SeasonAction::Delete { server, confirm } => run_season_delete(&ctx, server, confirm),
        },
        Commands::Tribe { action } => match action {
            TribeAction::Add {
                tribe,
                season,
                color,
                precedence,
            } => run_tribe_add(&ctx, &tribe, season, &color, precedence),
            TribeAction::List {
                season,
                select,
                player,
                order,
            } => run_tribe_list(&ctx, season, &select, player, order),
            TribeAction::Edit {
                select,
                season,
                rename,
                iteration,
                color,
                precedence,
            } => run_tribe_edit(&ctx, &select, season, rename, iteration, color, precedence),
            TribeAction::Delete { select, season } => run_tribe_delete(&ctx, &select, season),
        },
        Commands::Player { action } => match action {
            PlayerAction::Add {
                display_name,
                account,
                season,
                tribe,
            } => run_player_add(&ctx, &display_name, account, season, tribe.as_deref()),
            PlayerAction::List {
                season,
                select,
                tribe,
            } => run_player_list(&ctx, season, &select, tribe),
            PlayerAction::Edit {
                select,
                season,
                rename,
                tribe,
                no_tribe,
            } => run_player_edit(&ctx, &select, season, rename, tribe.as_deref(), no_tribe),
            PlayerAction::Delete { select, season } => run_player_delete(&ctx, &select, season),
        },
        Commands::Config { .. } => Ok(()),
    }
}
