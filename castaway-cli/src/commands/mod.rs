pub(crate) mod config;
pub(crate) mod player;
pub(crate) mod season;
pub(crate) mod tribe;
pub(crate) mod user;

use std::path::PathBuf;

use castaway_catalog::{TribeName, TribeNameError, is_valid_color};
use castaway_db::{Connection, PlayerFilter, PlayerKey, TribeFilter, TribeKey};
use serde::Serialize;

use crate::CliError;
use crate::cli_types::{PlayerSelector, SeasonArgs, TribeSelector};

/// Shared state for commands that touch the database.
pub(crate) struct Context {
    pub db_path: PathBuf,
    pub json: bool,
}

impl Context {
    /// Open the database, creating its directory and schema on first use.
    pub(crate) fn open(&self) -> Result<Connection, CliError> {
        if let Some(parent) = self.db_path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        Ok(castaway_db::open_database(&self.db_path)?)
    }
}

/// The server a command targets: `--server`, or the active season's server.
pub(crate) fn server_id(conn: &Connection, season: SeasonArgs) -> Result<i64, CliError> {
    if let Some(server) = season.server {
        return Ok(server);
    }
    castaway_db::find_active_season(conn)?
        .map(|s| s.server_id)
        .ok_or(CliError::NoSeason)
}

pub(crate) fn parse_tribe(s: &str) -> Result<TribeName, CliError> {
    Ok(s.parse::<TribeName>()?)
}

/// Reject iterations below 1 before they reach the database.
pub(crate) fn check_iteration(iteration: i64) -> Result<i64, CliError> {
    if iteration < 1 {
        return Err(TribeNameError::InvalidIteration(iteration).into());
    }
    Ok(iteration)
}

pub(crate) fn check_color(color: &str) -> Result<String, CliError> {
    let color = color.trim_start_matches('#').to_lowercase();
    if is_valid_color(&color) {
        Ok(color)
    } else {
        Err(CliError::InvalidColor(color))
    }
}

pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print an empty line through the logger so `--quiet` silences it too.
pub(crate) fn log_blank() {
    log::info!("");
}

impl PlayerSelector {
    /// The selected player key, in id, name, user, account order.
    pub(crate) fn key(&self) -> Option<PlayerKey> {
        match self.filter(None) {
            PlayerFilter::Key(key) => Some(key),
            _ => None,
        }
    }

    pub(crate) fn require_key(&self) -> Result<PlayerKey, CliError> {
        self.key().ok_or_else(|| {
            CliError::usage("Select a player with --id, --name, --user, or --account")
        })
    }

    pub(crate) fn filter(&self, tribe: Option<i64>) -> PlayerFilter {
        PlayerFilter::from_options(
            self.id,
            self.name.clone(),
            self.user,
            self.account,
            tribe,
        )
    }
}

impl TribeSelector {
    pub(crate) fn filter(
        &self,
        owner: Option<PlayerKey>,
        order: Option<i64>,
    ) -> Result<TribeFilter, CliError> {
        let name = self.tribe.as_deref().map(parse_tribe).transpose()?;
        Ok(TribeFilter::from_options(self.id, name, owner, order))
    }

    pub(crate) fn require_key(&self) -> Result<TribeKey, CliError> {
        match self.filter(None, None)? {
            TribeFilter::Key(key) => Ok(key),
            _ => Err(CliError::usage("Select a tribe by name or with --tribe-id")),
        }
    }
}
