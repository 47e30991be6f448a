//! Read queries for the castaway database.
//!
//! Every lookup is scoped to one season and returns an ordered list; callers
//! expecting at most one record take the first. An unresolvable scope is
//! logged and yields an empty list rather than an error.

use std::fmt;

use castaway_catalog::{Player, Season, SeasonStatus, Tribe, TribeName, User};
use rusqlite::{Connection, OptionalExtension, params};

use crate::error::{OperationError, logged};

// ── Lookup keys ─────────────────────────────────────────────────────────────

/// The season a lookup or mutation applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// A season row id.
    Season(i64),
    /// The platform id of the server owning the season.
    Server(i64),
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Season(id) => write!(f, "season id {id}"),
            Self::Server(id) => write!(f, "server {id}"),
        }
    }
}

/// Identifies a single player within a season.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerKey {
    Id(i64),
    DisplayName(String),
    /// The `users` row id the player is bound to.
    User(i64),
    /// The platform account id of the bound user.
    Account(i64),
}

impl fmt::Display for PlayerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "player id {id}"),
            Self::DisplayName(name) => write!(f, "display name '{name}'"),
            Self::User(id) => write!(f, "user id {id}"),
            Self::Account(id) => write!(f, "account {id}"),
        }
    }
}

/// Which players of a season to return.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PlayerFilter {
    /// Every player, ordered by display name.
    #[default]
    All,
    Key(PlayerKey),
    /// Players currently assigned to the tribe with this id.
    Tribe(i64),
}

impl PlayerFilter {
    /// Pick the first supplied discriminator in fixed precedence:
    /// id, display name, user, account, tribe.
    pub fn from_options(
        id: Option<i64>,
        display_name: Option<String>,
        user: Option<i64>,
        account: Option<i64>,
        tribe: Option<i64>,
    ) -> Self {
        if let Some(id) = id {
            Self::Key(PlayerKey::Id(id))
        } else if let Some(name) = display_name {
            Self::Key(PlayerKey::DisplayName(name))
        } else if let Some(user) = user {
            Self::Key(PlayerKey::User(user))
        } else if let Some(account) = account {
            Self::Key(PlayerKey::Account(account))
        } else if let Some(tribe) = tribe {
            Self::Tribe(tribe)
        } else {
            Self::All
        }
    }
}

/// Identifies a single tribe within a season.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TribeKey {
    Id(i64),
    Name(TribeName),
}

impl TribeKey {
    pub fn name(name: impl Into<String>, iteration: i64) -> Self {
        Self::Name(TribeName::new(name, iteration))
    }
}

impl fmt::Display for TribeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "tribe id {id}"),
            Self::Name(name) => write!(f, "tribe '{name}'"),
        }
    }
}

/// Which tribes of a season to return.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TribeFilter {
    /// Every tribe, ordered by precedence (descending), name, iteration.
    #[default]
    All,
    Key(TribeKey),
    /// The current tribe of a player. Empty when the player is tribe-less.
    Owner(PlayerKey),
    /// Tribes with this precedence value.
    Order(i64),
}

impl TribeFilter {
    /// Pick the first supplied discriminator in fixed precedence:
    /// id, name + iteration, owning player, order.
    pub fn from_options(
        id: Option<i64>,
        name: Option<TribeName>,
        owner: Option<PlayerKey>,
        order: Option<i64>,
    ) -> Self {
        if let Some(id) = id {
            Self::Key(TribeKey::Id(id))
        } else if let Some(name) = name {
            Self::Key(TribeKey::Name(name))
        } else if let Some(owner) = owner {
            Self::Owner(owner)
        } else if let Some(order) = order {
            Self::Order(order)
        } else {
            Self::All
        }
    }
}

// ── User Lookups ────────────────────────────────────────────────────────────

/// Find a user by platform account id.
pub fn find_user(conn: &Connection, account_id: i64) -> Result<Option<User>, OperationError> {
    logged("find_user", user_by_account(conn, account_id).map_err(Into::into))
}

/// Find a user by row id.
pub fn find_user_by_id(conn: &Connection, id: i64) -> Result<Option<User>, OperationError> {
    let user = conn
        .query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
            params![id],
            row_to_user,
        )
        .optional();
    logged("find_user_by_id", user.map_err(Into::into))
}

pub(crate) fn user_by_account(conn: &Connection, account_id: i64) -> rusqlite::Result<Option<User>> {
    conn.query_row(
        &format!("SELECT {USER_COLUMNS} FROM users WHERE account_id = ?1"),
        params![account_id],
        row_to_user,
    )
    .optional()
}

// ── Season Lookups ──────────────────────────────────────────────────────────

/// Find the season owned by a server.
pub fn find_season(conn: &Connection, server_id: i64) -> Result<Option<Season>, OperationError> {
    logged("find_season", season_by_server(conn, server_id).map_err(Into::into))
}

/// Find a season by row id.
pub fn find_season_by_id(conn: &Connection, id: i64) -> Result<Option<Season>, OperationError> {
    logged("find_season_by_id", season_by_id(conn, id).map_err(Into::into))
}

/// Find the one active season, if any.
pub fn find_active_season(conn: &Connection) -> Result<Option<Season>, OperationError> {
    let season = conn
        .query_row(
            &format!("SELECT {SEASON_COLUMNS} FROM seasons WHERE status = ?1 ORDER BY id LIMIT 1"),
            params![SeasonStatus::Active.as_str()],
            row_to_season,
        )
        .optional();
    logged("find_active_season", season.map_err(Into::into))
}

/// List all seasons by name, then server id.
pub fn list_seasons(conn: &Connection) -> Result<Vec<Season>, OperationError> {
    logged("list_seasons", query_seasons(conn).map_err(Into::into))
}

fn query_seasons(conn: &Connection) -> rusqlite::Result<Vec<Season>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {SEASON_COLUMNS} FROM seasons ORDER BY name, server_id"
    ))?;
    let rows = stmt.query_map([], row_to_season)?;
    rows.collect()
}

pub(crate) fn season_by_server(conn: &Connection, server_id: i64) -> rusqlite::Result<Option<Season>> {
    conn.query_row(
        &format!("SELECT {SEASON_COLUMNS} FROM seasons WHERE server_id = ?1"),
        params![server_id],
        row_to_season,
    )
    .optional()
}

pub(crate) fn season_by_id(conn: &Connection, id: i64) -> rusqlite::Result<Option<Season>> {
    conn.query_row(
        &format!("SELECT {SEASON_COLUMNS} FROM seasons WHERE id = ?1"),
        params![id],
        row_to_season,
    )
    .optional()
}

/// Resolve a scope to a season, or `None` if it names no season.
pub fn resolve_scope(conn: &Connection, scope: Scope) -> Result<Option<Season>, OperationError> {
    logged("resolve_scope", season_for_scope(conn, scope).map_err(Into::into))
}

pub(crate) fn season_for_scope(conn: &Connection, scope: Scope) -> rusqlite::Result<Option<Season>> {
    match scope {
        Scope::Season(id) => season_by_id(conn, id),
        Scope::Server(server_id) => season_by_server(conn, server_id),
    }
}

/// Resolve a scope to its season id, logging when it cannot be resolved.
fn scope_season_id(conn: &Connection, scope: Scope, op: &str) -> rusqlite::Result<Option<i64>> {
    let season = season_for_scope(conn, scope)?;
    if season.is_none() {
        log::warn!("{op}: no season for {scope}");
    }
    Ok(season.map(|s| s.id))
}

// ── Tribe Lookups ───────────────────────────────────────────────────────────

/// Find tribes in a season.
pub fn find_tribe(
    conn: &Connection,
    scope: Scope,
    filter: &TribeFilter,
) -> Result<Vec<Tribe>, OperationError> {
    let tribes = scope_season_id(conn, scope, "find_tribe").and_then(|season_id| match season_id {
        Some(season_id) => tribes_in_season(conn, season_id, filter),
        None => Ok(Vec::new()),
    });
    logged("find_tribe", tribes.map_err(Into::into))
}

pub(crate) fn tribes_in_season(
    conn: &Connection,
    season_id: i64,
    filter: &TribeFilter,
) -> rusqlite::Result<Vec<Tribe>> {
    match filter {
        TribeFilter::All => query_tribes(conn, "season = ?1", params![season_id]),
        TribeFilter::Key(TribeKey::Id(id)) => {
            query_tribes(conn, "season = ?1 AND id = ?2", params![season_id, id])
        }
        TribeFilter::Key(TribeKey::Name(name)) => query_tribes(
            conn,
            "season = ?1 AND name = ?2 AND iteration = ?3",
            params![season_id, name.name, name.iteration],
        ),
        TribeFilter::Order(order) => query_tribes(
            conn,
            "season = ?1 AND precedence = ?2",
            params![season_id, order],
        ),
        TribeFilter::Owner(key) => {
            let owner = players_in_season(conn, season_id, &PlayerFilter::Key(key.clone()))?;
            match owner.first().and_then(|p| p.tribe_id) {
                Some(tribe_id) => query_tribes(
                    conn,
                    "season = ?1 AND id = ?2",
                    params![season_id, tribe_id],
                ),
                None => Ok(Vec::new()),
            }
        }
    }
}

fn query_tribes(
    conn: &Connection,
    condition: &str,
    params: impl rusqlite::Params,
) -> rusqlite::Result<Vec<Tribe>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {TRIBE_COLUMNS} FROM tribes WHERE {condition}
         ORDER BY precedence DESC, name ASC, iteration ASC"
    ))?;
    let rows = stmt.query_map(params, row_to_tribe)?;
    rows.collect()
}

// ── Player Lookups ──────────────────────────────────────────────────────────

/// Find players in a season.
pub fn find_player(
    conn: &Connection,
    scope: Scope,
    filter: &PlayerFilter,
) -> Result<Vec<Player>, OperationError> {
    let players = scope_season_id(conn, scope, "find_player").and_then(|season_id| match season_id {
        Some(season_id) => players_in_season(conn, season_id, filter),
        None => Ok(Vec::new()),
    });
    logged("find_player", players.map_err(Into::into))
}

pub(crate) fn players_in_season(
    conn: &Connection,
    season_id: i64,
    filter: &PlayerFilter,
) -> rusqlite::Result<Vec<Player>> {
    match filter {
        PlayerFilter::All => query_players(conn, "p.season = ?1", params![season_id]),
        PlayerFilter::Key(PlayerKey::Id(id)) => {
            query_players(conn, "p.season = ?1 AND p.id = ?2", params![season_id, id])
        }
        PlayerFilter::Key(PlayerKey::DisplayName(name)) => query_players(
            conn,
            "p.season = ?1 AND p.display_name = ?2",
            params![season_id, name],
        ),
        PlayerFilter::Key(PlayerKey::User(user)) => query_players(
            conn,
            "p.season = ?1 AND p.user = ?2",
            params![season_id, user],
        ),
        PlayerFilter::Key(PlayerKey::Account(account)) => query_players(
            conn,
            "p.season = ?1 AND p.user = (SELECT id FROM users WHERE account_id = ?2)",
            params![season_id, account],
        ),
        PlayerFilter::Tribe(tribe) => query_players(
            conn,
            "p.season = ?1 AND p.tribe = ?2",
            params![season_id, tribe],
        ),
    }
}

fn query_players(
    conn: &Connection,
    condition: &str,
    params: impl rusqlite::Params,
) -> rusqlite::Result<Vec<Player>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PLAYER_COLUMNS} FROM players p WHERE {condition} ORDER BY p.display_name ASC"
    ))?;
    let rows = stmt.query_map(params, row_to_player)?;
    rows.collect()
}

// ── Row Mapping Helpers ─────────────────────────────────────────────────────

const USER_COLUMNS: &str = "id, account_id, label";
const SEASON_COLUMNS: &str = "id, server_id, name, episode, status";
const TRIBE_COLUMNS: &str = "id, name, iteration, season, color, precedence";
const PLAYER_COLUMNS: &str = "p.id, p.display_name, p.user, p.season, p.tribe";

fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        account_id: row.get(1)?,
        label: row.get(2)?,
    })
}

fn row_to_season(row: &rusqlite::Row<'_>) -> rusqlite::Result<Season> {
    let status: String = row.get(4)?;
    Ok(Season {
        id: row.get(0)?,
        server_id: row.get(1)?,
        name: row.get(2)?,
        episode: row.get(3)?,
        status: SeasonStatus::from_str_loose(&status),
    })
}

fn row_to_tribe(row: &rusqlite::Row<'_>) -> rusqlite::Result<Tribe> {
    Ok(Tribe {
        id: row.get(0)?,
        name: row.get(1)?,
        iteration: row.get(2)?,
        season_id: row.get(3)?,
        color: row.get(4)?,
        precedence: row.get(5)?,
    })
}

fn row_to_player(row: &rusqlite::Row<'_>) -> rusqlite::Result<Player> {
    Ok(Player {
        id: row.get(0)?,
        display_name: row.get(1)?,
        user_id: row.get(2)?,
        season_id: row.get(3)?,
        tribe_id: row.get(4)?,
    })
}
