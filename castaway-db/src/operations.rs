//! Add, edit, and delete operations for every castaway entity.
//!
//! Validation runs before any write, and every operation that touches more
//! than one row does so inside a single transaction. Dropping the
//! transaction on an early return rolls it back.

use castaway_catalog::{DEFAULT_TRIBE_COLOR, Player, Season, SeasonStatus, Tribe, TribeName};
use rusqlite::{Connection, OptionalExtension, params};

use crate::error::{
    ConflictKind, Entity, OperationError, is_tribe_unique_violation, logged,
    player_unique_violation,
};
use crate::queries::{
    PlayerFilter, PlayerKey, Scope, TribeFilter, TribeKey, players_in_season, season_by_server,
    season_for_scope, tribes_in_season, user_by_account,
};

// ── Argument types ──────────────────────────────────────────────────────────

/// Result of registering a season for a server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeasonOutcome {
    Created,
    /// The server already had a season; its name was updated.
    Renamed,
    /// The server already had a season with this name.
    Unchanged,
}

impl SeasonOutcome {
    pub fn changed(&self) -> bool {
        !matches!(self, Self::Unchanged)
    }
}

/// Parameters for `add_tribe`.
#[derive(Debug, Clone)]
pub struct NewTribe {
    pub name: String,
    pub server_id: i64,
    pub iteration: i64,
    pub color: String,
    pub precedence: i64,
}

impl NewTribe {
    /// A first-iteration tribe with the default colour and precedence 1.
    pub fn new(name: impl Into<String>, server_id: i64) -> Self {
        Self {
            name: name.into(),
            server_id,
            iteration: 1,
            color: DEFAULT_TRIBE_COLOR.to_string(),
            precedence: 1,
        }
    }

    pub fn iteration(mut self, iteration: i64) -> Self {
        self.iteration = iteration;
        self
    }

    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn precedence(mut self, precedence: i64) -> Self {
        self.precedence = precedence;
        self
    }
}

/// Parameters for `add_player`.
#[derive(Debug, Clone)]
pub struct NewPlayer {
    pub display_name: String,
    pub account_id: i64,
    pub server_id: i64,
    /// Tribe to join on creation, resolved by (name, iteration) in the season.
    pub tribe: Option<TribeName>,
}

impl NewPlayer {
    pub fn new(display_name: impl Into<String>, account_id: i64, server_id: i64) -> Self {
        Self {
            display_name: display_name.into(),
            account_id,
            server_id,
            tribe: None,
        }
    }

    pub fn tribe(mut self, name: impl Into<String>, iteration: i64) -> Self {
        self.tribe = Some(TribeName::new(name, iteration));
        self
    }
}

/// A player to act on: an already-fetched record or a key to resolve.
#[derive(Debug, Clone)]
pub enum PlayerRef<'a> {
    Record(&'a Player),
    Key(PlayerKey),
}

impl<'a> From<&'a Player> for PlayerRef<'a> {
    fn from(player: &'a Player) -> Self {
        Self::Record(player)
    }
}

impl From<PlayerKey> for PlayerRef<'_> {
    fn from(key: PlayerKey) -> Self {
        Self::Key(key)
    }
}

/// A tribe to act on: an already-fetched record or a key to resolve.
#[derive(Debug, Clone)]
pub enum TribeRef<'a> {
    Record(&'a Tribe),
    Key(TribeKey),
}

impl<'a> From<&'a Tribe> for TribeRef<'a> {
    fn from(tribe: &'a Tribe) -> Self {
        Self::Record(tribe)
    }
}

impl From<TribeKey> for TribeRef<'_> {
    fn from(key: TribeKey) -> Self {
        Self::Key(key)
    }
}

/// What to do with a player's tribe pointer.
#[derive(Debug, Clone, Default)]
pub enum TribeAssignment<'a> {
    #[default]
    Keep,
    /// Leave the player tribe-less.
    Clear,
    /// Move the player to this tribe (any tribe of the same season).
    Set(TribeRef<'a>),
}

/// Requested changes for `edit_player`.
#[derive(Debug, Clone, Default)]
pub struct PlayerEdit<'a> {
    pub display_name: Option<String>,
    pub tribe: TribeAssignment<'a>,
}

/// Requested changes for `edit_tribe`.
#[derive(Debug, Clone, Default)]
pub struct TribeEdit {
    pub name: Option<String>,
    pub iteration: Option<i64>,
    pub color: Option<String>,
    pub precedence: Option<i64>,
}

/// What `edit_tribe` actually did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TribeEditReport {
    /// At least one column was written.
    pub changed: bool,
    /// The new (name, iteration) collided with another tribe, or would not
    /// display unambiguously, and was skipped.
    pub rename_rejected: bool,
}

// ── User Operations ─────────────────────────────────────────────────────────

/// Insert a user, or update its label if it changed.
///
/// Returns whether a row was written.
pub fn add_user(conn: &Connection, account_id: i64, label: &str) -> Result<bool, OperationError> {
    let changed = conn.execute(
        "INSERT INTO users (account_id, label)
         VALUES (?1, ?2)
         ON CONFLICT(account_id) DO UPDATE SET
             label = excluded.label
         WHERE users.label IS NOT excluded.label",
        params![account_id, label],
    );
    logged("add_user", changed.map(|n| n > 0).map_err(Into::into))
}

// ── Season Operations ───────────────────────────────────────────────────────

/// Register the season for a server, renaming it if the name changed.
pub fn add_season(
    conn: &Connection,
    server_id: i64,
    name: &str,
) -> Result<SeasonOutcome, OperationError> {
    logged("add_season", upsert_season(conn, server_id, name))
}

fn upsert_season(
    conn: &Connection,
    server_id: i64,
    name: &str,
) -> Result<SeasonOutcome, OperationError> {
    let tx = conn.unchecked_transaction()?;
    let existed = season_by_server(&tx, server_id)?.is_some();
    let changed = tx.execute(
        "INSERT INTO seasons (server_id, name)
         VALUES (?1, ?2)
         ON CONFLICT(server_id) DO UPDATE SET
             name = excluded.name
         WHERE seasons.name IS NOT excluded.name",
        params![server_id, name],
    )?;
    tx.commit()?;

    let outcome = match (existed, changed) {
        (false, _) => SeasonOutcome::Created,
        (true, 0) => SeasonOutcome::Unchanged,
        (true, _) => SeasonOutcome::Renamed,
    };
    log::debug!("add_season: server {server_id} -> {outcome:?}");
    Ok(outcome)
}

/// Make the server's season the only active one.
pub fn activate_season(conn: &Connection, server_id: i64) -> Result<Season, OperationError> {
    logged("activate_season", set_active_season(conn, server_id))
}

fn set_active_season(conn: &Connection, server_id: i64) -> Result<Season, OperationError> {
    let tx = conn.unchecked_transaction()?;
    let mut season = season_by_server(&tx, server_id)?
        .ok_or_else(|| OperationError::not_found(Entity::Season, Scope::Server(server_id)))?;

    tx.execute(
        "UPDATE seasons SET status = ?1 WHERE status = ?2",
        params![SeasonStatus::Inactive.as_str(), SeasonStatus::Active.as_str()],
    )?;
    tx.execute(
        "UPDATE seasons SET status = ?1 WHERE id = ?2",
        params![SeasonStatus::Active.as_str(), season.id],
    )?;
    tx.commit()?;

    season.status = SeasonStatus::Active;
    log::info!("Season '{}' (server {server_id}) is now active", season.name);
    Ok(season)
}

/// Mark the server's season inactive. Returns whether it was active.
pub fn deactivate_season(conn: &Connection, server_id: i64) -> Result<bool, OperationError> {
    logged("deactivate_season", clear_active_season(conn, server_id))
}

fn clear_active_season(conn: &Connection, server_id: i64) -> Result<bool, OperationError> {
    let season = season_by_server(conn, server_id)?
        .ok_or_else(|| OperationError::not_found(Entity::Season, Scope::Server(server_id)))?;
    let changed = conn.execute(
        "UPDATE seasons SET status = ?1 WHERE id = ?2 AND status = ?3",
        params![
            SeasonStatus::Inactive.as_str(),
            season.id,
            SeasonStatus::Active.as_str()
        ],
    )?;
    Ok(changed > 0)
}

/// Increment the server's episode counter and return the new value.
pub fn advance_episode(conn: &Connection, server_id: i64) -> Result<i64, OperationError> {
    let episode = conn
        .query_row(
            "UPDATE seasons SET episode = episode + 1 WHERE server_id = ?1 RETURNING episode",
            params![server_id],
            |row| row.get(0),
        )
        .optional()
        .map_err(OperationError::from)
        .and_then(|episode| {
            episode.ok_or_else(|| OperationError::not_found(Entity::Season, Scope::Server(server_id)))
        });
    logged("advance_episode", episode)
}

/// Delete a server's season with all of its players and tribes.
pub fn delete_season(conn: &Connection, server_id: i64) -> Result<(), OperationError> {
    logged("delete_season", cascade_delete_season(conn, server_id))
}

fn cascade_delete_season(conn: &Connection, server_id: i64) -> Result<(), OperationError> {
    let tx = conn.unchecked_transaction()?;
    let season = season_by_server(&tx, server_id)?
        .ok_or_else(|| OperationError::not_found(Entity::Season, Scope::Server(server_id)))?;

    let players = tx.execute("DELETE FROM players WHERE season = ?1", params![season.id])?;
    let tribes = tx.execute("DELETE FROM tribes WHERE season = ?1", params![season.id])?;
    tx.execute("DELETE FROM seasons WHERE id = ?1", params![season.id])?;
    tx.commit()?;

    log::info!(
        "Deleted season '{}' (server {server_id}) with {players} players and {tribes} tribes",
        season.name
    );
    Ok(())
}

// ── Tribe Operations ────────────────────────────────────────────────────────

/// Create a tribe in the server's season.
///
/// An existing (name, iteration) in the season is reported as
/// `Conflict(TribeExists)` and leaves the existing row untouched. A pair
/// whose display string would not parse back is `InvalidTribeName`.
pub fn add_tribe(conn: &Connection, tribe: &NewTribe) -> Result<Tribe, OperationError> {
    logged("add_tribe", insert_tribe(conn, tribe))
}

fn insert_tribe(conn: &Connection, tribe: &NewTribe) -> Result<Tribe, OperationError> {
    TribeName::new(tribe.name.as_str(), tribe.iteration).validate()?;
    let season = season_by_server(conn, tribe.server_id)?
        .ok_or_else(|| OperationError::not_found(Entity::Season, Scope::Server(tribe.server_id)))?;

    let inserted = conn.execute(
        "INSERT INTO tribes (name, iteration, season, color, precedence)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            tribe.name,
            tribe.iteration,
            season.id,
            tribe.color,
            tribe.precedence,
        ],
    );
    match inserted {
        Ok(_) => {}
        Err(e) if is_tribe_unique_violation(&e) => {
            return Err(OperationError::Conflict(ConflictKind::TribeExists));
        }
        Err(e) => return Err(e.into()),
    }

    let created = Tribe {
        id: conn.last_insert_rowid(),
        name: tribe.name.clone(),
        iteration: tribe.iteration,
        season_id: season.id,
        color: tribe.color.clone(),
        precedence: tribe.precedence,
    };
    log::info!("Added tribe '{created}' to season '{}'", season.name);
    Ok(created)
}

/// Edit a tribe's name, iteration, colour, or precedence.
///
/// A rename that would collide with another tribe of the season, or whose
/// display string would not parse back, is logged and skipped; the colour
/// and precedence changes still apply.
pub fn edit_tribe(
    conn: &Connection,
    scope: Scope,
    target: TribeRef<'_>,
    edit: &TribeEdit,
) -> Result<TribeEditReport, OperationError> {
    logged("edit_tribe", update_tribe(conn, scope, &target, edit))
}

fn update_tribe(
    conn: &Connection,
    scope: Scope,
    target: &TribeRef<'_>,
    edit: &TribeEdit,
) -> Result<TribeEditReport, OperationError> {
    let tx = conn.unchecked_transaction()?;
    let season_id = require_season(&tx, scope)?;
    let tribe = require_tribe(&tx, season_id, target)?;
    let mut report = TribeEditReport::default();

    if edit.name.is_some() || edit.iteration.is_some() {
        let name = edit.name.clone().unwrap_or_else(|| tribe.name.clone());
        let iteration = edit.iteration.unwrap_or(tribe.iteration);
        if name != tribe.name || iteration != tribe.iteration {
            let wanted = TribeName::new(name, iteration);
            if let Err(e) = wanted.validate() {
                log::warn!("edit_tribe: {e}, keeping '{tribe}'");
                report.rename_rejected = true;
            } else {
                rename_tribe(&tx, season_id, &tribe, &wanted, &mut report)?;
            }
        }
    }

    if let Some(color) = &edit.color
        && *color != tribe.color
    {
        let n = tx.execute(
            "UPDATE tribes SET color = ?1 WHERE id = ?2",
            params![color, tribe.id],
        )?;
        report.changed |= n > 0;
    }

    if let Some(precedence) = edit.precedence
        && precedence != tribe.precedence
    {
        let n = tx.execute(
            "UPDATE tribes SET precedence = ?1 WHERE id = ?2",
            params![precedence, tribe.id],
        )?;
        report.changed |= n > 0;
    }

    tx.commit()?;
    Ok(report)
}

/// Move a tribe to a new (name, iteration) unless another tribe holds it.
fn rename_tribe(
    tx: &Connection,
    season_id: i64,
    tribe: &Tribe,
    wanted: &TribeName,
    report: &mut TribeEditReport,
) -> Result<(), OperationError> {
    let taken = tribes_in_season(tx, season_id, &TribeFilter::Key(TribeKey::Name(wanted.clone())))?
        .iter()
        .any(|t| t.id != tribe.id);
    if taken {
        log::warn!("edit_tribe: '{wanted}' already exists in season {season_id}, keeping '{tribe}'");
        report.rename_rejected = true;
        return Ok(());
    }

    match tx.execute(
        "UPDATE tribes SET name = ?1, iteration = ?2 WHERE id = ?3",
        params![wanted.name, wanted.iteration, tribe.id],
    ) {
        Ok(n) => report.changed |= n > 0,
        Err(e) if is_tribe_unique_violation(&e) => {
            log::warn!("edit_tribe: '{wanted}' was taken concurrently, keeping '{tribe}'");
            report.rename_rejected = true;
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

/// Delete a tribe, leaving its players tribe-less.
///
/// Returns true if any player pointer was cleared or the tribe row removed.
pub fn delete_tribe(
    conn: &Connection,
    scope: Scope,
    target: TribeRef<'_>,
) -> Result<bool, OperationError> {
    logged("delete_tribe", remove_tribe(conn, scope, &target))
}

fn remove_tribe(conn: &Connection, scope: Scope, target: &TribeRef<'_>) -> Result<bool, OperationError> {
    let tx = conn.unchecked_transaction()?;
    let season_id = require_season(&tx, scope)?;
    let tribe = require_tribe(&tx, season_id, target)?;

    let released = tx.execute(
        "UPDATE players SET tribe = NULL WHERE tribe = ?1",
        params![tribe.id],
    )?;
    let removed = tx.execute("DELETE FROM tribes WHERE id = ?1", params![tribe.id])?;
    tx.commit()?;

    log::info!("Deleted tribe '{tribe}', released {released} players");
    Ok(released > 0 || removed > 0)
}

// ── Player Operations ───────────────────────────────────────────────────────

/// Create a player for a user in the server's season.
///
/// Checks run in a fixed order so the most basic problem is reported:
/// user, season, tribe, then display-name and user uniqueness.
pub fn add_player(conn: &Connection, player: &NewPlayer) -> Result<Player, OperationError> {
    logged("add_player", insert_player(conn, player))
}

fn insert_player(conn: &Connection, new: &NewPlayer) -> Result<Player, OperationError> {
    let tx = conn.unchecked_transaction()?;

    let user = user_by_account(&tx, new.account_id)?.ok_or_else(|| {
        OperationError::not_found(Entity::User, PlayerKey::Account(new.account_id))
    })?;
    let season = season_by_server(&tx, new.server_id)?
        .ok_or_else(|| OperationError::not_found(Entity::Season, Scope::Server(new.server_id)))?;

    let tribe_id = match &new.tribe {
        Some(name) => {
            let key = TribeKey::Name(name.clone());
            let tribe = tribes_in_season(&tx, season.id, &TribeFilter::Key(key.clone()))?
                .into_iter()
                .next()
                .ok_or_else(|| OperationError::not_found(Entity::Tribe, key))?;
            Some(tribe.id)
        }
        None => None,
    };

    let name_key = PlayerFilter::Key(PlayerKey::DisplayName(new.display_name.clone()));
    if !players_in_season(&tx, season.id, &name_key)?.is_empty() {
        return Err(OperationError::Conflict(ConflictKind::DisplayNameTaken));
    }
    let user_key = PlayerFilter::Key(PlayerKey::User(user.id));
    if !players_in_season(&tx, season.id, &user_key)?.is_empty() {
        return Err(OperationError::Conflict(ConflictKind::UserAlreadyPlayer));
    }

    let inserted = tx.execute(
        "INSERT INTO players (display_name, user, season, tribe) VALUES (?1, ?2, ?3, ?4)",
        params![new.display_name, user.id, season.id, tribe_id],
    );
    if let Err(e) = inserted {
        return Err(match player_unique_violation(&e) {
            Some(kind) => OperationError::Conflict(kind),
            None => e.into(),
        });
    }

    let player = Player {
        id: tx.last_insert_rowid(),
        display_name: new.display_name.clone(),
        user_id: user.id,
        season_id: season.id,
        tribe_id,
    };
    tx.commit()?;

    log::info!("Added player '{player}' to season '{}'", season.name);
    Ok(player)
}

/// Rename a player and/or change their tribe.
///
/// Returns whether any column was written. Renaming to the current name or
/// moving to the current tribe is a no-op, not an error.
pub fn edit_player(
    conn: &Connection,
    scope: Scope,
    target: PlayerRef<'_>,
    edit: &PlayerEdit<'_>,
) -> Result<bool, OperationError> {
    logged("edit_player", update_player(conn, scope, &target, edit))
}

fn update_player(
    conn: &Connection,
    scope: Scope,
    target: &PlayerRef<'_>,
    edit: &PlayerEdit<'_>,
) -> Result<bool, OperationError> {
    let tx = conn.unchecked_transaction()?;
    let season_id = require_season(&tx, scope)?;
    let player = require_player(&tx, season_id, target)?;

    let new_tribe = match &edit.tribe {
        TribeAssignment::Keep => None,
        TribeAssignment::Clear => Some(None),
        TribeAssignment::Set(tribe) => Some(Some(require_tribe(&tx, season_id, tribe)?)),
    };

    let mut changed = false;

    if let Some(name) = &edit.display_name
        && *name != player.display_name
    {
        let taken = players_in_season(
            &tx,
            season_id,
            &PlayerFilter::Key(PlayerKey::DisplayName(name.clone())),
        )?
        .iter()
        .any(|p| p.id != player.id);
        if taken {
            return Err(OperationError::Conflict(ConflictKind::DisplayNameTaken));
        }
        let renamed = tx.execute(
            "UPDATE players SET display_name = ?1 WHERE id = ?2",
            params![name, player.id],
        );
        match renamed {
            Ok(n) => changed |= n > 0,
            Err(e) => {
                return Err(match player_unique_violation(&e) {
                    Some(kind) => OperationError::Conflict(kind),
                    None => e.into(),
                });
            }
        }
    }

    if let Some(tribe) = new_tribe {
        let tribe_id = tribe.as_ref().map(|t| t.id);
        if tribe_id != player.tribe_id {
            let n = tx.execute(
                "UPDATE players SET tribe = ?1 WHERE id = ?2",
                params![tribe_id, player.id],
            )?;
            changed |= n > 0;
            if let Some(tribe) = &tribe {
                log::debug!("Moved player '{player}' to tribe '{tribe}'");
            }
        }
    }

    tx.commit()?;
    Ok(changed)
}

/// Delete a player. Other players' tribe pointers are unaffected.
pub fn delete_player(
    conn: &Connection,
    scope: Scope,
    target: PlayerRef<'_>,
) -> Result<bool, OperationError> {
    logged("delete_player", remove_player(conn, scope, &target))
}

fn remove_player(conn: &Connection, scope: Scope, target: &PlayerRef<'_>) -> Result<bool, OperationError> {
    let season_id = require_season(conn, scope)?;
    let player = require_player(conn, season_id, target)?;
    let removed = conn.execute("DELETE FROM players WHERE id = ?1", params![player.id])?;
    if removed > 0 {
        log::info!("Deleted player '{player}'");
    }
    Ok(removed > 0)
}

// ── Resolution Helpers ──────────────────────────────────────────────────────

fn require_season(conn: &Connection, scope: Scope) -> Result<i64, OperationError> {
    season_for_scope(conn, scope)?
        .map(|s| s.id)
        .ok_or_else(|| OperationError::not_found(Entity::Season, scope))
}

/// Resolve a tribe of `season_id`. Records are re-read by id so a tribe of
/// another season, or one deleted since it was fetched, does not resolve.
fn require_tribe(conn: &Connection, season_id: i64, target: &TribeRef<'_>) -> Result<Tribe, OperationError> {
    let key = match target {
        TribeRef::Record(tribe) => TribeKey::Id(tribe.id),
        TribeRef::Key(key) => key.clone(),
    };
    tribes_in_season(conn, season_id, &TribeFilter::Key(key.clone()))?
        .into_iter()
        .next()
        .ok_or_else(|| OperationError::not_found(Entity::Tribe, key))
}

/// Resolve a player of `season_id`, re-reading records by id.
fn require_player(
    conn: &Connection,
    season_id: i64,
    target: &PlayerRef<'_>,
) -> Result<Player, OperationError> {
    let key = match target {
        PlayerRef::Record(player) => PlayerKey::Id(player.id),
        PlayerRef::Key(key) => key.clone(),
    };
    players_in_season(conn, season_id, &PlayerFilter::Key(key.clone()))?
        .into_iter()
        .next()
        .ok_or_else(|| OperationError::not_found(Entity::Player, key))
}
