//! SQLite persistence layer for castaway seasons, tribes, and players.
//!
//! Provides schema creation, the lookup API, and add/edit/delete operations
//! backed by SQLite (via rusqlite with bundled feature). Operations return
//! an [`OperationError`] whose kind tells callers which message to show.

pub mod error;
pub mod operations;
pub mod queries;
pub mod schema;

pub use error::{ConflictKind, Entity, ErrorKind, OperationError};
pub use operations::{
    NewPlayer, NewTribe, PlayerEdit, PlayerRef, SeasonOutcome, TribeAssignment, TribeEdit,
    TribeEditReport, TribeRef, activate_season, add_player, add_season, add_tribe, add_user,
    advance_episode, deactivate_season, delete_player, delete_season, delete_tribe, edit_player,
    edit_tribe,
};
pub use queries::{
    PlayerFilter, PlayerKey, Scope, TribeFilter, TribeKey, find_active_season, find_player,
    find_season, find_season_by_id, find_tribe, find_user, find_user_by_id, list_seasons,
    resolve_scope,
};
pub use schema::{SchemaError, SetupReport, open_database, open_memory, setup};

pub use rusqlite::Connection;
