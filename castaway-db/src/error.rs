//! Failure taxonomy shared by every lookup and mutation.

use std::fmt;

use castaway_catalog::TribeNameError;
use rusqlite::ErrorCode;
use thiserror::Error;

/// Which kind of record a `NotFound` refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entity {
    User,
    Season,
    Tribe,
    Player,
}

impl Entity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Season => "season",
            Self::Tribe => "tribe",
            Self::Player => "player",
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which uniqueness rule a `Conflict` would have broken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConflictKind {
    /// (name, iteration, season) already names a tribe.
    TribeExists,
    /// The display name is used by another player in the season.
    DisplayNameTaken,
    /// The user already has a player in the season.
    UserAlreadyPlayer,
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::TribeExists => "tribe already exists in this season",
            Self::DisplayNameTaken => "display name already taken in this season",
            Self::UserAlreadyPlayer => "user is already a player in this season",
        })
    }
}

/// Coarse classification of an `OperationError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    Invalid,
    Unexpected,
}

#[derive(Debug, Error)]
pub enum OperationError {
    #[error("{entity} not found ({key})")]
    NotFound { entity: Entity, key: String },
    #[error("conflict: {0}")]
    Conflict(ConflictKind),
    /// A tribe (name, iteration) whose display string would not parse back.
    #[error("invalid tribe name: {0}")]
    InvalidTribeName(#[from] TribeNameError),
    /// Storage-level failure. The message deliberately omits the source;
    /// it is logged where the operation returns.
    #[error("unexpected storage error")]
    Unexpected(#[from] rusqlite::Error),
}

impl OperationError {
    pub fn not_found(entity: Entity, key: impl fmt::Display) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::InvalidTribeName(_) => ErrorKind::Invalid,
            Self::Unexpected(_) => ErrorKind::Unexpected,
        }
    }

    /// The entity for `NotFound`, if this is one.
    pub fn missing_entity(&self) -> Option<Entity> {
        match self {
            Self::NotFound { entity, .. } => Some(*entity),
            _ => None,
        }
    }

    /// The conflict for `Conflict`, if this is one.
    pub fn conflict(&self) -> Option<ConflictKind> {
        match self {
            Self::Conflict(kind) => Some(*kind),
            _ => None,
        }
    }
}

/// Log an operation's failure at a level matching its kind, then hand it back.
///
/// Every public mutation funnels its result through here so storage errors
/// are recorded with context exactly once.
pub(crate) fn logged<T>(op: &str, result: Result<T, OperationError>) -> Result<T, OperationError> {
    if let Err(e) = &result {
        match e {
            OperationError::NotFound { entity, key } => {
                log::warn!("{op}: {entity} not found by {key}");
            }
            OperationError::Conflict(kind) => {
                log::info!("{op}: rejected, {kind}");
            }
            OperationError::InvalidTribeName(e) => {
                log::info!("{op}: rejected, {e}");
            }
            OperationError::Unexpected(source) => {
                log::error!("{op}: {source}");
            }
        }
    }
    result
}

/// Map a UNIQUE constraint failure on `players` to the rule it broke.
///
/// SQLite names the offending columns in the message, e.g.
/// `UNIQUE constraint failed: players.display_name, players.season`.
pub(crate) fn player_unique_violation(err: &rusqlite::Error) -> Option<ConflictKind> {
    let message = unique_violation_message(err)?;
    if message.contains("players.display_name") {
        Some(ConflictKind::DisplayNameTaken)
    } else if message.contains("players.user") {
        Some(ConflictKind::UserAlreadyPlayer)
    } else {
        None
    }
}

/// Whether `err` is a UNIQUE violation on the tribe (name, iteration, season) key.
pub(crate) fn is_tribe_unique_violation(err: &rusqlite::Error) -> bool {
    unique_violation_message(err).is_some_and(|m| m.contains("tribes.name"))
}

fn unique_violation_message(err: &rusqlite::Error) -> Option<&str> {
    match err {
        rusqlite::Error::SqliteFailure(e, message)
            if e.code == ErrorCode::ConstraintViolation
                && e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            Some(message.as_deref().unwrap_or(""))
        }
        _ => None,
    }
}
