//! User-facing text for operation failures.
//!
//! Every failure cause gets its own sentence so the person at the keyboard
//! can tell a missing tribe from a taken name without reading the log.

use castaway_db::{ConflictKind, Entity, OperationError};

pub(crate) fn describe(err: &OperationError) -> String {
    match err {
        OperationError::NotFound { entity, key } => not_found(*entity, key),
        OperationError::Conflict(kind) => conflict(*kind).to_string(),
        OperationError::InvalidTribeName(e) => {
            format!("That tribe name cannot be used: {e}.")
        }
        OperationError::Unexpected(_) => {
            "Something went wrong in the database. Re-run with --verbose for details.".to_string()
        }
    }
}

fn not_found(entity: Entity, key: &str) -> String {
    match entity {
        Entity::User => format!(
            "No user is registered for {key}. Add them with 'castaway user add' first."
        ),
        Entity::Season => format!(
            "No season is registered for {key}. Create one with 'castaway season register'."
        ),
        Entity::Tribe => format!("There is no {key} in this season."),
        Entity::Player => format!("No player in this season matches {key}."),
    }
}

fn conflict(kind: ConflictKind) -> &'static str {
    match kind {
        ConflictKind::TribeExists => {
            "That tribe already exists in this season. Use a new iteration for a swap."
        }
        ConflictKind::DisplayNameTaken => {
            "That display name is already taken in this season. Pick another one."
        }
        ConflictKind::UserAlreadyPlayer => "That user is already playing in this season.",
    }
}
