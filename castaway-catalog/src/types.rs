//! Data model types for the castaway store.
//!
//! These types mirror the persistent schema: users, seasons, tribes, and
//! players. They are produced by `castaway-db` at the storage boundary and
//! are otherwise plain values.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::tribe_name::TribeName;

// ── User ────────────────────────────────────────────────────────────────────

/// A chat-platform account as last observed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    /// Stable external account id assigned by the platform.
    pub account_id: i64,
    pub label: Option<String>,
}

// ── Season ──────────────────────────────────────────────────────────────────

/// One run of the game, owned by a single server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Season {
    pub id: i64,
    pub server_id: i64,
    pub name: String,
    pub episode: i64,
    pub status: SeasonStatus,
}

impl Season {
    pub fn is_active(&self) -> bool {
        self.status == SeasonStatus::Active
    }
}

/// Activation status of a season. At most one season is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeasonStatus {
    Active,
    #[default]
    Inactive,
}

impl SeasonStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }

    /// Anything other than `"active"` reads as inactive.
    pub fn from_str_loose(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "active" => Self::Active,
            _ => Self::Inactive,
        }
    }
}

impl fmt::Display for SeasonStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Tribe ───────────────────────────────────────────────────────────────────

/// A named sub-group within a season.
///
/// Equality and hashing use the row id only: two snapshots of the same row
/// taken before and after an edit compare equal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tribe {
    pub id: i64,
    pub name: String,
    /// Swap generation. 1 is the original tribe.
    pub iteration: i64,
    pub season_id: i64,
    /// Six hex digits, no leading `#`.
    pub color: String,
    /// Sort key and swap ordering: later tribes carry higher values.
    pub precedence: i64,
}

impl Tribe {
    /// The (name, iteration) pair identifying this tribe within its season.
    pub fn tribe_name(&self) -> TribeName {
        TribeName::new(self.name.clone(), self.iteration)
    }

    /// Display string: the bare name for iteration 1, `"{name} {iteration}.0"` otherwise.
    pub fn display_name(&self) -> String {
        self.tribe_name().to_string()
    }

    /// Whether moving a player from `self` to `next` goes forward in swap order.
    pub fn precedes(&self, next: &Tribe) -> bool {
        self.precedence < next.precedence
    }
}

impl PartialEq for Tribe {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Tribe {}

impl Hash for Tribe {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Tribe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.tribe_name(), f)
    }
}

/// Whether reassigning a player from `from` to `to` is a forward swap.
///
/// A tribe-less player can move anywhere. Clients warn, but do not refuse,
/// when this returns false.
pub fn is_forward_swap(from: Option<&Tribe>, to: &Tribe) -> bool {
    match from {
        Some(old) => old.precedes(to),
        None => true,
    }
}

// ── Player ──────────────────────────────────────────────────────────────────

/// A season-scoped participant bound to one user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: i64,
    /// In-game identity, unique within the season.
    pub display_name: String,
    pub user_id: i64,
    pub season_id: i64,
    pub tribe_id: Option<i64>,
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name)
    }
}
