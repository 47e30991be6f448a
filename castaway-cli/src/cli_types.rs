//! CLI type definitions: command enums and argument structs.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "castaway")]
#[command(about = "Manage seasons, tribes, and players for a castaway game", long_about = None)]
pub(crate) struct Cli {
    /// Path to the database file (overrides CASTAWAY_DB and settings.toml)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Print records as JSON instead of formatted text
    #[arg(long, global = true)]
    pub json: bool,

    /// Only show warnings and errors (suppress normal output)
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Enable verbose/debug logging (timestamps + debug-level messages)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Selects the season a command acts on.
#[derive(Args, Clone, Copy)]
pub(crate) struct SeasonArgs {
    /// Server owning the season (defaults to the active season)
    #[arg(short, long)]
    pub server: Option<i64>,
}

/// Selects one player. The first supplied option wins: id, name, user, account.
#[derive(Args, Clone, Default)]
pub(crate) struct PlayerSelector {
    /// Player row id
    #[arg(long)]
    pub id: Option<i64>,

    /// Player display name
    #[arg(long)]
    pub name: Option<String>,

    /// User row id the player is bound to
    #[arg(long)]
    pub user: Option<i64>,

    /// Platform account id of the player's user
    #[arg(long)]
    pub account: Option<i64>,
}

/// Selects one tribe, by id or by display string such as "Foxes 2.0".
#[derive(Args, Clone, Default)]
pub(crate) struct TribeSelector {
    /// Tribe display string ("Name" or "Name 2.0")
    pub tribe: Option<String>,

    /// Tribe row id
    #[arg(long = "tribe-id")]
    pub id: Option<i64>,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Register chat-platform users
    User {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Manage seasons (one per server)
    Season {
        #[command(subcommand)]
        action: SeasonAction,
    },

    /// Manage the tribes of a season
    Tribe {
        #[command(subcommand)]
        action: TribeAction,
    },

    /// Manage the players of a season
    Player {
        #[command(subcommand)]
        action: PlayerAction,
    },

    /// Show or change the settings file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub(crate) enum UserAction {
    /// Add a user, or update its label
    Add {
        /// Platform account id
        account: i64,

        /// Human-readable label (e.g. the account's current handle)
        label: String,
    },

    /// Show a registered user
    Show {
        /// Platform account id
        account: i64,
    },
}

#[derive(Subcommand)]
pub(crate) enum SeasonAction {
    /// Register the season for a server, renaming it if it exists
    Register {
        /// Server id
        server: i64,

        /// Season name
        name: String,
    },

    /// Show one season
    Show {
        #[command(flatten)]
        season: SeasonArgs,
    },

    /// List all seasons
    List,

    /// Make a server's season the only active one
    Activate {
        /// Server id
        server: i64,
    },

    /// Mark a server's season inactive
    Deactivate {
        /// Server id
        server: i64,
    },

    /// Advance the episode counter
    Episode {
        #[command(flatten)]
        season: SeasonArgs,
    },

    /// Delete a season with all of its tribes and players
    Delete {
        /// Server id
        server: i64,

        /// Confirm the deletion (required; without this, shows a preview only)
        #[arg(long)]
        confirm: bool,
    },
}

#[derive(Subcommand)]
pub(crate) enum TribeAction {
    /// Create a tribe
    Add {
        /// Tribe display string ("Name" or "Name 2.0")
        tribe: String,

        #[command(flatten)]
        season: SeasonArgs,

        /// Colour as six hex digits
        #[arg(long, default_value = castaway_catalog::DEFAULT_TRIBE_COLOR)]
        color: String,

        /// Swap order; later swaps use higher values
        #[arg(long, default_value = "1")]
        precedence: i64,
    },

    /// List tribes
    List {
        #[command(flatten)]
        season: SeasonArgs,

        #[command(flatten)]
        select: TribeSelector,

        /// Only the tribe of the player with this display name
        #[arg(long)]
        player: Option<String>,

        /// Only tribes with this precedence
        #[arg(long)]
        order: Option<i64>,
    },

    /// Edit a tribe's name, iteration, colour, or precedence
    Edit {
        #[command(flatten)]
        select: TribeSelector,

        #[command(flatten)]
        season: SeasonArgs,

        /// New name
        #[arg(long)]
        rename: Option<String>,

        /// New iteration
        #[arg(long)]
        iteration: Option<i64>,

        /// New colour as six hex digits
        #[arg(long)]
        color: Option<String>,

        /// New precedence
        #[arg(long)]
        precedence: Option<i64>,
    },

    /// Delete a tribe; its players become tribe-less
    Delete {
        #[command(flatten)]
        select: TribeSelector,

        #[command(flatten)]
        season: SeasonArgs,
    },
}

#[derive(Subcommand)]
pub(crate) enum PlayerAction {
    /// Add a player for a registered user
    Add {
        /// Display name, unique within the season
        display_name: String,

        /// Platform account id of the user
        account: i64,

        #[command(flatten)]
        season: SeasonArgs,

        /// Tribe to join ("Name" or "Name 2.0")
        #[arg(long)]
        tribe: Option<String>,
    },

    /// List players
    List {
        #[command(flatten)]
        season: SeasonArgs,

        #[command(flatten)]
        select: PlayerSelector,

        /// Only players of the tribe with this id
        #[arg(long = "tribe-id")]
        tribe: Option<i64>,
    },

    /// Rename a player or move them to another tribe
    Edit {
        #[command(flatten)]
        select: PlayerSelector,

        #[command(flatten)]
        season: SeasonArgs,

        /// New display name
        #[arg(long)]
        rename: Option<String>,

        /// Tribe to move to ("Name" or "Name 2.0")
        #[arg(long, conflicts_with = "no_tribe")]
        tribe: Option<String>,

        /// Leave the player without a tribe
        #[arg(long)]
        no_tribe: bool,
    },

    /// Delete a player
    Delete {
        #[command(flatten)]
        select: PlayerSelector,

        #[command(flatten)]
        season: SeasonArgs,
    },
}

#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Show the settings file and the resolved database path
    Show,

    /// Print the settings file path
    Path,

    /// Save the database path in settings.toml
    SetDb {
        /// Database file path
        path: PathBuf,
    },
}
