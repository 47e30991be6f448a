//! Domain record types for castaway seasons, tribes, players, and users.
//!
//! This crate defines the value records handed out by `castaway-db` without
//! any database dependencies, plus the tribe display-string conventions
//! (`"Foxes"`, `"Foxes 2.0"`) shared by every frontend.

pub mod tribe_name;
pub mod types;

pub use tribe_name::{DEFAULT_TRIBE_COLOR, TribeName, TribeNameError, is_valid_color};
pub use types::*;
