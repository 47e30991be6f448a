//! Tribe display strings.
//!
//! A tribe is shown by its bare name for the first iteration and with a
//! version-like suffix after each swap:
//! ```text
//! Foxes        (iteration 1)
//! Foxes 2.0    (iteration 2)
//! ```
//! Frontends accept the same string back from users (autocomplete values,
//! command arguments), so parsing must invert formatting exactly.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Colour assigned to tribes created without one (light grey).
pub const DEFAULT_TRIBE_COLOR: &str = "d3d3d3";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TribeNameError {
    #[error("tribe name is empty")]
    Empty,
    #[error("tribe iteration must be at least 1, got {0}")]
    InvalidIteration(i64),
    #[error("'{0}' would not read back as the same tribe")]
    Ambiguous(String),
}

/// A tribe's (name, iteration) pair.
///
/// # Examples
///
/// ```
/// use castaway_catalog::TribeName;
///
/// let parsed: TribeName = "Foxes".parse().unwrap();
/// assert_eq!(parsed, TribeName::new("Foxes", 1));
///
/// let parsed: TribeName = "Blue Foxes 3.0".parse().unwrap();
/// assert_eq!(parsed, TribeName::new("Blue Foxes", 3));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TribeName {
    pub name: String,
    pub iteration: i64,
}

impl TribeName {
    pub fn new(name: impl Into<String>, iteration: i64) -> Self {
        Self {
            name: name.into(),
            iteration,
        }
    }

    /// Check that this pair renders to a string that parses back to itself.
    ///
    /// Rejects empty names, iterations below 1, and names that carry their
    /// own `" N.0"` suffix or surrounding whitespace.
    ///
    /// ```
    /// use castaway_catalog::{TribeName, TribeNameError};
    ///
    /// assert!(TribeName::new("Foxes", 2).validate().is_ok());
    /// assert_eq!(
    ///     TribeName::new("Foxes 2.0", 1).validate(),
    ///     Err(TribeNameError::Ambiguous("Foxes 2.0".into())),
    /// );
    /// ```
    pub fn validate(&self) -> Result<(), TribeNameError> {
        if self.name.trim().is_empty() {
            return Err(TribeNameError::Empty);
        }
        if self.iteration < 1 {
            return Err(TribeNameError::InvalidIteration(self.iteration));
        }
        let rendered = self.to_string();
        match rendered.parse::<TribeName>() {
            Ok(parsed) if parsed == *self => Ok(()),
            _ => Err(TribeNameError::Ambiguous(rendered)),
        }
    }
}

impl fmt::Display for TribeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.iteration == 1 {
            f.write_str(&self.name)
        } else {
            write!(f, "{} {}.0", self.name, self.iteration)
        }
    }
}

/// Parses a display string back into its (name, iteration) pair.
impl FromStr for TribeName {
    type Err = TribeNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(TribeNameError::Empty);
        }

        if let Some((name, iteration)) = split_iteration_suffix(trimmed) {
            if iteration < 1 {
                return Err(TribeNameError::InvalidIteration(iteration));
            }
            return Ok(Self::new(name, iteration));
        }

        Ok(Self::new(trimmed, 1))
    }
}

/// Split `"Name 2.0"` into `("Name", 2)`. Returns `None` when there is no
/// whitespace-separated `<digits>.0` suffix or nothing precedes it.
fn split_iteration_suffix(s: &str) -> Option<(&str, i64)> {
    let (head, last) = s.rsplit_once(char::is_whitespace)?;
    let digits = last.strip_suffix(".0")?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let name = head.trim_end();
    if name.is_empty() {
        return None;
    }
    let iteration = digits.parse().ok()?;
    Some((name, iteration))
}

/// Whether `color` is exactly six hex digits (no `#`).
pub fn is_valid_color(color: &str) -> bool {
    color.len() == 6 && color.bytes().all(|b| b.is_ascii_hexdigit())
}
