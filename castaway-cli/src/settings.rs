//! Settings file location and database path resolution.
//!
//! The settings file is `~/.config/castaway/settings.toml`; the only key the
//! CLI reads is `database.path`.

use std::io;
use std::path::{Path, PathBuf};

/// Environment variable that overrides the saved database path.
pub(crate) const DB_ENV_VAR: &str = "CASTAWAY_DB";

/// Canonical path to the settings file: `~/.config/castaway/settings.toml`.
pub(crate) fn settings_path() -> PathBuf {
    let config = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    config.join("castaway").join("settings.toml")
}

/// Where the database lives when nothing else says otherwise.
pub(crate) fn default_db_path() -> PathBuf {
    let data = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
    data.join("castaway").join("castaway.db")
}

/// Where a resolved database path came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DbPathSource {
    Flag,
    Env,
    Settings,
    Default,
}

impl std::fmt::Display for DbPathSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Flag => "--db flag",
            Self::Env => DB_ENV_VAR,
            Self::Settings => "settings.toml",
            Self::Default => "default",
        })
    }
}

/// Resolve the database path using a priority chain:
///
/// 1. `--db` flag
/// 2. `CASTAWAY_DB` environment variable
/// 3. Saved `database.path` in `settings.toml`
/// 4. `<data dir>/castaway/castaway.db`
pub(crate) fn resolve_db_path(flag: Option<PathBuf>) -> (PathBuf, DbPathSource) {
    let env = std::env::var_os(DB_ENV_VAR).map(PathBuf::from);
    pick_db_path(flag, env, load_db_path(&settings_path()))
}

fn pick_db_path(
    flag: Option<PathBuf>,
    env: Option<PathBuf>,
    saved: Option<PathBuf>,
) -> (PathBuf, DbPathSource) {
    if let Some(p) = flag {
        return (p, DbPathSource::Flag);
    }
    if let Some(p) = env.filter(|p| !p.as_os_str().is_empty()) {
        return (p, DbPathSource::Env);
    }
    if let Some(p) = saved {
        return (p, DbPathSource::Settings);
    }
    (default_db_path(), DbPathSource::Default)
}

/// Read `database.path` from a settings file, if set.
fn load_db_path(settings: &Path) -> Option<PathBuf> {
    let contents = std::fs::read_to_string(settings).ok()?;
    let doc: toml::Value = contents.parse().ok()?;
    let path = doc.get("database")?.get("path")?.as_str()?;
    if path.is_empty() {
        None
    } else {
        Some(PathBuf::from(path))
    }
}

/// Save the database path in `settings.toml`.
pub(crate) fn save_db_path(path: &Path) -> io::Result<PathBuf> {
    let settings = settings_path();
    write_db_path(&settings, path)?;
    Ok(settings)
}

/// Surgical update of `[database] path` that keeps every other key.
fn write_db_path(settings: &Path, path: &Path) -> io::Result<()> {
    let mut doc: toml::Value = match std::fs::read_to_string(settings) {
        Ok(contents) => contents
            .parse()
            .unwrap_or_else(|_| toml::Value::Table(Default::default())),
        Err(_) => toml::Value::Table(Default::default()),
    };

    let table = doc
        .as_table_mut()
        .ok_or_else(|| io::Error::other("settings.toml root is not a table"))?;
    let database = table
        .entry("database")
        .or_insert_with(|| toml::Value::Table(Default::default()))
        .as_table_mut()
        .ok_or_else(|| io::Error::other("[database] is not a table"))?;
    database.insert(
        "path".to_string(),
        toml::Value::String(path.to_string_lossy().into_owned()),
    );

    if let Some(parent) = settings.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let serialized = toml::to_string_pretty(&doc).map_err(io::Error::other)?;
    let tmp = settings.with_extension("toml.tmp");
    std::fs::write(&tmp, &serialized)?;
    std::fs::rename(&tmp, settings)?;
    Ok(())
}

/// The settings file pretty-printed for display.
pub(crate) fn load_settings_string() -> Option<String> {
    let contents = std::fs::read_to_string(settings_path()).ok()?;
    let doc: toml::Value = contents.parse().ok()?;
    toml::to_string_pretty(&doc).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_beats_everything() {
        let (path, source) = pick_db_path(
            Some("flag.db".into()),
            Some("env.db".into()),
            Some("saved.db".into()),
        );
        assert_eq!(path, PathBuf::from("flag.db"));
        assert_eq!(source, DbPathSource::Flag);
    }

    #[test]
    fn env_beats_settings() {
        let (path, source) = pick_db_path(None, Some("env.db".into()), Some("saved.db".into()));
        assert_eq!(path, PathBuf::from("env.db"));
        assert_eq!(source, DbPathSource::Env);
    }

    #[test]
    fn empty_env_is_ignored() {
        let (path, source) = pick_db_path(None, Some(PathBuf::new()), Some("saved.db".into()));
        assert_eq!(path, PathBuf::from("saved.db"));
        assert_eq!(source, DbPathSource::Settings);
    }

    #[test]
    fn falls_back_to_default() {
        let (path, source) = pick_db_path(None, None, None);
        assert_eq!(source, DbPathSource::Default);
        assert!(path.ends_with("castaway/castaway.db"));
    }

    #[test]
    fn write_then_load_preserves_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let settings = dir.path().join("castaway").join("settings.toml");
        std::fs::create_dir_all(settings.parent().unwrap()).unwrap();
        std::fs::write(&settings, "[bot]\nprefix = \"!\"\n").unwrap();

        write_db_path(&settings, Path::new("/tmp/game.db")).unwrap();

        assert_eq!(load_db_path(&settings), Some(PathBuf::from("/tmp/game.db")));
        let contents = std::fs::read_to_string(&settings).unwrap();
        assert!(contents.contains("prefix"));
    }

    #[test]
    fn missing_or_empty_path_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let settings = dir.path().join("settings.toml");
        assert_eq!(load_db_path(&settings), None);

        std::fs::write(&settings, "[database]\npath = \"\"\n").unwrap();
        assert_eq!(load_db_path(&settings), None);
    }
}
