use std::path::{Path, PathBuf};

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use crate::CliError;
use crate::settings;

/// Show the settings file and where the database path comes from.
pub(crate) fn run_config_show(db_flag: Option<PathBuf>) {
    let path = settings::settings_path();
    let (db_path, source) = settings::resolve_db_path(db_flag);

    log::info!(
        "{}",
        "castaway Configuration".if_supports_color(Stdout, |t| t.bold()),
    );
    crate::commands::log_blank();

    if path.exists() {
        log::info!(
            "  Settings file: {} {}",
            path.display().if_supports_color(Stdout, |t| t.cyan()),
            "(exists)".if_supports_color(Stdout, |t| t.green()),
        );
    } else {
        log::info!(
            "  Settings file: {} {}",
            path.display().if_supports_color(Stdout, |t| t.cyan()),
            "(not found)".if_supports_color(Stdout, |t| t.dimmed()),
        );
    }

    let source_str = format!("({})", source);
    log::info!(
        "  Database:      {} {}",
        db_path.display().if_supports_color(Stdout, |t| t.cyan()),
        source_str.if_supports_color(Stdout, |t| t.dimmed()),
    );
    if !db_path.exists() {
        log::info!(
            "                 {}",
            "not created yet".if_supports_color(Stdout, |t| t.yellow()),
        );
    }

    if let Some(contents) = settings::load_settings_string() {
        crate::commands::log_blank();
        for line in contents.lines() {
            log::info!("  {}", line.if_supports_color(Stdout, |t| t.dimmed()));
        }
    }
}

/// Print the settings file path.
pub(crate) fn run_config_path() {
    log::info!("{}", settings::settings_path().display());
}

/// Save the database path to settings.toml.
pub(crate) fn run_config_set_db(path: &Path) -> Result<(), CliError> {
    let path = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };
    let settings = settings::save_db_path(&path)
        .map_err(|e| CliError::config(format!("Failed to save settings: {}", e)))?;
    log::info!(
        "{} Database path saved to {}",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        settings.display().if_supports_color(Stdout, |t| t.cyan()),
    );
    Ok(())
}
