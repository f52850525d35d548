//! Per-user directories for the log, config file and downloaded frames.
//!
//! Unix uses the XDG layout under `$HOME` on macOS too, so every platform
//! except Windows keeps its files in the same place.

use std::path::PathBuf;

const APP_DIR: &str = "wxloop";

/// Log file and UI session state.
pub fn data_dir() -> PathBuf {
    base(Kind::Data).join(APP_DIR)
}

/// Holds `config.toml`.
pub fn config_dir() -> PathBuf {
    base(Kind::Config).join(APP_DIR)
}

/// Default parent of the frames directory.
pub fn cache_dir() -> PathBuf {
    base(Kind::Cache).join(APP_DIR)
}

#[derive(Clone, Copy)]
enum Kind {
    Data,
    Config,
    Cache,
}

#[cfg(unix)]
fn base(kind: Kind) -> PathBuf {
    let home = dirs::home_dir().unwrap_or_else(std::env::temp_dir);
    match kind {
        Kind::Data => home.join(".local").join("share"),
        Kind::Config => home.join(".config"),
        Kind::Cache => home.join(".cache"),
    }
}

#[cfg(not(unix))]
fn base(kind: Kind) -> PathBuf {
    let dir = match kind {
        Kind::Data => dirs::data_local_dir(),
        Kind::Config => dirs::config_dir(),
        Kind::Cache => dirs::cache_dir(),
    };
    dir.unwrap_or_else(std::env::temp_dir)
}
