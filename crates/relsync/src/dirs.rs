use std::path::PathBuf;

use etcetera::BaseStrategy;

/// Name of the configuration file looked up in every location
pub const CONFIG_FILE_NAME: &str = "relsync.toml";

/// Per-user configuration file, e.g. `~/.config/relsync/relsync.toml`
pub fn user_config_file() -> Option<PathBuf> {
    let strategy = etcetera::choose_base_strategy().ok()?;
    Some(strategy.config_dir().join("relsync").join(CONFIG_FILE_NAME))
}
