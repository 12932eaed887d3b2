use std::{
    fs::File,
    io::Read,
    path::{Path, PathBuf},
};

use tracing::debug;

use super::error::{ConfigError, ConfigResult};

/// Environment variable that points at a config file and wins over every
/// other location.
pub const CONFIG_PATH_VAR: &str = "LEARNPATH_CONFIG";

const LOCAL_CONFIG: &str = "./config.toml";

/// Resolve the config file. Order: `LEARNPATH_CONFIG`, then `./config.toml`
/// when `use_local`, then the per-user config directory, then `./config.toml`.
pub fn find_config_file(use_local: bool) -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_PATH_VAR).filter(|p| !p.is_empty()) {
        return PathBuf::from(path);
    }

    if use_local {
        return PathBuf::from(LOCAL_CONFIG);
    }

    user_config_file()
        .filter(|path| path.exists())
        .unwrap_or_else(|| PathBuf::from(LOCAL_CONFIG))
}

fn user_config_file() -> Option<PathBuf> {
    #[cfg(unix)]
    let base = std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config"));
    #[cfg(windows)]
    let base = std::env::var_os("APPDATA").map(PathBuf::from);
    #[cfg(not(any(unix, windows)))]
    let base: Option<PathBuf> = None;

    base.map(|dir| dir.join(crate::APPLICATION_NAME).join("config.toml"))
}

pub fn read_config(use_local: bool) -> ConfigResult<Vec<u8>> {
    read_config_from(&find_config_file(use_local))
}

pub fn read_config_from(filename: &Path) -> ConfigResult<Vec<u8>> {
    tracing::trace!("looking for config at: {}", filename.display());
    if !filename.exists() {
        return Err(ConfigError::ConfigNotFound(filename.to_path_buf()));
    }

    let filename = filename.canonicalize()?;
    debug!("using {} as configuration file", filename.display());

    let mut buf = Vec::new();
    File::open(filename)?.read_to_end(&mut buf)?;
    Ok(buf)
}
