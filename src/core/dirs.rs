use crate::core::error::BarcoError;
use std::path::PathBuf;

pub fn get_config_directory() -> Result<PathBuf, BarcoError> {
    let base = match std::env::consts::OS {
        "linux" | "freebsd" | "netbsd" | "openbsd" => std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .ok()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config"))),
        "macos" => dirs::home_dir().map(|home| home.join("Library/Application Support")),
        _ => dirs::config_dir(),
    };

    base.map(|dir| dir.join("barco-bill"))
        .ok_or(BarcoError::ConfigDirectoryNotFound)
}

pub fn get_config_file() -> Result<PathBuf, BarcoError> {
    Ok(get_config_directory()?.join("config.json"))
}
