use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Optional settings loaded from a TOML file. Everything has a working
/// default, so running without a config file is the common case.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Path to the yt-dlp binary; defaults to whatever is on PATH
    pub ytdlp_path: Option<String>,
    /// Default minimum format height for `info`, overridable per call
    pub min_height: Option<u32>,
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("Invalid config in {}", path.display()))
    }
}

/// Load the config from the first location that exists: the explicit
/// `--config` path, `VIDGRAB_CONFIG`, `$XDG_CONFIG_HOME/vidgrab/config.toml`,
/// then `~/.config/vidgrab/config.toml`. No file means defaults.
pub fn load(explicit: Option<&str>) -> Result<Config> {
    match discover(explicit) {
        Some(path) => Config::from_file(&path),
        None => Ok(Config::default()),
    }
}

fn discover(explicit: Option<&str>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(PathBuf::from(path));
    }

    if let Ok(path) = std::env::var("VIDGRAB_CONFIG") {
        return Some(PathBuf::from(path));
    }

    if let Ok(xdg_config_home) = std::env::var("XDG_CONFIG_HOME") {
        let config_path = Path::new(&xdg_config_home)
            .join("vidgrab")
            .join("config.toml");
        if config_path.exists() {
            return Some(config_path);
        }
    }

    if let Some(home) = dirs::home_dir() {
        let config_path = home.join(".config").join("vidgrab").join("config.toml");
        if config_path.exists() {
            return Some(config_path);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_full_config() {
        let config: Config =
            toml::from_str("ytdlp_path = \"/opt/yt-dlp\"\nmin_height = 720\n").unwrap();
        assert_eq!(config.ytdlp_path.as_deref(), Some("/opt/yt-dlp"));
        assert_eq!(config.min_height, Some(720));
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.ytdlp_path.is_none());
        assert!(config.min_height.is_none());
    }

    #[test]
    fn from_file_reads_and_parses() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "min_height = 1080").unwrap();
        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.min_height, Some(1080));
    }

    #[test]
    fn from_file_missing_path_is_an_error() {
        assert!(Config::from_file(Path::new("/nonexistent/config.toml")).is_err());
    }
}
