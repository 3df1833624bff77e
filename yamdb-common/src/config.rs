//! Configuration loading and data folder resolution

use crate::error::{Error, Result};
use crate::mail::MailConfig;
use crate::validate::DEFAULT_MIN_YEAR;
use std::path::PathBuf;

/// Service configuration assembled at startup and passed explicitly to
/// the components that need it.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub port: u16,
    pub database_path: PathBuf,
    /// Lower bound for Title.year; the upper bound is always the current
    /// calendar year.
    pub min_title_year: i64,
    pub token_ttl_hours: i64,
    pub mail: MailConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            database_path: default_data_dir().join("yamdb.db"),
            min_title_year: DEFAULT_MIN_YEAR,
            token_ttl_hours: crate::token::DEFAULT_TOKEN_TTL_HOURS,
            mail: MailConfig::default(),
        }
    }
}

/// Data folder resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. TOML config file
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_data_dir(cli_arg: Option<&str>, env_var_name: &str) -> Result<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Ok(PathBuf::from(path));
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        return Ok(PathBuf::from(path));
    }

    // Priority 3: TOML config file
    if let Ok(config_path) = locate_config_file() {
        if let Ok(toml_content) = std::fs::read_to_string(&config_path) {
            if let Ok(config) = toml::from_str::<toml::Value>(&toml_content) {
                if let Some(data_dir) = config.get("data_dir").and_then(|v| v.as_str()) {
                    return Ok(PathBuf::from(data_dir));
                }
            }
        }
    }

    // Priority 4: OS-dependent compiled default
    Ok(default_data_dir())
}

/// Get default configuration file path for the platform
fn locate_config_file() -> Result<PathBuf> {
    if cfg!(target_os = "linux") {
        // Try ~/.config/yamdb/config.toml first, then /etc/yamdb/config.toml
        if let Some(path) = dirs::config_dir().map(|d| d.join("yamdb").join("config.toml")) {
            if path.exists() {
                return Ok(path);
            }
        }
        let system_config = PathBuf::from("/etc/yamdb/config.toml");
        if system_config.exists() {
            return Ok(system_config);
        }
        return Err(Error::Config("No config file found".to_string()));
    }

    let config_path = dirs::config_dir()
        .map(|d| d.join("yamdb").join("config.toml"))
        .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))?;

    if config_path.exists() {
        Ok(config_path)
    } else {
        Err(Error::Config(format!(
            "Config file not found: {:?}",
            config_path
        )))
    }
}

/// Get OS-dependent default data folder path
pub fn default_data_dir() -> PathBuf {
    if cfg!(target_os = "linux") {
        dirs::data_local_dir()
            .map(|d| d.join("yamdb"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/yamdb"))
    } else if cfg!(target_os = "macos") {
        dirs::data_dir()
            .map(|d| d.join("yamdb"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/yamdb"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .map(|d| d.join("yamdb"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\yamdb"))
    } else {
        PathBuf::from("./yamdb_data")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_argument_wins() {
        let dir = resolve_data_dir(Some("/tmp/explicit"), "YAMDB_TEST_UNSET_VAR").unwrap();
        assert_eq!(dir, PathBuf::from("/tmp/explicit"));
    }

    #[test]
    fn falls_back_to_default_when_nothing_set() {
        let dir = resolve_data_dir(None, "YAMDB_TEST_UNSET_VAR_2").unwrap();
        // Whatever the platform default is, it must be non-empty
        assert!(!dir.as_os_str().is_empty());
    }

    #[test]
    fn default_config_carries_the_service_defaults() {
        let config = ServiceConfig::default();
        assert_eq!(config.port, 8000);
        assert_eq!(config.min_title_year, DEFAULT_MIN_YEAR);
        assert_eq!(config.token_ttl_hours, crate::token::DEFAULT_TOKEN_TTL_HOURS);
        assert_eq!(
            config.database_path.file_name().and_then(|n| n.to_str()),
            Some("yamdb.db")
        );
        assert_eq!(config.mail.sender, MailConfig::default().sender);
    }
}
