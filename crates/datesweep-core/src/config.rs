use chrono::format::{Item, StrftimeItems};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub security: SecurityConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Data directory path
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the admin service listens on
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Key used to sign anti-forgery tokens. Generated by `datesweep init`.
    #[serde(default)]
    pub secret: String,
    /// Anti-forgery token lifetime in seconds
    #[serde(default = "default_nonce_lifetime")]
    pub nonce_lifetime_secs: u64,
    /// Name of the session cookie
    #[serde(default = "default_session_cookie")]
    pub session_cookie: String,
    /// Session lifetime in seconds
    #[serde(default = "default_session_lifetime")]
    pub session_lifetime_secs: u64,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            nonce_lifetime_secs: default_nonce_lifetime(),
            session_cookie: default_session_cookie(),
            session_lifetime_secs: default_session_lifetime(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// strftime-style format for dates shown in the attachment log
    #[serde(default = "default_date_format")]
    pub date_format: String,
    /// Number of words kept in comment excerpts
    #[serde(default = "default_excerpt_words")]
    pub excerpt_words: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            date_format: default_date_format(),
            excerpt_words: default_excerpt_words(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding attachment files (defaults to `<data_dir>/uploads`)
    #[serde(default)]
    pub uploads_dir: Option<PathBuf>,
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("datesweep")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_bind_addr() -> String {
    "127.0.0.1:8787".to_string()
}

fn default_nonce_lifetime() -> u64 {
    86400 // 1 day
}

fn default_session_cookie() -> String {
    "datesweep_session".to_string()
}

fn default_session_lifetime() -> u64 {
    172800 // 2 days
}

fn default_date_format() -> String {
    "%B %-d, %Y".to_string()
}

fn default_excerpt_words() -> usize {
    15
}

/// Expand tilde (~) in path to user's home directory
fn expand_tilde(path: &Path) -> PathBuf {
    if let Some(path_str) = path.to_str() {
        if let Some(stripped) = path_str.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(stripped);
            }
        } else if path_str == "~" {
            if let Some(home) = dirs::home_dir() {
                return home;
            }
        }
    }
    path.to_path_buf()
}

/// Generate a random hex secret suitable for `security.secret`
pub fn generate_secret() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

impl AppConfig {
    /// Load configuration from `path` (or the default location) or return defaults
    pub fn load(path: Option<&Path>) -> crate::Result<Self> {
        let config_path = path.map(Path::to_path_buf).unwrap_or_else(Self::config_path);

        let config: Self = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content).map_err(|e| crate::Error::Config(e.to_string()))?
        } else {
            Self::default()
        };

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to `path` (or the default location)
    pub fn save(&self, path: Option<&Path>) -> crate::Result<()> {
        let config_path = path.map(Path::to_path_buf).unwrap_or_else(Self::config_path);

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content =
            toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))?;
        std::fs::write(&config_path, content)?;

        Ok(())
    }

    /// Reject values that would only fail later, mid-request
    pub fn validate(&self) -> crate::Result<()> {
        if StrftimeItems::new(&self.display.date_format).any(|item| matches!(item, Item::Error)) {
            return Err(crate::Error::Config(format!(
                "display.date_format is not a valid format string: {}",
                self.display.date_format
            )));
        }
        if self.security.nonce_lifetime_secs < 2 {
            return Err(crate::Error::Config(
                "security.nonce_lifetime_secs must be at least 2".to_string(),
            ));
        }
        if self.security.session_cookie.is_empty() {
            return Err(crate::Error::Config(
                "security.session_cookie must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Get the configuration file path
    /// Always uses ~/.config/datesweep/config.toml on all platforms
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("datesweep")
            .join("config.toml")
    }

    /// Get the database file path
    pub fn database_path(&self) -> PathBuf {
        self.data_dir().join("datesweep.db")
    }

    /// Get the attachment upload directory (with tilde expansion)
    pub fn uploads_dir(&self) -> PathBuf {
        match &self.storage.uploads_dir {
            Some(dir) => expand_tilde(dir),
            None => self.data_dir().join("uploads"),
        }
    }

    /// Get the data directory (with tilde expansion)
    pub fn data_dir(&self) -> PathBuf {
        expand_tilde(&self.general.data_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [server]
            bind_addr = "0.0.0.0:9000"

            [display]
            excerpt_words = 10
            "#,
        )
        .unwrap();

        assert_eq!(config.server.bind_addr, "0.0.0.0:9000");
        assert_eq!(config.display.excerpt_words, 10);
        assert_eq!(config.display.date_format, "%B %-d, %Y");
        assert_eq!(config.security.nonce_lifetime_secs, 86400);
        assert_eq!(config.security.session_cookie, "datesweep_session");
    }

    #[test]
    fn test_invalid_date_format_is_rejected() {
        let mut config = AppConfig::default();
        config.display.date_format = "%Q".to_string();
        assert!(matches!(config.validate(), Err(crate::Error::Config(_))));
    }

    #[test]
    fn test_uploads_dir_defaults_under_data_dir() {
        let mut config = AppConfig::default();
        config.general.data_dir = PathBuf::from("/srv/datesweep");
        assert_eq!(config.uploads_dir(), PathBuf::from("/srv/datesweep/uploads"));

        config.storage.uploads_dir = Some(PathBuf::from("/var/uploads"));
        assert_eq!(config.uploads_dir(), PathBuf::from("/var/uploads"));
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = AppConfig::default();
        config.security.secret = generate_secret();
        config.save(Some(&path)).unwrap();

        let loaded = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(loaded.security.secret, config.security.secret);
        assert_eq!(loaded.security.secret.len(), 64);
    }
}
