use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

pub const CONFIG_PATH_ENV: &str = "WORLDSCOPE_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

pub const OPENSKY_CLIENT_ID_ENV: &str = "OPENSKY_CLIENT_ID";
pub const OPENSKY_CLIENT_SECRET_ENV: &str = "OPENSKY_CLIENT_SECRET";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            log_dir: default_log_dir(),
        }
    }
}

impl BackendConfig {
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config: BackendConfig = toml::from_str(content)?;
        Ok(config)
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

pub static CONFIG: OnceLock<BackendConfig> = OnceLock::new();

/// Load the config once. A missing file means defaults, a malformed one is an error.
pub fn read_config() -> anyhow::Result<&'static BackendConfig> {
    if let Some(config) = CONFIG.get() {
        return Ok(config);
    }

    let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config = if Path::new(&path).exists() {
        BackendConfig::from_file(&path)
            .map_err(|e| anyhow::anyhow!("Failed to parse config file {}: {}", path, e))?
    } else {
        BackendConfig::default()
    };

    Ok(CONFIG.get_or_init(|| config))
}

/// OpenSky API client credentials
#[derive(Clone, PartialEq, Eq)]
pub struct OpenSkyCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl OpenSkyCredentials {
    /// Both values trimmed, `None` unless both are non-empty
    pub fn from_values(client_id: Option<String>, client_secret: Option<String>) -> Option<Self> {
        let client_id = client_id?.trim().to_string();
        let client_secret = client_secret?.trim().to_string();

        if client_id.is_empty() || client_secret.is_empty() {
            return None;
        }
        Some(Self { client_id, client_secret })
    }

    pub fn from_env() -> Option<Self> {
        Self::from_values(
            std::env::var(OPENSKY_CLIENT_ID_ENV).ok(),
            std::env::var(OPENSKY_CLIENT_SECRET_ENV).ok(),
        )
    }
}

impl std::fmt::Debug for OpenSkyCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenSkyCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BackendConfig::from_toml("").unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 5000);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_dir, "logs");
        assert_eq!(config.server_address(), "0.0.0.0:5000");
    }

    #[test]
    fn test_partial_override() {
        let config = BackendConfig::from_toml("port = 8080\nlog_level = \"debug\"\n").unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.host, "0.0.0.0");
    }

    #[test]
    fn test_malformed_config_is_error() {
        assert!(BackendConfig::from_toml("port = \"not a port\"").is_err());
    }

    #[test]
    fn test_credentials_require_both_values() {
        let creds = OpenSkyCredentials::from_values(Some(" id ".into()), Some("secret\n".into())).unwrap();
        assert_eq!(creds.client_id, "id");
        assert_eq!(creds.client_secret, "secret");

        assert!(OpenSkyCredentials::from_values(Some("id".into()), None).is_none());
        assert!(OpenSkyCredentials::from_values(None, Some("secret".into())).is_none());
        assert!(OpenSkyCredentials::from_values(Some("id".into()), Some("   ".into())).is_none());
    }

    #[test]
    fn test_credentials_debug_redacts_secret() {
        let creds = OpenSkyCredentials::from_values(Some("id".into()), Some("hunter2".into())).unwrap();
        assert!(!format!("{:?}", creds).contains("hunter2"));
    }
}
