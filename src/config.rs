//! Application configuration management.
//!
//! Configuration is read once at startup from environment variables (with an
//! optional `.env` file) using the `envy` crate. The JWT signing secret comes
//! from `JWT_SECRET` or, when that is unset, from a JSON config file.

use serde::Deserialize;
use std::path::PathBuf;

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid environment: {0}")]
    Env(#[from] envy::Error),

    #[error("Cannot read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Cannot parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("No JWT secret: set JWT_SECRET or provide \"secret\" in {0}")]
    MissingSecret(PathBuf),
}

/// Application configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `DATABASE_URL` (optional): SQLite connection string
/// - `SERVER_PORT` (optional): HTTP server port, defaults to 3000
/// - `JWT_SECRET` (optional): token signing secret
/// - `CONFIG_PATH` (optional): JSON file holding `secret`, defaults to `config/config.json`
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_database_url")]
    pub database_url: String,

    #[serde(default = "default_port")]
    pub server_port: u16,

    #[serde(default)]
    pub jwt_secret: Option<String>,

    #[serde(default = "default_config_path")]
    pub config_path: PathBuf,
}

/// Shape of the fallback config file.
#[derive(Debug, Deserialize)]
struct ConfigFile {
    secret: Option<String>,
}

fn default_database_url() -> String {
    "sqlite://backoffice.db?mode=rwc".to_string()
}

/// Default port if SERVER_PORT environment variable is not set.
fn default_port() -> u16 {
    3000
}

fn default_config_path() -> PathBuf {
    PathBuf::from("config/config.json")
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Loads a `.env` file first if one exists, then deserializes the
    /// environment. Field names map to upper-case variables
    /// (`jwt_secret` -> `JWT_SECRET`).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(envy::from_env::<Config>()?)
    }

    /// Resolve the token signing secret.
    ///
    /// `JWT_SECRET` wins; otherwise the `secret` field of the config file is
    /// used. An empty secret counts as missing.
    pub fn jwt_secret(&self) -> Result<String, ConfigError> {
        if let Some(secret) = self.jwt_secret.as_ref().filter(|s| !s.is_empty()) {
            return Ok(secret.clone());
        }

        let raw = std::fs::read_to_string(&self.config_path).map_err(|source| ConfigError::Io {
            path: self.config_path.clone(),
            source,
        })?;

        secret_from_json(&raw).map_err(|err| match err {
            SecretLookup::Parse(source) => ConfigError::Parse {
                path: self.config_path.clone(),
                source,
            },
            SecretLookup::Missing => ConfigError::MissingSecret(self.config_path.clone()),
        })
    }
}

enum SecretLookup {
    Parse(serde_json::Error),
    Missing,
}

fn secret_from_json(raw: &str) -> Result<String, SecretLookup> {
    let file: ConfigFile = serde_json::from_str(raw).map_err(SecretLookup::Parse)?;

    file.secret
        .filter(|s| !s.is_empty())
        .ok_or(SecretLookup::Missing)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(jwt_secret: Option<&str>, config_path: &str) -> Config {
        Config {
            database_url: default_database_url(),
            server_port: default_port(),
            jwt_secret: jwt_secret.map(str::to_string),
            config_path: PathBuf::from(config_path),
        }
    }

    #[test]
    fn test_env_secret_takes_precedence() {
        let cfg = config(Some("from-env"), "/nonexistent/config.json");
        assert_eq!(cfg.jwt_secret().unwrap(), "from-env");
    }

    #[test]
    fn test_missing_file_without_env_secret_fails() {
        let cfg = config(None, "/nonexistent/config.json");
        assert!(matches!(cfg.jwt_secret(), Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_empty_env_secret_falls_back_to_file() {
        let cfg = config(Some(""), "/nonexistent/config.json");
        assert!(matches!(cfg.jwt_secret(), Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_secret_from_json() {
        assert_eq!(
            secret_from_json(r#"{"secret": "longsecret"}"#).ok(),
            Some("longsecret".to_string())
        );
        assert!(matches!(secret_from_json("{}"), Err(SecretLookup::Missing)));
        assert!(matches!(
            secret_from_json(r#"{"secret": ""}"#),
            Err(SecretLookup::Missing)
        ));
        assert!(matches!(
            secret_from_json("not json"),
            Err(SecretLookup::Parse(_))
        ));
    }
}
