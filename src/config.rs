//! Configuration loaded from environment variables (after `.env`).
//!
//! - `JWT_SECRET` (required) - session token signing secret
//! - `DATABASE_URL` - Postgres connection string; without it collections live in memory
//! - `SHEET_API_URL` - spreadsheet web-app endpoint; without it sync is disabled
//! - `HOST` (default 127.0.0.1), `PORT` (default 3000)

use std::net::IpAddr;

use thiserror::Error;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: Option<String>,
    pub sheet_api_url: Option<String>,
    pub jwt_secret: String,
    pub host: IpAddr,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_empty = |key: &str| get(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let jwt_secret = non_empty("JWT_SECRET").ok_or_else(|| ConfigError::MissingEnvVar("JWT_SECRET".into()))?;

        let host = match non_empty("HOST") {
            Some(raw) => raw
                .parse()
                .map_err(|e| ConfigError::InvalidEnvVar("HOST".into(), format!("{raw}: {e}")))?,
            None => DEFAULT_HOST.parse().map_err(|e| ConfigError::InvalidEnvVar("HOST".into(), format!("{e}")))?,
        };

        let port = match non_empty("PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|e| ConfigError::InvalidEnvVar("PORT".into(), format!("{raw}: {e}")))?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            database_url: non_empty("DATABASE_URL"),
            sheet_api_url: non_empty("SHEET_API_URL"),
            jwt_secret,
            host,
            port,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        AppConfig::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn defaults_apply_when_optional_vars_missing() {
        let cfg = load(&[("JWT_SECRET", "s3cret")]).unwrap();
        assert_eq!(cfg.port, 3000);
        assert_eq!(cfg.host.to_string(), "127.0.0.1");
        assert!(cfg.database_url.is_none());
        assert!(cfg.sheet_api_url.is_none());
    }

    #[test]
    fn secret_is_required() {
        assert!(matches!(load(&[]), Err(ConfigError::MissingEnvVar(_))));
        assert!(matches!(load(&[("JWT_SECRET", "  ")]), Err(ConfigError::MissingEnvVar(_))));
    }

    #[test]
    fn bad_port_is_reported() {
        let err = load(&[("JWT_SECRET", "x"), ("PORT", "http")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref k, _) if k == "PORT"));
    }

    #[test]
    fn blank_urls_disable_features() {
        let cfg = load(&[("JWT_SECRET", "x"), ("SHEET_API_URL", ""), ("DATABASE_URL", "postgres://db")]).unwrap();
        assert!(cfg.sheet_api_url.is_none());
        assert_eq!(cfg.database_url.as_deref(), Some("postgres://db"));
    }
}
