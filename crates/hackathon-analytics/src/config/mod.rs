use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use thiserror::Error;

use crate::workflows::hackathon::{
    AnalyticsSettings, DEFAULT_LEADERBOARD_LIMIT, DEFAULT_TOP_PERFORMERS,
};

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_LOG_LEVEL: &str = "info";

/// Deployment stage, read from `APP_ENV`. Unknown values fall back to development.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppEnvironment {
    #[default]
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("production") || raw.eq_ignore_ascii_case("prod") {
            Self::Production
        } else if raw.eq_ignore_ascii_case("test") || raw.eq_ignore_ascii_case("ci") {
            Self::Test
        } else {
            Self::Development
        }
    }
}

/// Everything the analytics service reads at startup.
///
/// | variable                | default     |
/// |-------------------------|-------------|
/// | `APP_ENV`               | development |
/// | `APP_HOST`              | 127.0.0.1   |
/// | `APP_PORT`              | 3000        |
/// | `APP_LOG_LEVEL`         | info        |
/// | `APP_LEADERBOARD_LIMIT` | 100         |
/// | `APP_TOP_PERFORMERS`    | 5           |
/// | `APP_SNAPSHOT_PATH`     | unset       |
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub analytics: AnalyticsSettings,
    /// JSON snapshot used to seed the in-memory store.
    pub snapshot_path: Option<PathBuf>,
}

impl AppConfig {
    /// Reads `.env` (when present) and then the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let environment = read("APP_ENV")
            .map(|raw| AppEnvironment::parse(&raw))
            .unwrap_or_default();

        let port = match read("APP_PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|_| ConfigError::InvalidPort)?,
            None => DEFAULT_PORT,
        };
        let server = ServerConfig {
            host: read("APP_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
        };

        let telemetry = TelemetryConfig {
            log_level: read("APP_LOG_LEVEL").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
        };

        let analytics = AnalyticsSettings {
            leaderboard_limit: positive(
                "APP_LEADERBOARD_LIMIT",
                read("APP_LEADERBOARD_LIMIT"),
                DEFAULT_LEADERBOARD_LIMIT,
            )?,
            top_performers: positive(
                "APP_TOP_PERFORMERS",
                read("APP_TOP_PERFORMERS"),
                DEFAULT_TOP_PERFORMERS,
            )?,
        };

        Ok(Self {
            environment,
            server,
            telemetry,
            analytics,
            snapshot_path: read("APP_SNAPSHOT_PATH").map(PathBuf::from),
        })
    }
}

fn positive(
    key: &'static str,
    raw: Option<String>,
    default: usize,
) -> Result<usize, ConfigError> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    raw.parse::<usize>()
        .ok()
        .filter(|number| *number > 0)
        .ok_or(ConfigError::InvalidNumber { key })
}

/// Where the HTTP listener binds.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    /// `localhost` maps to the IPv4 loopback; anything else must be a literal address.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip = if self.host.eq_ignore_ascii_case("localhost") {
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        } else {
            self.host.parse::<IpAddr>()?
        };
        Ok(SocketAddr::new(ip, self.port))
    }
}

#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("APP_PORT must be a valid u16")]
    InvalidPort,
    #[error("APP_HOST must parse to an IPv4 or IPv6 address")]
    InvalidHost(#[from] std::net::AddrParseError),
    #[error("{key} must be a positive whole number")]
    InvalidNumber { key: &'static str },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load_with(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = load_with(&[]).expect("defaults load");

        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.analytics.leaderboard_limit, 100);
        assert_eq!(config.analytics.top_performers, 5);
        assert!(config.snapshot_path.is_none());
    }

    #[test]
    fn localhost_binds_loopback() {
        let config = load_with(&[("APP_HOST", "LocalHost"), ("APP_PORT", "8080")])
            .expect("config loads");

        let addr = config.server.socket_addr().expect("localhost resolves");

        assert_eq!(addr, SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 8080));
    }

    #[test]
    fn hostnames_other_than_localhost_are_rejected() {
        let config = load_with(&[("APP_HOST", "example.org")]).expect("config loads");

        assert!(matches!(
            config.server.socket_addr(),
            Err(ConfigError::InvalidHost(_))
        ));
    }

    #[test]
    fn overrides_are_trimmed_and_applied() {
        let config = load_with(&[
            ("APP_ENV", " PROD "),
            ("APP_LEADERBOARD_LIMIT", "25"),
            ("APP_TOP_PERFORMERS", " 3"),
            ("APP_SNAPSHOT_PATH", "data/snapshot.json"),
        ])
        .expect("config loads");

        assert_eq!(config.environment, AppEnvironment::Production);
        assert_eq!(config.analytics.leaderboard_limit, 25);
        assert_eq!(config.analytics.top_performers, 3);
        assert_eq!(
            config.snapshot_path,
            Some(PathBuf::from("data/snapshot.json"))
        );
    }

    #[test]
    fn blank_values_count_as_unset() {
        let config = load_with(&[("APP_SNAPSHOT_PATH", "  "), ("APP_PORT", "")])
            .expect("config loads");

        assert!(config.snapshot_path.is_none());
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn zero_limit_is_rejected() {
        let error = load_with(&[("APP_LEADERBOARD_LIMIT", "0")]).expect_err("zero limit");

        assert!(matches!(
            error,
            ConfigError::InvalidNumber {
                key: "APP_LEADERBOARD_LIMIT"
            }
        ));
        assert_eq!(
            error.to_string(),
            "APP_LEADERBOARD_LIMIT must be a positive whole number"
        );
    }

    #[test]
    fn invalid_port_is_rejected() {
        assert!(matches!(
            load_with(&[("APP_PORT", "not-a-port")]),
            Err(ConfigError::InvalidPort)
        ));
    }
}
