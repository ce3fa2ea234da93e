use std::env;
use std::net::{IpAddr, SocketAddr};

use crate::workflows::showcase::domain::UserId;
use crate::workflows::showcase::storage::DEFAULT_MAX_PHOTO_BYTES;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the showcase service.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub storage: StorageConfig,
    pub seed: SeedConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(&var_or("APP_ENV", "development"));

        let host = var_or("APP_HOST", "127.0.0.1");
        let port = var_or("APP_PORT", "3000")
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = var_or("APP_LOG_LEVEL", "info");

        let public_base_url = var_or(
            "APP_STORAGE_PUBLIC_URL",
            &format!("http://{host}:{port}/storage"),
        );
        let bucket = var_or("APP_PHOTO_BUCKET", "profile-photos");
        let max_photo_bytes = match env::var("APP_MAX_PHOTO_BYTES") {
            Ok(raw) => raw
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|limit| *limit > 0)
                .ok_or(ConfigError::InvalidPhotoLimit { value: raw })?,
            Err(_) => DEFAULT_MAX_PHOTO_BYTES,
        };

        let sessions = parse_sessions(&var_or("APP_SEED_SESSIONS", ""))?;
        let admins = parse_user_list(&var_or("APP_SEED_ADMINS", ""));

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig {
                log_level,
                with_target: environment != AppEnvironment::Production,
            },
            storage: StorageConfig {
                public_base_url: public_base_url.trim_end_matches('/').to_string(),
                bucket,
                max_photo_bytes,
            },
            seed: SeedConfig { sessions, admins },
        })
    }
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parses `token=user,token=user` pairs.
fn parse_sessions(raw: &str) -> Result<Vec<SessionSeed>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| match entry.split_once('=') {
            Some((token, user)) if !token.trim().is_empty() && !user.trim().is_empty() => {
                Ok(SessionSeed {
                    token: token.trim().to_string(),
                    user_id: UserId(user.trim().to_string()),
                })
            }
            _ => Err(ConfigError::InvalidSessionSeed {
                entry: entry.to_string(),
            }),
        })
        .collect()
}

fn parse_user_list(raw: &str) -> Vec<UserId> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| UserId(entry.to_string()))
        .collect()
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub with_target: bool,
}

/// Object storage settings for profile photos.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub public_base_url: String,
    pub bucket: String,
    pub max_photo_bytes: usize,
}

/// Development fixtures for the in-memory auth provider.
#[derive(Debug, Clone, Default)]
pub struct SeedConfig {
    pub sessions: Vec<SessionSeed>,
    pub admins: Vec<UserId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSeed {
    pub token: String,
    pub user_id: UserId,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("APP_PORT must be a valid u16")]
    InvalidPort,
    #[error("APP_HOST must parse to an IPv4 or IPv6 address")]
    InvalidHost { source: std::net::AddrParseError },
    #[error("APP_MAX_PHOTO_BYTES must be a positive integer (found '{value}')")]
    InvalidPhotoLimit { value: String },
    #[error("APP_SEED_SESSIONS entries must look like token=user (found '{entry}')")]
    InvalidSessionSeed { entry: String },
}
