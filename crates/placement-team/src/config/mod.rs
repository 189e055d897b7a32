use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

const DEFAULT_DATABASE_PATH: &str = "data/placement_team.db";
const DEFAULT_REGISTRATION_LINK: &str = "https://example.org";
const IN_MEMORY_DATABASE: &str = ":memory:";
const DEFAULT_SESSION_TTL_SECS: u64 = 14 * 24 * 60 * 60;

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

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub database: DatabaseConfig,
    pub job_fairs: JobFairConfig,
    pub auth: AuthConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let database_path =
            env::var("APP_DATABASE_PATH").unwrap_or_else(|_| DEFAULT_DATABASE_PATH.to_string());

        let registration_link = env::var("APP_REGISTRATION_LINK")
            .unwrap_or_else(|_| DEFAULT_REGISTRATION_LINK.to_string());
        if registration_link.trim().is_empty() {
            return Err(ConfigError::EmptyRegistrationLink);
        }

        let username = env::var("APP_ADMIN_USERNAME").unwrap_or_else(|_| "placement".to_string());
        let password = env::var("APP_ADMIN_PASSWORD")
            .ok()
            .filter(|value| !value.is_empty());
        let session_ttl = env::var("APP_SESSION_TTL_SECS")
            .unwrap_or_else(|_| DEFAULT_SESSION_TTL_SECS.to_string())
            .parse::<u64>()
            .ok()
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .ok_or(ConfigError::InvalidSessionTtl)?;

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            database: DatabaseConfig {
                path: database_path,
            },
            job_fairs: JobFairConfig {
                registration_link: registration_link.trim().to_string(),
            },
            auth: AuthConfig {
                username,
                password,
                session_ttl,
            },
        })
    }
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

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Location of the SQLite database holding job fair records.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub path: String,
}

impl DatabaseConfig {
    /// `:memory:` keeps every record in a process-local SQLite database.
    pub fn is_in_memory(&self) -> bool {
        self.path == IN_MEMORY_DATABASE
    }
}

/// Values embedded into issued QR codes.
#[derive(Debug, Clone)]
pub struct JobFairConfig {
    pub registration_link: String,
}

/// The single placement team account allowed to sign in.
#[derive(Clone)]
pub struct AuthConfig {
    pub username: String,
    pub password: Option<String>,
    /// How long a sign-in stays valid.
    pub session_ttl: Duration,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("session_ttl", &self.session_ttl)
            .finish()
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    EmptyRegistrationLink,
    InvalidSessionTtl,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::EmptyRegistrationLink => {
                write!(f, "APP_REGISTRATION_LINK must not be empty")
            }
            ConfigError::InvalidSessionTtl => {
                write!(f, "APP_SESSION_TTL_SECS must be a positive number of seconds")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort
            | ConfigError::EmptyRegistrationLink
            | ConfigError::InvalidSessionTtl => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}
