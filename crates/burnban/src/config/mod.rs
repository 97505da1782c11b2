use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_DATASET_URL: &str = "https://tfsgis.tfs.tamu.edu/arcgis/rest/services/BurnBan/BurnBan/MapServer/0/query?where=1%3D1&outFields=County%2CStartDate%2CBurnBan%2CCountyID&f=json";
pub const DEFAULT_GEOCODER_URL: &str = "https://nominatim.openstreetmap.org/search";
pub const DEFAULT_BOUNDARY_URL: &str = "https://geo.fcc.gov/api/census/block/find";

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
    pub dataset: DatasetConfig,
    pub geo: GeoConfig,
    pub notify: NotifyConfig,
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

        let dataset = DatasetConfig {
            source_url: var_or("BURNBAN_DATASET_URL", DEFAULT_DATASET_URL),
            cache_path: PathBuf::from(var_or("BURNBAN_CACHE_PATH", "/tmp/burn_ban_data.csv")),
            ttl_seconds: parse_secs("CACHE_TTL_SECONDS", 60 * 60)?,
            timeout: Duration::from_secs(parse_secs("BURNBAN_DATASET_TIMEOUT_SECONDS", 20)?),
        };

        let lookup_timeout = Duration::from_secs(parse_secs("LOOKUP_TIMEOUT_SECONDS", 10)?);

        let geo = GeoConfig {
            geocoder_url: var_or("GEOCODER_URL", DEFAULT_GEOCODER_URL),
            boundary_url: var_or("BOUNDARY_LOOKUP_URL", DEFAULT_BOUNDARY_URL),
            user_agent: var_or("GEOCODER_USER_AGENT", "burnban_app"),
            timeout: lookup_timeout,
        };

        let notify = NotifyConfig {
            sink_url: env::var("POWER_AUTOMATE_URL")
                .ok()
                .filter(|value| !value.trim().is_empty()),
            timeout: lookup_timeout,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            dataset,
            geo,
            notify,
        })
    }
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_secs(key: &'static str, default: u64) -> Result<u64, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidNumber { key, value: raw }),
        Err(_) => Ok(default),
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

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Where the county status table comes from and how long a local copy is trusted.
#[derive(Debug, Clone)]
pub struct DatasetConfig {
    pub source_url: String,
    pub cache_path: PathBuf,
    pub ttl_seconds: u64,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct GeoConfig {
    pub geocoder_url: String,
    pub boundary_url: String,
    pub user_agent: String,
    pub timeout: Duration,
}

/// Downstream automation webhook. Forwarding is skipped when `sink_url` is unset.
#[derive(Debug, Clone)]
pub struct NotifyConfig {
    pub sink_url: Option<String>,
    pub timeout: Duration,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { key: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { key, value } => {
                write!(f, "{key} must be a whole number of seconds, got '{value}'")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidNumber { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}
