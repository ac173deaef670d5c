use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use thiserror::Error;

use crate::services::geo::DistanceUnit;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub query: QueryConfig,
    pub uploads: UploadConfig,
    pub geocoder: GeocoderConfig,
    pub security: SecurityConfig,
    pub api: ApiConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    /// `*` allows any origin
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Absent selects the in-memory store
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    pub default_limit: u64,
    pub max_limit: u64,
    pub debug_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    pub max_file_upload: usize,
    pub file_upload_path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocoderConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub distance_unit: DistanceUnit,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub jwt_secret: Option<String>,
    pub jwt_expiry_hours: u64,
}

/// Per-client request limiting over a fixed window
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub enable_rate_limiting: bool,
    pub rate_limit_requests: u32,
    pub rate_limit_window_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        // 100 requests per 10 minutes
        Self { enable_rate_limiting: true, rate_limit_requests: 100, rate_limit_window_secs: 600 }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("JWT_SECRET must be set outside development")]
    MissingJwtSecret,

    #[error("API_RATE_LIMIT_REQUESTS and API_RATE_LIMIT_WINDOW_SECS must be positive")]
    EmptyRateLimit,

    #[error("QUERY_DEFAULT_LIMIT ({default}) exceeds QUERY_MAX_LIMIT ({max})")]
    LimitOrder { default: u64, max: u64 },
}

const DEV_JWT_SECRET: &str = "devcamper-development-secret";
const MAPQUEST_URL: &str = "https://www.mapquestapi.com/geocoding/v1/address";

impl Default for QueryConfig {
    fn default() -> Self {
        Self { default_limit: 100, max_limit: 1000, debug_logging: false }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Presets first, then individual env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = env::var("PORT") {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }
        if let Ok(v) = env::var("CORS_ORIGINS") {
            self.server.cors_origins = v.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect();
        }

        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = Some(v).filter(|s| !s.trim().is_empty());
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        if let Ok(v) = env::var("QUERY_DEFAULT_LIMIT") {
            self.query.default_limit = v.parse().unwrap_or(self.query.default_limit);
        }
        if let Ok(v) = env::var("QUERY_MAX_LIMIT") {
            self.query.max_limit = v.parse().unwrap_or(self.query.max_limit);
        }
        if let Ok(v) = env::var("QUERY_DEBUG_LOGGING") {
            self.query.debug_logging = v.parse().unwrap_or(self.query.debug_logging);
        }

        if let Ok(v) = env::var("MAX_FILE_UPLOAD") {
            self.uploads.max_file_upload = v.parse().unwrap_or(self.uploads.max_file_upload);
        }
        if let Ok(v) = env::var("FILE_UPLOAD_PATH") {
            self.uploads.file_upload_path = PathBuf::from(v);
        }

        if let Ok(v) = env::var("GEOCODER_API_KEY") {
            self.geocoder.api_key = Some(v).filter(|s| !s.trim().is_empty());
        }
        if let Ok(v) = env::var("GEOCODER_BASE_URL") {
            self.geocoder.base_url = v;
        }
        if let Ok(v) = env::var("GEO_DISTANCE_UNIT") {
            self.geocoder.distance_unit = DistanceUnit::parse(&v).unwrap_or(self.geocoder.distance_unit);
        }

        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = Some(v).filter(|s| !s.is_empty());
        }
        if let Ok(v) = env::var("JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }

        if let Ok(v) = env::var("API_ENABLE_RATE_LIMITING") {
            self.api.enable_rate_limiting = v.parse().unwrap_or(self.api.enable_rate_limiting);
        }
        if let Ok(v) = env::var("API_RATE_LIMIT_REQUESTS") {
            self.api.rate_limit_requests = v.parse().unwrap_or(self.api.rate_limit_requests);
        }
        if let Ok(v) = env::var("API_RATE_LIMIT_WINDOW_SECS") {
            self.api.rate_limit_window_secs = v.parse().unwrap_or(self.api.rate_limit_window_secs);
        }

        self
    }

    /// Checks that must hold before serving requests
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.security.jwt_secret.is_none() {
            return Err(ConfigError::MissingJwtSecret);
        }
        if self.query.default_limit > self.query.max_limit {
            return Err(ConfigError::LimitOrder { default: self.query.default_limit, max: self.query.max_limit });
        }
        if self.api.enable_rate_limiting && (self.api.rate_limit_requests == 0 || self.api.rate_limit_window_secs == 0) {
            return Err(ConfigError::EmptyRateLimit);
        }
        Ok(())
    }

    pub fn jwt_secret(&self) -> &str {
        self.security.jwt_secret.as_deref().unwrap_or_default()
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig { port: 5000, cors_origins: vec!["*".to_string()] },
            database: DatabaseConfig { url: None, max_connections: 10, connection_timeout: 30 },
            query: QueryConfig { default_limit: 100, max_limit: 1000, debug_logging: true },
            uploads: UploadConfig {
                max_file_upload: 1_000_000,
                file_upload_path: PathBuf::from("./public/uploads"),
            },
            geocoder: GeocoderConfig {
                api_key: None,
                base_url: MAPQUEST_URL.to_string(),
                distance_unit: DistanceUnit::Kilometers,
            },
            security: SecurityConfig {
                jwt_secret: Some(DEV_JWT_SECRET.to_string()),
                jwt_expiry_hours: 24 * 7, // 1 week
            },
            api: ApiConfig::default(),
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig { port: 5000, cors_origins: vec!["https://staging.devcamper.io".to_string()] },
            database: DatabaseConfig { url: None, max_connections: 20, connection_timeout: 10 },
            query: QueryConfig { default_limit: 100, max_limit: 1000, debug_logging: false },
            uploads: UploadConfig {
                max_file_upload: 1_000_000,
                file_upload_path: PathBuf::from("./public/uploads"),
            },
            geocoder: GeocoderConfig {
                api_key: None,
                base_url: MAPQUEST_URL.to_string(),
                distance_unit: DistanceUnit::Kilometers,
            },
            security: SecurityConfig { jwt_secret: None, jwt_expiry_hours: 24 },
            api: ApiConfig::default(),
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig { port: 5000, cors_origins: vec!["https://devcamper.io".to_string()] },
            database: DatabaseConfig { url: None, max_connections: 50, connection_timeout: 5 },
            query: QueryConfig { default_limit: 100, max_limit: 1000, debug_logging: false },
            uploads: UploadConfig {
                max_file_upload: 1_000_000,
                file_upload_path: PathBuf::from("./public/uploads"),
            },
            geocoder: GeocoderConfig {
                api_key: None,
                base_url: MAPQUEST_URL.to_string(),
                distance_unit: DistanceUnit::Kilometers,
            },
            security: SecurityConfig { jwt_secret: None, jwt_expiry_hours: 4 },
            api: ApiConfig { enable_rate_limiting: true, rate_limit_requests: 100, rate_limit_window_secs: 600 },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn development_preset_is_usable_without_env() {
        let config = AppConfig::development();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.uploads.max_file_upload, 1_000_000);
        assert_eq!(config.query.default_limit, 100);
        assert!(config.database.url.is_none());
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn production_requires_a_secret() {
        let config = AppConfig::production();
        assert_eq!(config.validate(), Err(ConfigError::MissingJwtSecret));
    }

    #[test]
    fn rejects_default_limit_above_max() {
        let mut config = AppConfig::development();
        config.query.default_limit = 5000;
        assert!(matches!(config.validate(), Err(ConfigError::LimitOrder { .. })));
    }

    #[test]
    fn rate_limiting_defaults_to_a_hundred_per_ten_minutes() {
        let config = AppConfig::development();
        assert!(config.api.enable_rate_limiting);
        assert_eq!(config.api.rate_limit_requests, 100);
        assert_eq!(config.api.rate_limit_window_secs, 600);

        let mut config = AppConfig::development();
        config.api.rate_limit_requests = 0;
        assert_eq!(config.validate(), Err(ConfigError::EmptyRateLimit));
        config.api.enable_rate_limiting = false;
        assert_eq!(config.validate(), Ok(()));
    }
}
