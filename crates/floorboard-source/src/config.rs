//! # Source Configuration
//!
//! Configuration for the remote record source. The config value is
//! passed explicitly into every entry point; there is no module-level
//! connection state anywhere in this crate.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     FLOORBOARD_SOURCE_URL=https://erp.example.com                      │
//! │     FLOORBOARD_SOURCE_DB=production                                    │
//! │     FLOORBOARD_USERNAME / FLOORBOARD_PASSWORD                          │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/floorboard/source.toml (Linux)                           │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # source.toml
//! [server]
//! url = "https://erp.example.com"
//! database = "production"
//!
//! [auth]
//! username = "dashboard"
//! password = "secret"
//!
//! [query]
//! record_limit = 10000
//! timeout_secs = 30
//! excluded_companies = [12]
//! internal_customers = ["Evergreen Floors", "Floor Giants"]
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::error::{FetchError, FetchResult};

// =============================================================================
// Server Configuration
// =============================================================================

/// Where the remote source lives.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Base URL of the remote source.
    #[serde(default)]
    pub url: String,

    /// Database name to authenticate against.
    #[serde(default)]
    pub database: String,
}

// =============================================================================
// Auth Configuration
// =============================================================================

/// Credentials for the remote source. Usually supplied via environment
/// rather than the config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub password: String,
}

// =============================================================================
// Query Settings
// =============================================================================

/// Query behavior and record-hygiene settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuerySettings {
    /// Maximum records per query.
    #[serde(default = "default_record_limit")]
    pub record_limit: usize,

    /// Request timeout (seconds).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Company ids whose documents are dropped at snapshot assembly
    /// (inter-company bookkeeping entities).
    #[serde(default)]
    pub excluded_companies: Vec<i64>,

    /// Customer display-name substrings marking internal transfers.
    /// Matching documents are dropped at snapshot assembly.
    #[serde(default)]
    pub internal_customers: Vec<String>,
}

fn default_record_limit() -> usize {
    10_000
}

fn default_timeout() -> u64 {
    30
}

impl Default for QuerySettings {
    fn default() -> Self {
        QuerySettings {
            record_limit: default_record_limit(),
            timeout_secs: default_timeout(),
            excluded_companies: Vec::new(),
            internal_customers: Vec::new(),
        }
    }
}

// =============================================================================
// Main Source Configuration
// =============================================================================

/// Complete source configuration.
///
/// ## Example Config File
/// ```toml
/// [server]
/// url = "https://erp.example.com"
/// database = "production"
///
/// [auth]
/// username = "dashboard"
///
/// [query]
/// record_limit = 10000
/// excluded_companies = [12]
/// internal_customers = ["Evergreen Floors"]
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Remote server location.
    #[serde(default)]
    pub server: ServerConfig,

    /// Credentials.
    #[serde(default)]
    pub auth: AuthConfig,

    /// Query behavior and record hygiene.
    #[serde(default)]
    pub query: QuerySettings,
}

impl SourceConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (source.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> FetchResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading source config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load source config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Validates the configuration.
    pub fn validate(&self) -> FetchResult<()> {
        if !self.server.url.is_empty()
            && !self.server.url.starts_with("http://")
            && !self.server.url.starts_with("https://")
        {
            return Err(FetchError::InvalidConfig(format!(
                "Server URL must start with http:// or https://, got: {}",
                self.server.url
            )));
        }

        if self.query.record_limit == 0 {
            return Err(FetchError::InvalidConfig(
                "record_limit must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("FLOORBOARD_SOURCE_URL") {
            debug!(url = %url, "Overriding source URL from environment");
            self.server.url = url;
        }

        if let Ok(db) = std::env::var("FLOORBOARD_SOURCE_DB") {
            self.server.database = db;
        }

        if let Ok(username) = std::env::var("FLOORBOARD_USERNAME") {
            self.auth.username = username;
        }

        if let Ok(password) = std::env::var("FLOORBOARD_PASSWORD") {
            self.auth.password = password;
        }

        if let Ok(limit) = std::env::var("FLOORBOARD_RECORD_LIMIT") {
            if let Ok(l) = limit.parse::<usize>() {
                debug!(record_limit = l, "Overriding record limit from environment");
                self.query.record_limit = l;
            }
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "floorboard", "floorboard")
            .map(|dirs| dirs.config_dir().join("source.toml"))
    }

    // =========================================================================
    // Record Hygiene
    // =========================================================================

    /// Whether a customer display name marks an internal transfer.
    pub fn is_internal_customer(&self, customer_name: &str) -> bool {
        if customer_name.is_empty() {
            return false;
        }
        self.query
            .internal_customers
            .iter()
            .any(|marker| customer_name.contains(marker.as_str()))
    }

    /// Whether a company id is excluded from the dashboards.
    pub fn is_excluded_company(&self, company_id: i64) -> bool {
        self.query.excluded_companies.contains(&company_id)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SourceConfig::default();
        assert_eq!(config.query.record_limit, 10_000);
        assert_eq!(config.query.timeout_secs, 30);
        assert!(config.query.excluded_companies.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = SourceConfig::default();
        config.server.url = "ftp://bad".to_string();
        assert!(config.validate().is_err());

        config.server.url = "https://erp.example.com".to_string();
        assert!(config.validate().is_ok());

        config.query.record_limit = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_parsing() {
        let toml_str = r#"
            [server]
            url = "https://erp.example.com"
            database = "production"

            [query]
            excluded_companies = [12]
            internal_customers = ["Evergreen Floors", "Floor Giants"]
        "#;
        let config: SourceConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.database, "production");
        assert!(config.is_excluded_company(12));
        assert!(!config.is_excluded_company(7));
        assert!(config.is_internal_customer("Evergreen Floors Ltd"));
        assert!(!config.is_internal_customer("Acme Flooring"));
        // Empty names never match.
        assert!(!config.is_internal_customer(""));
    }
}
