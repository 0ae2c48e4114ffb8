//! # Client Configuration
//!
//! Configuration management for the storefront client.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     PHARMA_BACKEND_URL=https://api.pharmacart.example                  │
//! │     PHARMA_SHIPPING_FEE=7.50                                           │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/pharmacart/pharmacart.toml (Linux)                       │
//! │     ~/Library/Application Support/com.pharmacart.pharmacart/... (macOS)│
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     http://localhost:8089, /api/v1, $10.00 under $100.00               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # pharmacart.toml
//! [backend]
//! url = "http://localhost:8089"
//! api_prefix = "/api/v1"
//! timeout_secs = 30
//!
//! [pricing]
//! free_shipping_threshold = 100.0
//! shipping_fee = 10.0
//! promo_codes = [{ code = "DISCOUNT10", rate_bps = 1000 }]
//!
//! [storage]
//! data_dir = "/var/lib/pharmacart"
//! ```

use std::path::PathBuf;
use std::time::Duration;

use pharma_core::{Money, PricingPolicy};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{ClientError, ClientResult};

// =============================================================================
// Backend Settings
// =============================================================================

/// Where the backend lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendSettings {
    /// Scheme, host and port of the backend.
    #[serde(default = "default_backend_url")]
    pub url: String,

    /// Path prefix shared by every endpoint.
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,

    /// Transport timeout per request.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_backend_url() -> String {
    "http://localhost:8089".to_string()
}

fn default_api_prefix() -> String {
    "/api/v1".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for BackendSettings {
    fn default() -> Self {
        BackendSettings {
            url: default_backend_url(),
            api_prefix: default_api_prefix(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl BackendSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// =============================================================================
// Storage Settings
// =============================================================================

/// Where the cart is persisted between sessions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Directory for persisted state. Platform data dir when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

// =============================================================================
// Client Config
// =============================================================================

/// Complete client configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub backend: BackendSettings,

    #[serde(default)]
    pub pricing: PricingPolicy,

    #[serde(default)]
    pub storage: StorageSettings,
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (pharmacart.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ClientResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading client config from file");
                let contents = std::fs::read_to_string(&path)
                    .map_err(|e| ClientError::ConfigLoadFailed(format!("{}: {}", path.display(), e)))?;
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
            warn!("Failed to load client config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> ClientResult<PathBuf> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| ClientError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ClientError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| ClientError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Client config saved");
        Ok(path)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ClientResult<()> {
        let url = Url::parse(&self.backend.url)?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ClientError::InvalidUrl(format!(
                "Backend URL must start with http:// or https://, got: {}",
                self.backend.url
            )));
        }

        if !self.backend.api_prefix.is_empty() && !self.backend.api_prefix.starts_with('/') {
            return Err(ClientError::InvalidConfig(format!(
                "api_prefix must start with '/', got: {}",
                self.backend.api_prefix
            )));
        }

        if self.backend.timeout_secs == 0 {
            return Err(ClientError::InvalidConfig(
                "timeout_secs must be greater than 0".into(),
            ));
        }

        if self.pricing.shipping_fee.is_negative() || self.pricing.free_shipping_threshold.is_negative() {
            return Err(ClientError::InvalidConfig(
                "shipping amounts must not be negative".into(),
            ));
        }

        if let Some(promo) = self.pricing.promo_codes.iter().find(|p| p.rate_bps > 10_000) {
            return Err(ClientError::InvalidConfig(format!(
                "promo code {} has a rate above 100%",
                promo.code
            )));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("PHARMA_BACKEND_URL") {
            debug!(url = %url, "Overriding backend URL from environment");
            self.backend.url = url;
        }

        if let Ok(prefix) = std::env::var("PHARMA_API_PREFIX") {
            self.backend.api_prefix = prefix;
        }

        if let Ok(secs) = std::env::var("PHARMA_TIMEOUT_SECS") {
            match secs.parse::<u64>() {
                Ok(s) => self.backend.timeout_secs = s,
                Err(_) => warn!(value = %secs, "Ignoring non-numeric PHARMA_TIMEOUT_SECS"),
            }
        }

        if let Ok(dir) = std::env::var("PHARMA_DATA_DIR") {
            debug!(dir = %dir, "Overriding data directory from environment");
            self.storage.data_dir = Some(PathBuf::from(dir));
        }

        if let Ok(fee) = std::env::var("PHARMA_SHIPPING_FEE") {
            match fee.parse::<Money>() {
                Ok(m) => self.pricing.shipping_fee = m,
                Err(_) => warn!(value = %fee, "Ignoring invalid PHARMA_SHIPPING_FEE"),
            }
        }

        if let Ok(threshold) = std::env::var("PHARMA_FREE_SHIPPING_THRESHOLD") {
            match threshold.parse::<Money>() {
                Ok(m) => self.pricing.free_shipping_threshold = m,
                Err(_) => warn!(
                    value = %threshold,
                    "Ignoring invalid PHARMA_FREE_SHIPPING_THRESHOLD"
                ),
            }
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "pharmacart", "pharmacart")
            .map(|dirs| dirs.config_dir().join("pharmacart.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Directory persisted state is written to.
    pub fn data_dir(&self) -> Option<PathBuf> {
        self.storage.data_dir.clone().or_else(|| {
            directories::ProjectDirs::from("com", "pharmacart", "pharmacart")
                .map(|dirs| dirs.data_dir().to_path_buf())
        })
    }

    pub fn backend_url(&self) -> &str {
        &self.backend.url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.backend.url, "http://localhost:8089");
        assert_eq!(config.backend.api_prefix, "/api/v1");
        assert_eq!(config.pricing.shipping_fee, Money::from_cents(1000));
        assert_eq!(config.pricing.free_shipping_threshold, Money::from_cents(10_000));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = ClientConfig::default();

        config.backend.url = "ftp://example.com".to_string();
        assert!(matches!(config.validate(), Err(ClientError::InvalidUrl(_))));

        config.backend.url = "not a url".to_string();
        assert!(matches!(config.validate(), Err(ClientError::InvalidUrl(_))));

        config.backend.url = "https://api.example.com".to_string();
        config.backend.api_prefix = "api".to_string();
        assert!(matches!(config.validate(), Err(ClientError::InvalidConfig(_))));

        config.backend.api_prefix = "/api/v2".to_string();
        config.backend.timeout_secs = 0;
        assert!(config.validate().is_err());

        config.backend.timeout_secs = 5;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: ClientConfig = toml::from_str(
            r#"
            [backend]
            url = "https://shop.example.com"

            [pricing]
            shipping_fee = 7.5
            "#,
        )
        .unwrap();

        assert_eq!(config.backend.url, "https://shop.example.com");
        assert_eq!(config.backend.api_prefix, "/api/v1");
        assert_eq!(config.pricing.shipping_fee, Money::from_cents(750));
        assert_eq!(config.pricing.free_shipping_threshold, Money::from_cents(10_000));
        assert_eq!(config.pricing.promo_codes.len(), 1);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("pharmacart.toml");

        let mut config = ClientConfig::default();
        config.backend.timeout_secs = 12;
        config.storage.data_dir = Some(dir.path().join("data"));
        config.save(Some(path.clone())).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("[backend]"));
        assert!(contents.contains("[pricing]"));

        let loaded: ClientConfig = toml::from_str(&contents).unwrap();
        assert_eq!(loaded.backend.timeout_secs, 12);
        assert_eq!(loaded.storage.data_dir, config.storage.data_dir);
        assert_eq!(loaded.pricing, config.pricing);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config = ClientConfig::load_or_default(Some(dir.path().join("absent.toml")));
        assert_eq!(config.backend.api_prefix, "/api/v1");
    }
}
