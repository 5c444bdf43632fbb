use crate::core::comparison::DEFAULT_MAX_ITEMS;
use crate::core::currency::{self, DEFAULT_CURRENCY};
use crate::core::ConfigProvider;
use crate::utils::error::{Result, StorefrontError};
use crate::utils::retry::RetryPolicy;
use crate::utils::validation::{validate_path, validate_range, validate_url, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorefrontConfig {
    pub api: ApiConfig,
    pub currency: CurrencyConfig,
    pub comparison: ComparisonConfig,
    pub session: SessionConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
    pub retry_attempts: u32,
    pub retry_base_delay_ms: u64,
    pub retry_max_delay_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api".to_string(),
            timeout_seconds: 10,
            retry_attempts: 3,
            retry_base_delay_ms: 200,
            retry_max_delay_ms: 5_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrencyConfig {
    pub default: String,
    pub geo_endpoint: Option<String>,
    pub detect: bool,
    pub detect_timeout_ms: u64,
}

impl Default for CurrencyConfig {
    fn default() -> Self {
        Self {
            default: DEFAULT_CURRENCY.to_string(),
            geo_endpoint: Some("https://ipapi.co/json/".to_string()),
            detect: true,
            detect_timeout_ms: 2_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparisonConfig {
    pub max_items: usize,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            max_items: DEFAULT_MAX_ITEMS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub storage_path: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            storage_path: "./.storefront".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub json: bool,
}

impl StorefrontConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| StorefrontError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` references with environment values.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| StorefrontError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_url("api.base_url", &self.api.base_url)?;
        validate_range("api.timeout_seconds", self.api.timeout_seconds, 1, 300)?;
        validate_range("api.retry_attempts", self.api.retry_attempts, 1, 10)?;

        if self.api.retry_base_delay_ms > self.api.retry_max_delay_ms {
            return Err(StorefrontError::InvalidConfigValueError {
                field: "api.retry_base_delay_ms".to_string(),
                value: self.api.retry_base_delay_ms.to_string(),
                reason: "must not exceed api.retry_max_delay_ms".to_string(),
            });
        }

        if !currency::table::is_supported(&self.currency.default) {
            return Err(StorefrontError::InvalidConfigValueError {
                field: "currency.default".to_string(),
                value: self.currency.default.clone(),
                reason: format!(
                    "Unsupported currency. Supported: {}",
                    currency::table::supported_codes().collect::<Vec<_>>().join(", ")
                ),
            });
        }

        validate_range(
            "currency.detect_timeout_ms",
            self.currency.detect_timeout_ms,
            100,
            30_000,
        )?;
        if let Some(endpoint) = &self.currency.geo_endpoint {
            validate_url("currency.geo_endpoint", endpoint)?;
        }

        validate_range("comparison.max_items", self.comparison.max_items, 2, 8)?;
        validate_path("session.storage_path", &self.session.storage_path)?;
        Ok(())
    }
}

impl ConfigProvider for StorefrontConfig {
    fn api_base_url(&self) -> &str {
        &self.api.base_url
    }

    fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.api.retry_attempts,
            base_delay: Duration::from_millis(self.api.retry_base_delay_ms),
            max_delay: Duration::from_millis(self.api.retry_max_delay_ms),
            timeout: Duration::from_secs(self.api.timeout_seconds),
        }
    }

    fn detection_policy(&self) -> RetryPolicy {
        RetryPolicy::no_retry(Duration::from_millis(self.currency.detect_timeout_ms))
    }

    fn default_currency(&self) -> &str {
        &self.currency.default
    }

    fn max_comparison_items(&self) -> usize {
        self.comparison.max_items
    }
}

impl Validate for StorefrontConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[api]
base_url = "https://api.example.com/v1"
timeout_seconds = 5
retry_attempts = 4
retry_base_delay_ms = 100
retry_max_delay_ms = 1000

[currency]
default = "KES"
detect = false

[comparison]
max_items = 3

[session]
storage_path = "/tmp/storefront"
"#;

        let config = StorefrontConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.api_base_url(), "https://api.example.com/v1");
        assert_eq!(config.default_currency(), "KES");
        assert_eq!(config.max_comparison_items(), 3);

        let policy = config.retry_policy();
        assert_eq!(policy.max_attempts, 4);
        assert_eq!(policy.timeout, Duration::from_secs(5));
        assert_eq!(policy.base_delay, Duration::from_millis(100));
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config = StorefrontConfig::from_toml_str("").unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.default_currency(), "USD");
        assert_eq!(config.max_comparison_items(), 4);
        assert!(config.currency.detect);

        let detection = config.detection_policy();
        assert_eq!(detection.max_attempts, 1);
        assert_eq!(detection.timeout, Duration::from_millis(2_000));
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("STOREFRONT_TEST_API_URL", "https://cars.example.org/api");

        let toml_content = r#"
[api]
base_url = "${STOREFRONT_TEST_API_URL}"
"#;

        let config = StorefrontConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.api.base_url, "https://cars.example.org/api");

        std::env::remove_var("STOREFRONT_TEST_API_URL");
    }

    #[test]
    fn test_config_validation() {
        let config = StorefrontConfig::from_toml_str("[currency]\ndefault = \"XYZ\"\n").unwrap();
        assert!(config.validate().is_err());

        let config = StorefrontConfig::from_toml_str("[api]\nbase_url = \"invalid-url\"\n").unwrap();
        assert!(config.validate().is_err());

        let config = StorefrontConfig::from_toml_str("[comparison]\nmax_items = 1\n").unwrap();
        assert!(config.validate().is_err());

        let config = StorefrontConfig::from_toml_str("[currency]\ndetect_timeout_ms = 60000\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[comparison]\nmax_items = 2\n")
            .unwrap();

        let config = StorefrontConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.comparison.max_items, 2);
    }
}
