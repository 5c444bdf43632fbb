use crate::core::currency::country_from_locale;
use crate::domain::ports::GeoLocator;
use crate::utils::error::{Result, StorefrontError};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

#[derive(Debug, Deserialize)]
struct GeoResponse {
    country_code: Option<String>,
    country: Option<String>,
}

/// Country lookup through an IP geolocation service returning
/// `{"country_code": "KE", ...}`.
#[derive(Debug, Clone)]
pub struct IpGeoLocator {
    client: Client,
    endpoint: Url,
}

impl IpGeoLocator {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            endpoint: Url::parse(endpoint)?,
        })
    }
}

#[async_trait]
impl GeoLocator for IpGeoLocator {
    async fn country_code(&self) -> Result<String> {
        tracing::debug!("Looking up country via {}", self.endpoint);
        let response = self.client.get(self.endpoint.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(StorefrontError::ApiError {
                status: status.as_u16(),
                message: "geolocation lookup failed".to_string(),
            });
        }

        let body: GeoResponse = response.json().await?;
        body.country_code
            .or(body.country)
            .map(|c| c.trim().to_ascii_uppercase())
            .filter(|c| c.len() == 2)
            .ok_or_else(|| StorefrontError::DetectionError {
                message: "response did not include a country code".to_string(),
            })
    }
}

/// Offline detection from a locale tag such as `en-KE`.
#[derive(Debug, Clone)]
pub struct LocaleLocator {
    locale: String,
}

impl LocaleLocator {
    pub fn new(locale: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
        }
    }

    /// Reads `LC_ALL`, then `LANG` (e.g. `en_KE.UTF-8`).
    pub fn from_env() -> Option<Self> {
        ["LC_ALL", "LANG"]
            .iter()
            .filter_map(|key| std::env::var(key).ok())
            .find(|v| !v.is_empty())
            .map(|v| Self::new(v.split('.').next().unwrap_or_default().to_string()))
    }
}

#[async_trait]
impl GeoLocator for LocaleLocator {
    async fn country_code(&self) -> Result<String> {
        country_from_locale(&self.locale).ok_or_else(|| StorefrontError::DetectionError {
            message: format!("locale '{}' has no region", self.locale),
        })
    }
}
