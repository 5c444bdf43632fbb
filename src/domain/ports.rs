use crate::utils::error::Result;
use crate::utils::retry::RetryPolicy;
use async_trait::async_trait;

/// Key/value persistence for the client-side session cache.
pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    /// Removing a missing entry is not an error.
    fn remove_file(&self, path: &str) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn api_base_url(&self) -> &str;
    fn retry_policy(&self) -> RetryPolicy;
    /// Currency lookup budget, kept short so listings are never held up.
    fn detection_policy(&self) -> RetryPolicy;
    fn default_currency(&self) -> &str;
    fn max_comparison_items(&self) -> usize;
}

/// Resolves the caller's two-letter country code, typically via IP lookup.
#[async_trait]
pub trait GeoLocator: Send + Sync {
    async fn country_code(&self) -> Result<String>;
}
