// Adapters layer: concrete implementations for external systems (REST API, geolocation, storage).

pub mod geo;
pub mod http;
pub mod storage;

pub use geo::{IpGeoLocator, LocaleLocator};
pub use http::ApiClient;
pub use storage::LocalStorage;
