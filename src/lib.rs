pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::Cli;

pub use adapters::{ApiClient, IpGeoLocator, LocalStorage, LocaleLocator};
pub use config::StorefrontConfig;
pub use crate::core::{
    comparison::{ComparisonSet, ComparisonTable},
    currency::CurrencyContext,
    storefront::Storefront,
};
pub use utils::error::{Result, StorefrontError};
