pub mod catalog;
pub mod comparison;
pub mod currency;
pub mod session;
pub mod storefront;

pub use crate::domain::model::{Car, Condition, ImportStatus, StockType};
pub use crate::domain::ports::{ConfigProvider, GeoLocator, Storage};
pub use crate::utils::error::Result;
