//! Currency resolution, formatting and the shared currency context.

pub mod context;
pub mod format;
pub mod resolve;
pub mod table;

pub const DEFAULT_CURRENCY: &str = "USD";

pub use context::{CurrencyContext, CurrencySnapshot, CurrencyStatus};
pub use format::{format_amount, parse_amount, try_format};
pub use resolve::{country_from_locale, currency_for_country, resolve_currency};
pub use table::{descriptor, CurrencyDescriptor};
