#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolPosition {
    Prefix,
    Suffix,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrencyDescriptor {
    pub code: &'static str,
    pub symbol: &'static str,
    pub locale: &'static str,
    pub name: &'static str,
    pub position: SymbolPosition,
    /// Whether a space separates the symbol from the digits.
    pub spaced: bool,
    pub group_separator: char,
    pub decimal_separator: char,
}

const fn prefix(
    code: &'static str,
    symbol: &'static str,
    locale: &'static str,
    name: &'static str,
    spaced: bool,
) -> CurrencyDescriptor {
    CurrencyDescriptor {
        code,
        symbol,
        locale,
        name,
        position: SymbolPosition::Prefix,
        spaced,
        group_separator: ',',
        decimal_separator: '.',
    }
}

pub static CURRENCIES: &[CurrencyDescriptor] = &[
    prefix("USD", "$", "en-US", "US Dollar", false),
    CurrencyDescriptor {
        code: "EUR",
        symbol: "€",
        locale: "de-DE",
        name: "Euro",
        position: SymbolPosition::Suffix,
        spaced: true,
        group_separator: '.',
        decimal_separator: ',',
    },
    prefix("GBP", "£", "en-GB", "British Pound", false),
    prefix("JPY", "¥", "ja-JP", "Japanese Yen", false),
    prefix("KES", "KSh", "en-KE", "Kenyan Shilling", true),
    prefix("UGX", "USh", "en-UG", "Ugandan Shilling", true),
    prefix("TZS", "TSh", "en-TZ", "Tanzanian Shilling", true),
    prefix("NGN", "₦", "en-NG", "Nigerian Naira", false),
    CurrencyDescriptor {
        code: "ZAR",
        symbol: "R",
        locale: "en-ZA",
        name: "South African Rand",
        position: SymbolPosition::Prefix,
        spaced: true,
        group_separator: ' ',
        decimal_separator: ',',
    },
    prefix("CAD", "CA$", "en-CA", "Canadian Dollar", false),
    prefix("AUD", "A$", "en-AU", "Australian Dollar", false),
    prefix("AED", "AED", "en-AE", "UAE Dirham", true),
];

pub fn descriptor(code: &str) -> Option<&'static CurrencyDescriptor> {
    let code = code.trim();
    CURRENCIES
        .iter()
        .find(|d| d.code.eq_ignore_ascii_case(code))
}

pub fn is_supported(code: &str) -> bool {
    descriptor(code).is_some()
}

pub fn supported_codes() -> impl Iterator<Item = &'static str> {
    CURRENCIES.iter().map(|d| d.code)
}
