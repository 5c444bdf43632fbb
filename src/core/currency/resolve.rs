use super::table;
use super::DEFAULT_CURRENCY;

const EURO_ZONE: &[&str] = &[
    "AT", "BE", "CY", "DE", "EE", "ES", "FI", "FR", "GR", "HR", "IE", "IT", "LT", "LU", "LV",
    "MT", "NL", "PT", "SI", "SK",
];

/// Maps a two-letter country code to its currency. Unknown or malformed
/// codes resolve to the default currency.
pub fn currency_for_country(country: &str) -> &'static str {
    let country = country.trim().to_ascii_uppercase();
    if EURO_ZONE.contains(&country.as_str()) {
        return "EUR";
    }

    match country.as_str() {
        "GB" => "GBP",
        "JP" => "JPY",
        "KE" => "KES",
        "UG" => "UGX",
        "TZ" => "TZS",
        "NG" => "NGN",
        "ZA" => "ZAR",
        "CA" => "CAD",
        "AU" => "AUD",
        "AE" => "AED",
        _ => DEFAULT_CURRENCY,
    }
}

/// Extracts the region from a locale tag such as `en-KE` or `sw_TZ`.
pub fn country_from_locale(locale: &str) -> Option<String> {
    let region = locale.trim().split(['-', '_']).skip(1).find(|part| {
        part.len() == 2 && part.chars().all(|c| c.is_ascii_alphabetic())
    })?;
    Some(region.to_ascii_uppercase())
}

/// An explicit, supported override wins over the detected country.
pub fn resolve_currency(country: Option<&str>, override_code: Option<&str>) -> &'static str {
    if let Some(d) = override_code.and_then(table::descriptor) {
        return d.code;
    }
    country.map(currency_for_country).unwrap_or(DEFAULT_CURRENCY)
}
