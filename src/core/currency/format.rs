use super::table::{self, CurrencyDescriptor, SymbolPosition};
use super::DEFAULT_CURRENCY;
use crate::utils::error::{Result, StorefrontError};

/// Shown when an amount cannot be rendered at all.
pub const FALLBACK_DISPLAY: &str = "N/A";

/// Formats a whole-currency amount: symbol, digit grouping, no decimals.
pub fn try_format(amount: f64, code: &str) -> Result<String> {
    let descriptor = table::descriptor(code).ok_or_else(|| StorefrontError::UnsupportedCurrency {
        code: code.to_string(),
    })?;
    render(amount, descriptor)
}

/// Never fails: unsupported codes are formatted in the default currency,
/// anything else degrades to [`FALLBACK_DISPLAY`].
pub fn format_amount(amount: f64, code: &str) -> String {
    format_with_fallback(amount, code, true)
}

fn format_with_fallback(amount: f64, code: &str, allow_fallback: bool) -> String {
    match try_format(amount, code) {
        Ok(formatted) => formatted,
        Err(StorefrontError::UnsupportedCurrency { .. }) if allow_fallback => {
            tracing::debug!("Unsupported currency {}, formatting as {}", code, DEFAULT_CURRENCY);
            format_with_fallback(amount, DEFAULT_CURRENCY, false)
        }
        Err(e) => {
            tracing::debug!("Currency formatting degraded: {}", e);
            FALLBACK_DISPLAY.to_string()
        }
    }
}

fn render(amount: f64, d: &CurrencyDescriptor) -> Result<String> {
    if !amount.is_finite() {
        return Err(StorefrontError::NonFiniteAmount);
    }

    let rounded = amount.round();
    let negative = rounded < 0.0;
    let digits = group_digits(&format!("{:.0}", rounded.abs()), d.group_separator);
    let gap = if d.spaced { " " } else { "" };
    let sign = if negative { "-" } else { "" };

    Ok(match d.position {
        SymbolPosition::Prefix => format!("{}{}{}{}", sign, d.symbol, gap, digits),
        SymbolPosition::Suffix => format!("{}{}{}{}", sign, digits, gap, d.symbol),
    })
}

fn group_digits(digits: &str, separator: char) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(separator);
        }
        grouped.push(ch);
    }
    grouped
}

/// Reads back a string produced by [`try_format`] for the same currency.
pub fn parse_amount(text: &str, code: &str) -> Option<f64> {
    let d = table::descriptor(code)?;
    let body = text.trim();
    let negative = body.starts_with('-');
    let body = body.trim_start_matches('-').replace(d.symbol, "");

    let mut normalized = String::with_capacity(body.len());
    for ch in body.chars() {
        if ch.is_ascii_digit() {
            normalized.push(ch);
        } else if ch == d.decimal_separator {
            normalized.push('.');
        } else if ch == d.group_separator || ch.is_whitespace() {
            continue;
        } else {
            return None;
        }
    }

    let value: f64 = normalized.parse().ok()?;
    Some(if negative { -value } else { value })
}
