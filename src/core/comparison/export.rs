use super::generate::ComparisonTable;
use crate::core::currency::format_amount;
use crate::domain::model::Car;
use crate::utils::error::{Result, StorefrontError};

/// How prices are rendered in the exported sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceDisplay<'a> {
    Raw,
    Currency(&'a str),
}

impl<'a> PriceDisplay<'a> {
    /// Formatted in the shared listing currency; raw when the cars disagree.
    pub fn for_cars(cars: &'a [Car]) -> Self {
        match cars.split_first() {
            Some((first, rest)) if rest.iter().all(|c| c.currency == first.currency) => {
                Self::Currency(&first.currency)
            }
            _ => Self::Raw,
        }
    }
}

/// One row per feature, one column per car, header `Feature,<car label>...`.
pub fn to_csv(table: &ComparisonTable, prices: PriceDisplay<'_>) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header = Vec::with_capacity(table.cars.len() + 1);
    header.push("Feature".to_string());
    header.extend(table.cars.iter().cloned());
    writer.write_record(&header)?;

    for row in &table.rows {
        let mut record = Vec::with_capacity(row.values.len() + 1);
        record.push(row.feature.to_string());
        for value in &row.values {
            let cell = match (row.feature, value, prices) {
                ("Price", super::FeatureValue::Number(n), PriceDisplay::Currency(code)) => {
                    format_amount(*n, code)
                }
                _ => value.to_string(),
            };
            record.push(cell);
        }
        writer.write_record(&record)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| StorefrontError::IoError(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| StorefrontError::validation("export", e.to_string()))
}
