use crate::domain::model::Car;
use crate::utils::error::{Result, StorefrontError};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Number(f64),
    Text(String),
    Missing,
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) if n.fract() == 0.0 => write!(f, "{:.0}", n),
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => f.write_str(s),
            Self::Missing => f.write_str("-"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureRow {
    pub feature: &'static str,
    pub values: Vec<FeatureValue>,
    /// Set when the compared cars do not all share the same value.
    pub differs: bool,
}

impl FeatureRow {
    fn new(feature: &'static str, values: Vec<FeatureValue>) -> Self {
        let differs = values.windows(2).any(|pair| pair[0] != pair[1]);
        Self {
            feature,
            values,
            differs,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Range<T> {
    pub min: T,
    pub max: T,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonSummary {
    pub price_range: Range<f64>,
    pub year_range: Range<u16>,
    /// Id of the first car with the highest rating.
    pub top_rated: Option<String>,
    /// Id of the first car with the highest rating-to-price ratio.
    pub best_value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonTable {
    /// Column labels, in input order.
    pub cars: Vec<String>,
    pub car_ids: Vec<String>,
    pub rows: Vec<FeatureRow>,
    pub summary: ComparisonSummary,
}

impl ComparisonTable {
    pub fn row(&self, feature: &str) -> Option<&FeatureRow> {
        self.rows.iter().find(|r| r.feature == feature)
    }

    pub fn differing_rows(&self) -> impl Iterator<Item = &FeatureRow> {
        self.rows.iter().filter(|r| r.differs)
    }
}

fn text(s: impl fmt::Display) -> FeatureValue {
    FeatureValue::Text(s.to_string())
}

fn column(cars: &[Car], value: impl Fn(&Car) -> FeatureValue) -> Vec<FeatureValue> {
    cars.iter().map(value).collect()
}

fn feature_rows(cars: &[Car]) -> Vec<FeatureRow> {
    vec![
        FeatureRow::new("Price", column(cars, |c| FeatureValue::Number(c.price))),
        FeatureRow::new("Currency", column(cars, |c| text(&c.currency))),
        FeatureRow::new("Year", column(cars, |c| FeatureValue::Number(f64::from(c.year)))),
        FeatureRow::new("Make", column(cars, |c| text(&c.make))),
        FeatureRow::new("Model", column(cars, |c| text(&c.model))),
        FeatureRow::new("Mileage", column(cars, |c| FeatureValue::Number(f64::from(c.mileage)))),
        FeatureRow::new("Condition", column(cars, |c| text(c.condition))),
        FeatureRow::new("Stock type", column(cars, |c| text(c.stock_type))),
        FeatureRow::new(
            "Import status",
            column(cars, |c| c.import_status.map(text).unwrap_or(FeatureValue::Missing)),
        ),
        FeatureRow::new(
            "Rating",
            column(cars, |c| c.rating.map(FeatureValue::Number).unwrap_or(FeatureValue::Missing)),
        ),
    ]
}

/// First car reaching the maximum score; later ties never replace it.
fn first_max<'a>(scored: impl Iterator<Item = (&'a Car, f64)>) -> Option<&'a Car> {
    let mut best: Option<(&Car, f64)> = None;
    for (car, score) in scored {
        if !score.is_finite() {
            continue;
        }
        match best {
            Some((_, top)) if score <= top => {}
            _ => best = Some((car, score)),
        }
    }
    best.map(|(car, _)| car)
}

fn summarize(cars: &[Car]) -> ComparisonSummary {
    let price_range = Range {
        min: cars.iter().map(|c| c.price).fold(f64::INFINITY, f64::min),
        max: cars.iter().map(|c| c.price).fold(f64::NEG_INFINITY, f64::max),
    };
    let year_range = Range {
        min: cars.iter().map(|c| c.year).min().unwrap_or_default(),
        max: cars.iter().map(|c| c.year).max().unwrap_or_default(),
    };

    let top_rated = first_max(cars.iter().filter_map(|c| c.rating.map(|r| (c, r))));
    let best_value = first_max(
        cars.iter()
            .filter(|c| c.price > 0.0)
            .filter_map(|c| c.rating.map(|r| (c, r / c.price))),
    );

    ComparisonSummary {
        price_range,
        year_range,
        top_rated: top_rated.map(|c| c.id.clone()),
        best_value: best_value.map(|c| c.id.clone()),
    }
}

/// Builds the side-by-side table for the given cars, in the order given.
pub fn generate(cars: &[Car]) -> Result<ComparisonTable> {
    if cars.len() < 2 {
        return Err(StorefrontError::validation(
            "comparison",
            format!("select at least 2 cars to compare, got {}", cars.len()),
        ));
    }

    tracing::debug!("Generating comparison for {} cars", cars.len());

    Ok(ComparisonTable {
        cars: cars.iter().map(Car::label).collect(),
        car_ids: cars.iter().map(|c| c.id.clone()).collect(),
        rows: feature_rows(cars),
        summary: summarize(cars),
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::model::{Condition, StockType};

    pub(crate) fn car(id: &str, price: f64, rating: Option<f64>, year: u16) -> Car {
        Car {
            id: id.to_string(),
            make: "Toyota".to_string(),
            model: "Corolla".to_string(),
            year,
            price,
            currency: "USD".to_string(),
            mileage: 30_000,
            condition: Condition::Used,
            images: vec![],
            stock_type: StockType::Local,
            import_status: None,
            rating,
            created_at: None,
        }
    }

    #[test]
    fn test_reference_example() {
        let cars = vec![
            car("a", 20_000.0, Some(4.0), 2020),
            car("b", 25_000.0, Some(4.5), 2021),
        ];
        let table = generate(&cars).unwrap();

        assert_eq!(table.summary.price_range, Range { min: 20_000.0, max: 25_000.0 });
        assert_eq!(table.summary.year_range, Range { min: 2020, max: 2021 });
        assert_eq!(table.summary.top_rated.as_deref(), Some("b"));
        // 4 / 20000 = 0.0002 beats 4.5 / 25000 = 0.00018
        assert_eq!(table.summary.best_value.as_deref(), Some("a"));
    }

    #[test]
    fn test_ties_pick_first() {
        let cars = vec![
            car("a", 10_000.0, Some(4.0), 2020),
            car("b", 10_000.0, Some(4.0), 2020),
            car("c", 20_000.0, Some(3.0), 2020),
        ];
        let summary = generate(&cars).unwrap().summary;
        assert_eq!(summary.top_rated.as_deref(), Some("a"));
        assert_eq!(summary.best_value.as_deref(), Some("a"));
    }

    #[test]
    fn test_best_value_skips_non_positive_prices() {
        let cars = vec![
            car("free", 0.0, Some(5.0), 2020),
            car("negative", -100.0, Some(5.0), 2020),
            car("paid", 30_000.0, Some(3.0), 2020),
        ];
        let summary = generate(&cars).unwrap().summary;
        assert_eq!(summary.best_value.as_deref(), Some("paid"));
        assert_eq!(summary.top_rated.as_deref(), Some("free"));
    }

    #[test]
    fn test_best_value_undefined_when_no_positive_price() {
        let cars = vec![car("a", 0.0, Some(4.0), 2020), car("b", -1.0, Some(4.0), 2021)];
        assert_eq!(generate(&cars).unwrap().summary.best_value, None);
    }

    #[test]
    fn test_unrated_cars_are_ignored_for_picks() {
        let cars = vec![car("a", 10_000.0, None, 2020), car("b", 12_000.0, None, 2020)];
        let summary = generate(&cars).unwrap().summary;
        assert_eq!(summary.top_rated, None);
        assert_eq!(summary.best_value, None);
    }

    #[test]
    fn test_difference_flags() {
        let mut second = car("b", 20_000.0, Some(4.0), 2021);
        second.import_status = Some(crate::domain::model::ImportStatus::Pending);
        let cars = vec![car("a", 20_000.0, Some(4.0), 2020), second];
        let table = generate(&cars).unwrap();

        assert!(!table.row("Price").unwrap().differs);
        assert!(!table.row("Make").unwrap().differs);
        assert!(!table.row("Rating").unwrap().differs);
        assert!(table.row("Year").unwrap().differs);
        assert!(table.row("Import status").unwrap().differs);
        assert_eq!(table.differing_rows().count(), 2);
    }

    #[test]
    fn test_preserves_input_order() {
        let cars = vec![
            car("z", 30_000.0, Some(3.0), 2022),
            car("a", 10_000.0, Some(5.0), 2018),
        ];
        let table = generate(&cars).unwrap();
        assert_eq!(table.car_ids, vec!["z", "a"]);
        assert_eq!(
            table.row("Price").unwrap().values,
            vec![FeatureValue::Number(30_000.0), FeatureValue::Number(10_000.0)]
        );
    }

    #[test]
    fn test_ranges_are_ordered_for_small_sets() {
        let prices = [45_000.0, 12_500.0, 33_000.0, 12_500.0];
        let years = [2015, 2023, 2019, 2011];
        for size in 2..=4 {
            let cars: Vec<Car> = (0..size)
                .map(|i| car(&i.to_string(), prices[i], Some(4.0), years[i]))
                .collect();
            let summary = generate(&cars).unwrap().summary;
            assert!(summary.price_range.min <= summary.price_range.max);
            assert!(summary.year_range.min <= summary.year_range.max);
        }
    }

    #[test]
    fn test_requires_two_cars() {
        assert!(generate(&[]).is_err());
        assert!(generate(&[car("a", 1.0, None, 2020)]).is_err());
    }
}
