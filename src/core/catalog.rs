//! Listing filters with make → model cascading.

use crate::domain::model::{Car, Condition, ImportStatus, StockType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CarFilter {
    pub make: Option<String>,
    pub model: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub min_year: Option<u16>,
    pub max_year: Option<u16>,
    pub max_mileage: Option<u32>,
    pub condition: Option<Condition>,
    pub stock_type: Option<StockType>,
    pub import_status: Option<ImportStatus>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    PriceAsc,
    PriceDesc,
    Newest,
    LowestMileage,
}

fn same_text(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

impl CarFilter {
    /// Changing the make drops a model that belonged to the old make.
    pub fn with_make(mut self, make: Option<String>) -> Self {
        let changed = match (&self.make, &make) {
            (Some(old), Some(new)) => !same_text(old, new),
            (None, None) => false,
            _ => true,
        };
        if changed {
            self.model = None;
        }
        self.make = make;
        self
    }

    /// Ignored when no make is selected.
    pub fn with_model(mut self, model: Option<String>) -> Self {
        self.model = if self.make.is_some() { model } else { None };
        self
    }

    fn matches_make_model(&self, car: &Car) -> bool {
        self.make.as_deref().map_or(true, |m| same_text(&car.make, m))
            && self.model.as_deref().map_or(true, |m| same_text(&car.model, m))
    }

    pub fn matches(&self, car: &Car) -> bool {
        self.matches_make_model(car)
            && self.min_price.map_or(true, |p| car.price >= p)
            && self.max_price.map_or(true, |p| car.price <= p)
            && self.min_year.map_or(true, |y| car.year >= y)
            && self.max_year.map_or(true, |y| car.year <= y)
            && self.max_mileage.map_or(true, |m| car.mileage <= m)
            && self.condition.map_or(true, |c| car.condition == c)
            && self.stock_type.map_or(true, |s| car.stock_type == s)
            && self
                .import_status
                .map_or(true, |s| car.import_status == Some(s))
            && self.search.as_deref().map_or(true, |q| {
                let q = q.trim().to_lowercase();
                q.is_empty() || car.label().to_lowercase().contains(&q)
            })
    }

    /// Matching cars in input order.
    pub fn apply<'a>(&self, cars: &'a [Car]) -> Vec<&'a Car> {
        cars.iter().filter(|c| self.matches(c)).collect()
    }

    /// Query parameters for `GET /cars`.
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        let mut push = |key: &'static str, value: Option<String>| {
            if let Some(v) = value {
                query.push((key, v));
            }
        };

        push("make", self.make.clone());
        push("model", self.model.clone());
        push("min_price", self.min_price.map(|v| v.to_string()));
        push("max_price", self.max_price.map(|v| v.to_string()));
        push("min_year", self.min_year.map(|v| v.to_string()));
        push("max_year", self.max_year.map(|v| v.to_string()));
        push("max_mileage", self.max_mileage.map(|v| v.to_string()));
        push("condition", self.condition.map(|v| wire_name(&v)));
        push("stock_type", self.stock_type.map(|v| wire_name(&v)));
        push("import_status", self.import_status.map(|v| wire_name(&v)));
        push("search", self.search.clone().filter(|s| !s.trim().is_empty()));
        query
    }
}

fn wire_name<T: Serialize>(value: &T) -> String {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::String(s)) => s,
        _ => String::new(),
    }
}

/// Choices offered by the filter panel, narrowed by the current selection.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterOptions {
    pub makes: Vec<String>,
    /// Empty until a make is selected.
    pub models: Vec<String>,
    pub years: Vec<u16>,
    pub price_bounds: Option<(f64, f64)>,
}

impl FilterOptions {
    pub fn cascade(cars: &[Car], filter: &CarFilter) -> Self {
        let makes: BTreeSet<&str> = cars.iter().map(|c| c.make.as_str()).collect();

        let models: BTreeSet<&str> = match filter.make.as_deref() {
            Some(make) => cars
                .iter()
                .filter(|c| same_text(&c.make, make))
                .map(|c| c.model.as_str())
                .collect(),
            None => BTreeSet::new(),
        };

        let narrowed: Vec<&Car> = cars
            .iter()
            .filter(|c| filter.matches_make_model(c))
            .collect();
        let years: BTreeSet<u16> = narrowed.iter().map(|c| c.year).collect();
        let price_bounds = narrowed.iter().map(|c| c.price).fold(None, |acc, p| match acc {
            None => Some((p, p)),
            Some((lo, hi)) => Some((f64::min(lo, p), f64::max(hi, p))),
        });

        Self {
            makes: makes.into_iter().map(str::to_string).collect(),
            models: models.into_iter().map(str::to_string).collect(),
            years: years.into_iter().rev().collect(),
            price_bounds,
        }
    }
}

/// Stable sort; equal keys keep listing order.
pub fn sort_cars(cars: &mut [&Car], order: SortOrder) {
    match order {
        SortOrder::PriceAsc => cars.sort_by(|a, b| a.price.total_cmp(&b.price)),
        SortOrder::PriceDesc => cars.sort_by(|a, b| b.price.total_cmp(&a.price)),
        SortOrder::Newest => cars.sort_by(|a, b| b.year.cmp(&a.year)),
        SortOrder::LowestMileage => cars.sort_by_key(|c| c.mileage),
    }
}
