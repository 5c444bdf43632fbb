use super::generate::{generate, ComparisonTable};
use crate::domain::model::Car;
use crate::utils::error::Result;

pub const DEFAULT_MAX_ITEMS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    AlreadyPresent,
    Full,
}

/// Ordered, duplicate-free, bounded selection of cars to compare.
#[derive(Debug, Clone)]
pub struct ComparisonSet {
    cars: Vec<Car>,
    max_items: usize,
}

impl ComparisonSet {
    pub fn new(max_items: usize) -> Self {
        let max_items = max_items.max(1);
        Self {
            cars: Vec::with_capacity(max_items),
            max_items,
        }
    }

    pub fn add(&mut self, car: Car) -> AddOutcome {
        if self.contains(&car.id) {
            return AddOutcome::AlreadyPresent;
        }
        if self.is_full() {
            tracing::debug!("Comparison set full, ignoring {}", car.id);
            return AddOutcome::Full;
        }
        self.cars.push(car);
        AddOutcome::Added
    }

    /// Returns false when `id` was not in the set.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.cars.len();
        self.cars.retain(|c| c.id != id);
        self.cars.len() != before
    }

    pub fn clear(&mut self) {
        self.cars.clear();
    }

    pub fn contains(&self, id: &str) -> bool {
        self.cars.iter().any(|c| c.id == id)
    }

    pub fn len(&self) -> usize {
        self.cars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cars.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.cars.len() >= self.max_items
    }

    pub fn max_items(&self) -> usize {
        self.max_items
    }

    pub fn cars(&self) -> &[Car] {
        &self.cars
    }

    pub fn ids(&self) -> Vec<&str> {
        self.cars.iter().map(|c| c.id.as_str()).collect()
    }

    pub fn generate(&self) -> Result<ComparisonTable> {
        generate(&self.cars)
    }
}

impl Default for ComparisonSet {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ITEMS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::comparison::generate::tests::car;

    #[test]
    fn test_add_duplicate_is_noop() {
        let mut set = ComparisonSet::default();
        assert_eq!(set.add(car("a", 1.0, None, 2020)), AddOutcome::Added);
        assert_eq!(set.add(car("a", 2.0, None, 2021)), AddOutcome::AlreadyPresent);
        assert_eq!(set.len(), 1);
        assert_eq!(set.cars()[0].price, 1.0);
    }

    #[test]
    fn test_capacity_is_enforced() {
        let mut set = ComparisonSet::new(2);
        set.add(car("a", 1.0, None, 2020));
        set.add(car("b", 1.0, None, 2020));
        assert!(set.is_full());
        assert_eq!(set.add(car("c", 1.0, None, 2020)), AddOutcome::Full);
        assert_eq!(set.ids(), vec!["a", "b"]);
    }

    #[test]
    fn test_remove_non_member_is_noop() {
        let mut set = ComparisonSet::default();
        set.add(car("a", 1.0, None, 2020));
        assert!(!set.remove("zzz"));
        assert_eq!(set.len(), 1);
        assert!(set.remove("a"));
        assert!(set.is_empty());
    }

    #[test]
    fn test_removal_frees_a_slot_and_keeps_order() {
        let mut set = ComparisonSet::new(3);
        for id in ["a", "b", "c"] {
            set.add(car(id, 1.0, None, 2020));
        }
        set.remove("b");
        assert_eq!(set.add(car("d", 1.0, None, 2020)), AddOutcome::Added);
        assert_eq!(set.ids(), vec!["a", "c", "d"]);
    }

    #[test]
    fn test_generate_from_set() {
        let mut set = ComparisonSet::default();
        set.add(car("a", 20_000.0, Some(4.0), 2020));
        assert!(set.generate().is_err());
        set.add(car("b", 25_000.0, Some(4.5), 2021));
        let table = set.generate().unwrap();
        assert_eq!(table.car_ids, vec!["a", "b"]);
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let set = ComparisonSet::new(0);
        assert_eq!(set.max_items(), 1);
    }
}
