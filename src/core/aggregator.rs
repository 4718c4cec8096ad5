//! Reduction of accepted sales into an [`AggregateResult`].

use crate::domain::model::{AggregateResult, TopProducts, ValidSale};
use std::collections::HashMap;

pub const DEFAULT_TOP_N: usize = 3;

/// 金額計算策略
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum AmountStrategy {
    /// `price * quantity`
    #[default]
    Standard,
    /// `price * quantity * (1 - rate)`, `rate` in `[0, 1)`.
    Discounted { rate: f64 },
}

impl AmountStrategy {
    pub fn amount(&self, sale: &ValidSale) -> f64 {
        match self {
            AmountStrategy::Standard => sale.amount(),
            AmountStrategy::Discounted { rate } => sale.amount() * (1.0 - rate),
        }
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Running totals over accepted sales. Sums stay unrounded until [`finish`].
///
/// [`finish`]: SalesAccumulator::finish
#[derive(Debug, Clone, Default)]
pub struct SalesAccumulator {
    total: f64,
    // (product, unrounded sum) in first-seen order
    groups: Vec<(String, f64)>,
    index: HashMap<String, usize>,
}

impl SalesAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(mut self, product: &str, amount: f64) -> Self {
        self.total += amount;
        match self.index.get(product) {
            Some(&i) => self.groups[i].1 += amount,
            None => {
                self.index.insert(product.to_string(), self.groups.len());
                self.groups.push((product.to_string(), amount));
            }
        }
        self
    }

    pub fn unrounded_total(&self) -> f64 {
        self.total
    }

    pub fn finish(self, top_n: usize) -> AggregateResult {
        let unique_products = self.groups.iter().map(|(name, _)| name.clone()).collect();

        let mut ranked: Vec<(String, f64)> = self
            .groups
            .into_iter()
            .map(|(name, sum)| (name, round2(sum)))
            .collect();
        // sort_by is stable: equal amounts keep first-seen order
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked.truncate(top_n);

        AggregateResult {
            total_amount: round2(self.total),
            unique_products,
            top_products: TopProducts(ranked),
        }
    }
}

pub fn aggregate(sales: &[ValidSale], top_n: usize) -> AggregateResult {
    aggregate_with(sales, top_n, AmountStrategy::Standard)
}

pub fn aggregate_with(sales: &[ValidSale], top_n: usize, strategy: AmountStrategy) -> AggregateResult {
    if sales.is_empty() {
        tracing::info!("No valid sales data");
        return AggregateResult::default();
    }

    let result = sales
        .iter()
        .fold(SalesAccumulator::new(), |acc, sale| {
            acc.add(&sale.product, strategy.amount(sale))
        })
        .finish(top_n);

    tracing::debug!(
        "Aggregated {} sales into {} products, total {:.2}",
        sales.len(),
        result.unique_products.len(),
        result.total_amount
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn sale(product: &str, price: f64, quantity: u32) -> ValidSale {
        ValidSale {
            product: product.to_string(),
            price,
            quantity,
            raw_fields: BTreeMap::new(),
        }
    }

    #[test]
    fn test_scenario_a_totals() {
        let sales = vec![sale("Halal Laptop", 999.99, 2), sale("Halal Mouse", 24.99, 10)];
        let result = aggregate(&sales, DEFAULT_TOP_N);

        assert_eq!(result.total_amount, 2249.88);
        assert_eq!(result.unique_products, vec!["Halal Laptop", "Halal Mouse"]);
        assert_eq!(result.top_products.names(), vec!["Halal Laptop", "Halal Mouse"]);
        assert_eq!(result.top_products.get("Halal Laptop"), Some(1999.98));
        assert_eq!(result.top_products.get("Halal Mouse"), Some(249.9));
    }

    #[test]
    fn test_empty_input_is_not_an_error() {
        let result = aggregate(&[], DEFAULT_TOP_N);
        assert_eq!(result.total_amount, 0.0);
        assert!(result.unique_products.is_empty());
        assert!(result.top_products.is_empty());
    }

    #[test]
    fn test_groups_sum_per_product_and_limit_to_top_n() {
        let sales = vec![
            sale("Halal A", 10.0, 1),
            sale("Halal B", 50.0, 1),
            sale("Halal A", 45.0, 1),
            sale("Halal C", 20.0, 1),
            sale("Halal D", 5.5, 2),
        ];
        let result = aggregate(&sales, 3);

        assert_eq!(result.unique_products.len(), 4);
        assert_eq!(result.top_products.len(), 3);
        assert_eq!(
            result.top_products.0,
            vec![
                ("Halal A".to_string(), 55.0),
                ("Halal B".to_string(), 50.0),
                ("Halal C".to_string(), 20.0),
            ]
        );
        assert_eq!(result.total_amount, 136.0);
    }

    #[test]
    fn test_ties_keep_first_occurrence_order() {
        let sales = vec![
            sale("Halal Zeta", 10.0, 3),
            sale("Halal Alpha", 30.0, 1),
            sale("Halal Mid", 15.0, 2),
            sale("Halal Big", 100.0, 1),
        ];
        let result = aggregate(&sales, 4);
        assert_eq!(
            result.top_products.names(),
            vec!["Halal Big", "Halal Zeta", "Halal Alpha", "Halal Mid"]
        );
    }

    #[test]
    fn test_total_and_products_independent_of_order() {
        let sales = vec![
            sale("Halal Laptop", 999.99, 2),
            sale("Halal Mouse", 24.99, 10),
            sale("Halal Keyboard", 49.99, 5),
            sale("Halal Mouse", 24.99, 1),
        ];
        let mut reversed = sales.clone();
        reversed.reverse();

        let forward = aggregate(&sales, 3);
        let backward = aggregate(&reversed, 3);

        assert_eq!(forward.total_amount, backward.total_amount);
        let mut a = forward.unique_products.clone();
        let mut b = backward.unique_products.clone();
        a.sort();
        b.sort();
        assert_eq!(a, b);
    }

    #[test]
    fn test_aggregate_is_idempotent() {
        let sales = vec![sale("Halal Laptop", 999.99, 2), sale("Halal Mouse", 24.99, 10)];
        let first = aggregate(&sales, 3);
        let second = aggregate(&sales, 3);
        assert_eq!(first, second);
        assert_eq!(first.total_amount.to_bits(), second.total_amount.to_bits());
    }

    #[test]
    fn test_total_rounded_once_at_the_end() {
        // per-record rounding would turn each 0.004 into 0.0
        let sales = vec![
            sale("Halal Gum", 0.004, 1),
            sale("Halal Gum", 0.004, 1),
            sale("Halal Gum", 0.004, 1),
        ];
        let acc = sales
            .iter()
            .fold(SalesAccumulator::new(), |acc, s| acc.add(&s.product, s.amount()));
        assert!((acc.unrounded_total() - 0.012).abs() < 1e-12);
        assert_eq!(aggregate(&sales, 3).total_amount, 0.01);
    }

    #[test]
    fn test_discounted_strategy() {
        let sales = vec![sale("Halal Laptop", 999.99, 2)];
        let result = aggregate_with(&sales, 3, AmountStrategy::Discounted { rate: 0.1 });
        assert_eq!(result.total_amount, 1799.98);
        assert_eq!(result.top_products.get("Halal Laptop"), Some(1799.98));
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(249.89999999999998), 249.9);
        assert_eq!(round2(1999.98), 1999.98);
        assert_eq!(round2(0.0), 0.0);
    }
}
