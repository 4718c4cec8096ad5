use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// 原始交易記錄 (驗證前)
///
/// The three sales fields are typed slots; anything else a source provides
/// (`userId`, `id`, `title`, ...) lands in `raw_fields`. A field the source did not
/// provide is `None`, never an empty default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    pub product: Option<String>,
    pub price: Option<String>,
    pub quantity: Option<String>,
    pub raw_fields: BTreeMap<String, String>,
}

impl RawRecord {
    pub fn new(product: &str, price: &str, quantity: &str) -> Self {
        Self {
            product: Some(product.to_string()),
            price: Some(price.to_string()),
            quantity: Some(quantity.to_string()),
            raw_fields: BTreeMap::new(),
        }
    }

    /// Look a field up by name across the typed slots and `raw_fields`.
    pub fn get(&self, name: &str) -> Option<&str> {
        match name {
            "product" => self.product.as_deref(),
            "price" => self.price.as_deref(),
            "quantity" => self.quantity.as_deref(),
            other => self.raw_fields.get(other).map(String::as_str),
        }
    }

    pub fn set(&mut self, name: &str, value: String) {
        match name {
            "product" => self.product = Some(value),
            "price" => self.price = Some(value),
            "quantity" => self.quantity = Some(value),
            other => {
                self.raw_fields.insert(other.to_string(), value);
            }
        }
    }
}

/// 驗證規則，載入後不再變動
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    pub required_fields: Vec<String>,
    pub min_price: f64,
    pub max_quantity: u32,
    pub product_prefix: String,
    pub max_decimals: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    MissingField,
    BadPrefix,
    BadPriceFormat,
    PriceNotPositive,
    PriceBelowMinimum,
    BadQuantityFormat,
    QuantityExceedsMaximum,
}

impl RejectReason {
    pub const ALL: [RejectReason; 7] = [
        RejectReason::MissingField,
        RejectReason::BadPrefix,
        RejectReason::BadPriceFormat,
        RejectReason::PriceNotPositive,
        RejectReason::PriceBelowMinimum,
        RejectReason::BadQuantityFormat,
        RejectReason::QuantityExceedsMaximum,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::MissingField => "missing_field",
            RejectReason::BadPrefix => "bad_prefix",
            RejectReason::BadPriceFormat => "bad_price_format",
            RejectReason::PriceNotPositive => "price_not_positive",
            RejectReason::PriceBelowMinimum => "price_below_minimum",
            RejectReason::BadQuantityFormat => "bad_quantity_format",
            RejectReason::QuantityExceedsMaximum => "quantity_exceeds_maximum",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 通過驗證的交易，數值欄位已轉型
#[derive(Debug, Clone, PartialEq)]
pub struct ValidSale {
    pub product: String,
    pub price: f64,
    pub quantity: u32,
    pub raw_fields: BTreeMap<String, String>,
}

impl ValidSale {
    pub fn amount(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ValidationOutcome {
    Accepted(ValidSale),
    Rejected { reason: RejectReason, detail: String },
}

impl ValidationOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, ValidationOutcome::Accepted(_))
    }

    /// `None` when the record was accepted.
    pub fn reason(&self) -> Option<RejectReason> {
        match self {
            ValidationOutcome::Accepted(_) => None,
            ValidationOutcome::Rejected { reason, .. } => Some(*reason),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    pub accepted: Vec<ValidSale>,
    pub rejections: BTreeMap<RejectReason, usize>,
    pub total_processed: usize,
}

impl ValidationReport {
    pub fn valid_count(&self) -> usize {
        self.accepted.len()
    }

    pub fn rejected_count(&self) -> usize {
        self.rejections.values().sum()
    }

    pub fn rejected_for(&self, reason: RejectReason) -> usize {
        self.rejections.get(&reason).copied().unwrap_or(0)
    }
}

/// Top-N 商品，依金額由高到低排列
///
/// Serialized as a JSON object whose keys keep this order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TopProducts(pub Vec<(String, f64)>);

impl TopProducts {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, product: &str) -> Option<f64> {
        self.0
            .iter()
            .find(|(name, _)| name == product)
            .map(|(_, amount)| *amount)
    }

    pub fn names(&self) -> Vec<&str> {
        self.0.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, f64)> {
        self.0.iter()
    }
}

impl Serialize for TopProducts {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, amount) in &self.0 {
            map.serialize_entry(name, amount)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AggregateResult {
    #[serde(rename = "total_sales")]
    pub total_amount: f64,
    pub unique_products: Vec<String>,
    pub top_products: TopProducts,
}

#[derive(Debug, Clone)]
pub struct TransformResult {
    pub report: ValidationReport,
    pub summary: AggregateResult,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_record_get_resolves_typed_and_extra_fields() {
        let mut record = RawRecord::new("Halal Laptop", "999.99", "2");
        record.set("userId", "1".to_string());

        assert_eq!(record.get("product"), Some("Halal Laptop"));
        assert_eq!(record.get("quantity"), Some("2"));
        assert_eq!(record.get("userId"), Some("1"));
        assert_eq!(record.get("title"), None);
    }

    #[test]
    fn test_top_products_serializes_in_ranked_order() {
        let top = TopProducts(vec![
            ("Halal Mouse".to_string(), 300.0),
            ("Halal Keyboard".to_string(), 249.9),
            ("Halal Cable".to_string(), 10.0),
        ]);
        let json = serde_json::to_string(&top).unwrap();
        assert_eq!(
            json,
            r#"{"Halal Mouse":300.0,"Halal Keyboard":249.9,"Halal Cable":10.0}"#
        );
    }

    #[test]
    fn test_aggregate_result_uses_stable_key_names() {
        let value = serde_json::to_value(AggregateResult::default()).unwrap();
        let mut keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        keys.sort();
        assert_eq!(keys, vec!["top_products", "total_sales", "unique_products"]);
        assert_eq!(value["total_sales"], serde_json::json!(0.0));
        assert_eq!(value["unique_products"], serde_json::json!([]));
        assert_eq!(value["top_products"], serde_json::json!({}));
    }

    #[test]
    fn test_reject_reason_display_matches_serde() {
        for reason in RejectReason::ALL {
            let json = serde_json::to_string(&reason).unwrap();
            assert_eq!(json, format!("\"{}\"", reason));
        }
    }
}
