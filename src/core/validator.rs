//! Record validation against a [`RuleSet`].

use crate::domain::model::{
    RawRecord, RejectReason, RuleSet, ValidSale, ValidationOutcome, ValidationReport,
};

/// `true` iff `s` is `<digits>.<digits>` with at most `max_decimals` fractional digits.
///
/// No sign, exponent, thousands separator or surrounding whitespace is accepted, and a
/// bare integer such as `"25"` is not a decimal string.
pub fn is_decimal_string(s: &str, max_decimals: u32) -> bool {
    let mut parts = s.split('.');
    let (Some(whole), Some(fraction), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    if !is_integer_string(whole) || !is_integer_string(fraction) {
        return false;
    }
    fraction.len() <= max_decimals as usize
}

/// Non-empty and ASCII digits only.
pub fn is_integer_string(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn rejected(reason: RejectReason, detail: String) -> ValidationOutcome {
    ValidationOutcome::Rejected { reason, detail }
}

/// 驗證單筆記錄
///
/// Checks run in a fixed order and stop at the first failure, so the order decides
/// which reason is reported when several rules fail at once.
pub fn validate_record(record: &RawRecord, rules: &RuleSet) -> ValidationOutcome {
    // 1. 必填欄位
    for field in &rules.required_fields {
        let present = record
            .get(field)
            .map(|value| !value.trim().is_empty())
            .unwrap_or(false);
        if !present {
            return rejected(
                RejectReason::MissingField,
                format!("missing or empty field '{}'", field),
            );
        }
    }

    // 2. 商品前綴
    let product = record.product.as_deref().unwrap_or("").trim();
    if !product.starts_with(rules.product_prefix.as_str()) {
        return rejected(
            RejectReason::BadPrefix,
            format!(
                "product '{}' lacks '{}' prefix",
                product, rules.product_prefix
            ),
        );
    }

    // 3-5. 價格格式與範圍
    let price_raw = record.price.as_deref().unwrap_or("").trim();
    if !is_decimal_string(price_raw, rules.max_decimals) {
        return rejected(
            RejectReason::BadPriceFormat,
            format!(
                "price '{}' is not a decimal with at most {} places",
                price_raw, rules.max_decimals
            ),
        );
    }
    // 整數部分過長時 parse 會得到 inf
    let price: f64 = match price_raw.parse::<f64>() {
        Ok(price) if price.is_finite() => price,
        _ => {
            return rejected(
                RejectReason::BadPriceFormat,
                format!("price '{}' is not a number", price_raw),
            )
        }
    };
    if price <= 0.0 {
        return rejected(
            RejectReason::PriceNotPositive,
            format!("price {} is not positive", price_raw),
        );
    }
    if price < rules.min_price {
        return rejected(
            RejectReason::PriceBelowMinimum,
            format!("price {} is below minimum {}", price_raw, rules.min_price),
        );
    }

    // 6-7. 數量格式與上限
    let quantity_raw = record.quantity.as_deref().unwrap_or("").trim();
    if !is_integer_string(quantity_raw) {
        return rejected(
            RejectReason::BadQuantityFormat,
            format!("quantity '{}' is not a non-negative integer", quantity_raw),
        );
    }
    // digits only, so a parse failure here means overflow: above any u32 maximum
    let quantity = match quantity_raw.parse::<u64>() {
        Ok(q) if q > 0 && q <= u64::from(rules.max_quantity) => q as u32,
        _ => {
            return rejected(
                RejectReason::QuantityExceedsMaximum,
                format!(
                    "quantity {} is outside 1..={}",
                    quantity_raw, rules.max_quantity
                ),
            )
        }
    };

    ValidationOutcome::Accepted(ValidSale {
        product: product.to_string(),
        price,
        quantity,
        raw_fields: record.raw_fields.clone(),
    })
}

/// 批次驗證，保留來源順序
pub fn validate_batch(records: &[RawRecord], rules: &RuleSet) -> ValidationReport {
    let mut report = ValidationReport {
        total_processed: records.len(),
        ..Default::default()
    };

    for (index, record) in records.iter().enumerate() {
        match validate_record(record, rules) {
            ValidationOutcome::Accepted(sale) => report.accepted.push(sale),
            ValidationOutcome::Rejected { reason, detail } => {
                tracing::debug!("Rejected record #{} ({}): {}", index + 1, reason, detail);
                *report.rejections.entry(reason).or_insert(0) += 1;
            }
        }
    }

    tracing::info!(
        "Validated {} records: {} valid, {} invalid",
        report.total_processed,
        report.valid_count(),
        report.rejected_count()
    );

    report
}
