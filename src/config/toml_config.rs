use crate::core::aggregator::{AmountStrategy, DEFAULT_TOP_N};
use crate::domain::model::RuleSet;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesConfig {
    pub rules: RuleSet,
    pub aggregation: Option<AggregationConfig>,
    #[serde(default)]
    pub sources: Vec<SourceConfig>,
    pub load: Option<LoadConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AggregationConfig {
    pub top_n: Option<usize>,
    pub discount_rate: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SourceConfig {
    Csv {
        path: String,
        field_mapping: Option<HashMap<String, String>>,
    },
    Json {
        path: String,
        field_mapping: Option<HashMap<String, String>>,
    },
    Http {
        endpoint: String,
        timeout_seconds: Option<u64>,
        retry_attempts: Option<u32>,
        retry_delay_seconds: Option<u64>,
        max_records: Option<usize>,
        headers: Option<HashMap<String, String>>,
        parameters: Option<HashMap<String, String>>,
        field_mapping: Option<HashMap<String, String>>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: String,
    pub output_formats: Option<Vec<String>>,
    pub summary_filename: Option<String>,
    pub valid_sales_filename: Option<String>,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            output_path: "./output".to_string(),
            output_formats: None,
            summary_filename: None,
            valid_sales_filename: None,
        }
    }
}

impl LoadConfig {
    pub fn formats(&self) -> Vec<String> {
        self.output_formats
            .clone()
            .unwrap_or_else(|| vec!["json".to_string()])
    }

    /// 支援 `{timestamp}` 佔位符
    pub fn summary_filename(&self) -> String {
        render_filename(
            self.summary_filename
                .as_deref()
                .unwrap_or("sales_summary.json"),
        )
    }

    pub fn valid_sales_filename(&self) -> String {
        render_filename(
            self.valid_sales_filename
                .as_deref()
                .unwrap_or("valid_sales.csv"),
        )
    }
}

fn render_filename(template: &str) -> String {
    template.replace(
        "{timestamp}",
        &chrono::Utc::now().format("%Y%m%d_%H%M%S").to_string(),
    )
}

impl SalesConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${DATA_DIR})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| EtlError::ConfigError {
            message: format!("invalid env pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn top_n(&self) -> usize {
        self.aggregation
            .as_ref()
            .and_then(|a| a.top_n)
            .unwrap_or(DEFAULT_TOP_N)
    }

    pub fn amount_strategy(&self) -> AmountStrategy {
        match self.aggregation.as_ref().and_then(|a| a.discount_rate) {
            Some(rate) if rate > 0.0 => AmountStrategy::Discounted { rate },
            _ => AmountStrategy::Standard,
        }
    }

    pub fn load_config(&self) -> LoadConfig {
        self.load.clone().unwrap_or_default()
    }

    pub fn output_path(&self) -> String {
        self.load_config().output_path
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        self.rules.validate()?;

        if let Some(aggregation) = &self.aggregation {
            if let Some(top_n) = aggregation.top_n {
                validation::validate_positive_number("aggregation.top_n", top_n, 1)?;
            }
            if let Some(rate) = aggregation.discount_rate {
                validation::validate_finite_at_least("aggregation.discount_rate", rate, 0.0)?;
                if rate >= 1.0 {
                    return Err(EtlError::InvalidConfigValueError {
                        field: "aggregation.discount_rate".to_string(),
                        value: rate.to_string(),
                        reason: "Discount rate must be below 1".to_string(),
                    });
                }
            }
        }

        for (i, source) in self.sources.iter().enumerate() {
            match source {
                SourceConfig::Csv { path, .. } | SourceConfig::Json { path, .. } => {
                    validation::validate_path(&format!("sources[{}].path", i), path)?;
                }
                SourceConfig::Http {
                    endpoint,
                    max_records,
                    ..
                } => {
                    validation::validate_url(&format!("sources[{}].endpoint", i), endpoint)?;
                    if let Some(max) = max_records {
                        validation::validate_positive_number(
                            &format!("sources[{}].max_records", i),
                            *max,
                            1,
                        )?;
                    }
                }
            }
        }

        let load = self.load_config();
        validation::validate_path("load.output_path", &load.output_path)?;
        let valid_formats = ["json", "csv"];
        for format in load.formats() {
            if !valid_formats.contains(&format.as_str()) {
                return Err(EtlError::InvalidConfigValueError {
                    field: "load.output_formats".to_string(),
                    value: format.clone(),
                    reason: format!(
                        "Unsupported format. Valid formats: {}",
                        valid_formats.join(", ")
                    ),
                });
            }
        }

        Ok(())
    }
}

impl Validate for RuleSet {
    fn validate(&self) -> Result<()> {
        if self.required_fields.is_empty() {
            return Err(EtlError::MissingConfigError {
                field: "rules.required_fields".to_string(),
            });
        }
        for field in &self.required_fields {
            validation::validate_non_empty_string("rules.required_fields", field)?;
        }
        validation::validate_finite_at_least("rules.min_price", self.min_price, 0.0)?;
        validation::validate_range("rules.max_quantity", self.max_quantity, 1, u32::MAX)?;
        Ok(())
    }
}

impl Validate for SalesConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const BASIC: &str = r#"
[rules]
required_fields = ["product", "price", "quantity"]
min_price = 10.0
max_quantity = 100
product_prefix = "Halal"
max_decimals = 2
"#;

    #[test]
    fn test_parse_rules_only() {
        let config = SalesConfig::from_toml_str(BASIC).unwrap();

        assert_eq!(config.rules.min_price, 10.0);
        assert_eq!(config.rules.max_quantity, 100);
        assert_eq!(config.rules.product_prefix, "Halal");
        assert_eq!(config.rules.max_decimals, 2);
        assert_eq!(config.top_n(), 3);
        assert_eq!(config.amount_strategy(), AmountStrategy::Standard);
        assert!(config.sources.is_empty());
        assert_eq!(config.output_path(), "./output");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_rule_key_fails_fast() {
        let toml_content = r#"
[rules]
required_fields = ["product", "price", "quantity"]
min_price = 10.0
product_prefix = "Halal"
max_decimals = 2
"#;
        let err = SalesConfig::from_toml_str(toml_content).unwrap_err();
        assert!(err.to_string().contains("max_quantity"));
    }

    #[test]
    fn test_negative_max_quantity_rejected_at_parse() {
        let toml_content = BASIC.replace("max_quantity = 100", "max_quantity = -1");
        assert!(SalesConfig::from_toml_str(&toml_content).is_err());
    }

    #[test]
    fn test_rule_invariants() {
        let mut config = SalesConfig::from_toml_str(BASIC).unwrap();
        config.rules.min_price = -1.0;
        assert!(config.validate().is_err());

        let mut config = SalesConfig::from_toml_str(BASIC).unwrap();
        config.rules.max_quantity = 0;
        assert!(config.validate().is_err());

        let mut config = SalesConfig::from_toml_str(BASIC).unwrap();
        config.rules.required_fields = vec!["product".to_string(), " ".to_string()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_full_config() {
        let toml_content = format!(
            r#"{}
[aggregation]
top_n = 5
discount_rate = 0.1

[[sources]]
type = "csv"
path = "data/sales.csv"

[[sources]]
type = "json"
path = "data/mock_api.json"

[[sources]]
type = "http"
endpoint = "https://api.example.com/sales"
timeout_seconds = 5
retry_attempts = 2

[sources.field_mapping]
name = "product"

[load]
output_path = "./out"
output_formats = ["json", "csv"]
summary_filename = "summary_{{timestamp}}.json"
"#,
            BASIC
        );

        let config = SalesConfig::from_toml_str(&toml_content).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.top_n(), 5);
        assert_eq!(
            config.amount_strategy(),
            AmountStrategy::Discounted { rate: 0.1 }
        );
        assert_eq!(config.sources.len(), 3);
        match &config.sources[2] {
            SourceConfig::Http {
                endpoint,
                timeout_seconds,
                field_mapping,
                ..
            } => {
                assert_eq!(endpoint, "https://api.example.com/sales");
                assert_eq!(*timeout_seconds, Some(5));
                assert_eq!(
                    field_mapping.as_ref().unwrap().get("name").map(String::as_str),
                    Some("product")
                );
            }
            other => panic!("expected http source, got {:?}", other),
        }
        let load = config.load_config();
        assert_eq!(load.formats(), vec!["json", "csv"]);
        let name = load.summary_filename();
        assert!(name.starts_with("summary_"));
        assert!(!name.contains("{timestamp}"));
    }

    #[test]
    fn test_invalid_values() {
        let bad_format = format!("{}\n[load]\noutput_path = \"./out\"\noutput_formats = [\"xml\"]\n", BASIC);
        let config = SalesConfig::from_toml_str(&bad_format).unwrap();
        assert!(config.validate().is_err());

        let bad_url = format!(
            "{}\n[[sources]]\ntype = \"http\"\nendpoint = \"ftp://example.com\"\n",
            BASIC
        );
        let config = SalesConfig::from_toml_str(&bad_url).unwrap();
        assert!(config.validate().is_err());

        let bad_discount = format!("{}\n[aggregation]\ndiscount_rate = 1.0\n", BASIC);
        let config = SalesConfig::from_toml_str(&bad_discount).unwrap();
        assert!(config.validate().is_err());

        let bad_top = format!("{}\n[aggregation]\ntop_n = 0\n", BASIC);
        let config = SalesConfig::from_toml_str(&bad_top).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("SALES_ETL_TEST_PREFIX", "Halal");

        let toml_content = BASIC.replace("\"Halal\"", "\"${SALES_ETL_TEST_PREFIX}\"");
        let config = SalesConfig::from_toml_str(&toml_content).unwrap();
        assert_eq!(config.rules.product_prefix, "Halal");

        std::env::remove_var("SALES_ETL_TEST_PREFIX");
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(BASIC.as_bytes()).unwrap();

        let config = SalesConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.rules.required_fields.len(), 3);
    }

    #[test]
    fn test_missing_file_is_error() {
        assert!(SalesConfig::from_file("/definitely/not/here.toml").is_err());
    }
}
