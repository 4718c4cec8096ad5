use crate::adapters::{CsvExporter, JsonExporter};
use crate::config::toml_config::{LoadConfig, SalesConfig};
use crate::core::aggregator::{aggregate_with, AmountStrategy};
use crate::core::validator::validate_batch;
use crate::core::{Pipeline, RawRecord, RecordSource, RuleSet, Storage, TransformResult};
use crate::utils::error::Result;

/// Validate then aggregate, synchronously. Same input and rules give the same result.
pub fn process_records(
    records: &[RawRecord],
    rules: &RuleSet,
    top_n: usize,
    strategy: AmountStrategy,
) -> TransformResult {
    let report = validate_batch(records, rules);
    let summary = aggregate_with(&report.accepted, top_n, strategy);
    TransformResult { report, summary }
}

/// 銷售資料管道：來源 → 驗證 → 彙總 → 輸出
pub struct SalesPipeline<S: Storage> {
    source: Box<dyn RecordSource>,
    storage: S,
    rules: RuleSet,
    top_n: usize,
    strategy: AmountStrategy,
    load: LoadConfig,
}

impl<S: Storage> SalesPipeline<S> {
    pub fn new(source: Box<dyn RecordSource>, storage: S, config: &SalesConfig) -> Self {
        Self {
            source,
            storage,
            rules: config.rules.clone(),
            top_n: config.top_n(),
            strategy: config.amount_strategy(),
            load: config.load_config(),
        }
    }
}

#[async_trait::async_trait]
impl<S: Storage> Pipeline for SalesPipeline<S> {
    async fn extract(&self) -> Result<Vec<RawRecord>> {
        tracing::debug!("Extracting from {}", self.source.describe());
        self.source.fetch().await
    }

    async fn transform(&self, data: Vec<RawRecord>) -> Result<TransformResult> {
        Ok(process_records(&data, &self.rules, self.top_n, self.strategy))
    }

    async fn load(&self, result: &TransformResult) -> Result<Vec<String>> {
        let formats = self.load.formats();
        let mut written = Vec::new();

        if formats.iter().any(|f| f == "json") {
            let summary_file = self.load.summary_filename();
            JsonExporter::new(&self.storage)
                .export(&result.summary, &summary_file)
                .await?;
            written.push(format!("{}/{}", self.load.output_path, summary_file));
        }

        if formats.iter().any(|f| f == "csv") {
            let sales_file = self.load.valid_sales_filename();
            if CsvExporter::new(&self.storage)
                .export(&result.report.accepted, &sales_file)
                .await?
            {
                written.push(format!("{}/{}", self.load.output_path, sales_file));
            }
        }

        Ok(written)
    }
}
