use crate::core::{RawRecord, RecordSource};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Concatenates several sources in declaration order (e.g. a CSV export plus API data).
pub struct ChainSource {
    sources: Vec<Box<dyn RecordSource>>,
}

impl ChainSource {
    pub fn new(sources: Vec<Box<dyn RecordSource>>) -> Self {
        Self { sources }
    }
}

#[async_trait]
impl RecordSource for ChainSource {
    async fn fetch(&self) -> Result<Vec<RawRecord>> {
        let mut records = Vec::new();
        for source in &self.sources {
            let batch = source.fetch().await?;
            tracing::info!("{} yielded {} records", source.describe(), batch.len());
            records.extend(batch);
        }
        Ok(records)
    }

    fn describe(&self) -> String {
        let parts: Vec<String> = self.sources.iter().map(|s| s.describe()).collect();
        format!("chain[{}]", parts.join(", "))
    }
}
