use crate::core::{RawRecord, RecordSource, Storage};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;

/// CSV 檔案來源，第一列必須是標題列
pub struct CsvSource<S: Storage> {
    storage: S,
    path: String,
    field_mapping: HashMap<String, String>,
}

impl<S: Storage> CsvSource<S> {
    pub fn new(storage: S, path: impl Into<String>) -> Self {
        Self {
            storage,
            path: path.into(),
            field_mapping: HashMap::new(),
        }
    }

    pub fn with_field_mapping(mut self, field_mapping: HashMap<String, String>) -> Self {
        self.field_mapping = field_mapping;
        self
    }
}

#[async_trait]
impl<S: Storage> RecordSource for CsvSource<S> {
    async fn fetch(&self) -> Result<Vec<RawRecord>> {
        tracing::info!("Loading CSV: {}", self.path);
        let bytes = self.storage.read_file(&self.path).await?;
        let records = parse_csv(&bytes, &self.field_mapping)?;
        tracing::debug!("Loaded {} records from {}", records.len(), self.path);
        Ok(records)
    }

    fn describe(&self) -> String {
        format!("csv:{}", self.path)
    }
}

/// Blank cells and cells missing from short rows stay absent.
pub fn parse_csv(data: &[u8], field_mapping: &HashMap<String, String>) -> Result<Vec<RawRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(data);

    let headers: Vec<String> = rdr
        .headers()?
        .iter()
        .map(|h| {
            let h = h.trim();
            field_mapping.get(h).cloned().unwrap_or_else(|| h.to_string())
        })
        .collect();

    let mut records = Vec::new();
    for row in rdr.records() {
        let row = row?;
        let mut record = RawRecord::default();
        for (name, value) in headers.iter().zip(row.iter()) {
            if !value.trim().is_empty() {
                record.set(name, value.to_string());
            }
        }
        records.push(record);
    }

    Ok(records)
}
