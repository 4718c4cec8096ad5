use crate::core::{RawRecord, RecordSource, Storage};
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;

/// JSON 陣列檔案來源 (例如模擬 API 回應的 mock_api.json)
pub struct JsonSource<S: Storage> {
    storage: S,
    path: String,
    field_mapping: HashMap<String, String>,
}

impl<S: Storage> JsonSource<S> {
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
impl<S: Storage> RecordSource for JsonSource<S> {
    async fn fetch(&self) -> Result<Vec<RawRecord>> {
        tracing::info!("Loading JSON: {}", self.path);
        let bytes = self.storage.read_file(&self.path).await?;
        let document: Value = serde_json::from_slice(&bytes)?;
        let records = records_from_json(document, &self.field_mapping, None)
            .map_err(|message| EtlError::SourceError {
                source_name: self.describe(),
                message,
            })?;
        tracing::debug!("Loaded {} records from {}", records.len(), self.path);
        Ok(records)
    }

    fn describe(&self) -> String {
        format!("json:{}", self.path)
    }
}

/// 將 JSON 值轉成原始字串欄位；`null` 視為欄位不存在
pub(crate) fn field_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

pub(crate) fn record_from_object(
    object: &serde_json::Map<String, Value>,
    field_mapping: &HashMap<String, String>,
) -> RawRecord {
    let mut record = RawRecord::default();
    for (key, value) in object {
        let target = field_mapping.get(key).map(String::as_str).unwrap_or(key);
        if let Some(text) = field_text(value) {
            record.set(target, text);
        }
    }
    record
}

/// Array of objects to records, in document order.
pub(crate) fn records_from_json(
    document: Value,
    field_mapping: &HashMap<String, String>,
    max_records: Option<usize>,
) -> std::result::Result<Vec<RawRecord>, String> {
    let Value::Array(items) = document else {
        return Err("expected a JSON array of objects".to_string());
    };

    let limit = max_records.unwrap_or(items.len());
    items
        .iter()
        .take(limit)
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(object) => Ok(record_from_object(object, field_mapping)),
            other => Err(format!(
                "item #{} is not an object: {}",
                index + 1,
                other
            )),
        })
        .collect()
}
