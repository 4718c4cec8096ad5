use crate::adapters::json_source::records_from_json;
use crate::core::{RawRecord, RecordSource};
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;

/// HTTP JSON API 來源 (GET，回應須為物件陣列)
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
    endpoint: String,
    timeout: Option<Duration>,
    retry_attempts: u32,
    retry_delay: Duration,
    max_records: Option<usize>,
    headers: HashMap<String, String>,
    parameters: HashMap<String, String>,
    field_mapping: HashMap<String, String>,
}

impl HttpSource {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            timeout: None,
            retry_attempts: 0,
            retry_delay: Duration::from_secs(1),
            max_records: None,
            headers: HashMap::new(),
            parameters: HashMap::new(),
            field_mapping: HashMap::new(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_retry(mut self, attempts: u32, delay: Duration) -> Self {
        self.retry_attempts = attempts;
        self.retry_delay = delay;
        self
    }

    pub fn with_max_records(mut self, max_records: usize) -> Self {
        self.max_records = Some(max_records);
        self
    }

    pub fn with_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_parameters(mut self, parameters: HashMap<String, String>) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn with_field_mapping(mut self, field_mapping: HashMap<String, String>) -> Self {
        self.field_mapping = field_mapping;
        self
    }

    async fn request_once(&self) -> Result<serde_json::Value> {
        let mut request = self.client.get(&self.endpoint);

        // 添加自定義標頭
        for (key, value) in &self.headers {
            request = request.header(key, value);
        }

        // 添加查詢參數
        for (key, value) in &self.parameters {
            request = request.query(&[(key, value)]);
        }

        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        tracing::debug!("Making API request to: {}", self.endpoint);
        let response = request.send().await?;
        tracing::debug!("API response status: {}", response.status());

        if !response.status().is_success() {
            return Err(EtlError::SourceError {
                source_name: self.describe(),
                message: format!("HTTP status {}", response.status()),
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl RecordSource for HttpSource {
    async fn fetch(&self) -> Result<Vec<RawRecord>> {
        tracing::info!("Fetching records from: {}", self.endpoint);

        let mut attempt = 0;
        let document = loop {
            match self.request_once().await {
                Ok(document) => break document,
                Err(e) if attempt < self.retry_attempts => {
                    attempt += 1;
                    tracing::warn!(
                        "Request to {} failed ({}), retry {}/{}",
                        self.endpoint,
                        e,
                        attempt,
                        self.retry_attempts
                    );
                    tokio::time::sleep(self.retry_delay).await;
                }
                Err(e) => return Err(e),
            }
        };

        let records = records_from_json(document, &self.field_mapping, self.max_records)
            .map_err(|message| EtlError::SourceError {
                source_name: self.describe(),
                message,
            })?;
        tracing::debug!("Fetched {} records from {}", records.len(), self.endpoint);
        Ok(records)
    }

    fn describe(&self) -> String {
        format!("http:{}", self.endpoint)
    }
}
