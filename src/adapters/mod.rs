// Adapters layer: concrete record sources and exporters behind the domain ports.

pub mod chain_source;
pub mod csv_source;
pub mod exporter;
pub mod http_source;
pub mod json_source;

pub use chain_source::ChainSource;
pub use csv_source::CsvSource;
pub use exporter::{CsvExporter, JsonExporter};
pub use http_source::HttpSource;
pub use json_source::JsonSource;

use crate::config::toml_config::SourceConfig;
use crate::core::{RecordSource, Storage};
use std::time::Duration;

/// 依設定建立單一來源
pub fn build_source<S>(config: &SourceConfig, storage: S) -> Box<dyn RecordSource>
where
    S: Storage + 'static,
{
    match config {
        SourceConfig::Csv {
            path,
            field_mapping,
        } => Box::new(
            CsvSource::new(storage, path.clone())
                .with_field_mapping(field_mapping.clone().unwrap_or_default()),
        ),
        SourceConfig::Json {
            path,
            field_mapping,
        } => Box::new(
            JsonSource::new(storage, path.clone())
                .with_field_mapping(field_mapping.clone().unwrap_or_default()),
        ),
        SourceConfig::Http {
            endpoint,
            timeout_seconds,
            retry_attempts,
            retry_delay_seconds,
            max_records,
            headers,
            parameters,
            field_mapping,
        } => {
            let mut source = HttpSource::new(endpoint.clone())
                .with_retry(
                    retry_attempts.unwrap_or(0),
                    Duration::from_secs(retry_delay_seconds.unwrap_or(1)),
                )
                .with_headers(headers.clone().unwrap_or_default())
                .with_parameters(parameters.clone().unwrap_or_default())
                .with_field_mapping(field_mapping.clone().unwrap_or_default());
            if let Some(timeout) = timeout_seconds {
                source = source.with_timeout(Duration::from_secs(*timeout));
            }
            if let Some(max) = max_records {
                source = source.with_max_records(*max);
            }
            Box::new(source)
        }
    }
}

/// 多個來源依序串接；只有一個時直接回傳
pub fn build_sources<S>(configs: &[SourceConfig], storage: S) -> Box<dyn RecordSource>
where
    S: Storage + Clone + 'static,
{
    let mut sources: Vec<Box<dyn RecordSource>> = configs
        .iter()
        .map(|config| build_source(config, storage.clone()))
        .collect();

    if sources.len() == 1 {
        sources.remove(0)
    } else {
        Box::new(ChainSource::new(sources))
    }
}
