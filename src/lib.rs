pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{build_sources, ChainSource, CsvSource, HttpSource, JsonSource};
pub use config::cli::LocalStorage;
pub use config::toml_config::SalesConfig;
pub use crate::core::aggregator::{aggregate, aggregate_with, AmountStrategy};
pub use crate::core::etl::{EtlEngine, RunReport};
pub use crate::core::pipeline::{process_records, SalesPipeline};
pub use crate::core::validator::{is_decimal_string, is_integer_string, validate_batch, validate_record};
pub use utils::error::{EtlError, Result};
