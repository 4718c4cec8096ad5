pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::config::toml_config::{SalesConfig, SourceConfig};
#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "sales-etl")]
#[command(about = "Validate and aggregate halal sales transactions")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "sales-config.toml")]
    pub config: String,

    /// CSV files to read instead of the configured sources
    #[arg(long, value_delimiter = ',')]
    pub csv: Vec<String>,

    /// JSON files to read instead of the configured sources
    #[arg(long, value_delimiter = ',')]
    pub json: Vec<String>,

    /// Override load.output_path
    #[arg(long)]
    pub output_path: Option<String>,

    /// Override aggregation.top_n
    #[arg(long)]
    pub top_n: Option<usize>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,

    /// Validate and aggregate without writing any file
    #[arg(long)]
    pub dry_run: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// 命令列參數覆蓋設定檔
    pub fn apply_overrides(&self, config: &mut SalesConfig) {
        if !self.csv.is_empty() || !self.json.is_empty() {
            let mut sources: Vec<SourceConfig> = self
                .csv
                .iter()
                .map(|path| SourceConfig::Csv {
                    path: path.clone(),
                    field_mapping: None,
                })
                .collect();
            sources.extend(self.json.iter().map(|path| SourceConfig::Json {
                path: path.clone(),
                field_mapping: None,
            }));
            tracing::info!("🔧 Sources overridden from command line ({})", sources.len());
            config.sources = sources;
        }

        if let Some(output_path) = &self.output_path {
            let mut load = config.load.clone().unwrap_or_default();
            load.output_path = output_path.clone();
            config.load = Some(load);
        }

        if let Some(top_n) = self.top_n {
            let mut aggregation = config.aggregation.clone().unwrap_or_default();
            aggregation.top_n = Some(top_n);
            config.aggregation = Some(aggregation);
        }
    }
}
