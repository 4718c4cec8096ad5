use crate::core::{AggregateResult, Pipeline, RejectReason, ValidationReport};
use crate::utils::error::Result;
use std::fmt;

/// 一次執行的結果摘要
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Empty on a dry run or when no output format produced a file.
    pub written_files: Vec<String>,
    pub validation: ValidationReport,
    pub summary: AggregateResult,
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Sales Report:")?;
        writeln!(
            f,
            "Total Records Processed: {}",
            self.validation.total_processed
        )?;
        writeln!(f, "Valid Sales: {}", self.validation.valid_count())?;
        writeln!(f, "Invalid Sales: {}", self.validation.rejected_count())?;
        for reason in RejectReason::ALL {
            let count = self.validation.rejected_for(reason);
            if count > 0 {
                writeln!(f, "  {}: {}", reason, count)?;
            }
        }
        writeln!(f, "Total Sales: ${:.2}", self.summary.total_amount)?;
        writeln!(
            f,
            "Unique Products: {}",
            self.summary.unique_products.join(", ")
        )?;
        write!(f, "Top Products:")?;
        if self.summary.top_products.is_empty() {
            write!(f, " none")?;
        }
        for (name, amount) in self.summary.top_products.iter() {
            write!(f, "\n  {}: ${:.2}", name, amount)?;
        }
        Ok(())
    }
}

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    dry_run: bool,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self {
            pipeline,
            dry_run: false,
        }
    }

    /// Skip the load stage.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub async fn run(&self) -> Result<RunReport> {
        tracing::info!("Starting ETL process...");

        // Extract
        let raw_data = self.pipeline.extract().await?;
        tracing::info!("Extracted {} records", raw_data.len());

        // Transform
        let result = self.pipeline.transform(raw_data).await?;
        tracing::info!(
            "Transformed: {} valid, {} invalid, total {:.2}",
            result.report.valid_count(),
            result.report.rejected_count(),
            result.summary.total_amount
        );

        // Load
        let written_files = if self.dry_run {
            tracing::info!("🔍 DRY RUN MODE - skipping load");
            Vec::new()
        } else {
            let files = self.pipeline.load(&result).await?;
            if files.is_empty() {
                tracing::warn!("No output file was written");
            }
            for file in &files {
                tracing::info!("Output saved to: {}", file);
            }
            files
        };

        Ok(RunReport {
            written_files,
            validation: result.report,
            summary: result.summary,
        })
    }
}
