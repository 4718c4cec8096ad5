use crate::core::{AggregateResult, Storage, ValidSale};
use crate::utils::error::Result;

/// 將彙總結果寫成 JSON (`total_sales`, `unique_products`, `top_products`)
pub struct JsonExporter<'a, S: Storage> {
    storage: &'a S,
}

impl<'a, S: Storage> JsonExporter<'a, S> {
    pub fn new(storage: &'a S) -> Self {
        Self { storage }
    }

    pub async fn export(&self, summary: &AggregateResult, filename: &str) -> Result<()> {
        tracing::debug!("Writing to: {}", filename);
        let json = serde_json::to_string_pretty(summary)?;
        self.storage.write_file(filename, json.as_bytes()).await?;
        tracing::info!("Exported summary to {}", filename);
        Ok(())
    }
}

/// 有效交易明細輸出成 CSV；沒有資料時不建立檔案
pub struct CsvExporter<'a, S: Storage> {
    storage: &'a S,
}

impl<'a, S: Storage> CsvExporter<'a, S> {
    pub fn new(storage: &'a S) -> Self {
        Self { storage }
    }

    /// Returns `false` when there was nothing to write.
    pub async fn export(&self, sales: &[ValidSale], filename: &str) -> Result<bool> {
        if sales.is_empty() {
            tracing::info!("No valid sales to save");
            return Ok(false);
        }

        let data = sales_to_csv(sales)?;
        self.storage.write_file(filename, &data).await?;
        tracing::info!("Saved {} valid sales to {}", sales.len(), filename);
        Ok(true)
    }
}

pub fn sales_to_csv(sales: &[ValidSale]) -> Result<Vec<u8>> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(["product", "price", "quantity", "amount"])?;
    for sale in sales {
        wtr.write_record([
            sale.product.clone(),
            format!("{:.2}", sale.price),
            sale.quantity.to_string(),
            format!("{:.2}", sale.amount()),
        ])?;
    }
    wtr.into_inner().map_err(|e| e.into_error().into())
}
