// Google Sheets worksheets as keyword sources and result sinks.

use anyhow::Result;
use async_trait::async_trait;

use linkharvest_common::OutputRow;
use sheets_client::Worksheet;

use crate::traits::{KeywordSource, ResultSink};

#[async_trait]
impl KeywordSource for Worksheet {
    async fn column_values(&self, column: usize) -> Result<Vec<String>> {
        Ok(Worksheet::column_values(self, column).await?)
    }
}

#[async_trait]
impl ResultSink for Worksheet {
    async fn column_values(&self, column: usize) -> Result<Vec<String>> {
        Ok(Worksheet::column_values(self, column).await?)
    }

    async fn append_rows(&self, rows: &[OutputRow]) -> Result<()> {
        let values: Vec<Vec<serde_json::Value>> = rows.iter().map(OutputRow::to_cells).collect();
        let appended = Worksheet::append_rows(self, &values).await?;
        let updated = appended.updates.map(|u| u.updated_rows).unwrap_or_default();
        tracing::info!(sheet = self.title(), rows = rows.len(), updated, "Rows appended");
        Ok(())
    }

    fn name(&self) -> &str {
        self.title()
    }
}
