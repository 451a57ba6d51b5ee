//! One keyword list → sink pipeline.
//!
//! Keywords are searched in source order, each candidate URL is checked
//! against the flow's dedup ledger, and accepted rows are buffered. The
//! buffer is written with a single append at the end, so a flow either
//! writes everything it found or nothing.

use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;

use linkharvest_common::{OutputRow, RowShape};

use crate::aggregator::SearchAggregator;
use crate::ledger::DedupLedger;
use crate::stats::FlowStats;
use crate::traits::{KeywordSource, ResultSink, WebSearcher};

/// Read a keyword column: drop the header row, trim, discard blanks.
/// Order and duplicates are preserved.
pub async fn read_keywords(source: &dyn KeywordSource, column: usize) -> Result<Vec<String>> {
    let cells = source
        .column_values(column)
        .await
        .with_context(|| format!("Failed to read keyword column {column}"))?;
    Ok(cells
        .iter()
        .skip(1)
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect())
}

pub struct FlowRunner<'a> {
    searcher: &'a dyn WebSearcher,
    aggregator: &'a SearchAggregator,
    row_shape: RowShape,
    /// Run start time, shared by every enriched row.
    timestamp: String,
    pacing: Duration,
}

impl<'a> FlowRunner<'a> {
    pub fn new(
        searcher: &'a dyn WebSearcher,
        aggregator: &'a SearchAggregator,
        row_shape: RowShape,
        timestamp: &str,
    ) -> Self {
        Self {
            searcher,
            aggregator,
            row_shape,
            timestamp: timestamp.to_string(),
            pacing: Duration::ZERO,
        }
    }

    /// Delay after each keyword before the next provider call.
    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    pub async fn run(
        &self,
        label: &str,
        keywords: &[String],
        sink: &dyn ResultSink,
    ) -> Result<FlowStats> {
        let mut stats = FlowStats::default();

        if keywords.is_empty() {
            info!(flow = label, "No keywords, nothing to do");
            return Ok(stats);
        }
        info!(flow = label, keywords = keywords.len(), sink = sink.name(), "Flow starting");

        let mut ledger = DedupLedger::seed_from_sink(sink, self.row_shape.url_column()).await;
        stats.seeded = ledger.len() as u32;

        let mut buffer: Vec<OutputRow> = Vec::new();
        for (i, keyword) in keywords.iter().enumerate() {
            info!(flow = label, keyword = keyword.as_str(), "Processing keyword {}/{}", i + 1, keywords.len());

            let candidates = self.aggregator.search(self.searcher, keyword).await;
            stats.keywords += 1;
            stats.candidates += candidates.urls.len() as u32;
            if candidates.failed {
                stats.searches_failed += 1;
            }

            let mut rank = 0;
            for url in candidates.urls {
                if !ledger.insert_new(&url) {
                    stats.duplicates_skipped += 1;
                    continue;
                }
                rank += 1;
                buffer.push(self.row(keyword, url, rank));
            }
            info!(flow = label, keyword = keyword.as_str(), new_urls = rank, "Keyword done");

            if !self.pacing.is_zero() {
                tokio::time::sleep(self.pacing).await;
            }
        }

        if buffer.is_empty() {
            info!(flow = label, "No new URLs to write");
        } else {
            info!(flow = label, rows = buffer.len(), sink = sink.name(), "Writing rows");
            sink.append_rows(&buffer)
                .await
                .with_context(|| format!("Failed to append {} rows to {}", buffer.len(), sink.name()))?;
            stats.rows_written = buffer.len() as u32;
        }

        info!(flow = label, "Flow complete: {stats}");
        Ok(stats)
    }

    fn row(&self, keyword: &str, url: String, rank: usize) -> OutputRow {
        match self.row_shape {
            RowShape::UrlOnly => OutputRow::UrlOnly { url },
            RowShape::Enriched => OutputRow::Enriched {
                timestamp: self.timestamp.clone(),
                keyword: keyword.to_string(),
                url,
                rank,
            },
        }
    }
}
