// Trait abstractions for the harvest pipeline's external collaborators.
//
// WebSearcher: the search API (Google Custom Search, Serper).
// KeywordSource: read-only keyword columns.
// ResultSink: append-only output table, also read for dedup seeding.
//
// Production impls talk to HTTP APIs; the mocks in `testing` keep the
// pipeline tests free of network.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use linkharvest_common::{OutputRow, SearchHit};

#[async_trait]
pub trait WebSearcher: Send + Sync {
    /// Return up to `requested_count` hits in provider rank order.
    /// A response without a result collection is `Ok(vec![])`, not an error.
    async fn search(&self, query: &str, requested_count: usize) -> Result<Vec<SearchHit>>;

    fn name(&self) -> &str;
}

#[async_trait]
pub trait KeywordSource: Send + Sync {
    /// All cells of a 1-based column, top to bottom, header row included.
    async fn column_values(&self, column: usize) -> Result<Vec<String>>;
}

#[async_trait]
pub trait ResultSink: Send + Sync {
    /// All cells of a 1-based column, top to bottom.
    async fn column_values(&self, column: usize) -> Result<Vec<String>>;

    /// Append all rows after the last existing row in a single call, order preserved.
    async fn append_rows(&self, rows: &[OutputRow]) -> Result<()>;

    fn name(&self) -> &str;
}

// Shared handles (tests keep an `Arc` to inspect a mock after the job owns it).

#[async_trait]
impl<T: WebSearcher + ?Sized> WebSearcher for Arc<T> {
    async fn search(&self, query: &str, requested_count: usize) -> Result<Vec<SearchHit>> {
        (**self).search(query, requested_count).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

#[async_trait]
impl<T: KeywordSource + ?Sized> KeywordSource for Arc<T> {
    async fn column_values(&self, column: usize) -> Result<Vec<String>> {
        (**self).column_values(column).await
    }
}

#[async_trait]
impl<T: ResultSink + ?Sized> ResultSink for Arc<T> {
    async fn column_values(&self, column: usize) -> Result<Vec<String>> {
        (**self).column_values(column).await
    }

    async fn append_rows(&self, rows: &[OutputRow]) -> Result<()> {
        (**self).append_rows(rows).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
