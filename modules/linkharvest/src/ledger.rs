use std::collections::HashSet;

use tracing::{info, warn};

use crate::traits::ResultSink;

/// URLs already known to a flow: the sink's existing URL column plus
/// everything accepted so far in this run. Owned by one flow, never shared.
#[derive(Debug, Default)]
pub struct DedupLedger {
    known: HashSet<String>,
}

impl DedupLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add every non-blank URL; cells are trimmed.
    pub fn seed<I, S>(&mut self, urls: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for url in urls {
            let url = url.as_ref().trim();
            if !url.is_empty() {
                self.known.insert(url.to_string());
            }
        }
    }

    /// Snapshot the sink's URL column. A failed read leaves the ledger
    /// empty and the flow continues.
    pub async fn seed_from_sink(sink: &dyn ResultSink, url_column: usize) -> Self {
        let mut ledger = Self::new();
        match sink.column_values(url_column).await {
            Ok(cells) => {
                ledger.seed(cells);
                info!(sink = sink.name(), known = ledger.len(), "Dedup ledger seeded");
            }
            Err(e) => {
                warn!(
                    sink = sink.name(),
                    error = %e,
                    "Failed to read existing URLs, continuing with empty ledger"
                );
            }
        }
        ledger
    }

    pub fn contains(&self, url: &str) -> bool {
        self.known.contains(url)
    }

    pub fn add(&mut self, url: &str) {
        self.known.insert(url.to_string());
    }

    /// Record `url` and report whether it was new.
    pub fn insert_new(&mut self, url: &str) -> bool {
        if self.contains(url) {
            return false;
        }
        self.add(url);
        true
    }

    pub fn len(&self) -> usize {
        self.known.len()
    }

    pub fn is_empty(&self) -> bool {
        self.known.is_empty()
    }
}
