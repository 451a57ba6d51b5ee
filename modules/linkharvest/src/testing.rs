// Test mocks for the harvest pipeline.
//
// Three mocks matching the three trait boundaries:
// - MockSearcher (WebSearcher): HashMap-based query→hits, records requests
// - MockKeywordSource (KeywordSource): fixed columns
// - MockSink (ResultSink): in-memory grid; appends become readable rows,
//   so a second run reseeds from the first run's output

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use anyhow::{bail, Result};
use async_trait::async_trait;

use linkharvest_common::{OutputRow, SearchHit};
use sheets_client::cell_to_string;

use crate::traits::{KeywordSource, ResultSink, WebSearcher};

/// Hits for a list of links, in order.
pub fn hits(links: &[&str]) -> Vec<SearchHit> {
    links.iter().map(|l| SearchHit::new(l)).collect()
}

// ---------------------------------------------------------------------------
// MockSearcher
// ---------------------------------------------------------------------------

/// Returns `Err` for unregistered queries and for queries marked failing.
/// Honors `requested_count` by truncating.
pub struct MockSearcher {
    results: HashMap<String, Vec<SearchHit>>,
    failing: HashSet<String>,
    requests: Mutex<Vec<(String, usize)>>,
}

impl MockSearcher {
    pub fn new() -> Self {
        Self {
            results: HashMap::new(),
            failing: HashSet::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn on_search(mut self, query: &str, hits: Vec<SearchHit>) -> Self {
        self.results.insert(query.to_string(), hits);
        self
    }

    pub fn on_links(self, query: &str, links: &[&str]) -> Self {
        self.on_search(query, hits(links))
    }

    pub fn failing_on(mut self, query: &str) -> Self {
        self.failing.insert(query.to_string());
        self
    }

    /// Every `(query, requested_count)` seen, in call order.
    pub fn requests(&self) -> Vec<(String, usize)> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl Default for MockSearcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WebSearcher for MockSearcher {
    async fn search(&self, query: &str, requested_count: usize) -> Result<Vec<SearchHit>> {
        self.requests
            .lock()
            .unwrap()
            .push((query.to_string(), requested_count));

        if self.failing.contains(query) {
            bail!("MockSearcher: simulated failure for {query}");
        }
        let mut hits = self
            .results
            .get(query)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("MockSearcher: no results registered for {query}"))?;
        hits.truncate(requested_count);
        Ok(hits)
    }

    fn name(&self) -> &str {
        "mock"
    }
}

// ---------------------------------------------------------------------------
// MockKeywordSource
// ---------------------------------------------------------------------------

pub struct MockKeywordSource {
    columns: HashMap<usize, Vec<String>>,
    failing: HashSet<usize>,
}

impl MockKeywordSource {
    pub fn new() -> Self {
        Self {
            columns: HashMap::new(),
            failing: HashSet::new(),
        }
    }

    /// Register a column; `cells[0]` is the header row.
    pub fn with_column(mut self, column: usize, cells: &[&str]) -> Self {
        self.columns
            .insert(column, cells.iter().map(|c| c.to_string()).collect());
        self
    }

    pub fn failing_column(mut self, column: usize) -> Self {
        self.failing.insert(column);
        self
    }
}

impl Default for MockKeywordSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeywordSource for MockKeywordSource {
    async fn column_values(&self, column: usize) -> Result<Vec<String>> {
        if self.failing.contains(&column) {
            bail!("MockKeywordSource: simulated read failure for column {column}");
        }
        Ok(self.columns.get(&column).cloned().unwrap_or_default())
    }
}

// ---------------------------------------------------------------------------
// MockSink
// ---------------------------------------------------------------------------

/// In-memory worksheet. Appended rows land after existing rows and show up
/// in later `column_values` reads.
pub struct MockSink {
    name: String,
    grid: Mutex<Vec<Vec<String>>>,
    appends: Mutex<Vec<Vec<OutputRow>>>,
    column_reads: Mutex<Vec<usize>>,
    fail_reads: bool,
    fail_appends: bool,
}

impl MockSink {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            grid: Mutex::new(Vec::new()),
            appends: Mutex::new(Vec::new()),
            column_reads: Mutex::new(Vec::new()),
            fail_reads: false,
            fail_appends: false,
        }
    }

    /// Fill a 1-based column from row 1 downwards.
    pub fn with_column(self, column: usize, cells: &[&str]) -> Self {
        {
            let mut grid = self.grid.lock().unwrap();
            for (i, cell) in cells.iter().enumerate() {
                if grid.len() <= i {
                    grid.push(Vec::new());
                }
                let row = &mut grid[i];
                if row.len() < column {
                    row.resize(column, String::new());
                }
                row[column - 1] = cell.to_string();
            }
        }
        self
    }

    pub fn failing_reads(mut self) -> Self {
        self.fail_reads = true;
        self
    }

    pub fn failing_appends(mut self) -> Self {
        self.fail_appends = true;
        self
    }

    /// Each successful `append_rows` call's batch, in call order.
    pub fn appends(&self) -> Vec<Vec<OutputRow>> {
        self.appends.lock().unwrap().clone()
    }

    pub fn append_count(&self) -> usize {
        self.appends.lock().unwrap().len()
    }

    /// Every row written across all appends.
    pub fn written(&self) -> Vec<OutputRow> {
        self.appends().into_iter().flatten().collect()
    }

    pub fn column_reads(&self) -> Vec<usize> {
        self.column_reads.lock().unwrap().clone()
    }

    pub fn row_count(&self) -> usize {
        self.grid.lock().unwrap().len()
    }
}

#[async_trait]
impl ResultSink for MockSink {
    async fn column_values(&self, column: usize) -> Result<Vec<String>> {
        self.column_reads.lock().unwrap().push(column);
        if self.fail_reads {
            bail!("MockSink: simulated read failure on {}", self.name);
        }
        let grid = self.grid.lock().unwrap();
        Ok(grid
            .iter()
            .map(|row| {
                column
                    .checked_sub(1)
                    .and_then(|c| row.get(c))
                    .cloned()
                    .unwrap_or_default()
            })
            .collect())
    }

    async fn append_rows(&self, rows: &[OutputRow]) -> Result<()> {
        if self.fail_appends {
            bail!("MockSink: simulated append failure on {}", self.name);
        }
        let mut grid = self.grid.lock().unwrap();
        for row in rows {
            grid.push(row.to_cells().iter().map(cell_to_string).collect());
        }
        self.appends.lock().unwrap().push(rows.to_vec());
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
