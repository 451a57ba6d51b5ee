use serde::{Deserialize, Serialize};

/// Format of the run timestamp written into enriched rows.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// --- Search results ---

/// One item from a search provider. Rank is its position in the returned list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchHit {
    pub link: Option<String>,
    pub title: Option<String>,
}

impl SearchHit {
    pub fn new(link: &str) -> Self {
        Self {
            link: Some(link.to_string()),
            title: None,
        }
    }

    pub fn linkless() -> Self {
        Self::default()
    }
}

/// Host portion of a URL: after the first `//`, before the next `/`, lowercased.
/// Strings without `//` are treated as a bare host.
pub fn extract_host(url: &str) -> String {
    let rest = match url.find("//") {
        Some(i) => &url[i + 2..],
        None => url,
    };
    rest.split('/').next().unwrap_or("").to_lowercase()
}

// --- Output rows ---

/// Which columns a flow writes to its sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RowShape {
    /// `[url]`
    #[default]
    UrlOnly,
    /// `[timestamp, keyword, url, rank]`
    Enriched,
}

impl RowShape {
    /// 1-based sink column holding the URL for this shape.
    pub fn url_column(&self) -> usize {
        match self {
            RowShape::UrlOnly => 1,
            RowShape::Enriched => 3,
        }
    }
}

impl std::fmt::Display for RowShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RowShape::UrlOnly => write!(f, "url-only"),
            RowShape::Enriched => write!(f, "enriched"),
        }
    }
}

/// A single row appended to a result sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputRow {
    UrlOnly {
        url: String,
    },
    Enriched {
        timestamp: String,
        keyword: String,
        url: String,
        /// 1-based position among the URLs accepted for this keyword in this run.
        rank: usize,
    },
}

impl OutputRow {
    pub fn url(&self) -> &str {
        match self {
            OutputRow::UrlOnly { url } => url,
            OutputRow::Enriched { url, .. } => url,
        }
    }

    pub fn shape(&self) -> RowShape {
        match self {
            OutputRow::UrlOnly { .. } => RowShape::UrlOnly,
            OutputRow::Enriched { .. } => RowShape::Enriched,
        }
    }

    /// Cell values in sink column order.
    pub fn to_cells(&self) -> Vec<serde_json::Value> {
        match self {
            OutputRow::UrlOnly { url } => vec![serde_json::Value::from(url.as_str())],
            OutputRow::Enriched {
                timestamp,
                keyword,
                url,
                rank,
            } => vec![
                serde_json::Value::from(timestamp.as_str()),
                serde_json::Value::from(keyword.as_str()),
                serde_json::Value::from(url.as_str()),
                serde_json::Value::from(*rank),
            ],
        }
    }
}
