use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use tracing::{debug, info};

use linkharvest_common::{ProviderCredentials, SearchHit};

use crate::traits::WebSearcher;

/// Build the production searcher for the configured provider.
pub fn searcher_from_credentials(credentials: &ProviderCredentials) -> Result<Box<dyn WebSearcher>> {
    let searcher: Box<dyn WebSearcher> = match credentials {
        ProviderCredentials::GoogleCse { api_key, engine_id } => {
            Box::new(GoogleCseSearcher::new(api_key, engine_id)?)
        }
        ProviderCredentials::Serper { api_key } => Box::new(SerperSearcher::new(api_key)?),
    };
    Ok(searcher)
}

fn http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .context("Failed to build HTTP client")
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.filter(|v| !v.trim().is_empty())
}

// --- Google Custom Search ---

const CSE_URL: &str = "https://www.googleapis.com/customsearch/v1";
/// The API returns at most 10 items per request.
const CSE_PAGE_SIZE: usize = 10;
/// The API refuses `start + num` beyond 100 results.
const CSE_MAX_RESULTS: usize = 100;

#[derive(Debug, serde::Deserialize)]
struct CseResponse {
    #[serde(default)]
    items: Vec<CseItem>,
}

#[derive(Debug, serde::Deserialize)]
struct CseItem {
    #[serde(default)]
    link: Option<String>,
    #[serde(default)]
    title: Option<String>,
}

impl From<CseItem> for SearchHit {
    fn from(item: CseItem) -> Self {
        SearchHit {
            link: non_empty(item.link),
            title: item.title,
        }
    }
}

/// `(start, num)` pairs covering the first `requested` results, 1-based.
/// Each pair is one billed request, so `desired_count × over_fetch` sets the
/// per-keyword quota cost: 10 × 2 is two requests, 10 × 3 is three.
fn cse_pages(requested: usize) -> Vec<(usize, usize)> {
    let wanted = requested.min(CSE_MAX_RESULTS);
    let mut pages = Vec::new();
    let mut start = 1;
    while start <= wanted {
        let num = CSE_PAGE_SIZE.min(wanted - start + 1);
        pages.push((start, num));
        start += num;
    }
    pages
}

pub struct GoogleCseSearcher {
    api_key: String,
    engine_id: String,
    client: reqwest::Client,
}

impl GoogleCseSearcher {
    pub fn new(api_key: &str, engine_id: &str) -> Result<Self> {
        Ok(Self {
            api_key: api_key.to_string(),
            engine_id: engine_id.to_string(),
            client: http_client()?,
        })
    }

    async fn page(&self, query: &str, start: usize, num: usize) -> Result<Vec<SearchHit>> {
        let resp = self
            .client
            .get(CSE_URL)
            .query(&[
                ("key", self.api_key.as_str()),
                ("cx", self.engine_id.as_str()),
                ("q", query),
            ])
            .query(&[("num", num), ("start", start)])
            .send()
            .await
            .context("Custom Search API request failed")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            bail!(
                "Custom Search API error (status {}): {}",
                status.as_u16(),
                body
            );
        }

        let data: CseResponse = resp
            .json()
            .await
            .context("Failed to parse Custom Search response")?;
        Ok(data.items.into_iter().map(SearchHit::from).collect())
    }
}

#[async_trait]
impl WebSearcher for GoogleCseSearcher {
    async fn search(&self, query: &str, requested_count: usize) -> Result<Vec<SearchHit>> {
        info!(query, requested_count, "Custom Search");

        let mut hits = Vec::new();
        for (start, num) in cse_pages(requested_count) {
            let page = self.page(query, start, num).await?;
            let short = page.len() < num;
            debug!(query, start, count = page.len(), "Custom Search page");
            hits.extend(page);
            if short {
                break;
            }
        }
        hits.truncate(requested_count);

        info!(query, count = hits.len(), "Custom Search complete");
        Ok(hits)
    }

    fn name(&self) -> &str {
        "google-cse"
    }
}

// --- Serper (Google Search) ---

const SERPER_URL: &str = "https://google.serper.dev/search";

#[derive(Debug, serde::Deserialize)]
struct SerperResponse {
    #[serde(default)]
    organic: Vec<SerperResult>,
}

#[derive(Debug, serde::Deserialize)]
struct SerperResult {
    #[serde(default)]
    link: Option<String>,
    #[serde(default)]
    title: Option<String>,
}

impl From<SerperResult> for SearchHit {
    fn from(r: SerperResult) -> Self {
        SearchHit {
            link: non_empty(r.link),
            title: r.title,
        }
    }
}

pub struct SerperSearcher {
    api_key: String,
    client: reqwest::Client,
}

impl SerperSearcher {
    pub fn new(api_key: &str) -> Result<Self> {
        Ok(Self {
            api_key: api_key.to_string(),
            client: http_client()?,
        })
    }
}

#[async_trait]
impl WebSearcher for SerperSearcher {
    async fn search(&self, query: &str, requested_count: usize) -> Result<Vec<SearchHit>> {
        info!(query, requested_count, "Serper search");

        let body = serde_json::json!({
            "q": query,
            "num": requested_count,
        });

        let resp = self
            .client
            .post(SERPER_URL)
            .header("X-API-KEY", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .context("Serper API request failed")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            bail!("Serper API error (status {}): {}", status.as_u16(), body);
        }

        let data: SerperResponse = resp
            .json()
            .await
            .context("Failed to parse Serper response")?;

        let mut hits: Vec<SearchHit> = data.organic.into_iter().map(SearchHit::from).collect();
        hits.truncate(requested_count);

        info!(query, count = hits.len(), "Serper search complete");
        Ok(hits)
    }

    fn name(&self) -> &str {
        "serper"
    }
}
