//! Job orchestration: setup once, then run each flow in sequence.
//!
//! Setup problems (credentials, provider key, missing worksheets) surface as
//! `HarvestError::Setup` before any flow runs. Once flows start, a failure in
//! one flow is recorded in the report and the next flow still runs.

use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use tracing::{error, info};
use uuid::Uuid;

use linkharvest_common::types::TIMESTAMP_FORMAT;
use linkharvest_common::{AppConfig, FileConfig, HarvestError, RowShape};
use sheets_client::{SheetsClient, SheetsError};

use crate::aggregator::SearchAggregator;
use crate::domain_filter::DomainBlacklist;
use crate::flow::{read_keywords, FlowRunner};
use crate::searcher::searcher_from_credentials;
use crate::stats::{FlowOutcome, JobReport};
use crate::traits::{KeywordSource, ResultSink, WebSearcher};

/// One flow to run: which keyword column feeds which sink, in what row shape.
pub struct FlowPlan {
    pub label: String,
    pub keyword_column: usize,
    pub row_shape: RowShape,
    pub sink: Box<dyn ResultSink>,
}

pub struct Job {
    run_id: Uuid,
    source: Box<dyn KeywordSource>,
    searcher: Box<dyn WebSearcher>,
    aggregator: SearchAggregator,
    flows: Vec<FlowPlan>,
    pacing: Duration,
    timestamp: String,
}

impl Job {
    pub fn new(
        source: Box<dyn KeywordSource>,
        searcher: Box<dyn WebSearcher>,
        aggregator: SearchAggregator,
        flows: Vec<FlowPlan>,
    ) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            source,
            searcher,
            aggregator,
            flows,
            pacing: Duration::ZERO,
            timestamp: Local::now().format(TIMESTAMP_FORMAT).to_string(),
        }
    }

    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    /// Override the run start time written into enriched rows.
    pub fn with_timestamp(mut self, timestamp: &str) -> Self {
        self.timestamp = timestamp.to_string();
        self
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Resolve credentials, open every worksheet, and build the searcher.
    /// Any failure here is fatal for the whole job.
    pub async fn from_config(app: &AppConfig, file: &FileConfig) -> Result<Self, HarvestError> {
        let client = SheetsClient::from_service_account_json(&app.service_account_json)
            .map_err(|e| HarvestError::setup(format!("invalid GCP_SA_KEY: {e}")))?;
        let client = Arc::new(client);
        info!(client_email = client.client_email(), "Sheets client ready");

        let source = open_worksheet(&client, &file.spreadsheet_id, &file.keyword_sheet).await?;

        let mut flows = Vec::with_capacity(file.flows.len());
        for flow in &file.flows {
            let sink = open_worksheet(&client, &file.spreadsheet_id, &flow.sink_sheet).await?;
            flows.push(FlowPlan {
                label: flow.label.clone(),
                keyword_column: flow.keyword_column,
                row_shape: file.row_shape_for(flow),
                sink: Box::new(sink),
            });
        }

        let searcher = searcher_from_credentials(&app.provider)
            .map_err(|e| HarvestError::setup(format!("{e:#}")))?;

        let blacklist = DomainBlacklist::new(file.normalized_blacklist());
        info!(
            provider = searcher.name(),
            blacklist = blacklist.len(),
            flows = flows.len(),
            "Job configured"
        );
        let aggregator = SearchAggregator::new(
            blacklist,
            file.search.desired_count,
            file.search.over_fetch,
        );

        Ok(Self::new(Box::new(source), searcher, aggregator, flows)
            .with_pacing(Duration::from_millis(file.search.pacing_ms)))
    }

    /// Run every flow in order. Never fails as a whole; see the report.
    pub async fn run(&self) -> JobReport {
        info!(run_id = %self.run_id, flows = self.flows.len(), started = self.timestamp.as_str(), "Job starting");

        let mut report = JobReport::default();
        for plan in &self.flows {
            let outcome = match self.run_flow(plan).await {
                Ok(stats) => FlowOutcome::Completed(stats),
                Err(e) => {
                    error!(run_id = %self.run_id, flow = plan.label.as_str(), error = %format!("{e:#}"), "Flow failed");
                    FlowOutcome::Failed(format!("{e:#}"))
                }
            };
            report.flows.push((plan.label.clone(), outcome));
        }

        info!(run_id = %self.run_id, rows = report.rows_written(), "Job finished");
        report
    }

    async fn run_flow(&self, plan: &FlowPlan) -> anyhow::Result<crate::stats::FlowStats> {
        let keywords = read_keywords(self.source.as_ref(), plan.keyword_column).await?;
        info!(flow = plan.label.as_str(), count = keywords.len(), "Found keywords");

        let runner = FlowRunner::new(
            self.searcher.as_ref(),
            &self.aggregator,
            plan.row_shape,
            &self.timestamp,
        )
        .with_pacing(self.pacing);
        runner.run(&plan.label, &keywords, plan.sink.as_ref()).await
    }
}

async fn open_worksheet(
    client: &Arc<SheetsClient>,
    spreadsheet_id: &str,
    title: &str,
) -> Result<sheets_client::Worksheet, HarvestError> {
    client
        .worksheet(spreadsheet_id, title)
        .await
        .map_err(|e| match e {
            SheetsError::WorksheetNotFound { .. } => HarvestError::setup(e.to_string()),
            other => HarvestError::setup(format!("cannot open worksheet '{title}': {other}")),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use linkharvest_common::{OutputRow, ProviderCredentials};
    use crate::testing::{MockKeywordSource, MockSearcher, MockSink};

    #[tokio::test]
    async fn bad_service_account_blob_is_a_setup_error() {
        let app = AppConfig {
            service_account_json: "not json".to_string(),
            provider: ProviderCredentials::Serper {
                api_key: "k".to_string(),
            },
            config_path: "linkharvest.toml".into(),
        };
        let file: FileConfig = toml::from_str(
            r#"
spreadsheet_id = "s"
keyword_sheet = "kw"

[[flows]]
label = "Publisher"
keyword_column = 2
sink_sheet = "Publisher"
"#,
        )
        .unwrap();

        let err = Job::from_config(&app, &file).await.err().expect("setup should fail");
        assert!(err.is_setup());
        assert!(err.to_string().contains("GCP_SA_KEY"));
    }

    #[tokio::test]
    async fn flows_run_in_order_with_shared_timestamp() {
        let source = MockKeywordSource::new()
            .with_column(1, &["Article kw", "a"])
            .with_column(2, &["Publisher kw", "b", "a"]);
        let searcher = Arc::new(
            MockSearcher::new()
                .on_links("a", &["https://a.com/"])
                .on_links("b", &["https://b.com/"]),
        );
        let article = Arc::new(MockSink::new("Article"));
        let publisher = Arc::new(MockSink::new("Publisher"));
        let aggregator = SearchAggregator::new(DomainBlacklist::default(), 10, 3);

        let job = Job::new(
            Box::new(source),
            Box::new(searcher.clone()),
            aggregator,
            vec![
                FlowPlan {
                    label: "Article".to_string(),
                    keyword_column: 1,
                    row_shape: RowShape::UrlOnly,
                    sink: Box::new(article.clone()),
                },
                FlowPlan {
                    label: "Publisher".to_string(),
                    keyword_column: 2,
                    row_shape: RowShape::Enriched,
                    sink: Box::new(publisher.clone()),
                },
            ],
        )
        .with_timestamp("2026-10-18 09:00:00");

        let report = job.run().await;

        assert!(report.is_success());
        assert_eq!(report.rows_written(), 3);
        let labels: Vec<&str> = report.flows.iter().map(|(l, _)| l.as_str()).collect();
        assert_eq!(labels, vec!["Article", "Publisher"]);

        let queries: Vec<String> = searcher.requests().into_iter().map(|(q, _)| q).collect();
        assert_eq!(queries, vec!["a", "b", "a"]);

        // Ledgers are per flow: the Article URL is still new for Publisher.
        assert_eq!(
            article.written(),
            vec![OutputRow::UrlOnly {
                url: "https://a.com/".to_string()
            }]
        );
        assert_eq!(
            publisher.written(),
            vec![
                OutputRow::Enriched {
                    timestamp: "2026-10-18 09:00:00".to_string(),
                    keyword: "b".to_string(),
                    url: "https://b.com/".to_string(),
                    rank: 1,
                },
                OutputRow::Enriched {
                    timestamp: "2026-10-18 09:00:00".to_string(),
                    keyword: "a".to_string(),
                    url: "https://a.com/".to_string(),
                    rank: 1,
                },
            ]
        );
    }
}
