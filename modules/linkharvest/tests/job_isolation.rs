//! A failing flow is reported but does not stop the flows after it.

use std::sync::Arc;

use linkharvest::testing::{MockKeywordSource, MockSearcher, MockSink};
use linkharvest::{DomainBlacklist, FlowOutcome, FlowPlan, Job, SearchAggregator};
use linkharvest_common::RowShape;

fn plan(label: &str, column: usize, sink: Arc<MockSink>) -> FlowPlan {
    FlowPlan {
        label: label.to_string(),
        keyword_column: column,
        row_shape: RowShape::UrlOnly,
        sink: Box::new(sink),
    }
}

fn aggregator() -> SearchAggregator {
    SearchAggregator::new(DomainBlacklist::new(["youtube.com"]), 10, 3)
}

#[tokio::test]
async fn append_failure_in_first_flow_does_not_block_second() {
    let source = MockKeywordSource::new()
        .with_column(1, &["Article", "a"])
        .with_column(2, &["Publisher", "b"]);
    let searcher = MockSearcher::new()
        .on_links("a", &["https://a.com/"])
        .on_links("b", &["https://b.com/"]);
    let article = Arc::new(MockSink::new("Article").failing_appends());
    let publisher = Arc::new(MockSink::new("Publisher"));

    let job = Job::new(
        Box::new(source),
        Box::new(searcher),
        aggregator(),
        vec![plan("Article", 1, article.clone()), plan("Publisher", 2, publisher.clone())],
    );

    let report = job.run().await;

    assert_eq!(report.failed_flows(), vec!["Article"]);
    assert_eq!(report.rows_written(), 1);
    assert_eq!(publisher.written().len(), 1);
    assert_eq!(article.append_count(), 0);
    match &report.flows[0].1 {
        FlowOutcome::Failed(reason) => assert!(reason.contains("simulated append failure")),
        other => panic!("expected failure, got {other:?}"),
    }
}

#[tokio::test]
async fn unreadable_keyword_column_fails_only_its_flow() {
    let source = MockKeywordSource::new()
        .failing_column(1)
        .with_column(2, &["Publisher", "b"]);
    let searcher = Arc::new(MockSearcher::new().on_links("b", &["https://b.com/"]));
    let article = Arc::new(MockSink::new("Article"));
    let publisher = Arc::new(MockSink::new("Publisher"));

    let job = Job::new(
        Box::new(source),
        Box::new(searcher.clone()),
        aggregator(),
        vec![plan("Article", 1, article.clone()), plan("Publisher", 2, publisher.clone())],
    );

    let report = job.run().await;

    assert_eq!(report.failed_flows(), vec!["Article"]);
    assert!(article.column_reads().is_empty());
    assert_eq!(publisher.written().len(), 1);
    assert_eq!(searcher.call_count(), 1);
}

#[tokio::test]
async fn search_failures_do_not_fail_the_flow() {
    let source = MockKeywordSource::new().with_column(1, &["Article", "down", "up"]);
    let searcher = MockSearcher::new()
        .failing_on("down")
        .on_links("up", &["https://up.com/"]);
    let article = Arc::new(MockSink::new("Article"));

    let job = Job::new(
        Box::new(source),
        Box::new(searcher),
        aggregator(),
        vec![plan("Article", 1, article.clone())],
    );

    let report = job.run().await;

    assert!(report.is_success());
    match &report.flows[0].1 {
        FlowOutcome::Completed(stats) => {
            assert_eq!(stats.searches_failed, 1);
            assert_eq!(stats.rows_written, 1);
        }
        other => panic!("expected completion, got {other:?}"),
    }
}

#[tokio::test]
async fn header_only_keyword_column_completes_without_writing() {
    let source = MockKeywordSource::new().with_column(1, &["Article", "  ", ""]);
    let searcher = Arc::new(MockSearcher::new());
    let article = Arc::new(MockSink::new("Article"));

    let job = Job::new(
        Box::new(source),
        Box::new(searcher.clone()),
        aggregator(),
        vec![plan("Article", 1, article.clone())],
    );

    let report = job.run().await;

    assert!(report.is_success());
    assert_eq!(report.rows_written(), 0);
    assert_eq!(searcher.call_count(), 0);
    assert_eq!(article.append_count(), 0);
}
