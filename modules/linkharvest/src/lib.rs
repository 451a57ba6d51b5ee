pub mod aggregator;
pub mod domain_filter;
pub mod flow;
pub mod job;
pub mod ledger;
pub mod searcher;
pub mod sheets;
pub mod stats;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
pub mod traits;

pub use aggregator::SearchAggregator;
pub use domain_filter::{is_blocked, DomainBlacklist};
pub use flow::{read_keywords, FlowRunner};
pub use job::{FlowPlan, Job};
pub use ledger::DedupLedger;
pub use stats::{FlowOutcome, FlowStats, JobReport};
pub use traits::{KeywordSource, ResultSink, WebSearcher};
