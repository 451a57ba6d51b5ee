//! Turn one keyword into a ranked, blacklist-filtered list of candidate URLs.
//!
//! One provider call per keyword, over-fetching so that blacklist losses
//! still leave `desired_count` candidates. Provider failures are absorbed
//! here and reported as an empty, failed outcome.

use tracing::{info, warn};

use linkharvest_common::SearchHit;

use crate::domain_filter::DomainBlacklist;
use crate::traits::WebSearcher;

/// Result of aggregating one keyword's search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Candidates {
    /// Accepted URLs in provider rank order, at most `desired_count`.
    pub urls: Vec<String>,
    /// Raw hits dropped for having no link.
    pub linkless: usize,
    /// Raw hits dropped by the blacklist.
    pub blocked: usize,
    /// The provider call failed; `urls` is empty.
    pub failed: bool,
}

pub struct SearchAggregator {
    blacklist: DomainBlacklist,
    desired_count: usize,
    over_fetch: usize,
}

impl SearchAggregator {
    pub fn new(blacklist: DomainBlacklist, desired_count: usize, over_fetch: usize) -> Self {
        Self {
            blacklist,
            desired_count,
            over_fetch: over_fetch.max(1),
        }
    }

    pub fn desired_count(&self) -> usize {
        self.desired_count
    }

    /// Number of raw hits requested from the provider per keyword.
    pub fn requested_count(&self) -> usize {
        self.desired_count.saturating_mul(self.over_fetch)
    }

    pub async fn search(&self, searcher: &dyn WebSearcher, query: &str) -> Candidates {
        match searcher.search(query, self.requested_count()).await {
            Ok(hits) => {
                let candidates = self.collect(hits);
                info!(
                    query,
                    accepted = candidates.urls.len(),
                    blocked = candidates.blocked,
                    linkless = candidates.linkless,
                    "Search aggregated"
                );
                candidates
            }
            Err(e) => {
                warn!(query, provider = searcher.name(), error = %e, "Search failed, skipping keyword");
                Candidates {
                    failed: true,
                    ..Candidates::default()
                }
            }
        }
    }

    /// Walk hits in rank order, dropping linkless and blocked ones,
    /// stopping once `desired_count` URLs are accepted.
    pub fn collect(&self, hits: Vec<SearchHit>) -> Candidates {
        let mut candidates = Candidates::default();
        for hit in hits {
            if candidates.urls.len() >= self.desired_count {
                break;
            }
            let Some(link) = hit.link else {
                candidates.linkless += 1;
                continue;
            };
            if self.blacklist.is_blocked(&link) {
                candidates.blocked += 1;
                continue;
            }
            candidates.urls.push(link);
        }
        candidates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockSearcher;

    fn aggregator(blacklist: &[&str], desired: usize) -> SearchAggregator {
        SearchAggregator::new(DomainBlacklist::new(blacklist.iter()), desired, 3)
    }

    #[tokio::test]
    async fn returns_exactly_desired_count_in_rank_order() {
        // 45 raw hits, every 9th one blocked (5 total).
        let hits: Vec<SearchHit> = (0..45)
            .map(|i| {
                if i % 9 == 0 {
                    SearchHit::new(&format!("https://youtube.com/v{i}"))
                } else {
                    SearchHit::new(&format!("https://site{i}.com/"))
                }
            })
            .collect();
        let searcher = MockSearcher::new().on_search("q", hits);

        let candidates = aggregator(&["youtube.com"], 10).search(&searcher, "q").await;

        let expected: Vec<String> = (1..=11)
            .filter(|i| i % 9 != 0)
            .map(|i| format!("https://site{i}.com/"))
            .collect();
        assert_eq!(candidates.urls, expected);
        assert_eq!(candidates.blocked, 2);
        assert!(!candidates.failed);
    }

    #[tokio::test]
    async fn over_fetches_from_provider() {
        let searcher = MockSearcher::new().on_search("q", vec![]);
        aggregator(&[], 10).search(&searcher, "q").await;
        assert_eq!(searcher.requests(), vec![("q".to_string(), 30)]);
    }

    #[tokio::test]
    async fn provider_error_yields_empty_failed_outcome() {
        let searcher = MockSearcher::new().failing_on("q");
        let candidates = aggregator(&[], 10).search(&searcher, "q").await;
        assert!(candidates.urls.is_empty());
        assert!(candidates.failed);
    }

    #[test]
    fn linkless_and_blocked_hits_are_dropped() {
        let candidates = aggregator(&["youtube.com"], 10).collect(vec![
            SearchHit::new("https://youtube.com/a"),
            SearchHit::linkless(),
            SearchHit::new("https://shopX.com/b"),
            SearchHit::new("https://shopX.com/b"),
        ]);
        // Same-URL repeats inside one response are left to the ledger.
        assert_eq!(
            candidates.urls,
            vec!["https://shopX.com/b", "https://shopX.com/b"]
        );
        assert_eq!(candidates.linkless, 1);
        assert_eq!(candidates.blocked, 1);
    }

    #[test]
    fn fewer_survivors_than_desired_returns_all() {
        let candidates = aggregator(&["reddit.com"], 10).collect(vec![
            SearchHit::new("https://reddit.com/r/a"),
            SearchHit::new("https://a.com/"),
            SearchHit::new("https://b.com/"),
        ]);
        assert_eq!(candidates.urls, vec!["https://a.com/", "https://b.com/"]);
    }
}
