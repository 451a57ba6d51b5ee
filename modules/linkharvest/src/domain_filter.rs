//! Host blacklist for search results.
//!
//! Matching is a plain substring test against the lowercased host, so
//! `x.com` also blocks `foo.x.com` and `x.company.com`. Callers rely on
//! that coarseness to catch subdomains and lookalikes; it is not a suffix match.

use linkharvest_common::extract_host;

/// True if the host of `url` contains any blacklist entry.
/// Entries are expected lowercase; malformed URLs never panic.
pub fn is_blocked(url: &str, blacklist: &[String]) -> bool {
    let host = extract_host(url);
    blacklist
        .iter()
        .any(|blocked| !blocked.is_empty() && host.contains(blocked.as_str()))
}

/// An ordered, lowercased set of blocked host substrings.
#[derive(Debug, Clone, Default)]
pub struct DomainBlacklist {
    entries: Vec<String>,
}

impl DomainBlacklist {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|e| e.as_ref().trim().to_lowercase())
                .filter(|e| !e.is_empty())
                .collect(),
        }
    }

    pub fn is_blocked(&self, url: &str) -> bool {
        is_blocked(url, &self.entries)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(entries: &[&str]) -> Vec<String> {
        entries.iter().map(|e| e.to_string()).collect()
    }

    #[test]
    fn subdomain_is_blocked() {
        assert!(is_blocked("https://sub.reddit.com/x", &list(&["reddit.com"])));
    }

    #[test]
    fn different_domain_is_not_blocked() {
        assert!(!is_blocked("https://redditzz.io/x", &list(&["reddit.com"])));
    }

    #[test]
    fn host_match_is_case_insensitive() {
        assert!(is_blocked("https://REDDIT.com", &list(&["reddit.com"])));
    }

    #[test]
    fn substring_policy_catches_lookalikes() {
        let blacklist = list(&["x.com"]);
        assert!(is_blocked("https://foo.x.com/a", &blacklist));
        assert!(is_blocked("https://x.company.com/a", &blacklist));
    }

    #[test]
    fn only_the_host_is_matched() {
        assert!(!is_blocked(
            "https://shopx.io/review-of-youtube.com",
            &list(&["youtube.com"])
        ));
    }

    #[test]
    fn malformed_url_uses_whole_string_as_host() {
        assert!(is_blocked("youtube.com", &list(&["youtube.com"])));
        assert!(!is_blocked("not a url", &list(&["youtube.com"])));
        assert!(!is_blocked("", &list(&["youtube.com"])));
    }

    #[test]
    fn empty_blacklist_blocks_nothing() {
        assert!(!is_blocked("https://youtube.com/a", &[]));
        assert!(!is_blocked("https://youtube.com/a", &list(&[""])));
    }

    #[test]
    fn blacklist_normalizes_entries() {
        let blacklist = DomainBlacklist::new(["  YouTube.com ", "", "quora.com"]);
        assert_eq!(blacklist.len(), 2);
        assert!(blacklist.is_blocked("https://m.youtube.com/watch"));
        assert!(blacklist.is_blocked("https://www.QUORA.com/q"));
        assert!(!blacklist.is_blocked("https://shopx.com/b"));
    }
}
