//! Link validation. Confirms candidate URLs are live and swaps dead or
//! placeholder links for a deterministic search URL built from the name.
//!
//! Probes run concurrently within one request, each under its own timeout,
//! and the whole stage under a budget. Anything not confirmed in time is
//! treated as unvalidated.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::stream::{self, StreamExt};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::{Client, StatusCode, Url};
use tracing::{debug, warn};

use crate::models::scholarship::{MatchResult, ScholarshipCandidate};
use crate::recommendations::pipeline::PipelineError;

const FALLBACK_SEARCH_BASE: &str = "https://www.google.com/search";

pub const FALLBACK_NOTE: &str =
    "The original link could not be verified. This search link points to the scholarship by name.";

const USER_AGENT: &str = "Mozilla/5.0 (compatible; scholar-api link checker)";

static PLACEHOLDER_LINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?:https?://)?(?:[a-z0-9-]+\.)*(?:example\.(?:com|org|net|edu)|placeholder\.[a-z]+|your-?(?:website|domain|site)\.[a-z]+|domain\.com|test\.com|localhost)(?::\d+)?(?:[/?#]|$)",
    )
    .expect("placeholder link regex")
});

/// True for links on well-known placeholder domains (example.com and friends).
pub fn is_placeholder_link(link: &str) -> bool {
    PLACEHOLDER_LINK.is_match(link.trim())
}

/// Deterministic search URL for a scholarship name.
pub fn fallback_search_url(name: &str) -> String {
    match Url::parse_with_params(FALLBACK_SEARCH_BASE, &[("q", name.trim())]) {
        Ok(url) => url.into(),
        Err(_) => FALLBACK_SEARCH_BASE.to_string(),
    }
}

/// Outcome of a single reachability probe.
#[derive(Debug, Clone, PartialEq)]
pub enum LinkCheck {
    Live,
    Dead { status: u16 },
    Unreachable(String),
}

/// URL-reachability contract. Implementations must not hold per-request state.
#[async_trait]
pub trait LinkProbe: Send + Sync {
    async fn check(&self, url: &str) -> LinkCheck;
}

/// HEAD probe with a small ranged GET fallback for servers that reject HEAD.
pub struct HttpLinkProbe {
    client: Client,
}

impl HttpLinkProbe {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: Client::builder()
                .timeout(timeout)
                .user_agent(USER_AGENT)
                .redirect(reqwest::redirect::Policy::limited(5))
                .build()?,
        })
    }
}

fn should_fallback_to_get(status: StatusCode) -> bool {
    matches!(status.as_u16(), 403 | 405 | 429 | 501)
}

fn classify(status: StatusCode) -> LinkCheck {
    if status.is_success() {
        LinkCheck::Live
    } else {
        LinkCheck::Dead {
            status: status.as_u16(),
        }
    }
}

#[async_trait]
impl LinkProbe for HttpLinkProbe {
    async fn check(&self, url: &str) -> LinkCheck {
        match self.client.head(url).send().await {
            Ok(resp) if !should_fallback_to_get(resp.status()) => classify(resp.status()),
            Ok(_) | Err(_) => match self
                .client
                .get(url)
                .header("Range", "bytes=0-1023")
                .send()
                .await
            {
                Ok(resp) => classify(resp.status()),
                Err(e) => LinkCheck::Unreachable(e.to_string()),
            },
        }
    }
}

#[derive(Clone)]
pub struct LinkValidator {
    probe: Arc<dyn LinkProbe>,
    timeout: Duration,
    budget: Duration,
    concurrency: usize,
}

impl LinkValidator {
    pub fn new(probe: Arc<dyn LinkProbe>, timeout: Duration, budget: Duration, concurrency: usize) -> Self {
        Self {
            probe,
            timeout,
            budget,
            concurrency: concurrency.max(1),
        }
    }

    /// True only for an http(s) URL that answered 2xx within the timeout.
    pub async fn validate(&self, url: &str) -> bool {
        match Url::parse(url) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
            _ => {
                debug!("Link {url:?} is not an http(s) URL");
                return false;
            }
        }

        match self.probe_with_timeout(url).await {
            Ok(LinkCheck::Live) => true,
            Ok(LinkCheck::Dead { status }) => {
                debug!("Link {url} answered {status}");
                false
            }
            Ok(LinkCheck::Unreachable(reason)) => {
                debug!("Link {url} unreachable: {reason}");
                false
            }
            Err(e) => {
                warn!("{e}");
                false
            }
        }
    }

    async fn probe_with_timeout(&self, url: &str) -> Result<LinkCheck, PipelineError> {
        tokio::time::timeout(self.timeout, self.probe.check(url))
            .await
            .map_err(|_| PipelineError::ValidationTimeout {
                url: url.to_string(),
                after: self.timeout,
            })
    }

    /// Already carries the fallback link for its own name.
    pub fn is_sanitized(candidate: &ScholarshipCandidate) -> bool {
        candidate.link == fallback_search_url(&candidate.name)
    }

    /// Replaces placeholder or unreachable links with the search fallback.
    /// Sanitizing an already-sanitized candidate is a no-op and does not probe.
    pub async fn sanitize(&self, candidate: ScholarshipCandidate) -> ScholarshipCandidate {
        if Self::is_sanitized(&candidate) {
            return candidate;
        }
        if is_placeholder_link(&candidate.link) {
            debug!("Placeholder link for {:?}: {}", candidate.name, candidate.link);
            return with_fallback_link(candidate);
        }
        if self.validate(&candidate.link).await {
            candidate
        } else {
            with_fallback_link(candidate)
        }
    }

    /// Sanitizes every result concurrently. Results still unchecked when the
    /// budget runs out get the fallback link. Output order matches input order.
    pub async fn sanitize_all(&self, results: Vec<MatchResult>) -> Vec<MatchResult> {
        let deadline = tokio::time::Instant::now() + self.budget;
        let mut checked: Vec<Option<ScholarshipCandidate>> = vec![None; results.len()];

        {
            let owned: Vec<(usize, ScholarshipCandidate)> = results
                .iter()
                .map(|r| r.scholarship.clone())
                .enumerate()
                .collect();
            let mut checks = stream::iter(owned)
                .map(|(i, candidate)| async move { (i, self.sanitize(candidate).await) })
                .buffer_unordered(self.concurrency);

            loop {
                match tokio::time::timeout_at(deadline, checks.next()).await {
                    Ok(Some((i, candidate))) => checked[i] = Some(candidate),
                    Ok(None) => break,
                    Err(_) => {
                        let pending = checked.iter().filter(|c| c.is_none()).count();
                        warn!(
                            "Link check budget of {:?} exhausted; {} links left unverified",
                            self.budget, pending
                        );
                        break;
                    }
                }
            }
        }

        results
            .into_iter()
            .zip(checked)
            .map(|(mut result, candidate)| {
                result.scholarship = match candidate {
                    Some(c) => c,
                    None => with_fallback_link(result.scholarship),
                };
                result
            })
            .collect()
    }
}

fn with_fallback_link(mut candidate: ScholarshipCandidate) -> ScholarshipCandidate {
    candidate.link = fallback_search_url(&candidate.name);
    if candidate.note.is_none() {
        candidate.note = Some(FALLBACK_NOTE.to_string());
    }
    candidate
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::scholarship::CandidateSource;
    use chrono::Utc;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Probe answering from a fixed table; unknown URLs are dead.
    struct TableProbe {
        answers: HashMap<String, LinkCheck>,
        calls: AtomicUsize,
    }

    impl TableProbe {
        fn new(answers: &[(&str, LinkCheck)]) -> Self {
            Self {
                answers: answers
                    .iter()
                    .map(|(u, c)| (u.to_string(), c.clone()))
                    .collect(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl LinkProbe for TableProbe {
        async fn check(&self, url: &str) -> LinkCheck {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.answers
                .get(url)
                .cloned()
                .unwrap_or(LinkCheck::Dead { status: 404 })
        }
    }

    /// Probe that never answers before the test's timeouts.
    struct HangingProbe;

    #[async_trait]
    impl LinkProbe for HangingProbe {
        async fn check(&self, _url: &str) -> LinkCheck {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            LinkCheck::Live
        }
    }

    fn validator(probe: Arc<dyn LinkProbe>) -> LinkValidator {
        LinkValidator::new(probe, Duration::from_secs(10), Duration::from_secs(20), 4)
    }

    fn candidate(name: &str, link: &str) -> ScholarshipCandidate {
        ScholarshipCandidate {
            name: name.to_string(),
            eligibility: "Anyone".to_string(),
            deadline: "Varies".to_string(),
            amount: "Varies".to_string(),
            link: link.to_string(),
            source: CandidateSource::Generated,
            target_group: "ALL".to_string(),
            last_updated: Utc::now(),
            note: None,
        }
    }

    fn result(name: &str, link: &str) -> MatchResult {
        MatchResult {
            scholarship: candidate(name, link),
            match_score: 0.5,
            reason: "test".to_string(),
        }
    }

    #[test]
    fn test_placeholder_patterns() {
        assert!(is_placeholder_link("https://example.com/x"));
        assert!(is_placeholder_link("http://www.example.org"));
        assert!(is_placeholder_link("https://apply.example.com/form?id=3"));
        assert!(is_placeholder_link("https://yourwebsite.com/scholarship"));
        assert!(is_placeholder_link("http://localhost:3000/"));
        assert!(!is_placeholder_link("https://www.chevening.org/scholarships/"));
        assert!(!is_placeholder_link("https://notexample.com/"));
    }

    #[test]
    fn test_fallback_url_contains_encoded_name() {
        let url = fallback_search_url("Global Tech Talent Scholarship");
        assert_eq!(
            url,
            "https://www.google.com/search?q=Global+Tech+Talent+Scholarship"
        );
    }

    #[tokio::test]
    async fn test_placeholder_link_is_replaced_without_probing() {
        let probe = Arc::new(TableProbe::new(&[]));
        let v = validator(probe.clone());
        let c = v.sanitize(candidate("Global Tech Talent Scholarship", "https://example.com/x")).await;
        assert_eq!(c.link, fallback_search_url("Global Tech Talent Scholarship"));
        assert!(c.link.contains("Global+Tech+Talent+Scholarship"));
        assert_eq!(c.note.as_deref(), Some(FALLBACK_NOTE));
        assert_eq!(probe.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_live_link_is_kept() {
        let link = "https://www.chevening.org/scholarships/";
        let v = validator(Arc::new(TableProbe::new(&[(link, LinkCheck::Live)])));
        let c = v.sanitize(candidate("Chevening Scholarships", link)).await;
        assert_eq!(c.link, link);
        assert!(c.note.is_none());
    }

    #[tokio::test]
    async fn test_dead_and_unreachable_links_are_replaced() {
        let v = validator(Arc::new(TableProbe::new(&[(
            "https://down.org/a",
            LinkCheck::Unreachable("connection refused".to_string()),
        )])));
        assert!(!v.validate("https://gone.org/404").await);
        assert!(!v.validate("https://down.org/a").await);
        let c = v.sanitize(candidate("Gone Award", "https://gone.org/404")).await;
        assert_eq!(c.link, fallback_search_url("Gone Award"));
    }

    #[tokio::test]
    async fn test_non_http_link_fails_validation() {
        let probe = Arc::new(TableProbe::new(&[]));
        let v = validator(probe.clone());
        assert!(!v.validate("ftp://files.org/form").await);
        assert!(!v.validate("not a url").await);
        assert_eq!(probe.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_sanitize_is_idempotent() {
        let probe = Arc::new(TableProbe::new(&[]));
        let v = validator(probe.clone());
        let once = v.sanitize(candidate("Gone Award", "https://gone.org/404")).await;
        let calls_after_first = probe.calls.load(Ordering::SeqCst);
        let twice = v.sanitize(once.clone()).await;
        assert_eq!(once, twice);
        assert_eq!(probe.calls.load(Ordering::SeqCst), calls_after_first);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timed_out_probe_is_unvalidated() {
        let v = validator(Arc::new(HangingProbe));
        assert!(!v.validate("https://slow.org/").await);
        let c = v.sanitize(candidate("Slow Award", "https://slow.org/")).await;
        assert_eq!(c.link, fallback_search_url("Slow Award"));
    }

    #[tokio::test]
    async fn test_sanitize_all_preserves_order() {
        let live = "https://www.gatescambridge.org/";
        let v = validator(Arc::new(TableProbe::new(&[(live, LinkCheck::Live)])));
        let out = v
            .sanitize_all(vec![
                result("Placeholder", "https://example.com/x"),
                result("Gates Cambridge Scholarship", live),
                result("Dead", "https://gone.org/"),
            ])
            .await;
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].scholarship.link, fallback_search_url("Placeholder"));
        assert_eq!(out[1].scholarship.link, live);
        assert_eq!(out[2].scholarship.link, fallback_search_url("Dead"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_budget_exhaustion_keeps_partial_results() {
        // per-link timeout longer than the stage budget, so the probe is abandoned
        let v = LinkValidator::new(
            Arc::new(HangingProbe),
            Duration::from_secs(10),
            Duration::from_secs(2),
            4,
        );
        let out = v
            .sanitize_all(vec![
                result("Placeholder", "https://example.com/x"),
                result("Slow Award", "https://slow.org/"),
            ])
            .await;
        assert_eq!(out.len(), 2);
        assert!(out
            .iter()
            .all(|r| r.scholarship.link == fallback_search_url(&r.scholarship.name)));
        assert!(out.iter().all(|r| r.scholarship.note.is_some()));
    }
}
