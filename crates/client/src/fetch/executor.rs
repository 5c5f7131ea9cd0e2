//! Multi-URL, multi-identity fetch strategy.
//!
//! Every candidate URL is tried with every identity in the rotation, one
//! request at a time, until a response is accepted. Misses of any kind
//! (non-200, 200 without problem content, transport failure) move on to
//! the next combination; there is no backoff between attempts.

use cfpdf_core::Reporter;
use std::fmt;
use std::sync::Arc;

use super::identity::{IdentityProfile, default_rotation};
use super::transport::Transport;

/// Substrings whose presence marks a page as carrying problem content.
pub const PROBLEM_MARKERS: [&str; 2] = ["<div class=\"problem-statement\">", "problemindexholder"];

/// True when the body looks like a real problem page.
pub fn has_problem_marker(body: &str) -> bool {
    PROBLEM_MARKERS.iter().any(|m| body.contains(m))
}

/// How one (URL, identity) attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    Success,
    HttpError(u16),
    TransportError(String),
    ContentMismatch,
}

impl fmt::Display for AttemptOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptOutcome::Success => write!(f, "success"),
            AttemptOutcome::HttpError(code) => write!(f, "status_code={code}"),
            AttemptOutcome::TransportError(cause) => write!(f, "transport error: {cause}"),
            AttemptOutcome::ContentMismatch => write!(f, "status_code=200 without problem content"),
        }
    }
}

/// One request made by the executor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchAttempt {
    pub url: String,
    pub identity: &'static str,
    pub outcome: AttemptOutcome,
}

/// Diagnostics left behind when every combination missed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Exhausted {
    pub attempts: Vec<FetchAttempt>,
}

impl Exhausted {
    pub fn last(&self) -> Option<&FetchAttempt> {
        self.attempts.last()
    }

    pub fn attempt_count(&self) -> usize {
        self.attempts.len()
    }

    /// Whether any attempt was answered with 403 Forbidden.
    pub fn blocked(&self) -> bool {
        self.attempts
            .iter()
            .any(|a| a.outcome == AttemptOutcome::HttpError(403))
    }

    /// One-line description naming the last attempt.
    pub fn summary(&self) -> String {
        match self.last() {
            Some(last) => format!(
                "all {} attempts failed; last attempt '{}' as {}: {}",
                self.attempt_count(),
                last.url,
                last.identity,
                last.outcome
            ),
            None => "no fetch attempts were made".to_string(),
        }
    }
}

/// Result of running the strategy over a candidate list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchResult {
    Success { html: String, url: String, attempts: usize },
    Exhausted(Exhausted),
}

/// Runs candidate URLs against an identity rotation over a `Transport`.
pub struct FetchExecutor {
    transport: Arc<dyn Transport>,
    identities: Vec<IdentityProfile>,
    reporter: Arc<dyn Reporter>,
}

impl FetchExecutor {
    /// Create an executor using the default identity rotation.
    pub fn new(transport: Arc<dyn Transport>, reporter: Arc<dyn Reporter>) -> Self {
        Self { transport, identities: default_rotation(), reporter }
    }

    /// Replace the identity rotation.
    pub fn with_identities(mut self, identities: Vec<IdentityProfile>) -> Self {
        self.identities = identities;
        self
    }

    /// Fetch the first candidate that carries problem content.
    pub async fn fetch_content(&self, urls: &[String]) -> FetchResult {
        self.fetch_with(urls, has_problem_marker).await
    }

    /// Fetch the first candidate whose 200 body satisfies `accept`.
    pub async fn fetch_with<F>(&self, urls: &[String], accept: F) -> FetchResult
    where
        F: Fn(&str) -> bool + Sync,
    {
        let mut exhausted = Exhausted::default();

        for url in urls {
            for identity in &self.identities {
                self.reporter.info(&format!("Trying URL: {url} ({})", identity.name));

                let outcome = match self.transport.get(url, identity).await {
                    Ok(response) if response.status == 200 && accept(&response.body) => {
                        self.reporter.info(&format!("Successfully fetched content from: {url}"));
                        return FetchResult::Success {
                            html: response.body,
                            url: url.clone(),
                            attempts: exhausted.attempt_count() + 1,
                        };
                    }
                    Ok(response) if response.status == 200 => {
                        self.reporter
                            .info(&format!("URL {url} returned OK status but didn't contain expected content"));
                        AttemptOutcome::ContentMismatch
                    }
                    Ok(response) => {
                        self.reporter.info(&format!("URL {url} returned status code {}", response.status));
                        AttemptOutcome::HttpError(response.status)
                    }
                    Err(e) => {
                        self.reporter.info(&format!("Error connecting to {url}: {e}"));
                        AttemptOutcome::TransportError(e.to_string())
                    }
                };

                exhausted.attempts.push(FetchAttempt { url: url.clone(), identity: identity.name, outcome });
            }
        }

        self.reporter.warn(&exhausted.summary());
        FetchResult::Exhausted(exhausted)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::fetch::identity::{CHROME_WINDOWS, FIREFOX_LINUX, SAFARI_MACOS};
    use crate::fetch::transport::{TransportError, TransportResponse};
    use async_trait::async_trait;
    use cfpdf_core::MemoryReporter;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tracing::Level;

    /// Serves canned responses keyed by (url, identity); anything else is a 404.
    #[derive(Default)]
    pub(crate) struct ScriptedTransport {
        responses: HashMap<(String, &'static str), Result<TransportResponse, TransportError>>,
        by_url: HashMap<String, TransportResponse>,
        pub(crate) calls: Mutex<Vec<(String, &'static str)>>,
    }

    impl ScriptedTransport {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        pub(crate) fn respond(mut self, url: &str, identity: &'static str, status: u16, body: &str) -> Self {
            self.responses
                .insert((url.to_string(), identity), Ok(TransportResponse { status, body: body.to_string() }));
            self
        }

        /// Same response for every identity.
        pub(crate) fn respond_any(mut self, url: &str, status: u16, body: &str) -> Self {
            self.by_url.insert(url.to_string(), TransportResponse { status, body: body.to_string() });
            self
        }

        pub(crate) fn fail(mut self, url: &str, identity: &'static str, err: TransportError) -> Self {
            self.responses.insert((url.to_string(), identity), Err(err));
            self
        }

        pub(crate) fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn get(&self, url: &str, identity: &IdentityProfile) -> Result<TransportResponse, TransportError> {
            self.calls.lock().unwrap().push((url.to_string(), identity.name));
            if let Some(response) = self.responses.get(&(url.to_string(), identity.name)) {
                return response.clone();
            }
            if let Some(response) = self.by_url.get(url) {
                return Ok(response.clone());
            }
            Ok(TransportResponse { status: 404, body: "Not Found".into() })
        }
    }

    const PROBLEM_PAGE: &str = r#"<div class="problemindexholder"><div class="problem-statement">ok</div></div>"#;

    fn urls(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("https://example.com/{i}")).collect()
    }

    fn executor(transport: Arc<ScriptedTransport>, identities: Vec<IdentityProfile>) -> FetchExecutor {
        FetchExecutor::new(transport, Arc::new(MemoryReporter::new())).with_identities(identities)
    }

    #[test]
    fn test_has_problem_marker() {
        assert!(has_problem_marker(PROBLEM_PAGE));
        assert!(has_problem_marker(r#"<div class="problem-statement">"#));
        assert!(!has_problem_marker("<html><body>Just a moment...</body></html>"));
    }

    #[tokio::test]
    async fn test_success_on_last_combination_uses_exactly_four_requests() {
        let candidates = urls(2);
        let transport = Arc::new(ScriptedTransport::new().respond(&candidates[1], SAFARI_MACOS.name, 200, PROBLEM_PAGE));

        let result = executor(transport.clone(), vec![CHROME_WINDOWS, SAFARI_MACOS])
            .fetch_content(&candidates)
            .await;

        assert_eq!(transport.call_count(), 4);
        match result {
            FetchResult::Success { url, attempts, html } => {
                assert_eq!(url, candidates[1]);
                assert_eq!(attempts, 4);
                assert!(html.contains("problem-statement"));
            }
            other => panic!("expected success, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_first_success_short_circuits() {
        let candidates = urls(3);
        let transport = Arc::new(ScriptedTransport::new().respond_any(&candidates[0], 200, PROBLEM_PAGE));

        let result = executor(transport.clone(), default_rotation()).fetch_content(&candidates).await;

        assert_eq!(transport.call_count(), 1);
        assert!(matches!(result, FetchResult::Success { attempts: 1, .. }));
    }

    #[tokio::test]
    async fn test_exhausts_every_combination() {
        let candidates = urls(5);
        let transport = Arc::new(ScriptedTransport::new());

        let result = executor(transport.clone(), vec![CHROME_WINDOWS, SAFARI_MACOS, FIREFOX_LINUX])
            .fetch_content(&candidates)
            .await;

        assert_eq!(transport.call_count(), 15);
        match result {
            FetchResult::Exhausted(exhausted) => {
                assert_eq!(exhausted.attempt_count(), 15);
                let last = exhausted.last().unwrap();
                assert_eq!(last.url, candidates[4]);
                assert_eq!(last.identity, FIREFOX_LINUX.name);
                assert_eq!(last.outcome, AttemptOutcome::HttpError(404));
            }
            other => panic!("expected exhaustion, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_attempt_order_is_url_major() {
        let candidates = urls(2);
        let transport = Arc::new(ScriptedTransport::new());

        executor(transport.clone(), vec![CHROME_WINDOWS, FIREFOX_LINUX])
            .fetch_content(&candidates)
            .await;

        let calls = transport.calls.lock().unwrap().clone();
        assert_eq!(
            calls,
            vec![
                (candidates[0].clone(), CHROME_WINDOWS.name),
                (candidates[0].clone(), FIREFOX_LINUX.name),
                (candidates[1].clone(), CHROME_WINDOWS.name),
                (candidates[1].clone(), FIREFOX_LINUX.name),
            ]
        );
    }

    #[tokio::test]
    async fn test_classifies_each_miss() {
        let candidates = urls(1);
        let transport = Arc::new(
            ScriptedTransport::new()
                .respond(&candidates[0], CHROME_WINDOWS.name, 403, "Forbidden")
                .respond(&candidates[0], SAFARI_MACOS.name, 200, "<html>Just a moment...</html>")
                .fail(&candidates[0], FIREFOX_LINUX.name, TransportError::Timeout(10_000)),
        );

        let result = executor(transport, default_rotation()).fetch_content(&candidates).await;

        let FetchResult::Exhausted(exhausted) = result else {
            panic!("expected exhaustion");
        };
        let outcomes: Vec<_> = exhausted.attempts.iter().map(|a| a.outcome.clone()).collect();
        assert_eq!(outcomes[0], AttemptOutcome::HttpError(403));
        assert_eq!(outcomes[1], AttemptOutcome::ContentMismatch);
        assert!(matches!(&outcomes[2], AttemptOutcome::TransportError(cause) if cause.contains("timed out")));
        assert!(exhausted.blocked());
        assert!(exhausted.summary().contains("transport error"));
    }

    #[tokio::test]
    async fn test_custom_acceptance() {
        let candidates = urls(2);
        let transport = Arc::new(
            ScriptedTransport::new()
                .respond_any(&candidates[0], 200, "<table>nothing</table>")
                .respond_any(&candidates[1], 200, "<table class=\"problems\"></table>"),
        );

        let result = executor(transport.clone(), vec![CHROME_WINDOWS])
            .fetch_with(&candidates, |body| body.contains("class=\"problems\""))
            .await;

        assert!(matches!(result, FetchResult::Success { ref url, .. } if url == &candidates[1]));
        assert_eq!(transport.call_count(), 2);
    }

    #[tokio::test]
    async fn test_exhaustion_is_reported_as_warning() {
        let reporter = Arc::new(MemoryReporter::new());
        let transport = Arc::new(ScriptedTransport::new());
        let executor = FetchExecutor::new(transport, reporter.clone()).with_identities(vec![CHROME_WINDOWS]);

        executor.fetch_content(&urls(1)).await;

        let warnings = reporter.at(Level::WARN);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("status_code=404"));
    }

    #[test]
    fn test_exhausted_without_attempts() {
        let exhausted = Exhausted::default();
        assert!(exhausted.last().is_none());
        assert!(!exhausted.blocked());
        assert_eq!(exhausted.summary(), "no fetch attempts were made");
    }
}
