//! Candidate URL generation for problem and contest pages.
//!
//! Order matters: the executor tries candidates front to back and stops at
//! the first page that carries problem content.

use cfpdf_core::ProblemReference;
use regex::Regex;
use std::sync::LazyLock;

/// Origin used when no configuration is supplied.
pub const DEFAULT_ORIGIN: &str = "https://codeforces.com";

static PROBLEM_URL_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"/contest/(\d+)/problem/([A-Za-z0-9]+)",
        r"/problemset/problem/(\d+)/([A-Za-z0-9]+)",
        r"/gym/(\d+)/problem/([A-Za-z0-9]+)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("invalid problem URL pattern"))
    .collect()
});

/// Candidate problem-page URLs, most likely first.
///
/// Contest, problemset and gym paths with the label as given, then the
/// same three with a lowercase label. A label without letters would
/// repeat itself, so duplicates are dropped.
pub fn generate_candidates(origin: &str, reference: &ProblemReference) -> Vec<String> {
    let origin = origin.trim_end_matches('/');
    let contest = reference.contest_id();
    let upper = reference.label();
    let lower = upper.to_ascii_lowercase();

    let mut urls: Vec<String> = Vec::with_capacity(6);
    for label in [upper, lower.as_str()] {
        for url in [
            format!("{origin}/contest/{contest}/problem/{label}"),
            format!("{origin}/problemset/problem/{contest}/{label}"),
            format!("{origin}/gym/{contest}/problem/{label}"),
        ] {
            if !urls.contains(&url) {
                urls.push(url);
            }
        }
    }
    urls
}

/// Contest listing pages used for problem discovery.
pub fn contest_page_candidates(origin: &str, contest_id: u32) -> Vec<String> {
    let origin = origin.trim_end_matches('/');
    vec![format!("{origin}/contest/{contest_id}"), format!("{origin}/gym/{contest_id}")]
}

/// Pull `(contest_id, label)` out of a pasted problem URL.
///
/// The label is returned as written; `ProblemReference::new` normalizes it.
pub fn parse_problem_url(text: &str) -> Option<(u32, String)> {
    PROBLEM_URL_PATTERNS.iter().find_map(|re| {
        let caps = re.captures(text)?;
        let contest_id = caps.get(1)?.as_str().parse().ok()?;
        Some((contest_id, caps.get(2)?.as_str().to_string()))
    })
}
