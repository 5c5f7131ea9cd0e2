//! Problem-statement extraction into a `NormalizedDocument`.
//!
//! The upstream markup is not a stable contract, so every field is read by
//! an ordered list of strategies and the first hit wins. Extraction never
//! fails: missing pieces fall back to defaults.
//!
//! ### Cleanup
//! - Alert, notification and script blocks inside the content root are
//!   removed before any text is read.
//!
//! ### Fields
//! - Title: header title, then the first non-sample block title, then a placeholder.
//! - Limits: labelled header blocks, then a text search; 1 second / 256 MB defaults.
//! - Samples: `input`/`output` blocks zipped by position; extras are dropped.
//! - Notes: the `note` block without its own heading, if present.
//! - Rating: see [`rating`].

pub mod contest;
pub mod rating;

pub use contest::parse_contest_labels;
pub use rating::{classify_rating, color_for};

use askama::{Html as HtmlEscaper, MarkupDisplay};
use cfpdf_core::model::{DEFAULT_MEMORY_LIMIT_MB, DEFAULT_TIME_LIMIT_SECONDS};
use cfpdf_core::{NormalizedDocument, ProblemReference, SampleTest};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

use crate::fetch::Exhausted;

/// Title used when the page has no recognizable title block.
pub const PLACEHOLDER_TITLE: &str = "Codeforces Problem";

static HOLDER: LazyLock<Selector> = LazyLock::new(|| selector(".problemindexholder"));
static STATEMENT: LazyLock<Selector> = LazyLock::new(|| selector(".problem-statement"));
static BODY: LazyLock<Selector> = LazyLock::new(|| selector("body"));
static NOISE: LazyLock<Selector> =
    LazyLock::new(|| selector("div.alert, div.alert-info, div.diff-notifier, script, style"));
static HEADER_TITLE: LazyLock<Selector> = LazyLock::new(|| selector(".header .title"));
static TITLE: LazyLock<Selector> = LazyLock::new(|| selector("div.title"));
static TIME_LIMIT: LazyLock<Selector> = LazyLock::new(|| selector(".time-limit"));
static MEMORY_LIMIT: LazyLock<Selector> = LazyLock::new(|| selector(".memory-limit"));
static INPUTS: LazyLock<Selector> = LazyLock::new(|| selector("div.input"));
static OUTPUTS: LazyLock<Selector> = LazyLock::new(|| selector("div.output"));
static PRE: LazyLock<Selector> = LazyLock::new(|| selector("pre"));
static NOTE: LazyLock<Selector> = LazyLock::new(|| selector("div.note"));

static TIME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)time\s+limit[^0-9]{0,40}?(\d+(?:\.\d+)?)\s*(?:seconds?|s\b)").expect("invalid time pattern")
});
static MEMORY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)memory\s+limit[^0-9]{0,40}?(\d+)\s*(?:megabytes|mb\b)").expect("invalid memory pattern")
});

/// Classes of blocks that reflow rebuilds itself and that stay out of the body.
const STRUCTURAL_CLASSES: [&str; 8] =
    ["header", "title", "sample-tests", "sample-test", "input", "output", "note", "section-title"];

fn selector(s: &str) -> Selector {
    Selector::parse(s).expect("invalid selector")
}

type Strategy<T> = fn(ElementRef<'_>) -> Option<T>;

fn first_match<T>(root: ElementRef<'_>, strategies: &[Strategy<T>]) -> Option<T> {
    strategies.iter().find_map(|strategy| strategy(root))
}

/// Parse a problem page into a normalized document. Total: never fails.
pub fn extract(raw_html: &str) -> NormalizedDocument {
    let mut document = Html::parse_document(raw_html);
    strip_noise(&mut document);
    let root = content_root(&document);

    let title = first_match(root, &[header_title, block_title]).unwrap_or_else(|| PLACEHOLDER_TITLE.to_string());
    let time_limit_seconds = first_match(root, &[labelled_time_limit, text_time_limit]).unwrap_or(DEFAULT_TIME_LIMIT_SECONDS);
    let memory_limit_mb = first_match(root, &[labelled_memory_limit, text_memory_limit]).unwrap_or(DEFAULT_MEMORY_LIMIT_MB);

    NormalizedDocument {
        title,
        time_limit_seconds,
        memory_limit_mb,
        statement_markup: statement_markup(root),
        samples: sample_tests(root),
        notes_markup: notes_markup(root),
        rating: classify_rating(raw_html),
        diagnostic: false,
    }
}

/// Placeholder document explaining why no statement could be fetched.
pub fn diagnostic_document(reference: &ProblemReference, exhausted: &Exhausted, origin: &str) -> NormalizedDocument {
    let origin = origin.trim_end_matches('/');
    let contest = reference.contest_id();
    let label = reference.label();

    let statement_markup = format!(
        r#"<div class="diagnostic">
    <p>Could not connect to Codeforces to retrieve problem content.</p>
    <p>Please check your internet connection and try again later.</p>
    <p>You might also want to verify if the contest ID ({contest}) and problem ID ({label}) are correct.</p>
    <p class="diagnostic-reason">{reason}</p>
    <p>Tip: Try official Codeforces URLs to check if the problem exists:</p>
    <ul>
        <li><a href="{origin}/contest/{contest}/problem/{label}">Contest format</a></li>
        <li><a href="{origin}/problemset/problem/{contest}/{label}">Problemset format</a></li>
    </ul>
</div>"#,
        reason = escape_html(&exhausted.summary()),
    );

    NormalizedDocument {
        title: format!("Unable to fetch problem {reference}"),
        statement_markup,
        diagnostic: true,
        ..Default::default()
    }
}

/// Text placed into generated markup, escaped the way the reflow template escapes.
pub(crate) fn escape_html(text: &str) -> String {
    MarkupDisplay::new_unsafe(text, HtmlEscaper).to_string()
}

fn content_root(document: &Html) -> ElementRef<'_> {
    document
        .select(&HOLDER)
        .next()
        .or_else(|| document.select(&STATEMENT).next())
        .or_else(|| document.select(&BODY).next())
        .unwrap_or_else(|| document.root_element())
}

fn strip_noise(document: &mut Html) {
    let ids: Vec<_> = content_root(document).select(&NOISE).map(|e| e.id()).collect();
    for id in ids {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }
}

fn has_any_class(element: ElementRef<'_>, classes: &[&str]) -> bool {
    element.value().classes().any(|c| classes.contains(&c))
}

/// Text with whitespace runs collapsed to single spaces.
fn collapsed_text(element: ElementRef<'_>) -> String {
    element.text().collect::<Vec<_>>().join(" ").split_whitespace().collect::<Vec<_>>().join(" ")
}

fn non_empty(text: String) -> Option<String> {
    (!text.is_empty()).then_some(text)
}

fn header_title(root: ElementRef<'_>) -> Option<String> {
    root.select(&HEADER_TITLE).next().and_then(|t| non_empty(collapsed_text(t)))
}

/// First `div.title` that is not the caption of a sample block.
fn block_title(root: ElementRef<'_>) -> Option<String> {
    root.select(&TITLE)
        .filter(|title| {
            !title
                .ancestors()
                .filter_map(ElementRef::wrap)
                .any(|a| has_any_class(a, &["input", "output", "sample-test", "sample-tests"]))
        })
        .find_map(|t| non_empty(collapsed_text(t)))
}

fn labelled_time_limit(root: ElementRef<'_>) -> Option<f64> {
    let text = collapsed_text(root.select(&TIME_LIMIT).next()?);
    parse_time(&text)
}

fn text_time_limit(root: ElementRef<'_>) -> Option<f64> {
    parse_time(&collapsed_text(root))
}

fn labelled_memory_limit(root: ElementRef<'_>) -> Option<u32> {
    let text = collapsed_text(root.select(&MEMORY_LIMIT).next()?);
    parse_memory(&text)
}

fn text_memory_limit(root: ElementRef<'_>) -> Option<u32> {
    parse_memory(&collapsed_text(root))
}

fn parse_time(text: &str) -> Option<f64> {
    let caps = TIME_PATTERN.captures(text)?;
    caps.get(1)?.as_str().parse().ok()
}

fn parse_memory(text: &str) -> Option<u32> {
    let caps = MEMORY_PATTERN.captures(text)?;
    caps.get(1)?.as_str().parse().ok()
}

/// Sample pairs in document order; unmatched extras are dropped.
fn sample_tests(root: ElementRef<'_>) -> Vec<SampleTest> {
    let inputs = root.select(&INPUTS).map(block_pre_text);
    let outputs = root.select(&OUTPUTS).map(block_pre_text);
    inputs.zip(outputs).map(|(input, output)| SampleTest { input, output }).collect()
}

/// Trimmed text of the first `pre` inside a sample block, or empty.
fn block_pre_text(block: ElementRef<'_>) -> String {
    block
        .select(&PRE)
        .next()
        .map(|pre| {
            let mut text = String::new();
            collect_pre_text(pre, &mut text);
            text.trim().to_string()
        })
        .unwrap_or_default()
}

/// Preformatted text where `<br>` and line `<div>`s become newlines.
fn collect_pre_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
        } else if let Some(child) = ElementRef::wrap(child) {
            match child.value().name() {
                "br" => out.push('\n'),
                name => {
                    collect_pre_text(child, out);
                    if name == "div" && !out.ends_with('\n') {
                        out.push('\n');
                    }
                }
            }
        }
    }
}

/// Statement body: everything in the statement container except blocks reflow rebuilds.
fn statement_markup(root: ElementRef<'_>) -> String {
    let container = if has_any_class(root, &["problem-statement"]) {
        root
    } else {
        root.select(&STATEMENT).next().unwrap_or(root)
    };

    let mut markup = String::new();
    for child in container.children() {
        if let Some(element) = ElementRef::wrap(child) {
            if !has_any_class(element, &STRUCTURAL_CLASSES) && !matches!(element.value().name(), "script" | "style") {
                markup.push_str(&element.html());
            }
        } else if let Some(text) = child.value().as_text()
            && !text.trim().is_empty()
        {
            markup.push_str(&escape_html(text));
        }
    }
    markup.trim().to_string()
}

fn notes_markup(root: ElementRef<'_>) -> Option<String> {
    let note = root.select(&NOTE).next()?;

    let mut markup = String::new();
    for child in note.children() {
        if let Some(element) = ElementRef::wrap(child) {
            if !has_any_class(element, &["section-title"]) {
                markup.push_str(&element.html());
            }
        } else if let Some(text) = child.value().as_text() {
            markup.push_str(&escape_html(text));
        }
    }

    non_empty(markup.trim().to_string())
}
